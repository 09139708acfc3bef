// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `infer-harness run` command: one inference, sampled outputs.

use anyhow::Context;
use runtime::{report, Harness, HarnessConfig};

pub async fn execute(config: HarnessConfig) -> anyhow::Result<()> {
    super::banner("Inference Runner");

    let model_path = config.model_path.clone();
    let samples = config.sample_outputs;
    let mut harness = Harness::new(config)?
        .load()
        .with_context(|| format!("failed to load model from '{}'", model_path.display()))?;

    let handle = harness.handle().clone();
    println!("  Model:  {} ({})", handle.name(), handle.path().display());
    println!("  Engine: {} on {}", handle.engine(), handle.device());
    println!();

    let result = harness
        .run_once()
        .with_context(|| format!("inference failed on '{}'", handle.name()))?;

    // ── Outputs ────────────────────────────────────────────────
    print!("{}", report::render_outputs(&result.outputs, samples));
    println!();

    let summary = harness.summarize()?;
    println!(
        "  Load: {:.4} ms · Inference: {:.4} ms",
        summary.load_time.as_secs_f64() * 1000.0,
        result.duration.as_secs_f64() * 1000.0,
    );

    Ok(())
}
