// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `infer-harness perf` command: load, run N inferences, report.
//!
//! ```text
//! Harness<Idle> → load → Harness<Ready> → run_benchmark → report
//! ```

use anyhow::Context;
use resource_monitor::HostInfo;
use runtime::{report, Harness, HarnessConfig};

pub async fn execute(config: HarnessConfig) -> anyhow::Result<()> {
    super::banner("Performance Evaluation");

    println!("  Config: {}", config.summary());
    for fill in &config.inputs {
        println!(
            "   Input: {} {} {} {}",
            fill.name,
            fill.dtype,
            fill.shape,
            fill.source_label()
        );
    }
    println!();

    // ── Load ───────────────────────────────────────────────────
    println!("  [1/2] Loading model...");
    let model_path = config.model_path.clone();
    let mut harness = Harness::new(config)?
        .load()
        .with_context(|| format!("failed to load model from '{}'", model_path.display()))?;
    let handle = harness.handle().clone();
    println!("        {}", report::render_context(&handle, &HostInfo::read()));
    println!();

    // ── Run ────────────────────────────────────────────────────
    let iterations = harness.config().iterations;
    println!("  [2/2] Running {iterations} inferences...");
    let run = harness
        .run_benchmark()
        .await
        .with_context(|| format!("inference failed on '{}'", handle.name()))?;
    println!(
        "        Done in {:.2}s wall time.",
        run.wall_time.as_secs_f64()
    );
    println!();

    print!(
        "{}",
        report::render_outputs(&run.last.outputs, harness.config().sample_outputs)
    );
    println!();
    print!("{}", report::render(harness.summarize().as_ref()));

    Ok(())
}
