// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `infer-harness inspect` command: compile a model and print its signature.

use anyhow::Context;
use model_package::ModelPackage;
use resource_monitor::HostInfo;
use runtime::{report, ExecutableLoader, HarnessConfig};

pub async fn execute(config: HarnessConfig) -> anyhow::Result<()> {
    super::banner("Model Inspector");

    let package = ModelPackage::resolve(&config.model_path)
        .with_context(|| format!("failed to resolve '{}'", config.model_path.display()))?;
    println!("  Package: {} ({})", package.path().display(), package.format());
    if let Some(constants) = package.open_constants()? {
        println!("  Constants: {} tensors", constants.names().len());
    }

    let loader = ExecutableLoader::from_config(&config)?;
    let handle = loader
        .load(&config.model_path, &config.compilation)
        .with_context(|| format!("failed to load model from '{}'", config.model_path.display()))?;

    println!("  Compiled: {}", handle.options().summary());
    println!("  Host: {}", HostInfo::read().summary());
    println!();

    // ── Signature ──────────────────────────────────────────────
    print!("{}", report::render_signature(&handle));
    if handle.signature().is_dynamic() {
        println!();
        println!("  Note: '?' marks dimensions resolved per call.");
    }

    Ok(())
}
