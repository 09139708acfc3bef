// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and the pieces they share.

pub mod inspect;
pub mod perf;
pub mod run;

use anyhow::Context;
use model_package::{OptimizationLevel, Precision, ShapeMode};
use runtime::{CallMode, HarnessConfig, InputBinding};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Installs the stderr log subscriber.
///
/// With no `-v`, `RUST_LOG` is honoured and falls back to `warn`.
pub fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Settings shared by every subcommand. Unset flags keep the preset's value.
#[derive(clap::Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Built-in preset: image, nlp.
    #[arg(short, long, default_value = "image")]
    pub preset: String,

    /// Path to the model package (directory or .onnx file).
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Execution engine: reference, onnx.
    #[arg(short, long)]
    pub engine: Option<String>,

    /// Target device: cpu, gpu, gpu:N.
    #[arg(short, long)]
    pub device: Option<String>,

    /// Number of measured inference calls.
    #[arg(short = 'n', long)]
    pub iterations: Option<usize>,

    /// Unmeasured calls issued before measurement.
    #[arg(long)]
    pub warmup: Option<usize>,

    /// Call convention: sync, pipelined.
    #[arg(long)]
    pub mode: Option<CallMode>,

    /// Input binding: positional, named.
    #[arg(long)]
    pub binding: Option<InputBinding>,

    /// Leading values printed per output tensor.
    #[arg(short, long)]
    pub samples: Option<usize>,

    /// Graph optimisation level: none, basic, full.
    #[arg(long)]
    pub opt_level: Option<OptimizationLevel>,

    /// Compute precision: float32, float16.
    #[arg(long)]
    pub precision: Option<Precision>,

    /// Shape handling: fixed, dynamic.
    #[arg(long)]
    pub shape_mode: Option<ShapeMode>,

    /// Skip resident-memory sampling.
    #[arg(long)]
    pub no_memory: bool,
}

/// Builds the effective configuration: TOML file or preset, then flag overrides.
pub fn resolve_config(
    config_path: Option<&Path>,
    args: &ConfigArgs,
) -> anyhow::Result<HarnessConfig> {
    let mut config = match config_path {
        Some(path) => HarnessConfig::from_file(path)
            .with_context(|| format!("failed to load config '{}'", path.display()))?,
        None => HarnessConfig::preset(&args.preset)?,
    };

    if let Some(model) = &args.model {
        config.model_path = model.clone();
    }
    if let Some(engine) = &args.engine {
        config.engine = engine.clone();
    }
    if let Some(device) = &args.device {
        config.device = device.clone();
    }
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(warmup) = args.warmup {
        config.warmup = warmup;
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(binding) = args.binding {
        config.input_binding = binding;
    }
    if let Some(samples) = args.samples {
        config.sample_outputs = samples;
    }
    if let Some(level) = args.opt_level {
        config.compilation.optimization_level = level;
    }
    if let Some(precision) = args.precision {
        config.compilation.precision = precision;
    }
    if let Some(shape_mode) = args.shape_mode {
        config.compilation.shape_mode = shape_mode;
    }
    if args.no_memory {
        config.sample_memory = false;
    }

    config.validate().context("invalid configuration")?;
    tracing::debug!("effective config: {}", config.summary());
    Ok(config)
}

/// Prints the boxed command header.
pub fn banner(title: &str) {
    println!("╔{}╗", "═".repeat(54));
    println!("║{:^54}║", format!("infer-harness · {title}"));
    println!("╚{}╝", "═".repeat(54));
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ConfigArgs,
    }

    fn parse(argv: &[&str]) -> ConfigArgs {
        let mut full = vec!["test"];
        full.extend_from_slice(argv);
        TestCli::parse_from(full).args
    }

    #[test]
    fn test_defaults_are_image_preset() {
        let config = resolve_config(None, &parse(&[])).unwrap();
        assert_eq!(config, HarnessConfig::image_preset());
    }

    #[test]
    fn test_flags_override_preset() {
        let config = resolve_config(
            None,
            &parse(&[
                "--preset", "nlp", "-n", "25", "--mode", "pipelined", "--binding",
                "positional", "--opt-level", "basic", "--no-memory",
            ]),
        )
        .unwrap();
        assert_eq!(config.iterations, 25);
        assert_eq!(config.mode, CallMode::Pipelined);
        assert_eq!(config.input_binding, InputBinding::Positional);
        assert_eq!(config.compilation.optimization_level, OptimizationLevel::Basic);
        assert!(!config.sample_memory);
        assert_eq!(config.inputs.len(), 3);
    }

    #[test]
    fn test_zero_iterations_rejected() {
        assert!(resolve_config(None, &parse(&["-n", "0"])).is_err());
    }

    #[test]
    fn test_unknown_preset_rejected() {
        assert!(resolve_config(None, &parse(&["--preset", "audio"])).is_err());
    }

    #[test]
    fn test_config_file_then_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nlp.toml");
        std::fs::write(&path, HarnessConfig::nlp_preset().to_toml().unwrap()).unwrap();

        let config = resolve_config(Some(&path), &parse(&["--warmup", "3"])).unwrap();
        assert_eq!(config.warmup, 3);
        assert_eq!(config.input_binding, InputBinding::Named);
    }
}
