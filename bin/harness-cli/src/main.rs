// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # infer-harness
//!
//! Command-line interface for benchmarking compiled inference models.
//!
//! ## Usage
//! ```bash
//! # Benchmark the built-in image preset (1000 calls, zero input)
//! infer-harness perf
//!
//! # Benchmark the NLP preset through ONNX Runtime, pipelined
//! infer-harness perf --preset nlp --engine onnx --mode pipelined
//!
//! # One call, print the first 20 values of every output
//! infer-harness run --model ./models/yolov8 --samples 20
//!
//! # Print the model's input and output signature
//! infer-harness inspect --model ./models/minilm
//! ```

mod commands;

use clap::{Parser, Subcommand};
use commands::ConfigArgs;

#[derive(Parser)]
#[command(
    name = "infer-harness",
    about = "Performance and inspection harness for compiled inference models",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file (replaces the preset; flags still override).
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a model, run N inferences on a fixed input, and print a metrics report.
    Perf {
        #[command(flatten)]
        args: ConfigArgs,
    },

    /// Run a single inference and print sampled output values.
    Run {
        #[command(flatten)]
        args: ConfigArgs,
    },

    /// Load a model and print its input and output signature.
    Inspect {
        #[command(flatten)]
        args: ConfigArgs,
    },

    /// Print the effective configuration as TOML.
    ShowConfig {
        #[command(flatten)]
        args: ConfigArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Perf { args } => {
            commands::perf::execute(commands::resolve_config(config_path, &args)?).await
        }
        Commands::Run { args } => {
            commands::run::execute(commands::resolve_config(config_path, &args)?).await
        }
        Commands::Inspect { args } => {
            commands::inspect::execute(commands::resolve_config(config_path, &args)?).await
        }
        Commands::ShowConfig { args } => {
            let config = commands::resolve_config(config_path, &args)?;
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}
