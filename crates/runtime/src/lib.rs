// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # runtime
//!
//! Loads a model package through an external execution engine, runs it
//! repeatedly, and measures what each call costs.
//!
//! Components, leaf first:
//! - [`engine`]: the [`ExecutionEngine`] / [`Executable`] seam, with the
//!   always-available [`ReferenceEngine`] and the optional ONNX Runtime engine.
//! - [`ExecutableLoader`]: package path + [`CompilationOptions`] → [`ModelHandle`].
//! - [`InferenceRunner`]: validated synchronous ([`run`](InferenceRunner::run))
//!   and pipelined ([`submit`](InferenceRunner::submit)) calls.
//! - [`MetricsCollector`]: load/inference timing plus memory and CPU sampling.
//! - [`report`]: text rendering of metrics, outputs and signatures.
//! - [`Harness`]: the type-state driver tying them together.
//!
//! # Type-State Pipeline
//! ```text
//! Harness<Idle> → Harness<Ready>
//! ```
//! Transitions are compile-time checked.
//!
//! # Async Execution
//! Pipelined calls run on Tokio's blocking pool so the control thread can
//! prepare the next call's inputs while the engine works.

mod config;
pub mod engine;
mod error;
mod harness;
mod loader;
mod metrics;
pub mod report;
mod runner;

pub use config::{CallMode, HarnessConfig, InputBinding, InputFill, PRESETS};
pub use engine::{create_engine, Device, Executable, ExecutionEngine, ReferenceEngine};
pub use error::{MetricsError, RuntimeError};
pub use harness::{BenchmarkRun, Harness, HarnessState, Idle, Ready};
pub use loader::{ExecutableLoader, ModelHandle};
pub use metrics::{
    MetricsAccumulator, MetricsCollector, MetricsSummary, ProcfsProbe, ResourceProbe,
};
pub use runner::{bind_inputs, InFlight, InferenceResult, InferenceRunner, Inputs};

pub use model_package::{CompilationOptions, ModelSignature, TensorSpec};
