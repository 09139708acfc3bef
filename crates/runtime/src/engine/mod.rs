// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The seam to external execution engines.
//!
//! An [`ExecutionEngine`] is created once per process for a [`Device`]; the
//! device is probed at creation so a missing accelerator surfaces as
//! [`RuntimeError::DeviceUnavailable`] before any model is touched. The
//! engine then compiles a [`ModelPackage`] into an [`Executable`], which is
//! immutable and shared across calls and threads.
//!
//! Engines:
//! - [`ReferenceEngine`]: always available, host CPU only, no tensor math.
//! - `OnnxEngine` (feature `onnx`): ONNX Runtime, with CUDA under `cuda`.

mod reference;

#[cfg(feature = "onnx")]
mod onnx;

pub use reference::ReferenceEngine;

#[cfg(feature = "onnx")]
pub use onnx::OnnxEngine;

use crate::RuntimeError;
use model_package::{CompilationOptions, ModelPackage, ModelSignature};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tensor_core::TensorBuffer;

/// Engine names accepted by [`create_engine`].
pub const ENGINES: &[&str] = &["reference", "onnx"];

/// Where an engine executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    #[default]
    Cpu,
    Gpu { device_id: u32 },
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Gpu { device_id } => write!(f, "gpu:{device_id}"),
        }
    }
}

impl FromStr for Device {
    type Err = RuntimeError;

    /// Parses `cpu`, `gpu`, `cuda`, `gpu:<id>` or `cuda:<id>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let (kind, id) = match lower.split_once(':') {
            Some((kind, id)) => (kind, Some(id)),
            None => (lower.as_str(), None),
        };
        match (kind, id) {
            ("cpu", None) => Ok(Device::Cpu),
            ("gpu" | "cuda", None) => Ok(Device::Gpu { device_id: 0 }),
            ("gpu" | "cuda", Some(id)) => id
                .parse()
                .map(|device_id| Device::Gpu { device_id })
                .map_err(|_| RuntimeError::Config(format!("invalid device id in '{s}'"))),
            _ => Err(RuntimeError::Config(format!(
                "unknown device '{s}'; expected 'cpu', 'gpu' or 'cuda:<id>'"
            ))),
        }
    }
}

/// A compiled, ready-to-run model.
///
/// Implementations must be safe to call from several threads; engines whose
/// sessions need exclusive access serialise internally.
pub trait Executable: Send + Sync {
    /// Declared inputs and outputs, in executable order.
    fn signature(&self) -> &ModelSignature;

    /// Runs one inference. `inputs` are in declared order and have already
    /// been validated against [`signature`](Self::signature).
    ///
    /// Returns freshly allocated output buffers in declared order.
    fn execute(&self, inputs: Vec<TensorBuffer>) -> Result<Vec<TensorBuffer>, RuntimeError>;
}

/// An external execution engine bound to a device.
pub trait ExecutionEngine: Send + Sync {
    /// Short engine name for logs and reports.
    fn name(&self) -> &'static str;

    /// The device this engine executes on.
    fn device(&self) -> Device;

    /// Compiles a package into an executable. Called once per model.
    fn compile(
        &self,
        package: &ModelPackage,
        options: &CompilationOptions,
    ) -> Result<Arc<dyn Executable>, RuntimeError>;
}

/// Creates the named engine for `device`.
///
/// Fails with [`RuntimeError::DeviceUnavailable`] when the engine cannot
/// reach the device, and [`RuntimeError::Config`] for unknown engine names
/// or engines not compiled into this build.
pub fn create_engine(name: &str, device: Device) -> Result<Box<dyn ExecutionEngine>, RuntimeError> {
    let engine: Box<dyn ExecutionEngine> = match name.to_lowercase().as_str() {
        "reference" | "ref" => Box::new(ReferenceEngine::new(device)?),
        #[cfg(feature = "onnx")]
        "onnx" | "ort" | "onnxruntime" => Box::new(OnnxEngine::new(device)?),
        #[cfg(not(feature = "onnx"))]
        "onnx" | "ort" | "onnxruntime" => {
            return Err(RuntimeError::Config(
                "the onnx engine requires building with the `onnx` feature".into(),
            ))
        }
        other => {
            return Err(RuntimeError::Config(format!(
                "unknown engine '{other}'; expected one of {ENGINES:?}"
            )))
        }
    };
    tracing::info!("engine '{}' created on {}", engine.name(), engine.device());
    Ok(engine)
}
