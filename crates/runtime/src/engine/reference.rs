// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Host-only engine that honours a manifest's signature without doing any
//! tensor math.
//!
//! Each output is either zero-filled or, when `model.safetensors` holds a
//! tensor with the output's name, a copy of that constant. This makes the
//! whole load → run → measure → report path runnable on any machine.

use super::{Device, Executable, ExecutionEngine};
use crate::RuntimeError;
use model_package::{
    CompilationOptions, ModelPackage, ModelSignature, PackageConstants, Precision, ShapeMode,
    TensorSpec,
};
use std::sync::Arc;
use tensor_core::TensorBuffer;

/// The reference engine. See the module docs.
#[derive(Debug, Default)]
pub struct ReferenceEngine;

impl ReferenceEngine {
    /// Creates the engine. Only [`Device::Cpu`] is available.
    pub fn new(device: Device) -> Result<Self, RuntimeError> {
        match device {
            Device::Cpu => Ok(Self),
            Device::Gpu { .. } => Err(RuntimeError::DeviceUnavailable {
                device: device.to_string(),
                detail: "the reference engine executes on the host CPU only".into(),
            }),
        }
    }
}

impl ExecutionEngine for ReferenceEngine {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn device(&self) -> Device {
        Device::Cpu
    }

    fn compile(
        &self,
        package: &ModelPackage,
        options: &CompilationOptions,
    ) -> Result<Arc<dyn Executable>, RuntimeError> {
        let manifest = package.read_manifest()?;
        let signature = manifest.signature()?;

        if options.shape_mode == ShapeMode::Fixed {
            if let Some(spec) = signature.inputs.iter().find(|s| s.is_dynamic()) {
                return Err(RuntimeError::Compilation(format!(
                    "input '{}' has dynamic shape {} but shape_mode is fixed",
                    spec.name,
                    spec.dims_label()
                )));
            }
        }
        if options.precision == Precision::Float16 {
            tracing::warn!("reference engine ignores float16 precision; outputs stay as declared");
        }

        let constants = package.open_constants()?;
        let outputs = signature
            .outputs
            .iter()
            .map(|spec| output_template(spec, constants.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            "compiled '{}' ({} inputs, {} outputs, {} constant)",
            manifest.name,
            signature.inputs.len(),
            signature.outputs.len(),
            constants
                .as_ref()
                .map_or(0, |c| signature.outputs.iter().filter(|s| c.contains(&s.name)).count()),
        );

        Ok(Arc::new(ReferenceExecutable { signature, outputs }))
    }
}

/// Builds the buffer an output will be copied from on every call.
fn output_template(
    spec: &TensorSpec,
    constants: Option<&PackageConstants>,
) -> Result<TensorBuffer, RuntimeError> {
    let shape = spec.static_shape().ok_or_else(|| {
        RuntimeError::Compilation(format!(
            "output '{}' has dynamic shape {}; the reference engine needs static outputs",
            spec.name,
            spec.dims_label()
        ))
    })?;

    let constant = match constants {
        Some(c) => c.get(&spec.name)?,
        None => None,
    };

    match constant {
        Some(buffer) => {
            if buffer.dtype() != spec.dtype || buffer.shape() != &shape {
                return Err(RuntimeError::Compilation(format!(
                    "constant '{}' is {} {} but the output is declared {} {}",
                    spec.name,
                    buffer.dtype(),
                    buffer.shape(),
                    spec.dtype,
                    shape
                )));
            }
            Ok(buffer)
        }
        None => Ok(TensorBuffer::zeros(&spec.name, shape, spec.dtype)),
    }
}

struct ReferenceExecutable {
    signature: ModelSignature,
    outputs: Vec<TensorBuffer>,
}

impl Executable for ReferenceExecutable {
    fn signature(&self) -> &ModelSignature {
        &self.signature
    }

    fn execute(&self, inputs: Vec<TensorBuffer>) -> Result<Vec<TensorBuffer>, RuntimeError> {
        if inputs.len() != self.signature.inputs.len() {
            return Err(RuntimeError::InputCountMismatch {
                expected: self.signature.inputs.len(),
                actual: inputs.len(),
            });
        }
        Ok(self.outputs.clone())
    }
}
