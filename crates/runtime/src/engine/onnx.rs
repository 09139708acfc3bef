// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! ONNX Runtime engine (feature `onnx`).
//!
//! Packages are a `model.onnx` file or a directory containing one. If the
//! directory also holds a `model.json`, its declared input shapes pin any
//! dimensions the graph leaves symbolic, which lets `shape_mode = "fixed"`
//! work with graphs exported with dynamic batch or sequence axes.

use super::{Device, Executable, ExecutionEngine};
use crate::RuntimeError;
use model_package::{
    CompilationOptions, ModelPackage, ModelSignature, OptimizationLevel, Precision, ShapeMode,
    TensorSpec,
};
use ort::{
    session::{
        builder::{GraphOptimizationLevel, SessionBuilder},
        Session, SessionInputValue,
    },
    tensor::TensorElementType,
    value::{DynValue, ValueRef, ValueType},
};
use std::sync::{Arc, Mutex};
use tensor_core::{DType, Shape, TensorBuffer};

/// The ONNX Runtime engine.
#[derive(Debug)]
pub struct OnnxEngine {
    device: Device,
}

impl OnnxEngine {
    /// Creates the engine, failing if `device` cannot be used on this host.
    ///
    /// For GPUs this asks ONNX Runtime whether the CUDA execution provider
    /// can be loaded, so a missing driver fails here and not at compile time.
    pub fn new(device: Device) -> Result<Self, RuntimeError> {
        ensure_device(device, cuda_available)?;
        Ok(Self { device })
    }
}

fn ensure_device(
    device: Device,
    available: impl FnOnce() -> Result<bool, String>,
) -> Result<(), RuntimeError> {
    if device == Device::Cpu {
        return Ok(());
    }
    let detail = match available() {
        Ok(true) => return Ok(()),
        Ok(false) => "the CUDA execution provider is not available on this host".to_string(),
        Err(detail) => detail,
    };
    Err(RuntimeError::DeviceUnavailable {
        device: device.to_string(),
        detail,
    })
}

#[cfg(feature = "cuda")]
fn cuda_available() -> Result<bool, String> {
    use ort::execution_providers::{cuda::CUDAExecutionProvider, ExecutionProvider};
    CUDAExecutionProvider::default()
        .is_available()
        .map_err(|e| e.to_string())
}

#[cfg(not(feature = "cuda"))]
fn cuda_available() -> Result<bool, String> {
    Err("built without the `cuda` feature".into())
}

impl ExecutionEngine for OnnxEngine {
    fn name(&self) -> &'static str {
        "onnx"
    }

    fn device(&self) -> Device {
        self.device
    }

    fn compile(
        &self,
        package: &ModelPackage,
        options: &CompilationOptions,
    ) -> Result<Arc<dyn Executable>, RuntimeError> {
        let path = package.onnx_path().ok_or_else(|| {
            RuntimeError::Compilation(format!(
                "package '{}' has no model.onnx",
                package.path().display()
            ))
        })?;

        if options.precision == Precision::Float16 {
            return Err(RuntimeError::Compilation(
                "the onnx engine does not support float16 precision".into(),
            ));
        }

        let level = match options.optimization_level {
            OptimizationLevel::None => GraphOptimizationLevel::Disable,
            OptimizationLevel::Basic => GraphOptimizationLevel::Level1,
            OptimizationLevel::Full => GraphOptimizationLevel::Level3,
        };

        let builder = Session::builder()
            .map_err(|e| RuntimeError::Compilation(format!("session builder: {e}")))?
            .with_optimization_level(level)
            .map_err(|e| RuntimeError::Compilation(format!("optimisation level: {e}")))?;
        let builder = configure_device(builder, self.device)?;
        let session = builder
            .commit_from_file(path)
            .map_err(|e| RuntimeError::Compilation(format!("{}: {e}", path.display())))?;

        let mut signature = session_signature(&session)?;
        if package.manifest_path().is_some() {
            let declared = package.read_manifest()?.signature()?;
            pin_dims(&mut signature, &declared);
        }

        if options.shape_mode == ShapeMode::Fixed {
            if let Some(spec) = signature.inputs.iter().find(|s| s.is_dynamic()) {
                return Err(RuntimeError::Compilation(format!(
                    "input '{}' has dynamic shape {}; use shape_mode = \"dynamic\" or declare it in model.json",
                    spec.name,
                    spec.dims_label()
                )));
            }
        }

        tracing::info!(
            "compiled {} with onnxruntime ({} inputs, {} outputs, {})",
            path.display(),
            signature.inputs.len(),
            signature.outputs.len(),
            options.summary()
        );

        Ok(Arc::new(OnnxExecutable {
            signature,
            session: Mutex::new(session),
        }))
    }
}

fn configure_device(builder: SessionBuilder, device: Device) -> Result<SessionBuilder, RuntimeError> {
    match device {
        Device::Cpu => Ok(builder),
        Device::Gpu { device_id } => configure_cuda(builder, device_id),
    }
}

fn configure_cuda(builder: SessionBuilder, device_id: u32) -> Result<SessionBuilder, RuntimeError> {
    #[cfg(feature = "cuda")]
    {
        use ort::execution_providers::cuda::CUDAExecutionProvider;
        let ep = CUDAExecutionProvider::default()
            .with_device_id(device_id as i32)
            .build()
            .error_on_failure();
        builder
            .with_execution_providers([ep])
            .map_err(|e| RuntimeError::DeviceUnavailable {
                device: format!("gpu:{device_id}"),
                detail: e.to_string(),
            })
    }
    #[cfg(not(feature = "cuda"))]
    {
        let _ = builder;
        Err(RuntimeError::DeviceUnavailable {
            device: format!("gpu:{device_id}"),
            detail: "built without the `cuda` feature".into(),
        })
    }
}

fn session_signature(session: &Session) -> Result<ModelSignature, RuntimeError> {
    let inputs = session
        .inputs
        .iter()
        .map(|input| spec_from_value_type(&input.name, &input.input_type))
        .collect::<Result<Vec<_>, _>>()?;
    let outputs = session
        .outputs
        .iter()
        .map(|output| spec_from_value_type(&output.name, &output.output_type))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ModelSignature { inputs, outputs })
}

fn spec_from_value_type(name: &str, value_type: &ValueType) -> Result<TensorSpec, RuntimeError> {
    let ValueType::Tensor { ty, shape, .. } = value_type else {
        return Err(RuntimeError::Compilation(format!("'{name}' is not a tensor")));
    };
    let dtype = dtype_from_ort(*ty)
        .ok_or_else(|| RuntimeError::Compilation(format!("'{name}' has unsupported type {ty:?}")))?;
    let dims = shape
        .iter()
        .map(|d| if *d < 0 { None } else { Some(*d as usize) })
        .collect();
    Ok(TensorSpec {
        name: name.to_string(),
        dtype,
        dims,
    })
}

/// Fills dynamic input dims from declarations with the same name and rank.
fn pin_dims(signature: &mut ModelSignature, declared: &ModelSignature) {
    for spec in &mut signature.inputs {
        let Some(decl) = declared.inputs.iter().find(|d| d.name == spec.name) else {
            continue;
        };
        if decl.rank() != spec.rank() {
            tracing::warn!(
                "model.json declares '{}' as {}, graph has {}; ignoring declaration",
                spec.name,
                decl.dims_label(),
                spec.dims_label()
            );
            continue;
        }
        for (dim, pinned) in spec.dims.iter_mut().zip(&decl.dims) {
            if dim.is_none() {
                *dim = *pinned;
            }
        }
    }
}

fn dtype_from_ort(ty: TensorElementType) -> Option<DType> {
    match ty {
        TensorElementType::Float32 => Some(DType::F32),
        TensorElementType::Int64 => Some(DType::I64),
        TensorElementType::Int32 => Some(DType::I32),
        _ => None,
    }
}

struct OnnxExecutable {
    signature: ModelSignature,
    // `Session::run` needs exclusive access.
    session: Mutex<Session>,
}

impl Executable for OnnxExecutable {
    fn signature(&self) -> &ModelSignature {
        &self.signature
    }

    fn execute(&self, inputs: Vec<TensorBuffer>) -> Result<Vec<TensorBuffer>, RuntimeError> {
        let mut ort_inputs = Vec::with_capacity(inputs.len());
        for input in inputs {
            let name = input.name().to_string();
            ort_inputs.push((name, SessionInputValue::from(buffer_to_value(&input)?)));
        }

        let mut session = self
            .session
            .lock()
            .map_err(|_| RuntimeError::Execution("session lock poisoned".into()))?;
        let outputs = session
            .run(ort_inputs)
            .map_err(|e| RuntimeError::Execution(e.to_string()))?;

        let mut buffers = Vec::with_capacity(outputs.len());
        for (name, value) in outputs.iter() {
            buffers.push(value_to_buffer(name, &value)?);
        }
        Ok(buffers)
    }
}

fn buffer_to_value(buffer: &TensorBuffer) -> Result<DynValue, RuntimeError> {
    let shape: Vec<usize> = buffer.shape().dims().to_vec();
    let to_err = |e: ort::Error| RuntimeError::Execution(format!("input '{}': {e}", buffer.name()));
    let value = match buffer.dtype() {
        DType::F32 => ort::value::Tensor::from_array((shape, buffer.decode::<f32>()?))
            .map_err(to_err)?
            .into_dyn(),
        DType::I64 => ort::value::Tensor::from_array((shape, buffer.decode::<i64>()?))
            .map_err(to_err)?
            .into_dyn(),
        DType::I32 => ort::value::Tensor::from_array((shape, buffer.decode::<i32>()?))
            .map_err(to_err)?
            .into_dyn(),
    };
    Ok(value)
}

fn value_to_buffer(name: &str, value: &ValueRef<'_>) -> Result<TensorBuffer, RuntimeError> {
    let ValueType::Tensor { ty, shape, .. } = value.dtype() else {
        return Err(RuntimeError::Execution(format!("output '{name}' is not a tensor")));
    };
    let shape = Shape::new(shape.iter().map(|d| *d as usize).collect());
    let to_err = |e: ort::Error| RuntimeError::Execution(format!("output '{name}': {e}"));
    let non_contiguous = || RuntimeError::Execution(format!("output '{name}' is not contiguous"));

    let buffer = match *ty {
        TensorElementType::Float32 => {
            let array = value.try_extract_array::<f32>().map_err(to_err)?;
            TensorBuffer::encode(name, array.as_slice().ok_or_else(non_contiguous)?, shape)?
        }
        TensorElementType::Int64 => {
            let array = value.try_extract_array::<i64>().map_err(to_err)?;
            TensorBuffer::encode(name, array.as_slice().ok_or_else(non_contiguous)?, shape)?
        }
        TensorElementType::Int32 => {
            let array = value.try_extract_array::<i32>().map_err(to_err)?;
            TensorBuffer::encode(name, array.as_slice().ok_or_else(non_contiguous)?, shape)?
        }
        other => {
            return Err(RuntimeError::Execution(format!(
                "output '{name}' has unsupported type {other:?}"
            )))
        }
    };
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, dims: Vec<Option<usize>>) -> TensorSpec {
        TensorSpec {
            name: name.into(),
            dtype: DType::I64,
            dims,
        }
    }

    #[test]
    fn test_cpu_skips_availability_check() {
        let checked = std::cell::Cell::new(false);
        ensure_device(Device::Cpu, || {
            checked.set(true);
            Ok(false)
        })
        .unwrap();
        assert!(!checked.get());
    }

    #[test]
    fn test_unusable_gpu_rejected() {
        let gpu = Device::Gpu { device_id: 0 };
        assert!(ensure_device(gpu, || Ok(true)).is_ok());

        let err = ensure_device(gpu, || Ok(false)).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::DeviceUnavailable { ref device, .. } if device == "gpu:0"
        ));

        let err = ensure_device(gpu, || Err("libcudart.so not found".into())).unwrap_err();
        assert!(err.to_string().contains("libcudart.so"));
    }

    #[test]
    fn test_pin_dims() {
        let mut graph = ModelSignature {
            inputs: vec![
                spec("input_ids", vec![None, None]),
                spec("attention_mask", vec![None, None]),
            ],
            outputs: vec![],
        };
        let declared = ModelSignature {
            inputs: vec![
                spec("input_ids", vec![Some(2), Some(7)]),
                spec("attention_mask", vec![Some(2)]),
            ],
            outputs: vec![],
        };
        pin_dims(&mut graph, &declared);
        assert_eq!(graph.inputs[0].dims, vec![Some(2), Some(7)]);
        assert_eq!(graph.inputs[1].dims, vec![None, None]);
    }

    #[test]
    fn test_gpu_without_cuda_feature() {
        let result = OnnxEngine::new(Device::Gpu { device_id: 0 });
        if cfg!(feature = "cuda") {
            assert!(result.is_ok());
        } else {
            assert!(matches!(result, Err(RuntimeError::DeviceUnavailable { .. })));
        }
    }

    #[test]
    fn test_missing_onnx_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("model.json"),
            r#"{ "name": "m",
                "inputs":  [{ "name": "x", "dtype": "float32", "shape": [1] }],
                "outputs": [{ "name": "y", "dtype": "float32", "shape": [1] }] }"#,
        )
        .unwrap();
        let pkg = ModelPackage::resolve(dir.path()).unwrap();
        let engine = OnnxEngine::new(Device::Cpu).unwrap();
        let result = engine.compile(&pkg, &CompilationOptions::default());
        assert!(matches!(result, Err(RuntimeError::Compilation(_))));
    }
}
