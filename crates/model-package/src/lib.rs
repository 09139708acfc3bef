// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-package
//!
//! Everything the harness knows about a model *before* an execution engine
//! compiles it:
//!
//! - [`ModelPackage`]: resolves a path on disk into a recognised package
//!   layout, failing with [`PackageError::NotFound`] when nothing is there.
//! - [`PackageManifest`]: the JSON descriptor (`model.json`) declaring the
//!   model's inputs and outputs.
//! - [`ModelSignature`] / [`TensorSpec`]: the validated, typed view of those
//!   declarations. Dimensions may be dynamic.
//! - [`CompilationOptions`]: the descriptor handed to the engine's compile
//!   step (optimisation level, precision, fixed vs dynamic shapes).
//! - [`PackageConstants`]: memory-mapped constant tensors stored alongside
//!   the manifest in `model.safetensors`.
//!
//! The package *format* is owned by the execution engine; this crate only
//! locates files and reads the descriptor.
//!
//! # Supported Layouts
//! ```text
//! yolov8.pkg/                  resnet.onnx
//! ├── model.json               (single ONNX file)
//! └── model.safetensors   (optional)
//!
//! minilm/
//! └── model.onnx
//! ```
//!
//! # Example
//! ```no_run
//! use model_package::ModelPackage;
//! use std::path::Path;
//!
//! let package = ModelPackage::resolve(Path::new("./models/yolov8")).unwrap();
//! let signature = package.read_manifest().unwrap().signature().unwrap();
//! println!("{} inputs, {} outputs", signature.inputs.len(), signature.outputs.len());
//! ```

mod constants;
mod error;
mod manifest;
mod options;
mod package;
mod signature;

pub use constants::PackageConstants;
pub use error::PackageError;
pub use manifest::{DimDecl, PackageManifest, TensorDecl};
pub use options::{CompilationOptions, OptimizationLevel, Precision, ShapeMode};
pub use package::{ModelPackage, PackageFormat};
pub use signature::{ModelSignature, TensorSpec};
