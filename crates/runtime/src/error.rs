// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for loading, running and measuring inference.

use model_package::PackageError;
use tensor_core::DType;

/// Errors that can occur while loading a model or running inference.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The model package path does not resolve to anything.
    #[error("resource not found: {path}")]
    ResourceNotFound { path: String },

    /// The package is malformed or incompatible with the engine.
    #[error("compilation failed: {0}")]
    Compilation(String),

    /// No compatible device for the requested engine.
    #[error("device '{device}' unavailable: {detail}")]
    DeviceUnavailable { device: String, detail: String },

    /// Wrong number of inputs for the model.
    #[error("expected {expected} inputs, got {actual}")]
    InputCountMismatch { expected: usize, actual: usize },

    /// An input's shape disagrees with its declaration.
    #[error("input '{input}' has shape {actual}, expected {expected}")]
    InputShapeMismatch {
        input: String,
        expected: String,
        actual: String,
    },

    /// An input's dtype disagrees with its declaration.
    #[error("input '{input}' has dtype {actual}, expected {expected}")]
    InputDTypeMismatch {
        input: String,
        expected: DType,
        actual: DType,
    },

    /// A named input matches no declared input.
    #[error("unknown input '{name}'")]
    UnknownInput { name: String },

    /// A named input was supplied more than once.
    #[error("input '{name}' supplied more than once")]
    DuplicateInput { name: String },

    /// The engine failed while executing.
    #[error("execution failed: {0}")]
    Execution(String),

    /// Buffer encoding or decoding failed.
    #[error("tensor error: {0}")]
    Tensor(#[from] tensor_core::TensorError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<PackageError> for RuntimeError {
    fn from(err: PackageError) -> Self {
        match err {
            PackageError::NotFound { path } => RuntimeError::ResourceNotFound { path },
            other => RuntimeError::Compilation(other.to_string()),
        }
    }
}

/// Errors from summarising collected metrics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetricsError {
    /// No inference has been recorded yet.
    #[error("no inference samples recorded")]
    NoSamples,
}
