// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for package resolution and manifest parsing.

/// Errors that can occur when locating or reading a model package.
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    /// Nothing exists at the package path.
    #[error("model package not found: {path}")]
    NotFound { path: String },

    /// The path exists but holds no recognised package layout.
    #[error("unrecognised package layout at {path}: expected model.json or model.onnx")]
    UnrecognisedLayout { path: String },

    /// A package file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },

    /// The manifest JSON is malformed.
    #[error("failed to parse manifest: {0}")]
    ManifestParseError(#[from] serde_json::Error),

    /// The manifest parsed but declares something unusable.
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// The constant tensor file is malformed or holds an unsupported tensor.
    #[error("invalid constants file: {0}")]
    ConstantsError(String),
}
