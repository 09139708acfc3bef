// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JSON package manifest parsing.
//!
//! The manifest (`model.json`) declares the model's inputs and outputs in
//! the order the executable expects them.
//!
//! # Format
//! ```json
//! {
//!   "name": "all-MiniLM-L6-v2",
//!   "format_version": 1,
//!   "inputs": [
//!     { "name": "input_ids",      "dtype": "int64", "shape": [2, 7] },
//!     { "name": "attention_mask", "dtype": "int64", "shape": [2, 7] },
//!     { "name": "token_type_ids", "dtype": "int64", "shape": [2, 7] }
//!   ],
//!   "outputs": [
//!     { "name": "last_hidden_state", "dtype": "float32", "shape": [2, 7, 384] }
//!   ]
//! }
//! ```
//!
//! A dimension may be written as `null` or as a symbolic name such as
//! `"batch"`; both declare it dynamic.

use crate::{ModelSignature, PackageError, TensorSpec};
use std::collections::HashSet;
use std::path::Path;
use tensor_core::{DType, Shape};

/// Current manifest format version.
pub const FORMAT_VERSION: u32 = 1;

/// Top-level package manifest, deserialized from `model.json`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PackageManifest {
    /// Human-readable model name (e.g., `"yolov8n"`).
    pub name: String,
    /// Manifest format version.
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declared inputs, in executable order.
    pub inputs: Vec<TensorDecl>,
    /// Declared outputs, in executable order.
    pub outputs: Vec<TensorDecl>,
}

fn default_format_version() -> u32 {
    FORMAT_VERSION
}

/// A single input or output declaration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TensorDecl {
    /// Tensor name as known to the executable.
    pub name: String,
    /// Element type label (`"float32"`, `"int32"`, `"int64"`).
    pub dtype: String,
    /// Dimensions; see [`DimDecl`].
    pub shape: Vec<DimDecl>,
}

/// A declared dimension.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum DimDecl {
    /// A concrete size.
    Fixed(usize),
    /// A symbolic, dynamic size (e.g., `"batch"`).
    Symbolic(String),
    /// `null`: a dynamic size with no name.
    Unknown,
}

impl DimDecl {
    fn resolve(&self) -> Option<usize> {
        match self {
            DimDecl::Fixed(n) => Some(*n),
            DimDecl::Symbolic(_) | DimDecl::Unknown => None,
        }
    }
}

impl PackageManifest {
    /// Loads a manifest from a JSON file path.
    pub fn from_file(path: &Path) -> Result<Self, PackageError> {
        let content = std::fs::read_to_string(path).map_err(|e| PackageError::ReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// Parses a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, PackageError> {
        let manifest: Self = serde_json::from_str(json)?;
        Ok(manifest)
    }

    /// Serialises the manifest to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, PackageError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validates the manifest and converts it into a [`ModelSignature`].
    ///
    /// Checks:
    /// - The format version is supported.
    /// - At least one input and one output are declared.
    /// - Every dtype label is recognised.
    /// - No duplicate names within inputs or within outputs.
    /// - No concrete dimension is zero.
    /// - The concrete dimensions fit in addressable memory.
    pub fn signature(&self) -> Result<ModelSignature, PackageError> {
        if self.format_version > FORMAT_VERSION {
            return Err(PackageError::InvalidManifest(format!(
                "format_version {} is newer than supported version {FORMAT_VERSION}",
                self.format_version
            )));
        }
        if self.inputs.is_empty() {
            return Err(PackageError::InvalidManifest(format!(
                "'{}' declares no inputs",
                self.name
            )));
        }
        if self.outputs.is_empty() {
            return Err(PackageError::InvalidManifest(format!(
                "'{}' declares no outputs",
                self.name
            )));
        }

        let inputs = convert_decls("input", &self.inputs)?;
        let outputs = convert_decls("output", &self.outputs)?;
        Ok(ModelSignature { inputs, outputs })
    }
}

fn convert_decls(kind: &str, decls: &[TensorDecl]) -> Result<Vec<TensorSpec>, PackageError> {
    let mut seen = HashSet::new();
    let mut specs = Vec::with_capacity(decls.len());

    for decl in decls {
        if !seen.insert(decl.name.as_str()) {
            return Err(PackageError::InvalidManifest(format!(
                "duplicate {kind} name '{}'",
                decl.name
            )));
        }

        let dtype = DType::parse(&decl.dtype).ok_or_else(|| {
            PackageError::InvalidManifest(format!(
                "{kind} '{}' has unsupported dtype '{}'",
                decl.name, decl.dtype
            ))
        })?;

        let dims: Vec<Option<usize>> = decl.shape.iter().map(DimDecl::resolve).collect();
        if dims.iter().any(|d| *d == Some(0)) {
            return Err(PackageError::InvalidManifest(format!(
                "{kind} '{}' has a zero-sized dimension",
                decl.name
            )));
        }
        let concrete = Shape::new(dims.iter().flatten().copied().collect());
        if concrete.checked_size_bytes(dtype).is_none() {
            return Err(PackageError::InvalidManifest(format!(
                "{kind} '{}' with shape {concrete} of {dtype} is too large",
                decl.name
            )));
        }

        specs.push(TensorSpec {
            name: decl.name.clone(),
            dtype,
            dims,
        });
    }

    Ok(specs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nlp_manifest_json() -> &'static str {
        r#"{
            "name": "minilm",
            "inputs": [
                { "name": "input_ids", "dtype": "int64", "shape": [2, 7] },
                { "name": "attention_mask", "dtype": "int64", "shape": [2, 7] },
                { "name": "token_type_ids", "dtype": "int64", "shape": ["batch", null] }
            ],
            "outputs": [
                { "name": "last_hidden_state", "dtype": "float32", "shape": [2, 7, 384] }
            ]
        }"#
    }

    #[test]
    fn test_parse_manifest() {
        let m = PackageManifest::from_json(nlp_manifest_json()).unwrap();
        assert_eq!(m.name, "minilm");
        assert_eq!(m.format_version, FORMAT_VERSION);
        assert_eq!(m.inputs.len(), 3);
        assert_eq!(m.inputs[2].shape[0], DimDecl::Symbolic("batch".into()));
        assert_eq!(m.inputs[2].shape[1], DimDecl::Unknown);
    }

    #[test]
    fn test_signature() {
        let sig = PackageManifest::from_json(nlp_manifest_json())
            .unwrap()
            .signature()
            .unwrap();
        assert_eq!(sig.inputs.len(), 3);
        assert_eq!(sig.inputs[0].dtype, DType::I64);
        assert_eq!(sig.inputs[0].dims, vec![Some(2), Some(7)]);
        assert_eq!(sig.inputs[2].dims, vec![None, None]);
        assert_eq!(sig.outputs[0].dtype, DType::F32);
    }

    #[test]
    fn test_no_outputs() {
        let json = r#"{ "name": "m", "inputs": [{ "name": "x", "dtype": "float32", "shape": [1] }], "outputs": [] }"#;
        let result = PackageManifest::from_json(json).unwrap().signature();
        assert!(matches!(result, Err(PackageError::InvalidManifest(_))));
    }

    #[test]
    fn test_bad_dtype() {
        let json = r#"{ "name": "m",
            "inputs": [{ "name": "x", "dtype": "float16", "shape": [1] }],
            "outputs": [{ "name": "y", "dtype": "float32", "shape": [1] }] }"#;
        let err = PackageManifest::from_json(json).unwrap().signature().unwrap_err();
        assert!(err.to_string().contains("float16"));
    }

    #[test]
    fn test_duplicate_input() {
        let json = r#"{ "name": "m",
            "inputs": [
                { "name": "x", "dtype": "float32", "shape": [1] },
                { "name": "x", "dtype": "float32", "shape": [1] }
            ],
            "outputs": [{ "name": "y", "dtype": "float32", "shape": [1] }] }"#;
        let err = PackageManifest::from_json(json).unwrap().signature().unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_zero_dim() {
        let json = r#"{ "name": "m",
            "inputs": [{ "name": "x", "dtype": "float32", "shape": [0, 3] }],
            "outputs": [{ "name": "y", "dtype": "float32", "shape": [1] }] }"#;
        assert!(PackageManifest::from_json(json).unwrap().signature().is_err());
    }

    #[test]
    fn test_overflowing_dims() {
        let json = r#"{ "name": "m",
            "inputs": [{ "name": "x", "dtype": "float32", "shape": [1] }],
            "outputs": [{ "name": "y", "dtype": "float32",
                          "shape": [4294967296, 4294967296, 16] }] }"#;
        let err = PackageManifest::from_json(json).unwrap().signature().unwrap_err();
        assert!(matches!(err, PackageError::InvalidManifest(_)));
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_future_version() {
        let json = r#"{ "name": "m", "format_version": 99,
            "inputs": [{ "name": "x", "dtype": "float32", "shape": [1] }],
            "outputs": [{ "name": "y", "dtype": "float32", "shape": [1] }] }"#;
        assert!(PackageManifest::from_json(json).unwrap().signature().is_err());
    }

    #[test]
    fn test_malformed_json() {
        let result = PackageManifest::from_json("{ not json");
        assert!(matches!(result, Err(PackageError::ManifestParseError(_))));
    }

    #[test]
    fn test_json_roundtrip() {
        let m = PackageManifest::from_json(nlp_manifest_json()).unwrap();
        let back = PackageManifest::from_json(&m.to_json().unwrap()).unwrap();
        assert_eq!(back.name, m.name);
        assert_eq!(back.inputs[2].shape, m.inputs[2].shape);
    }
}
