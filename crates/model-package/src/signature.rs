// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Typed input/output signatures of a compiled model.

use std::fmt;
use tensor_core::{DType, Shape};

/// The declared name, dtype and dimensions of one model input or output.
///
/// A `None` dimension is dynamic and matches any size at call time.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TensorSpec {
    pub name: String,
    pub dtype: DType,
    pub dims: Vec<Option<usize>>,
}

impl TensorSpec {
    /// Returns the declared rank.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns `true` if any dimension is dynamic.
    pub fn is_dynamic(&self) -> bool {
        self.dims.iter().any(Option::is_none)
    }

    /// Returns the concrete shape if every dimension is static.
    pub fn static_shape(&self) -> Option<Shape> {
        self.dims
            .iter()
            .copied()
            .collect::<Option<Vec<usize>>>()
            .map(Shape::new)
    }

    /// Returns `true` if a buffer of `shape` fits this declaration:
    /// same rank, and every static dimension equal.
    pub fn accepts(&self, shape: &Shape) -> bool {
        shape.rank() == self.rank()
            && self
                .dims
                .iter()
                .zip(shape.dims())
                .all(|(declared, actual)| declared.map_or(true, |d| d == *actual))
    }

    /// Formats the dimensions with `?` for dynamic entries, e.g. `[?, 7]`.
    pub fn dims_label(&self) -> String {
        let parts: Vec<String> = self
            .dims
            .iter()
            .map(|d| d.map_or_else(|| "?".to_string(), |n| n.to_string()))
            .collect();
        format!("[{}]", parts.join(", "))
    }
}

impl fmt::Display for TensorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.name, self.dtype, self.dims_label())
    }
}

/// Ordered input and output declarations of a model.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ModelSignature {
    pub inputs: Vec<TensorSpec>,
    pub outputs: Vec<TensorSpec>,
}

impl ModelSignature {
    /// Returns the position of the named input in declared order.
    pub fn input_index(&self, name: &str) -> Option<usize> {
        self.inputs.iter().position(|s| s.name == name)
    }

    /// Returns `true` if any input or output has a dynamic dimension.
    pub fn is_dynamic(&self) -> bool {
        self.inputs
            .iter()
            .chain(self.outputs.iter())
            .any(TensorSpec::is_dynamic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(dims: Vec<Option<usize>>) -> TensorSpec {
        named("x", DType::F32, dims)
    }

    fn named(name: &str, dtype: DType, dims: Vec<Option<usize>>) -> TensorSpec {
        TensorSpec {
            name: name.into(),
            dtype,
            dims,
        }
    }

    #[test]
    fn test_accepts_static() {
        let s = spec(vec![Some(1), Some(3), Some(480), Some(640)]);
        assert!(s.accepts(&Shape::from([1, 3, 480, 640])));
        assert!(!s.accepts(&Shape::from([1, 3, 640, 640])));
        assert!(!s.accepts(&Shape::from([3, 480, 640])));
    }

    #[test]
    fn test_accepts_dynamic() {
        let s = spec(vec![None, Some(7)]);
        assert!(s.accepts(&Shape::matrix(2, 7)));
        assert!(s.accepts(&Shape::matrix(16, 7)));
        assert!(!s.accepts(&Shape::matrix(2, 8)));
        assert!(!s.accepts(&Shape::vector(7)));
    }

    #[test]
    fn test_static_shape() {
        assert_eq!(spec(vec![Some(2), Some(7)]).static_shape(), Some(Shape::matrix(2, 7)));
        assert_eq!(spec(vec![None, Some(7)]).static_shape(), None);
    }

    #[test]
    fn test_labels() {
        let s = spec(vec![None, Some(7)]);
        assert_eq!(s.dims_label(), "[?, 7]");
        assert_eq!(s.to_string(), "x: float32 [?, 7]");
    }

    #[test]
    fn test_signature_lookup() {
        let sig = ModelSignature {
            inputs: vec![
                named("input_ids", DType::I64, vec![Some(2), Some(7)]),
                named("attention_mask", DType::I64, vec![Some(2), Some(7)]),
            ],
            outputs: vec![spec(vec![None])],
        };
        assert_eq!(sig.input_index("attention_mask"), Some(1));
        assert_eq!(sig.input_index("token_type_ids"), None);
        assert!(sig.is_dynamic());
    }
}
