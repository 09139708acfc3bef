// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for tensor buffer conversion.

use crate::{DType, Shape};

/// Errors that can occur when converting between host arrays and buffers.
#[derive(Debug, thiserror::Error)]
pub enum TensorError {
    /// The number of values does not equal the product of the shape.
    #[error("shape mismatch: shape {shape} holds {expected} elements, got {actual} values")]
    ShapeMismatch {
        shape: Shape,
        expected: usize,
        actual: usize,
    },

    /// The shape's byte size does not fit in memory addresses.
    #[error("shape {shape} of {dtype} is too large to allocate")]
    ShapeOverflow { shape: Shape, dtype: DType },

    /// The provided byte buffer does not match the size implied by shape and dtype.
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// The buffer holds a different element type than the one requested.
    #[error("dtype mismatch on '{name}': buffer holds {actual}, requested {requested}")]
    DTypeMismatch {
        name: String,
        actual: DType,
        requested: DType,
    },
}
