// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The tensor buffer value type and its host-array codec.

use crate::{DType, Element, Shape, TensorError};

/// A named, typed, shaped block of contiguous elements.
///
/// `TensorBuffer` is the unit of exchange with an execution engine: inputs
/// are encoded from host arrays, outputs are decoded back into them.
///
/// # Invariants
/// - `byte_len() == num_elements() * dtype().size_bytes()`
/// - `num_elements() == shape().num_elements()`
///
/// The byte storage is private, so the invariants cannot be broken after
/// construction. A buffer is owned by whoever holds it; the engine never
/// retains a reference after a call returns.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorBuffer {
    name: String,
    shape: Shape,
    dtype: DType,
    data: Vec<u8>,
}

impl TensorBuffer {
    /// Encodes a host array into a buffer.
    ///
    /// Fails with [`TensorError::ShapeMismatch`] if `values.len()` differs
    /// from the number of elements implied by `shape`.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{DType, Shape, TensorBuffer};
    /// let t = TensorBuffer::encode("x", &[1.0f32, 2.0, 3.0, 4.0], Shape::matrix(2, 2)).unwrap();
    /// assert_eq!(t.dtype(), DType::F32);
    /// assert_eq!(t.byte_len(), 16);
    /// ```
    pub fn encode<T: Element>(
        name: impl Into<String>,
        values: &[T],
        shape: Shape,
    ) -> Result<Self, TensorError> {
        if shape.checked_size_bytes(T::DTYPE).is_none() {
            return Err(TensorError::ShapeOverflow {
                shape,
                dtype: T::DTYPE,
            });
        }
        let expected = shape.num_elements();
        if values.len() != expected {
            return Err(TensorError::ShapeMismatch {
                shape,
                expected,
                actual: values.len(),
            });
        }

        let mut data = Vec::with_capacity(expected * T::DTYPE.size_bytes());
        for &v in values {
            v.write_le(&mut data);
        }

        Ok(Self {
            name: name.into(),
            shape,
            dtype: T::DTYPE,
            data,
        })
    }

    /// Decodes the buffer into a host array of `T`.
    ///
    /// Fails with [`TensorError::DTypeMismatch`] if `T` does not match the
    /// buffer's dtype.
    pub fn decode<T: Element>(&self) -> Result<Vec<T>, TensorError> {
        if T::DTYPE != self.dtype {
            return Err(TensorError::DTypeMismatch {
                name: self.name.clone(),
                actual: self.dtype,
                requested: T::DTYPE,
            });
        }
        Ok(self
            .data
            .chunks_exact(self.dtype.size_bytes())
            .map(T::read_le)
            .collect())
    }

    /// Creates a zero-filled buffer.
    pub fn zeros(name: impl Into<String>, shape: Shape, dtype: DType) -> Self {
        let size = shape.size_bytes(dtype);
        Self {
            name: name.into(),
            shape,
            dtype,
            data: vec![0u8; size],
        }
    }

    /// Creates a buffer with every element set to `value`.
    ///
    /// Integer dtypes truncate `value` toward zero.
    pub fn filled(name: impl Into<String>, shape: Shape, dtype: DType, value: f64) -> Self {
        if value == 0.0 {
            return Self::zeros(name, shape, dtype);
        }
        let n = shape.num_elements();
        let mut data = Vec::with_capacity(shape.size_bytes(dtype));
        match dtype {
            DType::I32 => fill_with(&mut data, n, i32::from_f64(value)),
            DType::I64 => fill_with(&mut data, n, i64::from_f64(value)),
            DType::F32 => fill_with(&mut data, n, f32::from_f64(value)),
        }
        Self {
            name: name.into(),
            shape,
            dtype,
            data,
        }
    }

    /// Encodes `f64` host values as `dtype`, e.g. token ids read from a config.
    ///
    /// Integer dtypes truncate toward zero. Fails like [`TensorBuffer::encode`].
    pub fn encode_as(
        name: impl Into<String>,
        values: &[f64],
        shape: Shape,
        dtype: DType,
    ) -> Result<Self, TensorError> {
        match dtype {
            DType::I32 => Self::encode(name, &narrow::<i32>(values), shape),
            DType::I64 => Self::encode(name, &narrow::<i64>(values), shape),
            DType::F32 => Self::encode(name, &narrow::<f32>(values), shape),
        }
    }

    /// Creates a buffer from raw little-endian bytes.
    ///
    /// Returns an error if the buffer size does not match `shape.size_bytes(dtype)`.
    pub fn from_bytes(
        name: impl Into<String>,
        shape: Shape,
        dtype: DType,
        data: Vec<u8>,
    ) -> Result<Self, TensorError> {
        let Some(expected) = shape.checked_size_bytes(dtype) else {
            return Err(TensorError::ShapeOverflow { shape, dtype });
        };
        if data.len() != expected {
            return Err(TensorError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            name: name.into(),
            shape,
            dtype,
            data,
        })
    }

    /// Returns the buffer's name (the model input/output it binds to).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the same buffer under a different name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the buffer's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the buffer's data type.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Returns the number of elements.
    pub fn num_elements(&self) -> usize {
        self.shape.num_elements()
    }

    /// Returns the size of the backing storage in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Returns the raw little-endian bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Decodes the buffer into whichever host array matches its dtype.
    pub fn values(&self) -> TensorValues {
        // The dtype tag always matches the element type chosen here, so the
        // typed decode cannot fail.
        match self.dtype {
            DType::I32 => TensorValues::I32(self.decode_unchecked()),
            DType::I64 => TensorValues::I64(self.decode_unchecked()),
            DType::F32 => TensorValues::F32(self.decode_unchecked()),
        }
    }

    /// Returns the first `n` elements widened to `f64`, for display.
    pub fn head(&self, n: usize) -> Vec<f64> {
        let width = self.dtype.size_bytes();
        self.data
            .chunks_exact(width)
            .take(n)
            .map(|chunk| match self.dtype {
                DType::I32 => i32::read_le(chunk).to_f64(),
                DType::I64 => i64::read_le(chunk).to_f64(),
                DType::F32 => f32::read_le(chunk).to_f64(),
            })
            .collect()
    }

    fn decode_unchecked<T: Element>(&self) -> Vec<T> {
        self.data
            .chunks_exact(T::DTYPE.size_bytes())
            .map(T::read_le)
            .collect()
    }
}

fn narrow<T: Element>(values: &[f64]) -> Vec<T> {
    values.iter().map(|&v| T::from_f64(v)).collect()
}

fn fill_with<T: Element>(data: &mut Vec<u8>, n: usize, value: T) {
    for _ in 0..n {
        value.write_le(data);
    }
}

/// Encodes `values` into an unnamed buffer. See [`TensorBuffer::encode`].
pub fn encode<T: Element>(values: &[T], shape: Shape) -> Result<TensorBuffer, TensorError> {
    TensorBuffer::encode("", values, shape)
}

/// Decodes `buffer` into a host array. See [`TensorBuffer::decode`].
pub fn decode<T: Element>(buffer: &TensorBuffer) -> Result<Vec<T>, TensorError> {
    buffer.decode()
}

/// A decoded host array of any supported dtype.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorValues {
    I32(Vec<i32>),
    I64(Vec<i64>),
    F32(Vec<f32>),
}

impl TensorValues {
    /// Returns the dtype of the contained values.
    pub fn dtype(&self) -> DType {
        match self {
            TensorValues::I32(_) => DType::I32,
            TensorValues::I64(_) => DType::I64,
            TensorValues::F32(_) => DType::F32,
        }
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        match self {
            TensorValues::I32(v) => v.len(),
            TensorValues::I64(v) => v.len(),
            TensorValues::F32(v) => v.len(),
        }
    }

    /// Returns `true` if there are no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Re-encodes the values into a named buffer of the given shape.
    pub fn encode(
        &self,
        name: impl Into<String>,
        shape: Shape,
    ) -> Result<TensorBuffer, TensorError> {
        match self {
            TensorValues::I32(v) => TensorBuffer::encode(name, v, shape),
            TensorValues::I64(v) => TensorBuffer::encode(name, v, shape),
            TensorValues::F32(v) => TensorBuffer::encode(name, v, shape),
        }
    }
}
