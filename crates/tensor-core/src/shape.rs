// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor shape descriptors and dimension utilities.

use std::fmt;

/// Describes the dimensionality of a [`crate::TensorBuffer`].
///
/// Shapes are immutable once created. Every dimension is concrete here;
/// dynamic dimensions only exist in model signatures, never in buffers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Creates a new shape from the given dimensions.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Shape;
    /// let s = Shape::new(vec![1, 3, 480, 640]);
    /// assert_eq!(s.rank(), 4);
    /// assert_eq!(s.num_elements(), 921_600);
    /// ```
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    /// Creates a scalar shape (rank 0).
    pub fn scalar() -> Self {
        Self { dims: vec![] }
    }

    /// Creates a 1-D shape.
    pub fn vector(len: usize) -> Self {
        Self { dims: vec![len] }
    }

    /// Creates a 2-D shape (matrix), e.g. `[batch, sequence]` for token inputs.
    pub fn matrix(rows: usize, cols: usize) -> Self {
        Self {
            dims: vec![rows, cols],
        }
    }

    /// Returns the number of dimensions (rank).
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the total number of elements.
    ///
    /// For a scalar shape (rank 0), returns 1. Shapes from untrusted sources
    /// should pass [`Shape::checked_size_bytes`] first; this one overflows.
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    /// Returns the total number of elements, or `None` if it overflows `usize`.
    pub fn checked_num_elements(&self) -> Option<usize> {
        self.dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Returns the size of a specific dimension, or `None` if out of bounds.
    pub fn dim(&self, index: usize) -> Option<usize> {
        self.dims.get(index).copied()
    }

    /// Computes the memory footprint in bytes for a given [`crate::DType`].
    pub fn size_bytes(&self, dtype: super::DType) -> usize {
        self.num_elements() * dtype.size_bytes()
    }

    /// Like [`Shape::size_bytes`], but `None` if the byte count overflows `usize`.
    pub fn checked_size_bytes(&self, dtype: super::DType) -> Option<usize> {
        self.checked_num_elements()?.checked_mul(dtype.size_bytes())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

/// Convenience: `Shape::from(vec![2, 7])`.
impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

/// Convenience: `Shape::from(&[2, 7][..])`.
impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims.to_vec())
    }
}

/// Convenience: `Shape::from([1, 3, 480, 640])`.
impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self::new(dims.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DType;

    #[test]
    fn test_scalar_shape() {
        let s = Shape::scalar();
        assert_eq!(s.rank(), 0);
        assert_eq!(s.num_elements(), 1);
    }

    #[test]
    fn test_image_shape() {
        let s = Shape::from([1, 3, 480, 640]);
        assert_eq!(s.rank(), 4);
        assert_eq!(s.num_elements(), 921_600);
        assert_eq!(s.size_bytes(DType::F32), 3_686_400);
    }

    #[test]
    fn test_token_shape() {
        let s = Shape::matrix(2, 7);
        assert_eq!(s.num_elements(), 14);
        assert_eq!(s.size_bytes(DType::I64), 112);
        assert_eq!(s.size_bytes(DType::I32), 56);
    }

    #[test]
    fn test_zero_dim() {
        let s = Shape::new(vec![4, 0, 2]);
        assert_eq!(s.num_elements(), 0);
    }

    #[test]
    fn test_checked_overflow() {
        let huge = Shape::from([usize::MAX / 2, 3, 16]);
        assert_eq!(huge.checked_num_elements(), None);
        assert_eq!(huge.checked_size_bytes(DType::F32), None);

        let edge = Shape::vector(usize::MAX / 2);
        assert_eq!(edge.checked_num_elements(), Some(usize::MAX / 2));
        assert_eq!(edge.checked_size_bytes(DType::I64), None);

        assert_eq!(Shape::scalar().checked_num_elements(), Some(1));
        assert_eq!(Shape::matrix(2, 7).checked_size_bytes(DType::I64), Some(112));
    }

    #[test]
    fn test_display() {
        let s = Shape::new(vec![2, 3, 4]);
        assert_eq!(format!("{s}"), "[2, 3, 4]");
        assert_eq!(format!("{}", Shape::scalar()), "[]");
    }

    #[test]
    fn test_from_conversions() {
        let s1: Shape = vec![2, 3].into();
        let s2: Shape = (&[2, 3][..]).into();
        let s3: Shape = [2, 3].into();
        assert_eq!(s1, s2);
        assert_eq!(s2, s3);
        assert_eq!(s1.dim(1), Some(3));
        assert_eq!(s1.dim(2), None);
    }
}
