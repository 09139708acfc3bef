// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Host element types and their little-endian byte encoding.

use crate::DType;

mod sealed {
    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for f32 {}
}

/// A host scalar type that can be stored in a [`crate::TensorBuffer`].
///
/// Sealed: only `i32`, `i64` and `f32` implement it, one per [`DType`].
pub trait Element: sealed::Sealed + Copy + PartialEq + std::fmt::Debug + Send + Sync + 'static {
    /// The dtype tag written into buffers holding this element type.
    const DTYPE: DType;

    /// Appends the little-endian encoding of `self` to `out`.
    fn write_le(self, out: &mut Vec<u8>);

    /// Decodes one element from exactly `DTYPE.size_bytes()` bytes.
    fn read_le(bytes: &[u8]) -> Self;

    /// Converts a fill constant into this element type (truncating for integers).
    fn from_f64(value: f64) -> Self;

    /// Widens the element for display.
    fn to_f64(self) -> f64;
}

impl Element for i32 {
    const DTYPE: DType = DType::I32;

    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn read_le(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(bytes);
        i32::from_le_bytes(raw)
    }

    fn from_f64(value: f64) -> Self {
        value as i32
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Element for i64 {
    const DTYPE: DType = DType::I64;

    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn read_le(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        i64::from_le_bytes(raw)
    }

    fn from_f64(value: f64) -> Self {
        value as i64
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;

    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn read_le(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(bytes);
        f32::from_le_bytes(raw)
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i32_le() {
        let mut out = Vec::new();
        (-2i32).write_le(&mut out);
        assert_eq!(out, vec![0xFE, 0xFF, 0xFF, 0xFF]);
        assert_eq!(i32::read_le(&out), -2);
    }

    #[test]
    fn test_i64_width() {
        let mut out = Vec::new();
        1i64.write_le(&mut out);
        assert_eq!(out.len(), DType::I64.size_bytes());
        assert_eq!(out[0], 1);
        assert!(out[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_f32_le() {
        let mut out = Vec::new();
        1.5f32.write_le(&mut out);
        assert_eq!(f32::read_le(&out), 1.5);
    }

    #[test]
    fn test_from_f64_truncates_integers() {
        assert_eq!(i64::from_f64(1.9), 1);
        assert_eq!(i32::from_f64(-0.5), 0);
        assert_eq!(f32::from_f64(0.25), 0.25);
    }
}
