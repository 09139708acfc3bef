// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Supported tensor element data types.

use std::fmt;

/// Enumerates the numeric types a [`crate::TensorBuffer`] can hold.
///
/// The element width decides the buffer layout: 4 bytes for `int32` and
/// `float32`, 8 bytes for `int64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DType {
    /// 32-bit signed integer (token ids, masks).
    #[serde(rename = "int32", alias = "i32")]
    I32,
    /// 64-bit signed integer (token ids exported from ONNX graphs).
    #[serde(rename = "int64", alias = "i64")]
    I64,
    /// 32-bit IEEE 754 floating point.
    #[serde(rename = "float32", alias = "f32")]
    F32,
}

impl DType {
    /// Returns the size of a single element in bytes.
    pub fn size_bytes(self) -> usize {
        match self {
            DType::I32 => 4,
            DType::I64 => 8,
            DType::F32 => 4,
        }
    }

    /// Returns the canonical label for this data type.
    pub fn as_str(self) -> &'static str {
        match self {
            DType::I32 => "int32",
            DType::I64 => "int64",
            DType::F32 => "float32",
        }
    }

    /// Parses a dtype label, accepting both long (`float32`) and short
    /// (`f32`) spellings, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "int32" | "i32" => Some(DType::I32),
            "int64" | "i64" => Some(DType::I64),
            "float32" | "f32" | "float" => Some(DType::F32),
            _ => None,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_bytes() {
        assert_eq!(DType::I32.size_bytes(), 4);
        assert_eq!(DType::I64.size_bytes(), 8);
        assert_eq!(DType::F32.size_bytes(), 4);
    }

    #[test]
    fn test_parse() {
        assert_eq!(DType::parse("float32"), Some(DType::F32));
        assert_eq!(DType::parse("F32"), Some(DType::F32));
        assert_eq!(DType::parse("int64"), Some(DType::I64));
        assert_eq!(DType::parse(" i32 "), Some(DType::I32));
        assert_eq!(DType::parse("float16"), None);
    }

    #[test]
    fn test_serde_labels() {
        #[derive(serde::Deserialize)]
        struct Holder {
            dtype: DType,
        }
        let long: Holder = serde_json::from_str(r#"{"dtype":"int64"}"#).unwrap();
        assert_eq!(long.dtype, DType::I64);
        let short: Holder = serde_json::from_str(r#"{"dtype":"f32"}"#).unwrap();
        assert_eq!(short.dtype, DType::F32);
    }
}
