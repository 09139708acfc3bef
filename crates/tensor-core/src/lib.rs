// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Typed, shaped tensor buffers in the flat byte layout that execution
//! engines consume.
//!
//! This crate provides:
//! - [`TensorBuffer`]: a named, typed, shaped block of contiguous elements
//!   with private storage. All reads and writes go through
//!   [`encode`](TensorBuffer::encode) / [`decode`](TensorBuffer::decode).
//! - [`Shape`]: runtime shape descriptors.
//! - [`DType`]: supported element data types (`int32`, `int64`, `float32`).
//! - [`Element`]: the host element types that map onto a [`DType`].
//!
//! # Layout
//! Elements are stored in row-major order, little-endian, with no padding:
//! `byte_len == num_elements * dtype.size_bytes()` always holds.
//!
//! # Example
//! ```
//! use tensor_core::{Shape, TensorBuffer};
//!
//! let ids = TensorBuffer::encode("input_ids", &[101i64, 2023, 102], Shape::matrix(1, 3)).unwrap();
//! assert_eq!(ids.byte_len(), 24);
//! assert_eq!(ids.decode::<i64>().unwrap(), vec![101, 2023, 102]);
//! ```

mod buffer;
mod dtype;
mod element;
mod error;
mod shape;

pub use buffer::{decode, encode, TensorBuffer, TensorValues};
pub use dtype::DType;
pub use element::Element;
pub use error::TensorError;
pub use shape::Shape;
