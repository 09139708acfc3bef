// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Constant tensors stored alongside a manifest in `model.safetensors`.

use crate::PackageError;
use safetensors::{Dtype, SafeTensors};
use std::path::{Path, PathBuf};
use tensor_core::{DType, Shape, TensorBuffer};

/// A memory-mapped SafeTensors file.
///
/// The file is mapped once at [`open`](Self::open); tensors are copied out
/// on demand by [`get`](Self::get).
pub struct PackageConstants {
    path: PathBuf,
    mmap: memmap2::Mmap,
    names: Vec<String>,
}

impl PackageConstants {
    /// Maps the file and validates its header.
    pub fn open(path: &Path) -> Result<Self, PackageError> {
        let file = std::fs::File::open(path).map_err(|e| PackageError::ReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        // SAFETY: the mapping is read-only and the package is not expected to
        // change while the harness runs.
        let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(|e| PackageError::ReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        let names = {
            let st = SafeTensors::deserialize(&mmap)
                .map_err(|e| PackageError::ConstantsError(format!("{}: {e}", path.display())))?;
            let mut names: Vec<String> = st.names().into_iter().cloned().collect();
            names.sort();
            names
        };

        tracing::info!(
            "mapped {} ({:.2} MB, {} tensors)",
            path.display(),
            mmap.len() as f64 / (1024.0 * 1024.0),
            names.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            mmap,
            names,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Tensor names in the file, sorted.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Copies the named tensor into a [`TensorBuffer`].
    ///
    /// Returns `Ok(None)` if no tensor has that name. Fails if the stored
    /// dtype is not one of int32, int64 or float32.
    pub fn get(&self, name: &str) -> Result<Option<TensorBuffer>, PackageError> {
        if !self.contains(name) {
            return Ok(None);
        }
        let st = SafeTensors::deserialize(&self.mmap)
            .map_err(|e| PackageError::ConstantsError(e.to_string()))?;
        let view = st
            .tensor(name)
            .map_err(|e| PackageError::ConstantsError(format!("tensor '{name}': {e}")))?;

        let dtype = match view.dtype() {
            Dtype::F32 => DType::F32,
            Dtype::I32 => DType::I32,
            Dtype::I64 => DType::I64,
            other => {
                return Err(PackageError::ConstantsError(format!(
                    "tensor '{name}' has unsupported dtype {other:?}"
                )))
            }
        };

        let buffer = TensorBuffer::from_bytes(
            name,
            Shape::from(view.shape()),
            dtype,
            view.data().to_vec(),
        )
        .map_err(|e| PackageError::ConstantsError(format!("tensor '{name}': {e}")))?;
        Ok(Some(buffer))
    }
}

impl std::fmt::Debug for PackageConstants {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageConstants")
            .field("path", &self.path)
            .field("bytes", &self.mmap.len())
            .field("names", &self.names)
            .finish()
    }
}
