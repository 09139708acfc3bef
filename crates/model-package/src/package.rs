// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Package path resolution.

use crate::{PackageConstants, PackageError, PackageManifest};
use std::fmt;
use std::path::{Path, PathBuf};

/// Manifest filename inside a package directory.
pub const MANIFEST_FILE: &str = "model.json";
/// Optional constant tensor file inside a package directory.
pub const CONSTANTS_FILE: &str = "model.safetensors";
/// ONNX graph filename inside a package directory.
pub const ONNX_FILE: &str = "model.onnx";

/// The primary layout a package was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageFormat {
    /// A directory holding `model.json`.
    Manifest,
    /// A directory holding `model.onnx`, or a bare `.onnx` file.
    Onnx,
}

impl fmt::Display for PackageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageFormat::Manifest => write!(f, "manifest"),
            PackageFormat::Onnx => write!(f, "onnx"),
        }
    }
}

/// A model package located on disk.
///
/// Resolution only checks which files exist; nothing is parsed until
/// [`read_manifest`](Self::read_manifest) or
/// [`open_constants`](Self::open_constants) is called.
#[derive(Debug, Clone)]
pub struct ModelPackage {
    path: PathBuf,
    format: PackageFormat,
    manifest: Option<PathBuf>,
    onnx: Option<PathBuf>,
    constants: Option<PathBuf>,
}

impl ModelPackage {
    /// Resolves `path` into a package.
    ///
    /// Fails with [`PackageError::NotFound`] when nothing exists at `path`,
    /// and [`PackageError::UnrecognisedLayout`] when it holds neither a
    /// manifest nor an ONNX graph.
    pub fn resolve(path: &Path) -> Result<Self, PackageError> {
        if !path.exists() {
            return Err(PackageError::NotFound {
                path: path.display().to_string(),
            });
        }

        if path.is_file() {
            let is_onnx = path
                .extension()
                .map_or(false, |ext| ext.eq_ignore_ascii_case("onnx"));
            if !is_onnx {
                return Err(PackageError::UnrecognisedLayout {
                    path: path.display().to_string(),
                });
            }
            return Ok(Self {
                path: path.to_path_buf(),
                format: PackageFormat::Onnx,
                manifest: None,
                onnx: Some(path.to_path_buf()),
                constants: None,
            });
        }

        let existing = |name: &str| {
            let candidate = path.join(name);
            candidate.is_file().then_some(candidate)
        };
        let manifest = existing(MANIFEST_FILE);
        let onnx = existing(ONNX_FILE);
        let constants = existing(CONSTANTS_FILE);

        let format = match (&manifest, &onnx) {
            (Some(_), _) => PackageFormat::Manifest,
            (None, Some(_)) => PackageFormat::Onnx,
            (None, None) => {
                return Err(PackageError::UnrecognisedLayout {
                    path: path.display().to_string(),
                })
            }
        };

        tracing::debug!(
            "resolved package {} as {format} (constants: {})",
            path.display(),
            constants.is_some()
        );

        Ok(Self {
            path: path.to_path_buf(),
            format,
            manifest,
            onnx,
            constants,
        })
    }

    /// The path the package was resolved from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> PackageFormat {
        self.format
    }

    /// Package name: the directory or file stem.
    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn manifest_path(&self) -> Option<&Path> {
        self.manifest.as_deref()
    }

    pub fn onnx_path(&self) -> Option<&Path> {
        self.onnx.as_deref()
    }

    pub fn constants_path(&self) -> Option<&Path> {
        self.constants.as_deref()
    }

    /// Reads and parses `model.json`.
    pub fn read_manifest(&self) -> Result<PackageManifest, PackageError> {
        let path = self
            .manifest
            .as_deref()
            .ok_or_else(|| PackageError::NotFound {
                path: self.path.join(MANIFEST_FILE).display().to_string(),
            })?;
        PackageManifest::from_file(path)
    }

    /// Memory-maps `model.safetensors`, if the package has one.
    pub fn open_constants(&self) -> Result<Option<PackageConstants>, PackageError> {
        self.constants
            .as_deref()
            .map(PackageConstants::open)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{ "name": "m",
        "inputs": [{ "name": "x", "dtype": "float32", "shape": [1, 4] }],
        "outputs": [{ "name": "y", "dtype": "float32", "shape": [1, 2] }] }"#;

    #[test]
    fn test_missing_path() {
        let err = ModelPackage::resolve(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, PackageError::NotFound { .. }));
        assert!(err.to_string().contains("/definitely/not/here"));
    }

    #[test]
    fn test_empty_dir_unrecognised() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelPackage::resolve(dir.path()).unwrap_err();
        assert!(matches!(err, PackageError::UnrecognisedLayout { .. }));
    }

    #[test]
    fn test_manifest_package() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), MANIFEST).unwrap();

        let pkg = ModelPackage::resolve(dir.path()).unwrap();
        assert_eq!(pkg.format(), PackageFormat::Manifest);
        assert!(pkg.constants_path().is_none());
        assert!(pkg.open_constants().unwrap().is_none());

        let manifest = pkg.read_manifest().unwrap();
        assert_eq!(manifest.name, "m");
    }

    #[test]
    fn test_onnx_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("resnet.onnx");
        std::fs::write(&file, b"not really onnx").unwrap();

        let pkg = ModelPackage::resolve(&file).unwrap();
        assert_eq!(pkg.format(), PackageFormat::Onnx);
        assert_eq!(pkg.name(), "resnet");
        assert_eq!(pkg.onnx_path(), Some(file.as_path()));
        assert!(matches!(pkg.read_manifest(), Err(PackageError::NotFound { .. })));
    }

    #[test]
    fn test_non_onnx_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("weights.bin");
        std::fs::write(&file, b"").unwrap();
        assert!(matches!(
            ModelPackage::resolve(&file),
            Err(PackageError::UnrecognisedLayout { .. })
        ));
    }

    #[test]
    fn test_onnx_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(ONNX_FILE), b"").unwrap();
        let pkg = ModelPackage::resolve(dir.path()).unwrap();
        assert_eq!(pkg.format(), PackageFormat::Onnx);
        assert!(pkg.manifest_path().is_none());
    }
}
