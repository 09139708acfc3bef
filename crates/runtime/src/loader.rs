// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Resolves model packages and compiles them into shareable handles.

use crate::engine::{create_engine, Device, Executable, ExecutionEngine};
use crate::{HarnessConfig, RuntimeError};
use model_package::{CompilationOptions, ModelPackage, ModelSignature, TensorSpec};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A compiled model, ready to run.
///
/// Immutable after load. Cloning is cheap (one `Arc` bump), so the same
/// handle can be passed to as many runners and threads as needed.
#[derive(Clone)]
pub struct ModelHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    name: String,
    path: PathBuf,
    engine: &'static str,
    device: Device,
    options: CompilationOptions,
    executable: Arc<dyn Executable>,
}

impl ModelHandle {
    /// Wraps an already compiled executable.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        engine: &'static str,
        device: Device,
        options: CompilationOptions,
        executable: Arc<dyn Executable>,
    ) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                name: name.into(),
                path: path.into(),
                engine,
                device,
                options,
                executable,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The package path the model was loaded from.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Name of the engine that compiled the model.
    pub fn engine(&self) -> &'static str {
        self.inner.engine
    }

    pub fn device(&self) -> Device {
        self.inner.device
    }

    pub fn options(&self) -> &CompilationOptions {
        &self.inner.options
    }

    pub fn signature(&self) -> &ModelSignature {
        self.inner.executable.signature()
    }

    /// Declared inputs, in order.
    pub fn inputs(&self) -> &[TensorSpec] {
        &self.signature().inputs
    }

    /// Declared outputs, in order.
    pub fn outputs(&self) -> &[TensorSpec] {
        &self.signature().outputs
    }

    pub(crate) fn executable(&self) -> &Arc<dyn Executable> {
        &self.inner.executable
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("name", &self.inner.name)
            .field("path", &self.inner.path)
            .field("engine", &self.inner.engine)
            .field("device", &self.inner.device)
            .field("inputs", &self.inputs().len())
            .field("outputs", &self.outputs().len())
            .finish()
    }
}

/// Loads packages through one execution engine.
pub struct ExecutableLoader {
    engine: Box<dyn ExecutionEngine>,
}

impl ExecutableLoader {
    pub fn new(engine: Box<dyn ExecutionEngine>) -> Self {
        Self { engine }
    }

    /// Creates the engine named in `config` on its device.
    pub fn from_config(config: &HarnessConfig) -> Result<Self, RuntimeError> {
        let device = config.parse_device()?;
        Ok(Self::new(create_engine(&config.engine, device)?))
    }

    pub fn engine(&self) -> &dyn ExecutionEngine {
        self.engine.as_ref()
    }

    /// Resolves `path` and compiles it.
    ///
    /// Fails with [`RuntimeError::ResourceNotFound`] if nothing exists at
    /// `path`, and [`RuntimeError::Compilation`] if the package is malformed
    /// or the engine rejects it.
    pub fn load(
        &self,
        path: &Path,
        options: &CompilationOptions,
    ) -> Result<ModelHandle, RuntimeError> {
        let package = ModelPackage::resolve(path)?;
        tracing::info!(
            "loading {} package '{}' with {} engine ({})",
            package.format(),
            package.name(),
            self.engine.name(),
            options.summary()
        );

        let executable = self.engine.compile(&package, options)?;

        Ok(ModelHandle::new(
            package.name(),
            path,
            self.engine.name(),
            self.engine.device(),
            *options,
            executable,
        ))
    }
}
