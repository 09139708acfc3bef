// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Issuing inference calls against a [`ModelHandle`].
//!
//! Two call conventions:
//!
//! ```text
//! run(inputs)    ── validate ── execute ── InferenceResult        (blocking)
//!
//! submit(inputs) ── validate ── InFlight ──── wait().await ── InferenceResult
//!                                  └── spawn_blocking(execute)
//! ```
//!
//! Inputs are checked against the handle's signature before anything is
//! dispatched. [`InFlight`] owns the inputs until the call finishes, so
//! they cannot be touched mid-call, and the outputs only exist once
//! [`InFlight::wait`] returns.

use crate::{ModelHandle, RuntimeError};
use model_package::ModelSignature;
use std::time::{Duration, Instant};
use tensor_core::TensorBuffer;
use tokio::task::JoinHandle;

/// Inputs for one call, bound either by position or by name.
#[derive(Debug, Clone)]
pub enum Inputs {
    /// Buffers in the model's declared input order.
    Positional(Vec<TensorBuffer>),
    /// `(name, buffer)` pairs in any order.
    Named(Vec<(String, TensorBuffer)>),
}

impl Inputs {
    /// Binds buffers by their own names.
    pub fn named_from_buffers(buffers: impl IntoIterator<Item = TensorBuffer>) -> Self {
        Inputs::Named(
            buffers
                .into_iter()
                .map(|b| (b.name().to_string(), b))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        match self {
            Inputs::Positional(v) => v.len(),
            Inputs::Named(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outputs of one call and how long it took.
#[derive(Debug, Clone)]
pub struct InferenceResult {
    /// Output buffers in the model's declared order.
    pub outputs: Vec<TensorBuffer>,
    /// Wall-clock duration of the engine call.
    pub duration: Duration,
}

impl InferenceResult {
    /// Returns the output with the given name.
    pub fn output(&self, name: &str) -> Option<&TensorBuffer> {
        self.outputs.iter().find(|b| b.name() == name)
    }
}

/// Runs inference calls against one model.
#[derive(Debug, Clone)]
pub struct InferenceRunner {
    handle: ModelHandle,
}

impl InferenceRunner {
    pub fn new(handle: ModelHandle) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &ModelHandle {
        &self.handle
    }

    /// Runs one inference and blocks until it completes.
    ///
    /// # Errors
    /// - [`RuntimeError::InputCountMismatch`] if the number of inputs differs
    ///   from the declared count.
    /// - [`RuntimeError::InputShapeMismatch`] / [`RuntimeError::InputDTypeMismatch`]
    ///   if a buffer disagrees with its declaration.
    /// - [`RuntimeError::UnknownInput`] / [`RuntimeError::DuplicateInput`] for
    ///   bad names in [`Inputs::Named`].
    /// - [`RuntimeError::Execution`] if the engine fails.
    pub fn run(&self, inputs: Inputs) -> Result<InferenceResult, RuntimeError> {
        let ordered = bind_inputs(self.handle.signature(), inputs)?;
        let start = Instant::now();
        let outputs = self.handle.executable().execute(ordered)?;
        let duration = start.elapsed();
        tracing::debug!(
            "inference on '{}': {:.4}ms, {} outputs",
            self.handle.name(),
            duration.as_secs_f64() * 1000.0,
            outputs.len()
        );
        Ok(InferenceResult { outputs, duration })
    }

    /// Validates `inputs` and starts the call on Tokio's blocking pool.
    ///
    /// Validation errors are returned immediately; engine errors surface
    /// from [`InFlight::wait`]. Must be called from within a Tokio runtime.
    pub fn submit(&self, inputs: Inputs) -> Result<InFlight, RuntimeError> {
        let ordered = bind_inputs(self.handle.signature(), inputs)?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| RuntimeError::Execution(format!("submit needs a Tokio runtime: {e}")))?;

        let executable = self.handle.executable().clone();
        let name = self.handle.name().to_string();
        let task = runtime.spawn_blocking(move || -> Result<InferenceResult, RuntimeError> {
            let start = Instant::now();
            let outputs = executable.execute(ordered)?;
            let duration = start.elapsed();
            tracing::debug!(
                "inference on '{name}': {:.4}ms, {} outputs",
                duration.as_secs_f64() * 1000.0,
                outputs.len()
            );
            Ok(InferenceResult { outputs, duration })
        });

        Ok(InFlight { task })
    }
}

/// An inference call that has been submitted but not yet collected.
#[derive(Debug)]
#[must_use = "an in-flight call does nothing unless awaited"]
pub struct InFlight {
    task: JoinHandle<Result<InferenceResult, RuntimeError>>,
}

impl InFlight {
    /// Waits for the call to finish and returns its outputs.
    pub async fn wait(self) -> Result<InferenceResult, RuntimeError> {
        self.task
            .await
            .map_err(|e| RuntimeError::Execution(format!("inference task failed: {e}")))?
    }
}

/// Checks `inputs` against `signature` and returns them in declared order,
/// each renamed to its declared name.
pub fn bind_inputs(
    signature: &ModelSignature,
    inputs: Inputs,
) -> Result<Vec<TensorBuffer>, RuntimeError> {
    let expected = signature.inputs.len();
    if inputs.len() != expected {
        return Err(RuntimeError::InputCountMismatch {
            expected,
            actual: inputs.len(),
        });
    }

    let ordered: Vec<TensorBuffer> = match inputs {
        Inputs::Positional(buffers) => buffers,
        Inputs::Named(pairs) => {
            let mut slots: Vec<Option<TensorBuffer>> = vec![None; expected];
            for (name, buffer) in pairs {
                let index = signature
                    .input_index(&name)
                    .ok_or_else(|| RuntimeError::UnknownInput { name: name.clone() })?;
                if slots[index].is_some() {
                    return Err(RuntimeError::DuplicateInput { name });
                }
                slots[index] = Some(buffer);
            }
            // Equal counts, no unknowns and no duplicates fill every slot.
            slots.into_iter().flatten().collect()
        }
    };

    ordered
        .into_iter()
        .zip(&signature.inputs)
        .map(|(buffer, spec)| {
            if buffer.dtype() != spec.dtype {
                return Err(RuntimeError::InputDTypeMismatch {
                    input: spec.name.clone(),
                    expected: spec.dtype,
                    actual: buffer.dtype(),
                });
            }
            if !spec.accepts(buffer.shape()) {
                return Err(RuntimeError::InputShapeMismatch {
                    input: spec.name.clone(),
                    expected: spec.dims_label(),
                    actual: buffer.shape().to_string(),
                });
            }
            Ok(if buffer.name() == spec.name {
                buffer
            } else {
                buffer.with_name(&spec.name)
            })
        })
        .collect()
}
