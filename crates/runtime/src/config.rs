// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Harness configuration loaded from TOML files or built from presets.
//!
//! # TOML Format
//! ```toml
//! model_path = "./models/minilm"
//! engine = "reference"
//! device = "cpu"
//! iterations = 1000
//! warmup = 0
//! mode = "sync"
//! input_binding = "named"
//! sample_outputs = 10
//! sample_memory = true
//!
//! [compilation]
//! optimization_level = "full"
//! precision = "float32"
//! shape_mode = "fixed"
//!
//! [[inputs]]
//! name = "input_ids"
//! shape = [2, 7]
//! dtype = "int64"
//! values = [101, 2023, 2003, 2019, 2742, 6251, 102,
//!           101, 2169, 6251, 2003, 4991,  102,   0]
//!
//! [[inputs]]
//! name = "token_type_ids"
//! shape = [2, 7]
//! dtype = "int64"
//! fill = 0
//! ```

use crate::engine::Device;
use crate::runner::Inputs;
use crate::RuntimeError;
use model_package::{CompilationOptions, ShapeMode};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tensor_core::{DType, Shape, TensorBuffer};

/// Built-in preset names accepted by [`HarnessConfig::preset`].
pub const PRESETS: &[&str] = &["image", "nlp"];

/// How the harness issues inference calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallMode {
    /// Block on each call before preparing the next.
    #[default]
    Sync,
    /// Prepare inputs for call `n + 1` while call `n` is in flight.
    Pipelined,
}

/// How inputs are bound to the model's declared inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputBinding {
    /// In declared order.
    #[default]
    Positional,
    /// By name, in any order.
    Named,
}

impl fmt::Display for CallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CallMode::Sync => "sync",
            CallMode::Pipelined => "pipelined",
        })
    }
}

impl fmt::Display for InputBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InputBinding::Positional => "positional",
            InputBinding::Named => "named",
        })
    }
}

impl std::str::FromStr for CallMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sync" => Ok(CallMode::Sync),
            "pipelined" | "async" => Ok(CallMode::Pipelined),
            other => Err(format!(
                "unknown call mode '{other}'; expected 'sync' or 'pipelined'"
            )),
        }
    }
}

impl std::str::FromStr for InputBinding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "positional" => Ok(InputBinding::Positional),
            "named" => Ok(InputBinding::Named),
            other => Err(format!(
                "unknown input binding '{other}'; expected 'positional' or 'named'"
            )),
        }
    }
}

/// One fixed input, materialised into a fresh buffer before every call.
///
/// Either every element is set to `fill`, or `values` lists the elements in
/// row-major order.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InputFill {
    pub name: String,
    pub shape: Shape,
    pub dtype: DType,
    /// Value every element is set to when `values` is absent.
    #[serde(default)]
    pub fill: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<f64>>,
}

impl InputFill {
    pub fn new(name: impl Into<String>, shape: impl Into<Shape>, dtype: DType, fill: f64) -> Self {
        Self {
            name: name.into(),
            shape: shape.into(),
            dtype,
            fill,
            values: None,
        }
    }

    /// Uses explicit element values instead of the constant fill.
    pub fn with_values(mut self, values: Vec<f64>) -> Self {
        self.values = Some(values);
        self
    }

    /// Allocates a fresh buffer for one call.
    pub fn materialize(&self) -> Result<TensorBuffer, RuntimeError> {
        match &self.values {
            Some(values) => Ok(TensorBuffer::encode_as(
                &self.name,
                values,
                self.shape.clone(),
                self.dtype,
            )?),
            None => Ok(TensorBuffer::filled(
                &self.name,
                self.shape.clone(),
                self.dtype,
                self.fill,
            )),
        }
    }

    /// Describes where the element values come from, e.g. `= 1` or `14 values`.
    pub fn source_label(&self) -> String {
        match &self.values {
            Some(values) => format!("{} values", values.len()),
            None => format!("= {}", self.fill),
        }
    }

    fn validate(&self) -> Result<(), RuntimeError> {
        if self.shape.checked_size_bytes(self.dtype).is_none() {
            return Err(RuntimeError::Config(format!(
                "input '{}' shape {} is too large",
                self.name, self.shape
            )));
        }
        if let Some(values) = &self.values {
            let expected = self.shape.num_elements();
            if values.len() != expected {
                return Err(RuntimeError::Config(format!(
                    "input '{}' lists {} values but shape {} holds {expected}",
                    self.name,
                    values.len(),
                    self.shape
                )));
            }
        }
        Ok(())
    }
}

/// Configuration for a harness run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HarnessConfig {
    /// Path to the model package.
    pub model_path: PathBuf,
    /// Execution engine: `"reference"` or `"onnx"`.
    #[serde(default = "default_engine")]
    pub engine: String,
    /// Device: `"cpu"`, `"gpu"`, or `"cuda:<id>"`.
    #[serde(default = "default_device")]
    pub device: String,
    /// Number of measured inference calls.
    pub iterations: usize,
    /// Unmeasured calls issued before measurement starts.
    #[serde(default)]
    pub warmup: usize,
    #[serde(default)]
    pub mode: CallMode,
    #[serde(default)]
    pub input_binding: InputBinding,
    /// Number of leading values printed per output tensor.
    #[serde(default = "default_sample_outputs")]
    pub sample_outputs: usize,
    /// Whether to sample resident memory after each call.
    #[serde(default = "default_true")]
    pub sample_memory: bool,
    #[serde(default)]
    pub compilation: CompilationOptions,
    /// Fixed inputs, in the model's declared order.
    pub inputs: Vec<InputFill>,
}

fn default_engine() -> String {
    "reference".to_string()
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_sample_outputs() -> usize {
    10
}

fn default_true() -> bool {
    true
}

impl HarnessConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, RuntimeError> {
        toml::from_str(toml_str)
            .map_err(|e| RuntimeError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, RuntimeError> {
        toml::to_string_pretty(self)
            .map_err(|e| RuntimeError::Config(format!("TOML serialise error: {e}")))
    }

    /// Image model benchmark: one float32 `[1, 3, 480, 640]` zero tensor.
    pub fn image_preset() -> Self {
        Self {
            model_path: PathBuf::from("./models/yolov8"),
            engine: default_engine(),
            device: default_device(),
            iterations: 1000,
            warmup: 0,
            mode: CallMode::Sync,
            input_binding: InputBinding::Positional,
            sample_outputs: default_sample_outputs(),
            sample_memory: true,
            compilation: CompilationOptions::default(),
            inputs: vec![InputFill::new("images", [1, 3, 480, 640], DType::F32, 0.0)],
        }
    }

    /// NLP model benchmark: three int64 `[2, 7]` token tensors bound by name.
    ///
    /// Token sequences are length-dependent, so shapes are compiled dynamic.
    pub fn nlp_preset() -> Self {
        let tokens = Shape::matrix(2, 7);
        Self {
            model_path: PathBuf::from("./models/minilm"),
            iterations: 1000,
            input_binding: InputBinding::Named,
            compilation: CompilationOptions {
                shape_mode: ShapeMode::Dynamic,
                ..CompilationOptions::default()
            },
            inputs: vec![
                InputFill::new("input_ids", tokens.clone(), DType::I64, 1.0),
                InputFill::new("attention_mask", tokens.clone(), DType::I64, 1.0),
                InputFill::new("token_type_ids", tokens, DType::I64, 0.0),
            ],
            ..Self::image_preset()
        }
    }

    /// Returns a built-in preset by name.
    pub fn preset(name: &str) -> Result<Self, RuntimeError> {
        match name.to_lowercase().as_str() {
            "image" | "yolov8" => Ok(Self::image_preset()),
            "nlp" | "minilm" => Ok(Self::nlp_preset()),
            other => Err(RuntimeError::Config(format!(
                "unknown preset '{other}'; expected one of {PRESETS:?}"
            ))),
        }
    }

    /// Parses the device string.
    pub fn parse_device(&self) -> Result<Device, RuntimeError> {
        self.device.parse()
    }

    /// Checks the settings that can be checked without loading the model.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.iterations == 0 {
            return Err(RuntimeError::Config("iterations must be at least 1".into()));
        }
        if self.inputs.is_empty() {
            return Err(RuntimeError::Config("at least one input is required".into()));
        }
        let mut seen = HashSet::new();
        for input in &self.inputs {
            if !seen.insert(input.name.as_str()) {
                return Err(RuntimeError::Config(format!(
                    "input '{}' is configured twice",
                    input.name
                )));
            }
            input.validate()?;
        }
        self.parse_device()?;
        Ok(())
    }

    /// Materialises a fresh set of inputs using the configured binding.
    pub fn materialize_inputs(&self) -> Result<Inputs, RuntimeError> {
        Ok(match self.input_binding {
            InputBinding::Positional => Inputs::Positional(
                self.inputs
                    .iter()
                    .map(InputFill::materialize)
                    .collect::<Result<_, _>>()?,
            ),
            InputBinding::Named => Inputs::Named(
                self.inputs
                    .iter()
                    .map(|fill| Ok((fill.name.clone(), fill.materialize()?)))
                    .collect::<Result<_, RuntimeError>>()?,
            ),
        })
    }

    /// Returns a one-line description for logs.
    pub fn summary(&self) -> String {
        format!(
            "{} via {} on {}, {} iterations (+{} warmup), {} calls, {} inputs, {}",
            self.model_path.display(),
            self.engine,
            self.device,
            self.iterations,
            self.warmup,
            self.mode,
            self.input_binding,
            self.compilation.summary(),
        )
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::image_preset()
    }
}
