// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Compilation descriptor passed to the engine's one-time compile step.

use std::fmt;
use std::str::FromStr;

/// How aggressively the engine may rewrite the graph while compiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationLevel {
    /// No graph rewrites.
    None,
    /// Cheap, always-safe rewrites (constant folding, dead node removal).
    Basic,
    /// Everything the engine supports, including layout changes and fusion.
    #[default]
    Full,
}

/// Numeric precision the engine should compute in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    #[default]
    Float32,
    Float16,
}

/// Whether the executable is specialised to the declared shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeMode {
    /// Every declared dimension must be concrete; the engine may specialise.
    #[default]
    Fixed,
    /// Dynamic (`?`) dimensions are accepted and resolved per call.
    Dynamic,
}

/// The compilation descriptor.
///
/// # TOML Format
/// ```toml
/// [compilation]
/// optimization_level = "full"
/// precision = "float32"
/// shape_mode = "fixed"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct CompilationOptions {
    #[serde(default)]
    pub optimization_level: OptimizationLevel,
    #[serde(default)]
    pub precision: Precision,
    #[serde(default)]
    pub shape_mode: ShapeMode,
}

impl CompilationOptions {
    /// Returns a one-line description for logs and reports.
    pub fn summary(&self) -> String {
        format!(
            "opt={}, precision={}, shapes={}",
            self.optimization_level, self.precision, self.shape_mode
        )
    }
}

impl fmt::Display for OptimizationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OptimizationLevel::None => "none",
            OptimizationLevel::Basic => "basic",
            OptimizationLevel::Full => "full",
        })
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Precision::Float32 => "float32",
            Precision::Float16 => "float16",
        })
    }
}

impl fmt::Display for ShapeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShapeMode::Fixed => "fixed",
            ShapeMode::Dynamic => "dynamic",
        })
    }
}

impl FromStr for OptimizationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "0" => Ok(OptimizationLevel::None),
            "basic" | "1" => Ok(OptimizationLevel::Basic),
            "full" | "3" => Ok(OptimizationLevel::Full),
            other => Err(format!(
                "unknown optimisation level '{other}'; expected 'none', 'basic', or 'full'"
            )),
        }
    }
}

impl FromStr for Precision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "float32" | "f32" | "fp32" => Ok(Precision::Float32),
            "float16" | "f16" | "fp16" => Ok(Precision::Float16),
            other => Err(format!(
                "unknown precision '{other}'; expected 'float32' or 'float16'"
            )),
        }
    }
}

impl FromStr for ShapeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fixed" | "static" => Ok(ShapeMode::Fixed),
            "dynamic" => Ok(ShapeMode::Dynamic),
            other => Err(format!(
                "unknown shape mode '{other}'; expected 'fixed' or 'dynamic'"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let o = CompilationOptions::default();
        assert_eq!(o.optimization_level, OptimizationLevel::Full);
        assert_eq!(o.precision, Precision::Float32);
        assert_eq!(o.shape_mode, ShapeMode::Fixed);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("basic".parse::<OptimizationLevel>(), Ok(OptimizationLevel::Basic));
        assert_eq!("FP16".parse::<Precision>(), Ok(Precision::Float16));
        assert_eq!("dynamic".parse::<ShapeMode>(), Ok(ShapeMode::Dynamic));
        assert!("turbo".parse::<OptimizationLevel>().is_err());
    }

    #[test]
    fn test_partial_json() {
        let o: CompilationOptions = serde_json::from_str(r#"{"precision":"float16"}"#).unwrap();
        assert_eq!(o.precision, Precision::Float16);
        assert_eq!(o.shape_mode, ShapeMode::Fixed);
    }

    #[test]
    fn test_summary() {
        let o = CompilationOptions::default();
        assert_eq!(o.summary(), "opt=full, precision=float32, shapes=fixed");
    }
}
