// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Human-readable rendering of metrics, outputs and signatures.
//!
//! Every function here is pure formatting and never fails.
//!
//! # Example output
//! ```text
//! ============================================================
//! PERFORMANCE METRICS
//! ============================================================
//! Package load time:             12.3456 ms
//! First inference time:           4.1020 ms
//! Total inference time:        3081.5530 ms
//! Total inference requests: 1000
//! Average inference time:         3.0816 ms
//! Min / max inference time:       2.9001 / 4.1020 ms
//! Inferences per second:          324.51
//! Average CPU usage:               97.43%
//! Peak working set size:          412.77 MB
//! ============================================================
//! ```

use crate::{MetricsError, MetricsSummary, ModelHandle};
use resource_monitor::HostInfo;
use std::fmt::Write;
use tensor_core::{DType, TensorBuffer};

/// Width of the `=` separator lines.
pub const SEPARATOR_WIDTH: usize = 60;

fn separator() -> String {
    "=".repeat(SEPARATOR_WIDTH)
}

fn ms(d: std::time::Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Renders the final metrics block. [`MetricsError::NoSamples`] renders as "no data".
pub fn render(summary: Result<&MetricsSummary, &MetricsError>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", separator());
    let _ = writeln!(out, "PERFORMANCE METRICS");
    let _ = writeln!(out, "{}", separator());

    match summary {
        Ok(s) => {
            let _ = writeln!(out, "{:<26}{:>12.4} ms", "Package load time:", ms(s.load_time));
            let _ = writeln!(
                out,
                "{:<26}{:>12.4} ms",
                "First inference time:",
                ms(s.first_inference_time)
            );
            let _ = writeln!(
                out,
                "{:<26}{:>12.4} ms",
                "Total inference time:",
                ms(s.total_inference_time)
            );
            let _ = writeln!(out, "{:<26}{}", "Total inference requests:", s.count);
            let _ = writeln!(
                out,
                "{:<26}{:>12.4} ms",
                "Average inference time:",
                ms(s.average_inference_time)
            );
            let _ = writeln!(
                out,
                "{:<26}{:>12.4} / {:.4} ms",
                "Min / max inference time:",
                ms(s.min_inference_time),
                ms(s.max_inference_time)
            );
            let _ = writeln!(
                out,
                "{:<26}{:>12.2}",
                "Inferences per second:",
                s.throughput_per_second
            );
            let _ = writeln!(out, "{:<26}{:>12.2}%", "Average CPU usage:", s.average_cpu_percent);
            match s.peak_memory_mb() {
                Some(mb) => {
                    let _ = writeln!(out, "{:<26}{:>12.2} MB", "Peak working set size:", mb);
                }
                None => {
                    let _ = writeln!(out, "{:<26}{:>12}", "Peak working set size:", "not sampled");
                }
            }
        }
        Err(MetricsError::NoSamples) => {
            let _ = writeln!(out, "no data");
        }
    }

    let _ = writeln!(out, "{}", separator());
    out
}

/// Renders index, name, dtype, shape and the first `n` values of each output.
///
/// Float values print with 4 decimals, integers as-is. Outputs with no
/// elements render a placeholder instead of values.
pub fn render_outputs(outputs: &[TensorBuffer], n: usize) -> String {
    let mut out = String::new();
    if outputs.is_empty() {
        let _ = writeln!(out, "(no outputs)");
        return out;
    }
    for (i, buffer) in outputs.iter().enumerate() {
        let _ = writeln!(
            out,
            "Output {i}: {} ({} {})",
            buffer.name(),
            buffer.dtype(),
            buffer.shape()
        );
        let head = buffer.head(n);
        if head.is_empty() {
            let _ = writeln!(out, "  values: <unavailable>");
            continue;
        }
        let values: Vec<String> = match buffer.dtype() {
            DType::F32 => head.iter().map(|v| format!("{v:.4}")).collect(),
            DType::I32 | DType::I64 => head.iter().map(|v| v.to_string()).collect(),
        };
        let more = if buffer.num_elements() > head.len() {
            format!(", ... ({} total)", buffer.num_elements())
        } else {
            String::new()
        };
        let _ = writeln!(out, "  values: [{}{}]", values.join(", "), more);
    }
    out
}

/// Lists the handle's declared inputs and outputs.
pub fn render_signature(handle: &ModelHandle) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Model: {} ({} engine on {}, {})",
        handle.name(),
        handle.engine(),
        handle.device(),
        handle.options().summary()
    );
    let _ = writeln!(out, "Inputs:");
    for (i, spec) in handle.inputs().iter().enumerate() {
        let _ = writeln!(out, "  [{i}] {spec}");
    }
    let _ = writeln!(out, "Outputs:");
    for (i, spec) in handle.outputs().iter().enumerate() {
        let _ = writeln!(out, "  [{i}] {spec}");
    }
    out
}

/// One line describing the model, engine and host, printed before a run.
pub fn render_context(handle: &ModelHandle, host: &HostInfo) -> String {
    format!(
        "{} via {} on {} [{}]",
        handle.path().display(),
        handle.engine(),
        handle.device(),
        host.summary()
    )
}
