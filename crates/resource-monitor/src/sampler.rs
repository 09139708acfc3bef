// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Delta-based CPU usage sampling.

use crate::{MonitorError, ProcessCpuTime};
use std::time::{Duration, Instant};

/// Computes process CPU usage between consecutive samples.
///
/// Each sample reports `Δcpu_time / Δwall_time × 100` since the previous
/// sample (or since [`start`](Self::start) for the first one). The result
/// is not clamped: a process keeping four cores busy reads ~400%.
#[derive(Debug, Clone)]
pub struct CpuUsageSampler {
    last_wall: Instant,
    last_cpu: Duration,
}

impl CpuUsageSampler {
    /// Starts a sampler, taking the baseline reading now.
    ///
    /// If CPU time cannot be read the baseline is zero; the first
    /// [`sample`](Self::sample) will then surface the error.
    pub fn start() -> Self {
        let last_cpu = match ProcessCpuTime::read() {
            Ok(t) => t.total(),
            Err(e) => {
                tracing::debug!("cpu baseline unavailable: {e}");
                Duration::ZERO
            }
        };
        Self::with_baseline(Instant::now(), last_cpu)
    }

    /// Starts a sampler from an explicit baseline.
    pub fn with_baseline(wall: Instant, cpu: Duration) -> Self {
        Self {
            last_wall: wall,
            last_cpu: cpu,
        }
    }

    /// Reads process CPU time and returns usage since the previous sample.
    pub fn sample(&mut self) -> Result<f64, MonitorError> {
        let cpu = ProcessCpuTime::read()?.total();
        Ok(self.sample_at(Instant::now(), cpu))
    }

    /// Records a reading taken at `wall` and returns the usage percentage.
    ///
    /// Returns 0 when no wall time has elapsed or CPU time went backwards.
    pub fn sample_at(&mut self, wall: Instant, cpu: Duration) -> f64 {
        let wall_delta = wall.saturating_duration_since(self.last_wall);
        let cpu_delta = cpu.saturating_sub(self.last_cpu);
        self.last_wall = wall;
        self.last_cpu = cpu;

        if wall_delta.is_zero() {
            return 0.0;
        }
        cpu_delta.as_secs_f64() / wall_delta.as_secs_f64() * 100.0
    }
}
