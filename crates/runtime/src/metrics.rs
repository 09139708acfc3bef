// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Timing, memory and CPU measurements across repeated inference calls.
//!
//! [`MetricsAccumulator`] holds running totals and turns them into a
//! [`MetricsSummary`]. [`MetricsCollector`] wraps an accumulator together
//! with a [`ResourceProbe`] that samples the process after each call.

use crate::MetricsError;
use resource_monitor::{CpuUsageSampler, MonitorError, ProcessMemory};
use std::time::Duration;

/// Running totals for one benchmark.
#[derive(Debug, Clone, Default)]
pub struct MetricsAccumulator {
    count: u64,
    total: Duration,
    first: Option<Duration>,
    min: Option<Duration>,
    max: Option<Duration>,
    load: Duration,
    peak_memory_bytes: u64,
    memory_samples: u64,
    cpu_samples: Vec<f64>,
}

impl MetricsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records how long loading and compiling the model took.
    pub fn record_load(&mut self, duration: Duration) {
        self.load = duration;
    }

    /// Records one inference call.
    pub fn record_inference(&mut self, duration: Duration) {
        if self.first.is_none() {
            self.first = Some(duration);
        }
        self.count += 1;
        self.total += duration;
        self.min = Some(self.min.map_or(duration, |m| m.min(duration)));
        self.max = Some(self.max.map_or(duration, |m| m.max(duration)));
    }

    /// Records a resident memory sample in bytes.
    pub fn record_memory(&mut self, bytes: u64) {
        self.memory_samples += 1;
        self.peak_memory_bytes = self.peak_memory_bytes.max(bytes);
    }

    /// Records a CPU usage sample in percent.
    pub fn record_cpu(&mut self, percent: f64) {
        self.cpu_samples.push(percent);
    }

    /// Number of inference calls recorded.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Computes summary statistics.
    ///
    /// Fails with [`MetricsError::NoSamples`] before the first
    /// [`record_inference`](Self::record_inference).
    pub fn summarize(&self) -> Result<MetricsSummary, MetricsError> {
        let (Some(first), Some(min), Some(max)) = (self.first, self.min, self.max) else {
            return Err(MetricsError::NoSamples);
        };
        if self.count == 0 {
            return Err(MetricsError::NoSamples);
        }

        let average = Duration::from_nanos((self.total.as_nanos() / u128::from(self.count)) as u64);
        let average_secs = average.as_secs_f64();
        let throughput_per_second = if average_secs > 0.0 {
            1.0 / average_secs
        } else {
            0.0
        };
        let average_cpu = if self.cpu_samples.is_empty() {
            0.0
        } else {
            self.cpu_samples.iter().sum::<f64>() / self.cpu_samples.len() as f64
        };

        Ok(MetricsSummary {
            load_time: self.load,
            first_inference_time: first,
            total_inference_time: self.total,
            average_inference_time: average,
            min_inference_time: min,
            max_inference_time: max,
            throughput_per_second,
            average_cpu_percent: average_cpu,
            peak_memory_bytes: (self.memory_samples > 0).then_some(self.peak_memory_bytes),
            count: self.count,
        })
    }
}

/// Final statistics for a benchmark.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MetricsSummary {
    pub load_time: Duration,
    pub first_inference_time: Duration,
    pub total_inference_time: Duration,
    /// `total_inference_time / count`.
    pub average_inference_time: Duration,
    pub min_inference_time: Duration,
    pub max_inference_time: Duration,
    /// `1 / average_inference_time`, in calls per second.
    pub throughput_per_second: f64,
    /// Mean of the CPU samples; 0 if none were taken.
    pub average_cpu_percent: f64,
    /// Largest resident memory sample; `None` if memory was not sampled.
    pub peak_memory_bytes: Option<u64>,
    pub count: u64,
}

impl MetricsSummary {
    /// Peak memory in megabytes, if sampled.
    pub fn peak_memory_mb(&self) -> Option<f64> {
        self.peak_memory_bytes
            .map(|b| b as f64 / (1024.0 * 1024.0))
    }

    /// Returns a one-line summary for logs.
    pub fn summary(&self) -> String {
        let memory = self
            .peak_memory_mb()
            .map_or_else(|| "not sampled".to_string(), |mb| format!("{mb:.2} MB"));
        format!(
            "{} calls, avg {:.4}ms (min {:.4}ms, max {:.4}ms), {:.2}/s, cpu {:.2}%, peak {}",
            self.count,
            self.average_inference_time.as_secs_f64() * 1000.0,
            self.min_inference_time.as_secs_f64() * 1000.0,
            self.max_inference_time.as_secs_f64() * 1000.0,
            self.throughput_per_second,
            self.average_cpu_percent,
            memory,
        )
    }
}

// ── Resource probes ────────────────────────────────────────────

/// Source of process memory and CPU readings.
pub trait ResourceProbe: Send {
    /// Current resident memory in bytes.
    fn memory_bytes(&mut self) -> Result<u64, MonitorError>;

    /// CPU usage in percent since the previous call.
    fn cpu_percent(&mut self) -> Result<f64, MonitorError>;
}

/// Reads the current process from procfs.
#[derive(Debug)]
pub struct ProcfsProbe {
    cpu: CpuUsageSampler,
}

impl ProcfsProbe {
    /// Creates a probe. The CPU baseline is taken now.
    pub fn new() -> Self {
        Self {
            cpu: CpuUsageSampler::start(),
        }
    }
}

impl Default for ProcfsProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceProbe for ProcfsProbe {
    fn memory_bytes(&mut self) -> Result<u64, MonitorError> {
        ProcessMemory::read().map(|m| m.resident_bytes)
    }

    fn cpu_percent(&mut self) -> Result<f64, MonitorError> {
        self.cpu.sample()
    }
}

// ── Collector ──────────────────────────────────────────────────

/// Records timings and samples resources into one accumulator.
///
/// Sampling failures never abort a benchmark: the first failure of each
/// kind is logged at `warn` and the sample reads as 0 from then on.
pub struct MetricsCollector {
    accumulator: MetricsAccumulator,
    probe: Box<dyn ResourceProbe>,
    sample_memory: bool,
    memory_failed: bool,
    cpu_failed: bool,
}

impl MetricsCollector {
    /// Creates a collector backed by procfs.
    pub fn new(sample_memory: bool) -> Self {
        Self::with_probe(Box::new(ProcfsProbe::new()), sample_memory)
    }

    pub fn with_probe(probe: Box<dyn ResourceProbe>, sample_memory: bool) -> Self {
        Self {
            accumulator: MetricsAccumulator::new(),
            probe,
            sample_memory,
            memory_failed: false,
            cpu_failed: false,
        }
    }

    pub fn record_load(&mut self, duration: Duration) {
        self.accumulator.record_load(duration);
    }

    pub fn record_inference(&mut self, duration: Duration) {
        self.accumulator.record_inference(duration);
    }

    /// Samples resident memory and returns it in bytes.
    ///
    /// Returns 0 without sampling when memory sampling is disabled.
    pub fn sample_memory(&mut self) -> u64 {
        if !self.sample_memory {
            return 0;
        }
        if self.memory_failed {
            return 0;
        }
        match self.probe.memory_bytes() {
            Ok(bytes) => {
                self.accumulator.record_memory(bytes);
                bytes
            }
            Err(e) => {
                tracing::warn!("memory sampling unavailable, reporting 0: {e}");
                self.memory_failed = true;
                0
            }
        }
    }

    /// Samples CPU usage since the previous sample and returns it in percent.
    pub fn sample_cpu(&mut self) -> f64 {
        if self.cpu_failed {
            return 0.0;
        }
        match self.probe.cpu_percent() {
            Ok(percent) => {
                self.accumulator.record_cpu(percent);
                percent
            }
            Err(e) => {
                tracing::warn!("CPU sampling unavailable, reporting 0: {e}");
                self.cpu_failed = true;
                0.0
            }
        }
    }

    /// Restarts the CPU delta window without recording a sample.
    pub fn rebase_cpu(&mut self) {
        if self.cpu_failed {
            return;
        }
        if let Err(e) = self.probe.cpu_percent() {
            tracing::warn!("CPU sampling unavailable, reporting 0: {e}");
            self.cpu_failed = true;
        }
    }

    pub fn count(&self) -> u64 {
        self.accumulator.count()
    }

    pub fn summarize(&self) -> Result<MetricsSummary, MetricsError> {
        self.accumulator.summarize()
    }
}

impl std::fmt::Debug for MetricsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsCollector")
            .field("accumulator", &self.accumulator)
            .field("sample_memory", &self.sample_memory)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// Replays fixed readings.
    struct FakeProbe {
        memory: Vec<u64>,
        cpu: Vec<f64>,
    }

    impl ResourceProbe for FakeProbe {
        fn memory_bytes(&mut self) -> Result<u64, MonitorError> {
            if self.memory.is_empty() {
                return Err(MonitorError::NotAvailable {
                    path: "/proc/self/status".into(),
                });
            }
            Ok(self.memory.remove(0))
        }

        fn cpu_percent(&mut self) -> Result<f64, MonitorError> {
            if self.cpu.is_empty() {
                return Err(MonitorError::NotAvailable {
                    path: "/proc/self/stat".into(),
                });
            }
            Ok(self.cpu.remove(0))
        }
    }

    #[test]
    fn test_no_samples() {
        let acc = MetricsAccumulator::new();
        assert_eq!(acc.summarize(), Err(MetricsError::NoSamples));

        let mut with_load = MetricsAccumulator::new();
        with_load.record_load(ms(40));
        assert_eq!(with_load.summarize(), Err(MetricsError::NoSamples));
    }

    #[test]
    fn test_average_and_first() {
        let mut acc = MetricsAccumulator::new();
        acc.record_load(ms(250));
        for d in [ms(30), ms(10), ms(20)] {
            acc.record_inference(d);
        }
        let s = acc.summarize().unwrap();
        assert_eq!(s.count, 3);
        assert_eq!(s.load_time, ms(250));
        assert_eq!(s.first_inference_time, ms(30));
        assert_eq!(s.total_inference_time, ms(60));
        assert_eq!(s.average_inference_time, ms(20));
        assert_eq!(s.min_inference_time, ms(10));
        assert_eq!(s.max_inference_time, ms(30));
        assert!((s.throughput_per_second - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_sample_first_equals_average() {
        let mut acc = MetricsAccumulator::new();
        acc.record_inference(ms(7));
        let s = acc.summarize().unwrap();
        assert_eq!(s.first_inference_time, s.average_inference_time);
    }

    #[test]
    fn test_peak_memory_and_cpu() {
        let mut acc = MetricsAccumulator::new();
        acc.record_inference(ms(1));
        acc.record_memory(300);
        acc.record_memory(900);
        acc.record_memory(600);
        acc.record_cpu(50.0);
        acc.record_cpu(150.0);
        let s = acc.summarize().unwrap();
        assert_eq!(s.peak_memory_bytes, Some(900));
        assert!((s.average_cpu_percent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_memory_not_sampled() {
        let mut acc = MetricsAccumulator::new();
        acc.record_inference(ms(1));
        let s = acc.summarize().unwrap();
        assert_eq!(s.peak_memory_bytes, None);
        assert_eq!(s.average_cpu_percent, 0.0);
        assert!(s.summary().contains("not sampled"));
    }

    #[test]
    fn test_collector_degrades_to_zero() {
        let probe = FakeProbe {
            memory: vec![1024],
            cpu: vec![],
        };
        let mut c = MetricsCollector::with_probe(Box::new(probe), true);
        assert_eq!(c.sample_memory(), 1024);
        assert_eq!(c.sample_memory(), 0);
        assert_eq!(c.sample_memory(), 0);
        assert_eq!(c.sample_cpu(), 0.0);

        c.record_inference(ms(2));
        let s = c.summarize().unwrap();
        assert_eq!(s.peak_memory_bytes, Some(1024));
    }

    #[test]
    fn test_rebase_discards_window() {
        let probe = FakeProbe {
            memory: vec![],
            cpu: vec![400.0, 60.0],
        };
        let mut c = MetricsCollector::with_probe(Box::new(probe), false);
        c.rebase_cpu();
        assert_eq!(c.sample_cpu(), 60.0);
        c.record_inference(ms(1));
        assert!((c.summarize().unwrap().average_cpu_percent - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_rebase_failure_disables_cpu() {
        let probe = FakeProbe {
            memory: vec![],
            cpu: vec![],
        };
        let mut c = MetricsCollector::with_probe(Box::new(probe), false);
        c.rebase_cpu();
        assert!(c.cpu_failed);
        assert_eq!(c.sample_cpu(), 0.0);
    }

    #[test]
    fn test_collector_memory_disabled() {
        let probe = FakeProbe {
            memory: vec![4096],
            cpu: vec![25.0],
        };
        let mut c = MetricsCollector::with_probe(Box::new(probe), false);
        assert_eq!(c.sample_memory(), 0);
        assert_eq!(c.sample_cpu(), 25.0);
        c.record_inference(ms(2));
        assert_eq!(c.summarize().unwrap().peak_memory_bytes, None);
    }

    #[test]
    fn test_procfs_probe() {
        let mut probe = ProcfsProbe::new();
        if std::path::Path::new("/proc/self/status").exists() {
            assert!(probe.memory_bytes().unwrap() > 0);
            assert!(probe.cpu_percent().unwrap() >= 0.0);
        }
    }
}
