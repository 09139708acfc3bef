// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The benchmark driver with a type-state pipeline.
//!
//! ```text
//! Harness<Idle>
//!     │  .load()            resolve + compile, record load time
//!     ▼
//! Harness<Ready>
//!     │  .run_benchmark()   warmup, then N measured calls
//!     ▼
//!   MetricsSummary          via .summarize()
//! ```
//!
//! The harness owns the only [`MetricsCollector`]; nothing else records
//! measurements.

use crate::{
    CallMode, ExecutableLoader, HarnessConfig, InferenceResult, InferenceRunner, MetricsCollector,
    MetricsError, MetricsSummary, ModelHandle, RuntimeError,
};
use std::time::{Duration, Instant};

// ── Type-state markers ─────────────────────────────────────────

/// Engine created, no model loaded.
#[derive(Debug)]
pub struct Idle;

/// Model loaded and compiled; calls can be issued.
#[derive(Debug)]
pub struct Ready {
    runner: InferenceRunner,
}

/// Sealed trait for harness states.
pub trait HarnessState: std::fmt::Debug {}
impl HarnessState for Idle {}
impl HarnessState for Ready {}

/// What a benchmark run produced besides the metrics.
#[derive(Debug)]
pub struct BenchmarkRun {
    /// Result of the final measured call, for output sampling.
    pub last: InferenceResult,
    /// Wall-clock time of the measured loop, including input preparation.
    pub wall_time: Duration,
}

/// The benchmark driver. `S` tracks the pipeline stage at compile time and
/// holds what only exists in that stage.
///
/// # Example
/// ```no_run
/// use runtime::{report, Harness, HarnessConfig};
///
/// # async fn example() -> Result<(), runtime::RuntimeError> {
/// let mut harness = Harness::new(HarnessConfig::image_preset())?.load()?;
/// let run = harness.run_benchmark().await?;
/// print!("{}", report::render_outputs(&run.last.outputs, 10));
/// print!("{}", report::render(harness.summarize().as_ref()));
/// # Ok(())
/// # }
/// ```
pub struct Harness<S: HarnessState = Idle> {
    config: HarnessConfig,
    loader: ExecutableLoader,
    metrics: MetricsCollector,
    state: S,
}

// ── Idle → Ready ───────────────────────────────────────────────

impl Harness<Idle> {
    /// Validates `config` and creates its engine.
    ///
    /// Device availability is checked here, once, so a missing accelerator
    /// fails before any model is loaded.
    pub fn new(config: HarnessConfig) -> Result<Self, RuntimeError> {
        config.validate()?;
        let loader = ExecutableLoader::from_config(&config)?;
        let metrics = MetricsCollector::new(config.sample_memory);
        tracing::info!("harness created: {}", config.summary());
        Ok(Self::with_parts(config, loader, metrics))
    }

    /// Assembles a harness from prepared parts (custom engines or probes).
    pub fn with_parts(
        config: HarnessConfig,
        loader: ExecutableLoader,
        metrics: MetricsCollector,
    ) -> Self {
        Self {
            config,
            loader,
            metrics,
            state: Idle,
        }
    }

    /// Loads and compiles the configured model, recording the load time.
    pub fn load(mut self) -> Result<Harness<Ready>, RuntimeError> {
        let start = Instant::now();
        let handle = self
            .loader
            .load(&self.config.model_path, &self.config.compilation)?;
        let load_time = start.elapsed();

        self.metrics.record_load(load_time);
        self.metrics.sample_memory();
        tracing::info!(
            "model '{}' loaded in {:.4}ms",
            handle.name(),
            load_time.as_secs_f64() * 1000.0
        );

        Ok(Harness {
            config: self.config,
            loader: self.loader,
            metrics: self.metrics,
            state: Ready {
                runner: InferenceRunner::new(handle),
            },
        })
    }
}

// ── Ready: issue calls ─────────────────────────────────────────

impl Harness<Ready> {
    /// The loaded model.
    pub fn handle(&self) -> &ModelHandle {
        self.state.runner.handle()
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Summary of everything recorded so far.
    pub fn summarize(&self) -> Result<MetricsSummary, MetricsError> {
        self.metrics.summarize()
    }

    /// Runs one measured call with freshly materialised inputs.
    pub fn run_once(&mut self) -> Result<InferenceResult, RuntimeError> {
        let inputs = self.config.materialize_inputs()?;
        let result = self.state.runner.run(inputs)?;
        self.observe(&result);
        Ok(result)
    }

    /// Issues `warmup` unmeasured calls, then `iterations` measured calls
    /// in the configured [`CallMode`].
    ///
    /// In [`CallMode::Sync`] each call blocks the current thread.
    pub async fn run_benchmark(&mut self) -> Result<BenchmarkRun, RuntimeError> {
        let iterations = self.config.iterations;
        if iterations == 0 {
            return Err(RuntimeError::Config("iterations must be at least 1".into()));
        }

        if self.config.warmup > 0 {
            tracing::info!("warming up with {} calls", self.config.warmup);
            for _ in 0..self.config.warmup {
                self.state.runner.run(self.config.materialize_inputs()?)?;
            }
            self.metrics.rebase_cpu();
        }

        let name = self.handle().name().to_string();
        tracing::info!("running {iterations} {} inferences on '{name}'", self.config.mode);
        let start = Instant::now();
        let last = match self.config.mode {
            CallMode::Sync => self.run_sync(iterations)?,
            CallMode::Pipelined => self.run_pipelined(iterations).await?,
        };
        let wall_time = start.elapsed();

        tracing::info!(
            "benchmark finished: {iterations} calls in {:.4}ms",
            wall_time.as_secs_f64() * 1000.0
        );
        Ok(BenchmarkRun { last, wall_time })
    }

    fn run_sync(&mut self, iterations: usize) -> Result<InferenceResult, RuntimeError> {
        let mut last = self.run_once()?;
        tracing::info!("first inference completed");
        for _ in 1..iterations {
            last = self.run_once()?;
        }
        Ok(last)
    }

    /// Keeps one call in flight while the next call's inputs are prepared.
    async fn run_pipelined(&mut self, iterations: usize) -> Result<InferenceResult, RuntimeError> {
        let runner = self.state.runner.clone();
        let mut pending = Some(runner.submit(self.config.materialize_inputs()?)?);
        let mut completed = 0;
        let mut last = None;

        while let Some(call) = pending.take() {
            completed += 1;
            let next_inputs = if completed < iterations {
                Some(self.config.materialize_inputs()?)
            } else {
                None
            };

            let result = call.wait().await?;
            self.observe(&result);
            if completed == 1 {
                tracing::info!("first inference completed");
            }

            if let Some(inputs) = next_inputs {
                pending = Some(runner.submit(inputs)?);
            }
            last = Some(result);
        }

        last.ok_or_else(|| RuntimeError::Execution("no inference was issued".into()))
    }

    fn observe(&mut self, result: &InferenceResult) {
        self.metrics.record_inference(result.duration);
        self.metrics.sample_memory();
        self.metrics.sample_cpu();
    }
}

impl<S: HarnessState> std::fmt::Debug for Harness<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harness")
            .field("model_path", &self.config.model_path)
            .field("engine", &self.loader.engine().name())
            .field("state", &self.state)
            .field("metrics", &self.metrics)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ReferenceEngine;
    use crate::metrics::ResourceProbe;
    use crate::InputFill;
    use resource_monitor::MonitorError;
    use tensor_core::DType;

    struct ConstantProbe;

    impl ResourceProbe for ConstantProbe {
        fn memory_bytes(&mut self) -> Result<u64, MonitorError> {
            Ok(64 * 1024 * 1024)
        }
        fn cpu_percent(&mut self) -> Result<f64, MonitorError> {
            Ok(100.0)
        }
    }

    fn tiny_config(dir: &std::path::Path) -> HarnessConfig {
        std::fs::write(
            dir.join("model.json"),
            r#"{ "name": "tiny",
                "inputs":  [{ "name": "x", "dtype": "float32", "shape": [2, 3] }],
                "outputs": [{ "name": "y", "dtype": "float32", "shape": [4] }] }"#,
        )
        .unwrap();
        HarnessConfig {
            model_path: dir.to_path_buf(),
            iterations: 5,
            inputs: vec![InputFill::new("x", [2, 3], DType::F32, 0.0)],
            ..HarnessConfig::default()
        }
    }

    fn harness(config: HarnessConfig) -> Harness<Idle> {
        Harness::with_parts(
            config,
            ExecutableLoader::new(Box::new(ReferenceEngine)),
            MetricsCollector::with_probe(Box::new(ConstantProbe), true),
        )
    }

    #[test]
    fn test_load_records_load_time() {
        let dir = tempfile::tempdir().unwrap();
        let mut ready = harness(tiny_config(dir.path())).load().unwrap();
        assert_eq!(ready.handle().outputs()[0].name, "y");
        assert!(format!("{ready:?}").contains("Ready { runner"));
        assert_eq!(ready.summarize(), Err(MetricsError::NoSamples));

        ready.run_once().unwrap();
        let s = ready.summarize().unwrap();
        assert_eq!(s.count, 1);
        assert_eq!(s.peak_memory_bytes, Some(64 * 1024 * 1024));
        assert!((s.average_cpu_percent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_load_missing_model() {
        let config = HarnessConfig {
            model_path: "/no/such/package".into(),
            ..HarnessConfig::default()
        };
        assert!(matches!(
            harness(config).load(),
            Err(RuntimeError::ResourceNotFound { .. })
        ));
    }

    #[test]
    fn test_new_rejects_gpu_for_reference() {
        let config = HarnessConfig {
            device: "gpu".into(),
            ..HarnessConfig::default()
        };
        assert!(matches!(
            Harness::new(config),
            Err(RuntimeError::DeviceUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_sync_benchmark_counts() {
        let dir = tempfile::tempdir().unwrap();
        let config = HarnessConfig {
            warmup: 2,
            ..tiny_config(dir.path())
        };
        let mut ready = harness(config).load().unwrap();
        let run = ready.run_benchmark().await.unwrap();
        assert_eq!(run.last.outputs.len(), 1);
        assert_eq!(ready.summarize().unwrap().count, 5);
    }

    #[tokio::test]
    async fn test_pipelined_benchmark_counts() {
        let dir = tempfile::tempdir().unwrap();
        let config = HarnessConfig {
            mode: CallMode::Pipelined,
            ..tiny_config(dir.path())
        };
        let mut ready = harness(config).load().unwrap();
        let run = ready.run_benchmark().await.unwrap();
        assert_eq!(run.last.outputs[0].name(), "y");
        let s = ready.summarize().unwrap();
        assert_eq!(s.count, 5);
        assert!(s.total_inference_time <= run.wall_time);
    }
}
