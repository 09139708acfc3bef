// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # resource-monitor
//!
//! Reads per-process resource usage from `/proc/self/` so the harness can
//! report what an inference workload actually costs.
//!
//! # Monitored Metrics
//! - **Resident memory**: `VmRSS` and the kernel high-water mark `VmHWM`
//!   from `/proc/self/status`.
//! - **CPU time**: `utime + stime` from `/proc/self/stat`.
//! - **CPU usage**: CPU-time delta over wall-time delta between two
//!   samples, as a percentage (may exceed 100 on multi-core hosts).
//! - **Host**: online core count and total memory, for report headers.
//!
//! # Graceful Degradation
//! Outside Linux, or in sandboxes without procfs, reads return
//! [`MonitorError::NotAvailable`]. Callers are expected to log once and
//! carry on with zeros rather than abort.
//!
//! # Example
//! ```no_run
//! use resource_monitor::{CpuUsageSampler, ProcessMemory};
//!
//! let mut cpu = CpuUsageSampler::start();
//! // ... do work ...
//! let mem = ProcessMemory::read().unwrap();
//! println!("rss {} MB, cpu {:.2}%", mem.resident_mb(), cpu.sample().unwrap());
//! ```

mod error;
mod host;
mod procfs;
mod process;
mod sampler;

pub use error::MonitorError;
pub use host::HostInfo;
pub use process::{ProcessCpuTime, ProcessMemory};
pub use sampler::CpuUsageSampler;
