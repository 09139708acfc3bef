// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Static host description for report headers.

use crate::procfs::{find_kb_field, read_proc_file};
use std::path::Path;

const ONLINE_CPUS_PATH: &str = "/sys/devices/system/cpu/online";
const MEMINFO_PATH: &str = "/proc/meminfo";

/// Basic facts about the machine running the harness.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HostInfo {
    /// Number of online logical cores.
    pub logical_cores: u32,
    /// Total physical memory in bytes (0 if unknown).
    pub total_memory_bytes: u64,
    /// Target OS (`std::env::consts::OS`).
    pub os: &'static str,
    /// Target architecture (`std::env::consts::ARCH`).
    pub arch: &'static str,
}

impl HostInfo {
    /// Reads host information. Never fails; unknown fields fall back to
    /// `available_parallelism()` and zero.
    pub fn read() -> Self {
        let logical_cores = read_proc_file(Path::new(ONLINE_CPUS_PATH))
            .ok()
            .and_then(|s| parse_cpu_range(&s))
            .or_else(|| {
                std::thread::available_parallelism()
                    .ok()
                    .map(|n| n.get() as u32)
            })
            .unwrap_or(1);

        let meminfo = Path::new(MEMINFO_PATH);
        let total_memory_bytes = read_proc_file(meminfo)
            .ok()
            .and_then(|content| find_kb_field(&content, "MemTotal", meminfo).ok().flatten())
            .unwrap_or(0);

        tracing::debug!(
            "host: {logical_cores} cores, {} MB",
            total_memory_bytes / (1024 * 1024)
        );
        Self {
            logical_cores,
            total_memory_bytes,
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
        }
    }

    /// Returns a one-line description, e.g. `linux/x86_64, 8 cores, 15843 MB`.
    pub fn summary(&self) -> String {
        let mut s = format!("{}/{}, {} cores", self.os, self.arch, self.logical_cores);
        if self.total_memory_bytes > 0 {
            s.push_str(&format!(", {} MB", self.total_memory_bytes / (1024 * 1024)));
        }
        s
    }
}

/// Parses a CPU range string like `"0-3"` → 4, `"0"` → 1, `"0,2-3"` → 3.
fn parse_cpu_range(s: &str) -> Option<u32> {
    let mut total = 0u32;
    for part in s.split(',') {
        let part = part.trim();
        if let Some((start_s, end_s)) = part.split_once('-') {
            let start: u32 = start_s.trim().parse().ok()?;
            let end: u32 = end_s.trim().parse().ok()?;
            total += end.checked_sub(start)? + 1;
        } else {
            let _: u32 = part.parse().ok()?;
            total += 1;
        }
    }
    (total > 0).then_some(total)
}
