// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-process memory and CPU time from `/proc/self/`.

use crate::procfs::{find_kb_field, read_proc_file};
use crate::MonitorError;
use std::path::Path;
use std::time::Duration;

const STATUS_PATH: &str = "/proc/self/status";
const STAT_PATH: &str = "/proc/self/stat";

/// Kernel clock ticks per second for `utime`/`stime`.
///
/// `USER_HZ` is fixed at 100 on every mainstream Linux architecture.
const CLOCK_TICKS_PER_SEC: u64 = 100;

/// Resident memory of the current process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ProcessMemory {
    /// Current resident set size (`VmRSS`) in bytes.
    pub resident_bytes: u64,
    /// Peak resident set size (`VmHWM`) in bytes, as tracked by the kernel.
    /// Zero when the kernel does not report it.
    pub peak_resident_bytes: u64,
}

impl ProcessMemory {
    /// Reads `/proc/self/status`.
    pub fn read() -> Result<Self, MonitorError> {
        Self::read_from(Path::new(STATUS_PATH))
    }

    pub(crate) fn read_from(path: &Path) -> Result<Self, MonitorError> {
        let content = read_proc_file(path)?;
        Self::parse(&content, path)
    }

    /// Parses a `/proc/<pid>/status`-formatted string.
    pub(crate) fn parse(content: &str, source_path: &Path) -> Result<Self, MonitorError> {
        let resident_bytes =
            find_kb_field(content, "VmRSS", source_path)?.ok_or_else(|| MonitorError::ParseError {
                path: source_path.display().to_string(),
                detail: "VmRSS not found".to_string(),
            })?;
        let peak_resident_bytes = find_kb_field(content, "VmHWM", source_path)?.unwrap_or(0);

        Ok(Self {
            resident_bytes,
            peak_resident_bytes,
        })
    }

    /// Resident memory in megabytes.
    pub fn resident_mb(&self) -> f64 {
        self.resident_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Accumulated CPU time of the current process (all threads).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ProcessCpuTime {
    /// Ticks scheduled in user mode.
    pub user_ticks: u64,
    /// Ticks scheduled in kernel mode.
    pub system_ticks: u64,
}

impl ProcessCpuTime {
    /// Reads `/proc/self/stat`.
    pub fn read() -> Result<Self, MonitorError> {
        Self::read_from(Path::new(STAT_PATH))
    }

    pub(crate) fn read_from(path: &Path) -> Result<Self, MonitorError> {
        let content = read_proc_file(path)?;
        Self::parse(&content, path)
    }

    /// Parses a `/proc/<pid>/stat` line.
    ///
    /// The second field is the command name in parentheses and may itself
    /// contain spaces or parentheses, so fields are counted from the last `)`.
    pub(crate) fn parse(content: &str, source_path: &Path) -> Result<Self, MonitorError> {
        let parse_error = |detail: &str| MonitorError::ParseError {
            path: source_path.display().to_string(),
            detail: detail.to_string(),
        };

        let after_comm = content
            .rfind(')')
            .map(|i| &content[i + 1..])
            .ok_or_else(|| parse_error("missing ')' after command name"))?;

        // Fields after comm start at field 3 (state); utime is 14, stime is 15.
        let fields: Vec<&str> = after_comm.split_whitespace().collect();
        let field = |index: usize, label: &str| -> Result<u64, MonitorError> {
            fields
                .get(index)
                .ok_or_else(|| parse_error(&format!("{label} field missing")))?
                .parse::<u64>()
                .map_err(|_| parse_error(&format!("{label} is not an integer")))
        };

        Ok(Self {
            user_ticks: field(11, "utime")?,
            system_ticks: field(12, "stime")?,
        })
    }

    /// Total CPU time (`utime + stime`).
    pub fn total(&self) -> Duration {
        let ticks = self.user_ticks + self.system_ticks;
        Duration::from_millis(ticks * 1000 / CLOCK_TICKS_PER_SEC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_STATUS: &str = "\
Name:\tinfer-harness
Umask:\t0022
State:\tR (running)
VmPeak:\t 2345678 kB
VmSize:\t 2300000 kB
VmHWM:\t  812340 kB
VmRSS:\t  798112 kB
Threads:\t9
";

    const SAMPLE_STAT: &str = "4242 (infer harness) R 1 4242 4242 0 -1 4194304 \
        120 0 0 0 1500 250 0 0 20 0 9 0 12345 2355000000 199528 18446744073709551615";

    #[test]
    fn test_parse_status() {
        let mem = ProcessMemory::parse(SAMPLE_STATUS, Path::new(STATUS_PATH)).unwrap();
        assert_eq!(mem.resident_bytes, 798112 * 1024);
        assert_eq!(mem.peak_resident_bytes, 812340 * 1024);
    }

    #[test]
    fn test_resident_mb() {
        let mem = ProcessMemory {
            resident_bytes: 3 * 1024 * 1024 / 2,
            peak_resident_bytes: 0,
        };
        assert!((mem.resident_mb() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_status_without_rss() {
        let result = ProcessMemory::parse("Name:\tkthreadd\n", Path::new(STATUS_PATH));
        assert!(matches!(result, Err(MonitorError::ParseError { .. })));
    }

    #[test]
    fn test_status_without_hwm() {
        let mem = ProcessMemory::parse("VmRSS:\t 100 kB\n", Path::new(STATUS_PATH)).unwrap();
        assert_eq!(mem.peak_resident_bytes, 0);
    }

    #[test]
    fn test_parse_stat() {
        let cpu = ProcessCpuTime::parse(SAMPLE_STAT, Path::new(STAT_PATH)).unwrap();
        assert_eq!(cpu.user_ticks, 1500);
        assert_eq!(cpu.system_ticks, 250);
        assert_eq!(cpu.total(), Duration::from_millis(17_500));
    }

    #[test]
    fn test_parse_stat_paren_in_comm() {
        let line = "77 (a) b) S 1 77 77 0 -1 0 0 0 0 0 30 20 0 0 20 0 1 0 5 0 0";
        let cpu = ProcessCpuTime::parse(line, Path::new(STAT_PATH)).unwrap();
        assert_eq!(cpu.user_ticks, 30);
        assert_eq!(cpu.system_ticks, 20);
    }

    #[test]
    fn test_parse_stat_truncated() {
        let result = ProcessCpuTime::parse("1 (x) R 0 0", Path::new(STAT_PATH));
        assert!(matches!(result, Err(MonitorError::ParseError { .. })));
    }

    #[test]
    fn test_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status");
        std::fs::write(&path, SAMPLE_STATUS).unwrap();
        let mem = ProcessMemory::read_from(&path).unwrap();
        assert_eq!(mem.resident_bytes, 798112 * 1024);
    }

    #[test]
    fn test_read_real_procfs() {
        if Path::new(STATUS_PATH).exists() {
            let mem = ProcessMemory::read().unwrap();
            assert!(mem.resident_bytes > 0);
        }
        if Path::new(STAT_PATH).exists() {
            assert!(ProcessCpuTime::read().is_ok());
        }
    }
}
