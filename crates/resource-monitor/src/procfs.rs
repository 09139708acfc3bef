// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Shared helpers for reading `/proc` and `/sys` text files.

use crate::MonitorError;
use std::path::Path;

/// Reads a procfs/sysfs file and trims surrounding whitespace.
///
/// A missing file maps to [`MonitorError::NotAvailable`] so callers can
/// tell "unsupported host" apart from a genuine I/O failure.
pub(crate) fn read_proc_file(path: &Path) -> Result<String, MonitorError> {
    if !path.exists() {
        return Err(MonitorError::NotAvailable {
            path: path.display().to_string(),
        });
    }
    std::fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|e| MonitorError::ReadError {
            path: path.display().to_string(),
            source: e,
        })
}

/// Parses a `kB` value as found in `/proc/meminfo` and `/proc/<pid>/status`.
pub(crate) fn parse_kb_value(s: &str, source_path: &Path) -> Result<u64, MonitorError> {
    s.parse::<u64>().map_err(|_| MonitorError::ParseError {
        path: source_path.display().to_string(),
        detail: format!("expected integer kB value, got '{s}'"),
    })
}

/// Finds `key:` in a `Key:   value kB` style file and returns the value in bytes.
pub(crate) fn find_kb_field(
    content: &str,
    key: &str,
    source_path: &Path,
) -> Result<Option<u64>, MonitorError> {
    for line in content.lines() {
        let mut parts = line.split_whitespace();
        if parts.next().and_then(|k| k.strip_suffix(':')) == Some(key) {
            return match parts.next() {
                Some(v) => parse_kb_value(v, source_path).map(|kb| Some(kb * 1024)),
                None => Ok(None),
            };
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing_file() {
        let result = read_proc_file(Path::new("/nonexistent/proc/file"));
        assert!(matches!(result, Err(MonitorError::NotAvailable { .. })));
    }

    #[test]
    fn test_read_trims() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("value");
        std::fs::write(&path, "  0-3\n").unwrap();
        assert_eq!(read_proc_file(&path).unwrap(), "0-3");
    }

    #[test]
    fn test_find_kb_field() {
        let content = "Name:\tharness\nVmRSS:\t   2048 kB\nThreads:\t4\n";
        let p = Path::new("/proc/self/status");
        assert_eq!(find_kb_field(content, "VmRSS", p).unwrap(), Some(2048 * 1024));
        assert_eq!(find_kb_field(content, "VmHWM", p).unwrap(), None);
    }

    #[test]
    fn test_find_kb_field_garbage() {
        let p = Path::new("/proc/self/status");
        let result = find_kb_field("VmRSS: lots kB", "VmRSS", p);
        assert!(matches!(result, Err(MonitorError::ParseError { .. })));
    }
}
