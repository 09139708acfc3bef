// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for resource monitoring.

/// Errors that can occur when reading process or host resources.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Failed to read a procfs or sysfs file.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse a value from a system file.
    #[error("failed to parse value from {path}: {detail}")]
    ParseError { path: String, detail: String },

    /// The expected procfs path does not exist (not Linux, or procfs not mounted).
    #[error("{path} not available on this host")]
    NotAvailable { path: String },
}
