// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for headnscale.
//!
//! This module provides specialized error types for:
//! - Startup configuration validation (fatal, the process exits)
//! - Container inventory discovery via the Docker Engine API
//! - Reconciliation cycle stages (recoverable, the next cycle retries)
//!
//! Only [`ConfigError`] is ever allowed to terminate the process. Every
//! [`ReconcileError`] is logged by the reconciler and the scheduler moves on.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while validating configuration at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting was not provided or was empty
    #[error("{field} is required")]
    MissingField {
        /// Environment variable (or flag) that was missing
        field: &'static str,
    },

    /// An address setting could not be parsed
    #[error("Invalid {family} address for {field}: {value}")]
    InvalidAddress {
        /// Environment variable (or flag) holding the address
        field: &'static str,
        /// Expected address family (`IPv4` or `IPv6`)
        family: &'static str,
        /// Raw value that failed to parse
        value: String,
    },

    /// Neither an IPv4 nor an IPv6 node address was configured
    #[error("At least one of HEADNSCALE_NODE_IP or HEADNSCALE_NODE_IP6 must be set")]
    NoAddress,

    /// A setting was present but outside its allowed range
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Environment variable (or flag) with the bad value
        field: &'static str,
        /// Explanation of what is invalid
        reason: String,
    },

    /// The Docker endpoint uses an unsupported scheme
    #[error("Unsupported Docker host '{0}' (expected unix:// or tcp://)")]
    InvalidDockerHost(String),
}

/// Errors that can occur while listing containers from the Docker Engine API.
///
/// The reconciler maps every variant to [`ReconcileError::Discovery`]; none
/// of them are fatal.
#[derive(Error, Debug)]
pub enum InventoryError {
    /// The Docker client could not be created for the endpoint
    #[error("Failed to create Docker client for {endpoint}: {source}")]
    Client {
        /// Configured endpoint
        endpoint: String,
        /// Underlying client error
        #[source]
        source: bollard::errors::Error,
    },

    /// The request failed in transport or while decoding the response
    #[error("Docker request to {endpoint} failed: {source}")]
    Request {
        /// Endpoint the request was sent to
        endpoint: String,
        /// Underlying client error
        #[source]
        source: bollard::errors::Error,
    },

    /// The request did not complete in time
    #[error("Docker request timed out after {timeout:?}")]
    Timeout {
        /// Timeout that elapsed
        timeout: Duration,
    },

    /// The daemon answered with a non-success status
    #[error("Docker API returned HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error message reported by the daemon
        message: String,
    },
}

/// Errors raised by a single reconciliation cycle.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// The container inventory could not be obtained; the cycle is skipped
    #[error("Discovery failed: {0}")]
    Discovery(#[from] InventoryError),

    /// Records could not be built or rendered
    #[error("Building {output} output failed: {reason}")]
    Build {
        /// Output being built (`records` or `hosts`)
        output: &'static str,
        /// Explanation of the failure
        reason: String,
    },

    /// An output file could not be written; the previous file is left in place
    #[error("Writing {output} output to {} failed: {source}", path.display())]
    Persist {
        /// Output being written (`records` or `hosts`)
        output: &'static str,
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ReconcileError {
    /// Cycle stage that produced the error, used as a log field and metric label.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Discovery(_) => "discover",
            Self::Build { .. } => "build",
            Self::Persist { .. } => "persist",
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
