// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for headnscale.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Label Constants
// ============================================================================

/// Default container label whose value holds the desired hostname(s)
pub const DEFAULT_LABEL_KEY: &str = "headnscale.subdomain";

/// Separator between multiple hostnames in a single label value
pub const HOSTNAME_DELIMITER: char = '|';

// ============================================================================
// Domain Constants
// ============================================================================

/// Default base domain appended after the node hostname
pub const DEFAULT_BASE_DOMAIN: &str = "ts.net";

// ============================================================================
// Scheduling Constants
// ============================================================================

/// Default interval between reconciliation cycles (1 minute)
pub const DEFAULT_REFRESH_SECS: u64 = 60;

// ============================================================================
// Docker Constants
// ============================================================================

/// Default Docker Engine endpoint
pub const DEFAULT_DOCKER_HOST: &str = "unix:///var/run/docker.sock";

/// Container state reported by Docker for running containers
pub const DOCKER_STATE_RUNNING: &str = "running";

/// Upper bound for a single container listing request (10 seconds)
pub const DOCKER_REQUEST_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// HTTP Constants
// ============================================================================

/// Default port for the hosts/metrics HTTP responder
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Route serving the hosts file
pub const HOSTS_ROUTE: &str = "/hosts";

/// Root route, also serving the hosts file
pub const ROOT_ROUTE: &str = "/";

/// Route serving Prometheus metrics
pub const METRICS_ROUTE: &str = "/metrics";

// ============================================================================
// Output Constants
// ============================================================================

/// Output label for the structured JSON records file (logs and metrics)
pub const OUTPUT_RECORDS: &str = "records";

/// Output label for the hosts file (logs and metrics)
pub const OUTPUT_HOSTS: &str = "hosts";

/// File mode applied to written output files
pub const OUTPUT_FILE_MODE: u32 = 0o644;
