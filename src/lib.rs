// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # Headnscale - Docker label driven DNS records for Headscale
//!
//! Headnscale runs next to a Headscale node, watches the local container
//! runtime for containers carrying a subdomain label, and periodically
//! regenerates two files:
//!
//! - a Headscale `extra_records` JSON file with one A/AAAA record per
//!   published hostname
//! - an optional hosts file with the same names in `address fqdn` form
//!
//! ## Modules
//!
//! - [`config`] - Flag and environment configuration
//! - [`docker`] - Container inventory over the Docker Engine API
//! - [`labels`] - Hostname fragment extraction from container labels
//! - [`records`] - Record building, ordering, and rendering
//! - [`persist`] - Atomic output file writes
//! - [`reconciler`] - One discovery-to-persist cycle
//! - [`scheduler`] - Periodic, non-overlapping cycle execution
//! - [`http`] - Hosts file and metrics responder
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust,no_run
//! use headnscale::labels::extract_fragments;
//! use headnscale::records::{build_records, sort_records, NodeAddress};
//! use std::collections::BTreeMap;
//!
//! let labels = BTreeMap::from([(
//!     "headnscale.subdomain".to_string(),
//!     "web|api".to_string(),
//! )]);
//! let fragments = extract_fragments(&labels, "headnscale.subdomain", '|');
//! let address = NodeAddress::new(Some("100.64.0.5".parse().unwrap()), None);
//! let records = sort_records(build_records(&fragments, "node1.ts.net", &address));
//! assert_eq!(records[0].name, "api.node1.ts.net");
//! ```

pub mod config;
pub mod constants;
pub mod docker;
pub mod errors;
pub mod http;
pub mod inventory;
pub mod labels;
pub mod metrics;
pub mod persist;
pub mod reconciler;
pub mod records;
pub mod scheduler;

pub use config::{Args, Config};
pub use errors::{ConfigError, InventoryError, ReconcileError};
pub use inventory::{InventorySource, Workload};
pub use reconciler::{CycleStatus, Reconciler};
pub use scheduler::Scheduler;
