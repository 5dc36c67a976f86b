// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation cycle.
//!
//! One cycle turns a point-in-time container inventory into the two output
//! files:
//!
//! ```text
//! Discover → Filter → Extract → Build(primary[, bare]) → Merge → Sort → Persist → Report
//! ```
//!
//! - **Discover** failures skip the cycle; nothing is written and the previous
//!   files stay in place.
//! - **Filter/Extract/Build/Sort** are pure ([`build_snapshot`]); the output is
//!   a function of the inventory and the configuration only.
//! - **Persist** writes each output independently. A failure writing one
//!   output is logged and does not stop the other.
//!
//! No error escapes [`Reconciler::reconcile`]; the scheduler keeps running
//! whatever happens inside a cycle.

use crate::config::Config;
use crate::constants::{HOSTNAME_DELIMITER, OUTPUT_HOSTS, OUTPUT_RECORDS};
use crate::errors::ReconcileError;
use crate::inventory::{InventorySource, Workload};
use crate::labels::{extract_fragments, has_label};
use crate::metrics;
use crate::persist::{write_atomic, PersistOutcome};
use crate::records::{
    build_hosts_lines, build_records, render_hosts, render_records, sort_hosts_lines,
    sort_records, DnsRecord, HostsLine,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Sorted records derived from one inventory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    /// Workloads carrying the label key
    pub labeled_workloads: usize,
    /// Hostname fragments, workload order then split order
    pub fragments: Vec<String>,
    /// Sorted structured records
    pub records: Vec<DnsRecord>,
    /// Sorted hosts lines
    pub hosts_lines: Vec<HostsLine>,
}

/// Derive the sorted record set for `workloads` under `config`.
///
/// Workloads without the label key are skipped. Fragments are published
/// under every domain from [`Config::domains`], primary first, and each
/// output is then sorted independently.
#[must_use]
pub fn build_snapshot(config: &Config, workloads: &[Workload]) -> Snapshot {
    let labeled: Vec<&Workload> = workloads
        .iter()
        .filter(|w| has_label(&w.labels, &config.label_key))
        .collect();

    let fragments: Vec<String> = labeled
        .iter()
        .flat_map(|w| {
            let fragments = extract_fragments(&w.labels, &config.label_key, HOSTNAME_DELIMITER);
            debug!(container = %w.name, fragments = ?fragments, "Labeled container");
            fragments
        })
        .collect();

    let mut records = Vec::new();
    let mut hosts_lines = Vec::new();
    for domain in config.domains() {
        records.extend(build_records(&fragments, &domain, &config.node.address));
        hosts_lines.extend(build_hosts_lines(&fragments, &domain, &config.node.address));
    }

    Snapshot {
        labeled_workloads: labeled.len(),
        fragments,
        records: sort_records(records),
        hosts_lines: sort_hosts_lines(hosts_lines),
    }
}

/// Result of writing one output file.
#[derive(Debug)]
pub struct OutputReport {
    /// Output label (`records` or `hosts`)
    pub output: &'static str,
    /// Entries rendered into the output
    pub entries: usize,
    /// Write outcome
    pub result: Result<PersistOutcome, ReconcileError>,
}

/// Outcome of one cycle that got past discovery.
#[derive(Debug)]
pub struct CycleReport {
    /// Workloads carrying the label key
    pub labeled_workloads: usize,
    /// Hostname fragments extracted
    pub fragments: usize,
    /// One entry per configured output, records first
    pub outputs: Vec<OutputReport>,
}

impl CycleReport {
    /// Overall cycle status derived from the output results.
    #[must_use]
    pub fn status(&self) -> CycleStatus {
        let written = self.outputs.iter().filter(|o| o.result.is_ok()).count();
        if written == self.outputs.len() {
            CycleStatus::Success
        } else if written > 0 {
            CycleStatus::Partial
        } else {
            CycleStatus::Failed
        }
    }

    /// Report for a single output, if it was configured.
    #[must_use]
    pub fn output(&self, output: &str) -> Option<&OutputReport> {
        self.outputs.iter().find(|o| o.output == output)
    }
}

/// Coarse cycle outcome, used for logs and the `cycles_total` metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    /// Every configured output was written
    Success,
    /// Some outputs were written, others failed
    Partial,
    /// Nothing was written
    Failed,
}

impl CycleStatus {
    /// Metric label for the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Failed => "error",
        }
    }
}

/// Runs reconciliation cycles against an inventory source.
pub struct Reconciler {
    config: Config,
    inventory: Arc<dyn InventorySource>,
}

impl Reconciler {
    /// Create a reconciler for `config` reading from `inventory`.
    #[must_use]
    pub fn new(config: Config, inventory: Arc<dyn InventorySource>) -> Self {
        Self { config, inventory }
    }

    /// Configuration this reconciler runs with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one cycle, returning its report.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Discovery`] if the inventory cannot be listed
    /// and [`ReconcileError::Build`] if rendering fails. In both cases no file
    /// is touched. Persist failures are reported per output in the
    /// [`CycleReport`] instead.
    pub async fn run_cycle(&self) -> Result<CycleReport, ReconcileError> {
        let workloads = self.inventory.list_running().await?;

        let snapshot = build_snapshot(&self.config, &workloads);

        let records_json = render_records(&snapshot.records).map_err(|e| ReconcileError::Build {
            output: OUTPUT_RECORDS,
            reason: e.to_string(),
        })?;
        let hosts = self
            .config
            .hosts_path
            .as_deref()
            .map(|path| (path, render_hosts(&snapshot.hosts_lines)));

        let mut outputs = vec![
            persist_output(
                OUTPUT_RECORDS,
                &self.config.records_path,
                records_json.as_bytes(),
                snapshot.records.len(),
            )
            .await,
        ];
        if let Some((path, text)) = hosts {
            outputs.push(
                persist_output(
                    OUTPUT_HOSTS,
                    path,
                    text.as_bytes(),
                    snapshot.hosts_lines.len(),
                )
                .await,
            );
        }

        Ok(CycleReport {
            labeled_workloads: snapshot.labeled_workloads,
            fragments: snapshot.fragments.len(),
            outputs,
        })
    }

    /// Run one cycle, log its outcome, and update metrics.
    ///
    /// Never fails; errors are logged and the next cycle retries.
    pub async fn reconcile(&self) -> CycleStatus {
        let start = Instant::now();

        let status = match self.run_cycle().await {
            Ok(report) => {
                log_report(&report);
                report.status()
            }
            Err(e) => {
                error!(stage = e.stage(), error = %e, "Reconciliation cycle failed");
                metrics::record_error(e.stage());
                CycleStatus::Failed
            }
        };

        metrics::record_cycle(status.as_str(), start.elapsed());
        status
    }
}

async fn persist_output(
    output: &'static str,
    path: &Path,
    content: &[u8],
    entries: usize,
) -> OutputReport {
    let result = write_atomic(path, content)
        .await
        .map_err(|source| ReconcileError::Persist {
            output,
            path: path.to_path_buf(),
            source,
        });
    OutputReport {
        output,
        entries,
        result,
    }
}

fn log_report(report: &CycleReport) {
    metrics::record_labeled_workloads(report.labeled_workloads);

    for output in &report.outputs {
        match &output.result {
            Ok(outcome) => {
                metrics::record_output_entries(output.output, output.entries);
                info!(
                    output = output.output,
                    path = %outcome.path.display(),
                    entries = output.entries,
                    checksum = %outcome.checksum,
                    "Wrote output"
                );
            }
            Err(e) => {
                metrics::record_error(e.stage());
                warn!(output = output.output, error = %e, "Failed to write output");
            }
        }
    }

    let records_written = report
        .output(OUTPUT_RECORDS)
        .filter(|o| o.result.is_ok())
        .map_or(0, |o| o.entries);
    info!(
        labeled_workloads = report.labeled_workloads,
        fragments = report.fragments,
        records_written,
        status = report.status().as_str(),
        "Found {} labeled containers, {} subdomains, wrote {} DNS records",
        report.labeled_workloads,
        report.fragments,
        records_written
    );
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod reconciler_tests;
