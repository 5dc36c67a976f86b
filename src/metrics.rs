// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for headnscale.
//!
//! All metrics use the namespace prefix `headnscale_` and are exposed by the
//! HTTP responder on `/metrics`.
//!
//! # Metrics Categories
//!
//! - **Cycle Metrics** - Track reconciliation cycles and their outcomes
//! - **Inventory Metrics** - Track labeled workloads and published records
//! - **Error Metrics** - Track failures by cycle stage
//!
//! # Example
//!
//! ```rust,no_run
//! use headnscale::metrics::record_cycle;
//!
//! record_cycle("success", std::time::Duration::from_millis(12));
//! ```

use prometheus::{
    CounterVec, Encoder, Gauge, GaugeVec, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all headnscale metrics
const METRICS_NAMESPACE: &str = "headnscale";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Cycle Metrics
// ============================================================================

/// Total number of reconciliation cycles by outcome
///
/// Labels:
/// - `status`: Outcome (`success`, `partial`, `error`)
pub static CYCLES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_cycles_total"),
        "Total number of reconciliation cycles by status",
    );
    let counter = CounterVec::new(opts, &["status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of reconciliation cycles in seconds
pub static CYCLE_DURATION_SECONDS: LazyLock<Histogram> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_cycle_duration_seconds"),
        "Duration of reconciliation cycles in seconds",
    )
    .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0]);
    let histogram = Histogram::with_opts(opts).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Inventory Metrics
// ============================================================================

/// Number of running workloads carrying the configured label in the last cycle
pub static LABELED_WORKLOADS: LazyLock<Gauge> = LazyLock::new(|| {
    let gauge = Gauge::new(
        format!("{METRICS_NAMESPACE}_labeled_workloads"),
        "Number of labeled workloads found in the last successful discovery",
    )
    .unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Number of entries written per output in the last cycle
///
/// Labels:
/// - `output`: Output file (`records`, `hosts`)
pub static OUTPUT_ENTRIES: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_output_entries"),
        "Number of entries written to each output file in the last cycle",
    );
    let gauge = GaugeVec::new(opts, &["output"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

// ============================================================================
// Error Metrics
// ============================================================================

/// Total number of errors by cycle stage
///
/// Labels:
/// - `stage`: Stage that failed (`discover`, `build`, `persist`)
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_errors_total"),
        "Total number of reconciliation errors by stage",
    );
    let counter = CounterVec::new(opts, &["stage"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a completed reconciliation cycle
///
/// # Arguments
/// * `status` - Cycle outcome (`success`, `partial`, `error`)
/// * `duration` - Duration of the cycle
pub fn record_cycle(status: &str, duration: Duration) {
    CYCLES_TOTAL.with_label_values(&[status]).inc();
    CYCLE_DURATION_SECONDS.observe(duration.as_secs_f64());
}

/// Record an error
///
/// # Arguments
/// * `stage` - Cycle stage where the error occurred
pub fn record_error(stage: &str) {
    ERRORS_TOTAL.with_label_values(&[stage]).inc();
}

/// Record the number of labeled workloads found by discovery
pub fn record_labeled_workloads(count: usize) {
    #[allow(clippy::cast_precision_loss)]
    LABELED_WORKLOADS.set(count as f64);
}

/// Record the number of entries written to an output
///
/// # Arguments
/// * `output` - Output file label (`records`, `hosts`)
/// * `count` - Entries written
pub fn record_output_entries(output: &str, count: usize) {
    #[allow(clippy::cast_precision_loss)]
    OUTPUT_ENTRIES.with_label_values(&[output]).set(count as f64);
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Returns
/// Prometheus-formatted metrics as a String
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
