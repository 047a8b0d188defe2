//! Prometheus Metrics Module
//!
//! # Metrics
//!
//! - `ingest_records_total{stream}`: rows committed
//! - `ingest_rejected_total{stream, reason}`: payloads refused
//! - `ingest_write_failures_total{stream, stage}`: rolled-back batches
//! - `ingest_write_duration_seconds{stream}`: committed batch latency
//!
//! Metrics are exposed at `/metrics` on the ingest HTTP port.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::domain::stream::Stream;

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder once and return its handle.
///
/// Later calls return the handle installed by the first.
pub fn init_metrics() -> Result<PrometheusHandle, MetricsError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;
    register_metrics();

    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to install metrics recorder.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

fn register_metrics() {
    describe_counter!("ingest_records_total", "Rows committed per stream");
    describe_counter!(
        "ingest_rejected_total",
        "Payloads refused per stream and reason"
    );
    describe_counter!(
        "ingest_write_failures_total",
        "Batches rolled back per stream and failing stage"
    );
    describe_histogram!(
        "ingest_write_duration_seconds",
        "Time to commit one atomic batch"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Record rows committed to a stream.
pub fn record_ingested(stream: Stream, rows: usize) {
    counter!("ingest_records_total", "stream" => stream.as_str()).increment(rows as u64);
}

/// Record a refused payload.
pub fn record_rejected(stream: Stream, reason: &'static str) {
    counter!(
        "ingest_rejected_total",
        "stream" => stream.as_str(),
        "reason" => reason
    )
    .increment(1);
}

/// Record a rolled-back batch.
pub fn record_write_failure(stream: Stream, stage: &'static str) {
    counter!(
        "ingest_write_failures_total",
        "stream" => stream.as_str(),
        "stage" => stage
    )
    .increment(1);
}

/// Record how long a committed batch took.
pub fn record_write_duration(stream: Stream, duration: Duration) {
    histogram!("ingest_write_duration_seconds", "stream" => stream.as_str())
        .record(duration.as_secs_f64());
}
