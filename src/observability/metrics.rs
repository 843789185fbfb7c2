//! Metrics collection and exposition.
//!
//! # Metrics
//! - `transbasket_requests_total` (counter): requests by endpoint, status
//! - `transbasket_request_duration_seconds` (histogram): latency by endpoint
//! - `transbasket_validation_failures_total` (counter): rejections by kind
//! - `transbasket_backend_errors_total` (counter): backend failures by
//!   retryability
//! - `transbasket_cache_lookups_total` (counter): cache hit / miss
//! - `transbasket_cache_entries` (gauge): current cache size

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on its own listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(endpoint: &'static str, status: u16, start: Instant) {
    counter!(
        "transbasket_requests_total",
        "endpoint" => endpoint,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("transbasket_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_validation_failure(kind: &'static str) {
    counter!("transbasket_validation_failures_total", "kind" => kind).increment(1);
}

pub fn record_backend_error(retryable: bool) {
    counter!(
        "transbasket_backend_errors_total",
        "retryable" => if retryable { "true" } else { "false" }
    )
    .increment(1);
}

pub fn record_cache_lookup(hit: bool) {
    counter!(
        "transbasket_cache_lookups_total",
        "result" => if hit { "hit" } else { "miss" }
    )
    .increment(1);
}

pub fn record_cache_size(entries: usize) {
    gauge!("transbasket_cache_entries").set(entries as f64);
}
