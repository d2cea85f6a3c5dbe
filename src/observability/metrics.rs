//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, endpoint
//! - `gateway_request_duration_seconds` (histogram): latency by endpoint
//! - `gateway_cache_lookups_total` (counter): lookups by result (hit/miss)
//! - `gateway_cache_stores_total` (counter): stores by outcome (ok/error)
//! - `gateway_cache_entries` (gauge): entries held by the in-memory cache
//! - `gateway_upstream_errors_total` (counter): upstream failures by kind
//! - `gateway_points_redacted_total` (counter): points moved onto a decoy
//! - `gateway_points_removed_total` (counter): points dropped from lines
//!
//! Recording is a no-op until a recorder is installed, so the pipeline and
//! its tests never depend on the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::privacy::RedactionSummary;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished request.
pub fn record_request(method: &str, status: u16, endpoint: &'static str, start: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "endpoint" => endpoint
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("gateway_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_cache_store(ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("gateway_cache_stores_total", "outcome" => outcome).increment(1);
}

pub fn record_cache_size(entries: usize) {
    gauge!("gateway_cache_entries").set(entries as f64);
}

pub fn record_upstream_error(kind: &'static str) {
    counter!("gateway_upstream_errors_total", "kind" => kind).increment(1);
}

pub fn record_redaction(summary: &RedactionSummary) {
    counter!("gateway_points_redacted_total").increment(summary.substituted as u64);
    counter!("gateway_points_removed_total").increment(summary.removed as u64);
}
