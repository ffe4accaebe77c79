//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, route, status
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_image_cache_total` (counter): cache lookups by result
//! - `gateway_image_cache_bytes` (gauge): bytes held by the image cache
//! - `gateway_verifications_total` (counter): bot checks by provider, result
//! - `gateway_release_total` (counter): release submissions by result
//! - `gateway_upstream_errors_total` (counter): failed outbound calls by upstream
//!
//! Recording is a no-op until a recorder is installed, so library code and
//! tests can call these freely.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram, Label};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = vec![
        Label::new("method", method.to_string()),
        Label::new("route", route.to_string()),
    ];
    let mut with_status = labels.clone();
    with_status.push(Label::new("status", status.to_string()));

    counter!("gateway_requests_total", with_status).increment(1);
    histogram!("gateway_request_duration_seconds", labels).record(start.elapsed().as_secs_f64());
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("gateway_image_cache_total", "result" => result).increment(1);
}

pub fn record_cache_size(bytes: usize) {
    gauge!("gateway_image_cache_bytes").set(bytes as f64);
}

pub fn record_verification(provider: &'static str, result: &'static str) {
    counter!("gateway_verifications_total", "provider" => provider, "result" => result).increment(1);
}

pub fn record_release(result: &'static str) {
    counter!("gateway_release_total", "result" => result).increment(1);
}

pub fn record_upstream_error(upstream: &'static str) {
    counter!("gateway_upstream_errors_total", "upstream" => upstream).increment(1);
}
