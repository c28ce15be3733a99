//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, path, status
//! - `gateway_request_duration_seconds` (histogram): latency by method, path
//! - `gateway_rpc_calls_total` (counter): node calls by JSON-RPC method, outcome

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed HTTP request.
pub fn record_request(method: &str, status: u16, path: &str, start: Instant) {
    let method = method.to_string();
    let path = path.to_string();

    ::metrics::counter!(
        "gateway_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.to_string()
    )
    .increment(1);

    ::metrics::histogram!(
        "gateway_request_duration_seconds",
        "method" => method,
        "path" => path
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of one JSON-RPC call against one provider.
pub fn record_rpc_call(method: &'static str, outcome: &'static str) {
    ::metrics::counter!(
        "gateway_rpc_calls_total",
        "method" => method,
        "outcome" => outcome
    )
    .increment(1);
}
