//! Metrics collection and exposition.
//!
//! # Metrics
//! - `httpd_requests_total` (counter): requests by method, status, scheme
//! - `httpd_request_duration_seconds` (histogram): latency distribution
//! - `httpd_host_port_fallback_total` (counter): hosts resolved with a
//!   default because the port was malformed or the host was missing
//! - `httpd_unmatched_host_total` (counter): requests no site served
//!
//! Recording without an installed exporter is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, https: bool, start: Instant) {
    let scheme = if https { "https" } else { "http" };
    counter!(
        "httpd_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "scheme" => scheme
    )
    .increment(1);
    histogram!("httpd_request_duration_seconds", "scheme" => scheme)
        .record(start.elapsed().as_secs_f64());
}

/// Record a host resolved with the scheme-default port or without a host.
pub fn record_host_fallback(reason: &'static str) {
    counter!("httpd_host_port_fallback_total", "reason" => reason).increment(1);
}

pub fn record_unmatched_host() {
    counter!("httpd_unmatched_host_total").increment(1);
}
