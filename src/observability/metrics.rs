//! Metrics collection and exposition.
//!
//! # Metrics
//! - `logproxy_requests_total` (counter): proxied requests by method, status
//! - `logproxy_request_duration_seconds` (histogram): proxy latency
//! - `logproxy_probes_total` (counter): probes by target kind and outcome
//! - `logproxy_probe_duration_seconds` (histogram): probe latency
//! - `logproxy_reload_requests_total` (counter): reload markers written
//!
//! # Design Decisions
//! - Best-effort: exporter failure is logged, never fatal
//! - Recording helpers are no-ops until an exporter is installed, so
//!   call sites never branch on whether metrics are enabled

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter");
        }
    }
}

/// Record one proxied request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("logproxy_requests_total", &labels).increment(1);
    metrics::histogram!("logproxy_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record one reachability probe. `target` is `remote`, `tunnel`, or
/// `backend`; `outcome` is `ok` or `err`.
pub fn record_probe(target: &'static str, outcome: &'static str, start: Instant) {
    let labels = [("target", target), ("outcome", outcome)];
    metrics::counter!("logproxy_probes_total", &labels).increment(1);
    metrics::histogram!("logproxy_probe_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record one reload-marker write.
pub fn record_reload_request() {
    metrics::counter!("logproxy_reload_requests_total").increment(1);
}
