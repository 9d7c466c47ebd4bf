//! Metrics collection and exposition.
//!
//! # Metrics
//! - `registrar_attempts_total` (counter): attempts by intent, result
//! - `registrar_dispatches_total` (counter): dispatches by intent, outcome
//! - `registrar_dispatch_duration_seconds` (histogram): full dispatch latency
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus exporter is only installed by the host binary

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::http::RequestIntent;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

/// Record one attempt. `result` is `success`, `status`, `transport`,
/// `timeout` or `invalid`.
pub fn record_attempt(intent: RequestIntent, result: &'static str) {
    metrics::counter!(
        "registrar_attempts_total",
        "intent" => intent.as_str(),
        "result" => result
    )
    .increment(1);
}

/// Record a finished dispatch.
pub fn record_dispatch(intent: RequestIntent, outcome: &'static str, start: Instant) {
    metrics::counter!(
        "registrar_dispatches_total",
        "intent" => intent.as_str(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!(
        "registrar_dispatch_duration_seconds",
        "intent" => intent.as_str()
    )
    .record(start.elapsed().as_secs_f64());
}
