//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, path, status
//! - `http_request_duration_seconds` (histogram): handler latency
//! - `external_api_attempts_total` (counter): outbound attempts by service, attempt number, outcome
//! - `dependency_health` (gauge): 1=healthy, 0=unhealthy, per readiness probe
//! - `dependency_probe_duration_seconds` (histogram): probe latency

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use tokio::time::Instant;

/// Install the Prometheus recorder and return the handle used by `/metrics`.
pub fn init_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            tracing::info!("Prometheus recorder installed");
            Some(handle)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Prometheus recorder");
            None
        }
    }
}

pub fn record_request(method: &str, path: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("http_requests_total", &labels).increment(1);
    metrics::histogram!("http_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_attempt(service: &str, attempt: u32, outcome: &'static str) {
    metrics::counter!(
        "external_api_attempts_total",
        "service" => service.to_string(),
        "attempt" => attempt.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_dependency_health(dependency: &str, healthy: bool, elapsed: Duration) {
    metrics::gauge!("dependency_health", "dependency" => dependency.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
    metrics::histogram!(
        "dependency_probe_duration_seconds",
        "dependency" => dependency.to_string()
    )
    .record(elapsed.as_secs_f64());
}
