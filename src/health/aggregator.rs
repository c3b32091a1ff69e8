//! Readiness aggregation.
//!
//! # Responsibilities
//! - Probe every dependency concurrently, each under its own timeout
//! - Fold timeouts and probe errors into per-dependency statuses
//! - Record health metrics for each probe

use futures_util::future::join_all;
use tokio::time::{self, Instant};

use crate::health::{CheckStatus, DependencyCheck, ReadinessReport};
use crate::observability::metrics;

/// Runs the configured dependency checks for each readiness request.
#[derive(Debug, Clone, Default)]
pub struct HealthAggregator {
    checks: Vec<DependencyCheck>,
}

impl HealthAggregator {
    pub fn new(checks: Vec<DependencyCheck>) -> Self {
        Self { checks }
    }

    pub fn checks(&self) -> &[DependencyCheck] {
        &self.checks
    }

    /// Probe all dependencies and build a report.
    ///
    /// Completes within the largest individual probe timeout.
    pub async fn check(&self) -> ReadinessReport {
        let probes = self.checks.iter().map(|check| async move {
            let started = Instant::now();
            let status = match time::timeout(check.timeout(), check.probe().probe()).await {
                Ok(Ok(())) => CheckStatus::Healthy,
                Ok(Err(e)) => CheckStatus::Unhealthy(e.to_string()),
                Err(_) => CheckStatus::Unhealthy("timeout".to_string()),
            };
            let elapsed = started.elapsed();

            match &status {
                CheckStatus::Healthy => {
                    tracing::debug!(dependency = check.name(), elapsed_ms = elapsed.as_millis() as u64, "Dependency healthy");
                }
                CheckStatus::Unhealthy(reason) => {
                    tracing::warn!(
                        dependency = check.name(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        reason = %reason,
                        "Dependency unhealthy"
                    );
                }
            }
            metrics::record_dependency_health(check.name(), status.is_healthy(), elapsed);

            (check.name().to_string(), status)
        });

        let report = ReadinessReport::from_checks(join_all(probes).await);
        if !report.is_ok() {
            tracing::warn!(failing = ?report.failing().collect::<Vec<_>>(), "Readiness check failed");
        }
        report
    }
}
