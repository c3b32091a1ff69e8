//! Startup orchestration.
//!
//! # Responsibilities
//! - Build retry policies for every dependency
//! - Create the shared outbound HTTP client
//! - Wire clients and readiness checks into the application context
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use metrics_exporter_prometheus::PrometheusHandle;
use thiserror::Error;

use crate::clients::openai::OpenAiPolicies;
use crate::clients::{OpenAiClient, QdrantClient};
use crate::config::ServiceConfig;
use crate::health::probes::standard_checks;
use crate::health::HealthAggregator;
use crate::http::AppContext;
use crate::resilience::PolicyError;

const USER_AGENT: &str = concat!("voice-gateway/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid retry policy: {0}")]
    Policy(#[from] PolicyError),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Assemble the application context from a validated configuration.
///
/// No dependency is contacted here.
pub fn build_context(
    config: ServiceConfig,
    metrics: Option<PrometheusHandle>,
) -> Result<AppContext, StartupError> {
    let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

    let openai = OpenAiClient::new(
        http.clone(),
        config.openai.clone(),
        OpenAiPolicies::from_config(&config.retries)?,
    );
    let qdrant = QdrantClient::new(
        http.clone(),
        config.qdrant.clone(),
        config.retries.qdrant.policy()?,
    );
    let health = HealthAggregator::new(standard_checks(&config, http));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.listener.request_timeout_secs,
        readiness_timeout_ms = config.readiness.timeout_ms,
        openai_configured = openai.is_configured(),
        qdrant_url = %config.qdrant.url,
        dependencies = health.checks().len(),
        metrics_enabled = metrics.is_some(),
        "Application context ready"
    );

    Ok(AppContext {
        config,
        health,
        openai,
        qdrant,
        metrics,
    })
}
