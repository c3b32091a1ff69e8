//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, body limit, request context)
//! - Bind server to listener
//! - Drain in-flight requests on shutdown

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::clients::{OpenAiClient, QdrantClient};
use crate::config::{ListenerConfig, ServiceConfig};
use crate::health::HealthAggregator;
use crate::http::handlers;
use crate::http::request::request_context;
use crate::lifecycle::ShutdownSignal;

/// Process-lifetime dependencies shared by every handler.
pub struct AppContext {
    pub config: ServiceConfig,
    pub health: HealthAggregator,
    pub openai: OpenAiClient,
    pub qdrant: QdrantClient,
    pub metrics: Option<PrometheusHandle>,
}

/// Application state injected into handlers.
pub type AppState = Arc<AppContext>;

/// HTTP server for the voice gateway.
pub struct HttpServer {
    router: Router,
    listener_config: ListenerConfig,
}

impl HttpServer {
    /// Create a new HTTP server around the application context.
    pub fn new(context: AppContext) -> Self {
        let listener_config = context.config.listener.clone();
        let router = Self::build_router(&listener_config, Arc::new(context));
        Self {
            router,
            listener_config,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &ListenerConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(handlers::health))
            .route("/ready", get(handlers::ready))
            .route("/metrics", get(handlers::metrics))
            .route("/tts/stream", post(handlers::tts_stream))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(middleware::from_fn(request_context))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: ShutdownSignal) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.listener_config.request_timeout_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.recv().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the router.
    pub fn router(&self) -> &Router {
        &self.router
    }
}
