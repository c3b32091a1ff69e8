//! Route handlers.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::clients::SpeechRequest;
use crate::health::ReadinessReport;
use crate::http::request::sanitize_text;
use crate::http::response::ApiError;
use crate::http::server::AppState;

/// Longest text accepted for speech synthesis, in characters.
pub const MAX_TEXT_CHARS: usize = 4000;

/// Liveness: answers whenever the process can respond. Probes nothing.
pub async fn health() -> Json<ReadinessReport> {
    tracing::debug!("Liveness check");
    Json(ReadinessReport::liveness())
}

/// Readiness: 200 when every dependency is healthy, 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> Response {
    let report = state.health.check().await;
    let status = if report.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report)).into_response()
}

/// Prometheus exposition.
pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Metrics disabled").into_response(),
    }
}

/// Synthesize speech and return the encoded audio.
pub async fn tts_stream(
    State(state): State<AppState>,
    Json(mut payload): Json<SpeechRequest>,
) -> Result<Response, ApiError> {
    payload.text = sanitize_text(&payload.text, MAX_TEXT_CHARS).map_err(ApiError::InvalidPayload)?;

    let audio = state.openai.synthesize_speech(&payload).await?;
    tracing::info!(
        bytes = audio.len(),
        voice = %payload.voice,
        format = %payload.response_format,
        "Speech synthesized"
    );

    Ok(([(header::CONTENT_TYPE, payload.media_type())], audio).into_response())
}
