//! Error responses.
//!
//! # Design Decisions
//! - Client errors map to status codes by cause, not by dependency
//! - Retries exhausted → 503 (dependency unavailable right now)
//! - Permanent upstream rejection → 502
//! - Bodies are `{"detail": "..."}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::clients::ClientError;
use crate::resilience::RetryError;

/// Handler error rendered as a JSON response.
#[derive(Debug)]
pub enum ApiError {
    Client(ClientError),
    InvalidPayload(String),
}

impl From<ClientError> for ApiError {
    fn from(e: ClientError) -> Self {
        ApiError::Client(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Client(e) => match e {
                ClientError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
                ClientError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                ClientError::Retry(RetryError::Exhausted { .. }) => StatusCode::SERVICE_UNAVAILABLE,
                ClientError::Retry(RetryError::Fatal { .. })
                | ClientError::UnexpectedStatus { .. }
                | ClientError::Decode { .. } => StatusCode::BAD_GATEWAY,
                ClientError::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::InvalidPayload(msg) => msg.clone(),
            ApiError::Client(e) => e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.detail();

        if status.is_server_error() {
            tracing::error!(status = %status, detail = %detail, "Request failed");
        } else {
            tracing::info!(status = %status, detail = %detail, "Request rejected");
        }

        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}
