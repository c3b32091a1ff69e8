//! Request context and payload validation.
//!
//! # Responsibilities
//! - Attach a request ID and a call ID to every request (reuse or generate)
//! - Open the request span carrying both IDs
//! - Echo both IDs on the response
//! - Sanitize free-text payload fields

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::observability::metrics;

pub const X_REQUEST_ID: &str = "x-request-id";
pub const X_CALL_ID: &str = "x-call-id";

/// Longest inbound ID accepted as-is.
const MAX_ID_LEN: usize = 128;

/// Correlation IDs for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: String,
    pub call_id: String,
}

fn header_or_generate(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= MAX_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Middleware establishing the request context.
pub async fn request_context(mut request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let context = RequestContext {
        request_id: header_or_generate(request.headers(), X_REQUEST_ID),
        call_id: header_or_generate(request.headers(), X_CALL_ID),
    };
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let span = tracing::info_span!(
        "request",
        request_id = %context.request_id,
        call_id = %context.call_id,
        method = %method,
        path = %path,
    );

    request.extensions_mut().insert(context.clone());
    let mut response = next.run(request).instrument(span).await;

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&context.request_id) {
        headers.insert(X_REQUEST_ID, value);
    }
    if let Ok(value) = HeaderValue::from_str(&context.call_id) {
        headers.insert(X_CALL_ID, value);
    }

    metrics::record_request(&method, &path, response.status().as_u16(), start);
    response
}

/// Strip control characters and surrounding whitespace; reject empty or
/// overlong text.
pub fn sanitize_text(value: &str, max_chars: usize) -> Result<String, String> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect();

    if cleaned.trim().is_empty() {
        return Err("Value must not be empty".to_string());
    }
    if cleaned.chars().count() > max_chars {
        return Err("Value is too long".to_string());
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reuses_valid_header() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("req-123"));
        assert_eq!(header_or_generate(&headers, X_REQUEST_ID), "req-123");
    }

    #[test]
    fn test_generates_when_missing_or_blank() {
        let mut headers = HeaderMap::new();
        let generated = header_or_generate(&headers, X_CALL_ID);
        assert!(Uuid::parse_str(&generated).is_ok());

        headers.insert(X_CALL_ID, HeaderValue::from_static("   "));
        let generated = header_or_generate(&headers, X_CALL_ID);
        assert!(Uuid::parse_str(&generated).is_ok());
    }

    #[test]
    fn test_sanitize_text() {
        assert_eq!(sanitize_text("  Ahoj\u{0007} svet ", 4000).unwrap(), "Ahoj svet");
        assert_eq!(sanitize_text("line\nbreak", 4000).unwrap(), "line\nbreak");
        assert!(sanitize_text(" \u{0000} ", 4000).is_err());
        assert!(sanitize_text(&"a".repeat(11), 10).is_err());
        assert!(sanitize_text(&"č".repeat(10), 10).is_ok());
    }
}
