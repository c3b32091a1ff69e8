//! Outcome classification for HTTP calls.
//!
//! - Connection errors and timeouts → retryable
//! - 429 → retryable, honoring `Retry-After`
//! - 5xx → retryable
//! - Other 4xx → fatal
//! - Anything else not recognized as transient → fatal

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Response, StatusCode};
use std::time::Duration;

use crate::resilience::RetryOutcome;

const MAX_REASON_BODY: usize = 200;
/// Enough bytes for `MAX_REASON_BODY` characters of any UTF-8 text.
const MAX_REASON_BYTES: usize = MAX_REASON_BODY * 4;

/// Decision for a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Accept,
    Retry(Option<Duration>),
    Reject,
}

/// Classify a status; `allowed` lists error statuses the caller handles itself.
pub fn classify_status(
    status: StatusCode,
    retry_after: Option<Duration>,
    allowed: &[StatusCode],
) -> StatusClass {
    if allowed.contains(&status) {
        StatusClass::Accept
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        StatusClass::Retry(retry_after)
    } else if status.is_server_error() {
        StatusClass::Retry(None)
    } else if status.is_client_error() {
        StatusClass::Reject
    } else {
        StatusClass::Accept
    }
}

/// Parse a delta-seconds `Retry-After` header.
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    let secs: f64 = value.parse().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

/// Whether a transport error is worth retrying.
pub fn is_transient(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}

/// Classify the result of sending one request.
pub async fn classify_response(
    result: Result<Response, reqwest::Error>,
    allowed: &[StatusCode],
) -> RetryOutcome<Response> {
    let response = match result {
        Ok(response) => response,
        Err(e) if is_transient(&e) => return RetryOutcome::retryable(e.to_string()),
        Err(e) => return RetryOutcome::fatal(e.to_string()),
    };

    let status = response.status();
    match classify_status(status, retry_after(response.headers()), allowed) {
        StatusClass::Accept => RetryOutcome::Success(response),
        StatusClass::Retry(hint) => RetryOutcome::retry_after(failure_reason(response).await, hint),
        StatusClass::Reject => RetryOutcome::fatal(failure_reason(response).await),
    }
}

/// Status plus the start of the error body; the rest of the body is never read.
async fn failure_reason(mut response: Response) -> String {
    let status = response.status();
    let mut buf = Vec::new();
    while buf.len() < MAX_REASON_BYTES {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                let take = chunk.len().min(MAX_REASON_BYTES - buf.len());
                buf.extend_from_slice(&chunk[..take]);
            }
            _ => break,
        }
    }
    let body = String::from_utf8_lossy(&buf);
    let body = body.trim();
    if body.is_empty() {
        status.to_string()
    } else {
        let snippet: String = body.chars().take(MAX_REASON_BODY).collect();
        format!("{}: {}", status, snippet)
    }
}
