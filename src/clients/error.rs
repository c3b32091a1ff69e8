//! Client error types.

use reqwest::StatusCode;
use thiserror::Error;

use crate::resilience::RetryError;

/// Errors returned by outbound API clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A required credential is absent from the configuration.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// The request was rejected locally before any call was made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The call failed permanently or ran out of retries.
    #[error(transparent)]
    Retry(#[from] RetryError),

    /// The dependency answered with a status the call site does not accept.
    #[error("{service} returned unexpected status {status}: {body}")]
    UnexpectedStatus {
        service: &'static str,
        status: StatusCode,
        body: String,
    },

    /// The success body could not be decoded.
    #[error("Failed to decode {service} response: {reason}")]
    Decode {
        service: &'static str,
        reason: String,
    },

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;
