//! Classified result of a single outbound attempt.

use std::time::Duration;

/// What one attempt produced, as judged by the call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T> {
    /// The attempt succeeded; the value is handed back to the caller.
    Success(T),

    /// A transient failure (timeout, connection error, 429, 5xx).
    ///
    /// `wait_hint` is a server-requested delay (e.g. `Retry-After`); the next
    /// backoff is never shorter than it.
    Retryable {
        reason: String,
        wait_hint: Option<Duration>,
    },

    /// A permanent failure. Never retried.
    Fatal { reason: String },
}

impl<T> RetryOutcome<T> {
    pub fn retryable(reason: impl Into<String>) -> Self {
        Self::Retryable {
            reason: reason.into(),
            wait_hint: None,
        }
    }

    pub fn retry_after(reason: impl Into<String>, wait_hint: Option<Duration>) -> Self {
        Self::Retryable {
            reason: reason.into(),
            wait_hint,
        }
    }

    pub fn fatal(reason: impl Into<String>) -> Self {
        Self::Fatal {
            reason: reason.into(),
        }
    }

    /// Label used in log events and metrics.
    pub fn classification(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Retryable { .. } => "retryable",
            Self::Fatal { .. } => "fatal",
        }
    }
}
