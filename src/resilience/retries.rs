//! Retry loop.
//!
//! # Responsibilities
//! - Drive an outbound operation until it succeeds, fails fatally, or exhausts
//!   the policy's attempts
//! - Sleep between attempts according to the policy's backoff
//! - Report every failed attempt as a structured event
//!
//! # Design Decisions
//! - The operation classifies its own result into a `RetryOutcome`
//! - Fatal failures return immediately, with no backoff wait
//! - Exhaustion is a distinct error from a single unretryable failure

use std::future::Future;
use thiserror::Error;

use crate::observability::metrics;
use crate::resilience::{RetryOutcome, RetryPolicy};

/// Terminal failure of a retried operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryError {
    /// The dependency rejected the call in a way retrying cannot fix.
    #[error("{service} failed permanently after {attempts} attempt(s): {reason}")]
    Fatal {
        service: String,
        reason: String,
        attempts: u32,
    },

    /// Every attempt failed transiently.
    #[error("{service} gave up after {attempts} attempts: {last_reason}")]
    Exhausted {
        service: String,
        last_reason: String,
        attempts: u32,
    },
}

impl RetryError {
    /// Number of attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Fatal { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }

    /// Reason reported by the final attempt.
    pub fn reason(&self) -> &str {
        match self {
            Self::Fatal { reason, .. } => reason,
            Self::Exhausted { last_reason, .. } => last_reason,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

impl RetryPolicy {
    /// Run `operation` under this policy.
    ///
    /// The operation receives the 1-indexed attempt number. The first
    /// `Success` value is returned.
    pub async fn run<T, F, Fut>(&self, service: &str, mut operation: F) -> Result<T, RetryError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = RetryOutcome<T>>,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;
            let outcome = operation(attempt).await;
            let classification = outcome.classification();
            metrics::record_attempt(service, attempt, classification);

            match outcome {
                RetryOutcome::Success(value) => {
                    tracing::debug!(
                        service,
                        attempt,
                        classification,
                        delay_ms = 0u64,
                        "External call succeeded"
                    );
                    return Ok(value);
                }
                RetryOutcome::Fatal { reason } => {
                    tracing::warn!(
                        service,
                        attempt,
                        classification,
                        delay_ms = 0u64,
                        reason = %reason,
                        "External call failed, not retrying"
                    );
                    return Err(RetryError::Fatal {
                        service: service.to_string(),
                        reason,
                        attempts: attempt,
                    });
                }
                RetryOutcome::Retryable { reason, wait_hint } => {
                    if attempt >= self.max_attempts() {
                        tracing::error!(
                            service,
                            attempt,
                            classification,
                            delay_ms = 0u64,
                            reason = %reason,
                            "External call retries exhausted"
                        );
                        return Err(RetryError::Exhausted {
                            service: service.to_string(),
                            last_reason: reason,
                            attempts: attempt,
                        });
                    }

                    let delay = self.backoff_delay(attempt, wait_hint, &mut rand::thread_rng());
                    tracing::warn!(
                        service,
                        attempt,
                        classification,
                        delay_ms = delay.as_millis() as u64,
                        wait_hint_ms = wait_hint.map(|h| h.as_millis() as u64),
                        reason = %reason,
                        "External call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
