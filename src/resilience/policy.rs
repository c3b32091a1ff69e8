//! Immutable retry policy.
//!
//! One policy is built per external dependency at startup and shared
//! read-only by every call site of that dependency.

use rand::Rng;
use std::time::Duration;
use thiserror::Error;

use crate::resilience::backoff::{apply_jitter, exponential_delay};

/// Invalid retry policy parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("initial_backoff must be greater than zero")]
    NonPositiveInitialBackoff,

    #[error("max_backoff ({max:?}) must not be below initial_backoff ({initial:?})")]
    MaxBelowInitial { initial: Duration, max: Duration },

    #[error("jitter_fraction must be within [0, 1], got {0}")]
    InvalidJitter(f64),

    #[error("{0} must be a finite, non-negative number of seconds")]
    InvalidSeconds(&'static str),
}

/// Bounded exponential backoff configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
    jitter_fraction: f64,
}

impl RetryPolicy {
    /// Validate the parameters and build a policy.
    pub fn new(
        max_attempts: u32,
        initial_backoff: Duration,
        max_backoff: Duration,
        jitter_fraction: f64,
    ) -> Result<Self, PolicyError> {
        if max_attempts == 0 {
            return Err(PolicyError::ZeroAttempts);
        }
        if initial_backoff.is_zero() {
            return Err(PolicyError::NonPositiveInitialBackoff);
        }
        if max_backoff < initial_backoff {
            return Err(PolicyError::MaxBelowInitial {
                initial: initial_backoff,
                max: max_backoff,
            });
        }
        if !(0.0..=1.0).contains(&jitter_fraction) {
            return Err(PolicyError::InvalidJitter(jitter_fraction));
        }

        Ok(Self {
            max_attempts,
            initial_backoff,
            max_backoff,
            jitter_fraction,
        })
    }

    /// Build a policy from fractional seconds, as found in config files.
    pub fn from_secs(
        max_attempts: u32,
        initial_backoff_secs: f64,
        max_backoff_secs: f64,
        jitter_fraction: f64,
    ) -> Result<Self, PolicyError> {
        let initial = Duration::try_from_secs_f64(initial_backoff_secs)
            .map_err(|_| PolicyError::InvalidSeconds("initial_backoff_secs"))?;
        let max = Duration::try_from_secs_f64(max_backoff_secs)
            .map_err(|_| PolicyError::InvalidSeconds("max_backoff_secs"))?;

        Self::new(max_attempts, initial, max, jitter_fraction)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn initial_backoff(&self) -> Duration {
        self.initial_backoff
    }

    pub fn max_backoff(&self) -> Duration {
        self.max_backoff
    }

    pub fn jitter_fraction(&self) -> f64 {
        self.jitter_fraction
    }

    /// Delay to wait after `failed_attempt` (1-indexed) before the next one.
    ///
    /// The jittered exponential delay stays within `max_backoff`. A zero
    /// `wait_hint` retries immediately; a larger one replaces the delay.
    pub fn backoff_delay<R: Rng + ?Sized>(
        &self,
        failed_attempt: u32,
        wait_hint: Option<Duration>,
        rng: &mut R,
    ) -> Duration {
        let base = exponential_delay(failed_attempt, self.initial_backoff, self.max_backoff);
        let delay = apply_jitter(base, self.jitter_fraction, self.max_backoff, rng);

        match wait_hint {
            Some(hint) if hint.is_zero() || hint > delay => hint,
            _ => delay,
        }
    }
}

impl Default for RetryPolicy {
    /// 4 attempts, 0.5s initial backoff, 8s cap, 10% jitter.
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
            jitter_fraction: 0.1,
        }
    }
}
