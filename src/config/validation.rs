//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, retry parameters)
//! - Check that URLs and addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ServiceConfig;
use crate::resilience::PolicyError;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    InvalidBindAddress(String),
    ZeroValue(&'static str),
    InvalidUrl { field: &'static str, reason: String },
    InvalidRetryPolicy { dependency: &'static str, error: PolicyError },
    UnknownLogLevel(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "listener.bind_address '{}' is not a socket address", addr)
            }
            ValidationError::ZeroValue(field) => write!(f, "{} must be greater than zero", field),
            ValidationError::InvalidUrl { field, reason } => {
                write!(f, "{} is not a valid URL: {}", field, reason)
            }
            ValidationError::InvalidRetryPolicy { dependency, error } => {
                write!(f, "retries.{}: {}", dependency, error)
            }
            ValidationError::UnknownLogLevel(level) => {
                write!(f, "observability.log_level '{}' is not a known level", level)
            }
        }
    }
}

/// Validate a deserialized configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let positive = [
        ("listener.request_timeout_secs", config.listener.request_timeout_secs),
        ("listener.max_body_bytes", config.listener.max_body_bytes as u64),
        ("readiness.timeout_ms", config.readiness.timeout_ms),
        ("openai.chat_timeout_secs", config.openai.chat_timeout_secs),
        ("openai.tts_timeout_secs", config.openai.tts_timeout_secs),
        ("openai.stt_timeout_secs", config.openai.stt_timeout_secs),
        ("qdrant.timeout_secs", config.qdrant.timeout_secs),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::ZeroValue(field));
        }
    }

    let urls = [
        ("openai.base_url", config.openai.base_url.as_str()),
        ("qdrant.url", config.qdrant.url.as_str()),
        ("postgres.dsn", config.postgres.dsn.as_str()),
    ];
    for (field, value) in urls {
        if let Err(e) = url::Url::parse(value) {
            errors.push(ValidationError::InvalidUrl {
                field,
                reason: e.to_string(),
            });
        }
    }

    for (dependency, retry) in config.retries.entries() {
        if let Err(error) = retry.policy() {
            errors.push(ValidationError::InvalidRetryPolicy { dependency, error });
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
