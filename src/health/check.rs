//! Named dependency probes.

use futures_util::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Diagnostic returned by a failing probe.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ProbeError(pub String);

impl ProbeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(e: reqwest::Error) -> Self {
        Self(e.to_string())
    }
}

impl From<std::io::Error> for ProbeError {
    fn from(e: std::io::Error) -> Self {
        Self(e.to_string())
    }
}

/// A bounded check against one external dependency.
pub trait Probe: Send + Sync {
    fn probe(&self) -> BoxFuture<'_, Result<(), ProbeError>>;
}

/// Adapter turning an async closure into a `Probe`.
struct FnProbe<F>(F);

impl<F, Fut> Probe for FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ProbeError>> + Send + 'static,
{
    fn probe(&self) -> BoxFuture<'_, Result<(), ProbeError>> {
        Box::pin((self.0)())
    }
}

/// A named probe with its own deadline.
#[derive(Clone)]
pub struct DependencyCheck {
    name: String,
    timeout: Duration,
    probe: Arc<dyn Probe>,
}

impl DependencyCheck {
    pub fn new(name: impl Into<String>, timeout: Duration, probe: impl Probe + 'static) -> Self {
        Self {
            name: name.into(),
            timeout,
            probe: Arc::new(probe),
        }
    }

    /// Build a check from an async closure.
    pub fn from_fn<F, Fut>(name: impl Into<String>, timeout: Duration, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ProbeError>> + Send + 'static,
    {
        Self::new(name, timeout, FnProbe(f))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn probe(&self) -> &dyn Probe {
        self.probe.as_ref()
    }
}

impl fmt::Debug for DependencyCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyCheck")
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .finish()
    }
}
