//! Readiness report.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Outcome of probing one dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Healthy,
    Unhealthy(String),
}

impl CheckStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, CheckStatus::Healthy)
    }
}

impl Serialize for CheckStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CheckStatus::Healthy => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("status", "ok")?;
                map.end()
            }
            CheckStatus::Unhealthy(reason) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("status", "error")?;
                map.serialize_entry("error", reason)?;
                map.end()
            }
        }
    }
}

/// Per-dependency statuses plus the overall verdict.
///
/// Serializes as `{"status": "ok" | "error", "checks": {name: status, ...}}`
/// with checks in probe order; `checks` is omitted when nothing was probed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessReport {
    checks: Vec<(String, CheckStatus)>,
    ok: bool,
}

impl ReadinessReport {
    pub fn from_checks(checks: Vec<(String, CheckStatus)>) -> Self {
        let ok = checks.iter().all(|(_, status)| status.is_healthy());
        Self { checks, ok }
    }

    /// Liveness: the process answered. No dependency is consulted.
    pub fn liveness() -> Self {
        Self::from_checks(Vec::new())
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }

    pub fn checks(&self) -> &[(String, CheckStatus)] {
        &self.checks
    }

    pub fn status_of(&self, name: &str) -> Option<&CheckStatus> {
        self.checks
            .iter()
            .find(|(check, _)| check == name)
            .map(|(_, status)| status)
    }

    /// Names of the dependencies that failed their probe.
    pub fn failing(&self) -> impl Iterator<Item = &str> {
        self.checks
            .iter()
            .filter(|(_, status)| !status.is_healthy())
            .map(|(name, _)| name.as_str())
    }
}

struct Checks<'a>(&'a [(String, CheckStatus)]);

impl Serialize for Checks<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, status) in self.0 {
            map.serialize_entry(name, status)?;
        }
        map.end()
    }
}

impl Serialize for ReadinessReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.checks.is_empty() { 1 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("status", if self.ok { "ok" } else { "error" })?;
        if !self.checks.is_empty() {
            map.serialize_entry("checks", &Checks(&self.checks))?;
        }
        map.end()
    }
}
