//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Liveness (GET /health):
//!     → report.rs (ReadinessReport::liveness, no probing)
//!
//! Readiness (GET /ready):
//!     aggregator.rs
//!     → every DependencyCheck (check.rs) probed concurrently
//!     → each probe bounded by its own timeout
//!     → report.rs (per-dependency status, overall ok)
//! ```
//!
//! # Design Decisions
//! - Probes are polled in the request's task; nothing is spawned, so a
//!   timed-out probe is dropped rather than left running
//! - The aggregator never fails; failures are folded into the report
//! - Report order mirrors the configured check order

pub mod aggregator;
pub mod check;
pub mod probes;
pub mod report;

pub use aggregator::HealthAggregator;
pub use check::{DependencyCheck, Probe, ProbeError};
pub use report::{CheckStatus, ReadinessReport};
