//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, request/call ids on spans)
//!     → metrics.rs (attempt counters, dependency health gauges, latency)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON lines)
//!     → GET /metrics (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing, pretty output for local runs
//! - Request and call IDs flow through every request span
//! - Metrics are cheap (atomic increments behind the `metrics` facade)

pub mod logging;
pub mod metrics;
