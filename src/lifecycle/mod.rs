//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Retry policies → HTTP client → Dependency clients → Readiness checks
//!
//! Shutdown (shutdown.rs):
//!     Trigger → Every ShutdownSignal resolves → Server drains in-flight requests
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Dependencies are not contacted at startup; /ready reports on them
//! - A signal that arrives before anyone subscribes is not lost

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use startup::{build_context, StartupError};
