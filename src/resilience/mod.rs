//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound call site (speech, transcription, chat, vector search):
//!     → performs one attempt and classifies it (outcome.rs)
//!     → retries.rs (RetryPolicy::run drives the attempt loop)
//!     → backoff.rs (exponential delay + jitter, bounded by max_backoff)
//!     → first Success returned, or a terminal RetryError
//! ```
//!
//! # Design Decisions
//! - Classification belongs to the call site; only it knows the error semantics
//! - Policies are immutable and built once per dependency at startup
//! - Intermediate attempts are visible only as tracing events and metrics
//! - Dropping the returned future cancels the attempt and any pending backoff

pub mod backoff;
pub mod outcome;
pub mod policy;
pub mod retries;

pub use outcome::RetryOutcome;
pub use policy::{PolicyError, RetryPolicy};
pub use retries::RetryError;
