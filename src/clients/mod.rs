//! Outbound API clients.
//!
//! # Data Flow
//! ```text
//! Handler
//!     → OpenAiClient / QdrantClient (validate input, build request)
//!     → RetryPolicy::run (one policy per dependency)
//!         → send request
//!         → classify.rs (transport error / status → RetryOutcome)
//!     → decode success body
//! ```
//!
//! # Design Decisions
//! - Each call site classifies its own outcomes; the retry loop stays generic
//! - Missing credentials fail before any network call
//! - Statuses a call site expects (e.g. 404 while probing a collection) are
//!   passed through as successes and handled by the caller

pub mod classify;
pub mod error;
pub mod openai;
pub mod qdrant;

pub use error::ClientError;
pub use openai::{ChatOptions, OpenAiClient, SpeechRequest, Transcription};
pub use qdrant::{Point, QdrantClient, ScoredPoint};
