//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tower-http layers)
//!     → request.rs (request/call IDs, request span, payload sanitizing)
//!     → handlers.rs (liveness, readiness, metrics, speech synthesis)
//!     → response.rs (map client errors to status codes)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestContext, X_CALL_ID, X_REQUEST_ID};
pub use response::ApiError;
pub use server::{AppContext, AppState, HttpServer};
