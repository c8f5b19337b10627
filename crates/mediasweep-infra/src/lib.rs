//! Mediasweep Infrastructure Library
//!
//! Shared infrastructure for the server and the CLI:
//! - Anti-replay token issuing and the middleware that enforces it
//! - Tracing subscriber initialization

pub mod middleware;
pub mod telemetry;

// Re-export commonly used types
pub use middleware::{nonce_middleware, IssuedNonce, NonceService, NonceSubject, NONCE_HEADER};
pub use telemetry::init_tracing;
