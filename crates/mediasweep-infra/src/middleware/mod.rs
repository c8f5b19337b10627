//! Shared HTTP middleware

pub mod nonce;

pub use nonce::{nonce_middleware, IssuedNonce, NonceService, NonceSubject, NONCE_HEADER};
