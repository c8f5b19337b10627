//! Mediasweep API Library
//!
//! This crate provides the HTTP handlers, authentication, and application setup
//! of the unused media service.

mod api_doc;
pub mod auth;
pub mod constants;
pub mod error;
mod handlers;
pub mod response;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use response::ApiResponse;
