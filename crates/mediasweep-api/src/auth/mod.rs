//! Authentication and authorization
//!
//! Callers authenticate with a bearer API key that maps to a [`Role`]. What a role
//! may do is decided by an [`AuthorizationGate`].
//!
//! [`Role`]: models::Role
//! [`AuthorizationGate`]: gate::AuthorizationGate

pub mod gate;
pub mod middleware;
pub mod models;

pub use gate::{AuthorizationGate, RoleGate};
pub use middleware::{auth_middleware, AuthState};
pub use models::{Actor, Capability, Role};
