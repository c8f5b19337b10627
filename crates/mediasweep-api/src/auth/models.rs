use crate::error::HttpAppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use mediasweep_core::AppError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

/// Role an API key grants, named after the WordPress roles it stands in for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Administrator,
    Editor,
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Role::Administrator => write!(f, "administrator"),
            Role::Editor => write!(f, "editor"),
        }
    }
}

/// WordPress capabilities the endpoints require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// `manage_options`: scan the library and inspect references
    ManageOptions,
    /// `delete_posts`: delete attachments
    DeletePosts,
}

impl Role {
    pub fn has(&self, capability: Capability) -> bool {
        match self {
            Role::Administrator => true,
            Role::Editor => capability == Capability::DeletePosts,
        }
    }
}

/// The authenticated caller, stored in request extensions by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub role: Role,
}

impl Actor {
    pub fn new(role: Role) -> Self {
        Self { role }
    }

    /// Identity anti-replay tokens are bound to
    pub fn subject(&self) -> String {
        self.role.to_string()
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .cloned()
            .ok_or_else(|| {
                HttpAppError(AppError::Unauthorized(
                    "Missing authenticated actor".to_string(),
                ))
            })
    }
}
