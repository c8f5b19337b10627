use crate::auth::models::{Actor, Role};
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use mediasweep_core::AppError;
use mediasweep_infra::NonceSubject;
use std::sync::Arc;
use subtle::ConstantTimeEq;

#[derive(Clone)]
pub struct AuthState {
    pub admin_api_key: String,
    pub editor_api_key: Option<String>,
}

impl AuthState {
    fn resolve(&self, token: &str) -> Option<Role> {
        if secure_compare(token, &self.admin_api_key) {
            return Some(Role::Administrator);
        }
        match &self.editor_api_key {
            Some(key) if secure_compare(token, key) => Some(Role::Editor),
            _ => None,
        }
    }
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn unauthorized(message: &str) -> Response {
    HttpAppError(AppError::Unauthorized(message.to_string())).into_response()
}

/// Resolves `Authorization: Bearer <key>` into an [`Actor`] and stores it, along
/// with the anti-replay subject, in the request extensions.
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(auth_header) = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    else {
        return unauthorized("Missing authorization header");
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return unauthorized("Invalid authorization header format");
    };

    let Some(role) = auth_state.resolve(token.trim()) else {
        tracing::warn!("Rejected unknown API key");
        return unauthorized("Invalid API key");
    };

    let actor = Actor::new(role);
    tracing::debug!(role = %actor.role, "Authenticated request");
    request
        .extensions_mut()
        .insert(NonceSubject(actor.subject()));
    request.extensions_mut().insert(actor);

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AuthState {
        AuthState {
            admin_api_key: "a".repeat(32),
            editor_api_key: Some("e".repeat(32)),
        }
    }

    #[test]
    fn resolves_roles_by_key() {
        let state = state();
        assert_eq!(state.resolve(&"a".repeat(32)), Some(Role::Administrator));
        assert_eq!(state.resolve(&"e".repeat(32)), Some(Role::Editor));
        assert_eq!(state.resolve("nope"), None);
    }

    #[test]
    fn editor_key_is_optional() {
        let state = AuthState {
            editor_api_key: None,
            ..state()
        };
        assert_eq!(state.resolve(&"e".repeat(32)), None);
    }
}
