use crate::auth::Actor;
use crate::error::{ErrorResponse, HttpAppError};
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse};
use mediasweep_infra::IssuedNonce;
use std::sync::Arc;

/// Issue an anti-replay token for the calling actor.
///
/// State-changing requests must echo it in the `X-Nonce` header.
#[utoipa::path(
    get,
    path = "/api/v0/nonce",
    tag = "auth",
    responses(
        (status = 200, description = "Token issued, wrapped in the success envelope", body = IssuedNonce),
        (status = 401, description = "Missing or unknown API key", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(role = %actor.role, operation = "issue_nonce"))]
pub async fn issue_nonce(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> Result<impl IntoResponse, HttpAppError> {
    let nonce = state.nonces.issue(&actor.subject())?;
    Ok(ApiResponse::ok(nonce))
}
