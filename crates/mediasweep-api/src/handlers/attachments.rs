use crate::auth::gate::require;
use crate::auth::Actor;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use mediasweep_core::{AppError, AssetId, MediaAsset, ReferenceKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// One element of `ids`: a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum IdInput {
    Number(u64),
    Text(String),
}

/// Wire body of a bulk delete.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteRequestBody {
    #[serde(default)]
    pub ids: Vec<IdInput>,
}

/// Bulk delete with parsed ids, duplicates removed and first-seen order kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub ids: Vec<AssetId>,
}

impl TryFrom<DeleteRequestBody> for DeleteRequest {
    type Error = AppError;

    fn try_from(body: DeleteRequestBody) -> Result<Self, Self::Error> {
        if body.ids.is_empty() {
            return Err(AppError::NoInput);
        }

        let mut ids = Vec::with_capacity(body.ids.len());
        for raw in body.ids {
            let id = match raw {
                IdInput::Number(n) => AssetId::new(n)?,
                IdInput::Text(s) => s.parse::<AssetId>()?,
            };
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        Ok(DeleteRequest { ids })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub deleted: usize,
    pub requested: usize,
    pub failed: Vec<AssetId>,
    /// `Deleted {n} attachments.`
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReferenceReport {
    pub id: AssetId,
    pub referenced: bool,
    /// Every check that found a reference
    pub matches: Vec<ReferenceKind>,
}

/// Scan the media library for attachments nothing references.
#[utoipa::path(
    post,
    path = "/api/v0/attachments/scan",
    tag = "attachments",
    params(
        ("X-Nonce" = String, Header, description = "Anti-replay token from /api/v0/nonce")
    ),
    responses(
        (status = 200, description = "Unused attachments, newest first, wrapped in the success envelope", body = Vec<MediaAsset>),
        (status = 401, description = "Missing or unknown API key", body = ErrorResponse),
        (status = 403, description = "Invalid token or permission denied", body = ErrorResponse),
        (status = 503, description = "Content store unavailable", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(role = %actor.role, operation = "scan_attachments"))]
pub async fn scan_attachments(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> Result<impl IntoResponse, HttpAppError> {
    require(state.gate.can_read(&actor), &actor)?;

    let rows = mediasweep_services::list_unused_media(&state.scanner, state.store.as_ref()).await?;

    tracing::info!(unused = rows.len(), "Unused media listed");
    Ok(ApiResponse::ok(rows))
}

/// Delete the selected attachments.
///
/// Failures of single attachments are reported in `failed` and do not stop the batch.
#[utoipa::path(
    post,
    path = "/api/v0/attachments/delete",
    tag = "attachments",
    request_body = DeleteRequestBody,
    params(
        ("X-Nonce" = String, Header, description = "Anti-replay token from /api/v0/nonce")
    ),
    responses(
        (status = 200, description = "Batch processed, wrapped in the success envelope", body = DeleteResponse),
        (status = 400, description = "No IDs provided or invalid id", body = ErrorResponse),
        (status = 401, description = "Missing or unknown API key", body = ErrorResponse),
        (status = 403, description = "Invalid token or permission denied", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, body), fields(role = %actor.role, operation = "delete_attachments"))]
pub async fn delete_attachments(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    body: Result<ValidatedJson<DeleteRequestBody>, HttpAppError>,
) -> Result<impl IntoResponse, HttpAppError> {
    require(state.gate.can_delete(&actor), &actor)?;

    let ValidatedJson(body) = body?;
    let request = DeleteRequest::try_from(body)?;

    let report = state
        .deletion
        .delete_assets(&request.ids, state.store.as_ref())
        .await?;

    Ok(ApiResponse::ok(DeleteResponse {
        message: report.message(),
        deleted: report.deleted,
        requested: report.requested,
        failed: report.failed,
    }))
}

/// Which checks find a reference to one attachment.
#[utoipa::path(
    get,
    path = "/api/v0/attachments/{id}/references",
    tag = "attachments",
    params(
        ("id" = u64, Path, description = "Attachment ID")
    ),
    responses(
        (status = 200, description = "Reference report, wrapped in the success envelope", body = ReferenceReport),
        (status = 400, description = "Invalid attachment id", body = ErrorResponse),
        (status = 403, description = "Permission denied", body = ErrorResponse),
        (status = 404, description = "Attachment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(role = %actor.role, attachment_id = %id, operation = "attachment_references"))]
pub async fn attachment_references(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    require(state.gate.can_read(&actor), &actor)?;

    let id: AssetId = id.parse()?;
    state
        .store
        .get_asset(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Attachment not found".to_string()))?;

    let matches = state.scanner.explain(id, state.store.as_ref()).await?;

    Ok(ApiResponse::ok(ReferenceReport {
        id,
        referenced: !matches.is_empty(),
        matches,
    }))
}
