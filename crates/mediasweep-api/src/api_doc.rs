//! OpenAPI documentation.
//! Paths in handler annotations use the literal /api/v0; they are rewritten at runtime
//! when `crate::constants::API_VERSION` differs.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::constants::API_VERSION;
use crate::error;
use crate::handlers;
use mediasweep_core::models;

/// Version used in handler path annotations (utoipa requires compile-time literals).
const OPENAPI_PATH_PLACEHOLDER: &str = "/api/v0";

fn transform_openapi_paths(spec: &mut utoipa::openapi::OpenApi, version: &str) {
    let replacement = format!("/api/{}", version);
    if OPENAPI_PATH_PLACEHOLDER == replacement {
        return;
    }
    let path_map = std::mem::take(&mut spec.paths.paths);
    for (key, item) in path_map {
        let new_key = key.replacen(OPENAPI_PATH_PLACEHOLDER, &replacement, 1);
        spec.paths.paths.insert(new_key, item);
    }
}

/// Returns the OpenAPI spec with path placeholders replaced by the current API version.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    let mut spec = ApiDoc::openapi();
    transform_openapi_paths(&mut spec, API_VERSION);
    spec
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Administrator or editor API key"))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mediasweep API",
        version = "0.1.0",
        description = "Finds media library attachments of a WordPress site that no content references, and deletes the ones an operator selects. State-changing endpoints require an anti-replay token from /api/v0/nonce in the X-Nonce header."
    ),
    modifiers(&BearerAuth),
    paths(
        handlers::nonce::issue_nonce,
        handlers::attachments::scan_attachments,
        handlers::attachments::delete_attachments,
        handlers::attachments::attachment_references,
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::MediaAsset,
            models::ReferenceKind,
            mediasweep_infra::IssuedNonce,
            handlers::attachments::IdInput,
            handlers::attachments::DeleteRequestBody,
            handlers::attachments::DeleteResponse,
            handlers::attachments::ReferenceReport,
            handlers::health::HealthCheckResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "attachments", description = "Unused media scanning and deletion"),
        (name = "auth", description = "Anti-replay tokens"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let spec = get_openapi_spec();
        for path in [
            "/api/v0/nonce",
            "/api/v0/attachments/scan",
            "/api/v0/attachments/delete",
            "/api/v0/attachments/{id}/references",
            "/health",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn path_rewrite_is_noop_for_current_version() {
        let mut spec = ApiDoc::openapi();
        let before = spec.paths.paths.len();
        transform_openapi_paths(&mut spec, API_VERSION);
        assert_eq!(spec.paths.paths.len(), before);
    }
}
