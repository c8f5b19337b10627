//! Route configuration and setup

use crate::api_doc::get_openapi_spec;
use crate::auth::auth_middleware;
use crate::constants::{API_PREFIX, MAX_BODY_BYTES, MAX_CONCURRENT_REQUESTS};
use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{HeaderName, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use mediasweep_core::Config;
use mediasweep_infra::{nonce_middleware, NONCE_HEADER};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let app = api_router(state)
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

/// Public and protected routes without the outer HTTP layers.
///
/// Protected requests pass authentication, then the anti-replay check, then reach
/// the handler, which checks capabilities before touching its input.
pub fn api_router(state: Arc<AppState>) -> Router<()> {
    let protected = protected_routes(state.clone())
        .layer(from_fn_with_state(state.nonces.clone(), nonce_middleware))
        .layer(from_fn_with_state(state.auth.clone(), auth_middleware));

    public_routes(state).merge(protected)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let nonce_header = HeaderName::from_bytes(NONCE_HEADER.as_bytes())?;
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([
                axum::http::header::AUTHORIZATION,
                axum::http::header::CONTENT_TYPE,
                nonce_header,
            ])
    };
    Ok(cors)
}

/// Public routes (no authentication required)
fn public_routes(state: Arc<AppState>) -> Router<()> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(get_openapi_spec()) }),
        )
        .with_state(state)
}

/// Protected routes (require an API key)
fn protected_routes(state: Arc<AppState>) -> Router<()> {
    Router::new()
        .route(
            &format!("{}/nonce", API_PREFIX),
            get(handlers::nonce::issue_nonce),
        )
        .route(
            &format!("{}/attachments/scan", API_PREFIX),
            post(handlers::attachments::scan_attachments),
        )
        .route(
            &format!("{}/attachments/delete", API_PREFIX),
            post(handlers::attachments::delete_attachments),
        )
        .route(
            &format!("{}/attachments/{{id}}/references", API_PREFIX),
            get(handlers::attachments::attachment_references),
        )
        .with_state(state)
}
