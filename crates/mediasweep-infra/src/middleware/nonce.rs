//! Anti-replay tokens for state-changing requests
//!
//! A token is issued to an authenticated actor and must accompany every POST in
//! the `X-Nonce` header. It is bound to the actor and expires after a fixed
//! lifetime; like WordPress nonces it can be reused until then.
//!
//! Token format: `<hmac>.<timestamp>.<nonce>` where the HMAC-SHA256 covers
//! `<actor>.<timestamp>.<nonce>`.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use hmac::{Hmac, Mac};
use mediasweep_core::{AppError, ErrorMetadata};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use utoipa::ToSchema;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Request header carrying the token
pub const NONCE_HEADER: &str = "X-Nonce";

/// Accepted clock skew for timestamps in the future
const MAX_CLOCK_SKEW_SECS: u64 = 60;

/// Identity a token is bound to. Authentication inserts it into the request
/// extensions before the nonce middleware runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NonceSubject(pub String);

/// A freshly issued token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IssuedNonce {
    pub token: String,
    /// Unix timestamp (seconds) after which the token is rejected
    pub expires_at: u64,
}

/// Issues and verifies actor-bound tokens.
#[derive(Clone)]
pub struct NonceService {
    secret: String,
    ttl_secs: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

impl NonceService {
    pub fn new(secret: impl Into<String>, ttl_secs: u64) -> Self {
        Self {
            secret: secret.into(),
            ttl_secs,
        }
    }

    fn sign(&self, subject: &str, timestamp: u64, nonce: &str) -> Option<String> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes()).ok()?;
        mac.update(format!("{}.{}.{}", subject, timestamp, nonce).as_bytes());
        Some(hex::encode(mac.finalize().into_bytes()))
    }

    pub fn issue(&self, subject: &str) -> Result<IssuedNonce, AppError> {
        self.issue_at(subject, now_secs())
    }

    fn issue_at(&self, subject: &str, timestamp: u64) -> Result<IssuedNonce, AppError> {
        let nonce = Uuid::new_v4().to_string();
        let hmac = self
            .sign(subject, timestamp, &nonce)
            .ok_or_else(|| AppError::Config("Invalid nonce secret".to_string()))?;

        Ok(IssuedNonce {
            token: format!("{}.{}.{}", hmac, timestamp, nonce),
            expires_at: timestamp + self.ttl_secs,
        })
    }

    pub fn verify(&self, token: &str, subject: &str) -> Result<(), AppError> {
        self.verify_at(token, subject, now_secs())
    }

    /// Validates, in order: format, timestamp window, then the signature for `subject`.
    fn verify_at(&self, token: &str, subject: &str, now: u64) -> Result<(), AppError> {
        let parts: Vec<&str> = token.split('.').collect();
        let [hmac_part, timestamp_str, nonce] = parts.as_slice() else {
            return Err(AppError::InvalidToken("malformed token".to_string()));
        };

        let timestamp = timestamp_str
            .parse::<u64>()
            .map_err(|_| AppError::InvalidToken("malformed timestamp".to_string()))?;

        if timestamp.saturating_add(self.ttl_secs) < now {
            tracing::debug!("Nonce expired");
            return Err(AppError::InvalidToken("token expired".to_string()));
        }

        if timestamp > now.saturating_add(MAX_CLOCK_SKEW_SECS) {
            return Err(AppError::InvalidToken("token issued in the future".to_string()));
        }

        let expected = self
            .sign(subject, timestamp, nonce)
            .ok_or_else(|| AppError::Config("Invalid nonce secret".to_string()))?;

        if bool::from(expected.as_bytes().ct_eq(hmac_part.as_bytes())) {
            Ok(())
        } else {
            Err(AppError::InvalidToken("signature mismatch".to_string()))
        }
    }
}

fn reject(err: AppError) -> Response {
    tracing::warn!(error = %err, "Rejected request without a valid nonce");
    let status = StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::FORBIDDEN);
    (
        status,
        Json(serde_json::json!({
            "success": false,
            "data": err.client_message(),
            "code": err.error_code(),
        })),
    )
        .into_response()
}

/// Nonce enforcement middleware
///
/// Safe methods (GET, HEAD, OPTIONS) pass through. Every other request needs a
/// valid token for the [`NonceSubject`] in its extensions.
pub async fn nonce_middleware(
    State(nonces): State<Arc<NonceService>>,
    request: Request,
    next: Next,
) -> Response {
    if matches!(*request.method(), Method::GET | Method::HEAD | Method::OPTIONS) {
        return next.run(request).await;
    }

    let Some(subject) = request.extensions().get::<NonceSubject>().cloned() else {
        return reject(AppError::InvalidToken("no authenticated subject".to_string()));
    };

    let Some(token) = request
        .headers()
        .get(NONCE_HEADER)
        .and_then(|h| h.to_str().ok())
    else {
        return reject(AppError::InvalidToken("missing token".to_string()));
    };

    if let Err(e) = nonces.verify(token, &subject.0) {
        return reject(e);
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request as HttpRequest, middleware, routing::post, Router};
    use tower::ServiceExt;

    fn request(method: Method, token: Option<&str>) -> Request {
        let mut builder = HttpRequest::builder().method(method).uri("/");
        if let Some(token) = token {
            builder = builder.header(NONCE_HEADER, token);
        }
        builder.body(Body::empty()).unwrap()
    }

    const SECRET: &str = "test-secret-test-secret-test-secret";
    const TTL: u64 = 3600;

    fn service() -> NonceService {
        NonceService::new(SECRET, TTL)
    }

    #[test]
    fn test_issue_format() {
        let issued = service().issue("administrator").unwrap();
        let parts: Vec<&str> = issued.token.split('.').collect();
        assert_eq!(parts.len(), 3);
        // HMAC should be hex-encoded (64 chars for SHA256)
        assert_eq!(parts[0].len(), 64);
        let timestamp: u64 = parts[1].parse().unwrap();
        assert_eq!(issued.expires_at, timestamp + TTL);
    }

    #[test]
    fn test_verify_valid_and_reusable() {
        let nonces = service();
        let issued = nonces.issue("administrator").unwrap();
        assert!(nonces.verify(&issued.token, "administrator").is_ok());
        assert!(nonces.verify(&issued.token, "administrator").is_ok());
    }

    #[test]
    fn test_verify_bound_to_subject() {
        let nonces = service();
        let issued = nonces.issue("editor").unwrap();
        assert!(nonces.verify(&issued.token, "administrator").is_err());
    }

    #[test]
    fn test_verify_invalid_secret() {
        let issued = service().issue("administrator").unwrap();
        let other = NonceService::new("another-secret-another-secret-00", TTL);
        assert!(other.verify(&issued.token, "administrator").is_err());
    }

    #[test]
    fn test_verify_invalid_format() {
        let nonces = service();
        assert!(nonces.verify("abc.123", "administrator").is_err());
        assert!(nonces.verify("invalid", "administrator").is_err());
        assert!(nonces.verify("a.b.c.d", "administrator").is_err());
    }

    #[test]
    fn test_verify_expiry_window() {
        let nonces = service();
        let issued = nonces.issue_at("administrator", 1_000_000).unwrap();

        assert!(nonces
            .verify_at(&issued.token, "administrator", 1_000_000 + TTL)
            .is_ok());
        assert!(nonces
            .verify_at(&issued.token, "administrator", 1_000_000 + TTL + 1)
            .is_err());
        assert!(nonces
            .verify_at(&issued.token, "administrator", 1_000_000 - MAX_CLOCK_SKEW_SECS - 1)
            .is_err());
    }

    fn app(nonces: Arc<NonceService>) -> Router {
        Router::new()
            .route("/", post(|| async { "ok" }).get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(nonces, nonce_middleware))
            .layer(middleware::from_fn(
                |mut request: Request, next: Next| async move {
                    request
                        .extensions_mut()
                        .insert(NonceSubject("administrator".to_string()));
                    next.run(request).await
                },
            ))
    }

    #[tokio::test]
    async fn test_middleware_requires_token_on_post() {
        let nonces = Arc::new(service());

        let response = app(nonces.clone())
            .oneshot(request(Method::POST, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let token = nonces.issue("administrator").unwrap().token;
        let response = app(nonces)
            .oneshot(request(Method::POST, Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_middleware_skips_safe_methods() {
        let response = app(Arc::new(service()))
            .oneshot(request(Method::GET, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
