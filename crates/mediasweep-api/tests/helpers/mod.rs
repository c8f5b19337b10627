#![allow(dead_code)]

use axum_test::TestServer;
use mediasweep_api::auth::{AuthState, AuthorizationGate};
use mediasweep_api::setup::routes::api_router;
use mediasweep_api::state::AppState;
use mediasweep_db::MemoryContentStore;
use mediasweep_infra::{NonceService, NONCE_HEADER};
use std::sync::Arc;

pub const ADMIN_API_KEY: &str = "test-admin-api-key-at-least-32-characters";
pub const EDITOR_API_KEY: &str = "test-editor-api-key-at-least-32-characters";
pub const NONCE_SECRET: &str = "test-nonce-secret-at-least-32-characters";

/// Returns the versioned API path for the current API version.
/// Usage: `api_path("/nonce")` -> `/api/v0/nonce`.
pub fn api_path(path: &str) -> String {
    format!("{}{}", mediasweep_api::constants::API_PREFIX, path)
}

pub fn bearer(key: &str) -> String {
    format!("Bearer {}", key)
}

/// Test application over an in-memory WordPress snapshot
pub struct TestApp {
    pub server: TestServer,
    /// Shares its data with the store the server uses
    pub store: MemoryContentStore,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Fetch an anti-replay token for the actor behind `key`.
    pub async fn nonce(&self, key: &str) -> String {
        let response = self
            .server
            .get(&api_path("/nonce"))
            .add_header("Authorization", bearer(key))
            .await;
        assert_eq!(response.status_code(), 200);
        let body: serde_json::Value = response.json();
        body["data"]["token"]
            .as_str()
            .expect("token in nonce response")
            .to_string()
    }

    /// POST with credentials and a fresh token for the same actor.
    pub async fn post_with_nonce(
        &self,
        key: &str,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> axum_test::TestResponse {
        let token = self.nonce(key).await;
        let mut request = self
            .server
            .post(&api_path(path))
            .add_header("Authorization", bearer(key))
            .add_header(NONCE_HEADER, token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        request.await
    }
}

pub fn setup_test_app(store: MemoryContentStore) -> TestApp {
    build(store, None)
}

pub fn setup_test_app_with_gate(
    store: MemoryContentStore,
    gate: Arc<dyn AuthorizationGate>,
) -> TestApp {
    build(store, Some(gate))
}

fn build(store: MemoryContentStore, gate: Option<Arc<dyn AuthorizationGate>>) -> TestApp {
    let auth = AuthState {
        admin_api_key: ADMIN_API_KEY.to_string(),
        editor_api_key: Some(EDITOR_API_KEY.to_string()),
    };
    let mut state = AppState::new(
        Arc::new(store.clone()),
        NonceService::new(NONCE_SECRET, 3600),
        auth,
    );
    if let Some(gate) = gate {
        state = state.with_gate(gate);
    }

    let server = TestServer::new(api_router(Arc::new(state))).expect("Failed to create test server");
    TestApp { server, store }
}

/// Three attachments: 1 is a featured image, 2 is linked from post content, 3 is unused.
pub fn scenario_store() -> MemoryContentStore {
    MemoryContentStore::new()
        .with_attachment(1, "https://blog.test/wp-content/uploads/2024/01/hero.jpg", "image/jpeg")
        .with_attachment(2, "https://blog.test/wp-content/uploads/2024/01/chart.png", "image/png")
        .with_attachment(3, "https://blog.test/wp-content/uploads/2024/01/old-brochure.pdf", "application/pdf")
        .with_post(10, "post", "Hello world")
        .with_featured_image(10, 1)
        .with_post(
            11,
            "page",
            r#"<img src="https://blog.test/wp-content/uploads/2024/01/chart.png" alt="">"#,
        )
}
