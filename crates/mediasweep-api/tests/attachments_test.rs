mod helpers;

use helpers::{
    api_path, bearer, scenario_store, setup_test_app, setup_test_app_with_gate, ADMIN_API_KEY,
    EDITOR_API_KEY,
};
use mediasweep_api::auth::{Actor, AuthorizationGate};
use mediasweep_db::MemoryContentStore;
use mediasweep_infra::NONCE_HEADER;
use serde_json::json;
use std::sync::Arc;

struct DenyAll;

impl AuthorizationGate for DenyAll {
    fn can_read(&self, _actor: &Actor) -> bool {
        false
    }

    fn can_delete(&self, _actor: &Actor) -> bool {
        false
    }
}

#[tokio::test]
async fn test_scan_lists_only_unreferenced_attachments() {
    let app = setup_test_app(scenario_store());

    let response = app
        .post_with_nonce(ADMIN_API_KEY, "/attachments/scan", None)
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], 3);
    assert_eq!(rows[0]["filename"], "old-brochure.pdf");
    assert_eq!(
        rows[0]["url"],
        "https://blog.test/wp-content/uploads/2024/01/old-brochure.pdf"
    );
    assert!(rows[0]["thumbnail"].is_null());
}

#[tokio::test]
async fn test_scan_requires_nonce() {
    let app = setup_test_app(scenario_store());

    let response = app
        .client()
        .post(&api_path("/attachments/scan"))
        .add_header("Authorization", bearer(ADMIN_API_KEY))
        .await;

    assert_eq!(response.status_code(), 403);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "INVALID_TOKEN");
    assert_eq!(app.store.query_count(), 0);
}

#[tokio::test]
async fn test_nonce_is_bound_to_actor() {
    let app = setup_test_app(scenario_store());
    let editor_token = app.nonce(EDITOR_API_KEY).await;

    let response = app
        .client()
        .post(&api_path("/attachments/scan"))
        .add_header("Authorization", bearer(ADMIN_API_KEY))
        .add_header(NONCE_HEADER, editor_token)
        .await;

    assert_eq!(response.status_code(), 403);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_unknown_api_key_is_unauthorized() {
    let app = setup_test_app(scenario_store());

    let response = app
        .client()
        .get(&api_path("/nonce"))
        .add_header("Authorization", bearer("not-a-real-key"))
        .await;
    assert_eq!(response.status_code(), 401);

    let response = app.client().post(&api_path("/attachments/scan")).await;
    assert_eq!(response.status_code(), 401);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_editor_cannot_scan() {
    let app = setup_test_app(scenario_store());

    let response = app
        .post_with_nonce(EDITOR_API_KEY, "/attachments/scan", None)
        .await;

    assert_eq!(response.status_code(), 403);
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"], "Permission denied.");
    assert_eq!(body["code"], "PERMISSION_DENIED");
    assert_eq!(app.store.query_count(), 0);
}

#[tokio::test]
async fn test_scan_fails_when_store_unavailable() {
    let app = setup_test_app(scenario_store());
    app.store.set_unavailable(true);

    let response = app
        .post_with_nonce(ADMIN_API_KEY, "/attachments/scan", None)
        .await;

    assert_eq!(response.status_code(), 503);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "STORE_UNAVAILABLE");
}

#[tokio::test]
async fn test_delete_without_ids() {
    let app = setup_test_app(scenario_store());

    for body in [json!({"ids": []}), json!({})] {
        let response = app
            .post_with_nonce(ADMIN_API_KEY, "/attachments/delete", Some(body))
            .await;

        assert_eq!(response.status_code(), 400);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["data"], "No IDs provided.");
    }
}

#[tokio::test]
async fn test_delete_permission_checked_before_input() {
    let app = setup_test_app_with_gate(scenario_store(), Arc::new(DenyAll));

    // Even an invalid body reports the permission failure.
    let response = app
        .post_with_nonce(ADMIN_API_KEY, "/attachments/delete", Some(json!({"ids": "x"})))
        .await;
    assert_eq!(response.status_code(), 403);
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"], "Permission denied.");

    let response = app
        .post_with_nonce(ADMIN_API_KEY, "/attachments/delete", Some(json!({"ids": [3]})))
        .await;
    assert_eq!(response.status_code(), 403);
    assert!(app.store.contains_asset(3));
    assert_eq!(app.store.query_count(), 0);
}

#[tokio::test]
async fn test_editor_can_delete() {
    let app = setup_test_app(scenario_store());

    let response = app
        .post_with_nonce(EDITOR_API_KEY, "/attachments/delete", Some(json!({"ids": ["3"]})))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["deleted"], 1);
    assert_eq!(body["data"]["message"], "Deleted 1 attachments.");
    assert!(!app.store.contains_asset(3));
}

#[tokio::test]
async fn test_delete_counts_only_successful_deletions() {
    let store = scenario_store();
    store.fail_delete(2);
    let app = setup_test_app(store);

    let response = app
        .post_with_nonce(
            ADMIN_API_KEY,
            "/attachments/delete",
            Some(json!({"ids": [3, "2", 1, 404, 3]})),
        )
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["requested"], 4);
    assert_eq!(body["data"]["deleted"], 2);
    assert_eq!(body["data"]["failed"], json!([2]));
    assert_eq!(body["data"]["message"], "Deleted 2 attachments.");
    assert!(!app.store.contains_asset(1));
    assert!(app.store.contains_asset(2));
    assert!(!app.store.contains_asset(3));
}

#[tokio::test]
async fn test_delete_rejects_invalid_ids() {
    let app = setup_test_app(scenario_store());

    let response = app
        .post_with_nonce(ADMIN_API_KEY, "/attachments/delete", Some(json!({"ids": ["abc"]})))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert!(app.store.contains_asset(3));
}

#[tokio::test]
async fn test_rescan_after_delete_is_empty() {
    let app = setup_test_app(scenario_store());

    app.post_with_nonce(ADMIN_API_KEY, "/attachments/delete", Some(json!({"ids": [3]})))
        .await;
    let response = app
        .post_with_nonce(ADMIN_API_KEY, "/attachments/scan", None)
        .await;

    let body: serde_json::Value = response.json();
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_references_explain_matches() {
    let app = setup_test_app(scenario_store());

    let response = app
        .client()
        .get(&api_path("/attachments/1/references"))
        .add_header("Authorization", bearer(ADMIN_API_KEY))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["id"], 1);
    assert_eq!(body["data"]["referenced"], true);
    let matches = body["data"]["matches"].as_array().unwrap();
    assert!(matches.contains(&json!("featured_image")));

    let response = app
        .client()
        .get(&api_path("/attachments/3/references"))
        .add_header("Authorization", bearer(ADMIN_API_KEY))
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["referenced"], false);
    assert_eq!(body["data"]["matches"], json!([]));
}

#[tokio::test]
async fn test_references_of_missing_attachment() {
    let app = setup_test_app(MemoryContentStore::new());

    let response = app
        .client()
        .get(&api_path("/attachments/99/references"))
        .add_header("Authorization", bearer(ADMIN_API_KEY))
        .await;
    assert_eq!(response.status_code(), 404);

    let response = app
        .client()
        .get(&api_path("/attachments/abc/references"))
        .add_header("Authorization", bearer(ADMIN_API_KEY))
        .await;
    assert_eq!(response.status_code(), 400);
}
