//! Integration tests for the settings endpoints, including role checks.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, put_json_auth};

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Settings reads require authentication.
#[tokio::test]
async fn settings_require_auth() {
    let harness = common::build_offline_test_app();
    let response = get(harness.app, "/api/v1/settings").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// A fresh deployment has no settings.
#[tokio::test]
async fn settings_list_starts_empty() {
    let harness = common::build_offline_test_app();
    let token = common::login(harness.app.clone(), "alice").await;

    let response = get_auth(harness.app, "/api/v1/settings", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"], serde_json::json!({}));
}

/// Reading a key that was never set returns 404.
#[tokio::test]
async fn missing_setting_returns_404() {
    let harness = common::build_offline_test_app();
    let token = common::login(harness.app.clone(), "alice").await;

    let response = get_auth(harness.app, "/api/v1/settings/style_prompt", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Admins can write a setting, and reads observe the new value.
#[tokio::test]
async fn admin_can_update_setting() {
    let harness = common::build_offline_test_app();
    let token = common::login(harness.app.clone(), "admin").await;

    let body = serde_json::json!({ "value": "oil painting, impasto" });
    let response = put_json_auth(
        harness.app.clone(),
        "/api/v1/settings/style_prompt",
        &token,
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(harness.app, "/api/v1/settings/style_prompt", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["key"], "style_prompt");
    assert_eq!(json["data"]["value"], "oil painting, impasto");
}

/// Non-admin users get 403 on writes, and the value stays unchanged.
#[tokio::test]
async fn non_admin_cannot_update_setting() {
    let harness = common::build_offline_test_app();
    let admin_token = common::login(harness.app.clone(), "admin").await;
    let user_token = common::login(harness.app.clone(), "alice").await;

    let body = serde_json::json!({ "value": "sneaky" });
    let response = put_json_auth(
        harness.app.clone(),
        "/api/v1/settings/style_prompt",
        &user_token,
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(harness.app, "/api/v1/settings/style_prompt", &admin_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Overwriting an existing key keeps exactly one value per key.
#[tokio::test]
async fn setting_overwrite_replaces_value() {
    let harness = common::build_offline_test_app();
    let token = common::login(harness.app.clone(), "admin").await;

    for value in ["first", "second"] {
        let body = serde_json::json!({ "value": value });
        let response =
            put_json_auth(harness.app.clone(), "/api/v1/settings/k", &token, body).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = get_auth(harness.app, "/api/v1/settings", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"], serde_json::json!({ "k": "second" }));
}
