//! Shared harness for API integration tests.
//!
//! Builds the real application router (same middleware stack as `main.rs`)
//! on top of temporary stores and a caller-supplied upstream URL, plus
//! request/response helpers.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use fotomat_api::auth::jwt::JwtConfig;
use fotomat_api::auth::password::hash_password;
use fotomat_api::config::{ServerConfig, UserAccount};
use fotomat_api::router::build_app_router;
use fotomat_api::state::AppState;
use fotomat_comfyui::ComfyUiApi;
use fotomat_store::{HistoryStore, SettingsStore};

/// Plaintext password shared by all provisioned test accounts.
pub const TEST_PASSWORD: &str = "test_password_123!";

/// A running test application plus the tempdir backing its stores.
///
/// Keep the struct alive for the duration of the test; dropping it removes
/// the upload/data directories.
pub struct TestApp {
    pub app: Router,
    pub dirs: TempDir,
}

/// Build a test `ServerConfig` with safe defaults.
///
/// Provisions two accounts, `admin` and `alice` (roles `admin` and `user`),
/// both with [`TEST_PASSWORD`]. Watermarking is off so generation output
/// bytes stay predictable.
pub fn test_config(comfyui_url: &str, dirs: &Path) -> ServerConfig {
    let hash = hash_password(TEST_PASSWORD).expect("hashing should succeed");
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        comfyui_url: comfyui_url.trim_end_matches('/').to_string(),
        upload_dir: dirs.join("uploads"),
        data_dir: dirs.join("data"),
        generation_timeout_secs: 5,
        poll_interval_secs: 0,
        max_image_dim: 2560,
        watermark_text: None,
        watermark_font_path: None,
        watermark_qr_url: None,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 60,
        },
        users: vec![
            UserAccount {
                username: "admin".to_string(),
                role: "admin".to_string(),
                password_hash: hash.clone(),
            },
            UserAccount {
                username: "alice".to_string(),
                role: "user".to_string(),
                password_hash: hash,
            },
        ],
    }
}

/// Build the full application router with all middleware layers, backed by
/// stores in a fresh tempdir.
///
/// `comfyui_url` points at whatever stands in for the generation service
/// (tests that never hit `/generate` can pass a dead address).
pub fn build_test_app(comfyui_url: &str) -> TestApp {
    build_test_app_with(comfyui_url, |_| {})
}

/// Like [`build_test_app`], with a hook to tweak the config first.
pub fn build_test_app_with(
    comfyui_url: &str,
    customize: impl FnOnce(&mut ServerConfig),
) -> TestApp {
    let dirs = tempfile::tempdir().expect("tempdir creation should succeed");
    let mut config = test_config(comfyui_url, dirs.path());
    customize(&mut config);

    let state = AppState {
        settings: Arc::new(SettingsStore::in_dir(&config.data_dir)),
        history: Arc::new(HistoryStore::in_dir(&config.data_dir)),
        comfyui: Arc::new(ComfyUiApi::new(config.comfyui_url.clone())),
        config: Arc::new(config.clone()),
    };

    TestApp {
        app: build_app_router(state, &config),
        dirs,
    }
}

/// Build a test app that never needs its upstream.
pub fn build_offline_test_app() -> TestApp {
    // Reserved TEST-NET-1 address: connections fail fast if reached.
    build_test_app("http://192.0.2.1:1")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a pre-built multipart body.
pub async fn post_multipart_auth(
    app: Router,
    uri: &str,
    token: &str,
    boundary: &str,
    body: Vec<u8>,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be valid JSON")
}

/// Collect a response body as raw bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Log in via the API and return the access token.
pub async fn login(app: Router, username: &str) -> String {
    let body = serde_json::json!({ "username": username, "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    json["data"]["access_token"]
        .as_str()
        .expect("login response must contain an access token")
        .to_string()
}

// ---------------------------------------------------------------------------
// Multipart body builder
// ---------------------------------------------------------------------------

/// Boundary used by [`multipart_body`].
pub const BOUNDARY: &str = "fotomat-test-boundary";

/// Fields for a `/generate` multipart request.
#[derive(Default)]
pub struct GenerateFields<'a> {
    pub photo: Option<(&'a str, &'a [u8])>,
    pub prompt: Option<&'a str>,
    pub seed: Option<&'a str>,
}

/// Hand-build a multipart/form-data body with [`BOUNDARY`].
pub fn multipart_body(fields: &GenerateFields<'_>) -> Vec<u8> {
    let mut body = Vec::new();

    if let Some((filename, bytes)) = fields.photo {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"photo\"; filename=\"{filename}\"\r\n\
                 Content-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    for (name, value) in [("prompt", fields.prompt), ("seed", fields.seed)] {
        if let Some(value) = value {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            );
            body.extend_from_slice(value.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
