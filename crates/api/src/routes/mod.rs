pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Maximum accepted photo upload size in bytes (32 MiB).
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login          login (public)
///
/// /generate            run a generation (multipart, requires auth)
///
/// /history             caller's generation history (requires auth)
///
/// /settings            list settings (requires auth)
/// /settings/{key}      get (requires auth), update (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route(
            "/generate",
            post(handlers::generate::generate).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/history", get(handlers::history::list_history))
        .route("/settings", get(handlers::settings::list_settings))
        .route(
            "/settings/{key}",
            get(handlers::settings::get_setting).put(handlers::settings::put_setting),
        )
}
