//! Login endpoint issuing JWT access tokens.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use fotomat_core::error::CoreError;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub username: String,
    pub role: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

/// `POST /api/v1/auth/login`
///
/// Verifies the password against the provisioned account list and returns
/// a Bearer token. Unknown usernames and wrong passwords produce the same
/// response so the endpoint does not leak which accounts exist.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<LoginResponse>>> {
    let invalid =
        || AppError::Core(CoreError::Unauthorized("Invalid username or password".into()));

    let account = state.config.find_user(&payload.username).ok_or_else(invalid)?;

    let verified = verify_password(&payload.password, &account.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))?;
    if !verified {
        return Err(invalid());
    }

    let access_token = generate_access_token(&account.username, &account.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(username = %account.username, "User logged in");

    Ok(Json(DataResponse {
        data: LoginResponse {
            access_token,
            username: account.username.clone(),
            role: account.role.clone(),
            expires_in: state.config.jwt.access_token_expiry_mins * 60,
        },
    }))
}
