//! Key/value settings endpoints.
//!
//! Reads are open to any authenticated user; writes are admin-only.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use fotomat_core::error::CoreError;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SettingValue {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingRequest {
    pub value: String,
}

/// `GET /api/v1/settings`
pub async fn list_settings(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<DataResponse<BTreeMap<String, String>>>> {
    Ok(Json(DataResponse {
        data: state.settings.all()?,
    }))
}

/// `GET /api/v1/settings/{key}`
pub async fn get_setting(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(key): Path<String>,
) -> AppResult<Json<DataResponse<SettingValue>>> {
    let value = state.settings.get(&key)?.ok_or(CoreError::NotFound {
        entity: "Setting",
        key: key.clone(),
    })?;
    Ok(Json(DataResponse {
        data: SettingValue { key, value },
    }))
}

/// `PUT /api/v1/settings/{key}`
///
/// Admin-only.
pub async fn put_setting(
    State(state): State<AppState>,
    user: AuthUser,
    Path(key): Path<String>,
    Json(payload): Json<UpdateSettingRequest>,
) -> AppResult<Json<DataResponse<SettingValue>>> {
    if !user.is_admin() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only admins may change settings".into(),
        )));
    }

    state.settings.set(&key, &payload.value)?;
    tracing::info!(username = %user.username, key = %key, "Setting updated");

    Ok(Json(DataResponse {
        data: SettingValue {
            key,
            value: payload.value,
        },
    }))
}
