//! Per-user generation history.

use axum::extract::State;
use axum::Json;

use fotomat_store::HistoryRecord;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// `GET /api/v1/history`
///
/// Returns the caller's generation records, newest first.
pub async fn list_history(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<HistoryRecord>>>> {
    let records = state.history.list_for_user(&user.username)?;
    Ok(Json(DataResponse { data: records }))
}
