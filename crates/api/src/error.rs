use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use fotomat_core::error::CoreError;
use fotomat_pipeline::PipelineError;
use fotomat_store::StoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain, pipeline, and store error types and adds
/// HTTP-specific variants. Implements [`IntoResponse`] to produce
/// consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `fotomat_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A generation-run error from `fotomat_pipeline`.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// A flat-file store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Pipeline(pipeline) => classify_pipeline_error(pipeline),

            AppError::Store(err) => {
                tracing::error!(error = %err, "Store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map a [`CoreError`] to an HTTP status, error code, and message.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::NotFound { entity, key } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} '{key}' not found"),
        ),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Image(e) => (
            StatusCode::BAD_REQUEST,
            "INVALID_IMAGE",
            format!("Image could not be processed: {e}"),
        ),
        CoreError::Io(e) => {
            tracing::error!(error = %e, "IO error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

/// Map a [`PipelineError`] to an HTTP status, error code, and message.
///
/// - Validation -> 400 with the descriptive message
/// - Upstream -> 502 carrying the upstream's own status text untranslated
/// - Timeout -> 504 with a distinct "try again" code
fn classify_pipeline_error(err: &PipelineError) -> (StatusCode, &'static str, String) {
    match err {
        PipelineError::Validation(msg) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
        }
        PipelineError::Upstream(upstream) => (
            StatusCode::BAD_GATEWAY,
            "UPSTREAM_ERROR",
            upstream.to_string(),
        ),
        PipelineError::Timeout { waited } => (
            StatusCode::GATEWAY_TIMEOUT,
            "GENERATION_TIMEOUT",
            format!(
                "Generation did not finish within {}s. Try again.",
                waited.as_secs()
            ),
        ),
        PipelineError::Io(e) => {
            tracing::error!(error = %e, "Pipeline IO error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        PipelineError::Core(core) => classify_core_error(core),
    }
}
