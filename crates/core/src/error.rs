//! Domain error type shared across the workspace.

/// Domain-level errors.
///
/// Upstream-service and timeout conditions are not represented here; they
/// belong to the pipeline layer, which owns the full error taxonomy for a
/// generation run.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Missing or malformed caller input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A named resource does not exist.
    #[error("{entity} '{key}' not found")]
    NotFound {
        /// Entity kind, e.g. `"Setting"`.
        entity: &'static str,
        /// Lookup key that missed.
        key: String,
    },

    /// Authentication failed or credentials are missing.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Local file read/write failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image bytes could not be decoded or re-encoded.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Anything that should never surface to a caller verbatim.
    #[error("Internal error: {0}")]
    Internal(String),
}
