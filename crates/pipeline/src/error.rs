//! Error taxonomy for a generation run.

use std::time::Duration;

use fotomat_comfyui::ComfyUiApiError;
use fotomat_core::error::CoreError;

/// Everything that can go wrong between accepting a photo and returning
/// the watermarked result.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Missing or malformed caller input. Surfaced immediately with a
    /// descriptive message.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The upload or submission call to the generation service failed.
    /// Carries the upstream's own status text; callers surface it
    /// untranslated.
    #[error("Upstream error: {0}")]
    Upstream(#[from] ComfyUiApiError),

    /// Polling exhausted its deadline without a retrievable output. A
    /// distinct "try again" condition, not a generic failure.
    #[error("Generation timed out after {}s", waited.as_secs())]
    Timeout {
        /// How long the poller actually waited.
        waited: Duration,
    },

    /// Local file read/write failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Post-processing failure (undecodable output, bad font, ...).
    #[error(transparent)]
    Core(CoreError),
}

impl From<CoreError> for PipelineError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Validation(msg) => PipelineError::Validation(msg),
            CoreError::Io(io) => PipelineError::Io(io),
            other => PipelineError::Core(other),
        }
    }
}
