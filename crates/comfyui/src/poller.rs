//! Result polling: wait for a submitted job to produce an image.
//!
//! The poller queries the history endpoint at a fixed interval until an
//! output reference appears or a deadline elapses. Transient failures --
//! a dropped connection, a 5xx from the service -- are logged and
//! tolerated; the deadline is the only thing that ends an unproductive
//! loop. Both the backend and the clock are trait seams so tests can run
//! the loop deterministically without sockets or real sleeps.

use std::time::{Duration, Instant};

use async_trait::async_trait;

use fotomat_core::types::UploadedImage;

use crate::api::{ComfyUiApi, ComfyUiApiError, SubmitResponse};
use crate::history::{first_output, ImageRef};

/// Default upper bound on total polling time.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(180);

/// Default pause between successive status checks.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Time source and sleep mechanism for the polling loop.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    async fn sleep(&self, dur: Duration);
}

/// Production clock backed by `tokio::time`.
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, dur: Duration) {
        tokio::time::sleep(dur).await;
    }
}

/// The subset of the generation service the pipeline talks to.
///
/// [`ComfyUiApi`] is the production implementation; tests substitute
/// canned fakes.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn upload_image(
        &self,
        name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedImage, ComfyUiApiError>;

    async fn submit_workflow(
        &self,
        workflow: &serde_json::Value,
        client_id: &str,
    ) -> Result<SubmitResponse, ComfyUiApiError>;

    async fn get_history(&self, prompt_id: &str) -> Result<serde_json::Value, ComfyUiApiError>;

    async fn fetch_output(&self, image: &ImageRef) -> Result<Vec<u8>, ComfyUiApiError>;
}

#[async_trait]
impl GenerationBackend for ComfyUiApi {
    async fn upload_image(
        &self,
        name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedImage, ComfyUiApiError> {
        ComfyUiApi::upload_image(self, name, bytes).await
    }

    async fn submit_workflow(
        &self,
        workflow: &serde_json::Value,
        client_id: &str,
    ) -> Result<SubmitResponse, ComfyUiApiError> {
        ComfyUiApi::submit_workflow(self, workflow, client_id).await
    }

    async fn get_history(&self, prompt_id: &str) -> Result<serde_json::Value, ComfyUiApiError> {
        ComfyUiApi::get_history(self, prompt_id).await
    }

    async fn fetch_output(&self, image: &ImageRef) -> Result<Vec<u8>, ComfyUiApiError> {
        ComfyUiApi::fetch_output(self, image).await
    }
}

/// Polling parameters.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Upper bound on total blocking time; the loop exits with
    /// [`PollOutcome::Exhausted`] once elapsed time reaches it.
    pub max_wait: Duration,
    /// Fixed pause between status checks. No backoff.
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_wait: DEFAULT_MAX_WAIT,
            interval: DEFAULT_INTERVAL,
        }
    }
}

/// Terminal states of the polling loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// An output appeared and its bytes were retrieved.
    Found(Vec<u8>),
    /// The deadline elapsed with no retrievable output. This is an
    /// explicit absence value, not an error.
    Exhausted {
        /// How long the loop actually waited.
        waited: Duration,
    },
}

/// Poll the service until `prompt_id` has a retrievable output or the
/// deadline elapses.
///
/// Per tick:
/// - history query fails transiently -> log and keep polling
/// - job has no outputs yet -> keep polling
/// - output reference found -> fetch its bytes; a failed fetch is also
///   transient, a successful one returns [`PollOutcome::Found`]
///
/// The loop checks the deadline after every attempt, so `max_wait` is a
/// hard upper bound on blocking time.
pub async fn poll_for_output(
    backend: &dyn GenerationBackend,
    clock: &dyn Clock,
    prompt_id: &str,
    config: &PollConfig,
) -> PollOutcome {
    let started = clock.now();

    loop {
        match backend.get_history(prompt_id).await {
            Ok(history) => {
                if let Some(image) = first_output(&history, prompt_id) {
                    match backend.fetch_output(&image).await {
                        Ok(bytes) => {
                            tracing::info!(
                                prompt_id,
                                filename = %image.filename,
                                size = bytes.len(),
                                "Generation output retrieved",
                            );
                            return PollOutcome::Found(bytes);
                        }
                        Err(e) => {
                            tracing::warn!(
                                prompt_id,
                                filename = %image.filename,
                                error = %e,
                                "Output fetch failed, will retry",
                            );
                        }
                    }
                } else {
                    tracing::debug!(prompt_id, "No outputs yet");
                }
            }
            Err(e) => {
                tracing::warn!(prompt_id, error = %e, "History query failed, will retry");
            }
        }

        let waited = clock.now().duration_since(started);
        if waited >= config.max_wait {
            tracing::info!(prompt_id, waited_secs = waited.as_secs(), "Polling exhausted");
            return PollOutcome::Exhausted { waited };
        }
        clock.sleep(config.interval).await;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
