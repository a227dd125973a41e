//! ComfyUI REST client and result poller.
//!
//! Wraps the four HTTP endpoints the photo pipeline needs (image upload,
//! workflow submission, history lookup, output retrieval) and the polling
//! state machine that waits for a submitted job to produce an image.

pub mod api;
pub mod history;
pub mod poller;

pub use api::{ComfyUiApi, ComfyUiApiError, SubmitResponse};
pub use history::ImageRef;
pub use poller::{poll_for_output, Clock, GenerationBackend, PollConfig, PollOutcome, TokioClock};
