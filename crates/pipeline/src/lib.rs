//! Generation orchestration: submit a photo, wait for the styled result,
//! post-process it.
//!
//! One [`run_generation`] call services one user request end to end. There
//! is no shared job registry and no cross-request coordination; concurrent
//! requests are fully independent.

pub mod error;
pub mod job;
pub mod runner;

pub use error::PipelineError;
pub use job::{GenerationJob, JobStatus};
pub use runner::{run_generation, GenerationRequest, GenerationResult};
