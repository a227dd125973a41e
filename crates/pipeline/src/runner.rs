//! End-to-end generation run: upload, submit, poll, post-process.

use fotomat_comfyui::poller::{poll_for_output, Clock, GenerationBackend, PollConfig, PollOutcome};
use fotomat_core::naming::random_upload_name;
use fotomat_core::types::{ImageArtifact, JobId};
use fotomat_core::watermark::{apply_watermark, resize_to_max, WatermarkSpec, DEFAULT_MAX_DIM};
use fotomat_core::workflow::StyleWorkflow;

use crate::error::PipelineError;
use crate::job::GenerationJob;

/// Everything needed to run one generation.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Encoded bytes of the user's photo.
    pub image: Vec<u8>,
    /// Original filename, used only to pick the upload extension.
    pub original_filename: String,
    /// Positive style prompt.
    pub prompt: String,
    /// Override for the default negative prompt.
    pub negative_prompt: Option<String>,
    /// Sampler seed; random when absent.
    pub seed: Option<u64>,
    /// Override for the default checkpoint.
    pub checkpoint: Option<String>,
    pub poll: PollConfig,
    /// Maximum output dimension for the resize step.
    pub max_dim: u32,
    pub watermark: WatermarkSpec,
}

impl GenerationRequest {
    pub fn new(image: Vec<u8>, original_filename: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            image,
            original_filename: original_filename.into(),
            prompt: prompt.into(),
            negative_prompt: None,
            seed: None,
            checkpoint: None,
            poll: PollConfig::default(),
            max_dim: DEFAULT_MAX_DIM,
            watermark: WatermarkSpec::default(),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct GenerationResult {
    /// The finished, watermarked image.
    pub artifact: ImageArtifact,
    /// Job record in its terminal state, for history/audit.
    pub job: GenerationJob,
}

/// Run one generation end to end.
///
/// Uploads the photo under a random name, submits the typed workflow,
/// polls until an output appears or the deadline passes, then applies the
/// resize and watermark steps. Upload and submission failures are
/// [`PipelineError::Upstream`] and are not retried; only the polling loop
/// itself tolerates transient errors.
pub async fn run_generation(
    backend: &dyn GenerationBackend,
    clock: &dyn Clock,
    request: GenerationRequest,
) -> Result<GenerationResult, PipelineError> {
    if request.image.is_empty() {
        return Err(PipelineError::Validation(
            "No photo supplied".to_string(),
        ));
    }
    if request.prompt.trim().is_empty() {
        return Err(PipelineError::Validation(
            "Prompt must not be empty".to_string(),
        ));
    }

    // 1. Upload the photo under a collision-free name.
    let upload_name = random_upload_name(&request.original_filename);
    let uploaded = backend.upload_image(&upload_name, request.image).await?;
    tracing::debug!(local_name = %upload_name, remote_name = %uploaded.name, "Photo uploaded");

    // 2. Build and submit the workflow.
    let mut builder = StyleWorkflow::builder()
        .input_image(uploaded.name)
        .positive_prompt(&request.prompt)
        .seed(request.seed.unwrap_or_else(rand::random));
    if let Some(negative) = &request.negative_prompt {
        builder = builder.negative_prompt(negative);
    }
    if let Some(checkpoint) = &request.checkpoint {
        builder = builder.checkpoint(checkpoint);
    }
    let workflow = builder.build()?;

    let client_id = uuid::Uuid::new_v4().to_string();
    let submitted = backend
        .submit_workflow(&workflow.to_prompt_json(), &client_id)
        .await?;
    tracing::info!(
        prompt_id = %submitted.prompt_id,
        queue_position = submitted.number,
        "Workflow submitted",
    );

    let mut job = GenerationJob::submitted(JobId(submitted.prompt_id.clone()));

    // 3. Poll for the result.
    job.mark_polling();
    let bytes = match poll_for_output(backend, clock, &submitted.prompt_id, &request.poll).await {
        PollOutcome::Found(bytes) => bytes,
        PollOutcome::Exhausted { waited } => {
            job.mark_timed_out();
            return Err(PipelineError::Timeout { waited });
        }
    };

    // 4. Post-process: downsize, then stamp.
    let artifact = match resize_to_max(&bytes, request.max_dim)
        .and_then(|resized| apply_watermark(&resized.bytes, &request.watermark))
    {
        Ok(artifact) => artifact,
        Err(e) => {
            job.mark_failed();
            tracing::error!(job_id = %job.id, error = %e, "Post-processing failed");
            return Err(e.into());
        }
    };
    job.mark_completed();

    tracing::info!(
        job_id = %job.id,
        width = artifact.width,
        height = artifact.height,
        "Generation completed",
    );
    Ok(GenerationResult { artifact, job })
}
