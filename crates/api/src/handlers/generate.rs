//! The main endpoint: accept a photo, run the generation pipeline, and
//! stream the watermarked result back.

use axum::extract::{Multipart, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;

use fotomat_comfyui::TokioClock;
use fotomat_core::naming::random_upload_name;
use fotomat_pipeline::{run_generation, GenerationRequest};
use fotomat_store::HistoryRecord;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Settings key consulted when the request carries no prompt.
pub const STYLE_PROMPT_KEY: &str = "style_prompt";

/// Last-resort prompt when neither the request nor the settings store
/// provides one.
const FALLBACK_PROMPT: &str = "professional portrait photo, soft studio lighting";

/// Multipart fields accepted by [`generate`].
#[derive(Debug, Default)]
struct GenerateForm {
    photo: Option<(String, Vec<u8>)>,
    prompt: Option<String>,
    negative_prompt: Option<String>,
    seed: Option<u64>,
}

async fn read_form(mut multipart: Multipart) -> AppResult<GenerateForm> {
    let mut form = GenerateForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "photo" => {
                let filename = field.file_name().unwrap_or("photo.png").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read photo: {e}")))?;
                form.photo = Some((filename, bytes.to_vec()));
            }
            "prompt" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read prompt: {e}")))?;
                if !text.trim().is_empty() {
                    form.prompt = Some(text);
                }
            }
            "negative_prompt" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read negative_prompt: {e}"))
                })?;
                if !text.trim().is_empty() {
                    form.negative_prompt = Some(text);
                }
            }
            "seed" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read seed: {e}")))?;
                let seed = text
                    .trim()
                    .parse()
                    .map_err(|_| AppError::BadRequest("seed must be a non-negative integer".into()))?;
                form.seed = Some(seed);
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    Ok(form)
}

/// `POST /api/v1/generate`
///
/// Multipart form:
/// - `photo` (required): the source image file
/// - `prompt` (optional): style prompt; falls back to the `style_prompt`
///   setting, then to a built-in default
/// - `negative_prompt`, `seed` (optional)
///
/// On success the response body is the finished PNG; the upstream job id
/// travels in the `x-generation-id` header. The image is also persisted
/// under the upload directory and recorded in the caller's history.
pub async fn generate(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let form = read_form(multipart).await?;

    let (original_filename, photo) = form.photo.ok_or_else(|| {
        AppError::Core(fotomat_core::error::CoreError::Validation(
            "Missing required field 'photo'".into(),
        ))
    })?;

    let prompt = match form.prompt {
        Some(p) => p,
        None => state
            .settings
            .get(STYLE_PROMPT_KEY)?
            .unwrap_or_else(|| FALLBACK_PROMPT.to_string()),
    };

    tracing::info!(
        username = %user.username,
        photo_bytes = photo.len(),
        prompt = %prompt,
        "Generation requested",
    );

    let mut request = GenerationRequest::new(photo, original_filename, &prompt);
    request.negative_prompt = form.negative_prompt;
    request.seed = form.seed;
    request.poll = state.config.poll_config();
    request.max_dim = state.config.max_image_dim;
    request.watermark = state.config.watermark_spec();

    let result = run_generation(state.comfyui.as_ref(), &TokioClock, request).await?;

    // Persist the output and record it before replying; a history entry
    // pointing at a missing file is worse than a slow response.
    let output_file = random_upload_name("output.png");
    tokio::fs::create_dir_all(&state.config.upload_dir)
        .await
        .map_err(fotomat_core::error::CoreError::Io)?;
    tokio::fs::write(
        state.config.upload_dir.join(&output_file),
        &result.artifact.bytes,
    )
    .await
    .map_err(fotomat_core::error::CoreError::Io)?;

    state
        .history
        .append(&HistoryRecord::new(&user.username, &prompt, &output_file))?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
    headers.insert(
        "x-generation-id",
        HeaderValue::from_str(&result.job.id.0)
            .map_err(|e| AppError::InternalError(format!("Invalid job id header: {e}")))?,
    );

    Ok((StatusCode::OK, headers, result.artifact.bytes))
}
