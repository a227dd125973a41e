//! Typed builder for the image-restyle workflow graph.
//!
//! The generation service consumes a JSON prompt graph keyed by node id.
//! Rather than substituting strings into an untyped nested structure, the
//! graph is assembled from a validated [`StyleWorkflow`] so malformed jobs
//! fail at construction time, before any network call.

use serde_json::{json, Value};

use crate::error::CoreError;

/// Stable node ids within the prompt graph. The service echoes these back
/// in history payloads, so they must not change between submissions.
const NODE_LOAD_IMAGE: &str = "1";
const NODE_CHECKPOINT: &str = "2";
const NODE_POSITIVE: &str = "3";
const NODE_NEGATIVE: &str = "4";
const NODE_VAE_ENCODE: &str = "5";
const NODE_SAMPLER: &str = "6";
const NODE_VAE_DECODE: &str = "7";
const NODE_SAVE: &str = "8";

/// Prefix the service uses for output filenames.
const OUTPUT_PREFIX: &str = "fotomat";

/// A validated image-to-image restyle workflow.
///
/// Construct via [`StyleWorkflow::builder`]; serialize with
/// [`to_prompt_json`](Self::to_prompt_json).
#[derive(Debug, Clone, PartialEq)]
pub struct StyleWorkflow {
    input_image: String,
    checkpoint: String,
    positive_prompt: String,
    negative_prompt: String,
    seed: u64,
    steps: u32,
    cfg: f64,
    denoise: f64,
}

impl StyleWorkflow {
    pub fn builder() -> StyleWorkflowBuilder {
        StyleWorkflowBuilder::default()
    }

    /// Render the workflow as the prompt-graph JSON the service expects:
    /// LoadImage -> checkpoint/encoders -> KSampler -> VAEDecode -> SaveImage.
    pub fn to_prompt_json(&self) -> Value {
        json!({
            NODE_LOAD_IMAGE: {
                "class_type": "LoadImage",
                "inputs": { "image": self.input_image }
            },
            NODE_CHECKPOINT: {
                "class_type": "CheckpointLoaderSimple",
                "inputs": { "ckpt_name": self.checkpoint }
            },
            NODE_POSITIVE: {
                "class_type": "CLIPTextEncode",
                "inputs": { "text": self.positive_prompt, "clip": [NODE_CHECKPOINT, 1] }
            },
            NODE_NEGATIVE: {
                "class_type": "CLIPTextEncode",
                "inputs": { "text": self.negative_prompt, "clip": [NODE_CHECKPOINT, 1] }
            },
            NODE_VAE_ENCODE: {
                "class_type": "VAEEncode",
                "inputs": { "pixels": [NODE_LOAD_IMAGE, 0], "vae": [NODE_CHECKPOINT, 2] }
            },
            NODE_SAMPLER: {
                "class_type": "KSampler",
                "inputs": {
                    "model": [NODE_CHECKPOINT, 0],
                    "positive": [NODE_POSITIVE, 0],
                    "negative": [NODE_NEGATIVE, 0],
                    "latent_image": [NODE_VAE_ENCODE, 0],
                    "seed": self.seed,
                    "steps": self.steps,
                    "cfg": self.cfg,
                    "sampler_name": "euler",
                    "scheduler": "normal",
                    "denoise": self.denoise
                }
            },
            NODE_VAE_DECODE: {
                "class_type": "VAEDecode",
                "inputs": { "samples": [NODE_SAMPLER, 0], "vae": [NODE_CHECKPOINT, 2] }
            },
            NODE_SAVE: {
                "class_type": "SaveImage",
                "inputs": { "images": [NODE_VAE_DECODE, 0], "filename_prefix": OUTPUT_PREFIX }
            }
        })
    }
}

/// Builder with defaults suitable for a single restyle pass.
#[derive(Debug, Clone)]
pub struct StyleWorkflowBuilder {
    input_image: String,
    checkpoint: String,
    positive_prompt: String,
    negative_prompt: String,
    seed: u64,
    steps: u32,
    cfg: f64,
    denoise: f64,
}

impl Default for StyleWorkflowBuilder {
    fn default() -> Self {
        Self {
            input_image: String::new(),
            checkpoint: "sd_xl_base_1.0.safetensors".to_string(),
            positive_prompt: String::new(),
            negative_prompt: "blurry, deformed, low quality".to_string(),
            seed: 0,
            steps: 20,
            cfg: 7.0,
            denoise: 0.6,
        }
    }
}

impl StyleWorkflowBuilder {
    /// Server-assigned name of the uploaded input image. Required.
    pub fn input_image(mut self, name: impl Into<String>) -> Self {
        self.input_image = name.into();
        self
    }

    pub fn checkpoint(mut self, name: impl Into<String>) -> Self {
        self.checkpoint = name.into();
        self
    }

    /// Positive style prompt. Required.
    pub fn positive_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.positive_prompt = prompt.into();
        self
    }

    pub fn negative_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.negative_prompt = prompt.into();
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    pub fn cfg(mut self, cfg: f64) -> Self {
        self.cfg = cfg;
        self
    }

    /// Denoise strength in `(0, 1]`. Values near 1 discard most of the
    /// input photo; values near 0 barely restyle it.
    pub fn denoise(mut self, denoise: f64) -> Self {
        self.denoise = denoise;
        self
    }

    /// Validate and build the workflow.
    pub fn build(self) -> Result<StyleWorkflow, CoreError> {
        if self.input_image.trim().is_empty() {
            return Err(CoreError::Validation(
                "Workflow requires an uploaded input image name".to_string(),
            ));
        }
        if self.positive_prompt.trim().is_empty() {
            return Err(CoreError::Validation(
                "Workflow requires a non-empty positive prompt".to_string(),
            ));
        }
        if self.checkpoint.trim().is_empty() {
            return Err(CoreError::Validation(
                "Workflow requires a checkpoint name".to_string(),
            ));
        }
        if self.steps == 0 {
            return Err(CoreError::Validation(
                "Workflow steps must be at least 1".to_string(),
            ));
        }
        if !(self.denoise > 0.0 && self.denoise <= 1.0) {
            return Err(CoreError::Validation(format!(
                "Denoise must be in (0, 1], got {}",
                self.denoise
            )));
        }
        if !(self.cfg > 0.0) {
            return Err(CoreError::Validation(format!(
                "CFG scale must be positive, got {}",
                self.cfg
            )));
        }

        Ok(StyleWorkflow {
            input_image: self.input_image,
            checkpoint: self.checkpoint,
            positive_prompt: self.positive_prompt,
            negative_prompt: self.negative_prompt,
            seed: self.seed,
            steps: self.steps,
            cfg: self.cfg,
            denoise: self.denoise,
        })
    }
}
