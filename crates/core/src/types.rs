//! Core identifier and artifact types.

use serde::{Deserialize, Serialize};

/// Opaque job identifier issued by the external generation service.
///
/// The service mints these (`prompt_id` in the ComfyUI API); we never
/// parse or synthesize them locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Server-assigned name for an image uploaded to the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedImage {
    /// Filename as stored in the service's input folder. This is the value
    /// substituted into the workflow template, not our local name.
    pub name: String,
}

/// Raw binary image plus its inferred dimensions.
///
/// Produced by upload handling, by the generation service, or by the
/// watermark step. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageArtifact {
    /// Encoded image bytes (PNG unless stated otherwise).
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ImageArtifact {
    pub fn new(bytes: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            bytes,
            width,
            height,
        }
    }
}
