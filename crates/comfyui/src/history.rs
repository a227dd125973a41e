//! Typed view over the ComfyUI history payload.
//!
//! `GET /history/{prompt_id}` returns JSON shaped like
//! `{"<prompt_id>": {"outputs": {"<node>": {"images": [{...}]}}}}`.
//! This module extracts image references from that structure.

use serde::{Deserialize, Serialize};

/// Reference to one produced image, as reported in history output nodes
/// and consumed by the `/view` retrieval endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub filename: String,
    #[serde(default)]
    pub subfolder: String,
    /// Folder class on the server (`"output"`, `"temp"`, ...).
    #[serde(rename = "type", default = "default_folder_type")]
    pub folder_type: String,
}

fn default_folder_type() -> String {
    "output".to_string()
}

/// Extract the first image reference recorded for `prompt_id`.
///
/// The restyle workflow has exactly one image-producing node, so "first
/// found wins" needs no ordering or priority logic. Returns `None` when
/// the job is unknown or has produced no outputs yet -- both simply mean
/// "keep polling".
pub fn first_output(history: &serde_json::Value, prompt_id: &str) -> Option<ImageRef> {
    let outputs = history.get(prompt_id)?.get("outputs")?.as_object()?;

    for node_output in outputs.values() {
        if let Some(images) = node_output.get("images").and_then(|v| v.as_array()) {
            for image in images {
                if let Ok(image_ref) = serde_json::from_value::<ImageRef>(image.clone()) {
                    return Some(image_ref);
                }
            }
        }
    }
    None
}
