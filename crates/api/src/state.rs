use std::sync::Arc;

use fotomat_comfyui::ComfyUiApi;
use fotomat_store::{HistoryStore, SettingsStore};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable (everything is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration, loaded once at startup.
    pub config: Arc<ServerConfig>,
    /// Key/value settings store.
    pub settings: Arc<SettingsStore>,
    /// Per-user generation history store.
    pub history: Arc<HistoryStore>,
    /// Client for the upstream generation service.
    pub comfyui: Arc<ComfyUiApi>,
}
