//! Flat-file persistence for settings and generation history.
//!
//! Deliberately thin: plain function calls over two files in a data
//! directory, no transactions, no cross-process locking. Settings live in
//! a single JSON object file; history records are appended to a JSON-lines
//! file and filtered on read.

pub mod history;
pub mod settings;

pub use history::{HistoryRecord, HistoryStore};
pub use settings::SettingsStore;

/// Errors from the flat-file stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
