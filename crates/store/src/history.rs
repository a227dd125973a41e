//! Per-user generation history, append-only JSON lines.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::StoreError;

/// One completed (or attempted) generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Local record id, not the upstream job id.
    pub id: String,
    pub username: String,
    pub prompt: String,
    /// Filename of the stored watermarked output, relative to the upload
    /// directory.
    pub output_file: String,
    pub created_at: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn new(
        username: impl Into<String>,
        prompt: impl Into<String>,
        output_file: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.into(),
            prompt: prompt.into(),
            output_file: output_file.into(),
            created_at: Utc::now(),
        }
    }
}

/// Append/query store over a JSON-lines file.
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Conventional filename inside a data directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join("history.jsonl"))
    }

    /// Append one record.
    pub fn append(&self, record: &HistoryRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        file.write_all(&line)?;
        Ok(())
    }

    /// All records for `username`, newest first.
    ///
    /// Unparseable lines are skipped with a warning rather than failing
    /// the whole query; a half-written trailing line must not take the
    /// history page down.
    pub fn list_for_user(&self, username: &str) -> Result<Vec<HistoryRecord>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records: Vec<HistoryRecord> = Vec::new();
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<HistoryRecord>(line) {
                Ok(record) if record.username == username => records.push(record),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unparseable history line");
                }
            }
        }

        records.reverse();
        Ok(records)
    }
}
