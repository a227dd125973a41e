//! Key/value settings backed by a single JSON object file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::StoreError;

/// Simple string-to-string settings store.
///
/// Each mutation rewrites the whole file; reads parse it fresh. Good
/// enough for a handful of keys touched by humans, which is all this
/// service keeps.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Open (or lazily create) the settings file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Conventional filename inside a data directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join("settings.json"))
    }

    /// Look up a setting. `Ok(None)` when the key (or the whole file)
    /// does not exist yet.
    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    /// Write a setting, creating the file on first use.
    pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.load()?;
        map.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(&map)?)?;
        Ok(())
    }

    /// All settings, sorted by key.
    pub fn all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        self.load()
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_on_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::in_dir(dir.path());
        assert_eq!(store.get("theme").unwrap(), None);
    }

    #[test]
    fn set_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::in_dir(dir.path());

        store.set("watermark_text", "fotomat.example").unwrap();
        assert_eq!(
            store.get("watermark_text").unwrap().as_deref(),
            Some("fotomat.example")
        );
    }

    #[test]
    fn set_overwrites_existing_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::in_dir(dir.path());

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn all_returns_every_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::in_dir(dir.path());

        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        let all = store.all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["a"], "1");
    }
}
