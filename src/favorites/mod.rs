use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub const FAVORITES_STORAGE_KEY: &str = "matrimony_favorites";

#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("failed to read favorites store: {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write favorites store: {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("favorites store is corrupt: {path}: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// String key-value storage for client-local state.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, FavoritesError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), FavoritesError>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: HashMap<String, String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, FavoritesError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), FavoritesError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A JSON object on disk mapping keys to string values.
#[derive(Clone, Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, FavoritesError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(FavoritesError::Read {
                    path: self.path.display().to_string(),
                    source: e,
                })
            }
        };
        serde_json::from_str(&contents).map_err(|e| FavoritesError::Corrupt {
            path: self.path.display().to_string(),
            source: e,
        })
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, FavoritesError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), FavoritesError> {
        // A corrupt file is replaced rather than blocking the write.
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(key.to_string(), value.to_string());

        let write_err = |e| FavoritesError::Write {
            path: self.path.display().to_string(),
            source: e,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let body = serde_json::to_string_pretty(&entries).map_err(|e| FavoritesError::Corrupt {
            path: self.path.display().to_string(),
            source: e,
        })?;
        std::fs::write(&self.path, body).map_err(write_err)
    }
}

fn decode_positions(raw: &str) -> Option<Vec<usize>> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|v| v.as_u64())
            .filter_map(|n| usize::try_from(n).ok())
            .collect(),
    )
}

/// Persisted favorite positions. Any storage or decode failure yields none.
pub fn load_favorites(store: &dyn KeyValueStore) -> Vec<usize> {
    match store.get(FAVORITES_STORAGE_KEY) {
        Ok(Some(raw)) => match decode_positions(&raw) {
            Some(positions) => {
                debug!(count = positions.len(), "loaded favorites");
                positions
            }
            None => {
                warn!("ignoring malformed favorites entry");
                Vec::new()
            }
        },
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(error = %e, "favorites unavailable");
            Vec::new()
        }
    }
}

/// Rewrites the full favorites set. Failures are logged and dropped.
pub fn save_favorites(store: &mut dyn KeyValueStore, positions: &[usize]) {
    let body = match serde_json::to_string(positions) {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "failed to encode favorites");
            return;
        }
    };
    if let Err(e) = store.set(FAVORITES_STORAGE_KEY, &body) {
        warn!(error = %e, "failed to persist favorites");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_round_trip() {
        let mut store = MemoryKeyValueStore::new();
        assert!(load_favorites(&store).is_empty());
        save_favorites(&mut store, &[3, 0, 7]);
        assert_eq!(load_favorites(&store), vec![3, 0, 7]);
        assert_eq!(
            store.get(FAVORITES_STORAGE_KEY).unwrap().as_deref(),
            Some("[3,0,7]")
        );
    }

    #[test]
    fn malformed_entries_default_to_none() {
        let mut store = MemoryKeyValueStore::new();
        store.set(FAVORITES_STORAGE_KEY, "{not json").unwrap();
        assert!(load_favorites(&store).is_empty());
        store.set(FAVORITES_STORAGE_KEY, r#"{"a":1}"#).unwrap();
        assert!(load_favorites(&store).is_empty());
    }

    #[test]
    fn non_index_items_are_skipped() {
        let mut store = MemoryKeyValueStore::new();
        store
            .set(FAVORITES_STORAGE_KEY, r#"[1, -2, "3", 4.5, 6]"#)
            .unwrap();
        assert_eq!(load_favorites(&store), vec![1, 6]);
    }

    #[test]
    fn file_store_creates_parent_and_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("favorites.json");
        let mut store = FileKeyValueStore::new(&path);
        assert!(load_favorites(&store).is_empty());

        store.set("theme", "dark").unwrap();
        save_favorites(&mut store, &[2]);

        let reopened = FileKeyValueStore::new(&path);
        assert_eq!(load_favorites(&reopened), vec![2]);
        assert_eq!(reopened.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn corrupt_file_is_swallowed_then_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.json");
        std::fs::write(&path, "garbage").unwrap();

        let mut store = FileKeyValueStore::new(&path);
        assert!(matches!(
            store.get(FAVORITES_STORAGE_KEY),
            Err(FavoritesError::Corrupt { .. })
        ));
        assert!(load_favorites(&store).is_empty());

        save_favorites(&mut store, &[0, 1]);
        assert_eq!(load_favorites(&store), vec![0, 1]);
    }
}
