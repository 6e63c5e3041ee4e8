//! Persisted key-value storage for local user state
//!
//! The watchlist and theme preference are read and written through the
//! [`KeyValueStore`] capability so the backing store can be swapped:
//! [`FileStore`] keeps a single JSON object on disk, [`MemoryStore`] lives
//! for the process only.

use crate::error::StorageError;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

/// String key-value storage
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed store: one JSON object mapping keys to string values
///
/// Writes go to a sibling `.tmp` file that is then renamed over the target.
/// A missing file reads as empty; a corrupt file also reads as empty and is
/// replaced on the next write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(map) => Ok(map),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Store file is corrupt, treating it as empty"
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn save(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(map)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.load()?;
        map.insert(key.to_string(), value.to_string());
        self.save(&map)
    }
}
