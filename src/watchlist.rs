//! Persisted watchlist of asset ids
//!
//! The list is an insertion-ordered set stored as a JSON array of strings
//! under [`WATCHLIST_STORAGE_KEY`]. It holds ids only; market data for them
//! is fetched by the watchlist tracker.

use crate::{constants::WATCHLIST_STORAGE_KEY, error::StorageError, store::KeyValueStore};
use std::sync::Arc;

/// Insertion-ordered set of asset ids backed by a key-value store
pub struct Watchlist {
    ids: Vec<String>,
    storage: Arc<dyn KeyValueStore>,
}

impl Watchlist {
    /// Reads the saved watchlist
    ///
    /// Missing, unreadable or malformed content yields an empty watchlist;
    /// the last two are logged.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let ids = match storage.get(WATCHLIST_STORAGE_KEY) {
            Ok(Some(raw)) => parse_ids(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read saved watchlist, starting empty");
                Vec::new()
            }
        };

        Self { ids, storage }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    /// Appends `id` if absent and persists
    ///
    /// Returns whether the list changed. On a storage error the in-memory
    /// list keeps the new id.
    pub fn add(&mut self, id: &str) -> Result<bool, StorageError> {
        if self.contains(id) {
            return Ok(false);
        }
        self.ids.push(id.to_string());
        self.persist()?;
        Ok(true)
    }

    /// Removes `id` if present and persists
    ///
    /// Returns whether the list changed. On a storage error the in-memory
    /// list stays without the id.
    pub fn remove(&mut self, id: &str) -> Result<bool, StorageError> {
        let before = self.ids.len();
        self.ids.retain(|existing| existing != id);
        if self.ids.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.ids)?;
        self.storage.set(WATCHLIST_STORAGE_KEY, &json)
    }
}

fn parse_ids(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(stored) => {
            let mut ids: Vec<String> = Vec::with_capacity(stored.len());
            for id in stored {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            ids
        }
        Err(e) => {
            tracing::warn!(error = %e, "Saved watchlist is malformed, starting empty");
            Vec::new()
        }
    }
}
