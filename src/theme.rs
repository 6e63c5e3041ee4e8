//! Persisted light/dark theme preference

use crate::{constants::THEME_STORAGE_KEY, error::StorageError, store::KeyValueStore};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Saved preference, or `Light` when absent or unrecognized
    pub fn load(storage: &dyn KeyValueStore) -> Self {
        match storage.get(THEME_STORAGE_KEY) {
            Ok(Some(raw)) => match raw.as_str() {
                "light" => Theme::Light,
                "dark" => Theme::Dark,
                other => {
                    tracing::debug!(value = other, "Unrecognized theme preference, using default");
                    Theme::default()
                }
            },
            Ok(None) => Theme::default(),
            Err(e) => {
                tracing::debug!(error = %e, "Failed to read theme preference, using default");
                Theme::default()
            }
        }
    }

    pub fn save(&self, storage: &dyn KeyValueStore) -> Result<(), StorageError> {
        storage.set(THEME_STORAGE_KEY, self.as_str())
    }
}
