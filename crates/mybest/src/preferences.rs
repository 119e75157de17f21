//! Key-value session preferences, persisted as a small JSON file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("Failed to write preferences to {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize preferences: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Preference lock poisoned")]
    Poisoned,
}

/// Session values the screens read and write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub is_logged_in: bool,
    pub is_guest_mode: bool,
    pub remember_me: bool,
    pub saved_nim: String,
    pub user_name: String,
}

/// Preference store. Every write is flushed to disk before returning.
pub struct PreferenceStore {
    path: Option<PathBuf>,
    values: Mutex<Preferences>,
}

impl PreferenceStore {
    /// Opens the store at `path`. A missing or unreadable file yields defaults.
    pub fn open(path: &Path) -> Self {
        let values = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring malformed preferences at {}: {}", path.display(), e);
                Preferences::default()
            }),
            Err(_) => {
                debug!("No preferences at {}, using defaults", path.display());
                Preferences::default()
            }
        };

        Self {
            path: Some(path.to_path_buf()),
            values: Mutex::new(values),
        }
    }

    /// A store that never touches disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: Mutex::new(Preferences::default()),
        }
    }

    /// Returns a copy of the current values.
    pub fn snapshot(&self) -> Preferences {
        self.values
            .lock()
            .map(|values| values.clone())
            .unwrap_or_default()
    }

    /// Applies `change` and persists the result.
    pub fn update<F>(&self, change: F) -> Result<Preferences, PreferenceError>
    where
        F: FnOnce(&mut Preferences),
    {
        let mut values = self.values.lock().map_err(|_| PreferenceError::Poisoned)?;
        change(&mut values);
        self.persist(&values)?;
        Ok(values.clone())
    }

    pub fn is_logged_in(&self) -> bool {
        self.snapshot().is_logged_in
    }

    pub fn is_guest_mode(&self) -> bool {
        self.snapshot().is_guest_mode
    }

    pub fn remember_me(&self) -> bool {
        self.snapshot().remember_me
    }

    pub fn saved_nim(&self) -> String {
        self.snapshot().saved_nim
    }

    pub fn user_name(&self) -> String {
        self.snapshot().user_name
    }

    fn persist(&self, values: &Preferences) -> Result<(), PreferenceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| PreferenceError::Io {
                path: path.clone(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(values)?;
        fs::write(path, content).map_err(|source| PreferenceError::Io {
            path: path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs").join("preferences.json");

        let store = PreferenceStore::open(&path);
        assert!(!store.is_logged_in());
        store
            .update(|p| {
                p.is_logged_in = true;
                p.remember_me = true;
                p.saved_nim = "19210001".to_string();
            })
            .unwrap();

        let reopened = PreferenceStore::open(&path);
        assert!(reopened.is_logged_in());
        assert!(reopened.remember_me());
        assert_eq!(reopened.saved_nim(), "19210001");
        assert!(!reopened.is_guest_mode());
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "not json").unwrap();

        let store = PreferenceStore::open(&path);
        assert_eq!(store.snapshot(), Preferences::default());
    }

    #[test]
    fn test_in_memory_store_updates() {
        let store = PreferenceStore::in_memory();
        store.update(|p| p.user_name = "Ani".to_string()).unwrap();
        assert_eq!(store.user_name(), "Ani");
    }
}
