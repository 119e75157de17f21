/// Application configuration (data location, schema migration policy, logging)
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// What to do when the store file was written by a build with another schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationPolicy {
    /// Drop every table and start from an empty schema. Stored data is lost.
    Destructive,
    /// Refuse to open the store.
    Fail,
}

impl Default for MigrationPolicy {
    fn default() -> Self {
        MigrationPolicy::Destructive
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the store file and the preferences file
    pub data_dir: PathBuf,
    pub migration_policy: MigrationPolicy,
    /// One of "trace", "debug", "info", "warn", "error"
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".mybest"),
            migration_policy: MigrationPolicy::default(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads the configuration from a JSON file
    ///
    /// Missing fields fall back to their defaults.
    ///
    /// # Arguments
    /// * `path` - Path to the JSON config file
    ///
    /// # Returns
    /// * `Ok(AppConfig)` - Loaded configuration
    /// * `Err(ConfigError)` - If the file can't be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Path of the preferences file inside the data directory
    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join("preferences.json")
    }

    /// Parses `log_level`, falling back to INFO for anything unrecognised
    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}
