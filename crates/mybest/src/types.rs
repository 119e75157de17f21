use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::{Database, StoreError, StoreOptions};
use crate::preferences::PreferenceStore;
use crate::repository::AppRepository;

/// Everything the screens need, built once at startup and shared.
///
/// The store is opened exactly once here; every repository and screen gets the
/// same handle through this state.
pub struct AppState {
    pub config: AppConfig,
    pub repository: AppRepository,
    pub preferences: PreferenceStore,
}

impl AppState {
    /// Opens the store and the preference file under `config.data_dir`
    pub fn open(config: AppConfig) -> Result<Self, StoreError> {
        let options = StoreOptions {
            migration_policy: config.migration_policy,
            ..StoreOptions::default()
        };
        let database = Arc::new(Database::open(&config.data_dir, options)?);
        let preferences = PreferenceStore::open(&config.preferences_path());

        Ok(Self {
            config,
            repository: AppRepository::new(database),
            preferences,
        })
    }

    /// In-memory store and preferences (useful for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            config: AppConfig::default(),
            repository: AppRepository::new(Arc::new(Database::open_in_memory()?)),
            preferences: PreferenceStore::in_memory(),
        })
    }

    /// The shared store handle.
    pub fn database(&self) -> Arc<Database> {
        Arc::clone(self.repository.database())
    }
}
