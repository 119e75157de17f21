//! Student companion: today's classes, attendance (presensi) and session entry,
//! backed by a local SQLite store.

pub mod attendance;
pub mod config;
pub mod db;
pub mod display;
pub mod preferences;
pub mod repository;
pub mod screens;
pub mod seed;
pub mod types;

pub use config::{AppConfig, MigrationPolicy};
pub use db::{Database, StoreError};
pub use repository::{AppRepository, LiveQuery};
pub use types::AppState;
