/// Database module for the local student store (users, schedules, notifications)

mod error;
mod types;

pub use error::StoreError;
pub use types::{Day, NewSchedule, NewUser, Notification, Schedule, Table, User};

use crate::config::MigrationPolicy;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{info, warn};

const SCHEMA_SQL: &str = include_str!("../../../../sql/init_schema.sql");

/// File name of the store inside the data directory.
pub const DATABASE_FILE: &str = "mybest_database.sqlite";

/// Schema version this build declares. Bump it whenever `init_schema.sql` changes.
pub const SCHEMA_VERSION: i32 = 1;

/// How a store should be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    pub schema_version: i32,
    pub migration_policy: MigrationPolicy,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            migration_policy: MigrationPolicy::Destructive,
        }
    }
}

/// One revision counter per table. Writers bump it, live queries wake on it.
struct ChangeFeeds {
    users: watch::Sender<u64>,
    schedules: watch::Sender<u64>,
    notifications: watch::Sender<u64>,
}

impl ChangeFeeds {
    fn new() -> Self {
        Self {
            users: watch::channel(0).0,
            schedules: watch::channel(0).0,
            notifications: watch::channel(0).0,
        }
    }

    fn sender(&self, table: Table) -> &watch::Sender<u64> {
        match table {
            Table::Users => &self.users,
            Table::Schedules => &self.schedules,
            Table::Notifications => &self.notifications,
        }
    }
}

/// Handle to the local store.
///
/// Construct it once at startup and share it behind an `Arc`; every
/// repository and screen works off the same connection.
pub struct Database {
    conn: Mutex<Connection>,
    feeds: ChangeFeeds,
}

impl Database {
    /// Opens (or creates) the store file inside `data_dir`
    ///
    /// # Arguments
    /// * `data_dir` - Directory holding `mybest_database.sqlite`; created if missing
    /// * `options` - Declared schema version and what to do when the file disagrees
    ///
    /// # Returns
    /// * `Ok(Database)` - Ready store with the declared schema
    /// * `Err(StoreError)` - If the file can't be opened, or the schema differs
    ///   under `MigrationPolicy::Fail`
    pub fn open(data_dir: &Path, options: StoreOptions) -> Result<Self, StoreError> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(DATABASE_FILE);

        info!("Opening store at {}", path.display());
        let conn = Connection::open(&path)?;
        Self::from_connection(conn, options)
    }

    /// Creates an in-memory store (useful for testing)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?, StoreOptions::default())
    }

    fn from_connection(conn: Connection, options: StoreOptions) -> Result<Self, StoreError> {
        init_schema(&conn, options)?;
        Ok(Self {
            conn: Mutex::new(conn),
            feeds: ChangeFeeds::new(),
        })
    }

    /// Locks the connection for a batch of statements.
    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Publishes a change on `table` so live queries re-run.
    pub(crate) fn notify(&self, table: Table) {
        self.feeds.sender(table).send_modify(|rev| *rev += 1);
    }

    /// Subscribes to the change feed of `table`.
    pub(crate) fn subscribe(&self, table: Table) -> watch::Receiver<u64> {
        self.feeds.sender(table).subscribe()
    }

    /// Returns the schema version stamped in the file.
    pub fn schema_version(&self) -> Result<i32, StoreError> {
        let conn = self.lock()?;
        Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
    }

    /// Counts the rows of `table`.
    pub fn row_count(&self, table: Table) -> Result<i64, StoreError> {
        let conn = self.lock()?;
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        Ok(conn.query_row(&sql, [], |row| row.get(0))?)
    }
}

/// Brings the schema in `conn` to `options.schema_version`.
///
/// A fresh file gets the schema. A file stamped with another version is either
/// wiped and recreated or rejected, depending on the migration policy.
fn init_schema(conn: &Connection, options: StoreOptions) -> Result<(), StoreError> {
    let found: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if found == options.schema_version {
        // Same version, but make sure nothing is missing
        conn.execute_batch(SCHEMA_SQL)?;
        return Ok(());
    }

    if found != 0 {
        match options.migration_policy {
            MigrationPolicy::Fail => {
                return Err(StoreError::SchemaMismatch {
                    found,
                    expected: options.schema_version,
                });
            }
            MigrationPolicy::Destructive => {
                warn!(
                    found,
                    expected = options.schema_version,
                    "Schema version mismatch, dropping all data and recreating the store"
                );
                drop_all_tables(conn)?;
            }
        }
    }

    conn.execute_batch(SCHEMA_SQL)?;
    conn.pragma_update(None, "user_version", options.schema_version)?;
    Ok(())
}

fn drop_all_tables(conn: &Connection) -> Result<(), StoreError> {
    let tables: Vec<String> = {
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        )?;
        let names = stmt.query_map([], |row| row.get(0))?;
        names.collect::<rusqlite::Result<Vec<_>>>()?
    };

    for table in tables {
        conn.execute_batch(&format!("DROP TABLE IF EXISTS \"{table}\""))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_one_user(db: &Database) {
        db.lock()
            .unwrap()
            .execute(
                "INSERT INTO users (name, nim, is_guest, updated_at) VALUES ('Ani', '19210001', 0, 1)",
                [],
            )
            .unwrap();
    }

    #[test]
    fn test_open_in_memory_creates_schema() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.schema_version().unwrap(), SCHEMA_VERSION);
        for table in Table::ALL {
            assert_eq!(db.row_count(table).unwrap(), 0);
        }
    }

    #[test]
    fn test_reopen_same_version_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        {
            let db = Database::open(dir.path(), StoreOptions::default()).unwrap();
            seed_one_user(&db);
        }

        let db = Database::open(dir.path(), StoreOptions::default()).unwrap();
        assert_eq!(db.row_count(Table::Users).unwrap(), 1);
    }

    #[test]
    fn test_version_mismatch_destroys_data() {
        let dir = tempfile::tempdir().unwrap();
        {
            let db = Database::open(dir.path(), StoreOptions::default()).unwrap();
            seed_one_user(&db);
        }

        let bumped = StoreOptions {
            schema_version: SCHEMA_VERSION + 1,
            migration_policy: MigrationPolicy::Destructive,
        };
        let db = Database::open(dir.path(), bumped).unwrap();
        assert_eq!(db.schema_version().unwrap(), SCHEMA_VERSION + 1);
        assert_eq!(db.row_count(Table::Users).unwrap(), 0);
    }

    #[test]
    fn test_version_mismatch_fails_when_policy_forbids_wipe() {
        let dir = tempfile::tempdir().unwrap();
        {
            let db = Database::open(dir.path(), StoreOptions::default()).unwrap();
            seed_one_user(&db);
        }

        let strict = StoreOptions {
            schema_version: SCHEMA_VERSION + 1,
            migration_policy: MigrationPolicy::Fail,
        };
        match Database::open(dir.path(), strict) {
            Err(StoreError::SchemaMismatch { found, expected }) => {
                assert_eq!(found, SCHEMA_VERSION);
                assert_eq!(expected, SCHEMA_VERSION + 1);
            }
            other => panic!("expected schema mismatch, got {:?}", other.map(|_| ())),
        }

        // The data is still there for a build that declares the old version
        let db = Database::open(dir.path(), StoreOptions::default()).unwrap();
        assert_eq!(db.row_count(Table::Users).unwrap(), 1);
    }

    #[test]
    fn test_schema_rejects_inverted_times() {
        let db = Database::open_in_memory().unwrap();
        let result = db.lock().unwrap().execute(
            "INSERT INTO schedules (subject_name, subject_code, day, start_time, end_time, room, dosen, sks)
             VALUES ('Basis Data', 'BD01', 'Senin', '10:00', '08:00', 'R1', 'Budi', 3)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_notify_bumps_revision() {
        let db = Database::open_in_memory().unwrap();
        let rx = db.subscribe(Table::Schedules);
        assert_eq!(*rx.borrow(), 0);

        db.notify(Table::Schedules);
        db.notify(Table::Schedules);
        assert_eq!(*rx.borrow(), 2);
        assert_eq!(*db.subscribe(Table::Users).borrow(), 0);
    }
}
