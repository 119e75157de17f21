//! Repository over the local store.
//!
//! Screens talk to [`AppRepository`] instead of the store: list-style reads come
//! back as [`LiveQuery`]s that follow the table, point reads and writes are plain
//! async calls. All SQLite work runs on tokio's blocking pool.

mod live;

pub use live::LiveQuery;

use crate::db::{Database, NewSchedule, NewUser, Notification, Schedule, StoreError, Table, User};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::Arc;
use tracing::{debug, info, warn};

const USER_COLUMNS: &str = "id, name, nim, is_guest, updated_at";
const SCHEDULE_COLUMNS: &str = "id, subject_name, subject_code, day, start_time, end_time, \
                                room, dosen, sks, is_attended, attended_at";
const NOTIFICATION_COLUMNS: &str = "id, message, timestamp, is_read";

/// Runs `f` against the locked connection on the blocking pool.
pub(crate) async fn run_blocking<T, F>(db: &Arc<Database>, f: F) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
{
    let db = Arc::clone(db);
    tokio::task::spawn_blocking(move || {
        let conn = db.lock()?;
        f(&conn).map_err(StoreError::from)
    })
    .await?
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        nim: row.get(2)?,
        is_guest: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn schedule_from_row(row: &Row<'_>) -> rusqlite::Result<Schedule> {
    Ok(Schedule {
        id: row.get(0)?,
        subject_name: row.get(1)?,
        subject_code: row.get(2)?,
        day: row.get(3)?,
        start_time: row.get(4)?,
        end_time: row.get(5)?,
        room: row.get(6)?,
        dosen: row.get(7)?,
        sks: row.get(8)?,
        is_attended: row.get(9)?,
        attended_at: row.get(10)?,
    })
}

fn notification_from_row(row: &Row<'_>) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: row.get(0)?,
        message: row.get(1)?,
        timestamp: row.get(2)?,
        is_read: row.get(3)?,
    })
}

/// Thin façade over the store shared by every screen.
#[derive(Clone)]
pub struct AppRepository {
    db: Arc<Database>,
}

impl AppRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// The shared store handle this repository writes through.
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Follows the current user: the most recently written row, or `None` when
    /// nobody has logged in yet.
    pub fn current_user(&self) -> LiveQuery<Option<User>> {
        LiveQuery::new(Arc::clone(&self.db), Table::Users, |conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users ORDER BY updated_at DESC, id DESC LIMIT 1"),
                [],
                user_from_row,
            )
            .optional()
        })
    }

    /// Inserts a user, or refreshes the one with the same NIM.
    ///
    /// The written row becomes the current user.
    pub async fn upsert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let now = chrono::Utc::now().timestamp_millis();
        let saved = run_blocking(&self.db, move |conn| {
            // Strictly after every existing row, so "most recent" is never a tie
            conn.execute(
                "INSERT INTO users (name, nim, is_guest, updated_at)
                 VALUES (?1, ?2, ?3, MAX(?4, COALESCE((SELECT MAX(updated_at) FROM users), 0) + 1))
                 ON CONFLICT(nim) DO UPDATE SET
                    name = excluded.name,
                    is_guest = excluded.is_guest,
                    updated_at = excluded.updated_at",
                params![user.name, user.nim, user.is_guest, now],
            )?;
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE nim = ?1"),
                [&user.nim],
                user_from_row,
            )
        })
        .await?;

        debug!(user_id = saved.id, is_guest = saved.is_guest, "Saved user");
        self.db.notify(Table::Users);
        Ok(saved)
    }

    /// Removes every user. Returns the number of rows deleted.
    pub async fn clear_users(&self) -> Result<usize, StoreError> {
        let deleted = run_blocking(&self.db, |conn| conn.execute("DELETE FROM users", [])).await?;
        self.db.notify(Table::Users);
        Ok(deleted)
    }

    /// Follows the full schedule set, in insertion order.
    pub fn all_schedules(&self) -> LiveQuery<Vec<Schedule>> {
        LiveQuery::new(Arc::clone(&self.db), Table::Schedules, |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {SCHEDULE_COLUMNS} FROM schedules ORDER BY id"))?;
            let rows = stmt.query_map([], schedule_from_row)?;
            rows.collect()
        })
    }

    /// Looks up one schedule.
    ///
    /// A failed lookup is logged and reported as `None`, the same as a missing
    /// row; callers can't tell the two apart.
    pub async fn schedule_by_id(&self, id: i64) -> Option<Schedule> {
        let result = run_blocking(&self.db, move |conn| {
            conn.query_row(
                &format!("SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE id = ?1"),
                [id],
                schedule_from_row,
            )
            .optional()
        })
        .await;

        match result {
            Ok(schedule) => schedule,
            Err(e) => {
                warn!(schedule_id = id, error = %e, "Schedule lookup failed, treating as not found");
                None
            }
        }
    }

    /// Overwrites the attendance fields of one schedule.
    ///
    /// Repeating the call just overwrites the timestamp again. An unknown id
    /// touches nothing and still succeeds.
    pub async fn update_attendance(
        &self,
        schedule_id: i64,
        attended: bool,
        timestamp_millis: i64,
    ) -> Result<(), StoreError> {
        let affected = run_blocking(&self.db, move |conn| {
            conn.execute(
                "UPDATE schedules SET is_attended = ?1, attended_at = ?2 WHERE id = ?3",
                params![attended, timestamp_millis, schedule_id],
            )
        })
        .await?;

        if affected == 0 {
            debug!(schedule_id, "Attendance update matched no schedule");
        } else {
            info!(schedule_id, attended, "Attendance recorded");
            self.db.notify(Table::Schedules);
        }
        Ok(())
    }

    /// Inserts schedules in one transaction. Returns their new ids in order.
    pub async fn insert_schedules(
        &self,
        schedules: Vec<NewSchedule>,
    ) -> Result<Vec<i64>, StoreError> {
        if schedules.is_empty() {
            return Ok(Vec::new());
        }

        let ids = run_blocking(&self.db, move |conn| {
            let tx = conn.unchecked_transaction()?;
            let mut ids = Vec::with_capacity(schedules.len());
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO schedules (subject_name, subject_code, day, start_time, end_time, room, dosen, sks)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )?;
                for s in &schedules {
                    stmt.execute(params![
                        s.subject_name,
                        s.subject_code,
                        s.day,
                        s.start_time,
                        s.end_time,
                        s.room,
                        s.dosen,
                        s.sks,
                    ])?;
                    ids.push(tx.last_insert_rowid());
                }
            }
            tx.commit()?;
            Ok(ids)
        })
        .await?;

        debug!("Inserted {} schedules", ids.len());
        self.db.notify(Table::Schedules);
        Ok(ids)
    }

    /// Removes every schedule. Returns the number of rows deleted.
    pub async fn clear_schedules(&self) -> Result<usize, StoreError> {
        let deleted =
            run_blocking(&self.db, |conn| conn.execute("DELETE FROM schedules", [])).await?;
        self.db.notify(Table::Schedules);
        Ok(deleted)
    }

    pub async fn insert_notification(
        &self,
        message: &str,
        timestamp_millis: i64,
    ) -> Result<Notification, StoreError> {
        let message = message.to_string();
        let saved = run_blocking(&self.db, move |conn| {
            conn.execute(
                "INSERT INTO notifications (message, timestamp, is_read) VALUES (?1, ?2, 0)",
                params![message, timestamp_millis],
            )?;
            Ok(Notification {
                id: conn.last_insert_rowid(),
                message,
                timestamp: timestamp_millis,
                is_read: false,
            })
        })
        .await?;

        self.db.notify(Table::Notifications);
        Ok(saved)
    }

    /// Follows all notifications, newest first.
    pub fn notifications(&self) -> LiveQuery<Vec<Notification>> {
        LiveQuery::new(Arc::clone(&self.db), Table::Notifications, |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM notifications ORDER BY timestamp DESC, id DESC"
            ))?;
            let rows = stmt.query_map([], notification_from_row)?;
            rows.collect()
        })
    }

    pub async fn unread_notification_count(&self) -> Result<i64, StoreError> {
        run_blocking(&self.db, |conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM notifications WHERE is_read = 0",
                [],
                |row| row.get(0),
            )
        })
        .await
    }

    /// Marks one notification read. Returns false if the id is unknown.
    pub async fn mark_notification_read(&self, id: i64) -> Result<bool, StoreError> {
        let affected = run_blocking(&self.db, move |conn| {
            conn.execute("UPDATE notifications SET is_read = 1 WHERE id = ?1", [id])
        })
        .await?;

        if affected > 0 {
            self.db.notify(Table::Notifications);
        }
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Day;
    use std::time::Duration;

    fn repository() -> AppRepository {
        AppRepository::new(Arc::new(Database::open_in_memory().unwrap()))
    }

    fn new_schedule(subject: &str, day: Day, start: &str, end: &str) -> NewSchedule {
        NewSchedule {
            subject_name: subject.to_string(),
            subject_code: format!("{}01", &subject[..2].to_uppercase()),
            day,
            start_time: start.to_string(),
            end_time: end.to_string(),
            room: "R-301".to_string(),
            dosen: "Dr. Sari".to_string(),
            sks: 3,
        }
    }

    fn new_user(name: &str, nim: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            nim: nim.to_string(),
            is_guest: false,
        }
    }

    #[tokio::test]
    async fn test_current_user_empty_is_none() {
        let repo = repository();
        let mut query = repo.current_user();
        assert_eq!(query.next().await.unwrap().unwrap(), None);
        assert_eq!(query.first_or_none().await, Some(None));
    }

    #[tokio::test]
    async fn test_current_user_is_most_recent_write() {
        let repo = repository();
        repo.upsert_user(new_user("Ani", "19210001")).await.unwrap();
        repo.upsert_user(new_user("Budi", "19210002")).await.unwrap();

        let current = repo.current_user().first_or_none().await.flatten().unwrap();
        assert_eq!(current.nim, "19210002");

        // Rewriting an older row makes it current again
        repo.upsert_user(new_user("Ani Lestari", "19210001")).await.unwrap();
        let current = repo.current_user().first_or_none().await.flatten().unwrap();
        assert_eq!(current.name, "Ani Lestari");
        assert_eq!(repo.database().row_count(Table::Users).unwrap(), 2);
    }

    #[tokio::test]
    async fn test_current_user_stream_follows_writes() {
        let repo = repository();
        let mut query = repo.current_user();
        assert_eq!(query.next().await.unwrap().unwrap(), None);

        repo.upsert_user(new_user("Ani", "19210001")).await.unwrap();
        let user = query.next().await.unwrap().unwrap().unwrap();
        assert_eq!(user.name, "Ani");

        repo.clear_users().await.unwrap();
        assert_eq!(query.next().await.unwrap().unwrap(), None);
    }

    #[tokio::test]
    async fn test_all_schedules_in_insertion_order() {
        let repo = repository();
        let ids = repo
            .insert_schedules(vec![
                new_schedule("Pemrograman Web", Day::Rabu, "13:00", "15:30"),
                new_schedule("Basis Data", Day::Senin, "08:00", "10:30"),
            ])
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);

        let all = repo.all_schedules().first_or_none().await.unwrap();
        let names: Vec<_> = all.iter().map(|s| s.subject_name.as_str()).collect();
        assert_eq!(names, ["Pemrograman Web", "Basis Data"]);
        assert!(all.iter().all(|s| !s.is_attended && s.attended_at.is_none()));
    }

    #[tokio::test]
    async fn test_update_attendance_overwrites() {
        let repo = repository();
        let ids = repo
            .insert_schedules(vec![new_schedule("Basis Data", Day::Senin, "08:00", "10:30")])
            .await
            .unwrap();
        let id = ids[0];

        repo.update_attendance(id, true, 1_700_000_000_000).await.unwrap();
        let schedule = repo.schedule_by_id(id).await.unwrap();
        assert!(schedule.is_attended);
        assert_eq!(schedule.attended_at, Some(1_700_000_000_000));

        repo.update_attendance(id, true, 1_700_000_600_000).await.unwrap();
        let schedule = repo.schedule_by_id(id).await.unwrap();
        assert!(schedule.is_attended);
        assert_eq!(schedule.attended_at, Some(1_700_000_600_000));
    }

    #[tokio::test]
    async fn test_update_attendance_unknown_id_is_noop() {
        let repo = repository();
        repo.insert_schedules(vec![new_schedule("Basis Data", Day::Senin, "08:00", "10:30")])
            .await
            .unwrap();
        let before = repo.all_schedules().first_or_none().await.unwrap();

        repo.update_attendance(9_999, true, 1).await.unwrap();

        let after = repo.all_schedules().first_or_none().await.unwrap();
        assert_eq!(before, after);
        assert_eq!(repo.database().row_count(Table::Schedules).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_attendance_unknown_id_does_not_wake_followers() {
        let repo = repository();
        let mut query = repo.all_schedules();
        query.next().await.unwrap().unwrap();

        repo.update_attendance(42, true, 1).await.unwrap();
        let pending = tokio::time::timeout(Duration::from_millis(50), query.next()).await;
        assert!(pending.is_err());
    }

    #[tokio::test]
    async fn test_schedule_by_id_missing_and_failing_look_the_same() {
        let repo = repository();
        assert_eq!(repo.schedule_by_id(1).await, None);

        // Break the table underneath the repository so the lookup errors out
        repo.database()
            .lock()
            .unwrap()
            .execute_batch("DROP TABLE schedules")
            .unwrap();
        assert_eq!(repo.schedule_by_id(1).await, None);
    }

    #[tokio::test]
    async fn test_concurrent_attendance_writes() {
        let repo = repository();
        let ids = repo
            .insert_schedules(vec![
                new_schedule("Basis Data", Day::Senin, "08:00", "10:30"),
                new_schedule("Jaringan Komputer", Day::Selasa, "10:00", "12:00"),
            ])
            .await
            .unwrap();

        let handles: Vec<_> = ids
            .iter()
            .map(|&id| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.update_attendance(id, true, id * 10).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        for id in ids {
            let schedule = repo.schedule_by_id(id).await.unwrap();
            assert_eq!(schedule.attended_at, Some(id * 10));
        }
    }

    #[tokio::test]
    async fn test_notifications_newest_first_and_read_flag() {
        let repo = repository();
        let older = repo.insert_notification("Jadwal diperbarui", 1_000).await.unwrap();
        repo.insert_notification("Selamat datang", 2_000).await.unwrap();
        assert_eq!(repo.unread_notification_count().await.unwrap(), 2);

        let all = repo.notifications().first_or_none().await.unwrap();
        assert_eq!(all[0].message, "Selamat datang");

        assert!(repo.mark_notification_read(older.id).await.unwrap());
        assert!(!repo.mark_notification_read(9_999).await.unwrap());
        assert_eq!(repo.unread_notification_count().await.unwrap(), 1);
    }
}
