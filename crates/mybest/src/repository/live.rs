//! Live queries: query results that re-emit whenever their table changes.

use super::run_blocking;
use crate::db::{Database, StoreError, Table};
use futures::Stream;
use rusqlite::Connection;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

type Fetch<T> = Arc<dyn Fn(&Connection) -> rusqlite::Result<T> + Send + Sync>;

/// A query bound to one table's change feed.
///
/// The first call to [`LiveQuery::next`] yields the current result right away;
/// every later call waits for a write to the table and then re-runs the query.
/// Dropping the query drops any pending delivery.
pub struct LiveQuery<T> {
    db: Arc<Database>,
    table: Table,
    changes: watch::Receiver<u64>,
    fetch: Fetch<T>,
    primed: bool,
}

impl<T> LiveQuery<T>
where
    T: Send + 'static,
{
    pub(crate) fn new<F>(db: Arc<Database>, table: Table, fetch: F) -> Self
    where
        F: Fn(&Connection) -> rusqlite::Result<T> + Send + Sync + 'static,
    {
        let changes = db.subscribe(table);
        Self {
            db,
            table,
            changes,
            fetch: Arc::new(fetch),
            primed: false,
        }
    }

    /// Runs the query once, right now.
    pub async fn snapshot(&self) -> Result<T, StoreError> {
        let fetch = Arc::clone(&self.fetch);
        run_blocking(&self.db, move |conn| fetch(conn)).await
    }

    /// The value available at this moment, or `None` if it can't be read.
    ///
    /// Never waits for a change.
    pub async fn first_or_none(&self) -> Option<T> {
        match self.snapshot().await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(table = self.table.name(), error = %e, "Live query snapshot failed");
                None
            }
        }
    }

    /// Waits for the next emission.
    ///
    /// Returns `None` once the store's change feed is gone.
    pub async fn next(&mut self) -> Option<Result<T, StoreError>> {
        if self.primed {
            self.changes.changed().await.ok()?;
        } else {
            self.primed = true;
        }

        // Mark the revision seen before querying so a write racing with the
        // query still triggers another emission.
        let _seen = *self.changes.borrow_and_update();
        Some(self.snapshot().await)
    }

    /// Turns the query into a `futures::Stream`.
    pub fn into_stream(self) -> impl Stream<Item = Result<T, StoreError>> {
        futures::stream::unfold(self, |mut query| async move {
            let item = query.next().await?;
            Some((item, query))
        })
    }
}
