//! SQLite-backed event store.
//!
//! A single `events` table with RFC 3339 text timestamps. One connection
//! behind a mutex is plenty for a doorbell's write rate.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::event::{Event, EventKind};
use crate::store::{EventStore, StorageError, StoredEvent};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS events (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    kind      TEXT NOT NULL,
    timestamp TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_events_kind_ts ON events (kind, timestamp);";

fn backend_err(e: rusqlite::Error) -> StorageError {
    StorageError::BackendError(format!("{e}"))
}

/// A durable [`EventStore`] on a SQLite file.
pub struct SqliteEventStore {
    conn: Mutex<Connection>,
}

impl SqliteEventStore {
    /// Opens (or creates) the database at `path` and ensures the schema.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the file cannot be opened or the
    /// schema cannot be applied.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(backend_err)?;
        conn.execute_batch(SCHEMA).map_err(backend_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens an in-memory database (tests).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the schema cannot be applied.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(backend_err)?;
        conn.execute_batch(SCHEMA).map_err(backend_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::BackendError("poisoned connection lock".to_string()))
    }
}

fn decode_row(
    id: i64,
    kind: &str,
    timestamp: &str,
) -> Result<StoredEvent, StorageError> {
    let kind: EventKind = kind
        .parse()
        .map_err(|e| StorageError::DecodeError(format!("{e}")))?;
    let timestamp = DateTime::parse_from_rfc3339(timestamp)
        .map_err(|e| StorageError::DecodeError(format!("bad timestamp: {e}")))?
        .with_timezone(&Utc);
    Ok(StoredEvent {
        id,
        kind,
        timestamp,
    })
}

impl EventStore for SqliteEventStore {
    fn insert(&self, event: Event) -> Result<StoredEvent, StorageError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO events (kind, timestamp) VALUES (?1, ?2)",
            (event.kind.as_str(), event.timestamp.to_rfc3339()),
        )
        .map_err(backend_err)?;
        Ok(StoredEvent {
            id: conn.last_insert_rowid(),
            kind: event.kind,
            timestamp: event.timestamp,
        })
    }

    fn recent(&self, kind: EventKind, limit: usize) -> Result<Vec<StoredEvent>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, kind, timestamp FROM events
                 WHERE kind = ?1 ORDER BY timestamp DESC, id DESC LIMIT ?2",
            )
            .map_err(backend_err)?;

        let rows = stmt
            .query_map((kind.as_str(), limit as i64), |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(backend_err)?;

        let mut out = Vec::new();
        for row in rows {
            let (id, kind, timestamp) = row.map_err(backend_err)?;
            out.push(decode_row(id, &kind, &timestamp)?);
        }
        Ok(out)
    }

    fn count(&self, kind: EventKind) -> Result<usize, StorageError> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM events WHERE kind = ?1",
                [kind.as_str()],
                |row| row.get(0),
            )
            .map_err(backend_err)?;
        #[allow(clippy::cast_sign_loss)]
        let count = count as usize;
        Ok(count)
    }

    fn clear(&self) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM events", []).map_err(backend_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn insert_and_recent_round_trip() {
        let store = SqliteEventStore::open_in_memory().unwrap();
        let base = Utc::now();

        for i in 0..12 {
            store
                .insert(Event::new(EventKind::Bell, base + Duration::seconds(i)))
                .unwrap();
        }
        store.insert(Event::new(EventKind::Intrusion, base)).unwrap();

        let bells = store.recent(EventKind::Bell, 10).unwrap();
        assert_eq!(bells.len(), 10);
        assert!(bells.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
        assert_eq!(store.count(EventKind::Bell).unwrap(), 12);
        assert_eq!(store.count(EventKind::Intrusion).unwrap(), 1);
    }

    #[test]
    fn clear_empties_the_table() {
        let store = SqliteEventStore::open_in_memory().unwrap();
        store.insert(Event::now(EventKind::Bell)).unwrap();
        store.clear().unwrap();
        assert_eq!(store.count(EventKind::Bell).unwrap(), 0);
    }

    #[test]
    fn open_creates_and_reopens_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sonnette.db");

        {
            let store = SqliteEventStore::open(&path).unwrap();
            store.insert(Event::now(EventKind::Intrusion)).unwrap();
        }

        let store = SqliteEventStore::open(&path).unwrap();
        assert_eq!(store.count(EventKind::Intrusion).unwrap(), 1);
    }

    #[test]
    fn timestamps_survive_the_text_encoding() {
        let store = SqliteEventStore::open_in_memory().unwrap();
        let event = Event::now(EventKind::Bell);
        store.insert(event).unwrap();

        let rows = store.recent(EventKind::Bell, 1).unwrap();
        // RFC 3339 keeps sub-second precision, so the value round-trips.
        assert_eq!(rows[0].timestamp, event.timestamp);
    }
}
