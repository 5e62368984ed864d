//! Abstract event storage.
//!
//! The trait keeps the server and the in-process sink independent of the
//! backend: an in-memory store for tests and embedded use, SQLite for the
//! deployed server.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::event::{Event, EventKind};

/// In-memory backend.
pub mod memory;
/// SQLite backend.
#[cfg(feature = "persistent")]
pub mod sqlite;

pub use memory::InMemoryEventStore;
#[cfg(feature = "persistent")]
pub use sqlite::SqliteEventStore;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend error.
    #[error("Storage backend error: {0}")]
    BackendError(String),

    /// A stored row could not be decoded.
    #[error("Storage decode error: {0}")]
    DecodeError(String),
}

/// A persisted event row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredEvent {
    /// Monotonic row id assigned by the store.
    pub id: i64,
    /// Event kind.
    pub kind: EventKind,
    /// Event timestamp (UTC).
    pub timestamp: DateTime<Utc>,
}

impl StoredEvent {
    /// The event value this row records.
    #[must_use]
    pub const fn event(&self) -> Event {
        Event::new(self.kind, self.timestamp)
    }
}

/// Storage contract for received events.
///
/// Delivery upstream is at-most-once: a re-delivered event is stored again
/// as a new row, deduplication is deliberately not attempted.
pub trait EventStore: Send + Sync {
    /// Records an event, returning the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend fails.
    fn insert(&self, event: Event) -> Result<StoredEvent, StorageError>;

    /// The most recent events of a kind, newest first, at most `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend fails.
    fn recent(&self, kind: EventKind, limit: usize) -> Result<Vec<StoredEvent>, StorageError>;

    /// Number of stored events of a kind.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend fails.
    fn count(&self, kind: EventKind) -> Result<usize, StorageError>;

    /// Deletes all stored events.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend fails.
    fn clear(&self) -> Result<(), StorageError>;
}
