//! In-memory event store.
//!
//! Thread-safe reference implementation; used by tests, the in-process
//! sink, and server setups that do not need durability.

use std::sync::RwLock;

use crate::event::{Event, EventKind};
use crate::store::{EventStore, StorageError, StoredEvent};

fn lock_err(context: &'static str) -> StorageError {
    StorageError::BackendError(format!("poisoned lock: {context}"))
}

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    rows: Vec<StoredEvent>,
}

/// A thread-safe in-memory [`EventStore`].
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    state: RwLock<State>,
}

impl InMemoryEventStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventStore for InMemoryEventStore {
    fn insert(&self, event: Event) -> Result<StoredEvent, StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("insert"))?;
        state.next_id += 1;
        let row = StoredEvent {
            id: state.next_id,
            kind: event.kind,
            timestamp: event.timestamp,
        };
        state.rows.push(row);
        Ok(row)
    }

    fn recent(&self, kind: EventKind, limit: usize) -> Result<Vec<StoredEvent>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("recent"))?;
        let mut rows: Vec<StoredEvent> = state
            .rows
            .iter()
            .filter(|r| r.kind == kind)
            .copied()
            .collect();
        // Newest first; ties broken by insertion order.
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        rows.truncate(limit);
        Ok(rows)
    }

    fn count(&self, kind: EventKind) -> Result<usize, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("count"))?;
        Ok(state.rows.iter().filter(|r| r.kind == kind).count())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("clear"))?;
        state.rows.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn insert_assigns_increasing_ids() {
        let store = InMemoryEventStore::new();
        let a = store.insert(Event::now(EventKind::Bell)).unwrap();
        let b = store.insert(Event::now(EventKind::Bell)).unwrap();
        assert!(b.id > a.id);
    }

    #[test]
    fn recent_is_newest_first_and_limited() {
        let store = InMemoryEventStore::new();
        let base = Utc::now();
        for i in 0..15 {
            store
                .insert(Event::new(
                    EventKind::Intrusion,
                    base + Duration::seconds(i),
                ))
                .unwrap();
        }

        let rows = store.recent(EventKind::Intrusion, 10).unwrap();
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].timestamp, base + Duration::seconds(14));
        assert!(rows.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[test]
    fn recent_filters_by_kind() {
        let store = InMemoryEventStore::new();
        store.insert(Event::now(EventKind::Bell)).unwrap();
        store.insert(Event::now(EventKind::Intrusion)).unwrap();

        let bells = store.recent(EventKind::Bell, 10).unwrap();
        assert_eq!(bells.len(), 1);
        assert_eq!(bells[0].kind, EventKind::Bell);
    }

    #[test]
    fn duplicate_events_are_stored_twice() {
        // At-most-once upstream means re-delivery is possible; the store
        // does not deduplicate.
        let store = InMemoryEventStore::new();
        let event = Event::now(EventKind::Bell);
        store.insert(event).unwrap();
        store.insert(event).unwrap();
        assert_eq!(store.count(EventKind::Bell).unwrap(), 2);
    }

    #[test]
    fn clear_removes_everything() {
        let store = InMemoryEventStore::new();
        store.insert(Event::now(EventKind::Bell)).unwrap();
        store.insert(Event::now(EventKind::Intrusion)).unwrap();
        store.clear().unwrap();
        assert_eq!(store.count(EventKind::Bell).unwrap(), 0);
        assert_eq!(store.count(EventKind::Intrusion).unwrap(), 0);
    }
}
