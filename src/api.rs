//! Wire types and validation for the event API.
//!
//! Kept free of any HTTP framework so the submission contract - secret
//! check first, then timestamp and type validation, no state mutation on
//! rejection - can be tested as plain functions. The response strings match
//! what the deployed clients already expect.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::{Event, EventKind};
use crate::store::{EventStore, StorageError};

/// The JSON body of `POST /api/event`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPayload {
    /// Event kind wire name (`"bell"` / `"intrus"`).
    #[serde(rename = "type")]
    pub kind: String,
    /// ISO-8601 timestamp. Naive timestamps are assumed UTC.
    pub timestamp: String,
    /// Shared secret, compared by equality.
    pub secret: String,
}

impl EventPayload {
    /// Builds the submission payload for an event.
    #[must_use]
    pub fn from_event(event: &Event, secret: &str) -> Self {
        Self {
            kind: event.kind.as_str().to_string(),
            timestamp: event.timestamp.to_rfc3339(),
            secret: secret.to_string(),
        }
    }
}

/// Rejection of an inbound event payload. No state is mutated on rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Secret mismatch.
    #[error("unauthorized")]
    Unauthorized,
    /// Timestamp was not parseable ISO-8601.
    #[error("invalid timestamp")]
    InvalidTimestamp,
    /// Type was neither `bell` nor `intrus`.
    #[error("invalid type")]
    InvalidType,
}

impl ApiError {
    /// The HTTP status this rejection maps to.
    #[must_use]
    pub const fn status(self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::InvalidTimestamp | Self::InvalidType => 400,
        }
    }
}

/// Checks the shared secret.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] on mismatch.
pub fn authorize(payload: &EventPayload, secret: &str) -> Result<(), ApiError> {
    if payload.secret == secret {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

/// Parses a payload into an [`Event`] after validation.
///
/// Timestamp handling mirrors the clients in the field: RFC 3339 when an
/// offset is present, otherwise a naive ISO-8601 value taken as UTC (the
/// stock client sends `utcnow().isoformat()`, which has no offset).
///
/// # Errors
///
/// Returns [`ApiError::InvalidTimestamp`] or [`ApiError::InvalidType`].
pub fn parse_event(payload: &EventPayload) -> Result<Event, ApiError> {
    let timestamp = parse_timestamp(&payload.timestamp)?;
    let kind: EventKind = payload.kind.parse().map_err(|_| ApiError::InvalidType)?;
    Ok(Event::new(kind, timestamp))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| ApiError::InvalidTimestamp)
}

/// The acknowledgement body for a recorded event.
#[must_use]
pub fn recorded_message(kind: EventKind) -> String {
    format!("{} event recorded", kind.as_str())
}

/// A point-in-time view of the event log, as streamed to dashboards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventLog {
    /// Whether any bell events exist.
    pub bell: bool,
    /// Whether any intrusion events exist.
    pub intrus: bool,
    /// Most recent bell timestamps, newest first.
    pub bell_events: Vec<String>,
    /// Most recent intrusion timestamps, newest first.
    pub intrus_events: Vec<String>,
}

/// How many events of each kind a snapshot carries.
pub const SNAPSHOT_LIMIT: usize = 10;

/// Builds an [`EventLog`] snapshot from a store.
///
/// # Errors
///
/// Returns [`StorageError`] when the store fails.
pub fn snapshot(store: &dyn EventStore) -> Result<EventLog, StorageError> {
    let format = |rows: Vec<crate::store::StoredEvent>| -> Vec<String> {
        rows.iter()
            .map(|r| r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string())
            .collect()
    };

    let bells = format(store.recent(EventKind::Bell, SNAPSHOT_LIMIT)?);
    let intrusions = format(store.recent(EventKind::Intrusion, SNAPSHOT_LIMIT)?);

    Ok(EventLog {
        bell: !bells.is_empty(),
        intrus: !intrusions.is_empty(),
        bell_events: bells,
        intrus_events: intrusions,
    })
}
