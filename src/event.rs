//! Event types emitted by the presence monitor.
//!
//! Events are immutable once emitted and serialize with the wire names the
//! event API expects (`"bell"` / `"intrus"`).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The kind of a monitor event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// The bell button was pressed.
    Bell,
    /// Confirmed presence with no bell press before the alert timeout.
    #[serde(rename = "intrus")]
    Intrusion,
}

impl EventKind {
    /// The wire name of this kind (`"bell"` or `"intrus"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bell => "bell",
            Self::Intrusion => "intrus",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bell" => Ok(Self::Bell),
            "intrus" => Ok(Self::Intrusion),
            other => Err(ValidationError::InvalidEventType {
                value: other.to_string(),
            }),
        }
    }
}

/// An event emitted by the monitor, consumed by an external sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// What happened.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// When it happened (UTC).
    pub timestamp: DateTime<Utc>,
}

impl Event {
    /// Creates an event with the given kind and timestamp.
    #[must_use]
    pub const fn new(kind: EventKind, timestamp: DateTime<Utc>) -> Self {
        Self { kind, timestamp }
    }

    /// Creates an event timestamped now.
    #[must_use]
    pub fn now(kind: EventKind) -> Self {
        Self::new(kind, Utc::now())
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.kind, self.timestamp.to_rfc3339())
    }
}
