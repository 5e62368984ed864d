//! Event sinks: where emitted events go.
//!
//! The monitor depends on a sink only through the narrow
//! `submit(event) -> ok | error` contract. Delivery is at-most-once: a
//! failed submission is logged and dropped, never queued for retry. Sinks
//! run behind the [`SinkDispatcher`] worker so submission latency never
//! reaches the sensor loop.

use std::sync::Arc;

use crate::error::SinkError;
use crate::event::Event;
use crate::store::EventStore;

/// Bounded-queue dispatch worker.
pub mod dispatcher;
/// HTTP POST sink.
#[cfg(feature = "sink-http")]
pub mod http;

pub use dispatcher::SinkDispatcher;
#[cfg(feature = "sink-http")]
pub use http::HttpSink;

/// Accepts events for persistence or forwarding.
///
/// Implementations must be cheap to share across threads; the dispatcher
/// worker calls `submit` from its own thread.
pub trait EventSink: Send + Sync {
    /// Persists or forwards one event.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] on failure; the caller logs and drops the
    /// event (at-most-once delivery).
    fn submit(&self, event: &Event) -> Result<(), SinkError>;
}

/// A sink that records events straight into an [`EventStore`].
///
/// The in-process variant: monitor and event record live in one binary,
/// no network hop.
pub struct StoreSink {
    store: Arc<dyn EventStore>,
}

impl StoreSink {
    /// Wraps an event store as a sink.
    #[must_use]
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }
}

impl EventSink for StoreSink {
    fn submit(&self, event: &Event) -> Result<(), SinkError> {
        self.store.insert(*event)?;
        Ok(())
    }
}

/// A sink that only logs events. Useful for bring-up and dry runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn submit(&self, event: &Event) -> Result<(), SinkError> {
        tracing::info!(kind = event.kind.as_str(), timestamp = %event.timestamp, "event");
        Ok(())
    }
}
