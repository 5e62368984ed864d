//! # Sonnette - doorbell presence monitoring
//!
//! Sonnette converts two noisy boolean sensor signals (a PIR motion detector
//! and a bell button) into two high-level events, `bell` and `intrus`, with
//! debouncing, presence confirmation, and cooldown policy.
//!
//! ## Core Concepts
//!
//! - **PresenceMonitor**: the polling state machine. Fed one [`SensorSample`]
//!   per tick, it confirms presence behind a consecutive-read streak, runs an
//!   intrusion countdown, and lets a bell press cancel the pending alert.
//! - **Event**: an immutable `{ kind, timestamp }` value emitted by the
//!   monitor and consumed by an [`EventSink`] (best-effort, at-most-once).
//! - **SinkDispatcher**: a bounded queue + worker thread that decouples sink
//!   submission from the sensor tick, so a slow network never stalls sampling.
//! - **EventStore**: the server-side record of received events.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sonnette::{MonitorConfig, MonitorRunner, NullChime};
//! use sonnette::sink::{LogSink, SinkDispatcher};
//! use std::sync::Arc;
//!
//! let cfg = MonitorConfig::default();
//! let dispatcher = SinkDispatcher::new(64, Arc::new(LogSink));
//! let (runner, shutdown) = MonitorRunner::new(
//!     cfg,
//!     Box::new(my_pir_sensor),
//!     Box::new(my_button_sensor),
//!     dispatcher,
//!     Box::new(NullChime),
//! )?;
//! let handle = std::thread::spawn(move || runner.run());
//! // ... later
//! shutdown.request();
//! handle.join().unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod api;
pub mod chime;
pub mod config;
pub mod error;
pub mod event;
pub mod monitor;
pub mod sensor;
pub mod sink;
pub mod store;

// Event API server (feature-gated)
#[cfg(feature = "server")]
pub mod server;

// Re-export primary types at crate root for convenience
pub use chime::{Chime, LogChime, NullChime};
pub use config::{AlertPolicy, MonitorConfig, SinkConfig};
pub use error::{SinkError, SonnetteError, SonnetteResult, ValidationError};
pub use event::{Event, EventKind};
pub use monitor::{MonitorRunner, Phase, PresenceMonitor, ShutdownHandle};
pub use sensor::{ScriptedSensor, Sensor, SensorError, SensorSample};
pub use sink::{EventSink, SinkDispatcher};
pub use store::{EventStore, InMemoryEventStore, StorageError, StoredEvent};
