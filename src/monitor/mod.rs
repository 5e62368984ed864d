//! Presence/alert monitoring subsystem.
//!
//! The state machine itself ([`machine`]) is pure and synchronous: it is fed
//! one [`crate::SensorSample`] per tick and returns at most one event. The
//! polling loop around it ([`runner`]) owns the sensors, keeps the tick
//! cadence, and hands emitted events to the sink dispatcher without ever
//! blocking on the sink.

/// The presence-confirmation state machine.
pub mod machine;
/// The polling loop driving the machine.
pub mod runner;

pub use machine::{Phase, PresenceMonitor};
pub use runner::{MonitorRunner, ShutdownHandle};
