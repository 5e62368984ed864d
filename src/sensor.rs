//! Sensor abstractions for the polling loop.
//!
//! The crate does not talk to GPIO pins itself; implementors plug their pin
//! driver in behind the [`Sensor`] trait (one instance per signal). A read
//! failure is never fatal: the runner logs it and treats the read as `false`
//! for that tick.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// A sensor read failure.
#[derive(Debug, Error)]
#[error("Sensor read failed: {message}")]
pub struct SensorError {
    /// Driver-level failure description.
    pub message: String,
}

impl SensorError {
    /// Creates a sensor error from a description.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A single boolean input signal (motion detector, bell button, ...).
pub trait Sensor: Send {
    /// Reads the current level of the signal.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError`] when the underlying driver fails; the caller
    /// treats that as a `false` read and continues.
    fn read(&mut self) -> Result<bool, SensorError>;
}

/// One tick's worth of sensor state, read once per tick and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorSample {
    /// Motion detector level.
    pub motion: bool,
    /// Bell button level.
    pub button: bool,
    /// When the sample was taken (UTC).
    pub now: DateTime<Utc>,
}

impl SensorSample {
    /// Creates a sample taken at the given instant.
    #[must_use]
    pub const fn new(motion: bool, button: bool, now: DateTime<Utc>) -> Self {
        Self { motion, button, now }
    }
}

/// A deterministic sensor that replays a scripted sequence of reads.
///
/// Once the script is exhausted every read returns `false`. Intended for
/// tests and dry-run simulation.
#[derive(Debug, Default)]
pub struct ScriptedSensor {
    reads: VecDeque<bool>,
}

impl ScriptedSensor {
    /// Creates a scripted sensor from a sequence of reads.
    pub fn new(reads: impl IntoIterator<Item = bool>) -> Self {
        Self {
            reads: reads.into_iter().collect(),
        }
    }

    /// Number of scripted reads remaining.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.reads.len()
    }
}

impl Sensor for ScriptedSensor {
    fn read(&mut self) -> Result<bool, SensorError> {
        Ok(self.reads.pop_front().unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_sensor_replays_then_goes_low() {
        let mut sensor = ScriptedSensor::new([true, true, false]);
        assert!(sensor.read().unwrap());
        assert!(sensor.read().unwrap());
        assert!(!sensor.read().unwrap());
        // Exhausted scripts read low forever.
        assert!(!sensor.read().unwrap());
        assert_eq!(sensor.remaining(), 0);
    }
}
