//! The polling loop around the state machine.
//!
//! One dedicated loop samples both sensors at a fixed tick, advances the
//! machine, and hands emitted events to the sink dispatcher. The dispatch is
//! a non-blocking enqueue, so a slow sink can never stretch the tick and
//! cause missed streak increments. Shutdown completes the current tick and
//! returns; dropping the runner releases the sensor handles.

use std::time::Duration;

use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, select, tick, Receiver, Sender};

use crate::chime::Chime;
use crate::config::MonitorConfig;
use crate::error::ValidationError;
use crate::monitor::machine::PresenceMonitor;
use crate::sensor::{Sensor, SensorSample};
use crate::sink::SinkDispatcher;

/// Requests a clean stop of a running [`MonitorRunner`].
///
/// Cloneable; the first request wins and later ones are no-ops.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Sender<()>,
}

impl ShutdownHandle {
    /// Asks the loop to stop after the current tick. Non-blocking.
    pub fn request(&self) {
        let _ = self.tx.try_send(());
    }
}

/// The polling loop: sensors in, events out.
pub struct MonitorRunner {
    tick_interval: Duration,
    machine: PresenceMonitor,
    motion: Box<dyn Sensor>,
    button: Box<dyn Sensor>,
    dispatcher: SinkDispatcher,
    chime: Box<dyn Chime>,
    shutdown_rx: Receiver<()>,
}

impl MonitorRunner {
    /// Builds a runner and its shutdown handle.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` when the configuration is invalid.
    pub fn new(
        cfg: MonitorConfig,
        motion: Box<dyn Sensor>,
        button: Box<dyn Sensor>,
        dispatcher: SinkDispatcher,
        chime: Box<dyn Chime>,
    ) -> Result<(Self, ShutdownHandle), ValidationError> {
        let machine = PresenceMonitor::new(&cfg)?;
        let (tx, rx) = bounded(1);

        let runner = Self {
            tick_interval: cfg.tick_interval,
            machine,
            motion,
            button,
            dispatcher,
            chime,
            shutdown_rx: rx,
        };
        Ok((runner, ShutdownHandle { tx }))
    }

    /// Runs the loop until shutdown is requested.
    ///
    /// Blocks the calling thread; spawn it where that matters. The current
    /// tick always completes before the loop exits.
    pub fn run(mut self) {
        let ticker = tick(self.tick_interval);
        let shutdown_rx = self.shutdown_rx.clone();
        tracing::info!(
            tick_ms = self.tick_interval.as_millis() as u64,
            "monitor loop started"
        );

        loop {
            select! {
                recv(ticker) -> _ => {
                    self.tick_once(Utc::now());
                }
                recv(shutdown_rx) -> _ => {
                    break;
                }
            }
        }

        tracing::info!(
            dropped = self.dispatcher.dropped_events(),
            "monitor loop stopped"
        );
    }

    /// Performs a single tick at the given instant.
    ///
    /// Exposed for deterministic stepping in tests and simulations; `run`
    /// calls this once per tick interval.
    pub fn tick_once(&mut self, now: DateTime<Utc>) {
        let motion = read_or_low(self.motion.as_mut(), "motion");
        let button = read_or_low(self.button.as_mut(), "button");

        if let Some(event) = self.machine.tick(SensorSample::new(motion, button, now)) {
            self.chime.play(event.kind);
            self.dispatcher.dispatch(event);
        }
    }

    /// The state machine, for phase inspection.
    #[must_use]
    pub const fn machine(&self) -> &PresenceMonitor {
        &self.machine
    }
}

/// A failed read is logged and counts as a low level for this tick.
fn read_or_low(sensor: &mut dyn Sensor, signal: &'static str) -> bool {
    match sensor.read() {
        Ok(level) => level,
        Err(e) => {
            tracing::warn!(signal, error = %e, "sensor read failed; treating as low");
            false
        }
    }
}
