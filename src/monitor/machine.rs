//! The presence-confirmation state machine.
//!
//! One coherent reconciliation of the behavior the doorbell scripts grew
//! organically: motion must hold for `confirm_threshold` consecutive reads
//! before presence counts, a confirmed visitor has `alert_timeout` to ring
//! before an intrusion fires, and a completed cycle needs `rearm_threshold`
//! consecutive quiet reads before the machine watches again. A bell press
//! always wins over the intrusion path.

use chrono::{DateTime, Duration, Utc};

use crate::config::{AlertPolicy, MonitorConfig};
use crate::error::ValidationError;
use crate::event::{Event, EventKind};
use crate::sensor::SensorSample;

/// The phase of the presence automaton. At most one phase is ever active;
/// the machine is a single sequential automaton, not per-signal trackers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No confirmed presence; accumulating the motion streak.
    Idle,
    /// Presence confirmed; counting down to an intrusion alert unless the
    /// bell rings first.
    Watching {
        /// When the current countdown started.
        since: DateTime<Utc>,
        /// Whether an intrusion has already fired this episode (repeat
        /// policy only; under [`AlertPolicy::Once`] the machine leaves
        /// `Watching` on the first alert).
        fired: bool,
    },
    /// An event fired for this episode; waiting for the re-arm streak.
    CycleComplete,
}

/// Internal alert policy with pre-converted chrono durations.
#[derive(Debug, Clone, Copy)]
enum Policy {
    Once,
    Repeat(Duration),
}

/// The presence/alert state machine.
///
/// Owned by a single polling loop; mutated only on tick boundaries. Emits at
/// most one [`Event`] per tick.
#[derive(Debug)]
pub struct PresenceMonitor {
    confirm_threshold: u32,
    rearm_threshold: u32,
    alert_timeout: Duration,
    bell_cooldown: Duration,
    policy: Policy,

    phase: Phase,
    streak_high: u32,
    streak_low: u32,
    last_bell: Option<DateTime<Utc>>,
}

impl PresenceMonitor {
    /// Creates a machine from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidConfig` if `cfg.validate()` fails or
    /// a duration does not fit chrono's range.
    pub fn new(cfg: &MonitorConfig) -> Result<Self, ValidationError> {
        cfg.validate()?;

        let policy = match cfg.alert_policy {
            AlertPolicy::Once => Policy::Once,
            AlertPolicy::Repeat { every } => {
                Policy::Repeat(to_chrono("alert_policy.every", every)?)
            }
        };

        Ok(Self {
            confirm_threshold: cfg.confirm_threshold,
            rearm_threshold: cfg.rearm_threshold,
            alert_timeout: to_chrono("alert_timeout", cfg.alert_timeout)?,
            bell_cooldown: to_chrono("bell_cooldown", cfg.bell_cooldown)?,
            policy,
            phase: Phase::Idle,
            streak_high: 0,
            streak_low: 0,
            last_bell: None,
        })
    }

    /// The current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Current consecutive-motion streak (meaningful in [`Phase::Idle`]).
    #[must_use]
    pub const fn streak_high(&self) -> u32 {
        self.streak_high
    }

    /// Current consecutive-quiet streak.
    #[must_use]
    pub const fn streak_low(&self) -> u32 {
        self.streak_low
    }

    /// When the bell last fired, if ever.
    #[must_use]
    pub const fn last_bell(&self) -> Option<DateTime<Utc>> {
        self.last_bell
    }

    /// Advances the machine by one tick.
    ///
    /// Returns the event this tick emitted, if any. The bell override is
    /// evaluated before phase logic, so a press on the very tick the
    /// countdown would expire yields one `Bell` and zero `Intrusion`.
    pub fn tick(&mut self, sample: SensorSample) -> Option<Event> {
        let SensorSample { motion, button, now } = sample;

        // Bell override, independent of phase: ringing always wins over the
        // intrusion path and forces a full re-arm. A press still inside the
        // cooldown window neither emits nor cancels.
        if button && self.bell_ready(now) {
            self.last_bell = Some(now);
            self.phase = Phase::CycleComplete;
            self.streak_high = 0;
            self.streak_low = 0;
            tracing::info!("bell pressed; pending alert cancelled, awaiting re-arm");
            return Some(Event::new(EventKind::Bell, now));
        }

        match self.phase {
            Phase::Idle => {
                if motion {
                    self.streak_high += 1;
                    if self.streak_high >= self.confirm_threshold {
                        tracing::info!(
                            streak = self.streak_high,
                            "presence confirmed; intrusion countdown started"
                        );
                        self.phase = Phase::Watching { since: now, fired: false };
                        self.streak_low = 0;
                    }
                } else {
                    self.streak_high = 0;
                }
                None
            }
            Phase::Watching { since, fired } => {
                let timeout = match (self.policy, fired) {
                    (Policy::Repeat(every), true) => every,
                    _ => self.alert_timeout,
                };

                // Repeated alerts (after the first) only fire while presence
                // persists; the first alert fires unconditionally since a
                // still visitor reads low on a PIR.
                let due = now - since > timeout;
                if due && (!fired || motion) {
                    match self.policy {
                        Policy::Once => {
                            self.phase = Phase::CycleComplete;
                        }
                        Policy::Repeat(_) => {
                            self.phase = Phase::Watching { since: now, fired: true };
                        }
                    }
                    self.streak_low = 0;
                    tracing::info!("no bell before timeout; intrusion alert");
                    return Some(Event::new(EventKind::Intrusion, now));
                }

                if motion {
                    self.streak_low = 0;
                } else {
                    self.streak_low += 1;
                    // Repeat policy: once the first alert fired, a sustained
                    // quiet streak ends the episode without another alert.
                    if fired && self.streak_low >= self.rearm_threshold {
                        tracing::debug!("presence gone after repeat alert; episode over");
                        self.reset_to_idle();
                    }
                }
                None
            }
            Phase::CycleComplete => {
                if motion {
                    self.streak_low = 0;
                } else {
                    self.streak_low += 1;
                    if self.streak_low >= self.rearm_threshold {
                        tracing::debug!(streak = self.rearm_threshold, "re-armed");
                        self.reset_to_idle();
                    }
                }
                None
            }
        }
    }

    fn bell_ready(&self, now: DateTime<Utc>) -> bool {
        match self.last_bell {
            None => true,
            Some(last) => now - last > self.bell_cooldown,
        }
    }

    fn reset_to_idle(&mut self) {
        self.phase = Phase::Idle;
        self.streak_high = 0;
        self.streak_low = 0;
    }
}

fn to_chrono(
    field: &'static str,
    value: std::time::Duration,
) -> Result<Duration, ValidationError> {
    Duration::from_std(value).map_err(|e| ValidationError::InvalidConfig {
        field,
        reason: format!("{e}"),
    })
}
