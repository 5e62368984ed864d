//! Configuration surface for the monitor and the event sink.
//!
//! Defaults match the values the system shipped with on the doorbell
//! hardware (500 ms tick, 8-read confirmation, 4-read re-arm, 20 s alert
//! countdown, 2 s bell cooldown). Everything can be overridden through
//! `SONNETTE_*` environment variables or plain struct construction.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ValidationError;

/// Intrusion alert policy once presence is confirmed.
///
/// The source deployments disagreed on whether a confirmed intrusion should
/// alert once per presence episode or keep re-alerting while presence
/// persists. Both are supported; [`AlertPolicy::Once`] is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertPolicy {
    /// Emit exactly one `Intrusion` per presence episode, then require a
    /// full re-arm before watching again.
    Once,
    /// After the first alert, keep re-arming the countdown by `every` and
    /// alerting while presence persists. The episode ends once the re-arm
    /// streak of low reads is observed.
    Repeat {
        /// Interval between repeated alerts.
        every: Duration,
    },
}

/// Configuration for the presence/alert state machine and its polling loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Interval between sensor samples. Finer ticks give tighter latency on
    /// the confirmation thresholds; 0.1-1 s is the sensible range.
    pub tick_interval: Duration,
    /// Consecutive motion reads required to confirm presence.
    pub confirm_threshold: u32,
    /// Consecutive no-motion reads required to return to idle after a
    /// completed cycle.
    pub rearm_threshold: u32,
    /// How long a confirmed visitor has to ring before an intrusion fires.
    pub alert_timeout: Duration,
    /// Minimum time between two bell events.
    pub bell_cooldown: Duration,
    /// Once-per-episode or repeating intrusion alerts.
    pub alert_policy: AlertPolicy,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(500),
            confirm_threshold: 8,
            rearm_threshold: 4,
            alert_timeout: Duration::from_secs(20),
            bell_cooldown: Duration::from_secs(2),
            alert_policy: AlertPolicy::Once,
        }
    }
}

impl MonitorConfig {
    /// Checks that the configuration is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidConfig` for zero thresholds or zero
    /// durations.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.confirm_threshold == 0 {
            return Err(invalid("confirm_threshold", "must be at least 1"));
        }
        if self.rearm_threshold == 0 {
            return Err(invalid("rearm_threshold", "must be at least 1"));
        }
        if self.tick_interval.is_zero() {
            return Err(invalid("tick_interval", "must be non-zero"));
        }
        if self.alert_timeout.is_zero() {
            return Err(invalid("alert_timeout", "must be non-zero"));
        }
        if self.bell_cooldown.is_zero() {
            return Err(invalid("bell_cooldown", "must be non-zero"));
        }
        if let AlertPolicy::Repeat { every } = self.alert_policy {
            if every.is_zero() {
                return Err(invalid("alert_policy.every", "must be non-zero"));
            }
        }
        Ok(())
    }

    /// Builds a configuration from `SONNETTE_*` environment variables,
    /// starting from the defaults.
    ///
    /// Recognized variables: `SONNETTE_TICK_MS`, `SONNETTE_CONFIRM_STREAK`,
    /// `SONNETTE_REARM_STREAK`, `SONNETTE_ALERT_TIMEOUT_SECS`,
    /// `SONNETTE_BELL_COOLDOWN_SECS`, `SONNETTE_ALERT_REPEAT_SECS` (presence
    /// of the last one selects [`AlertPolicy::Repeat`]).
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidEnvVar` when a variable is set but
    /// unparseable, and any error `validate` would return.
    pub fn from_env() -> Result<Self, ValidationError> {
        let mut cfg = Self::default();
        if let Some(ms) = parse_env::<u64>("SONNETTE_TICK_MS")? {
            cfg.tick_interval = Duration::from_millis(ms);
        }
        if let Some(n) = parse_env::<u32>("SONNETTE_CONFIRM_STREAK")? {
            cfg.confirm_threshold = n;
        }
        if let Some(n) = parse_env::<u32>("SONNETTE_REARM_STREAK")? {
            cfg.rearm_threshold = n;
        }
        if let Some(secs) = parse_env::<u64>("SONNETTE_ALERT_TIMEOUT_SECS")? {
            cfg.alert_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_env::<u64>("SONNETTE_BELL_COOLDOWN_SECS")? {
            cfg.bell_cooldown = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_env::<u64>("SONNETTE_ALERT_REPEAT_SECS")? {
            cfg.alert_policy = AlertPolicy::Repeat {
                every: Duration::from_secs(secs),
            };
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Configuration for the HTTP event sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Endpoint receiving event POSTs, e.g. `https://host/api/event`.
    pub url: String,
    /// Shared secret included in every payload.
    pub secret: String,
    /// Bound on a single submission attempt.
    pub timeout: Duration,
    /// Max queued events awaiting dispatch; overflow drops the event.
    pub queue_capacity: usize,
}

impl SinkConfig {
    /// Creates a sink configuration with default timeout and queue bounds.
    #[must_use]
    pub fn new(url: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            secret: secret.into(),
            timeout: Duration::from_secs(3),
            queue_capacity: 64,
        }
    }

    /// Builds a sink configuration from the environment.
    ///
    /// `SONNETTE_SINK_URL` and `SONNETTE_SECRET` are required;
    /// `SONNETTE_SINK_TIMEOUT_SECS` and `SONNETTE_SINK_QUEUE` are optional.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingField` when a required variable is
    /// absent, or `InvalidEnvVar` when one is unparseable.
    pub fn from_env() -> Result<Self, ValidationError> {
        let url =
            env::var("SONNETTE_SINK_URL").map_err(|_| ValidationError::MissingField {
                field: "SONNETTE_SINK_URL",
            })?;
        let secret = env::var("SONNETTE_SECRET").map_err(|_| ValidationError::MissingField {
            field: "SONNETTE_SECRET",
        })?;

        let mut cfg = Self::new(url, secret);
        if let Some(secs) = parse_env::<u64>("SONNETTE_SINK_TIMEOUT_SECS")? {
            cfg.timeout = Duration::from_secs(secs);
        }
        if let Some(n) = parse_env::<usize>("SONNETTE_SINK_QUEUE")? {
            cfg.queue_capacity = n;
        }
        Ok(cfg)
    }
}

fn invalid(field: &'static str, reason: &str) -> ValidationError {
    ValidationError::InvalidConfig {
        field,
        reason: reason.to_string(),
    }
}

fn parse_env<T: FromStr>(name: &'static str) -> Result<Option<T>, ValidationError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ValidationError::InvalidEnvVar {
                name,
                reason: format!("{e}"),
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        MonitorConfig::default().validate().unwrap();
    }

    #[test]
    fn zero_confirm_threshold_rejected() {
        let cfg = MonitorConfig {
            confirm_threshold: 0,
            ..MonitorConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(format!("{err}").contains("confirm_threshold"));
    }

    #[test]
    fn zero_tick_rejected() {
        let cfg = MonitorConfig {
            tick_interval: Duration::ZERO,
            ..MonitorConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_repeat_interval_rejected() {
        let cfg = MonitorConfig {
            alert_policy: AlertPolicy::Repeat {
                every: Duration::ZERO,
            },
            ..MonitorConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn sink_config_defaults() {
        let cfg = SinkConfig::new("http://localhost/api/event", "super_secret");
        assert_eq!(cfg.timeout, Duration::from_secs(3));
        assert_eq!(cfg.queue_capacity, 64);
    }
}
