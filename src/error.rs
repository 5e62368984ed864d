//! Error types for sonnette.
//!
//! All errors are strongly typed using thiserror. This enables pattern
//! matching on specific error conditions and provides clear error messages.

use thiserror::Error;

use crate::store::StorageError;

/// Validation errors that occur while checking configuration or payloads.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A configuration field is out of its allowed range.
    #[error("Config field '{field}' is invalid: {reason}")]
    InvalidConfig {
        /// The offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// An environment variable could not be parsed.
    #[error("Environment variable '{name}' is invalid: {reason}")]
    InvalidEnvVar {
        /// The variable name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// An event type string was not `bell` or `intrus`.
    #[error("Invalid event type: '{value}'")]
    InvalidEventType {
        /// The rejected value.
        value: String,
    },

    /// A timestamp string could not be parsed as ISO-8601.
    #[error("Invalid timestamp: '{value}'")]
    InvalidTimestamp {
        /// The rejected value.
        value: String,
    },

    /// A required field is missing.
    #[error("Required field '{field}' is missing")]
    MissingField {
        /// The missing field.
        field: &'static str,
    },
}

/// Errors returned by event sinks.
///
/// Sink errors are never fatal to the monitor: the event is logged and
/// dropped (at-most-once delivery).
#[derive(Debug, Error)]
pub enum SinkError {
    /// The request could not be sent at all.
    #[error("Sink connection failed: {message}")]
    ConnectionFailed {
        /// Transport-level failure description.
        message: String,
    },

    /// The sink answered with a non-success status.
    #[error("Sink rejected event (status {code})")]
    Status {
        /// HTTP status code.
        code: u16,
    },

    /// The event could not be serialized for submission.
    #[error("Failed to serialize event: {message}")]
    SerializationFailed {
        /// Serializer failure description.
        message: String,
    },

    /// The backing store refused the event.
    #[error("Sink storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Top-level error type for sonnette.
#[derive(Debug, Error)]
pub enum SonnetteError {
    /// Validation failed.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// An event sink failed.
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// The event store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Internal invariant violation.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the violated invariant.
        message: String,
    },
}

impl SonnetteError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a sink error.
    #[must_use]
    pub const fn is_sink(&self) -> bool {
        matches!(self, Self::Sink(_))
    }

    /// Returns true if this error could succeed on retry.
    ///
    /// Note the monitor never retries sink submissions (at-most-once); this
    /// is informational for callers that drive sinks directly.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Validation(_) | Self::Internal { .. } => false,
            Self::Sink(e) => match e {
                SinkError::ConnectionFailed { .. } => true,
                SinkError::Status { code } => *code >= 500,
                _ => false,
            },
            Self::Storage(_) => false,
        }
    }
}

/// Result type alias for sonnette operations.
pub type SonnetteResult<T> = Result<T, SonnetteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_message() {
        let err = ValidationError::InvalidConfig {
            field: "confirm_threshold",
            reason: "must be at least 1".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("confirm_threshold"));
        assert!(msg.contains("at least 1"));
    }

    #[test]
    fn sink_status_message() {
        let err = SinkError::Status { code: 401 };
        assert!(format!("{err}").contains("401"));
    }

    #[test]
    fn validation_is_not_retryable() {
        let err: SonnetteError = ValidationError::MissingField { field: "secret" }.into();
        assert!(err.is_validation());
        assert!(!err.is_retryable());
    }

    #[test]
    fn connection_failure_is_retryable() {
        let err: SonnetteError = SinkError::ConnectionFailed {
            message: "refused".to_string(),
        }
        .into();
        assert!(err.is_sink());
        assert!(err.is_retryable());
    }

    #[test]
    fn client_rejection_is_not_retryable() {
        let err: SonnetteError = SinkError::Status { code: 400 }.into();
        assert!(!err.is_retryable());

        let err: SonnetteError = SinkError::Status { code: 503 }.into();
        assert!(err.is_retryable());
    }

    #[test]
    fn internal_error_message() {
        let err = SonnetteError::internal("phase invariant violated");
        assert!(format!("{err}").contains("phase invariant violated"));
        assert!(!err.is_retryable());
    }
}
