//! HTTP POST sink.
//!
//! Submits events to the event API server as JSON
//! `{ "type", "timestamp", "secret" }` with a bounded request timeout. The
//! dispatcher worker is a plain thread, so the blocking client is the right
//! fit; no async runtime is pulled into the monitor path.

use crate::api::EventPayload;
use crate::config::SinkConfig;
use crate::error::SinkError;
use crate::event::Event;
use crate::sink::EventSink;

/// A sink that POSTs events to a remote endpoint.
pub struct HttpSink {
    client: reqwest::blocking::Client,
    url: String,
    secret: String,
}

impl HttpSink {
    /// Builds an HTTP sink from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::ConnectionFailed`] if the client cannot be
    /// constructed (TLS backend initialization, invalid proxy env, ...).
    pub fn new(cfg: &SinkConfig) -> Result<Self, SinkError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| SinkError::ConnectionFailed {
                message: format!("{e}"),
            })?;

        Ok(Self {
            client,
            url: cfg.url.clone(),
            secret: cfg.secret.clone(),
        })
    }
}

impl EventSink for HttpSink {
    fn submit(&self, event: &Event) -> Result<(), SinkError> {
        let payload = EventPayload::from_event(event, &self.secret);

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .map_err(|e| SinkError::ConnectionFailed {
                message: format!("{e}"),
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SinkError::Status {
                code: status.as_u16(),
            })
        }
    }
}
