//! Local audio feedback hook.
//!
//! The doorbell hardware plays a short melody on the speaker when the bell
//! is pressed. That concern stays outside the monitor: implementations get
//! the event kind, play whatever they like, and must not feed anything back
//! into monitor state. Tone generation itself is out of scope here.

use crate::event::EventKind;

/// Fire-and-forget audio feedback for emitted events.
///
/// `play` runs on the polling thread, so implementations must keep blocking
/// bounded (the hardware melodies are well under 2 s). Failures are the
/// implementation's problem; the monitor neither observes nor retries them.
pub trait Chime: Send {
    /// Plays feedback for the given event kind.
    fn play(&mut self, kind: EventKind);
}

/// A chime that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullChime;

impl Chime for NullChime {
    fn play(&mut self, _kind: EventKind) {}
}

/// A chime that logs instead of playing audio. Useful on headless setups.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogChime;

impl Chime for LogChime {
    fn play(&mut self, kind: EventKind) {
        tracing::info!(kind = kind.as_str(), "chime");
    }
}
