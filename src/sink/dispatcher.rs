//! Sink dispatch worker.
//!
//! Emitted events enqueue onto a bounded channel and never block the sensor
//! loop. A dedicated worker thread drains the queue and calls the sink; a
//! full queue drops the event and bumps a counter, and a failing sink is
//! logged and skipped. Events are best-effort, so both are acceptable.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::event::Event;
use crate::sink::EventSink;

/// Bounded, non-blocking handoff between the monitor loop and a sink.
///
/// Shutdown drains events already queued; an event accepted by `dispatch`
/// is either submitted once or dropped, never retried.
pub struct SinkDispatcher {
    tx: Option<Sender<Event>>,
    dropped_events: Arc<AtomicU64>,
    failed_submissions: Arc<AtomicU64>,
    join: Option<JoinHandle<()>>,
}

impl SinkDispatcher {
    /// Spawns the worker thread over a queue of the given capacity.
    #[must_use]
    pub fn new(queue_capacity: usize, sink: Arc<dyn EventSink>) -> Self {
        let (tx, rx) = bounded::<Event>(queue_capacity.max(1));

        let dropped_events = Arc::new(AtomicU64::new(0));
        let failed_submissions = Arc::new(AtomicU64::new(0));

        let worker_failures = Arc::clone(&failed_submissions);
        let join = thread::Builder::new()
            .name("sonnette-sink".to_string())
            .spawn(move || worker_loop(&rx, sink.as_ref(), &worker_failures))
            .expect("failed to spawn sonnette sink worker");

        Self {
            tx: Some(tx),
            dropped_events,
            failed_submissions,
            join: Some(join),
        }
    }

    /// Non-blocking enqueue. A full or closed queue drops the event.
    pub fn dispatch(&self, event: Event) {
        let Some(tx) = self.tx.as_ref() else {
            self.dropped_events.fetch_add(1, Ordering::Relaxed);
            return;
        };
        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.dropped_events.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(kind = event.kind.as_str(), "sink queue full; event dropped");
            }
        }
    }

    /// Events dropped before reaching the worker (queue overflow).
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }

    /// Events the sink rejected (logged and dropped by the worker).
    #[must_use]
    pub fn failed_submissions(&self) -> u64 {
        self.failed_submissions.load(Ordering::Relaxed)
    }

    /// Closes the queue, drains outstanding events, and joins the worker.
    ///
    /// Idempotent. Blocks for at most the queued events times the sink's
    /// bounded submission time.
    pub fn shutdown(&mut self) {
        drop(self.tx.take());
        if let Some(handle) = self.join.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SinkDispatcher {
    fn drop(&mut self) {
        // The worker holds the only receiver and no sender clones exist, so
        // it exits once the queue drains. Joining cannot deadlock.
        self.shutdown();
    }
}

fn worker_loop(rx: &Receiver<Event>, sink: &dyn EventSink, failures: &AtomicU64) {
    // recv fails only when the channel is closed and empty: drain semantics.
    while let Ok(event) = rx.recv() {
        if let Err(e) = sink.submit(&event) {
            failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                kind = event.kind.as_str(),
                error = %e,
                "sink submission failed; event dropped"
            );
        }
    }
}
