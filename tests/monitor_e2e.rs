//! End-to-end monitor scenarios: scripted sensors through the runner and
//! dispatcher into a sink, with deterministic tick timestamps.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};

use sonnette::api;
use sonnette::sink::{EventSink, SinkDispatcher, StoreSink};
use sonnette::store::{EventStore, InMemoryEventStore};
use sonnette::{
    Event, EventKind, MonitorConfig, MonitorRunner, NullChime, ScriptedSensor, SinkError,
};

#[derive(Default)]
struct CollectingSink {
    events: Mutex<Vec<Event>>,
}

impl CollectingSink {
    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for CollectingSink {
    fn submit(&self, event: &Event) -> Result<(), SinkError> {
        self.events.lock().unwrap().push(*event);
        Ok(())
    }
}

fn config() -> MonitorConfig {
    MonitorConfig {
        tick_interval: Duration::from_millis(10),
        confirm_threshold: 3,
        rearm_threshold: 4,
        alert_timeout: Duration::from_secs(5),
        bell_cooldown: Duration::from_secs(2),
        ..MonitorConfig::default()
    }
}

/// Drives `tick_once` with one-second steps, deterministically.
fn drive(
    runner: &mut MonitorRunner,
    start: DateTime<Utc>,
    ticks: usize,
) -> DateTime<Utc> {
    let mut now = start;
    for _ in 0..ticks {
        now += ChronoDuration::seconds(1);
        runner.tick_once(now);
    }
    now
}

#[test]
fn sustained_presence_without_bell_yields_one_intrusion() {
    let sink = Arc::new(CollectingSink::default());
    let dispatcher = SinkDispatcher::new(16, Arc::clone(&sink) as Arc<dyn EventSink>);

    let (mut runner, _shutdown) = MonitorRunner::new(
        config(),
        Box::new(ScriptedSensor::new(std::iter::repeat(true).take(30))),
        Box::new(ScriptedSensor::new([])),
        dispatcher,
        Box::new(NullChime),
    )
    .unwrap();

    drive(&mut runner, Utc::now(), 15);
    drop(runner); // drains the dispatcher

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::Intrusion);
}

#[test]
fn bell_press_during_watch_yields_bell_and_no_intrusion() {
    let sink = Arc::new(CollectingSink::default());
    let dispatcher = SinkDispatcher::new(16, Arc::clone(&sink) as Arc<dyn EventSink>);

    // Button goes high on the fifth tick: two seconds into the watch window.
    let button = ScriptedSensor::new([false, false, false, false, true]);

    let (mut runner, _shutdown) = MonitorRunner::new(
        config(),
        Box::new(ScriptedSensor::new(std::iter::repeat(true).take(30))),
        Box::new(button),
        dispatcher,
        Box::new(NullChime),
    )
    .unwrap();

    drive(&mut runner, Utc::now(), 20);
    drop(runner);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::Bell);
}

#[test]
fn bells_never_violate_the_cooldown() {
    let sink = Arc::new(CollectingSink::default());
    let dispatcher = SinkDispatcher::new(64, Arc::clone(&sink) as Arc<dyn EventSink>);

    // Button held down for a minute straight.
    let (mut runner, _shutdown) = MonitorRunner::new(
        config(),
        Box::new(ScriptedSensor::new([])),
        Box::new(ScriptedSensor::new(std::iter::repeat(true).take(60))),
        dispatcher,
        Box::new(NullChime),
    )
    .unwrap();

    drive(&mut runner, Utc::now(), 60);
    drop(runner);

    let events = sink.events();
    assert!(events.len() > 1, "held button should ring more than once");
    assert!(events.iter().all(|e| e.kind == EventKind::Bell));
    for pair in events.windows(2) {
        let gap = pair[1].timestamp - pair[0].timestamp;
        assert!(
            gap > ChronoDuration::seconds(2),
            "two bells {gap} apart violate the cooldown"
        );
    }
}

#[test]
fn rearm_gates_the_next_episode() {
    let sink = Arc::new(CollectingSink::default());
    let dispatcher = SinkDispatcher::new(16, Arc::clone(&sink) as Arc<dyn EventSink>);

    // Motion through the first episode, lingering motion during re-arm,
    // then quiet, then a second visitor.
    let mut motion: Vec<bool> = Vec::new();
    motion.extend(std::iter::repeat(true).take(12)); // episode + lingering
    motion.extend(std::iter::repeat(false).take(4)); // re-arm
    motion.extend(std::iter::repeat(true).take(12)); // second episode

    let (mut runner, _shutdown) = MonitorRunner::new(
        config(),
        Box::new(ScriptedSensor::new(motion)),
        Box::new(ScriptedSensor::new([])),
        dispatcher,
        Box::new(NullChime),
    )
    .unwrap();

    drive(&mut runner, Utc::now(), 28);
    drop(runner);

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.kind == EventKind::Intrusion));
}

#[test]
fn store_sink_pipeline_feeds_the_snapshot() {
    let store = Arc::new(InMemoryEventStore::new());
    let sink = StoreSink::new(Arc::clone(&store) as Arc<dyn EventStore>);
    let dispatcher = SinkDispatcher::new(16, Arc::new(sink));

    let (mut runner, _shutdown) = MonitorRunner::new(
        config(),
        Box::new(ScriptedSensor::new(std::iter::repeat(true).take(30))),
        Box::new(ScriptedSensor::new([])),
        dispatcher,
        Box::new(NullChime),
    )
    .unwrap();

    drive(&mut runner, Utc::now(), 15);
    drop(runner);

    let log = api::snapshot(store.as_ref()).unwrap();
    assert!(log.intrus);
    assert!(!log.bell);
    assert_eq!(log.intrus_events.len(), 1);
}

#[test]
fn slow_sink_does_not_stretch_the_tick() {
    struct SlowSink;

    impl EventSink for SlowSink {
        fn submit(&self, _event: &Event) -> Result<(), SinkError> {
            std::thread::sleep(Duration::from_millis(200));
            Ok(())
        }
    }

    let dispatcher = SinkDispatcher::new(64, Arc::new(SlowSink));

    // A held button emits a bell every third tick at this cadence.
    let (mut runner, _shutdown) = MonitorRunner::new(
        config(),
        Box::new(ScriptedSensor::new([])),
        Box::new(ScriptedSensor::new(std::iter::repeat(true).take(30))),
        dispatcher,
        Box::new(NullChime),
    )
    .unwrap();

    let start = std::time::Instant::now();
    drive(&mut runner, Utc::now(), 30);
    // 30 ticks of pure machine work plus non-blocking dispatch: nowhere
    // near the 200 ms-per-event sink latency.
    assert!(start.elapsed() < Duration::from_millis(150));
    drop(runner);
}

#[test]
fn shutdown_completes_current_tick_and_exits() {
    let sink = Arc::new(CollectingSink::default());
    let dispatcher = SinkDispatcher::new(16, Arc::clone(&sink) as Arc<dyn EventSink>);

    let (runner, shutdown) = MonitorRunner::new(
        config(),
        Box::new(ScriptedSensor::new(std::iter::repeat(true).take(100))),
        Box::new(ScriptedSensor::new([])),
        dispatcher,
        Box::new(NullChime),
    )
    .unwrap();

    let handle = std::thread::spawn(move || runner.run());
    std::thread::sleep(Duration::from_millis(100));
    shutdown.request();
    handle.join().expect("runner thread must exit cleanly");
}
