//! Mock port adapters for integration tests.
//!
//! The sensor and journal can be *gated*: a gated call suspends until the
//! test releases it, so tests can interleave `stop()` or a second `tick()`
//! with an in-flight port call using `futures_lite::future::zip`.

use core::cell::{Cell, RefCell};

use chrono::{DateTime, Duration, TimeZone, Utc};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::signal::Signal;

use tankwatch::app::events::AppEvent;
use tankwatch::app::ports::{Clock, EventSink, LogPort, SensorPort};
use tankwatch::config::{Dimensions, TankSettings, TankShape};
use tankwatch::level::SensorReading;
use tankwatch::scheduler::LogEntry;
use tankwatch::{Error, Result};

/// 100 cm tall, 10 × 100 cm base: 1 cm of water is exactly 1 L, so
/// `liters == 100 - distance_cm`.
pub fn liter_per_cm_tank() -> TankSettings {
    let mut s = TankSettings {
        shape: TankShape::Rectangular,
        dimensions: Dimensions {
            height_cm: 100.0,
            width_cm: Some(10.0),
            length_cm: Some(100.0),
            diameter_cm: None,
        },
        ..TankSettings::default()
    };
    s.autolog.enabled = true;
    s.autolog.interval_minutes = 1.0;
    s.autolog.min_change_liters = 1.0;
    s
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap()
}

// ── MockSensor ────────────────────────────────────────────────

pub struct MockSensor {
    distance_cm: Cell<Option<f64>>,
    gated: Cell<bool>,
    gate: Signal<NoopRawMutex, ()>,
    pub reads: Cell<u32>,
}

#[allow(dead_code)]
impl MockSensor {
    pub fn at_liters(liters: f64) -> Self {
        Self {
            distance_cm: Cell::new(Some(100.0 - liters)),
            gated: Cell::new(false),
            gate: Signal::new(),
            reads: Cell::new(0),
        }
    }

    pub fn set_liters(&self, liters: f64) {
        self.distance_cm.set(Some(100.0 - liters));
    }

    pub fn set_distance(&self, distance_cm: f64) {
        self.distance_cm.set(Some(distance_cm));
    }

    /// Make every read fail with `SensorUnavailable`.
    pub fn fail(&self) {
        self.distance_cm.set(None);
    }

    /// Hold the next reads until [`release`](Self::release).
    pub fn hold(&self) {
        self.gated.set(true);
    }

    pub fn release(&self) {
        self.gated.set(false);
        self.gate.signal(());
    }
}

impl SensorPort for MockSensor {
    async fn read(&self) -> Result<SensorReading> {
        self.reads.set(self.reads.get() + 1);
        if self.gated.get() {
            self.gate.wait().await;
        }
        let distance_cm = self.distance_cm.get().ok_or(Error::SensorUnavailable)?;
        Ok(SensorReading {
            distance_cm,
            temperature_c: 18.5,
            timestamp: t0(),
        })
    }
}

// ── MockJournal ───────────────────────────────────────────────

pub struct MockJournal {
    pub entries: RefCell<Vec<LogEntry>>,
    failing: Cell<bool>,
    gated: Cell<bool>,
    gate: Signal<NoopRawMutex, ()>,
}

#[allow(dead_code)]
impl MockJournal {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            failing: Cell::new(false),
            gated: Cell::new(false),
            gate: Signal::new(),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn hold(&self) {
        self.gated.set(true);
    }

    pub fn release(&self) {
        self.gated.set(false);
        self.gate.signal(());
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn last(&self) -> Option<LogEntry> {
        self.entries.borrow().last().copied()
    }
}

impl LogPort for MockJournal {
    async fn write(&self, entry: &LogEntry) -> Result<()> {
        if self.gated.get() {
            self.gate.wait().await;
        }
        if self.failing.get() {
            return Err(Error::LogWriteFailed);
        }
        self.entries.borrow_mut().push(*entry);
        Ok(())
    }
}

// ── MockIo (sensor + journal behind one value) ────────────────

pub struct MockIo {
    pub sensor: MockSensor,
    pub journal: MockJournal,
}

#[allow(dead_code)]
impl MockIo {
    pub fn at_liters(liters: f64) -> Self {
        Self {
            sensor: MockSensor::at_liters(liters),
            journal: MockJournal::new(),
        }
    }
}

impl SensorPort for MockIo {
    async fn read(&self) -> Result<SensorReading> {
        self.sensor.read().await
    }
}

impl LogPort for MockIo {
    async fn write(&self, entry: &LogEntry) -> Result<()> {
        self.journal.write(entry).await
    }
}

// ── ManualClock ───────────────────────────────────────────────

pub struct ManualClock(Cell<DateTime<Utc>>);

#[allow(dead_code)]
impl ManualClock {
    pub fn new() -> Self {
        Self(Cell::new(t0()))
    }

    pub fn advance_secs(&self, secs: i64) {
        self.0.set(self.0.get() + Duration::seconds(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.0.get()
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: RefCell<Vec<AppEvent>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| pred(e)).count()
    }

    pub fn last(&self) -> Option<AppEvent> {
        self.events.borrow().last().cloned()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &AppEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
