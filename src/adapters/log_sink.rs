//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (stderr via `env_logger` in the host binary).
//! A UI push adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&self, event: &AppEvent) {
        match event {
            AppEvent::Level(t) => {
                info!(
                    "LEVEL | {:.2}/{:.2} L ({:.1}%) | T={:.1}\u{00b0}C | {}",
                    t.liters,
                    t.capacity_liters,
                    t.percent,
                    t.temperature_c,
                    if t.below_threshold { "LOW" } else { "OK" },
                );
            }
            AppEvent::ThresholdEntered { liters } => {
                warn!("ALERT | level below threshold at {:.2} L", liters);
            }
            AppEvent::ThresholdCleared { liters } => {
                info!("ALERT | cleared at {:.2} L", liters);
            }
            AppEvent::SettingsApplied => {
                info!("SETTINGS | applied");
            }
            AppEvent::AutologArmed { baseline_liters } => {
                info!("AUTOLOG | armed, baseline={:.2} L", baseline_liters);
            }
            AppEvent::AutologStopped => {
                info!("AUTOLOG | stopped");
            }
            AppEvent::AutologEntry(entry) => {
                info!(
                    "AUTOLOG | {:?} of {:.2} L at {}",
                    entry.activity_type, entry.amount_liters, entry.timestamp
                );
            }
            AppEvent::AutologFault(e) => {
                warn!("AUTOLOG | {}", e);
            }
            AppEvent::Started { autolog_armed } => {
                info!("START | autolog_armed={}", autolog_armed);
            }
        }
    }
}
