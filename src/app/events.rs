//! Outbound application events.
//!
//! The [`TankService`](super::service::TankService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (console log, UI push).

use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::scheduler::LogEntry;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started; carries whether autolog armed.
    Started { autolog_armed: bool },

    /// A fresh level estimate.
    Level(LevelTelemetry),

    /// The level dropped below the alert threshold (notifications enabled).
    ThresholdEntered { liters: f64 },

    /// The level recovered above the alert threshold.
    ThresholdCleared { liters: f64 },

    /// A new settings snapshot was validated, persisted and applied.
    SettingsApplied,

    /// The autolog scheduler armed with a fresh baseline.
    AutologArmed { baseline_liters: f64 },

    /// The autolog scheduler was stopped.
    AutologStopped,

    /// The autolog scheduler wrote a usage/refill entry.
    AutologEntry(LogEntry),

    /// A transient autolog failure (sensor read, log write, start).
    AutologFault(Error),
}

/// A point-in-time level snapshot suitable for logging or display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelTelemetry {
    /// Liters, rounded to two decimals.
    pub liters: f64,
    pub capacity_liters: f64,
    pub percent: f64,
    pub temperature_c: f64,
    pub below_threshold: bool,
    pub read_at: DateTime<Utc>,
}
