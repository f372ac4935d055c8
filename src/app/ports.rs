//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ TankService (domain)
//! ```
//!
//! Driven adapters (sensor source, log journal, settings store, clock, event
//! sinks) implement these traits.  The [`TankService`](super::service::TankService)
//! and [`AutologScheduler`](crate::scheduler::AutologScheduler) consume them
//! via generics, so the domain core never touches files or the network.
//!
//! Sensor reads and log writes are `async`: the scheduler suspends at each
//! call and must tolerate arbitrary latency.  Every method takes `&self`;
//! adapters that need mutation use interior mutability, matching the
//! single-threaded executor.

use chrono::{DateTime, Utc};

use crate::config::TankSettings;
use crate::error::Result;
use crate::level::SensorReading;
use crate::scheduler::LogEntry;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: ingest store → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the most recent sensor sample.
pub trait SensorPort {
    /// Most recent reading, or [`Error::SensorUnavailable`](crate::error::Error::SensorUnavailable).
    async fn read(&self) -> Result<SensorReading>;
}

// ───────────────────────────────────────────────────────────────
// Log port (driven adapter: domain → usage log store)
// ───────────────────────────────────────────────────────────────

/// Write-side port for usage/refill log entries.
pub trait LogPort {
    /// Persist one entry, or fail with [`Error::LogWriteFailed`](crate::error::Error::LogWriteFailed).
    async fn write(&self, entry: &LogEntry) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Settings port (driven adapter: domain ↔ persistent settings)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the tank settings snapshot.
///
/// The domain validates before calling [`save`](SettingsPort::save);
/// implementations may validate again but must never silently clamp.
pub trait SettingsPort {
    /// Load the stored snapshot ([`Error::SettingsUnavailable`](crate::error::Error::SettingsUnavailable) on failure).
    fn load(&self) -> Result<TankSettings>;

    /// Persist a whole snapshot ([`Error::SettingsSaveFailed`](crate::error::Error::SettingsSaveFailed) on failure).
    fn save(&self, settings: &TankSettings) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Wall-clock source.  Injected so the scheduler runs without real time in tests.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / UI)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (console log, UI push).
pub trait EventSink {
    fn emit(&self, event: &super::events::AppEvent);
}
