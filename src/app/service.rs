//! Application service, the hexagonal core.
//!
//! [`TankService`] owns the settings model, the autolog scheduler and the
//! threshold monitor.  It exposes a store-agnostic API; all I/O flows
//! through port traits passed at call sites, making the whole service
//! testable with mock adapters.
//!
//! ```text
//!   SensorPort ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!                  │         TankService          │
//!      LogPort ◀── │ Settings · Autolog · Alerts  │ ◀── Clock
//! SettingsPort ◀──▶└─────────────────────────────┘
//! ```
//!
//! Every method takes `&self` so the driver can share the service between
//! the tick loop and the sensor-poll loop on one executor.

use core::cell::RefCell;

use log::{info, warn};

use crate::config::TankSettings;
use crate::error::Result;
use crate::level::{self, VolumeEstimate};
use crate::scheduler::{AutologScheduler, AutologState, AutologStatus, TickOutcome};
use crate::settings::SettingsModel;
use crate::threshold::{self, ThresholdMonitor, ThresholdTransition};

use super::commands::AppCommand;
use super::events::{AppEvent, LevelTelemetry};
use super::ports::{Clock, EventSink, LogPort, SensorPort, SettingsPort};

// ───────────────────────────────────────────────────────────────
// TankService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct TankService {
    settings: RefCell<SettingsModel>,
    scheduler: AutologScheduler,
    monitor: RefCell<ThresholdMonitor>,
}

impl TankService {
    /// Construct the service from a loaded settings model.
    ///
    /// Does **not** arm autolog; call [`start`](Self::start) next.
    pub fn new(settings: SettingsModel) -> Self {
        Self {
            settings: RefCell::new(settings),
            scheduler: AutologScheduler::new(),
            monitor: RefCell::new(ThresholdMonitor::new()),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Arm autolog if the loaded settings enable it.
    ///
    /// A start failure is reported and returned; the service keeps running
    /// with autolog stopped until [`AppCommand::RetryAutolog`].
    pub async fn start(
        &self,
        sensor: &impl SensorPort,
        clock: &impl Clock,
        sink: &impl EventSink,
    ) -> Result<()> {
        let settings = self.settings();
        let result = self.scheduler.on_settings_changed(&settings, sensor, clock).await;
        let armed = self.scheduler.state() == AutologState::Armed;
        sink.emit(&AppEvent::Started { autolog_armed: armed });
        info!("TankService started (autolog {})", if armed { "armed" } else { "off" });
        self.report_restart(result, sink)
    }

    // ── Periodic work ─────────────────────────────────────────

    /// Read the sensor, estimate the level and evaluate the alert threshold.
    pub async fn poll_level(
        &self,
        sensor: &impl SensorPort,
        sink: &impl EventSink,
    ) -> Result<LevelTelemetry> {
        let reading = sensor.read().await?;
        let settings = self.settings();
        let estimate = level::estimate(&settings, &reading)?;
        let below = threshold::is_below_threshold(&settings, &estimate)?;

        let telemetry = LevelTelemetry {
            liters: estimate.rounded_liters(),
            capacity_liters: estimate.capacity_liters,
            percent: estimate.percent(),
            temperature_c: reading.temperature_c,
            below_threshold: below,
            read_at: reading.timestamp,
        };
        sink.emit(&AppEvent::Level(telemetry));

        let transition = self.monitor.borrow_mut().update(below);
        match transition {
            Some(ThresholdTransition::Entered) if settings.notifications_enabled => {
                sink.emit(&AppEvent::ThresholdEntered {
                    liters: telemetry.liters,
                });
            }
            Some(ThresholdTransition::Cleared) => {
                sink.emit(&AppEvent::ThresholdCleared {
                    liters: telemetry.liters,
                });
            }
            _ => {}
        }
        Ok(telemetry)
    }

    /// Run one autolog tick.
    ///
    /// The `io` parameter satisfies **both** [`SensorPort`] and [`LogPort`].
    pub async fn tick(
        &self,
        io: &(impl SensorPort + LogPort),
        clock: &impl Clock,
        sink: &impl EventSink,
    ) -> Result<TickOutcome> {
        let result = self.scheduler.tick(io, io, clock).await;
        match &result {
            Ok(TickOutcome::Sampled {
                logged: Some(entry),
                ..
            }) => sink.emit(&AppEvent::AutologEntry(*entry)),
            Err(e) => sink.emit(&AppEvent::AutologFault(*e)),
            Ok(_) => {}
        }
        result
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (settings form, autolog toggle).
    pub async fn handle_command(
        &self,
        cmd: AppCommand,
        sensor: &impl SensorPort,
        store: &impl SettingsPort,
        clock: &impl Clock,
        sink: &impl EventSink,
    ) -> Result<()> {
        match cmd {
            AppCommand::UpdateSettings(new) => {
                self.apply_settings(new, sensor, store, clock, sink).await
            }
            AppCommand::SetAutologEnabled(enabled) => {
                let mut new = self.settings();
                new.autolog.enabled = enabled;
                self.apply_settings(new, sensor, store, clock, sink).await
            }
            AppCommand::RetryAutolog => {
                let settings = self.settings();
                let result = self.scheduler.on_settings_changed(&settings, sensor, clock).await;
                self.report_restart(result, sink)
            }
        }
    }

    /// Validate, persist and apply new settings, then restart autolog.
    ///
    /// Any accepted change tears down the autolog baseline; the snapshot is
    /// only replaced once the store accepted it.
    pub async fn apply_settings(
        &self,
        new: TankSettings,
        sensor: &impl SensorPort,
        store: &impl SettingsPort,
        clock: &impl Clock,
        sink: &impl EventSink,
    ) -> Result<()> {
        let applied = self.settings.borrow_mut().apply(new, store)?.clone();
        self.monitor.borrow_mut().reset();
        sink.emit(&AppEvent::SettingsApplied);

        let result = self.scheduler.on_settings_changed(&applied, sensor, clock).await;
        self.report_restart(result, sink)
    }

    // ── Queries ───────────────────────────────────────────────

    /// Clone of the live settings snapshot.
    pub fn settings(&self) -> TankSettings {
        self.settings.borrow().current().clone()
    }

    /// Estimate using the live settings.
    pub fn estimate(&self, reading: &level::SensorReading) -> Result<VolumeEstimate> {
        level::estimate(self.settings.borrow().current(), reading)
    }

    /// Threshold check using the live settings.
    pub fn is_below_threshold(&self, estimate: &VolumeEstimate) -> Result<bool> {
        threshold::is_below_threshold(self.settings.borrow().current(), estimate)
    }

    /// Autolog display snapshot.
    pub fn autolog_status(&self) -> AutologStatus {
        self.scheduler.status()
    }

    /// Direct access for callers that drive `start/stop/tick` themselves.
    pub fn scheduler(&self) -> &AutologScheduler {
        &self.scheduler
    }

    // ── Internal ──────────────────────────────────────────────

    fn report_restart(&self, result: Result<()>, sink: &impl EventSink) -> Result<()> {
        match result {
            Ok(()) => {
                match self.scheduler.baseline() {
                    Some(baseline) => sink.emit(&AppEvent::AutologArmed {
                        baseline_liters: level::round2(baseline.liters),
                    }),
                    None => sink.emit(&AppEvent::AutologStopped),
                }
                Ok(())
            }
            Err(e) => {
                warn!("Autolog restart failed: {e}");
                sink.emit(&AppEvent::AutologFault(e));
                Err(e)
            }
        }
    }
}
