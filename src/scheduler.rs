//! Autolog scheduler.
//!
//! Periodically samples the tank level and turns level deltas into
//! Usage/Refill log entries.  The scheduler owns no timer: an external
//! driver calls [`AutologScheduler::tick`] at most once per second and the
//! scheduler compares the injected clock against its deadline.
//!
//! ```text
//!            start()                       tick(), now >= deadline
//!  ┌─────────┐ ─────────▶ ┌──────────────────────┐ ──────────────┐
//!  │ Stopped │            │ Armed(baseline, dl)  │               │ sample · compare
//!  └─────────┘ ◀───────── └──────────────────────┘ ◀─────────────┘ log? · rearm
//!               stop()          tick(), now < deadline: countdown only
//! ```
//!
//! ## Sampling rules
//!
//! - The deadline crossing is edge-triggered: one sample-and-compare per
//!   crossing, then the deadline is recomputed from `now`.
//! - The baseline always advances to the latest sample, so every interval
//!   is compared against the level immediately before it.
//! - A failed log write is reported but still advances the baseline.
//! - A failed sensor read keeps the baseline and waits for the next deadline.
//!
//! ## Re-entrancy
//!
//! Ticks are serialized per epoch with an in-flight slot.  `start()` and
//! `stop()` bump the epoch; a sample that resolves after the epoch moved is
//! discarded without logging or rearming, and never holds up the ticks of
//! the new schedule.

use core::cell::{Cell, RefCell};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{Clock, LogPort, SensorPort};
use crate::config::TankSettings;
use crate::error::{Error, Result, StartFailure};
use crate::level::{self, VolumeEstimate, round2};

// ═══════════════════════════════════════════════════════════════
//  Log entries and snapshots
// ═══════════════════════════════════════════════════════════════

/// Direction of a level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityType {
    Usage,
    Refill,
}

/// One usage/refill record written through the [`LogPort`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub activity_type: ActivityType,
    pub amount_liters: f64,
    pub timestamp: DateTime<Utc>,
}

/// Last sampled level; the reference for the next delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutologBaseline {
    pub liters: f64,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutologState {
    Stopped,
    Armed,
}

/// Read-only snapshot for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutologStatus {
    pub state: AutologState,
    /// Seconds until the next sample, as of the last tick.
    pub countdown_secs: u64,
    pub last_sample_at: Option<DateTime<Utc>>,
}

impl AutologStatus {
    /// Countdown rendered as `MM:SS`.
    pub fn countdown_display(&self) -> String {
        format_countdown(self.countdown_secs)
    }
}

/// What a single [`AutologScheduler::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The scheduler is not armed.
    Stopped,
    /// A previous tick is still awaiting the sensor or log port.
    Busy,
    /// Deadline not reached yet.
    Waiting { remaining_secs: u64 },
    /// A sample-and-compare cycle completed.
    Sampled {
        liters: f64,
        logged: Option<LogEntry>,
    },
    /// `stop()` or `start()` ran while this tick was in flight.
    Discarded,
}

/// Format seconds as zero-padded `MM:SS`.
pub fn format_countdown(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// State carried while armed.  The settings are the snapshot the scheduler
/// was started with; any settings change restarts it.
#[derive(Debug, Clone)]
struct Armed {
    settings: TankSettings,
    baseline: AutologBaseline,
    deadline: DateTime<Utc>,
}

/// Marks a tick in flight for one epoch.  Cleared when the tick completes
/// or is dropped, unless a newer epoch's tick has taken the slot.
struct InFlight<'a> {
    slot: &'a Cell<Option<u64>>,
    epoch: u64,
}

impl<'a> InFlight<'a> {
    fn enter(slot: &'a Cell<Option<u64>>, epoch: u64) -> Self {
        slot.set(Some(epoch));
        Self { slot, epoch }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.slot.get() == Some(self.epoch) {
            self.slot.set(None);
        }
    }
}

/// The autolog state machine.
///
/// All operations take `&self` so a tick suspended on a port call does not
/// lock out `stop()`.  Borrows of the inner state are never held across an
/// `.await`.
#[derive(Debug, Default)]
pub struct AutologScheduler {
    armed: RefCell<Option<Armed>>,
    epoch: Cell<u64>,
    /// Epoch of the tick currently awaiting a port, if any.
    in_flight: Cell<Option<u64>>,
    countdown_secs: Cell<u64>,
    last_sample_at: Cell<Option<DateTime<Utc>>>,
}

impl AutologScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Operations ────────────────────────────────────────────

    /// Arm the scheduler with a fresh baseline.
    ///
    /// Valid from either state; a running schedule is discarded first.  On
    /// failure the scheduler stays `Stopped` and the caller must retry.
    pub async fn start(
        &self,
        settings: &TankSettings,
        sensor: &impl SensorPort,
        clock: &impl Clock,
    ) -> Result<()> {
        self.stop();
        let epoch = self.epoch.get();

        let sample = sample(settings, sensor).await;
        if self.epoch.get() != epoch {
            debug!("Autolog: start superseded while sampling, baseline discarded");
            return Ok(());
        }

        let estimate = sample.map_err(|e| {
            warn!("Autolog: start failed ({e})");
            Error::from(StartFailure::from_sample_error(e))
        })?;

        let now = clock.now();
        let interval = settings.autolog.interval();
        *self.armed.borrow_mut() = Some(Armed {
            settings: settings.clone(),
            baseline: AutologBaseline {
                liters: estimate.liters,
                captured_at: now,
            },
            deadline: now + interval,
        });
        self.countdown_secs.set(ceil_secs(interval));
        self.last_sample_at.set(Some(now));

        info!(
            "Autolog: armed, baseline {:.2} L, every {} min, min change {} L",
            estimate.liters, settings.autolog.interval_minutes, settings.autolog.min_change_liters
        );
        Ok(())
    }

    /// Advance the state machine.  Call at most once per second.
    pub async fn tick(
        &self,
        sensor: &impl SensorPort,
        log_port: &impl LogPort,
        clock: &impl Clock,
    ) -> Result<TickOutcome> {
        // A tick left over from a previous epoch resolves as `Discarded` and
        // does not block the current schedule.
        if self.in_flight.get() == Some(self.epoch.get()) {
            return Ok(TickOutcome::Busy);
        }

        let now = clock.now();
        let (settings, baseline) = {
            let armed = self.armed.borrow();
            let Some(armed) = armed.as_ref() else {
                return Ok(TickOutcome::Stopped);
            };
            if now < armed.deadline {
                let remaining_secs = ceil_secs(armed.deadline - now);
                self.countdown_secs.set(remaining_secs);
                return Ok(TickOutcome::Waiting { remaining_secs });
            }
            (armed.settings.clone(), armed.baseline)
        };

        let epoch = self.epoch.get();
        let _in_flight = InFlight::enter(&self.in_flight, epoch);
        self.countdown_secs.set(0);

        let sample = sample(&settings, sensor).await;
        if self.epoch.get() != epoch {
            debug!("Autolog: sample resolved after stop/restart, discarded");
            return Ok(TickOutcome::Discarded);
        }

        let estimate = match sample {
            Ok(estimate) => estimate,
            Err(e) => {
                warn!("Autolog: sample failed ({e}), retrying at next deadline");
                self.rearm(now, None);
                return Err(e);
            }
        };

        let delta = (estimate.liters - baseline.liters).abs();
        debug!(
            "Autolog: sample {:.2} L, baseline {:.2} L, delta {:.2} L",
            estimate.liters, baseline.liters, delta
        );

        let mut logged = None;
        let mut write_result = Ok(());
        if delta >= settings.autolog.min_change_liters {
            let entry = LogEntry {
                activity_type: if estimate.liters < baseline.liters {
                    ActivityType::Usage
                } else {
                    ActivityType::Refill
                },
                amount_liters: round2(delta),
                timestamp: now,
            };
            write_result = log_port.write(&entry).await;
            if self.epoch.get() != epoch {
                debug!("Autolog: stopped during log write, not rearming");
                return Ok(TickOutcome::Discarded);
            }
            match write_result {
                Ok(()) => {
                    info!(
                        "Autolog: logged {:?} of {:.2} L",
                        entry.activity_type, entry.amount_liters
                    );
                    logged = Some(entry);
                }
                Err(e) => warn!("Autolog: {e}, baseline still advances"),
            }
        }

        self.rearm(
            now,
            Some(AutologBaseline {
                liters: estimate.liters,
                captured_at: now,
            }),
        );
        self.last_sample_at.set(Some(now));

        write_result.map(|()| TickOutcome::Sampled {
            liters: estimate.liters,
            logged,
        })
    }

    /// Disarm and forget the baseline.  Idempotent.
    pub fn stop(&self) {
        self.epoch.set(self.epoch.get().wrapping_add(1));
        if self.armed.borrow_mut().take().is_some() {
            info!("Autolog: stopped");
        }
        self.countdown_secs.set(0);
    }

    /// React to a new settings snapshot: always tear down, re-arm when enabled.
    pub async fn on_settings_changed(
        &self,
        settings: &TankSettings,
        sensor: &impl SensorPort,
        clock: &impl Clock,
    ) -> Result<()> {
        self.stop();
        if settings.autolog.enabled {
            self.start(settings, sensor, clock).await
        } else {
            Ok(())
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> AutologState {
        if self.armed.borrow().is_some() {
            AutologState::Armed
        } else {
            AutologState::Stopped
        }
    }

    pub fn status(&self) -> AutologStatus {
        AutologStatus {
            state: self.state(),
            countdown_secs: self.countdown_secs.get(),
            last_sample_at: self.last_sample_at.get(),
        }
    }

    pub fn baseline(&self) -> Option<AutologBaseline> {
        self.armed.borrow().as_ref().map(|a| a.baseline)
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.armed.borrow().as_ref().map(|a| a.deadline)
    }

    // ── Internal ──────────────────────────────────────────────

    fn rearm(&self, now: DateTime<Utc>, baseline: Option<AutologBaseline>) {
        if let Some(armed) = self.armed.borrow_mut().as_mut() {
            if let Some(baseline) = baseline {
                armed.baseline = baseline;
            }
            let interval = armed.settings.autolog.interval();
            armed.deadline = now + interval;
            self.countdown_secs.set(ceil_secs(interval));
        }
    }
}

async fn sample(settings: &TankSettings, sensor: &impl SensorPort) -> Result<VolumeEstimate> {
    let reading = sensor.read().await?;
    level::estimate(settings, &reading)
}

/// Whole seconds remaining, rounded up so the display never shows 00:00 early.
fn ceil_secs(d: chrono::Duration) -> u64 {
    let ms = d.num_milliseconds().max(0);
    ((ms + 999) / 1000) as u64
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
