//! Threshold evaluator.
//!
//! [`is_below_threshold`] is pure: it compares the current estimate with the
//! configured alert threshold and reports a boolean.  How the alert is
//! surfaced (banner, audible alarm) is the caller's business.
//!
//! [`ThresholdMonitor`] latches the last result so the service can react to
//! edges only:
//!
//! 1. The level drops below the threshold → `Entered` (alarm once).
//! 2. Every further evaluation while below → no transition.
//! 3. The level recovers → `Cleared`.

use log::{info, warn};

use crate::config::{TankSettings, ThresholdType};
use crate::error::{Error, Result};
use crate::level::VolumeEstimate;

/// Whether the estimated level is below the configured alert threshold.
pub fn is_below_threshold(settings: &TankSettings, estimate: &VolumeEstimate) -> Result<bool> {
    if estimate.capacity_liters.is_nan() || estimate.capacity_liters <= 0.0 {
        return Err(Error::InvalidDimensions("capacity must be positive"));
    }
    Ok(match settings.threshold_type {
        ThresholdType::Percentage => {
            estimate.liters / estimate.capacity_liters * 100.0 < settings.threshold_value
        }
        ThresholdType::Liters => estimate.liters < settings.threshold_value,
    })
}

/// Edge reported by [`ThresholdMonitor::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdTransition {
    Entered,
    Cleared,
}

/// Latched alert state.
#[derive(Debug, Default)]
pub struct ThresholdMonitor {
    below: bool,
}

impl ThresholdMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the latest evaluation; returns a transition on edges only.
    pub fn update(&mut self, below: bool) -> Option<ThresholdTransition> {
        match (self.below, below) {
            (false, true) => {
                self.below = true;
                warn!("THRESHOLD: level below alert threshold");
                Some(ThresholdTransition::Entered)
            }
            (true, false) => {
                self.below = false;
                info!("THRESHOLD: level recovered");
                Some(ThresholdTransition::Cleared)
            }
            _ => None,
        }
    }

    /// True while the level is latched below threshold.
    pub fn is_below(&self) -> bool {
        self.below
    }

    /// Forget the latched state (e.g. after the threshold itself changed).
    pub fn reset(&mut self) {
        self.below = false;
    }
}
