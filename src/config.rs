//! Tank configuration parameters.
//!
//! The single [`TankSettings`] snapshot consumed by the geometry engine,
//! level estimator, threshold evaluator and autolog scheduler.  Loaded once
//! at startup from the settings store and persisted as a whole on every
//! change.  See [`crate::settings`] for validation and ownership.

use serde::{Deserialize, Serialize};

/// Physical shape of the tank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TankShape {
    Rectangular,
    Cylindrical,
}

/// Tank dimensions in centimeters.
///
/// Only the fields required by the configured [`TankShape`] are read:
/// rectangular tanks need `width_cm` and `length_cm`, cylindrical tanks
/// need `diameter_cm`.  `height_cm` is always required.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub height_cm: f64,
    pub width_cm: Option<f64>,
    pub length_cm: Option<f64>,
    pub diameter_cm: Option<f64>,
}

/// How `threshold_value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdType {
    /// Percent of capacity, 0–100.
    Percentage,
    /// Absolute liters, 0–capacity.
    Liters,
}

/// Auto-logging parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutologConfig {
    pub enabled: bool,
    /// Minutes between sample-and-compare cycles.
    pub interval_minutes: f64,
    /// Smallest level change (liters) that produces a log entry.
    pub min_change_liters: f64,
}

/// Complete tank configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankSettings {
    pub shape: TankShape,
    pub dimensions: Dimensions,
    pub threshold_type: ThresholdType,
    pub threshold_value: f64,
    pub notifications_enabled: bool,
    pub autolog: AutologConfig,
}

impl Default for TankSettings {
    fn default() -> Self {
        Self {
            shape: TankShape::Rectangular,
            dimensions: Dimensions {
                height_cm: 15.0,
                width_cm: Some(12.0),
                length_cm: Some(16.5),
                diameter_cm: Some(12.0),
            },
            threshold_type: ThresholdType::Percentage,
            threshold_value: 20.0,
            notifications_enabled: true,
            autolog: AutologConfig {
                enabled: false,
                interval_minutes: 5.0,
                min_change_liters: 1.0,
            },
        }
    }
}

/// Longest accepted autolog interval: one week.
pub const MAX_INTERVAL_MINUTES: f64 = 7.0 * 24.0 * 60.0;

impl AutologConfig {
    /// Sampling interval as a chrono duration (millisecond resolution),
    /// capped at [`MAX_INTERVAL_MINUTES`].
    pub fn interval(&self) -> chrono::Duration {
        let minutes = self.interval_minutes.clamp(0.0, MAX_INTERVAL_MINUTES);
        chrono::Duration::milliseconds((minutes * 60_000.0).round() as i64)
    }
}
