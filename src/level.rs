//! Level estimator.
//!
//! Converts a distance-to-surface reading (ultrasonic sensor mounted at the
//! top of the tank) into a fill height and then a volume.  Stateless: the
//! same settings and reading always produce the same estimate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::TankSettings;
use crate::error::{Error, Result};
use crate::geometry;

/// One sensor sample, produced by the external ingest path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Distance from the sensor to the water surface.
    pub distance_cm: f64,
    pub temperature_c: f64,
    pub timestamp: DateTime<Utc>,
}

/// Derived volume; recomputed on every call, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeEstimate {
    pub liters: f64,
    pub capacity_liters: f64,
    pub filled_height_cm: f64,
}

impl VolumeEstimate {
    /// Fill level as a percentage of capacity.
    pub fn percent(&self) -> f64 {
        self.liters / self.capacity_liters * 100.0
    }

    /// Liters rounded for display and log entries.
    pub fn rounded_liters(&self) -> f64 {
        round2(self.liters)
    }
}

/// Estimate the current volume from a raw reading.
pub fn estimate(settings: &TankSettings, reading: &SensorReading) -> Result<VolumeEstimate> {
    if !reading.distance_cm.is_finite() {
        return Err(Error::SensorUnavailable);
    }
    let height = geometry::tank_height(settings)?;
    let filled_height_cm = (height - reading.distance_cm).clamp(0.0, height);
    let liters = geometry::volume_from_fill_height(settings, filled_height_cm)?;
    let capacity_liters = geometry::capacity(settings)?;
    Ok(VolumeEstimate {
        liters,
        capacity_liters,
        filled_height_cm,
    })
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
