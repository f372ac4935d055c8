//! Settings model.
//!
//! Owns the single in-memory [`TankSettings`] snapshot.  Every change is
//! validated, then persisted through the [`SettingsPort`], and only then
//! replaces the snapshot.  A failed save leaves the previous snapshot in
//! place.

use log::{info, warn};

use crate::app::ports::SettingsPort;
use crate::config::{MAX_INTERVAL_MINUTES, TankSettings, ThresholdType};
use crate::error::{Error, Result};
use crate::geometry;

/// Check every [`TankSettings`] invariant.
///
/// Range checks reject rather than clamp.
pub fn validate(settings: &TankSettings) -> Result<()> {
    let capacity = geometry::capacity(settings).map_err(|e| match e {
        Error::InvalidDimensions(reason) => Error::InvalidSettings(reason),
        other => other,
    })?;
    if !capacity.is_finite() {
        return Err(Error::InvalidSettings("tank dimensions overflow the capacity"));
    }

    let threshold = settings.threshold_value;
    if !threshold.is_finite() {
        return Err(Error::InvalidSettings("threshold_value must be a number"));
    }
    match settings.threshold_type {
        ThresholdType::Percentage => {
            if !(0.0..=100.0).contains(&threshold) {
                return Err(Error::InvalidSettings(
                    "percentage threshold must be between 0 and 100",
                ));
            }
        }
        ThresholdType::Liters => {
            if !(0.0..=capacity).contains(&threshold) {
                return Err(Error::InvalidSettings(
                    "liter threshold must be between 0 and the tank capacity",
                ));
            }
        }
    }

    let autolog = &settings.autolog;
    if !(autolog.interval_minutes.is_finite() && autolog.interval_minutes > 0.0) {
        return Err(Error::InvalidSettings(
            "autolog interval_minutes must be positive",
        ));
    }
    if autolog.interval_minutes > MAX_INTERVAL_MINUTES {
        return Err(Error::InvalidSettings(
            "autolog interval must be at most one week",
        ));
    }
    if autolog.interval().num_seconds() < 1 {
        return Err(Error::InvalidSettings(
            "autolog interval must be at least one second",
        ));
    }
    // Log amounts are reported to 0.01 L; a smaller minimum would allow 0.00 L entries.
    if !(autolog.min_change_liters.is_finite() && autolog.min_change_liters >= 0.01) {
        return Err(Error::InvalidSettings(
            "autolog min_change_liters must be at least 0.01",
        ));
    }
    Ok(())
}

/// The live settings snapshot.
#[derive(Debug, Clone, Default)]
pub struct SettingsModel {
    current: TankSettings,
}

impl SettingsModel {
    /// Wrap an already-validated snapshot.
    pub fn new(settings: TankSettings) -> Result<Self> {
        validate(&settings)?;
        Ok(Self { current: settings })
    }

    /// Load the stored snapshot.  A stored snapshot that no longer validates
    /// is rejected rather than partially used.
    pub fn load(store: &impl SettingsPort) -> Result<Self> {
        let settings = store.load().map_err(|e| {
            warn!("Settings: load failed ({e})");
            Error::SettingsUnavailable
        })?;
        let model = Self::new(settings)?;
        info!("Settings: loaded ({:?} tank)", model.current.shape);
        Ok(model)
    }

    pub fn current(&self) -> &TankSettings {
        &self.current
    }

    /// Validate, persist, then replace the snapshot.
    pub fn apply(&mut self, new: TankSettings, store: &impl SettingsPort) -> Result<&TankSettings> {
        validate(&new)?;
        store.save(&new).map_err(|e| {
            warn!("Settings: save failed ({e}), keeping previous snapshot");
            Error::SettingsSaveFailed
        })?;
        self.current = new;
        info!("Settings: applied and persisted");
        Ok(&self.current)
    }
}
