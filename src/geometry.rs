//! Geometry engine.
//!
//! Pure functions converting tank shape and dimensions into liters.
//! All dimensions are centimeters; 1 L = 1000 cm³.

use core::f64::consts::PI;

use crate::config::{TankSettings, TankShape};
use crate::error::{Error, Result};

const CM3_PER_LITER: f64 = 1000.0;

/// Total capacity of the tank in liters.
pub fn capacity(settings: &TankSettings) -> Result<f64> {
    let height = tank_height(settings)?;
    Ok(base_area_cm2(settings)? * height / CM3_PER_LITER)
}

/// Volume in liters held at the given fill height.
///
/// `filled_height_cm` is clamped to `[0, height]`, so a negative fill or an
/// overflow reading never yields a negative or over-capacity volume.
pub fn volume_from_fill_height(settings: &TankSettings, filled_height_cm: f64) -> Result<f64> {
    let height = tank_height(settings)?;
    let area = base_area_cm2(settings)?;
    // NaN fill height is treated as empty rather than propagated.
    let filled = if filled_height_cm.is_nan() {
        0.0
    } else {
        filled_height_cm.clamp(0.0, height)
    };
    Ok(area * filled / CM3_PER_LITER)
}

/// Validated tank height.
pub(crate) fn tank_height(settings: &TankSettings) -> Result<f64> {
    positive(Some(settings.dimensions.height_cm), "height must be a positive number")
}

fn base_area_cm2(settings: &TankSettings) -> Result<f64> {
    let dims = &settings.dimensions;
    match settings.shape {
        TankShape::Rectangular => {
            let width = positive(dims.width_cm, "rectangular tank needs a positive width")?;
            let length = positive(dims.length_cm, "rectangular tank needs a positive length")?;
            Ok(width * length)
        }
        TankShape::Cylindrical => {
            let diameter =
                positive(dims.diameter_cm, "cylindrical tank needs a positive diameter")?;
            let radius = diameter / 2.0;
            Ok(PI * radius * radius)
        }
    }
}

fn positive(value: Option<f64>, reason: &'static str) -> Result<f64> {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(Error::InvalidDimensions(reason)),
    }
}
