//! Fuzz target: settings.json parsing, validation and estimation
//!
//! Any snapshot that deserializes and validates must describe a tank with a
//! finite positive capacity, and estimating a level from it must never
//! panic or leave `[0, capacity]`.
//!
//! cargo fuzz run fuzz_settings_json

#![no_main]

use chrono::{DateTime, Utc};
use libfuzzer_sys::fuzz_target;
use tankwatch::config::TankSettings;
use tankwatch::level::{self, SensorReading};
use tankwatch::{geometry, settings, threshold};

fuzz_target!(|data: &[u8]| {
    let Ok(parsed) = serde_json::from_slice::<TankSettings>(data) else {
        return;
    };
    if settings::validate(&parsed).is_err() {
        return;
    }

    let cap = geometry::capacity(&parsed).expect("validated settings have a capacity");
    assert!(cap.is_finite() && cap > 0.0, "capacity {cap}");

    // Reuse the tail of the input as a distance so the fuzzer can steer it.
    let mut raw = [0u8; 8];
    let n = data.len().min(8);
    raw[..n].copy_from_slice(&data[data.len() - n..]);
    let reading = SensorReading {
        distance_cm: f64::from_le_bytes(raw),
        temperature_c: 20.0,
        timestamp: DateTime::<Utc>::UNIX_EPOCH,
    };
    if let Ok(est) = level::estimate(&parsed, &reading) {
        assert!(est.liters >= 0.0 && est.liters <= est.capacity_liters);
        let _ = threshold::is_below_threshold(&parsed, &est);
    }
});
