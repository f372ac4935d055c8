//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the tank monitor: settings
//! ownership, level estimation, threshold alerts, and the autolog scheduler.
//! All interaction with stores and sensors happens through **port traits**
//! defined in [`ports`], keeping this layer fully testable without real I/O.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
