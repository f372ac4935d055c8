//! Tank Watch core library.
//!
//! Level estimation, threshold alerts and the autolog scheduler for a
//! water tank monitored by a top-mounted distance sensor.  Exposes the
//! pure-logic modules for integration testing; all I/O lives behind the
//! port traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod driver;
pub mod geometry;
pub mod journal;
pub mod level;
pub mod scheduler;
pub mod settings;
pub mod threshold;
pub mod usage;

mod error;

// Links the std time driver that `async_io_mini::Timer` schedules against.
use embassy_time as _;

pub use error::{Error, Result, StartFailure};
