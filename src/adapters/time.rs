//! System clock adapter.
//!
//! Implements [`Clock`] with the host's wall clock.  Tests inject a manual
//! clock instead.

use chrono::{DateTime, Utc};

use crate::app::ports::Clock;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
