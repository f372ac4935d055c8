//! Manual journal entries and journal queries.
//!
//! Autolog writes entries on its own; the operator can also record a usage
//! or refill by hand and list the journal filtered by activity type and by
//! an inclusive range of calendar days.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::error::{Error, Result};
use crate::level::round2;
use crate::scheduler::{ActivityType, LogEntry};

/// Build a hand-entered log entry.
///
/// The amount is stored to 0.01 L and must be positive at that precision.
pub fn manual_entry(
    activity_type: ActivityType,
    amount_liters: f64,
    now: DateTime<Utc>,
) -> Result<LogEntry> {
    if !amount_liters.is_finite() {
        return Err(Error::InvalidAmount("amount must be a number"));
    }
    let amount_liters = round2(amount_liters);
    if amount_liters <= 0.0 {
        return Err(Error::InvalidAmount("amount must be greater than zero"));
    }
    Ok(LogEntry {
        activity_type,
        amount_liters,
        timestamp: now,
    })
}

/// Which entries [`filter`] keeps.  Empty fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub activity_type: Option<ActivityType>,
    /// First day included.
    pub from: Option<NaiveDate>,
    /// Last day included; defaults to `from` when only `from` is set.
    pub to: Option<NaiveDate>,
}

impl LogFilter {
    /// Whether `entry` passes, with calendar days taken in `tz`.
    pub fn matches<Tz: TimeZone>(&self, entry: &LogEntry, tz: &Tz) -> bool {
        if self.activity_type.is_some_and(|kind| kind != entry.activity_type) {
            return false;
        }
        let day = entry.timestamp.with_timezone(tz).date_naive();
        let last = self.to.or(self.from);
        self.from.is_none_or(|from| day >= from) && last.is_none_or(|to| day <= to)
    }
}

/// Matching entries, newest first.
pub fn filter<'a, Tz: TimeZone>(
    entries: impl IntoIterator<Item = &'a LogEntry>,
    query: &LogFilter,
    tz: &Tz,
) -> Vec<&'a LogEntry> {
    let mut kept: Vec<&LogEntry> = entries
        .into_iter()
        .filter(|entry| query.matches(entry, tz))
        .collect();
    kept.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    kept
}
