//! Usage summaries over the log journal.
//!
//! Only `Usage` entries count; refills are ignored.  Weeks start on Monday.

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone};

use crate::level::round2;
use crate::scheduler::{ActivityType, LogEntry};

/// Liters used today, this week and this month.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageSummary {
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
}

/// Sum usage for the day, Monday-first week and calendar month containing
/// `now`, with calendar boundaries taken in `now`'s time zone.
pub fn summarize<'a, Tz: TimeZone>(
    entries: impl IntoIterator<Item = &'a LogEntry>,
    now: &DateTime<Tz>,
) -> UsageSummary {
    let tz = now.timezone();
    let today = now.date_naive();
    let week_start = monday_of(today);
    let mut sum = UsageSummary::default();

    for entry in entries {
        if entry.activity_type != ActivityType::Usage {
            continue;
        }
        let day = entry.timestamp.with_timezone(&tz).date_naive();
        if day == today {
            sum.daily += entry.amount_liters;
        }
        if monday_of(day) == week_start {
            sum.weekly += entry.amount_liters;
        }
        if day.year() == today.year() && day.month() == today.month() {
            sum.monthly += entry.amount_liters;
        }
    }

    UsageSummary {
        daily: round2(sum.daily),
        weekly: round2(sum.weekly),
        monthly: round2(sum.monthly),
    }
}

/// Usage per weekday of the current week, index 0 = Monday.
pub fn usage_by_weekday<'a, Tz: TimeZone>(
    entries: impl IntoIterator<Item = &'a LogEntry>,
    now: &DateTime<Tz>,
) -> [f64; 7] {
    let tz = now.timezone();
    let week_start = monday_of(now.date_naive());
    let mut days = [0.0; 7];

    for entry in entries {
        if entry.activity_type != ActivityType::Usage {
            continue;
        }
        let day = entry.timestamp.with_timezone(&tz).date_naive();
        let offset = (day - week_start).num_days();
        if (0..7).contains(&offset) {
            days[offset as usize] += entry.amount_liters;
        }
    }

    days.map(round2)
}

fn monday_of(day: NaiveDate) -> NaiveDate {
    let back = u64::from(day.weekday().num_days_from_monday());
    day.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN)
}
