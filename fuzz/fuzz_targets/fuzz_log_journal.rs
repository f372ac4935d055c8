//! Fuzz target: logs.jsonl entries and usage summaries
//!
//! Feeds arbitrary bytes as a JSON-lines journal.  Lines that parse are
//! summarized; the summary must never panic and usage totals are never
//! negative when every parsed amount is non-negative.
//!
//! cargo fuzz run fuzz_log_journal

#![no_main]

use chrono::Utc;
use libfuzzer_sys::fuzz_target;
use tankwatch::scheduler::LogEntry;
use tankwatch::usage;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let entries: Vec<LogEntry> = text
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect();

    let now = Utc::now();
    let summary = usage::summarize(&entries, &now);
    let _ = usage::usage_by_weekday(&entries, &now);

    let all_finite_non_negative = entries
        .iter()
        .all(|e| e.amount_liters.is_finite() && e.amount_liters >= 0.0);
    if all_finite_non_negative {
        assert!(summary.daily >= 0.0 && summary.weekly >= 0.0 && summary.monthly >= 0.0);
    }
});
