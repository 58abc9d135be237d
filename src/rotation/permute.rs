//! Day-seeded deterministic permutation.
//!
//! The daily rotation order is a pure function of the quote list and the
//! day-epoch seed: a Fisher-Yates walk whose per-step index is the fixed
//! recurrence `(seed + i) mod (i + 1)` instead of a random draw. This is an
//! intentionally weak pseudo-permutation keyed only by the calendar day -
//! same day, same order. Do not replace it with a real PRNG; identical
//! ordering across reloads within a day is a product requirement.

use chrono::{DateTime, Local, NaiveTime, TimeZone};

/// Seed for the current calendar day: epoch milliseconds of local midnight.
pub fn day_seed(now: DateTime<Local>) -> i64 {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&midnight).earliest() {
        Some(dt) => dt.timestamp_millis(),
        // Midnight skipped by a DST transition; interpret as UTC so the
        // seed stays a pure function of the calendar day.
        None => midnight.and_utc().timestamp_millis(),
    }
}

/// Permute `items` in place using the day seed.
pub fn permute<T>(items: &mut [T], seed: i64) {
    if items.len() < 2 {
        return;
    }
    for i in (1..items.len()).rev() {
        // rem_euclid keeps the index non-negative for pre-epoch clocks
        let j = (seed + i as i64).rem_euclid(i as i64 + 1) as usize;
        items.swap(i, j);
    }
}
