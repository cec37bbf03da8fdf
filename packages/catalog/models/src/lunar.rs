//! Lunar phase tagging.
//!
//! The phase is approximated from a fixed reference new moon and the mean
//! synodic month. No ephemeris is consulted; the result is a pure function
//! of the timestamp.

use chrono::{DateTime, TimeZone, Utc};

/// Mean length of the synodic month in days.
pub const SYNODIC_PERIOD_DAYS: f64 = 29.530_59;

/// Start of the full-moon window, in days since new moon (inclusive).
pub const FULL_MOON_START_DAY: f64 = 13.5;

/// End of the full-moon window, in days since new moon (inclusive).
pub const FULL_MOON_END_DAY: f64 = 16.5;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Reference new moon: 1988-12-09 01:39:00 UTC.
#[must_use]
pub fn reference_new_moon() -> DateTime<Utc> {
    Utc.timestamp_opt(597_634_740, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Days elapsed since the most recent new moon, in `[0, SYNODIC_PERIOD_DAYS)`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn phase_day(timestamp: DateTime<Utc>) -> f64 {
    let elapsed = timestamp - reference_new_moon();
    let days = elapsed.num_milliseconds() as f64 / MILLIS_PER_DAY;
    days.rem_euclid(SYNODIC_PERIOD_DAYS)
}

/// Whether `timestamp` falls in the full-moon window.
#[must_use]
pub fn is_near_full_moon(timestamp: DateTime<Utc>) -> bool {
    (FULL_MOON_START_DAY..=FULL_MOON_END_DAY).contains(&phase_day(timestamp))
}
