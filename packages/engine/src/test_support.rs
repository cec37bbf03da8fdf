//! Fixtures shared by the engine tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use seismiq_catalog::Catalog;
use seismiq_catalog_models::{
    Event,
    lunar::{SYNODIC_PERIOD_DAYS, phase_day},
};
use seismiq_faults::{FaultRegistry, FaultSegment};

/// Query point used throughout the tests.
pub const ORIGIN: (f64, f64) = (38.0, 35.0);

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

/// The latest instant at or before `base` whose lunar phase day is `phase`.
#[allow(clippy::cast_possible_truncation)]
pub fn at_phase(base: DateTime<Utc>, phase: f64) -> DateTime<Utc> {
    let back_days = (phase_day(base) - phase).rem_euclid(SYNODIC_PERIOD_DAYS);
    base - Duration::seconds((back_days * 86_400.0) as i64)
}

/// An event `dlat` degrees north of [`ORIGIN`].
pub fn quake(timestamp: DateTime<Utc>, dlat: f64, magnitude: f64) -> Event {
    Event::new(timestamp, ORIGIN.0 + dlat, ORIGIN.1, magnitude)
}

pub fn catalog_of(events: Vec<Event>) -> Catalog {
    Catalog::new(events).unwrap()
}

/// A single segment passing through [`ORIGIN`].
pub fn registry_through_origin() -> FaultRegistry {
    FaultRegistry::from_segments(vec![FaultSegment::new(
        "Origin Fault",
        (ORIGIN.0, ORIGIN.1 - 1.0),
        (ORIGIN.0, ORIGIN.1 + 1.0),
    )])
}

/// A single segment nowhere near [`ORIGIN`].
pub fn far_registry() -> FaultRegistry {
    FaultRegistry::from_segments(vec![FaultSegment::new(
        "Distant Fault",
        (30.0, 10.0),
        (30.0, 11.0),
    )])
}
