//! Synthetic catalog shared by the backtest tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use seismiq_catalog::Catalog;
use seismiq_catalog_models::Event;
use seismiq_faults::{FaultRegistry, FaultSegment};

pub fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// M5.6 events every 200 days from 2000 through 2011 at (39.4, 35.0).
///
/// They sit just outside the analysis radius of (38.0, 35.0), so they never
/// change its score, but they do fall inside its ±1.5° confirmation box.
pub fn heartbeat() -> Vec<Event> {
    let start = day(2000, 1, 1);
    (0..22)
        .map(|i| Event::new(start + Duration::days(200 * i), 39.4, 35.0, 5.6))
        .collect()
}

pub fn catalog_with(extra: Vec<Event>) -> Catalog {
    let mut events = heartbeat();
    events.extend(extra);
    Catalog::new(events).unwrap()
}

/// An east-west fault through (38.0, 35.0).
pub fn faults() -> FaultRegistry {
    FaultRegistry::from_segments(vec![FaultSegment::new(
        "Test Fault",
        (38.0, 34.0),
        (38.0, 36.0),
    )])
}
