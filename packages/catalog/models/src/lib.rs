#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Earthquake catalog record types.
//!
//! An [`Event`] is a single catalog row: origin time, epicentre and
//! magnitude. The full-moon flag used by the lunar-correlation heuristic is
//! derived once when the event is constructed and never recomputed.

pub mod lunar;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single earthquake from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Origin time.
    pub timestamp: DateTime<Utc>,
    /// Epicentre latitude in decimal degrees.
    pub latitude: f64,
    /// Epicentre longitude in decimal degrees.
    pub longitude: f64,
    /// Magnitude (largest reported scale).
    pub magnitude: f64,
    /// Whether the origin time falls inside the full-moon window.
    full_moon: bool,
}

impl Event {
    /// Creates an event and tags its lunar phase.
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, latitude: f64, longitude: f64, magnitude: f64) -> Self {
        Self {
            timestamp,
            latitude,
            longitude,
            magnitude,
            full_moon: lunar::is_near_full_moon(timestamp),
        }
    }

    /// Whether this event occurred near a full moon.
    #[must_use]
    pub const fn full_moon(&self) -> bool {
        self.full_moon
    }

    /// Epicentre as a `geo` point (`x` = longitude, `y` = latitude).
    #[must_use]
    pub fn point(&self) -> geo::Point<f64> {
        geo::Point::new(self.longitude, self.latitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn flag_is_derived_on_construction() {
        let near_full = Utc.with_ymd_and_hms(1988, 12, 23, 1, 39, 0).unwrap();
        let new_moon = Utc.with_ymd_and_hms(1988, 12, 9, 1, 39, 0).unwrap();

        assert!(Event::new(near_full, 38.0, 35.0, 4.1).full_moon());
        assert!(!Event::new(new_moon, 38.0, 35.0, 4.1).full_moon());
    }

    #[test]
    fn point_is_lon_lat() {
        let ts = Utc.with_ymd_and_hms(2020, 1, 24, 17, 55, 0).unwrap();
        let p = Event::new(ts, 38.39, 39.08, 6.8).point();
        assert!((p.x() - 39.08).abs() < f64::EPSILON);
        assert!((p.y() - 38.39).abs() < f64::EPSILON);
    }
}
