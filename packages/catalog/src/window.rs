//! Distance-annotated candidate sets around a query point.

use chrono::{DateTime, Utc};
use geo::Point;
use seismiq_catalog_models::Event;
use serde::Serialize;

/// A catalog event paired with its distance to the query point.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowEntry<'a> {
    /// The event.
    #[serde(flatten)]
    pub event: &'a Event,
    /// Great-circle distance from the query point, in kilometres.
    pub distance_km: f64,
}

/// Events inside a bounding box around a query point.
///
/// Distances are computed once, in a single batched pass, when the window
/// is built. A window can be re-filtered for any number of reference times
/// without touching the catalog again.
#[derive(Debug, Clone)]
pub struct Window<'a> {
    entries: Vec<WindowEntry<'a>>,
}

impl<'a> Window<'a> {
    pub(crate) fn new(origin: Point<f64>, events: Vec<&'a Event>) -> Self {
        let distances = seismiq_geodesy::haversine_many_km(origin, events.iter().map(|e| e.point()));

        let entries = events
            .into_iter()
            .zip(distances)
            .map(|(event, distance_km)| WindowEntry { event, distance_km })
            .collect();

        Self { entries }
    }

    /// All entries, regardless of time.
    #[must_use]
    pub fn entries(&self) -> &[WindowEntry<'a>] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the box contained no events at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose origin time is at or before `now`.
    #[must_use]
    pub fn until(&self, now: DateTime<Utc>) -> Vec<WindowEntry<'a>> {
        self.entries
            .iter()
            .filter(|e| e.event.timestamp <= now)
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn time_filter_is_inclusive() {
        let at = Utc.with_ymd_and_hms(2010, 3, 8, 2, 32, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2011, 10, 23, 10, 41, 0).unwrap();
        let events = [
            Event::new(at, 38.8, 40.1, 6.0),
            Event::new(later, 38.7, 43.4, 7.2),
        ];

        let window = Window::new(Point::new(40.0, 38.8), events.iter().collect());
        assert_eq!(window.len(), 2);
        assert_eq!(window.until(at).len(), 1);
        assert_eq!(window.until(later).len(), 2);
        assert!(window.until(at - chrono::Duration::seconds(1)).is_empty());
    }
}
