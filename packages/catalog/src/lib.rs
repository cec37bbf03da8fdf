#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory earthquake catalog.
//!
//! The catalog is built once from loader output, bulk-loads an R-tree over
//! the epicentres, and is then shared read-only by every engine, scanner and
//! backtest call. Box queries go through the R-tree; distance-annotated
//! candidate sets are produced by [`Catalog::window`].

pub mod loader;
pub mod window;

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use rstar::{AABB, RTree, RTreeObject};
use seismiq_catalog_models::Event;
use thiserror::Error;

pub use window::{Window, WindowEntry};

/// Errors that can occur while building or loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Reading the catalog file failed.
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog holds no events, so nothing can be scored.
    #[error("Catalog is empty")]
    Empty,
}

/// An epicentre stored in the R-tree, pointing back into the event list.
struct Epicentre {
    index: usize,
    position: [f64; 2],
}

impl RTreeObject for Epicentre {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

/// Immutable earthquake catalog with a spatial index.
///
/// Constructed once and passed by reference everywhere. Never mutated after
/// construction, so it is freely shareable across worker threads.
pub struct Catalog {
    events: Vec<Event>,
    index: RTree<Epicentre>,
    first: DateTime<Utc>,
    last: DateTime<Utc>,
}

impl Catalog {
    /// Builds a catalog and its spatial index.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Empty`] if `events` is empty. An empty
    /// catalog is a fatal precondition, not a valid zero-event input.
    pub fn new(events: Vec<Event>) -> Result<Self, CatalogError> {
        let (Some(first), Some(last)) = (
            events.iter().map(|e| e.timestamp).min(),
            events.iter().map(|e| e.timestamp).max(),
        ) else {
            return Err(CatalogError::Empty);
        };

        let entries = events
            .iter()
            .enumerate()
            .map(|(index, e)| Epicentre {
                index,
                position: [e.longitude, e.latitude],
            })
            .collect();
        let index = RTree::bulk_load(entries);

        log::info!(
            "Indexed {} catalog events spanning {} to {}",
            events.len(),
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d"),
        );

        Ok(Self {
            events,
            index,
            first,
            last,
        })
    }

    /// All events, in load order.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of events in the catalog.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.events.len()
    }

    /// Always `false`; construction rejects empty catalogs.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Origin time of the earliest event.
    #[must_use]
    pub const fn first_timestamp(&self) -> DateTime<Utc> {
        self.first
    }

    /// Origin time of the latest event.
    #[must_use]
    pub const fn last_timestamp(&self) -> DateTime<Utc> {
        self.last
    }

    /// Events whose epicentre lies within `half_width_deg` of the given
    /// point in both latitude and longitude (bounds inclusive).
    ///
    /// Results are returned in load order regardless of R-tree layout.
    #[must_use]
    pub fn in_box(&self, lat: f64, lon: f64, half_width_deg: f64) -> Vec<&Event> {
        let envelope = AABB::from_corners(
            [lon - half_width_deg, lat - half_width_deg],
            [lon + half_width_deg, lat + half_width_deg],
        );

        let mut indices: Vec<usize> = self
            .index
            .locate_in_envelope(&envelope)
            .map(|e| e.index)
            .collect();
        indices.sort_unstable();

        indices.into_iter().map(|i| &self.events[i]).collect()
    }

    /// Box query around a point, annotated with great-circle distances.
    ///
    /// No time filter is applied here; see [`Window::until`].
    #[must_use]
    pub fn window(&self, lat: f64, lon: f64, half_width_deg: f64) -> Window<'_> {
        Window::new(geo::Point::new(lon, lat), self.in_box(lat, lon, half_width_deg))
    }

    /// Every event within `radius_km` of the point whose origin time is at
    /// or before `now`, newest first. Events with equal origin times keep
    /// load order.
    ///
    /// Unlike [`Self::window`] this measures the whole catalog, so the
    /// radius is not limited by any bounding box.
    #[must_use]
    pub fn history(
        &self,
        lat: f64,
        lon: f64,
        radius_km: f64,
        now: DateTime<Utc>,
    ) -> Vec<WindowEntry<'_>> {
        let visible: Vec<&Event> = self.events.iter().filter(|e| e.timestamp <= now).collect();
        let distances = seismiq_geodesy::haversine_many_km(
            geo::Point::new(lon, lat),
            visible.iter().map(|e| e.point()),
        );

        let mut entries: Vec<WindowEntry<'_>> = visible
            .into_iter()
            .zip(distances)
            .filter(|(_, distance_km)| *distance_km <= radius_km)
            .map(|(event, distance_km)| WindowEntry { event, distance_km })
            .collect();
        entries.sort_by_key(|e| Reverse(e.event.timestamp));

        log::debug!(
            "{} events within {radius_km} km of ({lat:.2}, {lon:.2}) up to {}",
            entries.len(),
            now.format("%Y-%m-%d")
        );
        entries
    }
}
