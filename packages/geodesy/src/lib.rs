#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spherical-earth geometry used by the risk engine.
//!
//! All points are [`geo::Point`]s in `(longitude, latitude)` order, matching
//! the `geo` convention (`x` = longitude, `y` = latitude). Distances are in
//! kilometres on a sphere of radius [`EARTH_RADIUS_KM`].

use geo::{Coord, Line, Point};

/// Mean earth radius used for every distance computation.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle (haversine) distance between two points, in kilometres.
#[must_use]
pub fn haversine_km(a: Point<f64>, b: Point<f64>) -> f64 {
    Origin::new(a).distance_km(b)
}

/// Haversine distance from a single origin to many points in one pass.
///
/// The origin's trigonometric terms are computed once and reused for every
/// target, which is what the engine relies on when it measures a whole
/// catalog window against one query point.
#[must_use]
pub fn haversine_many_km<I>(origin: Point<f64>, points: I) -> Vec<f64>
where
    I: IntoIterator<Item = Point<f64>>,
{
    let origin = Origin::new(origin);
    points.into_iter().map(|p| origin.distance_km(p)).collect()
}

/// Distance from `p` to the closest point of `segment`, in kilometres.
///
/// The projection parameter is computed in raw longitude/latitude space
/// (no planar reprojection) and clamped to the segment, then the distance
/// to the clamped point is measured along the great circle. A zero-length
/// segment degenerates to the great-circle distance to its start point.
#[must_use]
pub fn point_to_segment_km(p: Point<f64>, segment: &Line<f64>) -> f64 {
    let Coord { x: x1, y: y1 } = segment.start;
    let delta = segment.delta();

    let len_sq = delta.x.mul_add(delta.x, delta.y * delta.y);
    if len_sq == 0.0 {
        return haversine_km(p, segment.start_point());
    }

    let t = (p.x() - x1)
        .mul_add(delta.x, (p.y() - y1) * delta.y)
        / len_sq;
    let t = t.clamp(0.0, 1.0);

    let closest = Point::new(t.mul_add(delta.x, x1), t.mul_add(delta.y, y1));
    haversine_km(p, closest)
}

/// Precomputed origin terms for repeated haversine evaluations.
#[derive(Debug, Clone, Copy)]
struct Origin {
    lon: f64,
    lat: f64,
    cos_lat: f64,
}

impl Origin {
    fn new(p: Point<f64>) -> Self {
        Self {
            lon: p.x(),
            lat: p.y(),
            cos_lat: p.y().to_radians().cos(),
        }
    }

    fn distance_km(&self, p: Point<f64>) -> f64 {
        let d_phi = (p.y() - self.lat).to_radians();
        let d_lambda = (p.x() - self.lon).to_radians();
        let half_phi = (d_phi / 2.0).sin();
        let half_lambda = (d_lambda / 2.0).sin();

        let a = (self.cos_lat * p.y().to_radians().cos())
            .mul_add(half_lambda * half_lambda, half_phi * half_phi);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }
}
