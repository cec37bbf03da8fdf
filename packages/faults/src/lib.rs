#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Active fault traces and nearest-fault resolution.
//!
//! The built-in registry is a TOML file embedded at compile time (see
//! `data/active_faults.toml`). Each fault is a single straight segment
//! between two `[latitude, longitude]` endpoints. Alternative registries can
//! be parsed from any TOML string with the same layout.

use geo::{Coord, Line, Point};
use serde::Deserialize;
use thiserror::Error;

/// Fault context reported for points outside every fault buffer.
pub const FAR_FROM_FAULTS: &str = "far from known faults";

/// Segments whose midpoint latitude is further than this from the query
/// latitude are skipped before any distance is computed.
pub const LATITUDE_PREFILTER_DEG: f64 = 2.5;

const BUILTIN_TOML: &str = include_str!("../data/active_faults.toml");

/// Errors that can occur while parsing a fault registry.
#[derive(Debug, Error)]
pub enum FaultError {
    /// The TOML document is malformed.
    #[error("Invalid fault registry: {0}")]
    Parse(#[from] toml::de::Error),

    /// The registry defines no segments.
    #[error("Fault registry defines no segments")]
    Empty,
}

/// A named fault trace.
#[derive(Debug, Clone, PartialEq)]
pub struct FaultSegment {
    /// Human-readable fault name.
    pub name: String,
    /// Trace geometry (`x` = longitude, `y` = latitude).
    pub line: Line<f64>,
}

impl FaultSegment {
    /// Creates a segment from `(latitude, longitude)` endpoints.
    #[must_use]
    pub fn new(name: impl Into<String>, a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            name: name.into(),
            line: Line::new(Coord { x: a.1, y: a.0 }, Coord { x: b.1, y: b.0 }),
        }
    }

    /// Latitude of the segment midpoint.
    #[must_use]
    pub const fn mid_latitude(&self) -> f64 {
        f64::midpoint(self.line.start.y, self.line.end.y)
    }
}

/// Result of a nearest-fault lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FaultProximity<'a> {
    /// The point lies within the buffer of `segment`.
    OnFault {
        /// Closest segment.
        segment: &'a FaultSegment,
        /// Distance to it, in kilometres.
        distance_km: f64,
    },
    /// No segment is within the buffer.
    Far,
}

impl FaultProximity<'_> {
    /// Whether the point is inside a fault buffer.
    #[must_use]
    pub const fn is_on_fault(&self) -> bool {
        matches!(self, Self::OnFault { .. })
    }

    /// Fault name when on a fault, otherwise [`FAR_FROM_FAULTS`].
    #[must_use]
    pub fn context(&self) -> &str {
        match self {
            Self::OnFault { segment, .. } => &segment.name,
            Self::Far => FAR_FROM_FAULTS,
        }
    }
}

#[derive(Deserialize)]
struct RegistryFile {
    segment: Vec<SegmentEntry>,
}

#[derive(Deserialize)]
struct SegmentEntry {
    name: String,
    a: [f64; 2],
    b: [f64; 2],
}

/// Immutable set of fault segments.
#[derive(Debug, Clone)]
pub struct FaultRegistry {
    segments: Vec<FaultSegment>,
}

impl FaultRegistry {
    /// The embedded registry of Turkey's major active faults.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (this is a compile-time
    /// guarantee since the file is embedded and covered by tests).
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_toml_str(BUILTIN_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse built-in fault registry: {e}"))
    }

    /// Parses a registry from a TOML document of `[[segment]]` tables.
    ///
    /// # Errors
    ///
    /// Returns [`FaultError::Parse`] for malformed TOML and
    /// [`FaultError::Empty`] if no segments are defined.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, FaultError> {
        let file: RegistryFile = toml::de::from_str(toml_str)?;
        let segments: Vec<FaultSegment> = file
            .segment
            .into_iter()
            .map(|s| FaultSegment::new(s.name, (s.a[0], s.a[1]), (s.b[0], s.b[1])))
            .collect();

        if segments.is_empty() {
            return Err(FaultError::Empty);
        }

        log::debug!("Loaded {} fault segments", segments.len());
        Ok(Self { segments })
    }

    /// Builds a registry from explicit segments.
    #[must_use]
    pub const fn from_segments(segments: Vec<FaultSegment>) -> Self {
        Self { segments }
    }

    /// All segments in registry order.
    #[must_use]
    pub fn segments(&self) -> &[FaultSegment] {
        &self.segments
    }

    /// Closest segment to a point and its distance, after the latitude
    /// pre-filter. `None` when every segment was filtered out.
    ///
    /// Ties keep the segment listed first.
    #[must_use]
    pub fn nearest(&self, lat: f64, lon: f64) -> Option<(&FaultSegment, f64)> {
        let point = Point::new(lon, lat);

        let mut best: Option<(&FaultSegment, f64)> = None;
        for segment in &self.segments {
            if (lat - segment.mid_latitude()).abs() > LATITUDE_PREFILTER_DEG {
                continue;
            }

            let d = seismiq_geodesy::point_to_segment_km(point, &segment.line);
            match best {
                Some((_, current)) if d >= current => {}
                _ => best = Some((segment, d)),
            }
        }
        best
    }

    /// Resolves whether a point lies within `buffer_km` of any fault.
    ///
    /// The buffer is inclusive: a point exactly `buffer_km` away is on the
    /// fault.
    #[must_use]
    pub fn resolve(&self, lat: f64, lon: f64, buffer_km: f64) -> FaultProximity<'_> {
        match self.nearest(lat, lon) {
            Some((segment, distance_km)) if distance_km <= buffer_km => FaultProximity::OnFault {
                segment,
                distance_km,
            },
            _ => FaultProximity::Far,
        }
    }
}

impl Default for FaultRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
