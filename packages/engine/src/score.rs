//! Risk scoring engine.
//!
//! A score is computed from the catalog as it stood at a reference time:
//! only events at or before that instant are visible. Evaluation is a
//! sequence of early exits (no data, insufficient data, post-seismic)
//! followed by three independent heuristics whose points are summed and
//! capped.

use chrono::{DateTime, Duration, Utc};
use seismiq_catalog::{Catalog, Window, WindowEntry};
use seismiq_engine_models::{ScoreResult, config::RiskParams};
use seismiq_faults::{FaultProximity, FaultRegistry};

use crate::b_value;
use crate::lunar::{LunarSignal, WindowRatio};

/// Fault context when the bounding box holds no events.
pub const NO_DATA: &str = "no data";

/// Fault context when too few events remain off-fault.
pub const INSUFFICIENT_DATA: &str = "insufficient data";

/// Reason reported for an on-fault point with too few events.
pub const SEISMIC_GAP_REASON: &str = "insufficient data / seismic gap";

const SEISMIC_GAP_POINTS: u32 = 35;
const STRESS_TRANSFER_ON_FAULT: u32 = 35;
const STRESS_TRANSFER_OFF_FAULT: u32 = 30;
const STRAIN_ON_FAULT: u32 = 35;
const STRAIN_OFF_FAULT: u32 = 25;

/// A query point whose catalog window and fault proximity have been
/// resolved. Reusable across any number of reference times.
#[derive(Debug, Clone)]
pub struct PreparedPoint<'a> {
    /// Latitude of the query point.
    pub lat: f64,
    /// Longitude of the query point.
    pub lon: f64,
    window: Window<'a>,
    proximity: FaultProximity<'a>,
}

/// Stateless scoring over a catalog and a fault registry.
///
/// Holds only shared references, so it is `Copy` and can be handed to any
/// number of worker threads.
#[derive(Clone, Copy)]
pub struct RiskEngine<'a> {
    catalog: &'a Catalog,
    faults: &'a FaultRegistry,
    params: &'a RiskParams,
}

impl<'a> RiskEngine<'a> {
    /// Creates an engine.
    #[must_use]
    pub const fn new(catalog: &'a Catalog, faults: &'a FaultRegistry, params: &'a RiskParams) -> Self {
        Self {
            catalog,
            faults,
            params,
        }
    }

    /// The catalog being scored against.
    #[must_use]
    pub const fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// The engine parameters.
    #[must_use]
    pub const fn params(&self) -> &'a RiskParams {
        self.params
    }

    /// Resolves the catalog window and fault proximity of a point.
    #[must_use]
    pub fn prepare(&self, lat: f64, lon: f64) -> PreparedPoint<'a> {
        PreparedPoint {
            lat,
            lon,
            window: self.catalog.window(lat, lon, self.params.window_half_width_deg),
            proximity: self.faults.resolve(lat, lon, self.params.fault_buffer_km),
        }
    }

    /// Scores a point at `now`.
    #[must_use]
    pub fn score(&self, lat: f64, lon: f64, now: DateTime<Utc>) -> ScoreResult {
        self.score_prepared(&self.prepare(lat, lon), now)
    }

    /// Scores an already prepared point at `now`.
    #[must_use]
    pub fn score_prepared(&self, point: &PreparedPoint<'_>, now: DateTime<Utc>) -> ScoreResult {
        let p = self.params;
        let on_fault = point.proximity.is_on_fault();
        let fault_context = point.proximity.context();

        let candidates = point.window.until(now);
        if candidates.is_empty() {
            return ScoreResult::scored(0, Vec::new(), NO_DATA);
        }

        let working: Vec<&WindowEntry<'_>> = candidates
            .iter()
            .filter(|c| {
                c.distance_km <= p.analysis_radius_km && c.event.magnitude >= p.magnitude_cutoff
            })
            .collect();

        if working.len() < p.min_event_count {
            return if on_fault {
                ScoreResult::scored(
                    SEISMIC_GAP_POINTS,
                    vec![SEISMIC_GAP_REASON.to_string()],
                    fault_context,
                )
            } else {
                ScoreResult::scored(0, Vec::new(), INSUFFICIENT_DATA)
            };
        }

        let recent_start = now - Duration::days(p.recent_days);
        let trigger_start = now - Duration::days(p.trigger_days);

        let post_seismic = candidates.iter().any(|c| {
            c.distance_km <= p.post_seismic_radius_km
                && c.event.timestamp >= recent_start
                && c.event.magnitude >= p.large_event_magnitude
        });
        if post_seismic {
            return ScoreResult::post_seismic(fault_context);
        }

        let mut score = 0_u32;
        let mut reasons = Vec::new();

        let stress_transfer = candidates.iter().any(|c| {
            c.distance_km > p.post_seismic_radius_km
                && c.distance_km <= p.trigger_radius_km
                && c.event.timestamp >= trigger_start
                && c.event.magnitude >= p.large_event_magnitude
        });
        if stress_transfer {
            let points = if on_fault {
                STRESS_TRANSFER_ON_FAULT
            } else {
                STRESS_TRANSFER_OFF_FAULT
            };
            score += points;
            reasons.push(format!("stress transfer (+{points})"));
        }

        let b = b_value::estimate(
            working.iter().map(|c| c.event.magnitude),
            p.magnitude_cutoff,
            p.b_value_min_samples,
        );
        if let Some(b) = b.filter(|b| *b < p.b_value_threshold) {
            let points = if on_fault {
                STRAIN_ON_FAULT
            } else {
                STRAIN_OFF_FAULT
            };
            score += points;
            reasons.push(format!("physical strain (b={b:.2}) (+{points})"));
        }

        let recent = WindowRatio::tally(
            working
                .iter()
                .copied()
                .filter(|c| c.event.timestamp >= recent_start),
        );
        let prior = WindowRatio::tally(working.iter().copied().filter(|c| {
            c.event.timestamp < recent_start && c.event.timestamp >= trigger_start
        }));
        let signal = LunarSignal::classify(&recent, &prior, p);
        if let Some(label) = signal.label() {
            let points = signal.points(on_fault);
            score += points;
            reasons.push(format!("{label} (+{points})"));
        }

        log::trace!(
            "score({:.2}, {:.2}, {}) = {score} from {} working events, lunar {signal:?}",
            point.lat,
            point.lon,
            now.format("%Y-%m-%d"),
            working.len(),
        );

        ScoreResult::scored(score.min(p.score_cap), reasons, fault_context)
    }
}
