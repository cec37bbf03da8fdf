//! Multi-interval temporal aggregation.
//!
//! The engine is evaluated at several offsets before the reference time and
//! the gated scores are combined with fixed weights into a single heat
//! value. Post-seismic evaluations contribute nothing.

use chrono::{DateTime, Duration, Utc};
use seismiq_engine_models::{HeatLevel, HeatResult, ScoreResult, config::HeatParams};
use serde::Serialize;
use strum_macros::{AsRefStr, Display};

use crate::score::{PreparedPoint, RiskEngine};

const TRUNCATION_EPSILON: f64 = 1e-9;

/// Combines weighted scores into a heat value.
///
/// Each score contributes `weight * score` when it is a regular score at or
/// above the gate and nothing otherwise. The sum is truncated toward zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn weighted_heat<'s, I>(scores: I, params: &HeatParams) -> HeatResult
where
    I: IntoIterator<Item = (f64, &'s ScoreResult)>,
{
    let sum: f64 = scores
        .into_iter()
        .map(|(weight, score)| weight * f64::from(score.gated(params.score_gate)))
        .sum();

    // Weights like 0.4 are inexact, so 60 * 0.4 may land just below 24.
    let value = (sum + TRUNCATION_EPSILON).max(0.0) as u32;

    HeatResult {
        value,
        level: HeatLevel::classify(value, params),
    }
}

/// Display status of a single snapshot score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SnapshotStatus {
    #[strum(to_string = "POST-SEISMIC")]
    PostSeismic,
    #[strum(to_string = "HIGH STRESS")]
    HighStress,
    #[strum(to_string = "ACTIVE")]
    Active,
    #[strum(to_string = "NORMAL")]
    Normal,
}

const HIGH_STRESS_FLOOR: u32 = 75;
const ACTIVE_FLOOR: u32 = 50;

impl SnapshotStatus {
    #[must_use]
    pub const fn of(score: &ScoreResult) -> Self {
        match score.value() {
            None => Self::PostSeismic,
            Some(v) if v >= HIGH_STRESS_FLOOR => Self::HighStress,
            Some(v) if v >= ACTIVE_FLOOR => Self::Active,
            Some(_) => Self::Normal,
        }
    }
}

/// Engine result at one look-back offset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Offset before the reference time.
    pub days_before: i64,
    /// Instant the engine was evaluated at.
    pub at: DateTime<Utc>,
    /// Weight of this offset.
    pub weight: f64,
    /// Engine result.
    pub score: ScoreResult,
    /// Display status of `score`.
    pub status: SnapshotStatus,
}

/// Heat together with the per-offset evaluations it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatTimeline {
    pub heat: HeatResult,
    /// Oldest first, in look-back order.
    pub snapshots: Vec<Snapshot>,
}

impl HeatTimeline {
    /// The snapshot taken at the reference time itself, if any.
    #[must_use]
    pub fn current(&self) -> Option<&Snapshot> {
        self.snapshots.iter().find(|s| s.days_before == 0)
    }
}

/// Evaluates the engine across the configured look-backs.
#[derive(Clone, Copy)]
pub struct TemporalAggregator<'a> {
    engine: RiskEngine<'a>,
    params: &'a HeatParams,
}

impl<'a> TemporalAggregator<'a> {
    #[must_use]
    pub const fn new(engine: RiskEngine<'a>, params: &'a HeatParams) -> Self {
        Self { engine, params }
    }

    #[must_use]
    pub const fn engine(&self) -> &RiskEngine<'a> {
        &self.engine
    }

    #[must_use]
    pub const fn params(&self) -> &'a HeatParams {
        self.params
    }

    /// Heat of a point at `now`.
    #[must_use]
    pub fn heat(&self, lat: f64, lon: f64, now: DateTime<Utc>) -> HeatResult {
        self.timeline(lat, lon, now).heat
    }

    /// Heat of a point at `now`, keeping every snapshot.
    #[must_use]
    pub fn timeline(&self, lat: f64, lon: f64, now: DateTime<Utc>) -> HeatTimeline {
        self.timeline_prepared(&self.engine.prepare(lat, lon), now)
    }

    /// As [`Self::timeline`] for an already prepared point.
    #[must_use]
    pub fn timeline_prepared(&self, point: &PreparedPoint<'_>, now: DateTime<Utc>) -> HeatTimeline {
        self.build(point, now, None)
    }

    /// As [`Self::timeline_prepared`], reusing a score already computed at
    /// `now` for the zero offset.
    #[must_use]
    pub fn timeline_with_current(
        &self,
        point: &PreparedPoint<'_>,
        now: DateTime<Utc>,
        current: &ScoreResult,
    ) -> HeatTimeline {
        self.build(point, now, Some(current))
    }

    fn build(
        &self,
        point: &PreparedPoint<'_>,
        now: DateTime<Utc>,
        current: Option<&ScoreResult>,
    ) -> HeatTimeline {
        let snapshots: Vec<Snapshot> = self
            .params
            .lookbacks
            .iter()
            .map(|lookback| {
                let at = now - Duration::days(lookback.days);
                let score = match current {
                    Some(current) if lookback.days == 0 => current.clone(),
                    _ => self.engine.score_prepared(point, at),
                };
                Snapshot {
                    days_before: lookback.days,
                    at,
                    weight: lookback.weight,
                    status: SnapshotStatus::of(&score),
                    score,
                }
            })
            .collect();

        let heat = weighted_heat(snapshots.iter().map(|s| (s.weight, &s.score)), self.params);

        HeatTimeline { heat, snapshots }
    }
}

#[cfg(test)]
mod tests {
    use seismiq_engine_models::config::RiskParams;

    use super::*;
    use crate::test_support::{ORIGIN, at, catalog_of, quake, registry_through_origin};

    fn scored(values: &[u32]) -> Vec<ScoreResult> {
        values
            .iter()
            .map(|v| ScoreResult::scored(*v, Vec::new(), "x"))
            .collect()
    }

    fn heat_of(scores: &[ScoreResult], params: &HeatParams) -> HeatResult {
        weighted_heat(
            params
                .lookbacks
                .iter()
                .map(|l| l.weight)
                .zip(scores.iter()),
            params,
        )
    }

    #[test]
    fn weighted_history_is_high() {
        let params = HeatParams::default();
        let heat = heat_of(&scored(&[0, 60, 0, 80, 100]), &params);
        assert_eq!(heat.value, 238);
        assert_eq!(heat.level, HeatLevel::High);
    }

    #[test]
    fn scores_below_gate_contribute_nothing() {
        let params = HeatParams::default();
        let heat = heat_of(&scored(&[49, 49, 49, 49, 49]), &params);
        assert_eq!(heat.value, 0);
        assert_eq!(heat.level, HeatLevel::Low);
    }

    #[test]
    fn post_seismic_contributes_nothing() {
        let params = HeatParams::default();
        let mut scores = scored(&[150, 150, 150, 150, 0]);
        scores[4] = ScoreResult::post_seismic("x");
        let heat = heat_of(&scores, &params);
        // 150 * (0.2 + 0.4 + 0.6 + 0.8)
        assert_eq!(heat.value, 300);
        assert_eq!(heat.level, HeatLevel::High);
    }

    #[test]
    fn all_maxed_out_is_critical() {
        let params = HeatParams::default();
        let heat = heat_of(&scored(&[150; 5]), &params);
        assert_eq!(heat.value, 525);
        assert_eq!(heat.level, HeatLevel::Critical);
    }

    #[test]
    fn snapshot_status_labels() {
        assert_eq!(
            SnapshotStatus::of(&ScoreResult::post_seismic("x")).to_string(),
            "POST-SEISMIC"
        );
        assert_eq!(SnapshotStatus::of(&scored(&[75])[0]), SnapshotStatus::HighStress);
        assert_eq!(SnapshotStatus::of(&scored(&[74])[0]), SnapshotStatus::Active);
        assert_eq!(SnapshotStatus::of(&scored(&[50])[0]), SnapshotStatus::Active);
        assert_eq!(SnapshotStatus::of(&scored(&[49])[0]).to_string(), "NORMAL");
    }

    #[test]
    fn timeline_follows_lookback_order() {
        let catalog = catalog_of((0..19).map(|i| quake(at(2010, 1, 1 + i), 0.0, 3.8)).collect());
        let faults = registry_through_origin();
        let risk = RiskParams::default();
        let heat = HeatParams {
            score_gate: 30,
            ..HeatParams::default()
        };
        let now = at(2020, 6, 1);
        let aggregator = TemporalAggregator::new(RiskEngine::new(&catalog, &faults, &risk), &heat);

        let timeline = aggregator.timeline(ORIGIN.0, ORIGIN.1, now);
        let days: Vec<i64> = timeline.snapshots.iter().map(|s| s.days_before).collect();
        assert_eq!(days, [365, 180, 90, 30, 0]);
        assert_eq!(timeline.current().unwrap().at, now);

        // Seismic gap (35) at every offset: 35 * 3.5
        assert_eq!(timeline.heat.value, 122);
        assert_eq!(timeline.heat.level, HeatLevel::Low);
        assert_eq!(aggregator.heat(ORIGIN.0, ORIGIN.1, now), timeline.heat);
    }

    #[test]
    fn reusing_current_score_matches_fresh_evaluation() {
        let catalog = catalog_of((0..25).map(|i| quake(at(2012, 5, 1 + i), 0.1, 4.3)).collect());
        let faults = registry_through_origin();
        let risk = RiskParams::default();
        let heat = HeatParams::default();
        let engine = RiskEngine::new(&catalog, &faults, &risk);
        let aggregator = TemporalAggregator::new(engine, &heat);
        let now = at(2014, 1, 1);

        let point = engine.prepare(ORIGIN.0, ORIGIN.1);
        let current = engine.score_prepared(&point, now);
        assert_eq!(
            aggregator.timeline_with_current(&point, now, &current),
            aggregator.timeline_prepared(&point, now)
        );
    }
}
