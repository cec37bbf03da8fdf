//! Recall: did the engine warn before large events?

use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;
use seismiq_catalog_models::Event;
use seismiq_engine_models::ScoreOutcome;
use seismiq_scan::ProgressCallback;
use serde::Serialize;

use crate::Backtester;

/// Engine result some days before a target event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecallProbe {
    pub days_before: i64,
    pub outcome: ScoreOutcome,
}

/// Probes for one target event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecallOutcome {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub magnitude: f64,
    /// In look-back order.
    pub probes: Vec<RecallProbe>,
    /// Whether any probe raised an alarm.
    pub caught: bool,
}

/// Outcome of a recall backtest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecallReport {
    /// Target events in time order.
    pub events: Vec<RecallOutcome>,
    pub caught: usize,
}

impl RecallReport {
    /// Share of target events caught, in `[0, 1]`; `0.0` without targets.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn recall(&self) -> f64 {
        if self.events.is_empty() {
            return 0.0;
        }
        self.caught as f64 / self.events.len() as f64
    }
}

impl Backtester<'_> {
    /// Large events strictly after the window start and not after its end,
    /// in time order.
    #[must_use]
    pub fn recall_targets(&self) -> Vec<&Event> {
        let window = self.window;
        let mut targets: Vec<&Event> = self
            .catalog()
            .events()
            .iter()
            .filter(|e| {
                e.magnitude >= self.params.recall_min_magnitude
                    && e.timestamp > window.start
                    && e.timestamp <= window.end
            })
            .collect();
        targets.sort_by_key(|e| e.timestamp);
        targets
    }

    /// Evaluates the engine at each look-back before every target event.
    ///
    /// An event is caught when any probe is a regular score at or above the
    /// alarm threshold. Post-seismic probes never count.
    pub fn recall(&self, progress: &dyn ProgressCallback) -> RecallReport {
        let targets = self.recall_targets();
        log::info!("Recall over {} events", targets.len());
        progress.set_total(targets.len() as u64);
        progress.set_message("recall".to_string());

        let engine = self.aggregator.engine();
        let events: Vec<RecallOutcome> = targets
            .par_iter()
            .map(|event| {
                let point = engine.prepare(event.latitude, event.longitude);
                let probes: Vec<RecallProbe> = self
                    .params
                    .recall_lookbacks_days
                    .iter()
                    .map(|&days_before| RecallProbe {
                        days_before,
                        outcome: engine
                            .score_prepared(&point, event.timestamp - Duration::days(days_before))
                            .outcome,
                    })
                    .collect();
                let caught = probes.iter().any(|p| {
                    matches!(p.outcome, ScoreOutcome::Scored(v) if v >= self.params.recall_alarm_score)
                });
                progress.inc(1);

                RecallOutcome {
                    timestamp: event.timestamp,
                    latitude: event.latitude,
                    longitude: event.longitude,
                    magnitude: event.magnitude,
                    probes,
                    caught,
                }
            })
            .collect();

        let caught = events.iter().filter(|e| e.caught).count();
        let report = RecallReport { events, caught };
        progress.finish(format!("{caught}/{} caught", report.events.len()));
        log::info!(
            "Recall {caught}/{} ({:.1}%)",
            report.events.len(),
            report.recall() * 100.0
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use seismiq_catalog::Catalog;
    use seismiq_engine::{RiskEngine, TemporalAggregator};
    use seismiq_engine_models::config::{BacktestParams, GridParams, HeatParams, RiskParams};
    use seismiq_scan::NullProgress;

    use super::*;
    use crate::test_support::{catalog_with, day, faults};

    fn targets_catalog() -> Catalog {
        catalog_with(vec![
            // Before the window start.
            Event::new(day(2001, 6, 1), 38.0, 35.0, 6.8),
            // On the fault, inside the window.
            Event::new(day(2006, 6, 1), 38.0, 35.0, 6.5),
            // Far from any fault and any other event.
            Event::new(day(2007, 1, 1), 38.0, 42.0, 6.2),
            // Too small.
            Event::new(day(2007, 6, 1), 38.0, 35.0, 5.9),
        ])
    }

    fn run(catalog: &Catalog, params: &BacktestParams) -> RecallReport {
        let faults = faults();
        let risk = RiskParams::default();
        let heat = HeatParams::default();
        let grid = GridParams::default();
        let aggregator = TemporalAggregator::new(RiskEngine::new(catalog, &faults, &risk), &heat);
        Backtester::new(aggregator, &grid, params)
            .unwrap()
            .recall(&NullProgress)
    }

    #[test]
    fn picks_large_events_inside_window() {
        let catalog = targets_catalog();
        let report = run(&catalog, &BacktestParams::default());

        let magnitudes: Vec<f64> = report.events.iter().map(|e| e.magnitude).collect();
        assert_eq!(magnitudes, [6.5, 6.2]);
        assert_eq!(report.events[0].probes.len(), 6);
        assert_eq!(report.events[0].probes[0].days_before, 7);
    }

    #[test]
    fn seismic_gap_is_below_default_alarm() {
        let catalog = targets_catalog();
        let report = run(&catalog, &BacktestParams::default());

        // The on-fault target scores 35 (seismic gap) at every probe.
        assert!(report.events[0]
            .probes
            .iter()
            .all(|p| p.outcome == ScoreOutcome::Scored(35)));
        assert_eq!(report.caught, 0);
        assert!(report.recall().abs() < f64::EPSILON);
    }

    #[test]
    fn lower_alarm_catches_on_fault_target() {
        let catalog = targets_catalog();
        let params = BacktestParams {
            recall_alarm_score: 35,
            ..BacktestParams::default()
        };
        let report = run(&catalog, &params);

        assert!(report.events[0].caught);
        assert!(!report.events[1].caught);
        assert_eq!(report.caught, 1);
        assert!((report.recall() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn post_seismic_probes_never_count_as_alarms() {
        // Enough nearby background to pass the data checks, then an M5.7
        // foreshock 4 months before the target.
        let mut events: Vec<Event> = (0..20)
            .map(|i| Event::new(day(2003, 1, 1 + i), 38.05, 35.0, 3.8))
            .collect();
        events.push(Event::new(day(2006, 2, 1), 38.1, 35.0, 5.7));
        events.push(Event::new(day(2006, 6, 1), 38.0, 35.0, 6.5));
        let catalog = catalog_with(events);

        let params = BacktestParams {
            recall_alarm_score: 1,
            ..BacktestParams::default()
        };
        let report = run(&catalog, &params);

        assert_eq!(report.events.len(), 1);
        let outcomes: Vec<ScoreOutcome> =
            report.events[0].probes.iter().map(|p| p.outcome).collect();
        assert_eq!(
            outcomes,
            [
                ScoreOutcome::PostSeismic,
                ScoreOutcome::PostSeismic,
                ScoreOutcome::PostSeismic,
                ScoreOutcome::Scored(0),
                ScoreOutcome::Scored(0),
                ScoreOutcome::Scored(0),
            ]
        );
        assert!(!report.events[0].caught);
        assert_eq!(report.caught, 0);
    }

    #[test]
    fn no_targets_means_zero_recall() {
        let catalog = catalog_with(Vec::new());
        let report = run(&catalog, &BacktestParams::default());
        assert!(report.events.is_empty());
        assert!(report.recall().abs() < f64::EPSILON);
    }
}
