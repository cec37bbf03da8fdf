#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Region-wide grid scanning.
//!
//! Every cell of a [`Grid`] is scored at the reference time and, unless it
//! is post-seismic, aggregated into a heat value. Cells are evaluated in
//! parallel with rayon; output keeps grid order except for the report,
//! which is ranked by heat.

pub mod grid;
pub mod progress;

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use seismiq_engine::TemporalAggregator;
use seismiq_engine_models::{HeatLevel, config::GridParams};
use serde::Serialize;
use thiserror::Error;

pub use grid::Grid;
pub use progress::{CancelToken, NullProgress, ProgressCallback};

/// Errors that can occur while scanning a grid.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The grid parameters do not describe a usable raster.
    #[error("Invalid grid: {message}")]
    InvalidGrid {
        /// Description of what went wrong.
        message: String,
    },

    /// The scan was stopped through its [`CancelToken`].
    #[error("Scan cancelled")]
    Cancelled,
}

/// Heat value of one raster cell. Post-seismic cells carry `0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RasterPoint {
    pub lat: f64,
    pub lon: f64,
    pub heat: u32,
}

/// A cell worth reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub lat: f64,
    pub lon: f64,
    /// Nearest fault name or data status at the reference time.
    pub fault_context: String,
    pub heat: u32,
    pub level: HeatLevel,
    /// Engine score at the reference time.
    pub current: u32,
    /// Contributions to `current`.
    pub reasons: Vec<String>,
}

/// Result of a grid scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOutput {
    /// One entry per cell, in grid order.
    pub raster: Vec<RasterPoint>,
    /// Reported cells, highest heat first; ties keep grid order.
    pub report: Vec<ReportRow>,
    /// `(lat, lon)` of post-seismic cells, in grid order.
    pub post_seismic: Vec<(f64, f64)>,
}

impl ScanOutput {
    /// Raster cells whose heat is at or above `floor`, in grid order.
    ///
    /// Post-seismic cells carry heat `0` and only qualify for a zero floor.
    pub fn alarms(&self, floor: u32) -> impl Iterator<Item = &RasterPoint> {
        self.raster.iter().filter(move |p| p.heat >= floor)
    }
}

/// Scans the raster described by `params` at `now`.
///
/// # Errors
///
/// Returns [`ScanError::InvalidGrid`] if `params` is unusable.
pub fn scan(
    aggregator: TemporalAggregator<'_>,
    params: &GridParams,
    now: DateTime<Utc>,
) -> Result<ScanOutput, ScanError> {
    GridScanner::new(aggregator, params)?.scan(now)
}

enum Cell {
    PostSeismic { lat: f64, lon: f64 },
    Heat { point: RasterPoint, row: Option<ReportRow> },
}

/// Scans a fixed grid with a temporal aggregator.
pub struct GridScanner<'a> {
    aggregator: TemporalAggregator<'a>,
    grid: Grid,
    report_floor: u32,
}

impl<'a> GridScanner<'a> {
    /// Creates a scanner over the raster described by `params`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidGrid`] if `params` is unusable.
    pub fn new(aggregator: TemporalAggregator<'a>, params: &GridParams) -> Result<Self, ScanError> {
        Ok(Self {
            aggregator,
            grid: Grid::new(params)?,
            report_floor: params.report_floor,
        })
    }

    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Scans every cell at `now` without progress reporting.
    ///
    /// # Errors
    ///
    /// See [`Self::scan_with`].
    pub fn scan(&self, now: DateTime<Utc>) -> Result<ScanOutput, ScanError> {
        self.scan_with(now, &NullProgress, &CancelToken::new())
    }

    /// Scans every cell at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Cancelled`] if `cancel` is tripped before the
    /// scan completes.
    pub fn scan_with(
        &self,
        now: DateTime<Utc>,
        progress: &dyn ProgressCallback,
        cancel: &CancelToken,
    ) -> Result<ScanOutput, ScanError> {
        let cells: Vec<(f64, f64)> = self.grid.cells().collect();
        log::debug!(
            "Scanning {} cells at {}",
            cells.len(),
            now.format("%Y-%m-%d")
        );
        progress.set_total(cells.len() as u64);

        let evaluated: Vec<Option<Cell>> = cells
            .par_iter()
            .map(|&(lat, lon)| {
                if cancel.is_cancelled() {
                    return None;
                }
                let cell = self.evaluate(lat, lon, now);
                progress.inc(1);
                Some(cell)
            })
            .collect();

        if cancel.is_cancelled() {
            log::warn!("Scan at {} cancelled", now.format("%Y-%m-%d"));
            return Err(ScanError::Cancelled);
        }

        let mut output = ScanOutput::default();
        for cell in evaluated.into_iter().flatten() {
            match cell {
                Cell::PostSeismic { lat, lon } => {
                    output.raster.push(RasterPoint { lat, lon, heat: 0 });
                    output.post_seismic.push((lat, lon));
                }
                Cell::Heat { point, row } => {
                    output.raster.push(point);
                    output.report.extend(row);
                }
            }
        }
        output.report.sort_by_key(|row| Reverse(row.heat));

        progress.finish(format!(
            "{} cells, {} reported, {} post-seismic",
            output.raster.len(),
            output.report.len(),
            output.post_seismic.len()
        ));
        log::info!(
            "Scan at {}: {} reported cells, {} post-seismic",
            now.format("%Y-%m-%d"),
            output.report.len(),
            output.post_seismic.len()
        );

        Ok(output)
    }

    fn evaluate(&self, lat: f64, lon: f64, now: DateTime<Utc>) -> Cell {
        let engine = self.aggregator.engine();
        let point = engine.prepare(lat, lon);
        let current = engine.score_prepared(&point, now);

        let Some(score) = current.value() else {
            return Cell::PostSeismic { lat, lon };
        };

        let heat = self
            .aggregator
            .timeline_with_current(&point, now, &current)
            .heat;

        let reported =
            score >= self.aggregator.params().score_gate || heat.value >= self.report_floor;
        let row = reported.then(|| ReportRow {
            lat,
            lon,
            fault_context: current.fault_context.clone(),
            heat: heat.value,
            level: heat.level,
            current: score,
            reasons: current.reasons.clone(),
        });

        Cell::Heat {
            point: RasterPoint {
                lat,
                lon,
                heat: heat.value,
            },
            row,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use chrono::{Duration, TimeZone};
    use seismiq_catalog::Catalog;
    use seismiq_catalog_models::Event;
    use seismiq_engine::RiskEngine;
    use seismiq_engine_models::config::{HeatParams, RiskParams};
    use seismiq_faults::{FaultRegistry, FaultSegment};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap()
    }

    /// Nineteen old M3.8 events at (38, 35).
    fn quiet_events() -> Vec<Event> {
        (0..19)
            .map(|i| {
                let ts = Utc.with_ymd_and_hms(2010, 1, 1 + i, 0, 0, 0).unwrap();
                Event::new(ts, 38.0, 35.0, 3.8)
            })
            .collect()
    }

    /// An east-west fault along latitude 38.
    fn faults() -> FaultRegistry {
        FaultRegistry::from_segments(vec![FaultSegment::new(
            "Test Fault",
            (38.0, 34.0),
            (38.0, 36.0),
        )])
    }

    fn small_grid() -> GridParams {
        GridParams {
            lat_min: 37.5,
            lat_max: 38.5,
            lon_min: 34.5,
            lon_max: 35.5,
            step_deg: 0.5,
            report_floor: 126,
        }
    }

    fn run(
        catalog: &Catalog,
        heat: &HeatParams,
        cancel: &CancelToken,
        progress: &dyn ProgressCallback,
    ) -> Result<ScanOutput, ScanError> {
        let faults = faults();
        let risk = RiskParams::default();
        let aggregator = TemporalAggregator::new(RiskEngine::new(catalog, &faults, &risk), heat);
        GridScanner::new(aggregator, &small_grid())?.scan_with(now(), progress, cancel)
    }

    #[test]
    fn quiet_region_reports_nothing() {
        let catalog = Catalog::new(quiet_events()).unwrap();
        let output = run(
            &catalog,
            &HeatParams::default(),
            &CancelToken::new(),
            &NullProgress,
        )
        .unwrap();

        assert_eq!(output.raster.len(), 9);
        assert!(output.raster.iter().all(|p| p.heat == 0));
        assert!(output.report.is_empty());
        assert!(output.post_seismic.is_empty());
        assert_eq!((output.raster[0].lat, output.raster[0].lon), (37.5, 34.5));
        assert_eq!((output.raster[8].lat, output.raster[8].lon), (38.5, 35.5));
    }

    #[test]
    fn seismic_gap_cells_are_reported_when_gate_allows() {
        let catalog = Catalog::new(quiet_events()).unwrap();
        let heat = HeatParams {
            score_gate: 30,
            ..HeatParams::default()
        };
        let output = run(&catalog, &heat, &CancelToken::new(), &NullProgress).unwrap();

        // Only the fault row is on-fault; each scores 35 at every offset.
        assert_eq!(output.report.len(), 3);
        for row in &output.report {
            assert!((row.lat - 38.0).abs() < f64::EPSILON);
            assert_eq!(row.current, 35);
            assert_eq!(row.heat, 122);
            assert_eq!(row.level, HeatLevel::Low);
            assert_eq!(row.fault_context, "Test Fault");
        }
        let lons: Vec<f64> = output.report.iter().map(|r| r.lon).collect();
        assert_eq!(lons, [34.5, 35.0, 35.5]);
        assert!(output.alarms(126).next().is_none());
        let alarms: Vec<(f64, f64)> = output.alarms(122).map(|p| (p.lat, p.lon)).collect();
        assert_eq!(alarms, [(38.0, 34.5), (38.0, 35.0), (38.0, 35.5)]);
    }

    #[test]
    fn post_seismic_cells_are_zeroed_and_listed() {
        let mut events = quiet_events();
        events.push(Event::new(now() - Duration::days(100), 38.0, 35.0, 6.0));
        let catalog = Catalog::new(events).unwrap();

        let output = run(
            &catalog,
            &HeatParams::default(),
            &CancelToken::new(),
            &NullProgress,
        )
        .unwrap();

        assert_eq!(output.post_seismic, [(38.0, 34.5), (38.0, 35.0), (38.0, 35.5)]);
        for (lat, lon) in &output.post_seismic {
            let point = output
                .raster
                .iter()
                .find(|p| p.lat == *lat && p.lon == *lon)
                .unwrap();
            assert_eq!(point.heat, 0);
            assert!(!output.report.iter().any(|r| r.lat == *lat && r.lon == *lon));
        }
        assert_eq!(output.raster.len(), 9);
    }

    #[test]
    fn report_is_ranked_by_heat() {
        let mut events = quiet_events();
        events.push(Event::new(now() - Duration::days(100), 38.0, 35.0, 6.0));
        let catalog = Catalog::new(events).unwrap();
        let heat = HeatParams {
            score_gate: 0,
            ..HeatParams::default()
        };
        let output = run(&catalog, &heat, &CancelToken::new(), &NullProgress).unwrap();

        assert!(!output.report.is_empty());
        assert!(output.report.windows(2).all(|w| w[0].heat >= w[1].heat));
    }

    #[test]
    fn one_shot_scan_matches_scanner() {
        let catalog = Catalog::new(quiet_events()).unwrap();
        let faults = faults();
        let risk = RiskParams::default();
        let heat = HeatParams::default();
        let aggregator = TemporalAggregator::new(RiskEngine::new(&catalog, &faults, &risk), &heat);

        let output = scan(aggregator, &small_grid(), now()).unwrap();
        assert_eq!(
            output,
            run(&catalog, &heat, &CancelToken::new(), &NullProgress).unwrap()
        );
    }

    #[test]
    fn cancelled_scan_fails() {
        let catalog = Catalog::new(quiet_events()).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();

        let err = run(&catalog, &HeatParams::default(), &cancel, &NullProgress).unwrap_err();
        assert!(matches!(err, ScanError::Cancelled));
    }

    #[derive(Default)]
    struct Counting {
        total: AtomicU64,
        done: AtomicU64,
    }

    impl ProgressCallback for Counting {
        fn set_total(&self, total: u64) {
            self.total.store(total, Ordering::Relaxed);
        }
        fn inc(&self, delta: u64) {
            self.done.fetch_add(delta, Ordering::Relaxed);
        }
        fn set_message(&self, _msg: String) {}
        fn finish(&self, _msg: String) {}
    }

    #[test]
    fn reports_progress_per_cell() {
        let catalog = Catalog::new(quiet_events()).unwrap();
        let progress = Counting::default();
        run(
            &catalog,
            &HeatParams::default(),
            &CancelToken::new(),
            &progress,
        )
        .unwrap();

        assert_eq!(progress.total.load(Ordering::Relaxed), 9);
        assert_eq!(progress.done.load(Ordering::Relaxed), 9);
    }
}
