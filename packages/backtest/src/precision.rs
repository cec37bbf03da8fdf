//! Precision: were heat alarms followed by sizeable events?

use chrono::{DateTime, Duration, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};
use seismiq_scan::{CancelToken, GridScanner, ProgressCallback};
use serde::Serialize;

use crate::{BacktestError, Backtester};

/// A cell whose heat reached the alarm threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlarmCell {
    pub lat: f64,
    pub lon: f64,
    pub heat: u32,
    /// A qualifying event followed within the confirmation window.
    pub confirmed: bool,
}

/// Alarms raised by the scan at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrecisionInstant {
    pub at: DateTime<Utc>,
    pub alarms: Vec<AlarmCell>,
}

impl PrecisionInstant {
    #[must_use]
    pub fn confirmed(&self) -> usize {
        self.alarms.iter().filter(|a| a.confirmed).count()
    }
}

/// Outcome of a precision backtest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrecisionReport {
    /// Sampled instants in time order.
    pub instants: Vec<PrecisionInstant>,
}

impl PrecisionReport {
    /// Alarms across all instants.
    #[must_use]
    pub fn alarms(&self) -> usize {
        self.instants.iter().map(|i| i.alarms.len()).sum()
    }

    /// Confirmed alarms across all instants.
    #[must_use]
    pub fn confirmed(&self) -> usize {
        self.instants.iter().map(PrecisionInstant::confirmed).sum()
    }

    /// Confirmed share of alarms, in `[0, 1]`; `0.0` without alarms.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn precision(&self) -> f64 {
        let alarms = self.alarms();
        if alarms == 0 {
            return 0.0;
        }
        self.confirmed() as f64 / alarms as f64
    }
}

impl Backtester<'_> {
    /// Instants drawn uniformly from the safe window with the configured
    /// seed. The same seed and catalog always give the same instants.
    #[must_use]
    pub fn sample_instants(&self) -> Vec<DateTime<Utc>> {
        let mut rng = StdRng::seed_from_u64(self.params.seed);
        let span = self.window.span_seconds();
        let mut instants: Vec<DateTime<Utc>> = (0..self.params.precision_samples)
            .map(|_| self.window.start + Duration::seconds(rng.gen_range(0..=span)))
            .collect();
        instants.sort();
        instants
    }

    /// Scans the grid at each sampled instant and checks every alarm.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::Scan`] for an invalid grid or a cancelled
    /// scan.
    pub fn precision(
        &self,
        progress: &dyn ProgressCallback,
        cancel: &CancelToken,
    ) -> Result<PrecisionReport, BacktestError> {
        let scanner = GridScanner::new(self.aggregator, self.grid)?;
        let mut instants = Vec::with_capacity(self.params.precision_samples);

        for (i, at) in self.sample_instants().into_iter().enumerate() {
            progress.set_message(format!(
                "scan {}/{} at {}",
                i + 1,
                self.params.precision_samples,
                at.format("%Y-%m-%d")
            ));
            let output = scanner.scan_with(at, progress, cancel)?;

            let alarms: Vec<AlarmCell> = output
                .alarms(self.params.alarm_heat)
                .map(|p| AlarmCell {
                    lat: p.lat,
                    lon: p.lon,
                    heat: p.heat,
                    confirmed: self.is_confirmed(p.lat, p.lon, at),
                })
                .collect();

            let instant = PrecisionInstant { at, alarms };
            log::info!(
                "{}: {} alarms, {} confirmed",
                at.format("%Y-%m-%d"),
                instant.alarms.len(),
                instant.confirmed()
            );
            instants.push(instant);
        }

        let report = PrecisionReport { instants };
        log::info!(
            "Precision {}/{} ({:.1}%)",
            report.confirmed(),
            report.alarms(),
            report.precision() * 100.0
        );
        Ok(report)
    }

    /// A large enough event inside the confirmation box, strictly after
    /// `at` and strictly before the confirmation horizon.
    fn is_confirmed(&self, lat: f64, lon: f64, at: DateTime<Utc>) -> bool {
        let horizon = at + Duration::days(self.params.confirm_days);
        self.catalog()
            .in_box(lat, lon, self.params.confirm_half_width_deg)
            .into_iter()
            .any(|e| {
                e.magnitude >= self.params.confirm_magnitude
                    && e.timestamp > at
                    && e.timestamp < horizon
            })
    }
}
