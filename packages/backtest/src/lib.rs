#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Historical validation of the risk engine.
//!
//! * **Recall** replays the engine before every large catalog event and
//!   checks whether it raised an alarm in time.
//! * **Precision** scans the whole grid at random instants and checks how
//!   many heat alarms were followed by a sizeable event nearby.
//!
//! Both only consider instants inside the [`SafeWindow`], where look-backs
//! and look-aheads are fully covered by the catalog.

pub mod precision;
pub mod recall;

#[cfg(test)]
pub(crate) mod test_support;

use chrono::{DateTime, Duration, Utc};
use seismiq_catalog::Catalog;
use seismiq_engine::TemporalAggregator;
use seismiq_engine_models::config::{BacktestParams, GridParams};
use seismiq_scan::ScanError;
use serde::Serialize;
use thiserror::Error;

pub use precision::{AlarmCell, PrecisionInstant, PrecisionReport};
pub use recall::{RecallOutcome, RecallProbe, RecallReport};

/// Errors that can occur while running a backtest.
#[derive(Debug, Error)]
pub enum BacktestError {
    /// A grid scan failed or was cancelled.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// The catalog is too short to leave any instant with full coverage.
    #[error("Catalog span {first} .. {last} leaves no backtest window")]
    InsufficientSpan {
        first: DateTime<Utc>,
        last: DateTime<Utc>,
    },
}

/// Instants with complete look-back and look-ahead coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SafeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SafeWindow {
    /// `[first + warmup, last - lookahead margin]` of the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InsufficientSpan`] if the window is empty.
    pub fn of(catalog: &Catalog, params: &BacktestParams) -> Result<Self, BacktestError> {
        let first = catalog.first_timestamp();
        let last = catalog.last_timestamp();
        let start = first + Duration::days(params.warmup_days);
        let end = last - Duration::days(params.lookahead_margin_days);

        if start >= end {
            return Err(BacktestError::InsufficientSpan { first, last });
        }
        Ok(Self { start, end })
    }

    /// Length of the window in whole seconds.
    #[must_use]
    pub fn span_seconds(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }
}

/// Runs recall and precision tests over one catalog.
pub struct Backtester<'a> {
    aggregator: TemporalAggregator<'a>,
    grid: &'a GridParams,
    params: &'a BacktestParams,
    window: SafeWindow,
}

impl<'a> Backtester<'a> {
    /// Creates a harness for the catalog behind `aggregator`.
    ///
    /// # Errors
    ///
    /// Returns [`BacktestError::InsufficientSpan`] if the catalog is too
    /// short.
    pub fn new(
        aggregator: TemporalAggregator<'a>,
        grid: &'a GridParams,
        params: &'a BacktestParams,
    ) -> Result<Self, BacktestError> {
        let window = SafeWindow::of(aggregator.engine().catalog(), params)?;
        log::info!(
            "Backtest window {} .. {}",
            window.start.format("%Y-%m-%d"),
            window.end.format("%Y-%m-%d")
        );
        Ok(Self {
            aggregator,
            grid,
            params,
            window,
        })
    }

    #[must_use]
    pub const fn window(&self) -> SafeWindow {
        self.window
    }

    fn catalog(&self) -> &'a Catalog {
        self.aggregator.engine().catalog()
    }
}
