//! Tunable engine parameters.
//!
//! Every threshold, radius and window used by the engine, aggregator, grid
//! scanner and backtest harness is a field here, with defaults matching the
//! calibrated values. A [`SeismiqConfig`] can be read from a TOML file in
//! which any table or key may be omitted.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound of any day-count setting, roughly one century.
pub const MAX_DAYS: i64 = 36_500;

/// Errors that can occur while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the file failed.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML document is malformed or has wrongly typed values.
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The document parsed but describes an unusable setup.
    #[error("Invalid config: {message}")]
    Invalid {
        /// Description of what went wrong.
        message: String,
    },
}

/// Parameters of a single engine evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskParams {
    /// Half width, in degrees, of the candidate bounding box.
    pub window_half_width_deg: f64,
    /// Radius of the working set used for counts, b-value and lunar ratios.
    pub analysis_radius_km: f64,
    /// Radius inside which a recent large event marks the point post-seismic.
    pub post_seismic_radius_km: f64,
    /// Outer radius of the stress-transfer ring.
    pub trigger_radius_km: f64,
    /// Magnitude of completeness; smaller events are ignored.
    pub magnitude_cutoff: f64,
    /// Magnitude at or above which an event counts as a large release.
    pub large_event_magnitude: f64,
    /// Distance from a fault trace that still counts as on-fault.
    pub fault_buffer_km: f64,
    /// Working-set size below which the point has insufficient data.
    pub min_event_count: usize,
    /// Look-back, in days, of the post-seismic check and the recent lunar window.
    pub recent_days: i64,
    /// Look-back, in days, of stress transfer and the prior lunar window.
    pub trigger_days: i64,
    /// Minimum sample size for a b-value estimate.
    pub b_value_min_samples: usize,
    /// b-values strictly below this indicate stress accumulation.
    pub b_value_threshold: f64,
    /// Minimum events in a lunar window for its ratio to count.
    pub lunar_min_events: usize,
    /// Full-moon ratio (percent) strictly above which a window is active.
    pub lunar_active_ratio: f64,
    /// Full-moon ratio (percent) strictly below which a window is silent.
    pub lunar_silent_ratio: f64,
    /// Upper bound of a regular score.
    pub score_cap: u32,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            window_half_width_deg: 2.0,
            analysis_radius_km: 150.0,
            post_seismic_radius_km: 50.0,
            trigger_radius_km: 150.0,
            magnitude_cutoff: 3.5,
            large_event_magnitude: 5.5,
            fault_buffer_km: 35.0,
            min_event_count: 20,
            recent_days: 365,
            trigger_days: 365 * 3,
            b_value_min_samples: 15,
            b_value_threshold: 0.85,
            lunar_min_events: 5,
            lunar_active_ratio: 15.0,
            lunar_silent_ratio: 9.0,
            score_cap: 150,
        }
    }
}

/// One look-back interval of the temporal aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lookback {
    /// Days before the reference time.
    pub days: i64,
    /// Weight of the gated score at that time.
    pub weight: f64,
}

/// Parameters of the temporal aggregator and heat classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatParams {
    /// Evaluation offsets, oldest first.
    pub lookbacks: Vec<Lookback>,
    /// Scores below this contribute nothing.
    pub score_gate: u32,
    /// Inclusive lower bound of `MEDIUM`.
    pub medium_floor: u32,
    /// Inclusive lower bound of `HIGH`.
    pub high_floor: u32,
    /// Inclusive lower bound of `CRITICAL`.
    pub critical_floor: u32,
}

impl Default for HeatParams {
    fn default() -> Self {
        Self {
            lookbacks: vec![
                Lookback { days: 365, weight: 0.2 },
                Lookback { days: 180, weight: 0.4 },
                Lookback { days: 90, weight: 0.6 },
                Lookback { days: 30, weight: 0.8 },
                Lookback { days: 0, weight: 1.5 },
            ],
            score_gate: 50,
            medium_floor: 126,
            high_floor: 226,
            critical_floor: 326,
        }
    }
}

/// Raster definition and report filter of the grid scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridParams {
    /// Southern edge (inclusive).
    pub lat_min: f64,
    /// Northern edge (inclusive when it falls on a step).
    pub lat_max: f64,
    /// Western edge (inclusive).
    pub lon_min: f64,
    /// Eastern edge (inclusive when it falls on a step).
    pub lon_max: f64,
    /// Cell spacing in degrees.
    pub step_deg: f64,
    /// Cells with heat at or above this are reported.
    pub report_floor: u32,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            lat_min: 36.0,
            lat_max: 42.0,
            lon_min: 26.0,
            lon_max: 45.0,
            step_deg: 0.5,
            report_floor: 126,
        }
    }
}

/// Parameters of the recall and precision backtests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestParams {
    /// Days excluded at the start of the catalog so look-backs are complete.
    pub warmup_days: i64,
    /// Days excluded at the end of the catalog so look-aheads are complete.
    pub lookahead_margin_days: i64,
    /// Minimum magnitude of events the recall test tries to catch.
    pub recall_min_magnitude: f64,
    /// Days before each target event at which the engine is evaluated.
    pub recall_lookbacks_days: Vec<i64>,
    /// Regular score at or above which an evaluation counts as an alarm.
    pub recall_alarm_score: u32,
    /// Number of random instants the precision test scans.
    pub precision_samples: usize,
    /// Seed for choosing the precision instants.
    pub seed: u64,
    /// Heat at or above which a cell raises an alarm.
    pub alarm_heat: u32,
    /// Minimum magnitude of a confirming event.
    pub confirm_magnitude: f64,
    /// Half width, in degrees, of the box a confirming event must fall in.
    pub confirm_half_width_deg: f64,
    /// Days after the scan instant in which a confirming event must occur.
    pub confirm_days: i64,
}

impl Default for BacktestParams {
    fn default() -> Self {
        Self {
            warmup_days: 365 * 3,
            lookahead_margin_days: 548,
            recall_min_magnitude: 6.0,
            recall_lookbacks_days: vec![7, 30, 90, 180, 365, 540],
            recall_alarm_score: 50,
            precision_samples: 3,
            seed: 0x5EED,
            alarm_heat: 226,
            confirm_magnitude: 5.5,
            confirm_half_width_deg: 1.5,
            confirm_days: 730,
        }
    }
}

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeismiqConfig {
    /// Engine parameters.
    pub risk: RiskParams,
    /// Aggregator parameters.
    pub heat: HeatParams,
    /// Grid scanner parameters.
    pub grid: GridParams,
    /// Backtest parameters.
    pub backtest: BacktestParams,
}

impl SeismiqConfig {
    /// Parses a configuration from TOML. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for unusable values.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::de::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| {
            Err(ConfigError::Invalid {
                message: message.to_string(),
            })
        };

        if self.heat.lookbacks.is_empty() {
            return invalid("heat.lookbacks must not be empty");
        }
        if self.heat.lookbacks.iter().any(|l| l.weight < 0.0) {
            return invalid("heat.lookbacks must have non-negative weights");
        }
        let day_counts = [
            ("risk.recent_days", self.risk.recent_days),
            ("risk.trigger_days", self.risk.trigger_days),
            ("backtest.warmup_days", self.backtest.warmup_days),
            ("backtest.lookahead_margin_days", self.backtest.lookahead_margin_days),
            ("backtest.confirm_days", self.backtest.confirm_days),
        ]
        .into_iter()
        .chain(self.heat.lookbacks.iter().map(|l| ("heat.lookbacks.days", l.days)))
        .chain(
            self.backtest
                .recall_lookbacks_days
                .iter()
                .map(|days| ("backtest.recall_lookbacks_days", *days)),
        );
        for (name, days) in day_counts {
            if !(0..=MAX_DAYS).contains(&days) {
                return Err(ConfigError::Invalid {
                    message: format!("{name} must be between 0 and {MAX_DAYS}, got {days}"),
                });
            }
        }
        if !(self.heat.medium_floor <= self.heat.high_floor
            && self.heat.high_floor <= self.heat.critical_floor)
        {
            return invalid("heat floors must be ordered medium <= high <= critical");
        }
        if self.grid.step_deg.is_nan() || self.grid.step_deg <= 0.0 {
            return invalid("grid.step_deg must be positive");
        }
        if self.grid.lat_min > self.grid.lat_max || self.grid.lon_min > self.grid.lon_max {
            return invalid("grid bounds must satisfy min <= max");
        }
        if self.backtest.recall_lookbacks_days.is_empty() {
            return invalid("backtest.recall_lookbacks_days must not be empty");
        }
        Ok(())
    }
}
