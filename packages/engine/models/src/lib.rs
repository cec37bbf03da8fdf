#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result types and parameters for the seismic risk engine.
//!
//! A single engine evaluation yields a [`ScoreResult`]; the temporal
//! aggregator folds several of those into a [`HeatResult`]. All thresholds
//! and radii live in [`config`] so that they can be overridden from TOML.

pub mod config;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::config::HeatParams;

/// Reason reported, alone, for a post-seismic result.
pub const POST_SEISMIC_REASON: &str = "post-seismic";

/// Numeric code used for post-seismic results in tabular output.
pub const POST_SEISMIC_CODE: u32 = 9999;

/// Outcome of one engine evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ScoreOutcome {
    /// A large event recently released stress nearby; no heuristic applies.
    PostSeismic,
    /// Regular score in `0..=150`.
    Scored(u32),
}

/// Full result of one engine evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    /// Score or post-seismic marker.
    pub outcome: ScoreOutcome,
    /// Human-readable contributions, in evaluation order.
    pub reasons: Vec<String>,
    /// Nearest fault name, or a data/fault status string.
    pub fault_context: String,
}

impl ScoreResult {
    /// A regular score.
    #[must_use]
    pub fn scored(value: u32, reasons: Vec<String>, fault_context: impl Into<String>) -> Self {
        Self {
            outcome: ScoreOutcome::Scored(value),
            reasons,
            fault_context: fault_context.into(),
        }
    }

    /// A post-seismic result; its only reason is [`POST_SEISMIC_REASON`].
    #[must_use]
    pub fn post_seismic(fault_context: impl Into<String>) -> Self {
        Self {
            outcome: ScoreOutcome::PostSeismic,
            reasons: vec![POST_SEISMIC_REASON.to_string()],
            fault_context: fault_context.into(),
        }
    }

    /// Whether this is a post-seismic result.
    #[must_use]
    pub const fn is_post_seismic(&self) -> bool {
        matches!(self.outcome, ScoreOutcome::PostSeismic)
    }

    /// The regular score, or `None` for post-seismic results.
    #[must_use]
    pub const fn value(&self) -> Option<u32> {
        match self.outcome {
            ScoreOutcome::Scored(v) => Some(v),
            ScoreOutcome::PostSeismic => None,
        }
    }

    /// The score if it reaches `gate`, otherwise `0`. Post-seismic results
    /// always gate to `0`.
    #[must_use]
    pub const fn gated(&self, gate: u32) -> u32 {
        match self.outcome {
            ScoreOutcome::Scored(v) if v >= gate => v,
            _ => 0,
        }
    }

    /// Score for display, using [`POST_SEISMIC_CODE`] for post-seismic.
    #[must_use]
    pub const fn display_value(&self) -> u32 {
        match self.outcome {
            ScoreOutcome::Scored(v) => v,
            ScoreOutcome::PostSeismic => POST_SEISMIC_CODE,
        }
    }
}

/// Risk tier derived from a heat value.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum HeatLevel {
    /// Below the medium floor.
    Low,
    /// Stress is accumulating; worth watching.
    Medium,
    /// Pronounced stress.
    High,
    /// Highest tier.
    Critical,
}

impl HeatLevel {
    /// Classifies a heat value. Floors are inclusive.
    #[must_use]
    pub const fn classify(value: u32, params: &HeatParams) -> Self {
        if value >= params.critical_floor {
            Self::Critical
        } else if value >= params.high_floor {
            Self::High
        } else if value >= params.medium_floor {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Weighted multi-interval heat for a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatResult {
    /// Weighted sum of gated scores, truncated.
    pub value: u32,
    /// Tier of `value`.
    pub level: HeatLevel,
}
