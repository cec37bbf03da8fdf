#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Seismic risk scoring.
//!
//! [`RiskEngine`] scores a single point at a single reference time from
//! catalog statistics (post-seismic state, stress transfer, b-value and
//! lunar correlation). [`TemporalAggregator`] evaluates it across several
//! look-back offsets and folds the results into a weighted heat value.

pub mod aggregate;
pub mod b_value;
pub mod lunar;
pub mod score;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregate::{HeatTimeline, Snapshot, SnapshotStatus, TemporalAggregator, weighted_heat};
pub use score::{PreparedPoint, RiskEngine};
