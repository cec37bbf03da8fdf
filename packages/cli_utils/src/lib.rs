#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal helpers for the seismiq binary.
//!
//! [`IndicatifProgress`] renders scanner and backtest progress as
//! `indicatif` bars, and [`init_logger`] routes `log` output through
//! `indicatif-log-bridge` so log lines do not tear the bars.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use seismiq_scan::ProgressCallback;

pub use indicatif::MultiProgress;

/// An `indicatif` [`ProgressBar`] behind [`ProgressCallback`].
///
/// Starts as a spinner and switches to a bar with ETA once the total is
/// known. A grid scan calls `set_total` again for every instant, which
/// resets the bar.
pub struct IndicatifProgress {
    bar: ProgressBar,
    bar_style: ProgressStyle,
}

impl IndicatifProgress {
    /// Bar for grid cells.
    #[must_use]
    pub fn cells_bar(multi: &MultiProgress, message: &str) -> Self {
        Self::spinner(multi, message, "cyan")
    }

    /// Bar for backtest target events.
    #[must_use]
    pub fn events_bar(multi: &MultiProgress, message: &str) -> Self {
        Self::spinner(multi, message, "yellow")
    }

    fn spinner(multi: &MultiProgress, message: &str, colour: &str) -> Self {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template(&format!("{{spinner:.{colour}}} {{msg}}"))
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());

        let bar_style = ProgressStyle::with_template(&format!(
            "  {{msg}} {{wide_bar:.{colour}/dim}} {{pos}}/{{len}} {{percent}}% [{{eta}}]"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

        Self { bar, bar_style }
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_style(self.bar_style.clone());
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// Installs `pretty_env_logger`, filtered by `RUST_LOG`, behind
/// `indicatif-log-bridge`.
///
/// Returns the [`MultiProgress`] every progress bar must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    // Already set when called twice, e.g. from tests.
    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok();

    log::set_max_level(level);

    multi
}
