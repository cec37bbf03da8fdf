//! Lunar-correlation decision.
//!
//! Compares the share of full-moon events in the most recent year against
//! the two years before it. The possible outcomes are mutually exclusive and
//! checked in a fixed priority order: [`LunarSignal::Crackling`], then
//! [`LunarSignal::SuddenLock`], then [`LunarSignal::CurrentSilence`].

use seismiq_catalog::WindowEntry;
use seismiq_engine_models::config::RiskParams;

const CRACKLING_BASE: u32 = 35;
const CRACKLING_FAULT_BONUS: u32 = 15;
const CRACKLING_PRIOR_SILENCE_BONUS: u32 = 25;
const SUDDEN_LOCK_ON_FAULT: u32 = 75;
const SUDDEN_LOCK_OFF_FAULT: u32 = 50;
const SILENCE_ON_FAULT: u32 = 25;
const SILENCE_OFF_FAULT: u32 = 10;

/// Full-moon tally over one time window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowRatio {
    /// Events in the window.
    pub events: usize,
    /// Of those, events flagged near full moon.
    pub full_moon: usize,
}

impl WindowRatio {
    /// Tallies a set of window entries.
    #[must_use]
    pub fn tally<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a WindowEntry<'a>>,
    {
        entries.into_iter().fold(Self::default(), |acc, entry| Self {
            events: acc.events + 1,
            full_moon: acc.full_moon + usize::from(entry.event.full_moon()),
        })
    }

    /// Full-moon share in percent; `0.0` for an empty window.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        if self.events == 0 {
            return 0.0;
        }
        self.full_moon as f64 * 100.0 / self.events as f64
    }

    /// Enough events and a ratio strictly above the active threshold.
    #[must_use]
    pub fn is_active(&self, params: &RiskParams) -> bool {
        self.events >= params.lunar_min_events && self.percent() > params.lunar_active_ratio
    }

    /// Enough events and a ratio strictly below the silent threshold.
    #[must_use]
    pub fn is_silent(&self, params: &RiskParams) -> bool {
        self.events >= params.lunar_min_events && self.percent() < params.lunar_silent_ratio
    }
}

/// Outcome of the lunar-correlation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LunarSignal {
    /// Recent year shows an elevated full-moon share.
    Crackling {
        /// The prior window was silent, which strengthens the signal.
        prior_silence: bool,
    },
    /// Prior window was active and the recent year went silent.
    SuddenLock,
    /// Recent year is silent.
    CurrentSilence,
    /// No lunar anomaly.
    None,
}

impl LunarSignal {
    /// Decides the signal from the recent and prior window tallies.
    #[must_use]
    pub fn classify(recent: &WindowRatio, prior: &WindowRatio, params: &RiskParams) -> Self {
        if recent.is_active(params) {
            Self::Crackling {
                prior_silence: prior.is_silent(params),
            }
        } else if prior.is_active(params) && recent.is_silent(params) {
            Self::SuddenLock
        } else if recent.is_silent(params) {
            Self::CurrentSilence
        } else {
            Self::None
        }
    }

    /// Score contribution of this signal.
    #[must_use]
    pub const fn points(self, on_fault: bool) -> u32 {
        match self {
            Self::Crackling { prior_silence } => {
                let mut points = CRACKLING_BASE;
                if on_fault {
                    points += CRACKLING_FAULT_BONUS;
                }
                if prior_silence {
                    points += CRACKLING_PRIOR_SILENCE_BONUS;
                }
                points
            }
            Self::SuddenLock if on_fault => SUDDEN_LOCK_ON_FAULT,
            Self::SuddenLock => SUDDEN_LOCK_OFF_FAULT,
            Self::CurrentSilence if on_fault => SILENCE_ON_FAULT,
            Self::CurrentSilence => SILENCE_OFF_FAULT,
            Self::None => 0,
        }
    }

    /// Reason label, or `None` when there is no signal.
    #[must_use]
    pub const fn label(self) -> Option<&'static str> {
        match self {
            Self::Crackling { .. } => Some("crackling"),
            Self::SuddenLock => Some("sudden lock"),
            Self::CurrentSilence => Some("suppression / silence"),
            Self::None => None,
        }
    }
}
