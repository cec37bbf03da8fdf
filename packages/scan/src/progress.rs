//! Progress reporting and cancellation for long-running scans.
//!
//! The scanner and backtest harness only know the [`ProgressCallback`]
//! trait; the binary decides whether that renders as a terminal bar or
//! nothing at all.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Receives progress updates from scans and backtests.
///
/// Called from rayon worker threads, hence `Send + Sync`.
pub trait ProgressCallback: Send + Sync {
    /// Total units of work (cells or events).
    fn set_total(&self, total: u64);

    /// One or more units finished.
    fn inc(&self, delta: u64);

    /// Short description of the current phase.
    fn set_message(&self, msg: String);

    /// All work finished.
    fn finish(&self, msg: String);
}

/// Discards every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Shared flag a caller trips to stop a running scan.
///
/// Workers check it before each cell; a tripped scan returns
/// [`crate::ScanError::Cancelled`] instead of a partial result.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
