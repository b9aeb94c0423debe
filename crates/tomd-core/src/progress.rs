//! Progress reporting for a conversion run.
//!
//! The scheduler drives a [`ProgressReporter`] (the CLI implements it with a
//! progress bar) and exposes [`ProgressSnapshot`] for read-only queries.

/// Receives progress events from the scheduler. Methods are called from the
/// single result-processing loop, never concurrently with each other.
pub trait ProgressReporter: Send + Sync {
    fn set_total(&self, _total: usize) {}
    fn increment(&self, _n: usize) {}
    fn close(&self) {}
}

/// No-op progress reporter for silent operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {}

/// Calls `close()` on the reporter when dropped, whichever way the run ends.
pub(crate) struct CloseOnDrop<'a>(pub(crate) &'a dyn ProgressReporter);

impl Drop for CloseOnDrop<'_> {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Point-in-time view of scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub failed: usize,
}

impl ProgressSnapshot {
    /// Fraction complete (`completed / total`); 0 when there is nothing to do.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64
    }
}
