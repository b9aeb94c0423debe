use std::time::Duration;

use super::state::SchedulerState;

/// Outcome of one `process_queue` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub success_count: usize,
    pub failure_count: usize,
    pub skipped_count: usize,
    /// Descriptors dispatched in this run (pending when the run started).
    pub total: usize,
    /// Sum of per-task durations.
    pub total_duration: Duration,
    /// Descriptors already complete from an earlier run's checkpoint.
    pub previously_completed: usize,
    /// Still pending at return; non-zero only after an interruption.
    pub remaining: usize,
    pub interrupted: bool,
}

impl Summary {
    pub(crate) fn from_state(state: &SchedulerState, dispatched: usize, interrupted: bool) -> Self {
        Self {
            success_count: state.converted_count(),
            failure_count: state.failed_count(),
            skipped_count: state.skipped_count(),
            total: dispatched,
            total_duration: state.total_duration(),
            previously_completed: state.restored_count(),
            remaining: state.pending_count(),
            interrupted,
        }
    }

    /// Tasks that produced a result in this run.
    pub fn processed(&self) -> usize {
        self.success_count + self.failure_count + self.skipped_count
    }
}
