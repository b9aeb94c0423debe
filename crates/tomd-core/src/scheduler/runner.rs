//! The scheduler handle: construction, queue building and progress queries.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::queue::build_queue;
use super::state::SchedulerState;
use crate::checkpoint::{CheckpointStore, JsonCheckpointStore};
use crate::config::SchedulerConfig;
use crate::control::RunControl;
use crate::converter::Converter;
use crate::descriptor::FileDescriptor;
use crate::progress::{NoopReporter, ProgressReporter, ProgressSnapshot};
use crate::report::{LogSink, ResultSink};

pub(super) type SharedState = Arc<Mutex<SchedulerState>>;

pub(super) fn lock(state: &SharedState) -> MutexGuard<'_, SchedulerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Converts a set of descriptors with bounded concurrency, checkpointing as it goes.
///
/// Typical use: `create_task_queue(files)` once, then `process_queue().await`.
/// Collaborators (converter, checkpoint store, progress reporter, result sink,
/// run control) are all injected; nothing is read from global state.
pub struct Scheduler {
    pub(super) config: SchedulerConfig,
    pub(super) converter: Arc<dyn Converter>,
    pub(super) store: Arc<dyn CheckpointStore>,
    pub(super) reporter: Arc<dyn ProgressReporter>,
    pub(super) sink: Arc<dyn ResultSink>,
    pub(super) control: Arc<RunControl>,
    pub(super) state: SharedState,
}

impl Scheduler {
    pub fn new(
        config: SchedulerConfig,
        converter: Arc<dyn Converter>,
        store: Arc<dyn CheckpointStore>,
    ) -> Self {
        Self {
            config,
            converter,
            store,
            reporter: Arc::new(NoopReporter),
            sink: Arc::new(LogSink),
            control: Arc::new(RunControl::new()),
            state: Arc::new(Mutex::new(SchedulerState::default())),
        }
    }

    /// Scheduler with a JSON checkpoint at `config.checkpoint_path()`.
    pub fn from_config(config: SchedulerConfig, converter: Arc<dyn Converter>) -> Self {
        let store = Arc::new(JsonCheckpointStore::new(config.checkpoint_path()));
        Self::new(config, converter, store)
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_result_sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_control(mut self, control: Arc<RunControl>) -> Self {
        self.control = control;
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Token that interrupts `process_queue` when triggered.
    pub fn control(&self) -> Arc<RunControl> {
        Arc::clone(&self.control)
    }

    /// Build the task queue for `descriptors` (deduplicated by `source_path`).
    ///
    /// Restores completion from the store's checkpoint if there is one, then
    /// orders pending work smallest file first. Replaces any previous queue.
    pub fn create_task_queue(&self, descriptors: Vec<FileDescriptor>) {
        let checkpoint = self.store.load();
        let restoring = checkpoint.is_some();
        let state = build_queue(descriptors, checkpoint.as_ref());
        if restoring {
            tracing::info!(
                "restored from checkpoint: {} file(s) already completed, {} remaining",
                state.completed_count(),
                state.pending_count()
            );
        }
        *lock(&self.state) = state;
    }

    /// Current totals. Safe to call while `process_queue` is running.
    pub fn track_progress(&self) -> ProgressSnapshot {
        lock(&self.state).snapshot()
    }

    /// Cloneable read-only view for callers that poll progress from another task.
    pub fn progress_handle(&self) -> ProgressHandle {
        ProgressHandle {
            state: Arc::clone(&self.state),
        }
    }
}

/// Read-only progress access detached from the scheduler borrow.
#[derive(Clone)]
pub struct ProgressHandle {
    state: SharedState,
}

impl ProgressHandle {
    pub fn snapshot(&self) -> ProgressSnapshot {
        lock(&self.state).snapshot()
    }
}

impl std::fmt::Debug for ProgressHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ProgressHandle").field(&self.snapshot()).finish()
    }
}
