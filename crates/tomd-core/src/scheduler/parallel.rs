//! Run queued conversions concurrently.
//!
//! Keeps up to `thread_count` conversions in flight; when one finishes, the
//! next queued descriptor is started until the queue is empty. Results are
//! handled one at a time in completion order by this loop, which is the only
//! writer of scheduler state, checkpoints and progress.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{Id, JoinError, JoinSet};

use super::runner::{lock, Scheduler};
use super::state::CheckpointLists;
use super::summary::Summary;
use super::task::{run_task, Outcome, TaskOptions, TaskResult};
use crate::progress::CloseOnDrop;

/// Save a checkpoint at least every this many results.
pub(crate) const CHECKPOINT_EVERY: usize = 10;

/// Also save whenever completed+failed crosses a 1/20 (5%) boundary of the total.
const CHECKPOINT_STEPS: usize = 20;

/// Whether the `processed`-th result of this run, which moved the
/// completed+failed count from `done_before` to `done_after` out of `total`
/// descriptors, should trigger a checkpoint.
pub(crate) fn checkpoint_due(
    processed: usize,
    done_before: usize,
    done_after: usize,
    total: usize,
) -> bool {
    if processed % CHECKPOINT_EVERY == 0 {
        return true;
    }
    let step = (total / CHECKPOINT_STEPS).max(1);
    done_before / step != done_after / step
}

impl Scheduler {
    /// Convert every pending descriptor and return the run summary.
    ///
    /// Never fails: per-file problems become `Failure` results, checkpoint
    /// write errors are logged, and an interruption (see [`Scheduler::control`])
    /// returns a partial summary with `interrupted = true` after saving a
    /// checkpoint and letting in-flight conversions finish. Results of those
    /// late conversions are not recorded; the files stay pending.
    pub async fn process_queue(&self) -> Summary {
        let (mut queue, total) = {
            let state = lock(&self.state);
            (state.pending_queue(), state.total())
        };
        let dispatched = queue.len();
        if dispatched == 0 {
            tracing::info!("no files need processing");
            return Summary::from_state(&lock(&self.state), 0, false);
        }

        let workers = self.config.thread_count();
        tracing::info!(
            "processing {} file(s) with {} worker(s) using the {} converter",
            dispatched,
            workers,
            self.converter.name()
        );
        // Initial snapshot: a crash before the first periodic save still leaves a checkpoint.
        self.save_checkpoint().await;
        self.reporter.set_total(dispatched);
        let _close = CloseOnDrop(self.reporter.as_ref());

        let opts = TaskOptions {
            overwrite: self.config.overwrite(),
            timeout: self.config.convert_timeout(),
        };
        let mut join_set = JoinSet::new();
        // Task id -> slot index, so a task lost to a join error still resolves its slot.
        let mut in_flight: HashMap<Id, usize> = HashMap::new();
        let mut processed = 0usize;
        let mut interrupted = false;

        loop {
            if queue.is_empty() && join_set.is_empty() {
                break;
            }
            if self.control.is_interrupted() {
                interrupted = true;
                break;
            }

            while join_set.len() < workers {
                let Some(idx) = queue.pop_front() else {
                    break;
                };
                let descriptor = lock(&self.state).descriptor(idx).clone();
                let converter = Arc::clone(&self.converter);
                let handle = join_set.spawn(run_task(descriptor, converter, opts));
                in_flight.insert(handle.id(), idx);
            }

            tokio::select! {
                biased;
                _ = self.control.interrupted() => {
                    interrupted = true;
                    break;
                }
                joined = join_set.join_next_with_id() => match joined {
                    Some(Ok((id, result))) => {
                        in_flight.remove(&id);
                        processed += 1;
                        self.handle_result(result, processed, total).await;
                    }
                    Some(Err(e)) => {
                        if let Some(result) = self.join_failure(e, &mut in_flight) {
                            processed += 1;
                            self.handle_result(result, processed, total).await;
                        }
                    }
                    None => {}
                },
            }
        }

        if interrupted {
            tracing::warn!(
                "interrupted: saving checkpoint, waiting for {} in-flight conversion(s)",
                join_set.len()
            );
            self.save_checkpoint().await;
            let summary = Summary::from_state(&lock(&self.state), dispatched, true);
            while let Some(joined) = join_set.join_next().await {
                if let Ok(result) = joined {
                    tracing::debug!(
                        path = %result.descriptor.source_path.display(),
                        "conversion finished after interrupt; left pending"
                    );
                }
            }
            return summary;
        }

        self.save_checkpoint().await;
        Summary::from_state(&lock(&self.state), dispatched, false)
    }

    /// Record one result: move it out of pending, log it, tick progress and
    /// save a checkpoint when due.
    async fn handle_result(&self, result: TaskResult, processed: usize, total: usize) {
        let due = {
            let mut state = lock(&self.state);
            let Some(idx) = state.index_of(result.descriptor.key()) else {
                tracing::warn!(
                    path = %result.descriptor.source_path.display(),
                    "result for unknown descriptor ignored"
                );
                return;
            };
            let done_before = state.completed_count() + state.failed_count();
            if !state.resolve(idx, result.outcome, result.duration) {
                tracing::warn!(
                    path = %result.descriptor.source_path.display(),
                    "duplicate result ignored"
                );
                return;
            }
            let done_after = state.completed_count() + state.failed_count();
            checkpoint_due(processed, done_before, done_after, total)
                .then(|| state.checkpoint_lists())
        };

        self.sink.record(&result);
        self.reporter.increment(1);

        if let Some(lists) = due {
            self.persist(lists).await;
        }
    }

    /// Turn a task that ended without a result (panic outside the converter,
    /// cancellation) into a `Failure` for its descriptor.
    fn join_failure(
        &self,
        err: JoinError,
        in_flight: &mut HashMap<Id, usize>,
    ) -> Option<TaskResult> {
        let Some(idx) = in_flight.remove(&err.id()) else {
            tracing::error!("conversion task join: {}", err);
            return None;
        };
        let descriptor = lock(&self.state).descriptor(idx).clone();
        Some(TaskResult {
            descriptor,
            outcome: Outcome::Failure,
            message: format!("conversion task failed: {err}"),
            duration: Duration::ZERO,
        })
    }

    async fn save_checkpoint(&self) {
        let lists = lock(&self.state).checkpoint_lists();
        self.persist(lists).await;
    }

    /// Write a checkpoint on the blocking pool. Awaited, so saves stay ordered
    /// with state changes.
    async fn persist(&self, lists: CheckpointLists) {
        let store = Arc::clone(&self.store);
        let saved =
            tokio::task::spawn_blocking(move || store.save(&lists.completed, &lists.pending)).await;
        if let Err(e) = saved {
            tracing::warn!("checkpoint save task failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::{Checkpoint, CheckpointStore, MemoryCheckpointStore};
    use crate::config::SchedulerConfig;
    use crate::converter::DryRunConverter;
    use crate::descriptor::FileDescriptor;
    use std::sync::{Mutex, PoisonError};
    use std::thread::ThreadId;

    #[test]
    fn every_tenth_result_is_checkpointed() {
        // 1000 descriptors: 5% step is 50, so only the every-10 rule fires here.
        assert!(!checkpoint_due(9, 8, 9, 1000));
        assert!(checkpoint_due(10, 9, 10, 1000));
        assert!(checkpoint_due(20, 19, 20, 1000));
    }

    #[test]
    fn crossing_five_percent_boundary_is_checkpointed() {
        // 400 descriptors: step 20. Restored work shifts done counts off the processed count.
        assert!(checkpoint_due(3, 19, 20, 400));
        assert!(!checkpoint_due(3, 20, 21, 400));
    }

    #[test]
    fn small_runs_checkpoint_every_result() {
        assert!(checkpoint_due(1, 0, 1, 7));
        assert!(checkpoint_due(3, 2, 3, 7));
    }

    fn scheduler(dir: &std::path::Path, store: Arc<dyn CheckpointStore>) -> Scheduler {
        let s = Scheduler::new(
            SchedulerConfig::new(2, false, "unused.json"),
            Arc::new(DryRunConverter::new(Duration::ZERO)),
            store,
        );
        s.create_task_queue(
            ["a.pdf", "b.pdf", "c.pdf"]
                .iter()
                .map(|n| FileDescriptor::new(dir.join(n), dir.join(format!("{n}.md")), 1))
                .collect(),
        );
        s
    }

    /// Records which thread each save ran on.
    #[derive(Default)]
    struct ThreadStore {
        threads: Mutex<Vec<ThreadId>>,
    }

    impl CheckpointStore for ThreadStore {
        fn save(&self, _completed: &[FileDescriptor], _pending: &[FileDescriptor]) {
            self.threads
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(std::thread::current().id());
        }

        fn load(&self) -> Option<Checkpoint> {
            None
        }
    }

    #[tokio::test]
    async fn checkpoint_saves_run_off_the_runtime_thread() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ThreadStore::default());
        let s = scheduler(dir.path(), store.clone());
        s.process_queue().await;

        // Current-thread runtime: the test thread is the only runtime worker.
        let runtime_thread = std::thread::current().id();
        let threads = store.threads.lock().unwrap().clone();
        assert!(!threads.is_empty());
        assert!(threads.iter().all(|t| *t != runtime_thread));
    }

    #[tokio::test]
    async fn task_lost_to_join_error_is_resolved_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryCheckpointStore::new());
        let s = scheduler(dir.path(), store.clone());

        let mut set: JoinSet<TaskResult> = JoinSet::new();
        let mut in_flight = HashMap::new();
        let handle = set.spawn(async { panic!("worker died") });
        in_flight.insert(handle.id(), 0);
        let err = set.join_next_with_id().await.unwrap().unwrap_err();

        let result = s.join_failure(err, &mut in_flight).unwrap();
        assert_eq!(result.outcome, Outcome::Failure);
        assert!(in_flight.is_empty());
        s.handle_result(result, 1, 3).await;

        let snap = s.track_progress();
        assert_eq!((snap.pending, snap.failed), (2, 1));
        // Unknown task ids are only logged.
        let _ = set.spawn(async { panic!("untracked") });
        let err = set.join_next_with_id().await.unwrap().unwrap_err();
        assert!(s.join_failure(err, &mut in_flight).is_none());
    }
}
