//! Scheduler state: every descriptor of the run is in exactly one slot.
//!
//! `pending`, `completed` and `failed` are views over one slot vector, so they
//! are disjoint and cover the whole run by construction. Only the dispatch
//! loop mutates it; readers take snapshots under the same lock.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::time::Duration;

use super::task::Outcome;
use crate::descriptor::FileDescriptor;
use crate::progress::ProgressSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Pending,
    /// Completed in an earlier run (restored from checkpoint).
    Restored,
    Converted,
    Skipped,
    Failed,
}

impl Slot {
    #[cfg(test)]
    fn is_completed(self) -> bool {
        matches!(self, Slot::Restored | Slot::Converted | Slot::Skipped)
    }
}

/// Lists written to a checkpoint.
#[derive(Debug, Clone, Default)]
pub(crate) struct CheckpointLists {
    pub(crate) completed: Vec<FileDescriptor>,
    pub(crate) pending: Vec<FileDescriptor>,
}

#[derive(Debug, Default)]
pub(crate) struct SchedulerState {
    /// Restored descriptors first, then pending ones in dispatch order.
    entries: Vec<FileDescriptor>,
    slots: Vec<Slot>,
    index: HashMap<PathBuf, usize>,
    pending: usize,
    restored: usize,
    converted: usize,
    skipped: usize,
    failed: usize,
    total_duration: Duration,
}

impl SchedulerState {
    /// `restored` are already complete; `pending` must already be in dispatch order.
    pub(crate) fn new(restored: Vec<FileDescriptor>, pending: Vec<FileDescriptor>) -> Self {
        let restored_len = restored.len();
        let pending_len = pending.len();
        let mut slots = vec![Slot::Restored; restored_len];
        slots.extend(std::iter::repeat(Slot::Pending).take(pending_len));
        let entries: Vec<FileDescriptor> = restored.into_iter().chain(pending).collect();
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, d)| (d.source_path.clone(), i))
            .collect();
        Self {
            entries,
            slots,
            index,
            pending: pending_len,
            restored: restored_len,
            ..Default::default()
        }
    }

    /// Indices of pending descriptors in dispatch order.
    pub(crate) fn pending_queue(&self) -> VecDeque<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == Slot::Pending)
            .map(|(i, _)| i)
            .collect()
    }

    pub(crate) fn descriptor(&self, idx: usize) -> &FileDescriptor {
        &self.entries[idx]
    }

    pub(crate) fn index_of(&self, key: &std::path::Path) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Move a pending descriptor to its final slot. Returns false (and changes
    /// nothing) if it was not pending.
    pub(crate) fn resolve(&mut self, idx: usize, outcome: Outcome, duration: Duration) -> bool {
        let Some(slot) = self.slots.get_mut(idx) else {
            return false;
        };
        if *slot != Slot::Pending {
            return false;
        }
        *slot = match outcome {
            Outcome::Success => Slot::Converted,
            Outcome::Skipped => Slot::Skipped,
            Outcome::Failure => Slot::Failed,
        };
        self.pending -= 1;
        match outcome {
            Outcome::Success => self.converted += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failure => self.failed += 1,
        }
        self.total_duration += duration;
        true
    }

    pub(crate) fn total(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn pending_count(&self) -> usize {
        self.pending
    }

    pub(crate) fn completed_count(&self) -> usize {
        self.restored + self.converted + self.skipped
    }

    pub(crate) fn failed_count(&self) -> usize {
        self.failed
    }

    pub(crate) fn restored_count(&self) -> usize {
        self.restored
    }

    pub(crate) fn converted_count(&self) -> usize {
        self.converted
    }

    pub(crate) fn skipped_count(&self) -> usize {
        self.skipped
    }

    pub(crate) fn total_duration(&self) -> Duration {
        self.total_duration
    }

    pub(crate) fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total: self.total(),
            completed: self.completed_count(),
            pending: self.pending,
            failed: self.failed,
        }
    }

    /// Checkpoint view: converted and restored files are complete; everything
    /// else (pending, failed, skipped) is written as pending and reconsidered
    /// next run. Skipped files resolve to `Skipped` again as long as their
    /// output still exists.
    pub(crate) fn checkpoint_lists(&self) -> CheckpointLists {
        let mut lists = CheckpointLists::default();
        for (d, slot) in self.entries.iter().zip(&self.slots) {
            match slot {
                Slot::Restored | Slot::Converted => lists.completed.push(d.clone()),
                Slot::Pending | Slot::Skipped | Slot::Failed => lists.pending.push(d.clone()),
            }
        }
        lists
    }

    /// Descriptors per set, for invariant checks.
    #[cfg(test)]
    pub(crate) fn partition(
        &self,
    ) -> (Vec<&FileDescriptor>, Vec<&FileDescriptor>, Vec<&FileDescriptor>) {
        let mut pending = Vec::new();
        let mut completed = Vec::new();
        let mut failed = Vec::new();
        for (d, slot) in self.entries.iter().zip(&self.slots) {
            if *slot == Slot::Pending {
                pending.push(d);
            } else if slot.is_completed() {
                completed.push(d);
            } else {
                failed.push(d);
            }
        }
        (pending, completed, failed)
    }
}
