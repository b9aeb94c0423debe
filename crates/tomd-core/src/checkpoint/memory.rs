use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use super::{Checkpoint, CheckpointStore};
use crate::descriptor::FileDescriptor;

/// In-process checkpoint store: keeps the latest snapshot and counts saves.
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    latest: Mutex<Option<Checkpoint>>,
    saves: AtomicUsize,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing checkpoint (as if left by a previous run).
    pub fn with_checkpoint(checkpoint: Checkpoint) -> Self {
        Self {
            latest: Mutex::new(Some(checkpoint)),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn latest(&self) -> Option<Checkpoint> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn save(&self, completed: &[FileDescriptor], pending: &[FileDescriptor]) {
        let checkpoint = Checkpoint::new(completed, pending);
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(checkpoint);
        self.saves.fetch_add(1, Ordering::Relaxed);
    }

    fn load(&self) -> Option<Checkpoint> {
        self.latest()
    }
}
