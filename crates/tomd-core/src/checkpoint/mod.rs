//! Run checkpoints: which descriptors are done and which still need work.
//!
//! A checkpoint is written periodically while the scheduler runs and read once
//! when the next run builds its queue. Losing or corrupting it only costs
//! resumability, never the current run.

mod json_store;
mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::descriptor::FileDescriptor;

pub use json_store::JsonCheckpointStore;
pub use memory::MemoryCheckpointStore;

/// Serialized snapshot of scheduler progress.
///
/// Failed descriptors are stored in `pending` so they are retried on resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub completed: Vec<FileDescriptor>,
    #[serde(default)]
    pub pending: Vec<FileDescriptor>,
}

impl Checkpoint {
    pub fn new(completed: &[FileDescriptor], pending: &[FileDescriptor]) -> Self {
        Self {
            timestamp: Utc::now(),
            completed: completed.to_vec(),
            pending: pending.to_vec(),
        }
    }
}

/// Where checkpoints are persisted.
///
/// Implementations swallow their own I/O errors (logging them): `save` must
/// never abort a run and `load` returns `None` for anything unusable.
pub trait CheckpointStore: Send + Sync {
    fn save(&self, completed: &[FileDescriptor], pending: &[FileDescriptor]);

    fn load(&self) -> Option<Checkpoint>;
}
