//! Queue construction: checkpoint restore and smallest-file-first ordering.

use std::collections::HashSet;
use std::path::Path;

use super::state::SchedulerState;
use crate::checkpoint::Checkpoint;
use crate::descriptor::FileDescriptor;

/// Split `descriptors` into restored-complete and pending, then order pending
/// by ascending size (stable, so equal sizes keep discovery order).
///
/// Only the checkpoint's `completed` list matters: anything in the input not
/// listed there is pending, and checkpoint entries missing from the input are
/// dropped. Repeated `source_path`s keep their first occurrence.
pub(crate) fn build_queue(
    descriptors: Vec<FileDescriptor>,
    checkpoint: Option<&Checkpoint>,
) -> SchedulerState {
    let mut seen = HashSet::new();
    let descriptors: Vec<FileDescriptor> = descriptors
        .into_iter()
        .filter(|d| seen.insert(d.source_path.clone()))
        .collect();

    let (restored, mut pending): (Vec<FileDescriptor>, Vec<FileDescriptor>) = match checkpoint {
        Some(cp) => {
            let done: HashSet<&Path> = cp.completed.iter().map(|d| d.key()).collect();
            descriptors
                .into_iter()
                .partition(|d| done.contains(d.key()))
        }
        None => (Vec::new(), descriptors),
    };

    pending.sort_by_key(|d| d.size_bytes);
    SchedulerState::new(restored, pending)
}
