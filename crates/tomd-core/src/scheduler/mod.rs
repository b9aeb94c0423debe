//! Conversion scheduler.
//!
//! Builds the task queue (checkpoint restore, smallest file first), runs
//! conversions on a bounded pool of tasks, tracks pending/completed/failed
//! descriptors, checkpoints periodically and on interruption, and returns a
//! [`Summary`] when the queue drains.

mod parallel;
mod queue;
mod runner;
mod state;
mod summary;
mod task;

pub use runner::{ProgressHandle, Scheduler};
pub use summary::Summary;
pub use task::{Outcome, TaskResult};
