pub mod config;
pub mod error;
pub mod logging;

pub mod checkpoint;
pub mod control;
pub mod converter;
pub mod descriptor;
pub mod progress;
pub mod report;
pub mod scanner;
pub mod scheduler;

pub use descriptor::FileDescriptor;
pub use scheduler::{Outcome, Scheduler, Summary, TaskResult};
