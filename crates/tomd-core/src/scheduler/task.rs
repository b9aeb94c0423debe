//! One unit of work: skip check, converter call, fault downgrade.

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::converter::Converter;
use crate::descriptor::FileDescriptor;
use crate::error::ConvertError;

/// How a task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
    Skipped,
}

/// Result of one attempt at one descriptor. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct TaskResult {
    pub descriptor: FileDescriptor,
    pub outcome: Outcome,
    pub message: String,
    pub duration: Duration,
}

impl TaskResult {
    fn skipped(descriptor: FileDescriptor) -> Self {
        Self {
            descriptor,
            outcome: Outcome::Skipped,
            message: "output file already exists".to_string(),
            duration: Duration::ZERO,
        }
    }

    fn failed(descriptor: FileDescriptor, err: &ConvertError, duration: Duration) -> Self {
        Self {
            descriptor,
            outcome: Outcome::Failure,
            message: err.to_string(),
            duration,
        }
    }
}

/// Per-task options copied into every spawned worker.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TaskOptions {
    pub(crate) overwrite: bool,
    pub(crate) timeout: Option<Duration>,
}

/// Runs one descriptor to a [`TaskResult`]. Never fails and never panics:
/// converter errors, panics and timeouts all become `Outcome::Failure`.
///
/// The skip check happens here, at dispatch time, so outputs created by
/// earlier tasks of the same run are seen.
pub(crate) async fn run_task(
    descriptor: FileDescriptor,
    converter: Arc<dyn Converter>,
    opts: TaskOptions,
) -> TaskResult {
    if !opts.overwrite && output_exists(&descriptor).await {
        return TaskResult::skipped(descriptor);
    }

    let started = Instant::now();
    let call = AssertUnwindSafe(converter.convert(&descriptor)).catch_unwind();
    let attempt = match opts.timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(res) => res,
            Err(_) => Ok(Err(ConvertError::TimedOut(limit))),
        },
        None => call.await,
    };
    let result = attempt
        .unwrap_or_else(|payload| Err(ConvertError::Panicked(panic_message(&*payload))));

    match result {
        Ok(conv) => TaskResult {
            descriptor,
            outcome: Outcome::Success,
            message: conv.message,
            duration: conv.duration,
        },
        Err(err) => {
            let elapsed = started.elapsed();
            TaskResult::failed(descriptor, &err, elapsed)
        }
    }
}

async fn output_exists(d: &FileDescriptor) -> bool {
    tokio::fs::try_exists(&d.output_path).await.unwrap_or(false)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
