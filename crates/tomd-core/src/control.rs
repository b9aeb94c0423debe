//! Run control for interruption: a shared flag the scheduler can also await.
//!
//! The CLI hooks Ctrl-C to [`RunControl::request_interrupt`]. The dispatch loop
//! stops starting new conversions, saves a checkpoint, lets in-flight
//! conversions finish and returns a partial summary.

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

/// Shared interruption token.
#[derive(Debug, Default)]
pub struct RunControl {
    interrupted: AtomicBool,
    notify: Notify,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request interruption. Idempotent; wakes every task waiting in `interrupted()`.
    pub fn request_interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Resolves once interruption has been requested (immediately if it already was).
    pub async fn interrupted(&self) {
        loop {
            // Register before checking the flag so a concurrent request is not missed.
            let notified = self.notify.notified();
            if self.is_interrupted() {
                return;
            }
            notified.await;
        }
    }
}
