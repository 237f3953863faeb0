//! Cooperative cancellation for one in-flight batch.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A shared cancellation flag, created fresh for every batch and never
/// reused. Requesting cancellation is idempotent, and requesting it when
/// nothing is running is a no-op by construction.
///
/// Cancellation is cooperative only: the orchestrator observes the flag at
/// the per-unit boundary and never interrupts an in-flight executor call.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    requested: Arc<AtomicBool>,
}

impl CancelHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call any number of times.
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// `true` once cancellation has been requested.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}
