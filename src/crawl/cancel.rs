// src/crawl/cancel.rs
// =============================================================================
// Run-level cancellation.
//
// A CancelHandle is shared between the crawler and whoever wants to stop it
// (the Ctrl-C handler in main.rs). Once cancelled, the crawler stops handing
// out new tasks and waits for the fetches already in flight to finish.
// Cancelling twice is the same as cancelling once.
// =============================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
