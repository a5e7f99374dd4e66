/*!
 * Worker-count selection and cooperative cancellation
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tracing::warn;

/// Shared flag that stops workers from starting new items.
///
/// Workers poll it once per item; work already in progress is never
/// interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
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

/// Number of CPU cores available to this process.
///
/// If detection fails (restricted containers, cgroups), falls back to a
/// single worker and warns.
pub fn available_cores() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or_else(|e| {
            warn!(
                error = %e,
                "Failed to detect available parallelism, using a single worker"
            );
            1
        })
}

/// Resolve a configured worker count (0 = auto-detect from CPU cores)
pub fn resolve_workers(configured: usize) -> usize {
    if configured == 0 {
        available_cores()
    } else {
        configured
    }
}
