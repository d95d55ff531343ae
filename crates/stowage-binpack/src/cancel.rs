//! Cooperative cancellation for placement calls.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::PackingError;

/// A cheaply cloneable cancellation flag.
///
/// The strategies check the token at every driver-candidate iteration and
/// every executor placement, aborting with [`PackingError::Cancelled`]
/// without a partial result. Timeouts are the caller's concern: the engine
/// reads no clocks. `CancelToken::default()` never fires, for callers
/// placing without a deadline.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Every clone of this token observes it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// One-line checkpoint for strategy loops.
    pub fn bail_if_cancelled(&self) -> Result<(), PackingError> {
        if self.is_cancelled() {
            Err(PackingError::Cancelled)
        } else {
            Ok(())
        }
    }
}
