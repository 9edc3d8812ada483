//! Cooperative cancellation (spec §5 "cancellation").
//!
//! Same shape as `tokio_util::sync::CancellationToken` but dependency-free
//! since the core has no async runtime: a single `Arc<AtomicBool>` flag
//! checked at every suspension point (adapter call, file read).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::ScError;

#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Returns `Err(ScError::Cancelled)` if cancellation was requested.
    /// Called at every suspension point in the orchestrator.
    pub fn check(&self) -> Result<(), ScError> {
        if self.is_cancelled() {
            Err(ScError::Cancelled)
        } else {
            Ok(())
        }
    }
}
