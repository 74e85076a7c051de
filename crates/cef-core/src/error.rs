//! Error types for explorer sessions
//!
//! Boundary no-ops (stale epochs, out-of-range selections) are not errors;
//! they come back as [`crate::ApplyOutcome`] and [`crate::SelectOutcome`]
//! values.

use crate::config::ConfigError;
use crate::registry::SessionId;
use cef_record::StoreError;

/// Main explorer error type
#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    /// Configuration rejected
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Record store could not be loaded
    #[error("record store error: {0}")]
    Store(#[from] StoreError),

    /// Background worker panicked or was cancelled
    #[error("worker task failed: {0}")]
    Worker(String),

    /// No session with this id
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    /// Coalescer task has stopped
    #[error("filter coalescer closed")]
    CoalescerClosed,
}

impl ExplorerError {
    /// Wrap a join error from a spawned task
    #[inline]
    pub(crate) fn worker(err: &tokio::task::JoinError) -> Self {
        Self::Worker(err.to_string())
    }
}
