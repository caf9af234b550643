//! Rejection reasons for a [`crate::Promise`] (C8).

use std::sync::Arc;

#[derive(Debug, Clone, thiserror::Error)]
pub enum AsyncError {
    #[error("operation timed out")]
    Timeout,
    #[error("operation was cancelled")]
    Cancelled,
    #[error("task join failed: {0}")]
    Join(Arc<tokio::task::JoinError>),
    #[error("{} operation(s) failed", .0.len())]
    Aggregate(Vec<(usize, AsyncError)>),
}
