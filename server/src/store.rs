//! Shared store plumbing.
//!
//! The credential and todo stores are external collaborators; both report
//! failures through `StoreError`, and every call the services make is bounded
//! by `bounded` so a slow store fails the request instead of hanging it.

use std::future::Future;
use std::time::Duration;

/// Default upper bound for a single store operation.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Error returned by a store operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A record with the same unique key already exists.
    #[error("record already exists")]
    Duplicate,
    /// The record to update does not exist.
    #[error("record not found")]
    Missing,
    /// The operation did not finish within the allowed time.
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),
    /// The store is unusable (lock poisoned, connection lost, ...).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Run `op`, failing with `StoreError::Timeout` if it takes longer than `timeout`.
pub async fn bounded<T, F>(timeout: Duration, op: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(timeout, op)
        .await
        .map_err(|_| StoreError::Timeout(timeout))?
}
