//! Errors surfaced by the hub core.

use std::collections::TryReserveError;

#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// Session directory storage could not be allocated at startup.
    #[error("failed to initialise session directory: {0}")]
    Init(#[from] TryReserveError),
    /// No session identifier left under the active allocation policy.
    #[error("session identifiers exhausted")]
    SidExhausted,
    /// The hub worker has stopped and no longer accepts requests.
    #[error("hub worker is no longer running")]
    WorkerGone,
}
