//! Pool lifecycle states

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of a connection pool
///
/// `Uninitialized -> Initializing -> Ready -> Closing -> Closed`. A pool may
/// also be closed before it was ever initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolState {
    Uninitialized,
    Initializing,
    Ready,
    Closing,
    Closed,
}

impl PoolState {
    /// Whether `close()` has been called
    pub fn is_shut_down(&self) -> bool {
        matches!(self, PoolState::Closing | PoolState::Closed)
    }
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PoolState::Uninitialized => "uninitialized",
            PoolState::Initializing => "initializing",
            PoolState::Ready => "ready",
            PoolState::Closing => "closing",
            PoolState::Closed => "closed",
        };
        f.write_str(name)
    }
}
