//! Pool error types

use std::time::Duration;

use dirlink_core::DirError;
use thiserror::Error;

use super::state::PoolState;

/// Errors raised while changing a [`PoolConfig`](super::PoolConfig)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("pool configuration is immutable")]
    Immutable,

    #[error("invalid pool configuration: {0}")]
    Invalid(String),
}

/// Errors returned by pool operations
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("pool is exhausted: all {max} connections are in use")]
    Exhausted { max: usize },

    #[error("timed out after {0:?} waiting for an available connection")]
    BlockingTimeout(Duration),

    #[error("interrupted while waiting for an available connection")]
    Interrupted,

    #[error("connection failed to activate")]
    Activation,

    #[error("connection failed validation")]
    Validation,

    #[error("failed to create connection: {0}")]
    Creation(#[source] DirError),

    #[error("pool is closed")]
    Closed,

    #[error("pool is {actual}, expected {expected}")]
    InvalidState {
        expected: PoolState,
        actual: PoolState,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PoolError {
    /// The pool had no capacity to offer; back off before trying again.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            PoolError::Exhausted { .. } | PoolError::BlockingTimeout(_) | PoolError::Interrupted
        )
    }

    /// The handed-out connection was bad and has been destroyed; another
    /// checkout may succeed immediately.
    pub fn is_broken_connection(&self) -> bool {
        matches!(self, PoolError::Activation | PoolError::Validation)
    }
}
