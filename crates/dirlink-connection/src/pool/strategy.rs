//! Checkout behavior when the pool is at capacity

use serde::{Deserialize, Serialize};

/// How checkout behaves when no idle connection is available and the pool
/// has reached its ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStrategy {
    /// Fail with [`PoolError::Exhausted`](super::PoolError::Exhausted) at once
    FailFast,
    /// Wait for a checkin up to the configured block wait time
    #[default]
    Blocking,
    /// Grow past `max_pool_size` up to `ceiling`; the surplus is shed again
    /// on checkin and prune
    SoftLimit { ceiling: usize },
    /// A single physical connection; callers take turns
    Shared,
}

impl CheckoutStrategy {
    /// Absolute number of connections the pool may own
    pub fn ceiling(&self, max_pool_size: usize) -> usize {
        match self {
            CheckoutStrategy::FailFast | CheckoutStrategy::Blocking => max_pool_size,
            CheckoutStrategy::SoftLimit { ceiling } => (*ceiling).max(max_pool_size),
            CheckoutStrategy::Shared => 1,
        }
    }

    /// Number of connections the pool keeps once load subsides
    pub fn capacity(&self, max_pool_size: usize) -> usize {
        self.ceiling(max_pool_size).min(max_pool_size)
    }

    /// Whether checkout parks the caller instead of failing when full
    pub fn waits_when_full(&self) -> bool {
        matches!(self, CheckoutStrategy::Blocking | CheckoutStrategy::Shared)
    }
}
