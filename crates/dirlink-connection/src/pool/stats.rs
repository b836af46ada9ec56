//! Pool statistics types

use serde::{Deserialize, Serialize};

/// Snapshot of a connection pool's bookkeeping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Idle connections in the available queue
    available: usize,
    /// Connections checked out by callers
    active: usize,
    /// Capacity held for connections being created or under periodic
    /// validation
    reserved: usize,
    /// Callers blocked in checkout
    waiting: usize,
}

impl PoolStats {
    pub fn new(available: usize, active: usize, reserved: usize, waiting: usize) -> Self {
        Self {
            available,
            active,
            reserved,
            waiting,
        }
    }

    /// Every connection the pool currently accounts for
    pub fn total(&self) -> usize {
        self.available + self.active + self.reserved
    }

    pub fn available(&self) -> usize {
        self.available
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn reserved(&self) -> usize {
        self.reserved
    }

    pub fn waiting(&self) -> usize {
        self.waiting
    }

    /// Fraction of accounted connections that are checked out (0.0 to 1.0)
    ///
    /// Returns 0.0 for an empty pool.
    pub fn utilization(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.active as f64 / total as f64,
        }
    }

    /// No idle connection is left to hand out
    pub fn is_full(&self) -> bool {
        self.available == 0 && self.total() > 0
    }
}
