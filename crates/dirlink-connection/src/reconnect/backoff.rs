//! Exponential backoff between connection attempts

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Exponential backoff strategy for connection retries.
///
/// Delays grow by `multiplier` per attempt up to a cap. Optional jitter
/// spreads each delay by up to 25% either way so that many clients losing
/// the same server do not reconnect in lockstep.
///
/// ```
/// use dirlink_connection::reconnect::BackoffStrategy;
/// use std::time::Duration;
///
/// let backoff = BackoffStrategy::new(100, 30_000);
/// assert_eq!(backoff.calculate_delay(0), Duration::from_millis(100));
/// assert_eq!(backoff.calculate_delay(1), Duration::from_millis(200));
/// assert_eq!(backoff.calculate_delay(20), Duration::from_millis(30_000));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffStrategy {
    /// Delay in milliseconds before the first retry
    initial_ms: u64,
    /// Cap in milliseconds for exponential growth
    max_ms: u64,
    multiplier: f64,
    jitter: bool,
}

impl BackoffStrategy {
    /// Create a strategy doubling from `initial_ms` up to `max_ms`
    pub fn new(initial_ms: u64, max_ms: u64) -> Self {
        let initial_ms = initial_ms.max(1);
        Self {
            initial_ms,
            max_ms: max_ms.max(initial_ms),
            multiplier: 2.0,
            jitter: false,
        }
    }

    /// Set the growth factor; values below 1.0 are raised to 1.0
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier.max(1.0);
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay before retry number `attempt` (0 = first retry)
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let delay_ms = (self.initial_ms as f64) * self.multiplier.powi(exponent);
        let capped_ms = delay_ms.min(self.max_ms as f64) as u64;

        if !self.jitter {
            return Duration::from_millis(capped_ms);
        }
        let spread = capped_ms / 4;
        let jittered = rand::thread_rng()
            .gen_range(capped_ms - spread..=capped_ms.saturating_add(spread));
        Duration::from_millis(jittered)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn has_jitter(&self) -> bool {
        self.jitter
    }
}

impl Default for BackoffStrategy {
    /// 100ms initial, 30 seconds max, 2x multiplier
    fn default() -> Self {
        Self::new(100, 30_000)
    }
}
