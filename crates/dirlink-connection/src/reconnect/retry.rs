//! Retrying fallible connection attempts

use std::future::Future;

use dirlink_core::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::backoff::BackoffStrategy;

/// How often, and how patiently, to retry establishing a connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// Retries after the first attempt (0 = try once)
    max_attempts: u32,
    backoff: BackoffStrategy,
}

impl ReconnectConfig {
    pub fn new(max_attempts: u32, backoff: BackoffStrategy) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Try once and give up
    pub fn no_retry() -> Self {
        Self::new(0, BackoffStrategy::default())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> &BackoffStrategy {
        &self.backoff
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self::new(3, BackoffStrategy::default())
    }
}

/// Run `operation` until it succeeds, fails with a non-transient error, or
/// runs out of retries, sleeping per the backoff strategy in between.
pub async fn retry_with_backoff<T, F, Fut>(config: &ReconnectConfig, mut operation: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < config.max_attempts => {
                let delay = config.backoff.calculate_delay(attempt);
                warn!(attempt, ?delay, error = %e, "connection attempt failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                debug!(attempt, error = %e, "giving up on connection attempt");
                return Err(e);
            }
        }
    }
}
