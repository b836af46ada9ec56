//! Pool configuration types

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Configuration for a connection pool
///
/// Controls pool sizing, validation policy and the maintenance schedule.
/// A pool seals the configuration it adopts with [`make_immutable`]; after
/// that every `set_*` mutator fails with [`ConfigError::Immutable`].
///
/// [`make_immutable`]: PoolConfig::make_immutable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of connections kept ready in the available queue
    min_pool_size: usize,
    /// Upper bound on connections owned by the pool
    max_pool_size: usize,
    /// Validate a connection before handing it out
    validate_on_checkout: bool,
    /// Validate a connection when it is returned
    validate_on_checkin: bool,
    /// Revalidate idle connections from the background scheduler
    validate_periodically: bool,
    /// Interval in milliseconds between periodic validation runs
    validate_period_ms: u64,
    /// Interval in milliseconds between prune runs
    prune_period_ms: u64,
    /// Age in milliseconds after which an idle connection may be pruned
    expiration_time_ms: u64,
    /// How long checkout waits for a connection; 0 waits indefinitely
    block_wait_time_ms: u64,
    #[serde(skip)]
    immutable: bool,
}

impl PoolConfig {
    /// Create a new pool configuration with the given min and max sizes
    ///
    /// # Panics
    ///
    /// Panics if `min_pool_size > max_pool_size` or if `max_pool_size` is 0.
    pub fn new(min_pool_size: usize, max_pool_size: usize) -> Self {
        assert!(
            max_pool_size > 0,
            "max_pool_size must be greater than 0, got {}",
            max_pool_size
        );
        assert!(
            min_pool_size <= max_pool_size,
            "min_pool_size ({}) cannot exceed max_pool_size ({})",
            min_pool_size,
            max_pool_size
        );

        Self {
            min_pool_size,
            max_pool_size,
            validate_on_checkout: false,
            validate_on_checkin: false,
            validate_periodically: false,
            validate_period_ms: 1_800_000, // 30 minutes
            prune_period_ms: 300_000,      // 5 minutes
            expiration_time_ms: 600_000,   // 10 minutes
            block_wait_time_ms: 0,
            immutable: false,
        }
    }

    /// Enable or disable validation on checkout
    pub fn with_validate_on_checkout(mut self, enabled: bool) -> Self {
        self.assert_mutable();
        self.validate_on_checkout = enabled;
        self
    }

    /// Enable or disable validation on checkin
    pub fn with_validate_on_checkin(mut self, enabled: bool) -> Self {
        self.assert_mutable();
        self.validate_on_checkin = enabled;
        self
    }

    /// Enable or disable periodic validation of idle connections
    pub fn with_validate_periodically(mut self, enabled: bool) -> Self {
        self.assert_mutable();
        self.validate_periodically = enabled;
        self
    }

    /// Set the periodic validation interval in milliseconds
    pub fn with_validate_period_ms(mut self, period_ms: u64) -> Self {
        self.assert_mutable();
        self.validate_period_ms = period_ms;
        self
    }

    /// Set the prune interval in milliseconds
    pub fn with_prune_period_ms(mut self, period_ms: u64) -> Self {
        self.assert_mutable();
        self.prune_period_ms = period_ms;
        self
    }

    /// Set the idle expiration time in milliseconds
    pub fn with_expiration_time_ms(mut self, expiration_ms: u64) -> Self {
        self.assert_mutable();
        self.expiration_time_ms = expiration_ms;
        self
    }

    /// Set the checkout wait time in milliseconds (0 waits indefinitely)
    pub fn with_block_wait_time_ms(mut self, wait_ms: u64) -> Self {
        self.assert_mutable();
        self.block_wait_time_ms = wait_ms;
        self
    }

    pub fn set_min_pool_size(&mut self, size: usize) -> Result<(), ConfigError> {
        self.ensure_mutable()?;
        self.min_pool_size = size;
        Ok(())
    }

    pub fn set_max_pool_size(&mut self, size: usize) -> Result<(), ConfigError> {
        self.ensure_mutable()?;
        self.max_pool_size = size;
        Ok(())
    }

    pub fn set_validate_on_checkout(&mut self, enabled: bool) -> Result<(), ConfigError> {
        self.ensure_mutable()?;
        self.validate_on_checkout = enabled;
        Ok(())
    }

    pub fn set_validate_on_checkin(&mut self, enabled: bool) -> Result<(), ConfigError> {
        self.ensure_mutable()?;
        self.validate_on_checkin = enabled;
        Ok(())
    }

    pub fn set_validate_periodically(&mut self, enabled: bool) -> Result<(), ConfigError> {
        self.ensure_mutable()?;
        self.validate_periodically = enabled;
        Ok(())
    }

    pub fn set_validate_period_ms(&mut self, period_ms: u64) -> Result<(), ConfigError> {
        self.ensure_mutable()?;
        self.validate_period_ms = period_ms;
        Ok(())
    }

    pub fn set_prune_period_ms(&mut self, period_ms: u64) -> Result<(), ConfigError> {
        self.ensure_mutable()?;
        self.prune_period_ms = period_ms;
        Ok(())
    }

    pub fn set_expiration_time_ms(&mut self, expiration_ms: u64) -> Result<(), ConfigError> {
        self.ensure_mutable()?;
        self.expiration_time_ms = expiration_ms;
        Ok(())
    }

    pub fn set_block_wait_time_ms(&mut self, wait_ms: u64) -> Result<(), ConfigError> {
        self.ensure_mutable()?;
        self.block_wait_time_ms = wait_ms;
        Ok(())
    }

    /// Seal the configuration. Irreversible.
    pub fn make_immutable(&mut self) {
        self.immutable = true;
    }

    pub fn is_immutable(&self) -> bool {
        self.immutable
    }

    /// Get the minimum pool size
    pub fn min_pool_size(&self) -> usize {
        self.min_pool_size
    }

    /// Get the maximum pool size
    pub fn max_pool_size(&self) -> usize {
        self.max_pool_size
    }

    pub fn validate_on_checkout(&self) -> bool {
        self.validate_on_checkout
    }

    pub fn validate_on_checkin(&self) -> bool {
        self.validate_on_checkin
    }

    pub fn validate_periodically(&self) -> bool {
        self.validate_periodically
    }

    /// Get the periodic validation interval as a Duration
    pub fn validate_period(&self) -> Duration {
        Duration::from_millis(self.validate_period_ms)
    }

    /// Get the prune interval as a Duration
    pub fn prune_period(&self) -> Duration {
        Duration::from_millis(self.prune_period_ms)
    }

    /// Get the idle expiration time as a Duration
    pub fn expiration_time(&self) -> Duration {
        Duration::from_millis(self.expiration_time_ms)
    }

    /// Get the checkout wait time, `None` meaning wait indefinitely
    pub fn block_wait_time(&self) -> Option<Duration> {
        (self.block_wait_time_ms > 0).then(|| Duration::from_millis(self.block_wait_time_ms))
    }

    /// Check the invariants `new` asserts, for configurations that were
    /// deserialized or changed through the `set_*` mutators.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pool_size == 0 {
            return Err(ConfigError::Invalid(
                "max_pool_size must be greater than 0".to_string(),
            ));
        }
        if self.min_pool_size > self.max_pool_size {
            return Err(ConfigError::Invalid(format!(
                "min_pool_size ({}) cannot exceed max_pool_size ({})",
                self.min_pool_size, self.max_pool_size
            )));
        }
        if self.prune_period_ms == 0 {
            return Err(ConfigError::Invalid(
                "prune_period_ms must be greater than 0".to_string(),
            ));
        }
        if self.validate_period_ms == 0 {
            return Err(ConfigError::Invalid(
                "validate_period_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    fn ensure_mutable(&self) -> Result<(), ConfigError> {
        if self.immutable {
            return Err(ConfigError::Immutable);
        }
        Ok(())
    }

    fn assert_mutable(&self) {
        assert!(!self.immutable, "pool configuration is immutable");
    }
}

impl Default for PoolConfig {
    /// Create a default pool configuration
    ///
    /// Defaults:
    /// - min_pool_size: 3
    /// - max_pool_size: 10
    /// - validation: off
    /// - validate_period: 30 minutes
    /// - prune_period: 5 minutes
    /// - expiration_time: 10 minutes
    /// - block_wait_time: wait indefinitely
    fn default() -> Self {
        Self::new(3, 10)
    }
}
