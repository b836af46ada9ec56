//! Policies deciding when an idle connection is stale

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

/// Timestamps the pool keeps for every connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryTimes {
    /// When the factory created the connection
    pub created_at: Instant,
    /// When the connection last entered the available queue
    pub available_since: Instant,
}

impl EntryTimes {
    pub(crate) fn new(now: Instant) -> Self {
        Self {
            created_at: now,
            available_since: now,
        }
    }
}

/// Decides whether an idle connection may be pruned
pub trait PruneStrategy: Send + Sync + fmt::Debug {
    fn is_expired(&self, times: &EntryTimes, expiration: Duration, now: Instant) -> bool;
}

/// Expires connections older than the expiration time, however recently
/// they were used. This is the default.
#[derive(Debug, Default, Clone, Copy)]
pub struct AgePruneStrategy;

impl PruneStrategy for AgePruneStrategy {
    fn is_expired(&self, times: &EntryTimes, expiration: Duration, now: Instant) -> bool {
        now.saturating_duration_since(times.created_at) > expiration
    }
}

/// Expires connections that sat in the available queue longer than the
/// expiration time.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdlePruneStrategy;

impl PruneStrategy for IdlePruneStrategy {
    fn is_expired(&self, times: &EntryTimes, expiration: Duration, now: Instant) -> bool {
        now.saturating_duration_since(times.available_since) > expiration
    }
}
