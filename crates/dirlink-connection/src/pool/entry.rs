//! Pool bookkeeping entries and the caller-facing connection handle

use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Weak};

use dirlink_core::Connection;
use tokio::time::Instant;
use uuid::Uuid;

use super::pool::PoolInner;
use super::prune::EntryTimes;

/// A connection tracked by the pool, identified by the id it received when
/// the factory handed it over.
pub(crate) struct PoolEntry<C> {
    id: Uuid,
    connection: Arc<C>,
    times: EntryTimes,
    overflow: bool,
}

impl<C> PoolEntry<C> {
    pub(crate) fn new(connection: C, overflow: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            connection: Arc::new(connection),
            times: EntryTimes::new(Instant::now()),
            overflow,
        }
    }

    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn connection(&self) -> &C {
        &self.connection
    }

    pub(crate) fn times(&self) -> &EntryTimes {
        &self.times
    }

    pub(crate) fn mark_available(&mut self) {
        self.times.available_since = Instant::now();
    }
}

impl<C> Clone for PoolEntry<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            connection: Arc::clone(&self.connection),
            times: self.times,
            overflow: self.overflow,
        }
    }
}

/// A connection checked out of a [`ConnectionPool`](super::ConnectionPool)
///
/// Hand it back with [`ConnectionPool::checkin`](super::ConnectionPool::checkin).
/// A handle dropped without checkin is returned to its pool on a background
/// task so its capacity is not lost.
pub struct PooledConnection<C: Connection + 'static> {
    entry: PoolEntry<C>,
    pool: Weak<PoolInner<C>>,
    released: bool,
}

impl<C: Connection + 'static> PooledConnection<C> {
    pub(crate) fn new(entry: PoolEntry<C>, pool: Weak<PoolInner<C>>) -> Self {
        Self {
            entry,
            pool,
            released: false,
        }
    }

    /// Identity of the pooled connection, stable for its whole life
    pub fn id(&self) -> Uuid {
        self.entry.id
    }

    /// When the factory created this connection
    pub fn created_at(&self) -> Instant {
        self.entry.times.created_at
    }

    /// Whether this connection was created beyond `max_pool_size` under a
    /// soft limit
    pub fn is_overflow(&self) -> bool {
        self.entry.overflow
    }

    /// Shared reference to the underlying connection
    pub fn connection(&self) -> &Arc<C> {
        &self.entry.connection
    }

    pub(crate) fn belongs_to(&self, pool: &Arc<PoolInner<C>>) -> bool {
        std::ptr::eq(self.pool.as_ptr(), Arc::as_ptr(pool))
    }

    /// Detach the entry; the handle's drop no longer returns it.
    pub(crate) fn release(mut self) -> PoolEntry<C> {
        self.released = true;
        self.entry.clone()
    }
}

impl<C: Connection + 'static> Deref for PooledConnection<C> {
    type Target = C;

    fn deref(&self) -> &Self::Target {
        &self.entry.connection
    }
}

impl<C: Connection + 'static> fmt::Debug for PooledConnection<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledConnection")
            .field("id", &self.entry.id)
            .field("connection", &self.entry.connection.describe())
            .field("overflow", &self.entry.overflow)
            .finish()
    }
}

impl<C: Connection + 'static> Drop for PooledConnection<C> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Some(pool) = self.pool.upgrade() {
            pool.return_dropped(self.entry.clone());
        }
    }
}
