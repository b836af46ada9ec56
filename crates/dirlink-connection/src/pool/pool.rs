//! Connection pool implementation

use std::collections::VecDeque;
use std::future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dirlink_core::Connection;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use super::config::PoolConfig;
use super::entry::{PoolEntry, PooledConnection};
use super::error::PoolError;
use super::factory::ConnectionFactory;
use super::prune::{AgePruneStrategy, PruneStrategy};
use super::scheduler;
use super::state::PoolState;
use super::stats::PoolStats;
use super::strategy::CheckoutStrategy;

/// Where a connection currently sits in a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// Idle in the available queue
    Available,
    /// Checked out by a caller
    Active,
    /// Not tracked by this pool (destroyed, or owned by another pool)
    Untracked,
}

/// Everything guarded by the pool-wide lock
struct Queues<C> {
    state: PoolState,
    /// Idle connections, oldest first
    available: VecDeque<PoolEntry<C>>,
    active: Vec<PoolEntry<C>>,
    /// Capacity held by connections being created or withdrawn for
    /// validation; in neither queue
    reserved: usize,
}

impl<C> Queues<C> {
    fn new() -> Self {
        Self {
            state: PoolState::Uninitialized,
            available: VecDeque::new(),
            active: Vec::new(),
            reserved: 0,
        }
    }

    fn total(&self) -> usize {
        self.available.len() + self.active.len() + self.reserved
    }

    fn is_busy(&self) -> bool {
        !self.active.is_empty() || self.reserved > 0
    }

    fn membership(&self, id: Uuid) -> Membership {
        if self.active.iter().any(|e| e.id() == id) {
            Membership::Active
        } else if self.available.iter().any(|e| e.id() == id) {
            Membership::Available
        } else {
            Membership::Untracked
        }
    }

    fn take_active(&mut self, id: Uuid) -> Option<PoolEntry<C>> {
        let index = self.active.iter().position(|e| e.id() == id)?;
        Some(self.active.swap_remove(index))
    }

    /// Remove a connection from whichever queue holds it
    fn take_any(&mut self, id: Uuid) -> Option<PoolEntry<C>> {
        if let Some(entry) = self.take_active(id) {
            return Some(entry);
        }
        let index = self.available.iter().position(|e| e.id() == id)?;
        self.available.remove(index)
    }

    fn ensure_ready(&self) -> Result<(), PoolError> {
        match self.state {
            PoolState::Ready => Ok(()),
            state if state.is_shut_down() => Err(PoolError::Closed),
            actual => Err(PoolError::InvalidState {
                expected: PoolState::Ready,
                actual,
            }),
        }
    }

    fn accepts_connections(&self) -> bool {
        matches!(self.state, PoolState::Initializing | PoolState::Ready)
    }
}

/// Outcome of inspecting the queues at the start of a checkout
enum Claim<'a, C: Connection + 'static> {
    Idle(PoolEntry<C>),
    Create {
        reservation: Reservation<'a, C>,
        overflow: bool,
    },
    Full,
}

/// One unit of capacity held while a connection is created outside the lock.
/// Dropping it unreleased gives the capacity back.
struct Reservation<'a, C: Connection + 'static> {
    pool: &'a PoolInner<C>,
    held: bool,
}

impl<C: Connection + 'static> Reservation<'_, C> {
    fn release(mut self, queues: &mut Queues<C>) {
        queues.reserved -= 1;
        self.held = false;
    }
}

impl<C: Connection + 'static> Drop for Reservation<'_, C> {
    fn drop(&mut self) {
        if self.held {
            self.pool.queues.lock().reserved -= 1;
            self.pool.not_empty.notify_one();
        }
    }
}

/// Idle connections taken out of the available queue for periodic
/// validation. Whatever is left in it on drop goes back to the front of the
/// queue.
struct Withdrawn<'a, C: Connection + 'static> {
    pool: &'a PoolInner<C>,
    entries: Vec<PoolEntry<C>>,
}

impl<C: Connection + 'static> Drop for Withdrawn<'_, C> {
    fn drop(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let mut queues = self.pool.queues.lock();
        queues.reserved -= self.entries.len();
        if queues.state == PoolState::Ready {
            for entry in self.entries.drain(..).rev() {
                queues.available.push_front(entry);
            }
        } else {
            warn!(
                connections = self.entries.len(),
                "abandoned validation after close, connections dropped without destroy"
            );
        }
    }
}

/// Counts a caller parked in checkout
struct WaitingGuard<'a>(&'a AtomicUsize);

impl<'a> WaitingGuard<'a> {
    fn new(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for WaitingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}

async fn wait_cancelled(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => future::pending().await,
    }
}

/// Pool state shared with connection handles and the maintenance task
pub(crate) struct PoolInner<C: Connection + 'static> {
    config: PoolConfig,
    strategy: CheckoutStrategy,
    factory: Box<dyn ConnectionFactory<C>>,
    prune_strategy: Box<dyn PruneStrategy>,
    queues: Mutex<Queues<C>>,
    /// Signalled whenever a connection or capacity is handed back
    not_empty: Notify,
    shutdown: CancellationToken,
    waiting: AtomicUsize,
}

impl<C: Connection + 'static> PoolInner<C> {
    fn ceiling(&self) -> usize {
        self.strategy.ceiling(self.config.max_pool_size())
    }

    fn capacity(&self) -> usize {
        self.strategy.capacity(self.config.max_pool_size())
    }

    fn reserve(&self, queues: &mut Queues<C>) -> Reservation<'_, C> {
        queues.reserved += 1;
        Reservation {
            pool: self,
            held: true,
        }
    }

    fn handle(self: &Arc<Self>, entry: PoolEntry<C>) -> PooledConnection<C> {
        PooledConnection::new(entry, Arc::downgrade(self))
    }

    fn claim(&self) -> Result<Claim<'_, C>, PoolError> {
        let mut queues = self.queues.lock();
        queues.ensure_ready()?;

        if let Some(entry) = queues.available.pop_front() {
            queues.active.push(entry.clone());
            return Ok(Claim::Idle(entry));
        }

        let total = queues.total();
        if total < self.ceiling() {
            let overflow = total >= self.config.max_pool_size();
            let reservation = self.reserve(&mut queues);
            return Ok(Claim::Create {
                reservation,
                overflow,
            });
        }

        Ok(Claim::Full)
    }

    async fn checkout(
        self: &Arc<Self>,
        cancel: Option<&CancellationToken>,
    ) -> Result<PooledConnection<C>, PoolError> {
        let wait = self.config.block_wait_time();
        let deadline = wait.map(|wait| Instant::now() + wait);

        loop {
            // Registered before inspecting the queues so a checkin racing
            // with this iteration still wakes us.
            let notified = self.not_empty.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.claim()? {
                Claim::Idle(entry) => {
                    trace!(connection = %entry.id(), "checked out idle connection");
                    return self.activate_and_validate(self.handle(entry)).await;
                }
                Claim::Create {
                    reservation,
                    overflow,
                } => {
                    let entry = self.create_active(reservation, overflow).await?;
                    return self.activate_and_validate(self.handle(entry)).await;
                }
                Claim::Full => {}
            }

            let ceiling = self.ceiling();
            if !self.strategy.waits_when_full() {
                debug!(ceiling, "pool exhausted");
                return Err(PoolError::Exhausted { max: ceiling });
            }

            let _waiting = WaitingGuard::new(&self.waiting);
            trace!(ceiling, "waiting for an available connection");
            tokio::select! {
                _ = &mut notified => {}
                _ = self.shutdown.cancelled() => return Err(PoolError::Closed),
                _ = wait_cancelled(cancel) => return Err(PoolError::Interrupted),
                _ = wait_until(deadline) => {
                    let waited = wait.unwrap_or_default();
                    debug!(?waited, "timed out waiting for an available connection");
                    return Err(PoolError::BlockingTimeout(waited));
                }
            }
        }
    }

    /// Create a connection for a checkout and place it in the active queue
    async fn create_active(
        &self,
        reservation: Reservation<'_, C>,
        overflow: bool,
    ) -> Result<PoolEntry<C>, PoolError> {
        let created = self.factory.create().await;

        let (entry, shut_down) = {
            let mut queues = self.queues.lock();
            reservation.release(&mut queues);
            match created {
                Ok(conn) => {
                    let entry = PoolEntry::new(conn, overflow);
                    let shut_down = queues.state.is_shut_down();
                    if !shut_down {
                        queues.active.push(entry.clone());
                    }
                    (Ok(entry), shut_down)
                }
                Err(e) => (Err(e), false),
            }
        };

        match entry {
            Ok(entry) if shut_down => {
                self.factory.destroy(entry.connection()).await;
                Err(PoolError::Closed)
            }
            Ok(entry) => {
                trace!(connection = %entry.id(), overflow, "created connection");
                Ok(entry)
            }
            Err(e) => {
                self.not_empty.notify_one();
                warn!(error = %e, "failed to create connection");
                Err(PoolError::Creation(e))
            }
        }
    }

    async fn activate_and_validate(
        &self,
        conn: PooledConnection<C>,
    ) -> Result<PooledConnection<C>, PoolError> {
        if !self.factory.activate(&conn).await {
            warn!(connection = %conn.id(), "connection failed activation");
            self.discard(conn).await;
            return Err(PoolError::Activation);
        }
        if self.config.validate_on_checkout() && !self.factory.validate(&conn).await {
            warn!(connection = %conn.id(), "connection failed checkout validation");
            self.discard(conn).await;
            return Err(PoolError::Validation);
        }

        // close() may have drained and destroyed the connection while the
        // hooks ran.
        let still_active = {
            let queues = self.queues.lock();
            queues.state == PoolState::Ready
                && queues.membership(conn.id()) == Membership::Active
        };
        if !still_active {
            debug!(connection = %conn.id(), "pool closed during checkout");
            drop(conn.release());
            return Err(PoolError::Closed);
        }
        Ok(conn)
    }

    /// Remove a checked out connection from the pool and destroy it
    async fn discard(&self, conn: PooledConnection<C>) {
        let entry = conn.release();
        let removed = self.queues.lock().take_any(entry.id());
        self.not_empty.notify_one();
        if let Some(entry) = removed {
            self.factory.destroy(entry.connection()).await;
        }
    }

    async fn validate_and_passivate(&self, conn: &C) -> bool {
        if self.config.validate_on_checkin() && !self.factory.validate(conn).await {
            debug!(connection = %conn.describe(), "connection failed checkin validation");
            return false;
        }
        if !self.factory.passivate(conn).await {
            debug!(connection = %conn.describe(), "connection failed passivation");
            return false;
        }
        true
    }

    async fn checkin(self: &Arc<Self>, conn: PooledConnection<C>) {
        if !conn.belongs_to(self) {
            warn!(connection = %conn.id(), "checkin of a connection owned by another pool");
            // Its drop hands it back to the pool that owns it.
            drop(conn);
            return;
        }
        self.checkin_entry(conn.release()).await;
    }

    async fn checkin_entry(&self, entry: PoolEntry<C>) {
        let membership = self.queues.lock().membership(entry.id());
        if membership != Membership::Active {
            warn!(connection = %entry.id(), ?membership, "checkin of a connection that is not checked out");
            return;
        }

        let healthy = self.validate_and_passivate(entry.connection()).await;

        let rejected = {
            let mut queues = self.queues.lock();
            match queues.take_active(entry.id()) {
                Some(mut tracked) => {
                    // Total excludes this connection now, so reaching max
                    // means it is soft-limit surplus.
                    let surplus = queues.total() >= self.config.max_pool_size();
                    if healthy && !surplus && queues.state == PoolState::Ready {
                        tracked.mark_available();
                        queues.available.push_back(tracked);
                        None
                    } else {
                        Some((tracked, surplus))
                    }
                }
                None => None,
            }
        };

        self.not_empty.notify_one();
        match rejected {
            Some((entry, surplus)) => {
                trace!(connection = %entry.id(), healthy, surplus, "destroying returned connection");
                self.factory.destroy(entry.connection()).await;
            }
            None => trace!(connection = %entry.id(), "checked in connection"),
        }
    }

    /// Called from a handle's drop
    pub(crate) fn return_dropped(self: Arc<Self>, entry: PoolEntry<C>) {
        debug!(connection = %entry.id(), "connection handle dropped without checkin");
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                drop(runtime.spawn(async move { self.checkin_entry(entry).await }));
            }
            Err(_) => {
                let removed = self.queues.lock().take_active(entry.id());
                self.not_empty.notify_one();
                if removed.is_some() {
                    warn!(
                        connection = %entry.id(),
                        "connection dropped outside a runtime, released without destroy"
                    );
                }
            }
        }
    }

    /// Create connections until `min_pool_size` are available, giving up
    /// after twice that many attempts. New connections are validated only
    /// when checkin validation is enabled.
    async fn fill(&self) {
        let min = self.config.min_pool_size().min(self.capacity());
        let validate = self.config.validate_on_checkin();
        let max_attempts = min * 2;
        let mut attempts = 0;

        while attempts < max_attempts {
            let reservation = {
                let mut queues = self.queues.lock();
                if !queues.accepts_connections()
                    || queues.available.len() >= min
                    || queues.total() >= self.capacity()
                {
                    break;
                }
                self.reserve(&mut queues)
            };
            attempts += 1;

            let entry = match self.factory.create().await {
                Ok(conn) => Some(PoolEntry::new(conn, false)),
                Err(e) => {
                    warn!(attempt = attempts, error = %e, "failed to create connection while filling pool");
                    None
                }
            };
            let valid = match &entry {
                Some(entry) if validate => self.factory.validate(entry.connection()).await,
                Some(_) => true,
                None => false,
            };

            let rejected = {
                let mut queues = self.queues.lock();
                reservation.release(&mut queues);
                match entry {
                    Some(entry) if valid && queues.accepts_connections() => {
                        trace!(connection = %entry.id(), "added connection to available queue");
                        queues.available.push_back(entry);
                        None
                    }
                    other => other,
                }
            };

            self.not_empty.notify_one();
            if let Some(entry) = rejected {
                if !valid {
                    warn!(connection = %entry.id(), "new connection failed validation");
                }
                self.factory.destroy(entry.connection()).await;
            }
        }
    }

    pub(crate) async fn prune(&self) {
        let expired = {
            let mut queues = self.queues.lock();
            if queues.state != PoolState::Ready {
                return;
            }
            if queues.is_busy() {
                debug!(active = queues.active.len(), "pool is active, no connections pruned");
                return;
            }

            let now = Instant::now();
            let min = self.config.min_pool_size();
            let max = self.config.max_pool_size();
            let expiration = self.config.expiration_time();
            let mut expired = Vec::new();
            while queues.available.len() > min {
                let surplus = queues.available.len() > max;
                let prune_front = match queues.available.front() {
                    Some(front) => {
                        surplus || self.prune_strategy.is_expired(front.times(), expiration, now)
                    }
                    None => false,
                };
                if !prune_front {
                    break;
                }
                if let Some(entry) = queues.available.pop_front() {
                    expired.push(entry);
                }
            }
            expired
        };

        if expired.is_empty() {
            trace!("no idle connections expired");
            return;
        }
        debug!(pruned = expired.len(), "pruning idle connections");
        for entry in expired {
            trace!(connection = %entry.id(), "pruned connection");
            self.factory.destroy(entry.connection()).await;
        }
    }

    pub(crate) async fn validate(&self) {
        let batch = {
            let mut queues = self.queues.lock();
            if queues.state != PoolState::Ready {
                return;
            }
            if queues.is_busy() {
                debug!(active = queues.active.len(), "pool is active, no validation performed");
                return;
            }
            if self.config.validate_periodically() {
                let batch: Vec<_> = queues.available.drain(..).collect();
                queues.reserved += batch.len();
                Some(batch)
            } else {
                None
            }
        };

        if let Some(batch) = batch {
            self.validate_batch(batch).await;
        }
        self.fill().await;
    }

    async fn validate_batch(&self, batch: Vec<PoolEntry<C>>) {
        debug!(connections = batch.len(), "validating idle connections");
        let mut withdrawn = Withdrawn {
            pool: self,
            entries: batch,
        };

        let mut failed_ids = Vec::new();
        for entry in &withdrawn.entries {
            if !self.factory.validate(entry.connection()).await {
                warn!(connection = %entry.id(), "idle connection failed validation");
                failed_ids.push(entry.id());
            }
        }

        let (mut destroy, healthy): (Vec<_>, Vec<_>) = std::mem::take(&mut withdrawn.entries)
            .into_iter()
            .partition(|entry| failed_ids.contains(&entry.id()));

        let restored = {
            let mut queues = self.queues.lock();
            queues.reserved -= destroy.len() + healthy.len();
            if queues.state == PoolState::Ready {
                let restored = healthy.len();
                for entry in healthy.into_iter().rev() {
                    queues.available.push_front(entry);
                }
                restored
            } else {
                destroy.extend(healthy);
                0
            }
        };

        for _ in 0..restored {
            self.not_empty.notify_one();
        }
        if !destroy.is_empty() {
            debug!(destroyed = destroy.len(), "destroying invalid connections");
        }
        for entry in destroy {
            self.factory.destroy(entry.connection()).await;
        }
    }

    fn stats(&self) -> PoolStats {
        let queues = self.queues.lock();
        PoolStats::new(
            queues.available.len(),
            queues.active.len(),
            queues.reserved,
            self.waiting.load(Ordering::SeqCst),
        )
    }
}

/// A pool of directory connections
///
/// Idle connections wait in an oldest-first available queue; checked out
/// connections sit in the active queue until they are checked in. A
/// background task prunes expired idle connections and revalidates idle
/// connections while nothing is checked out.
///
/// The pool must be [`initialize`](Self::initialize)d before use and
/// [`close`](Self::close)d when done: dropping it stops maintenance but does
/// not destroy connections.
pub struct ConnectionPool<C: Connection + 'static> {
    inner: Arc<PoolInner<C>>,
    scheduler: Mutex<Option<JoinHandle<()>>>,
}

impl<C: Connection + 'static> ConnectionPool<C> {
    /// Create a blocking pool with the default age-based pruning
    pub fn new<F: ConnectionFactory<C>>(config: PoolConfig, factory: F) -> Self {
        Self::builder(config, factory).build()
    }

    pub fn builder<F: ConnectionFactory<C>>(config: PoolConfig, factory: F) -> PoolBuilder<C> {
        PoolBuilder {
            config,
            factory: Box::new(factory),
            strategy: CheckoutStrategy::default(),
            prune_strategy: Box::new(AgePruneStrategy),
        }
    }

    /// Fill the pool to its minimum size and start background maintenance
    ///
    /// Only valid once, on a fresh pool.
    pub async fn initialize(&self) -> Result<(), PoolError> {
        let inner = &self.inner;
        inner.config.validate()?;
        {
            let mut queues = inner.queues.lock();
            if queues.state != PoolState::Uninitialized {
                return Err(PoolError::InvalidState {
                    expected: PoolState::Uninitialized,
                    actual: queues.state,
                });
            }
            queues.state = PoolState::Initializing;
        }
        info!(
            min = inner.config.min_pool_size(),
            max = inner.config.max_pool_size(),
            strategy = ?inner.strategy,
            "initializing connection pool"
        );

        inner.fill().await;

        let handle = scheduler::spawn(
            Arc::downgrade(inner),
            inner.shutdown.clone(),
            inner.config.prune_period(),
            inner.config.validate_period(),
        );
        *self.scheduler.lock() = Some(handle);

        let available = {
            let mut queues = inner.queues.lock();
            if queues.state != PoolState::Initializing {
                None
            } else {
                queues.state = PoolState::Ready;
                Some(queues.available.len())
            }
        };
        let Some(available) = available else {
            debug!("pool closed during initialization");
            return Err(PoolError::Closed);
        };

        if available < inner.config.min_pool_size() {
            warn!(
                available,
                min = inner.config.min_pool_size(),
                "pool initialized below its minimum size"
            );
        }
        info!(available, "connection pool initialized");
        Ok(())
    }

    /// Check out a connection
    ///
    /// When the pool is at capacity the behavior follows the pool's
    /// [`CheckoutStrategy`].
    pub async fn checkout(&self) -> Result<PooledConnection<C>, PoolError> {
        self.inner.checkout(None).await
    }

    /// Check out a connection, giving up with [`PoolError::Interrupted`] when
    /// `cancel` fires while waiting for capacity.
    pub async fn checkout_with_cancel(
        &self,
        cancel: &CancellationToken,
    ) -> Result<PooledConnection<C>, PoolError> {
        self.inner.checkout(Some(cancel)).await
    }

    /// Return a connection to the pool
    ///
    /// The connection goes back to the available queue if it passes
    /// passivation (and checkin validation when enabled); otherwise it is
    /// destroyed. Connections this pool does not track are ignored.
    pub async fn checkin(&self, conn: PooledConnection<C>) {
        self.inner.checkin(conn).await
    }

    /// Destroy expired idle connections, down to `min_pool_size`
    ///
    /// Does nothing while any connection is checked out.
    pub async fn prune(&self) {
        self.inner.prune().await
    }

    /// Revalidate idle connections (when periodic validation is enabled) and
    /// refill the pool to its minimum size
    ///
    /// Does nothing while any connection is checked out.
    pub async fn validate(&self) {
        self.inner.validate().await
    }

    /// Destroy every connection and stop background maintenance
    ///
    /// Callers blocked in checkout fail with [`PoolError::Closed`]. Closing
    /// twice is a no-op.
    pub async fn close(&self) {
        let drained = {
            let mut queues = self.inner.queues.lock();
            if queues.state.is_shut_down() {
                debug!(state = %queues.state, "pool already closed");
                return;
            }
            queues.state = PoolState::Closing;
            let mut drained: Vec<_> = queues.available.drain(..).collect();
            drained.extend(queues.active.drain(..));
            drained
        };

        info!(connections = drained.len(), "closing connection pool");
        self.inner.shutdown.cancel();
        for entry in &drained {
            self.inner.factory.destroy(entry.connection()).await;
        }

        let scheduler = self.scheduler.lock().take();
        if let Some(handle) = scheduler
            && let Err(e) = handle.await
        {
            warn!(error = %e, "pool maintenance task failed");
        }

        self.inner.queues.lock().state = PoolState::Closed;
        info!("connection pool closed");
    }

    pub fn state(&self) -> PoolState {
        self.inner.queues.lock().state
    }

    pub fn available_count(&self) -> usize {
        self.inner.queues.lock().available.len()
    }

    pub fn active_count(&self) -> usize {
        self.inner.queues.lock().active.len()
    }

    /// Get current pool statistics
    pub fn stats(&self) -> PoolStats {
        self.inner.stats()
    }

    /// Where the connection with the given id sits in this pool
    pub fn membership(&self, id: Uuid) -> Membership {
        self.inner.queues.lock().membership(id)
    }

    /// Get the pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    pub fn strategy(&self) -> CheckoutStrategy {
        self.inner.strategy
    }
}

impl<C: Connection + 'static> Drop for ConnectionPool<C> {
    fn drop(&mut self) {
        self.inner.shutdown.cancel();
        let queues = self.inner.queues.lock();
        if !queues.state.is_shut_down() && queues.total() > 0 {
            warn!(
                connections = queues.total(),
                "connection pool dropped without close, connections not destroyed"
            );
        }
    }
}

/// Builder for pools with a non-default checkout or prune strategy
pub struct PoolBuilder<C: Connection + 'static> {
    config: PoolConfig,
    factory: Box<dyn ConnectionFactory<C>>,
    strategy: CheckoutStrategy,
    prune_strategy: Box<dyn PruneStrategy>,
}

impl<C: Connection + 'static> PoolBuilder<C> {
    /// Set the behavior of checkout at capacity
    pub fn strategy(mut self, strategy: CheckoutStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the policy deciding which idle connections are stale
    pub fn prune_strategy(mut self, prune_strategy: impl PruneStrategy + 'static) -> Self {
        self.prune_strategy = Box::new(prune_strategy);
        self
    }

    /// Seal the configuration and build the pool
    pub fn build(self) -> ConnectionPool<C> {
        let mut config = self.config;
        config.make_immutable();
        ConnectionPool {
            inner: Arc::new(PoolInner {
                config,
                strategy: self.strategy,
                factory: self.factory,
                prune_strategy: self.prune_strategy,
                queues: Mutex::new(Queues::new()),
                not_empty: Notify::new(),
                shutdown: CancellationToken::new(),
                waiting: AtomicUsize::new(0),
            }),
            scheduler: Mutex::new(None),
        }
    }
}
