//! Background maintenance task for a pool

use std::sync::Weak;
use std::time::Duration;

use dirlink_core::Connection;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::pool::PoolInner;

/// Spawn the task that prunes and revalidates the pool at fixed intervals.
///
/// The first run of each job happens one full period after start. The task
/// holds only a weak reference to the pool and stops when `shutdown` fires or
/// the pool is gone.
pub(crate) fn spawn<C: Connection + 'static>(
    pool: Weak<PoolInner<C>>,
    shutdown: CancellationToken,
    prune_period: Duration,
    validate_period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let start = Instant::now();
        let mut prune = interval_at(start + prune_period, prune_period);
        prune.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut validate = interval_at(start + validate_period, validate_period);
        validate.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!(?prune_period, ?validate_period, "pool maintenance started");
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = prune.tick() => {
                    let Some(pool) = pool.upgrade() else { break };
                    trace!("running prune task");
                    pool.prune().await;
                }
                _ = validate.tick() => {
                    let Some(pool) = pool.upgrade() else { break };
                    trace!("running validate task");
                    pool.validate().await;
                }
            }
        }
        debug!("pool maintenance stopped");
    })
}
