//! Connection pooling for directory connections
//!
//! A pool keeps a minimum number of idle connections ready, hands them out
//! on checkout and takes them back on checkin. What happens when every
//! connection is in use is decided by a [`CheckoutStrategy`]; which idle
//! connections are stale is decided by a [`PruneStrategy`].
//!
//! # Example
//!
//! ```ignore
//! use dirlink_connection::pool::{ConnectionPool, PoolConfig};
//!
//! let config = PoolConfig::new(3, 10)
//!     .with_validate_on_checkout(true)
//!     .with_block_wait_time_ms(5000);
//!
//! let pool = ConnectionPool::new(config, connection_factory);
//! pool.initialize().await?;
//!
//! let conn = pool.checkout().await?;
//! // Use connection...
//! pool.checkin(conn).await;
//!
//! pool.close().await;
//! ```

mod config;
mod entry;
mod error;
mod factory;
mod pool;
mod prune;
mod scheduler;
mod state;
mod stats;
mod strategy;


pub use config::PoolConfig;
pub use entry::PooledConnection;
pub use error::{ConfigError, PoolError};
pub use factory::ConnectionFactory;
pub use pool::{ConnectionPool, Membership, PoolBuilder};
pub use prune::{AgePruneStrategy, EntryTimes, IdlePruneStrategy, PruneStrategy};
pub use state::PoolState;
pub use stats::PoolStats;
pub use strategy::CheckoutStrategy;
