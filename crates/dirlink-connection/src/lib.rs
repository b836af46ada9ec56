//! dirlink connection - Directory connection establishment and pooling
//!
//! This crate opens TCP / TLS connections to directory servers and keeps
//! them in a bounded pool with validation, pruning and a background
//! maintenance task.
//!
//! # Example
//!
//! ```ignore
//! use dirlink_connection::{ConnectionConfig, ConnectionPool, DirectoryConnectionFactory, PoolConfig};
//!
//! let config = ConnectionConfig::new("ldaps://dir1.example.com ldaps://dir2.example.com")?;
//! let factory = DirectoryConnectionFactory::new(config)?;
//! let pool = ConnectionPool::new(PoolConfig::new(2, 8).with_validate_on_checkout(true), factory);
//! pool.initialize().await?;
//!
//! let conn = pool.checkout().await?;
//! let mut stream = conn.stream().await?;
//! // ... speak LDAP over `stream` ...
//! drop(stream);
//! pool.checkin(conn).await;
//!
//! pool.close().await;
//! ```

mod config;
mod directory;
mod factory;
pub mod health;
pub mod pool;
pub mod reconnect;
mod tls;

pub use config::{ConnectionConfig, ConnectionStrategy};
pub use directory::{DirectoryConnection, Stream};
pub use factory::DirectoryConnectionFactory;
pub use health::{
    Activator, HealthStatus, HealthThresholds, NoopActivator, NoopPassivator, OpenStateValidator,
    Passivator, PingError, PingResult, ProbeValidator, Validator, probe_latency,
};
pub use pool::{
    CheckoutStrategy, ConnectionFactory, ConnectionPool, PoolConfig, PoolError, PoolState,
    PoolStats, PooledConnection,
};
pub use reconnect::{BackoffStrategy, ReconnectConfig, retry_with_backoff};
pub use tls::{TlsError, build_connector};
