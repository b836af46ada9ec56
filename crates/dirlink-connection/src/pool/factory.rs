//! Connection lifecycle hooks used by the pool

use std::sync::Arc;

use async_trait::async_trait;
use dirlink_core::{Connection, Result};
use tracing::debug;

/// Creates, checks and tears down pooled connections
///
/// The pool calls these hooks without holding its lock, so implementations
/// are free to perform network round trips.
#[async_trait]
pub trait ConnectionFactory<C: Connection>: Send + Sync + 'static {
    /// Create and open a new connection
    async fn create(&self) -> Result<C>;

    /// Release a connection the pool no longer tracks
    ///
    /// Default implementation closes it and logs failures.
    async fn destroy(&self, conn: &C) {
        if let Err(e) = conn.close().await {
            debug!(connection = %conn.describe(), error = %e, "error closing pooled connection");
        }
    }

    /// Validate that a connection is still usable
    ///
    /// Default implementation only checks that the connection is open.
    async fn validate(&self, conn: &C) -> bool {
        !conn.is_closed()
    }

    /// Prepare an idle connection for a caller
    async fn activate(&self, _conn: &C) -> bool {
        true
    }

    /// Reset a returned connection before it goes back to the idle queue
    async fn passivate(&self, _conn: &C) -> bool {
        true
    }
}

#[async_trait]
impl<C: Connection, T: ConnectionFactory<C>> ConnectionFactory<C> for Arc<T> {
    async fn create(&self) -> Result<C> {
        (**self).create().await
    }

    async fn destroy(&self, conn: &C) {
        (**self).destroy(conn).await
    }

    async fn validate(&self, conn: &C) -> bool {
        (**self).validate(conn).await
    }

    async fn activate(&self, conn: &C) -> bool {
        (**self).activate(conn).await
    }

    async fn passivate(&self, conn: &C) -> bool {
        (**self).passivate(conn).await
    }
}
