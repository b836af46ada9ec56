//! Connection trait shared by the pool and the concrete transports

use crate::{DirError, Result};
use async_trait::async_trait;

/// A stateful, expensive-to-establish directory connection.
///
/// Implementations hold a socket (usually TLS wrapped and bound) to a
/// directory server. The pool never issues protocol operations itself; it only
/// drives the lifecycle below and asks for liveness through [`probe`].
///
/// [`probe`]: Connection::probe
#[async_trait]
pub trait Connection: Send + Sync {
    /// Establish the underlying transport.
    ///
    /// Calling `open` on a connection that is already open is a no-op.
    async fn open(&self) -> Result<()>;

    /// Tear down the underlying transport.
    async fn close(&self) -> Result<()>;

    /// Check if the connection is closed
    fn is_closed(&self) -> bool;

    /// Issue a trivial request and confirm the server still answers.
    ///
    /// The default implementation only checks the local closed flag. Protocol
    /// layers override it with a real round trip (an empty search, a compare,
    /// or a "who am I" extended operation).
    async fn probe(&self) -> Result<()> {
        if self.is_closed() {
            return Err(DirError::Closed);
        }
        Ok(())
    }

    /// Short description used in log output, e.g. `ldaps://dir.example.com:636`.
    fn describe(&self) -> String {
        "directory connection".to_string()
    }
}
