//! Timed liveness probes
//!
//! Measures the round trip of a connection's trivial no-op request.

use std::fmt;
use std::time::Duration;

use dirlink_core::Connection;
use tokio::time::Instant;

/// Result of a probe: the measured latency
pub type PingResult = Result<Duration, PingError>;

/// Error that can occur while probing a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PingError {
    /// The connection is closed
    ConnectionClosed,
    /// The server did not answer the probe
    ProbeFailed(String),
    /// The probe did not complete in time
    Timeout(Duration),
}

impl fmt::Display for PingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PingError::ConnectionClosed => write!(f, "Connection is closed"),
            PingError::ProbeFailed(msg) => write!(f, "Probe failed: {}", msg),
            PingError::Timeout(after) => write!(f, "Probe timed out after {:?}", after),
        }
    }
}

impl std::error::Error for PingError {}

/// Probe a connection and return the round-trip time.
///
/// Fails fast without touching the network when the connection is already
/// closed.
///
/// ```ignore
/// use dirlink_connection::health::probe_latency;
///
/// let latency = probe_latency(&*conn, Duration::from_secs(5)).await?;
/// println!("directory latency: {:?}", latency);
/// ```
pub async fn probe_latency<C: Connection + ?Sized>(conn: &C, timeout: Duration) -> PingResult {
    if conn.is_closed() {
        return Err(PingError::ConnectionClosed);
    }

    let start = Instant::now();
    match tokio::time::timeout(timeout, conn.probe()).await {
        Ok(Ok(())) => Ok(start.elapsed()),
        Ok(Err(e)) => Err(PingError::ProbeFailed(e.to_string())),
        Err(_) => Err(PingError::Timeout(timeout)),
    }
}
