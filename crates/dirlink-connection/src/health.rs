//! Connection health checks
//!
//! Timed liveness probes, latency classification, and the validator,
//! activator and passivator hooks a pool runs around checkout and checkin.
//!
//! # Example
//!
//! ```ignore
//! use dirlink_connection::health::{probe_latency, HealthStatus, ProbeValidator};
//!
//! // One-time status check
//! let latency = probe_latency(&*conn, Duration::from_secs(5)).await?;
//! let status = HealthStatus::from_latency(latency);
//!
//! // Reject slow connections in the pool
//! let factory = DirectoryConnectionFactory::new(config)?
//!     .with_validator(ProbeValidator::new(Duration::from_secs(2)));
//! ```

mod ping;
mod status;
mod validator;

#[cfg(test)]
mod tests;

pub use ping::{PingError, PingResult, probe_latency};
pub use status::{HealthStatus, HealthThresholds};
pub use validator::{
    Activator, NoopActivator, NoopPassivator, OpenStateValidator, Passivator, ProbeValidator,
    Validator,
};
