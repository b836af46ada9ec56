//! Pluggable checks run by the pool around checkout and checkin

use std::time::Duration;

use async_trait::async_trait;
use dirlink_core::Connection;
use tracing::{debug, trace};

use super::ping::probe_latency;
use super::status::HealthThresholds;

/// Decides whether a connection is still fit for use
#[async_trait]
pub trait Validator<C: Connection + ?Sized>: Send + Sync {
    async fn validate(&self, conn: &C) -> bool;
}

/// Prepares an idle connection before it is handed to a caller
#[async_trait]
pub trait Activator<C: Connection + ?Sized>: Send + Sync {
    async fn activate(&self, conn: &C) -> bool;
}

/// Resets a returned connection before it goes back to the idle queue
#[async_trait]
pub trait Passivator<C: Connection + ?Sized>: Send + Sync {
    async fn passivate(&self, conn: &C) -> bool;
}

/// Validates by issuing the connection's probe under a timeout and
/// rejecting connections whose latency classifies as unhealthy.
#[derive(Debug, Clone)]
pub struct ProbeValidator {
    timeout: Duration,
    thresholds: HealthThresholds,
}

impl ProbeValidator {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            thresholds: HealthThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: HealthThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ProbeValidator {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

#[async_trait]
impl<C: Connection + ?Sized> Validator<C> for ProbeValidator {
    async fn validate(&self, conn: &C) -> bool {
        match probe_latency(conn, self.timeout).await {
            Ok(latency) => {
                let status = self.thresholds.classify(latency);
                trace!(connection = %conn.describe(), ?latency, ?status, "probe answered");
                status.is_usable()
            }
            Err(e) => {
                debug!(connection = %conn.describe(), error = %e, "probe failed");
                false
            }
        }
    }
}

/// Accepts every connection that is not closed
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenStateValidator;

#[async_trait]
impl<C: Connection + ?Sized> Validator<C> for OpenStateValidator {
    async fn validate(&self, conn: &C) -> bool {
        !conn.is_closed()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopActivator;

#[async_trait]
impl<C: Connection + ?Sized> Activator<C> for NoopActivator {
    async fn activate(&self, _conn: &C) -> bool {
        true
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPassivator;

#[async_trait]
impl<C: Connection + ?Sized> Passivator<C> for NoopPassivator {
    async fn passivate(&self, _conn: &C) -> bool {
        true
    }
}
