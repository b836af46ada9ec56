//! Pool factory for directory connections

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use async_trait::async_trait;
use dirlink_core::{Connection, Result};
use tokio_native_tls::TlsConnector;
use tracing::{debug, warn};

use crate::config::ConnectionConfig;
use crate::directory::DirectoryConnection;
use crate::health::{
    Activator, NoopActivator, NoopPassivator, Passivator, ProbeValidator, Validator,
};
use crate::pool::ConnectionFactory;
use crate::tls::build_connector;

/// Opens [`DirectoryConnection`]s for a pool and runs the configured
/// validator, activator and passivator on them.
///
/// All connections from one factory share the TLS connector and the URL
/// strategy state, so `RoundRobin` spreads a pool across servers and
/// `ActivePassive` keeps it on the server that last answered.
pub struct DirectoryConnectionFactory {
    config: Arc<ConnectionConfig>,
    tls: Option<TlsConnector>,
    cursor: Arc<AtomicUsize>,
    validator: Box<dyn Validator<DirectoryConnection>>,
    activator: Box<dyn Activator<DirectoryConnection>>,
    passivator: Box<dyn Passivator<DirectoryConnection>>,
}

impl DirectoryConnectionFactory {
    /// Validate `config` and prepare the TLS connector.
    ///
    /// Validation defaults to a [`ProbeValidator`] bounded by the configured
    /// response timeout.
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        let tls = build_connector(&config.tls)?;
        let validator = ProbeValidator::new(config.response_timeout());
        Ok(Self {
            config: Arc::new(config),
            tls,
            cursor: Arc::new(AtomicUsize::new(0)),
            validator: Box::new(validator),
            activator: Box::new(NoopActivator),
            passivator: Box::new(NoopPassivator),
        })
    }

    pub fn with_validator(
        mut self,
        validator: impl Validator<DirectoryConnection> + 'static,
    ) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn with_activator(
        mut self,
        activator: impl Activator<DirectoryConnection> + 'static,
    ) -> Self {
        self.activator = Box::new(activator);
        self
    }

    pub fn with_passivator(
        mut self,
        passivator: impl Passivator<DirectoryConnection> + 'static,
    ) -> Self {
        self.passivator = Box::new(passivator);
        self
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }
}

#[async_trait]
impl ConnectionFactory<DirectoryConnection> for DirectoryConnectionFactory {
    async fn create(&self) -> Result<DirectoryConnection> {
        let conn = DirectoryConnection::new(
            self.config.clone(),
            self.tls.clone(),
            self.cursor.clone(),
        );
        conn.open().await?;
        Ok(conn)
    }

    async fn destroy(&self, conn: &DirectoryConnection) {
        let described = conn.describe();
        match conn.close().await {
            Ok(()) => debug!(connection = %described, "pooled connection destroyed"),
            Err(e) => warn!(connection = %described, error = %e, "error closing pooled connection"),
        }
    }

    async fn validate(&self, conn: &DirectoryConnection) -> bool {
        self.validator.validate(conn).await
    }

    async fn activate(&self, conn: &DirectoryConnection) -> bool {
        self.activator.activate(conn).await
    }

    async fn passivate(&self, conn: &DirectoryConnection) -> bool {
        self.passivator.passivate(conn).await
    }
}

impl std::fmt::Debug for DirectoryConnectionFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryConnectionFactory")
            .field("config", &self.config)
            .field("tls", &self.tls.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
