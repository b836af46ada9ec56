//! Directory connection configuration

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use dirlink_core::{DirError, LdapScheme, LdapUrl, Result, TlsConfig};
use rand::seq::SliceRandom;
use serde::{Deserialize, Deserializer, Serialize};

use crate::reconnect::ReconnectConfig;

/// Order in which the configured URLs are tried when opening a connection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStrategy {
    /// Always in configured order; the first server that answers wins
    #[default]
    Default,
    /// Configured order, starting from the last server that answered
    ActivePassive,
    /// Each attempt starts one server further along the list
    RoundRobin,
    /// A fresh random order for each attempt
    Random,
}

impl ConnectionStrategy {
    /// Indices of `count` URLs in the order to try them. `cursor` carries the
    /// strategy's state between calls and is shared by every connection of a
    /// factory.
    pub fn order(&self, count: usize, cursor: &AtomicUsize) -> Vec<usize> {
        if count == 0 {
            return Vec::new();
        }
        let rotated = |start: usize| -> Vec<usize> {
            (0..count).map(|i| (start + i) % count).collect()
        };
        match self {
            ConnectionStrategy::Default => (0..count).collect(),
            ConnectionStrategy::ActivePassive => rotated(cursor.load(Ordering::SeqCst) % count),
            ConnectionStrategy::RoundRobin => rotated(cursor.fetch_add(1, Ordering::SeqCst) % count),
            ConnectionStrategy::Random => {
                let mut order: Vec<usize> = (0..count).collect();
                order.shuffle(&mut rand::thread_rng());
                order
            }
        }
    }

    /// Note which URL produced a working connection
    pub fn record_success(&self, index: usize, cursor: &AtomicUsize) {
        if *self == ConnectionStrategy::ActivePassive {
            cursor.store(index, Ordering::SeqCst);
        }
    }
}

/// Settings for opening connections to a set of directory servers
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Servers to connect to; in TOML either a list or one space-separated
    /// string
    #[serde(deserialize_with = "deserialize_urls")]
    pub urls: Vec<LdapUrl>,
    pub strategy: ConnectionStrategy,
    /// Timeout in milliseconds for TCP connect and TLS handshake, per URL
    pub connect_timeout_ms: u64,
    /// Timeout in milliseconds for a probe round trip
    pub response_timeout_ms: u64,
    pub tls: TlsConfig,
    /// DN the protocol layer binds as
    pub bind_dn: Option<String>,
    bind_credential: Option<String>,
    pub reconnect: ReconnectConfig,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UrlList {
    Spaced(String),
    List(Vec<LdapUrl>),
}

fn deserialize_urls<'de, D>(deserializer: D) -> std::result::Result<Vec<LdapUrl>, D::Error>
where
    D: Deserializer<'de>,
{
    match UrlList::deserialize(deserializer)? {
        UrlList::Spaced(urls) => LdapUrl::parse_list(&urls).map_err(serde::de::Error::custom),
        UrlList::List(urls) => Ok(urls),
    }
}

impl ConnectionConfig {
    /// Create a configuration from a space-separated list of LDAP URLs
    pub fn new(urls: &str) -> Result<Self> {
        Ok(Self {
            urls: LdapUrl::parse_list(urls)?,
            ..Self::default()
        })
    }

    /// Load a configuration from TOML
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(input).map_err(|e| DirError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML, without the bind credential
    pub fn to_toml_string(&self) -> Result<String> {
        let mut redacted = self.clone();
        redacted.bind_credential = None;
        toml::to_string(&redacted)
            .map_err(|e| DirError::Configuration(format!("cannot render configuration: {e}")))
    }

    pub fn with_strategy(mut self, strategy: ConnectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_connect_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.connect_timeout_ms = timeout_ms;
        self
    }

    pub fn with_response_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.response_timeout_ms = timeout_ms;
        self
    }

    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Set the identity the protocol layer binds with
    pub fn with_bind(mut self, dn: impl Into<String>, credential: impl Into<String>) -> Self {
        self.bind_dn = Some(dn.into());
        self.bind_credential = Some(credential.into());
        self
    }

    pub fn bind_credential(&self) -> Option<&str> {
        self.bind_credential.as_deref()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    /// Check that every URL can be reached under the TLS settings
    pub fn validate(&self) -> Result<()> {
        if self.urls.is_empty() {
            return Err(DirError::Configuration(
                "at least one LDAP URL is required".to_string(),
            ));
        }
        if self.connect_timeout_ms == 0 {
            return Err(DirError::Configuration(
                "connect_timeout_ms must be greater than 0".to_string(),
            ));
        }
        self.tls.validate()?;
        for url in &self.urls {
            self.tls.use_tls_for(url)?;
        }
        Ok(())
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            urls: vec![LdapUrl::new(
                LdapScheme::Ldap,
                "localhost",
                LdapScheme::Ldap.default_port(),
            )],
            strategy: ConnectionStrategy::default(),
            connect_timeout_ms: 5_000,
            response_timeout_ms: 5_000,
            tls: TlsConfig::default(),
            bind_dn: None,
            bind_credential: None,
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("urls", &self.urls)
            .field("strategy", &self.strategy)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("response_timeout_ms", &self.response_timeout_ms)
            .field("tls", &self.tls)
            .field("bind_dn", &self.bind_dn)
            .field(
                "bind_credential",
                &self.bind_credential.as_ref().map(|_| "<redacted>"),
            )
            .field("reconnect", &self.reconnect)
            .finish()
    }
}

#[cfg(test)]
mod tests;
