//! TLS settings for `ldaps://` endpoints
//!
//! The URL scheme picks the transport: `ldaps://` is wrapped in TLS from the
//! first byte, `ldap://` stays plain TCP. [`TlsMode`] says which of those a
//! deployment tolerates and how hard the directory server's certificate is
//! checked once the handshake starts.

use crate::{DirError, LdapUrl, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How TLS is applied to directory connections
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TlsMode {
    /// Plain `ldap://` only; an `ldaps://` URL is a configuration error
    Disable,
    /// Follow the URL scheme
    #[default]
    Allow,
    /// Every URL must be `ldaps://`; any server certificate is accepted
    /// unless `verify_server` is set
    Require,
    /// As `Require`, and the certificate chain must lead to the configured CA
    VerifyCa,
    /// As `VerifyCa`, and the certificate must name the host in the URL
    VerifyFull,
}

impl TlsMode {
    /// Plain `ldap://` URLs are refused under this mode
    pub fn rejects_plain_ldap(self) -> bool {
        !matches!(self, TlsMode::Disable | TlsMode::Allow)
    }

    /// The server chain is checked against `ca_cert`
    pub fn trusts_configured_ca(self) -> bool {
        matches!(self, TlsMode::VerifyCa | TlsMode::VerifyFull)
    }
}

/// TLS section of a connection config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    pub mode: TlsMode,
    /// PEM bundle the directory server's chain must lead to
    pub ca_cert: Option<PathBuf>,
    /// PEM certificate presented for SASL EXTERNAL style client auth
    pub client_cert: Option<PathBuf>,
    /// PKCS#8 PEM key matching `client_cert`
    pub client_key: Option<PathBuf>,
    /// Under `Allow` / `Require`, `false` accepts self-signed or mismatched
    /// server certificates
    #[serde(default = "default_verify_server")]
    pub verify_server: bool,
}

fn default_verify_server() -> bool {
    true
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            verify_server: default_verify_server(),
            ..Self::new(TlsMode::default())
        }
    }
}

impl TlsConfig {
    pub fn new(mode: TlsMode) -> Self {
        Self {
            mode,
            ca_cert: None,
            client_cert: None,
            client_key: None,
            verify_server: mode.trusts_configured_ca(),
        }
    }

    /// Plain `ldap://` only
    pub fn disabled() -> Self {
        Self::new(TlsMode::Disable)
    }

    /// `ldaps://` only, certificates not checked
    pub fn require() -> Self {
        Self::new(TlsMode::Require)
    }

    /// `ldaps://` only, chain and host name checked; needs [`Self::ca_cert`]
    pub fn verify_full() -> Self {
        Self::new(TlsMode::VerifyFull)
    }

    pub fn ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert = Some(path.into());
        self
    }

    /// Present a client certificate during the handshake
    pub fn client_cert(
        mut self,
        cert_path: impl Into<PathBuf>,
        key_path: impl Into<PathBuf>,
    ) -> Self {
        self.client_cert = Some(cert_path.into());
        self.client_key = Some(key_path.into());
        self
    }

    pub fn verify_server(mut self, verify: bool) -> Self {
        self.verify_server = verify;
        self
    }

    /// Whether the connection to `url` is wrapped in TLS.
    ///
    /// Errors when the scheme contradicts the mode. A plain `ldap://` URL
    /// under an encrypting mode would need StartTLS, which belongs to the
    /// protocol layer above the pool.
    pub fn use_tls_for(&self, url: &LdapUrl) -> Result<bool> {
        match (url.is_ldaps(), self.mode) {
            (true, TlsMode::Disable) => Err(DirError::Configuration(format!(
                "{url} requires TLS but TLS is disabled"
            ))),
            (true, _) => Ok(true),
            (false, mode) if mode.rejects_plain_ldap() => Err(DirError::Configuration(format!(
                "TLS mode {mode:?} requires an ldaps:// URL, got {url}"
            ))),
            (false, _) => Ok(false),
        }
    }

    /// Check the settings hang together before any file is read
    pub fn validate(&self) -> Result<()> {
        match (&self.ca_cert, self.mode.trusts_configured_ca()) {
            (None, true) => {
                return Err(invalid(format!(
                    "TLS mode {:?} checks the directory server against a CA, but no ca_cert is set",
                    self.mode
                )));
            }
            (Some(path), _) => non_empty(path, "ca_cert")?,
            (None, false) => {}
        }

        match (&self.client_cert, &self.client_key) {
            (Some(cert), Some(key)) => {
                non_empty(cert, "client_cert")?;
                non_empty(key, "client_key")
            }
            (Some(_), None) => Err(invalid("client_cert is set without client_key")),
            (None, Some(_)) => Err(invalid("client_key is set without client_cert")),
            (None, None) => Ok(()),
        }
    }
}

fn non_empty(path: &Path, field: &str) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(invalid(format!("{field} is an empty path")));
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> DirError {
    DirError::Configuration(message.into())
}

#[cfg(test)]
mod tests;
