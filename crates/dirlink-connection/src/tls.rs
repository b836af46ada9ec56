//! TLS support for directory connections
//!
//! Builds the `tokio-native-tls` connector used to wrap `ldaps://`
//! connections according to a [`TlsConfig`].

use std::fs;
use std::path::Path;

use dirlink_core::{DirError, TlsConfig, TlsMode};
use native_tls::{Certificate, Identity, TlsConnector as NativeTlsConnector, TlsConnectorBuilder};
use tokio_native_tls::TlsConnector;
use tracing::{debug, info, warn};

/// Error types for TLS operations
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    /// Failed to load CA certificate
    #[error("Failed to load CA certificate from {path}: {source}")]
    CaCertLoadFailed {
        path: String,
        source: std::io::Error,
    },

    /// Invalid CA certificate format
    #[error("Invalid CA certificate format: {0}")]
    InvalidCaCert(String),

    /// Failed to load client certificate
    #[error("Failed to load client certificate from {path}: {source}")]
    ClientCertLoadFailed {
        path: String,
        source: std::io::Error,
    },

    /// Failed to load client key
    #[error("Failed to load client key from {path}: {source}")]
    ClientKeyLoadFailed {
        path: String,
        source: std::io::Error,
    },

    /// Invalid client identity format
    #[error("Invalid client identity (cert + key): {0}")]
    InvalidClientIdentity(String),

    /// TLS configuration error
    #[error("TLS configuration error: {0}")]
    ConfigurationError(String),
}

impl From<TlsError> for DirError {
    fn from(err: TlsError) -> Self {
        DirError::Tls(err.to_string())
    }
}

/// Build the connector for `config`.
///
/// Returns `Ok(None)` when TLS is disabled; connections are then plain TCP
/// and `ldaps://` URLs are rejected by [`TlsConfig::use_tls_for`].
pub fn build_connector(config: &TlsConfig) -> Result<Option<TlsConnector>, DirError> {
    config.validate()?;

    if config.mode == TlsMode::Disable {
        debug!("TLS disabled, no connector built");
        return Ok(None);
    }

    info!(mode = ?config.mode, "Building directory TLS connector");

    let mut builder = NativeTlsConnector::builder();

    configure_verification(&mut builder, config);

    if let Some(ca_cert_path) = &config.ca_cert {
        apply_ca_cert(&mut builder, ca_cert_path)?;
    }

    if let (Some(cert_path), Some(key_path)) = (&config.client_cert, &config.client_key) {
        apply_client_cert(&mut builder, cert_path, key_path)?;
    }

    let connector = builder
        .build()
        .map_err(|e| TlsError::ConfigurationError(e.to_string()))?;

    debug!("TLS connector built successfully");

    Ok(Some(TlsConnector::from(connector)))
}

fn configure_verification(builder: &mut TlsConnectorBuilder, config: &TlsConfig) {
    match config.mode {
        TlsMode::Disable => {}
        TlsMode::Allow | TlsMode::Require => {
            if !config.verify_server {
                warn!("Certificate verification disabled (verify_server = false)");
                builder.danger_accept_invalid_certs(true);
                builder.danger_accept_invalid_hostnames(true);
            }
        }
        TlsMode::VerifyCa => {
            debug!("Enabling CA verification only (hostname verification disabled)");
            builder.danger_accept_invalid_hostnames(true);
        }
        TlsMode::VerifyFull => {
            debug!("Enabling full certificate verification");
        }
    }
}

fn apply_ca_cert(builder: &mut TlsConnectorBuilder, path: &Path) -> Result<(), TlsError> {
    debug!(path = %path.display(), "Loading CA certificate");

    let pem_data = fs::read(path).map_err(|e| TlsError::CaCertLoadFailed {
        path: path.display().to_string(),
        source: e,
    })?;

    let cert =
        Certificate::from_pem(&pem_data).map_err(|e| TlsError::InvalidCaCert(e.to_string()))?;

    builder.add_root_certificate(cert);

    Ok(())
}

/// Load a PEM certificate and PEM PKCS#8 key for mutual TLS
fn apply_client_cert(
    builder: &mut TlsConnectorBuilder,
    cert_path: &Path,
    key_path: &Path,
) -> Result<(), TlsError> {
    debug!(
        cert_path = %cert_path.display(),
        key_path = %key_path.display(),
        "Loading client certificate and key"
    );

    let cert_pem = fs::read(cert_path).map_err(|e| TlsError::ClientCertLoadFailed {
        path: cert_path.display().to_string(),
        source: e,
    })?;

    let key_pem = fs::read(key_path).map_err(|e| TlsError::ClientKeyLoadFailed {
        path: key_path.display().to_string(),
        source: e,
    })?;

    let identity = Identity::from_pkcs8(&cert_pem, &key_pem)
        .map_err(|e| TlsError::InvalidClientIdentity(e.to_string()))?;

    builder.identity(identity);

    Ok(())
}
