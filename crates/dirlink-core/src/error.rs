//! Error types for dirlink

use thiserror::Error;

/// Core error type for directory operations
#[derive(Error, Debug)]
pub enum DirError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid LDAP URL: {0}")]
    Url(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Connection is closed")]
    Closed,

    #[error("{0}")]
    Other(String),
}

impl DirError {
    /// Returns true for errors caused by the transport rather than by local
    /// configuration, i.e. errors worth retrying against another server.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DirError::Connection(_) | DirError::Io(_) | DirError::Timeout(_) | DirError::Closed
        )
    }
}

/// Result type alias for directory operations
pub type Result<T> = std::result::Result<T, DirError>;
