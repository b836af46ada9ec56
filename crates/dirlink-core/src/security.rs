//! Security-related configuration types for directory connections
//!
//! TLS settings applied when a connection is established against an
//! `ldaps://` endpoint or when the configured mode demands encryption.

mod tls_config;

pub use tls_config::*;
