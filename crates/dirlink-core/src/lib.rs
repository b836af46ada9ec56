//! dirlink core - Core abstractions for the directory client
//!
//! This crate provides the fundamental traits and types that the pooling
//! and connection crates depend on. It defines:
//!
//! - `Connection` - Trait for stateful directory connections
//! - `LdapUrl` - Parsed `ldap://` / `ldaps://` endpoints
//! - `TlsConfig` - TLS settings used when establishing connections
//! - `LdapEntry`, `LdapAttribute`, `SearchResult` - The entry/result data model

mod connection;
pub mod entry;
mod error;
mod ldap_url;
pub mod security;

pub use connection::*;
pub use entry::{AttributeValue, LdapAttribute, LdapEntry, SearchResult, SortBehavior};
pub use error::*;
pub use ldap_url::{LdapScheme, LdapUrl};
pub use security::*;
