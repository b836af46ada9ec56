//! LDAP URL parsing
//!
//! Only the scheme, host and port of an LDAP URL matter for connection
//! establishment; the DN, attribute and filter parts are accepted and ignored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{DirError, Result};

/// Default port for plain `ldap://` connections
pub const DEFAULT_LDAP_PORT: u16 = 389;

/// Default port for `ldaps://` connections
pub const DEFAULT_LDAPS_PORT: u16 = 636;

/// Transport scheme of an LDAP URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LdapScheme {
    /// Plain TCP (`ldap://`)
    Ldap,
    /// TLS from the first byte (`ldaps://`)
    Ldaps,
}

impl LdapScheme {
    /// Port used when the URL does not name one
    pub fn default_port(&self) -> u16 {
        match self {
            LdapScheme::Ldap => DEFAULT_LDAP_PORT,
            LdapScheme::Ldaps => DEFAULT_LDAPS_PORT,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            LdapScheme::Ldap => "ldap",
            LdapScheme::Ldaps => "ldaps",
        }
    }
}

/// A directory server endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LdapUrl {
    scheme: LdapScheme,
    host: String,
    port: u16,
}

impl LdapUrl {
    /// Create an endpoint from its parts.
    pub fn new(scheme: LdapScheme, host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme,
            host: host.into(),
            port,
        }
    }

    /// Parse a single URL such as `ldaps://dir.example.com` or `ldap://10.0.0.5:1389`.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let parsed =
            ::url::Url::parse(input).map_err(|e| DirError::Url(format!("{input}: {e}")))?;

        let scheme = match parsed.scheme() {
            "ldap" => LdapScheme::Ldap,
            "ldaps" => LdapScheme::Ldaps,
            other => {
                return Err(DirError::Url(format!(
                    "{input}: unsupported scheme '{other}'"
                )));
            }
        };

        let host = match parsed.host_str() {
            Some(host) if !host.is_empty() => host.trim_matches(|c| c == '[' || c == ']'),
            _ => return Err(DirError::Url(format!("{input}: missing host"))),
        };

        let port = parsed.port().unwrap_or_else(|| scheme.default_port());

        Ok(Self::new(scheme, host, port))
    }

    /// Parse a whitespace separated list of URLs, e.g.
    /// `"ldap://a.example.com ldap://b.example.com"`.
    pub fn parse_list(input: &str) -> Result<Vec<Self>> {
        let urls = input
            .split_whitespace()
            .map(Self::parse)
            .collect::<Result<Vec<_>>>()?;
        if urls.is_empty() {
            return Err(DirError::Url("no LDAP URL provided".to_string()));
        }
        Ok(urls)
    }

    pub fn scheme(&self) -> LdapScheme {
        self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether the connection must be TLS wrapped before any protocol traffic
    pub fn is_ldaps(&self) -> bool {
        self.scheme == LdapScheme::Ldaps
    }

    /// `host:port` form accepted by socket address resolution
    pub fn socket_addr(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Display for LdapUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme.as_str(), self.socket_addr())
    }
}

impl FromStr for LdapUrl {
    type Err = DirError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LdapUrl {
    type Error = DirError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<LdapUrl> for String {
    fn from(url: LdapUrl) -> Self {
        url.to_string()
    }
}
