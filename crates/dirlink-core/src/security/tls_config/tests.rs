//! Tests for TLS configuration

use super::*;
use crate::LdapUrl;
use std::path::PathBuf;

fn url(s: &str) -> LdapUrl {
    LdapUrl::parse(s).unwrap()
}

#[test]
fn test_constructors_set_verification() {
    let config = TlsConfig::disabled();
    assert_eq!(config.mode, TlsMode::Disable);
    assert!(!config.verify_server);

    let config = TlsConfig::require();
    assert!(config.mode.rejects_plain_ldap());
    assert!(!config.mode.trusts_configured_ca());
    assert!(!config.verify_server);

    let config = TlsConfig::verify_full();
    assert!(config.mode.trusts_configured_ca());
    assert!(config.verify_server);
}

#[test]
fn test_client_identity_paths() {
    let config = TlsConfig::verify_full()
        .ca_cert("/etc/ssl/ca.pem")
        .client_cert("/etc/ssl/client.crt", "/etc/ssl/client.key");

    assert_eq!(config.ca_cert, Some(PathBuf::from("/etc/ssl/ca.pem")));
    assert_eq!(config.client_cert, Some(PathBuf::from("/etc/ssl/client.crt")));
    assert_eq!(config.client_key, Some(PathBuf::from("/etc/ssl/client.key")));
    assert!(config.validate().is_ok());
}

#[test]
fn test_validation_requires_ca_for_verifying_modes() {
    for mode in [TlsMode::VerifyCa, TlsMode::VerifyFull] {
        let err = TlsConfig::new(mode).validate().unwrap_err();
        assert!(err.to_string().contains("no ca_cert is set"), "{err}");
    }
    assert!(TlsConfig::new(TlsMode::VerifyCa).ca_cert("/ca.pem").validate().is_ok());
}

#[test]
fn test_validation_rejects_empty_paths() {
    let err = TlsConfig::require().ca_cert("").validate().unwrap_err();
    assert!(err.to_string().contains("ca_cert is an empty path"));

    let mut config = TlsConfig::require();
    config.client_cert = Some(PathBuf::from(""));
    config.client_key = Some(PathBuf::from("/key.pem"));
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("client_cert is an empty path"));

    let err = TlsConfig::require()
        .client_cert("/cert.pem", "")
        .validate()
        .unwrap_err();
    assert!(err.to_string().contains("client_key is an empty path"));
}

#[test]
fn test_validation_rejects_half_identity() {
    let mut config = TlsConfig::require();
    config.client_cert = Some(PathBuf::from("/cert.pem"));
    assert!(
        config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("client_cert is set without client_key")
    );

    let mut config = TlsConfig::require();
    config.client_key = Some(PathBuf::from("/key.pem"));
    assert!(
        config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("client_key is set without client_cert")
    );
}

#[test]
fn test_plain_modes_accept_ldap_urls() {
    for mode in [TlsMode::Disable, TlsMode::Allow] {
        assert!(!mode.rejects_plain_ldap());
        let config = TlsConfig::new(mode);
        assert!(!config.use_tls_for(&url("ldap://dir.example.com")).unwrap());
    }
    for mode in [TlsMode::Require, TlsMode::VerifyCa, TlsMode::VerifyFull] {
        assert!(mode.rejects_plain_ldap());
    }
}

#[test]
fn test_use_tls_follows_scheme_in_allow_mode() {
    let config = TlsConfig::default();
    assert_eq!(config.mode, TlsMode::Allow);
    assert!(config.use_tls_for(&url("ldaps://dir.example.com")).unwrap());
    assert!(!config.use_tls_for(&url("ldap://dir.example.com")).unwrap());
}

#[test]
fn test_use_tls_rejects_contradictions() {
    let err = TlsConfig::disabled()
        .use_tls_for(&url("ldaps://dir.example.com"))
        .unwrap_err();
    assert!(err.to_string().contains("TLS is disabled"));

    let err = TlsConfig::require()
        .use_tls_for(&url("ldap://dir.example.com"))
        .unwrap_err();
    assert!(err.to_string().contains("requires an ldaps:// URL"));
}

#[test]
fn test_mode_serialization() {
    for (mode, expected) in [
        (TlsMode::Disable, "\"disable\""),
        (TlsMode::Allow, "\"allow\""),
        (TlsMode::VerifyCa, "\"verify_ca\""),
    ] {
        assert_eq!(serde_json::to_string(&mode).unwrap(), expected);
    }

    let config: TlsConfig = serde_json::from_str(r#"{"mode":"require"}"#).unwrap();
    assert_eq!(config.mode, TlsMode::Require);
    assert!(config.verify_server);
}
