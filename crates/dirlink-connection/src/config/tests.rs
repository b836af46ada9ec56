use super::*;
use dirlink_core::TlsMode;
use pretty_assertions::assert_eq;

fn urls(config: &ConnectionConfig) -> Vec<String> {
    config.urls.iter().map(ToString::to_string).collect()
}

// =============================================================================
// ConnectionConfig
// =============================================================================

#[test]
fn test_default_config() {
    let config = ConnectionConfig::default();
    assert_eq!(urls(&config), vec!["ldap://localhost:389"]);
    assert_eq!(config.strategy, ConnectionStrategy::Default);
    assert_eq!(config.connect_timeout(), Duration::from_secs(5));
    assert_eq!(config.response_timeout(), Duration::from_secs(5));
    assert!(config.bind_dn.is_none());
    assert!(config.bind_credential().is_none());
    config.validate().unwrap();
}

#[test]
fn test_new_parses_space_separated_urls() {
    let config = ConnectionConfig::new("ldap://a.example.com  ldaps://b.example.com").unwrap();
    assert_eq!(
        urls(&config),
        vec!["ldap://a.example.com:389", "ldaps://b.example.com:636"]
    );
}

#[test]
fn test_new_rejects_bad_url() {
    assert!(ConnectionConfig::new("http://a.example.com").is_err());
    assert!(ConnectionConfig::new("   ").is_err());
}

#[test]
fn test_from_toml_with_spaced_urls() {
    let config = ConnectionConfig::from_toml_str(
        r#"
        urls = "ldap://a.example.com ldap://b.example.com:1389"
        strategy = "round_robin"
        connect_timeout_ms = 2000
        bind_dn = "cn=manager,dc=example,dc=com"
        bind_credential = "secret"

        [reconnect]
        max_attempts = 5

        [reconnect.backoff]
        initial_ms = 50
        max_ms = 1000
        "#,
    )
    .unwrap();

    assert_eq!(
        urls(&config),
        vec!["ldap://a.example.com:389", "ldap://b.example.com:1389"]
    );
    assert_eq!(config.strategy, ConnectionStrategy::RoundRobin);
    assert_eq!(config.connect_timeout(), Duration::from_secs(2));
    assert_eq!(config.response_timeout(), Duration::from_secs(5));
    assert_eq!(config.bind_dn.as_deref(), Some("cn=manager,dc=example,dc=com"));
    assert_eq!(config.bind_credential(), Some("secret"));
    assert_eq!(config.reconnect.max_attempts(), 5);
    assert_eq!(
        config.reconnect.backoff().initial_delay(),
        Duration::from_millis(50)
    );
}

#[test]
fn test_from_toml_with_url_list_and_tls() {
    let config = ConnectionConfig::from_toml_str(
        r#"
        urls = ["ldaps://a.example.com", "ldaps://b.example.com"]
        strategy = "active_passive"

        [tls]
        mode = "require"
        verify_server = false
        "#,
    )
    .unwrap();

    assert_eq!(config.urls.len(), 2);
    assert_eq!(config.strategy, ConnectionStrategy::ActivePassive);
    assert_eq!(config.tls.mode, TlsMode::Require);
    assert!(!config.tls.verify_server);
}

#[test]
fn test_from_toml_rejects_invalid_settings() {
    let cases = [
        "urls = []",
        "connect_timeout_ms = 0",
        "urls = \"ldap://a.example.com\"\n[tls]\nmode = \"require\"",
        "urls = \"ldaps://a.example.com\"\n[tls]\nmode = \"disable\"",
        "urls = \"ftp://a.example.com\"",
        "urls = ",
    ];
    for input in cases {
        let err = ConnectionConfig::from_toml_str(input).unwrap_err();
        assert!(
            matches!(err, DirError::Configuration(_)),
            "{input:?} gave {err:?}"
        );
    }
}

#[test]
fn test_to_toml_omits_credential() {
    let config = ConnectionConfig::new("ldap://a.example.com")
        .unwrap()
        .with_bind("cn=manager,dc=example,dc=com", "secret");

    let rendered = config.to_toml_string().unwrap();
    assert!(rendered.contains("cn=manager,dc=example,dc=com"));
    assert!(!rendered.contains("secret"));

    let reloaded = ConnectionConfig::from_toml_str(&rendered).unwrap();
    assert_eq!(urls(&reloaded), urls(&config));
    assert_eq!(reloaded.bind_dn, config.bind_dn);
    assert!(reloaded.bind_credential().is_none());
}

#[test]
fn test_debug_redacts_credential() {
    let config = ConnectionConfig::default().with_bind("cn=admin", "hunter2");
    let debug = format!("{config:?}");
    assert!(debug.contains("cn=admin"));
    assert!(debug.contains("<redacted>"));
    assert!(!debug.contains("hunter2"));
}

// =============================================================================
// ConnectionStrategy
// =============================================================================

#[test]
fn test_default_strategy_keeps_order() {
    let cursor = AtomicUsize::new(0);
    let strategy = ConnectionStrategy::Default;
    assert_eq!(strategy.order(3, &cursor), vec![0, 1, 2]);
    strategy.record_success(2, &cursor);
    assert_eq!(strategy.order(3, &cursor), vec![0, 1, 2]);
}

#[test]
fn test_round_robin_rotates_start() {
    let cursor = AtomicUsize::new(0);
    let strategy = ConnectionStrategy::RoundRobin;
    assert_eq!(strategy.order(3, &cursor), vec![0, 1, 2]);
    assert_eq!(strategy.order(3, &cursor), vec![1, 2, 0]);
    assert_eq!(strategy.order(3, &cursor), vec![2, 0, 1]);
    assert_eq!(strategy.order(3, &cursor), vec![0, 1, 2]);
}

#[test]
fn test_active_passive_sticks_to_last_success() {
    let cursor = AtomicUsize::new(0);
    let strategy = ConnectionStrategy::ActivePassive;
    assert_eq!(strategy.order(3, &cursor), vec![0, 1, 2]);
    strategy.record_success(2, &cursor);
    assert_eq!(strategy.order(3, &cursor), vec![2, 0, 1]);
    assert_eq!(strategy.order(3, &cursor), vec![2, 0, 1]);
}

#[test]
fn test_random_order_is_a_permutation() {
    let cursor = AtomicUsize::new(0);
    for _ in 0..20 {
        let mut order = ConnectionStrategy::Random.order(5, &cursor);
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }
}

#[test]
fn test_order_of_no_urls_is_empty() {
    let cursor = AtomicUsize::new(0);
    assert!(ConnectionStrategy::RoundRobin.order(0, &cursor).is_empty());
    assert!(ConnectionStrategy::Random.order(0, &cursor).is_empty());
}

#[test]
fn test_strategy_serde_names() {
    assert_eq!(
        serde_json::to_string(&ConnectionStrategy::ActivePassive).unwrap(),
        "\"active_passive\""
    );
    let parsed: ConnectionStrategy = serde_json::from_str("\"random\"").unwrap();
    assert_eq!(parsed, ConnectionStrategy::Random);
}
