use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;

use super::*;
use crate::config::ConnectionStrategy;
use crate::health::OpenStateValidator;
use crate::reconnect::ReconnectConfig;

async fn listener() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ldap://{}", listener.local_addr().unwrap());
    (listener, url)
}

fn config(urls: &str) -> ConnectionConfig {
    ConnectionConfig::new(urls)
        .unwrap()
        .with_reconnect(ReconnectConfig::no_retry())
}

struct RejectAll;

#[async_trait]
impl Activator<DirectoryConnection> for RejectAll {
    async fn activate(&self, _conn: &DirectoryConnection) -> bool {
        false
    }
}

#[async_trait]
impl Passivator<DirectoryConnection> for RejectAll {
    async fn passivate(&self, _conn: &DirectoryConnection) -> bool {
        false
    }
}

#[test]
fn test_new_rejects_invalid_config() {
    let mut bad = config("ldap://127.0.0.1:389");
    bad.urls.clear();
    assert!(DirectoryConnectionFactory::new(bad).is_err());
}

#[tokio::test]
async fn test_create_opens_connection() {
    let (listener, url) = listener().await;
    let factory = DirectoryConnectionFactory::new(config(&url)).unwrap();

    let (created, accepted) = tokio::join!(factory.create(), listener.accept());
    let conn = created.unwrap();
    let _server = accepted.unwrap();

    assert!(!conn.is_closed());
    assert!(factory.validate(&conn).await);
    assert!(factory.activate(&conn).await);
    assert!(factory.passivate(&conn).await);

    factory.destroy(&conn).await;
    assert!(conn.is_closed());
    assert!(!factory.validate(&conn).await);
}

#[tokio::test]
async fn test_create_fails_when_server_down() {
    let (listener, url) = listener().await;
    drop(listener);
    let factory = DirectoryConnectionFactory::new(config(&url)).unwrap();
    let err = factory.create().await.unwrap_err();
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_default_validator_rejects_dropped_peer() {
    let (listener, url) = listener().await;
    let factory = DirectoryConnectionFactory::new(config(&url)).unwrap();
    let (created, accepted) = tokio::join!(factory.create(), listener.accept());
    let conn = created.unwrap();
    let (server, _) = accepted.unwrap();

    drop(server);

    let mut rejected = false;
    for _ in 0..100 {
        if !factory.validate(&conn).await {
            rejected = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(rejected, "validator kept accepting a dropped connection");
}

#[tokio::test]
async fn test_custom_hooks() {
    let (listener, url) = listener().await;
    let factory = DirectoryConnectionFactory::new(config(&url))
        .unwrap()
        .with_validator(OpenStateValidator)
        .with_activator(RejectAll)
        .with_passivator(RejectAll);

    let (created, accepted) = tokio::join!(factory.create(), listener.accept());
    let conn = created.unwrap();
    let _server = accepted.unwrap();

    assert!(factory.validate(&conn).await);
    assert!(!factory.activate(&conn).await);
    assert!(!factory.passivate(&conn).await);
}

#[tokio::test]
async fn test_round_robin_spreads_connections() {
    let (first, first_url) = listener().await;
    let (second, second_url) = listener().await;
    let factory = DirectoryConnectionFactory::new(
        config(&format!("{first_url} {second_url}")).with_strategy(ConnectionStrategy::RoundRobin),
    )
    .unwrap();

    let (a, accepted) = tokio::join!(factory.create(), first.accept());
    let a = a.unwrap();
    let _a_server = accepted.unwrap();
    let (b, accepted) = tokio::join!(factory.create(), second.accept());
    let b = b.unwrap();
    let _b_server = accepted.unwrap();

    assert_eq!(a.describe(), first_url);
    assert_eq!(b.describe(), second_url);
}

#[test]
fn test_debug_hides_hooks() {
    let factory = DirectoryConnectionFactory::new(config("ldap://127.0.0.1:389")).unwrap();
    let debug = format!("{factory:?}");
    assert!(debug.contains("DirectoryConnectionFactory"));
    assert!(debug.contains("127.0.0.1"));
}
