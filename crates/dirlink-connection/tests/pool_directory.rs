//! Pooling real TCP connections against local listeners

use std::sync::Arc;
use std::time::Duration;

use dirlink_connection::{
    ConnectionConfig, ConnectionPool, ConnectionStrategy, DirectoryConnectionFactory, PoolConfig,
    PoolError, PoolState, ReconnectConfig,
};
use dirlink_core::Connection;
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Accepts connections and keeps them open until told to drop them
struct TestServer {
    url: String,
    sockets: Arc<Mutex<Vec<TcpStream>>>,
    accept_loop: JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ldap://{}", listener.local_addr().unwrap());
        let sockets = Arc::new(Mutex::new(Vec::new()));
        let accepted = sockets.clone();
        let accept_loop = tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                accepted.lock().push(socket);
            }
        });
        Self {
            url,
            sockets,
            accept_loop,
        }
    }

    fn connections(&self) -> usize {
        self.sockets.lock().len()
    }

    /// Close every accepted socket, as a restarting server would
    fn drop_connections(&self) {
        self.sockets.lock().clear();
    }

    fn take_connections(&self) -> Vec<TcpStream> {
        std::mem::take(&mut *self.sockets.lock())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.accept_loop.abort();
    }
}

fn connection_config(urls: &str) -> ConnectionConfig {
    ConnectionConfig::new(urls)
        .unwrap()
        .with_connect_timeout_ms(2_000)
        .with_response_timeout_ms(1_000)
        .with_reconnect(ReconnectConfig::no_retry())
}

async fn wait_for_connections(server: &TestServer, expected: usize) {
    for _ in 0..100 {
        if server.connections() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "server saw {} connections, expected {expected}",
        server.connections()
    );
}

#[tokio::test]
async fn test_pool_of_directory_connections() {
    init_tracing();
    let server = TestServer::start().await;
    let factory = DirectoryConnectionFactory::new(connection_config(&server.url)).unwrap();
    let pool = ConnectionPool::new(PoolConfig::new(2, 4), factory);

    pool.initialize().await.unwrap();
    assert_eq!(pool.state(), PoolState::Ready);
    assert_eq!(pool.available_count(), 2);
    wait_for_connections(&server, 2).await;

    let conn = pool.checkout().await.unwrap();
    assert_eq!(pool.active_count(), 1);
    assert_eq!(pool.available_count(), 1);
    {
        let mut stream = conn.stream().await.unwrap();
        stream.write_all(b"ping").await.unwrap();
        stream.flush().await.unwrap();
    }
    pool.checkin(conn).await;
    assert_eq!(pool.active_count(), 0);
    assert_eq!(pool.available_count(), 2);

    let mut received = 0;
    for mut socket in server.take_connections() {
        let mut buf = [0u8; 4];
        if let Ok(Ok(n)) =
            tokio::time::timeout(Duration::from_millis(50), socket.read(&mut buf)).await
        {
            assert_eq!(&buf[..n], b"ping");
            received += 1;
        }
        server.sockets.lock().push(socket);
    }
    assert_eq!(received, 1);

    pool.close().await;
    assert_eq!(pool.state(), PoolState::Closed);
    assert_eq!(pool.available_count(), 0);

    for mut socket in server.take_connections() {
        let mut buf = [0u8; 1];
        let n = tokio::time::timeout(Duration::from_secs(1), socket.read(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(n, 0, "pool close must close the socket");
    }
}

#[tokio::test]
async fn test_checkout_validation_discards_dropped_connections() {
    init_tracing();
    let server = TestServer::start().await;
    let factory = DirectoryConnectionFactory::new(connection_config(&server.url)).unwrap();
    let pool = ConnectionPool::new(
        PoolConfig::new(1, 2).with_validate_on_checkout(true),
        factory,
    );
    pool.initialize().await.unwrap();
    wait_for_connections(&server, 1).await;

    server.drop_connections();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let err = pool.checkout().await.unwrap_err();
    assert!(matches!(err, PoolError::Validation));
    assert!(err.is_broken_connection());
    assert_eq!(pool.available_count(), 0);
    assert_eq!(pool.active_count(), 0);

    // Retrying opens a fresh connection
    let conn = pool.checkout().await.unwrap();
    assert!(!conn.is_closed());
    pool.checkin(conn).await;
    pool.close().await;
}

#[tokio::test]
async fn test_periodic_validation_replaces_dropped_connections() {
    init_tracing();
    let server = TestServer::start().await;
    let factory = DirectoryConnectionFactory::new(connection_config(&server.url)).unwrap();
    let pool = ConnectionPool::new(
        PoolConfig::new(2, 4).with_validate_periodically(true),
        factory,
    );
    pool.initialize().await.unwrap();
    wait_for_connections(&server, 2).await;

    server.drop_connections();
    tokio::time::sleep(Duration::from_millis(50)).await;

    pool.validate().await;
    assert_eq!(pool.available_count(), 2);
    wait_for_connections(&server, 2).await;

    let conn = pool.checkout().await.unwrap();
    conn.probe().await.unwrap();
    pool.checkin(conn).await;
    pool.close().await;
}

#[tokio::test]
async fn test_pool_fails_over_to_second_server() {
    init_tracing();
    let down = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        format!("ldap://{}", listener.local_addr().unwrap())
    };
    let server = TestServer::start().await;
    let config = connection_config(&format!("{down} {}", server.url))
        .with_strategy(ConnectionStrategy::ActivePassive);
    let factory = DirectoryConnectionFactory::new(config).unwrap();
    let pool = ConnectionPool::new(PoolConfig::new(2, 2), factory);

    pool.initialize().await.unwrap();
    assert_eq!(pool.available_count(), 2);

    let conn = pool.checkout().await.unwrap();
    assert_eq!(conn.describe(), server.url);
    pool.checkin(conn).await;
    pool.close().await;
}

#[tokio::test]
async fn test_initialize_with_server_down_leaves_pool_empty() {
    init_tracing();
    let down = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        format!("ldap://{}", listener.local_addr().unwrap())
    };
    let factory = DirectoryConnectionFactory::new(connection_config(&down)).unwrap();
    let pool = ConnectionPool::new(PoolConfig::new(2, 2), factory);

    pool.initialize().await.unwrap();
    assert_eq!(pool.state(), PoolState::Ready);
    assert_eq!(pool.available_count(), 0);

    let err = pool.checkout().await.unwrap_err();
    assert!(matches!(err, PoolError::Creation(_)));
    assert_eq!(pool.stats().total(), 0);
    pool.close().await;
}
