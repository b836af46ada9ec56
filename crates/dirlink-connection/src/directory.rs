//! TCP / TLS transport to a directory server
//!
//! [`DirectoryConnection`] owns the socket a protocol layer speaks LDAP over.
//! It knows how to reach one of several configured servers, how to wrap the
//! socket in TLS, and how to tell whether the peer has gone away. It does not
//! encode or decode any protocol messages.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::task::{Context, Poll};

use async_trait::async_trait;
use dirlink_core::{Connection, DirError, LdapUrl, Result};
use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::TcpStream;
use tokio::sync::{MappedMutexGuard, Mutex as AsyncMutex, MutexGuard};
use tokio::time;
use tokio_native_tls::{TlsConnector, TlsStream};
use tracing::{debug, info, trace, warn};

use crate::config::ConnectionConfig;
use crate::reconnect::retry_with_backoff;
use crate::tls::build_connector;

/// The byte stream of an open connection
pub enum Stream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl Stream {
    pub fn is_tls(&self) -> bool {
        matches!(self, Stream::Tls(_))
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Plain(_) => f.write_str("Stream::Plain"),
            Stream::Tls(_) => f.write_str("Stream::Tls"),
        }
    }
}

impl AsyncRead for Stream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Stream::Plain(s) => Pin::new(s).poll_read(cx, buf),
            Stream::Tls(s) => Pin::new(s.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for Stream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Stream::Plain(s) => Pin::new(s).poll_write(cx, buf),
            Stream::Tls(s) => Pin::new(s.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Stream::Plain(s) => Pin::new(s).poll_flush(cx),
            Stream::Tls(s) => Pin::new(s.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Stream::Plain(s) => Pin::new(s).poll_shutdown(cx),
            Stream::Tls(s) => Pin::new(s.as_mut()).poll_shutdown(cx),
        }
    }
}

struct Transport {
    url: LdapUrl,
    stream: Stream,
    /// Second handle on the same socket, used to peek for EOF without
    /// disturbing the stream or its TLS state
    watch: std::net::TcpStream,
}

/// A connection to one of the servers named in a [`ConnectionConfig`]
pub struct DirectoryConnection {
    config: Arc<ConnectionConfig>,
    tls: Option<TlsConnector>,
    /// Strategy state shared by all connections from the same factory
    cursor: Arc<AtomicUsize>,
    transport: AsyncMutex<Option<Transport>>,
    connected_to: Mutex<Option<LdapUrl>>,
    open: AtomicBool,
}

impl DirectoryConnection {
    /// Create an unopened connection with its own TLS connector
    pub fn from_config(config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        let tls = build_connector(&config.tls)?;
        Ok(Self::new(
            Arc::new(config),
            tls,
            Arc::new(AtomicUsize::new(0)),
        ))
    }

    pub(crate) fn new(
        config: Arc<ConnectionConfig>,
        tls: Option<TlsConnector>,
        cursor: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            config,
            tls,
            cursor,
            transport: AsyncMutex::new(None),
            connected_to: Mutex::new(None),
            open: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Server the connection is currently open to
    pub fn url(&self) -> Option<LdapUrl> {
        self.connected_to.lock().clone()
    }

    /// Exclusive access to the byte stream for the protocol layer
    pub async fn stream(&self) -> Result<MappedMutexGuard<'_, Stream>> {
        let guard = self.transport.lock().await;
        MutexGuard::try_map(guard, |transport| {
            transport.as_mut().map(|transport| &mut transport.stream)
        })
        .map_err(|_| DirError::Closed)
    }

    /// One pass over the configured URLs in strategy order
    async fn connect_any(&self, attempt: u32) -> Result<Transport> {
        let urls = &self.config.urls;
        let order = self.config.strategy.order(urls.len(), &self.cursor);
        let mut last_error = None;

        for index in order {
            let url = &urls[index];
            trace!(%url, attempt, "connecting");
            match self.connect_url(url).await {
                Ok(transport) => {
                    self.config.strategy.record_success(index, &self.cursor);
                    return Ok(transport);
                }
                Err(e) => {
                    debug!(%url, attempt, error = %e, "could not connect");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| DirError::Configuration("no LDAP URL configured".to_string())))
    }

    async fn connect_url(&self, url: &LdapUrl) -> Result<Transport> {
        let use_tls = self.config.tls.use_tls_for(url)?;
        let timeout = self.config.connect_timeout();

        let tcp = time::timeout(timeout, TcpStream::connect(url.socket_addr()))
            .await
            .map_err(|_| DirError::Timeout(format!("connecting to {url} took over {timeout:?}")))??;
        tcp.set_nodelay(true)?;

        let std_stream = tcp.into_std()?;
        let watch = std_stream.try_clone()?;
        let tcp = TcpStream::from_std(std_stream)?;

        let stream = if use_tls {
            let connector = self
                .tls
                .as_ref()
                .ok_or_else(|| DirError::Tls(format!("{url} requires TLS but TLS is disabled")))?;
            let tls = time::timeout(timeout, connector.connect(url.host(), tcp))
                .await
                .map_err(|_| {
                    DirError::Timeout(format!("TLS handshake with {url} took over {timeout:?}"))
                })?
                .map_err(|e| DirError::Tls(format!("TLS handshake with {url} failed: {e}")))?;
            Stream::Tls(Box::new(tls))
        } else {
            Stream::Plain(tcp)
        };

        Ok(Transport {
            url: url.clone(),
            stream,
            watch,
        })
    }
}

#[async_trait]
impl Connection for DirectoryConnection {
    async fn open(&self) -> Result<()> {
        let mut transport = self.transport.lock().await;
        if transport.is_some() {
            return Ok(());
        }

        let opened =
            retry_with_backoff(&self.config.reconnect, |attempt| self.connect_any(attempt)).await?;

        info!(url = %opened.url, tls = opened.stream.is_tls(), "directory connection opened");
        *self.connected_to.lock() = Some(opened.url.clone());
        *transport = Some(opened);
        self.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.open.store(false, Ordering::SeqCst);
        let taken = self.transport.lock().await.take();
        self.connected_to.lock().take();

        if let Some(mut transport) = taken {
            if let Err(e) = transport.stream.shutdown().await {
                // The peer may already be gone; the socket is dropped either way.
                trace!(url = %transport.url, error = %e, "shutdown failed");
            }
            debug!(url = %transport.url, "directory connection closed");
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        !self.open.load(Ordering::SeqCst)
    }

    /// Peeks at the socket without consuming data. EOF or a socket error
    /// means the server dropped the connection.
    async fn probe(&self) -> Result<()> {
        let transport = self.transport.lock().await;
        let Some(transport) = transport.as_ref() else {
            return Err(DirError::Closed);
        };

        let mut buf = [0u8; 1];
        match transport.watch.peek(&mut buf) {
            Ok(0) => {
                warn!(url = %transport.url, "server closed the connection");
                Err(DirError::Connection(format!(
                    "{} closed the connection",
                    transport.url
                )))
            }
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn describe(&self) -> String {
        match self.connected_to.lock().as_ref() {
            Some(url) => url.to_string(),
            None => self
                .config
                .urls
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl fmt::Debug for DirectoryConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryConnection")
            .field("url", &*self.connected_to.lock())
            .field("open", &!self.is_closed())
            .field("tls", &self.tls.is_some())
            .finish()
    }
}
