//! IEC 60870-5-104 server (controlled station) accept loop.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, ToSocketAddrs};

use crate::config::ConnectionSettings;
use crate::connection::{Connection, ConnectionId, ConnectionIdGenerator};
use crate::error::Result;
use crate::types::CustomTypeDecoder;

/// An accepted connection together with its id.
#[derive(Debug, Clone)]
pub struct ServerConnection {
    pub id: ConnectionId,
    pub peer: SocketAddr,
    pub connection: Connection,
}

/// Listens for controlling stations.
///
/// ```rust,ignore
/// let server = Iec104Server::bind("0.0.0.0:2404", ConnectionSettings::default())
///     .await?
///     .max_connections(4);
/// loop {
///     let accepted = server.accept().await?;
///     let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
///     accepted.connection.wait_for_start_dt(Arc::new(tx), Duration::from_secs(30)).await?;
/// }
/// ```
pub struct Iec104Server {
    listener: TcpListener,
    settings: ConnectionSettings,
    ids: ConnectionIdGenerator,
    max_connections: Option<usize>,
    active_connections: Arc<AtomicUsize>,
    custom_decoder: Option<Arc<dyn CustomTypeDecoder>>,
}

impl Iec104Server {
    /// Bind a listener; accepted connections use `settings`.
    pub async fn bind(address: impl ToSocketAddrs, settings: ConnectionSettings) -> Result<Self> {
        settings.validate()?;
        let listener = TcpListener::bind(address).await?;
        if let Ok(local) = listener.local_addr() {
            tracing::info!(address = %local, "IEC 104 server listening");
        }
        Ok(Self {
            listener,
            settings,
            ids: ConnectionIdGenerator::new(),
            max_connections: None,
            active_connections: Arc::new(AtomicUsize::new(0)),
            custom_decoder: None,
        })
    }

    /// Limit the number of simultaneously open connections.
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = Some(max);
        self
    }

    /// Decoder for reserved and private type codes on every accepted connection.
    pub fn custom_decoder(mut self, decoder: Arc<dyn CustomTypeDecoder>) -> Self {
        self.custom_decoder = Some(decoder);
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Number of accepted connections not yet closed.
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Acquire)
    }

    /// Wait for the next connection within the connection limit.
    ///
    /// Sockets beyond the limit are dropped immediately.
    pub async fn accept(&self) -> Result<ServerConnection> {
        loop {
            let (stream, peer) = self.listener.accept().await?;

            if let Some(max) = self.max_connections {
                let reserved = self
                    .active_connections
                    .fetch_update(Ordering::AcqRel, Ordering::Acquire, |active| {
                        (active < max).then_some(active + 1)
                    });
                if reserved.is_err() {
                    tracing::warn!(%peer, max, "max connections reached, rejecting");
                    continue;
                }
            } else {
                self.active_connections.fetch_add(1, Ordering::AcqRel);
            }

            stream.set_nodelay(true).ok();
            let id = self.ids.next_id();
            let opened = match &self.custom_decoder {
                Some(decoder) => Connection::with_custom_decoder(
                    stream,
                    self.settings.clone(),
                    id,
                    decoder.clone(),
                ),
                None => Connection::new(stream, self.settings.clone(), id),
            };
            let connection = match opened {
                Ok(connection) => connection,
                Err(err) => {
                    self.active_connections.fetch_sub(1, Ordering::AcqRel);
                    return Err(err);
                }
            };

            let active = Arc::clone(&self.active_connections);
            let watched = connection.clone();
            tokio::spawn(async move {
                let cause = watched.closed().await;
                active.fetch_sub(1, Ordering::AcqRel);
                tracing::debug!(connection = %watched.id(), %cause, "connection slot released");
            });

            tracing::debug!(connection = %id, %peer, "accepted");
            return Ok(ServerConnection {
                id,
                peer,
                connection,
            });
        }
    }
}
