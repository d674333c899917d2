//! IEC 60870-5-104 client (controlling station) connect helper.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::timeout;

use crate::config::ConnectionSettings;
use crate::connection::{Connection, ConnectionIdGenerator};
use crate::dispatch::ConnectionEventListener;
use crate::error::{Iec104Error, Result, TransportErrorKind};

/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens TCP connections to controlled stations.
///
/// ```rust,ignore
/// let client = Iec104Client::new(ConnectionSettings::default());
/// let connection = client.connect("192.168.1.100:2404").await?;
/// ```
#[derive(Debug)]
pub struct Iec104Client {
    settings: ConnectionSettings,
    connect_timeout: Duration,
    ids: ConnectionIdGenerator,
}

impl Iec104Client {
    /// Create a client whose connections use `settings`.
    pub fn new(settings: ConnectionSettings) -> Self {
        Self {
            settings,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            ids: ConnectionIdGenerator::new(),
        }
    }

    /// Set connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Connect to `address`. The connection starts in STOPPED state.
    pub async fn connect(&self, address: impl ToSocketAddrs) -> Result<Connection> {
        self.settings.validate()?;

        let stream = timeout(self.connect_timeout, TcpStream::connect(address))
            .await
            .map_err(|_| Iec104Error::Transport {
                kind: TransportErrorKind::Io(std::io::ErrorKind::TimedOut),
                message: "connect timed out".into(),
            })??;

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true).ok();
        let peer = stream.peer_addr().ok();

        let connection = Connection::new(stream, self.settings.clone(), self.ids.next_id())?;
        tracing::debug!(connection = %connection.id(), peer = ?peer, "connected");
        Ok(connection)
    }

    /// Connect and run the STARTDT handshake within the handshake timeout.
    pub async fn connect_and_start(
        &self,
        address: impl ToSocketAddrs,
        listener: Arc<dyn ConnectionEventListener>,
    ) -> Result<Connection> {
        let connection = self.connect(address).await?;
        connection
            .start_data_transfer(listener, self.settings.handshake_timeout)
            .await?;
        Ok(connection)
    }
}
