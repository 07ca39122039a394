//! Plain TCP transport using `tokio::net`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::{Connection, ConnectionId, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Size of the scratch buffer used for a single socket read.
const READ_CHUNK_SIZE: usize = 4096;

/// A TCP [`Transport`] that listens for incoming game clients.
pub struct TcpTransport {
    listener: TcpListener,
}

impl TcpTransport {
    /// Binds a new TCP transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::BindFailed)?;
        tracing::info!(addr, "TCP transport listening");
        Ok(Self { listener })
    }

    /// Returns the address the listener is actually bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for TcpTransport {
    type Connection = TcpConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        // Game traffic is many tiny packets.
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(%peer, error = %e, "failed to set TCP_NODELAY");
        }

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, %peer, "accepted TCP connection");

        let (reader, writer) = stream.into_split();
        Ok(TcpConnection {
            id,
            peer,
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
        })
    }
}

/// A single TCP connection.
///
/// The read and write halves are locked independently so a writer task
/// can flush outbound packets while the handler is parked in `recv()`.
pub struct TcpConnection {
    id: ConnectionId,
    peer: SocketAddr,
    reader: Mutex<OwnedReadHalf>,
    writer: Mutex<OwnedWriteHalf>,
}

impl TcpConnection {
    /// Returns the remote peer's address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl Connection for TcpConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        self.writer
            .lock()
            .await
            .write_all(data)
            .await
            .map_err(TransportError::SendFailed)
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut buf = vec![0u8; READ_CHUNK_SIZE];
        let n = self
            .reader
            .lock()
            .await
            .read(&mut buf)
            .await
            .map_err(TransportError::ReceiveFailed)?;
        if n == 0 {
            return Ok(None);
        }
        buf.truncate(n);
        Ok(Some(buf))
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.writer
            .lock()
            .await
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
