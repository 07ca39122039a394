//! Transport abstraction layer for Tessera.
//!
//! Provides the [`Transport`] and [`Connection`] traits that hide the
//! socket type from the rest of the server, plus the TCP implementation
//! the game protocol runs on.
//!
//! A [`Connection`] deals in raw byte chunks. It knows nothing about frame
//! boundaries: one `recv()` may return half a game message or several of
//! them. Reassembly is the protocol layer's job.

#![allow(async_fn_in_trait)]

mod error;
mod tcp;

pub use error::TransportError;
pub use tcp::{TcpConnection, TcpTransport};

use std::fmt;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;
}

/// A single connection that can send and receive bytes.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Writes all of `data` to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next chunk of bytes from the remote peer.
    ///
    /// Returns `Ok(None)` when the peer closed the stream.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the write side of the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
