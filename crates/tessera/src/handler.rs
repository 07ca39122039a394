//! Per-connection handler: read loop, writer task, and teardown.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Spawn a writer task that drains the session's outbound queue
//!   2. Register a [`Session`] with the hub
//!   3. Loop: receive chunks → feed them to the session
//!   4. On EOF → close the session, let the writer flush what is queued
//!   5. On error or idle timeout → close the session, abort the writer
//!   6. Shut the socket down

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tessera_session::Session;
use tessera_transport::{Connection, TcpConnection};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::TesseraError;

/// How long the writer may keep flushing queued replies after the peer
/// stops sending.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Why the read loop stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadEnd {
    /// The peer closed its sending side.
    Eof,
    /// Nothing arrived within the idle timeout.
    TimedOut,
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: TcpConnection,
    state: Arc<ServerState>,
) -> Result<(), TesseraError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::info!(%conn_id, peer = %conn.peer_addr(), "client connected");

    let (outbox, outbound) = mpsc::channel(state.session_config.outbound_queue);
    let mut writer = tokio::spawn(write_loop(Arc::clone(&conn), outbound));

    let mut session = Session::connect(
        conn_id,
        Arc::clone(&state.world),
        state.hub.clone(),
        outbox,
        state.session_config.clone(),
    )
    .await?;

    let result = read_loop(&conn, &mut session, state.idle_timeout).await;

    // After close() neither the session nor the hub holds a sender, so the
    // writer sees the queue end once it has written everything in it.
    session.close().await;

    match result {
        Ok(ReadEnd::Eof) => {
            if tokio::time::timeout(DRAIN_TIMEOUT, &mut writer).await.is_err() {
                tracing::debug!(%conn_id, "writer did not drain in time");
                writer.abort();
            }
        }
        Ok(ReadEnd::TimedOut) | Err(_) => writer.abort(),
    }

    if let Err(e) = conn.close().await {
        tracing::debug!(%conn_id, error = %e, "close failed");
    }
    tracing::info!(%conn_id, "client disconnected");

    result.map(|_| ())
}

/// Feeds received chunks to the session until the peer goes away.
async fn read_loop(
    conn: &TcpConnection,
    session: &mut Session,
    idle_timeout: Option<Duration>,
) -> Result<ReadEnd, TesseraError> {
    let conn_id = conn.id();
    loop {
        let received = match idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, conn.recv()).await {
                Ok(received) => received,
                Err(_) => {
                    tracing::info!(%conn_id, "connection timed out");
                    return Ok(ReadEnd::TimedOut);
                }
            },
            None => conn.recv().await,
        };

        let chunk = match received {
            Ok(Some(chunk)) => chunk,
            Ok(None) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                return Ok(ReadEnd::Eof);
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                return Err(e.into());
            }
        };

        session.handle_chunk(&chunk).await?;
    }
}

/// Writes queued frames to the socket in order until the queue closes or
/// a write fails.
async fn write_loop(conn: Arc<TcpConnection>, mut outbound: mpsc::Receiver<Bytes>) {
    let conn_id = conn.id();
    while let Some(frame) = outbound.recv().await {
        if let Err(e) = conn.send(&frame).await {
            tracing::debug!(%conn_id, error = %e, "send failed, stopping writer");
            break;
        }
    }
}
