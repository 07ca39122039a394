//! Broadcast hub actor: the registry of live sessions.
//!
//! One Tokio task owns the registry and processes commands from an mpsc
//! channel in order. Register, unregister and broadcast therefore never
//! interleave: a broadcast reaches exactly the sessions registered when
//! its command is processed, and a session registered afterwards does not
//! see it.

use std::collections::BTreeMap;

use bytes::Bytes;
use tessera_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::SessionError;

/// Bounded queue of framed packets waiting to be written to one socket.
pub type Outbox = mpsc::Sender<Bytes>;

/// Default command channel size for the hub actor.
pub const DEFAULT_HUB_CHANNEL_SIZE: usize = 256;

/// Commands sent to the hub actor through its channel.
enum HubCommand {
    Register {
        id: ConnectionId,
        outbox: Outbox,
        reply: oneshot::Sender<()>,
    },
    Unregister {
        id: ConnectionId,
        reply: oneshot::Sender<bool>,
    },
    Broadcast {
        frame: Bytes,
        reply: oneshot::Sender<usize>,
    },
    Count {
        reply: oneshot::Sender<usize>,
    },
}

/// Handle to the running hub actor.
///
/// Cheap to clone; every session holds one.
#[derive(Clone)]
pub struct HubHandle {
    sender: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    /// Spawns a hub actor and returns a handle to it.
    ///
    /// The actor stops once every handle has been dropped.
    pub fn spawn(channel_size: usize) -> Self {
        let (tx, rx) = mpsc::channel(channel_size);
        let actor = HubActor {
            sessions: BTreeMap::new(),
            receiver: rx,
        };
        tokio::spawn(actor.run());
        Self { sender: tx }
    }

    async fn request<T>(
        &self,
        cmd: impl FnOnce(oneshot::Sender<T>) -> HubCommand,
    ) -> Result<T, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(cmd(reply_tx))
            .await
            .map_err(|_| SessionError::HubUnavailable)?;
        reply_rx.await.map_err(|_| SessionError::HubUnavailable)
    }

    /// Adds a session's outbox to the registry.
    pub async fn register(
        &self,
        id: ConnectionId,
        outbox: Outbox,
    ) -> Result<(), SessionError> {
        self.request(|reply| HubCommand::Register { id, outbox, reply })
            .await
    }

    /// Removes a session. Returns `false` if it was not registered, so
    /// a second removal is a harmless no-op.
    pub async fn unregister(
        &self,
        id: ConnectionId,
    ) -> Result<bool, SessionError> {
        self.request(|reply| HubCommand::Unregister { id, reply })
            .await
    }

    /// Queues `frame` on every registered session.
    ///
    /// Returns how many sessions it was delivered to. A full or closed
    /// outbox is skipped without affecting the others.
    pub async fn broadcast(&self, frame: Bytes) -> Result<usize, SessionError> {
        self.request(|reply| HubCommand::Broadcast { frame, reply })
            .await
    }

    /// Number of registered sessions.
    pub async fn session_count(&self) -> Result<usize, SessionError> {
        self.request(|reply| HubCommand::Count { reply }).await
    }
}

/// The hub actor state. Runs inside a Tokio task.
struct HubActor {
    sessions: BTreeMap<ConnectionId, Outbox>,
    receiver: mpsc::Receiver<HubCommand>,
}

impl HubActor {
    async fn run(mut self) {
        tracing::debug!("broadcast hub started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                HubCommand::Register { id, outbox, reply } => {
                    self.sessions.insert(id, outbox);
                    tracing::debug!(
                        %id,
                        sessions = self.sessions.len(),
                        "session registered"
                    );
                    let _ = reply.send(());
                }
                HubCommand::Unregister { id, reply } => {
                    let removed = self.sessions.remove(&id).is_some();
                    if removed {
                        tracing::debug!(
                            %id,
                            sessions = self.sessions.len(),
                            "session unregistered"
                        );
                    }
                    let _ = reply.send(removed);
                }
                HubCommand::Broadcast { frame, reply } => {
                    let delivered = self.broadcast(&frame);
                    let _ = reply.send(delivered);
                }
                HubCommand::Count { reply } => {
                    let _ = reply.send(self.sessions.len());
                }
            }
        }

        tracing::debug!("broadcast hub stopped");
    }

    fn broadcast(&self, frame: &Bytes) -> usize {
        let mut delivered = 0;
        for (id, outbox) in &self.sessions {
            match outbox.try_send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(%id, "outbox full, dropping broadcast");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::debug!(%id, "outbox closed, skipping broadcast");
                }
            }
        }
        delivered
    }
}
