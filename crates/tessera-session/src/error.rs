//! Error types for the session layer.

use tessera_protocol::ProtocolError;
use tessera_world::WorldError;

/// Errors that can occur while a session handles its byte stream.
///
/// Most of these are scoped to a single frame: the session logs them and
/// moves on to the next frame. Only [`SessionError::is_fatal`] errors end
/// the connection.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The frame could not be decoded or a reply could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Player creation failed.
    #[error(transparent)]
    World(#[from] WorldError),

    /// The broadcast hub task is gone.
    #[error("broadcast hub is unavailable")]
    HubUnavailable,

    /// The session's outbound queue was closed by its writer.
    #[error("outbound queue closed")]
    OutboxClosed,
}

impl SessionError {
    /// Returns `true` if the session cannot continue after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::OutboxClosed | Self::HubUnavailable)
    }
}
