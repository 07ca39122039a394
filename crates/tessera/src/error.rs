//! Unified error type for the Tessera server.

use tessera_protocol::ProtocolError;
use tessera_session::SessionError;
use tessera_transport::TransportError;
use tessera_world::WorldError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls the
/// `?` operator needs, so handler code never converts by hand.
#[derive(Debug, thiserror::Error)]
pub enum TesseraError {
    /// Binding, accepting, or socket I/O failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A packet could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The map or a player could not be built.
    #[error(transparent)]
    World(#[from] WorldError),

    /// The session or broadcast hub failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}
