//! # Tessera
//!
//! Server for a small tile-based multiplayer world.
//!
//! Clients speak a compact binary protocol over TCP: length-prefixed frames
//! carrying one opcode byte and a little-endian payload. Each connection
//! gets a session that binds a player on login, validates movement against
//! the map, casts healing spells, and relays chat to everyone online.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tessera::prelude::*;
//!
//! # async fn start() -> Result<(), TesseraError> {
//! let server = TesseraServer::builder()
//!     .bind("0.0.0.0:7171")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::TesseraError;
pub use server::{
    TesseraServer, TesseraServerBuilder, DEFAULT_IDLE_TIMEOUT, DEFAULT_PORT,
};

/// Re-exports the types most servers and clients need.
pub mod prelude {
    pub use crate::{TesseraError, TesseraServer, TesseraServerBuilder};
    pub use tessera_protocol::{ClientMessage, FrameReader, ServerMessage};
    pub use tessera_session::SessionConfig;
    pub use tessera_world::{VocationId, World};
}
