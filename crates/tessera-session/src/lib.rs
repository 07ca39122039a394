//! Session handling for Tessera.
//!
//! This crate owns everything that happens between "a connection was
//! accepted" and "the connection closed":
//!
//! 1. **Framing and dispatch**: a [`Session`] reassembles frames from raw
//!    chunks and routes each decoded message to its handler
//! 2. **Player state**: Login binds a [`Player`](tessera_world::Player) to
//!    the session; movement, spells and damage mutate it
//! 3. **Broadcast**: the [`HubHandle`] actor fans chat out to every live
//!    session without letting a slow reader stall the rest
//!
//! # How it fits in the stack
//!
//! ```text
//! Server (above)  ← accepts sockets, feeds bytes in, writes frames out
//!     ↕
//! Session Layer (this crate)  ← per-connection state machine + hub
//!     ↕
//! Protocol / World (below)  ← codecs, grid rules, game tables
//! ```

mod error;
mod hub;
mod session;

pub use error::SessionError;
pub use hub::{HubHandle, Outbox, DEFAULT_HUB_CHANNEL_SIZE};
pub use session::{Session, SessionConfig, SessionState};
