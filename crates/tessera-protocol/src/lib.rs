//! Wire protocol for Tessera.
//!
//! This crate defines the bytes that clients and the server exchange:
//!
//! - **Codec** ([`PacketBuffer`]): little-endian integers and
//!   length-prefixed UTF-8 strings over a growable buffer.
//! - **Framing** ([`FrameReader`]): `[u16 LE length][body]` reassembly
//!   from an arbitrary byte stream.
//! - **Messages** ([`Opcode`], [`ClientMessage`], [`ServerMessage`]):
//!   the tagged message types carried inside frames.
//! - **Errors** ([`ProtocolError`]): what can go wrong decoding one packet.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and session
//! (player state). It knows nothing about sockets or players.
//!
//! ```text
//! Transport (bytes) → FrameReader (frames) → ClientMessage → Session
//! ```

mod buffer;
mod error;
mod frame;
mod message;

pub use buffer::{PacketBuffer, MAX_STRING_LEN};
pub use error::ProtocolError;
pub use frame::{FrameReader, LENGTH_PREFIX};
pub use message::{ClientMessage, Opcode, Packet, ServerMessage, MOVE_BIAS};
