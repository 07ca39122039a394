//! Error types for the protocol layer.
//!
//! Each crate in Tessera defines its own error enum. A `ProtocolError`
//! always means a problem with the bytes of a single packet. The session
//! catches these per frame, so none of them ever closes a connection.

use crate::Opcode;

/// Errors that can occur while encoding or decoding packets.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// A read asked for more bytes than the packet holds.
    #[error("truncated packet: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// A value is too long for its 16-bit length prefix.
    #[error("overflow: length {len} exceeds maximum {max}")]
    Overflow { len: usize, max: usize },

    /// A length-prefixed string was not valid UTF-8.
    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,

    /// The first byte of a frame is not an opcode we know.
    #[error("unknown opcode 0x{0:02x}")]
    UnknownOpcode(u8),

    /// The opcode is valid but not expected in this direction.
    #[error("unexpected opcode {0:?}")]
    UnexpectedOpcode(Opcode),

    /// A frame with a zero length field carried no opcode.
    #[error("empty frame")]
    EmptyFrame,
}
