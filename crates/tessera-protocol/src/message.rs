//! Opcodes and the tagged message types that travel inside frames.
//!
//! A frame body is `[opcode: u8][payload]`. Decoding turns a body into a
//! [`ClientMessage`] (what players send) or a [`ServerMessage`] (what the
//! server sends back); encoding goes the other way through a
//! [`Packet`].

use std::fmt;

use crate::{PacketBuffer, ProtocolError};

/// Bias added to movement offsets so they fit in an unsigned byte.
pub const MOVE_BIAS: i16 = 128;

/// Single-byte tag that selects a message type and its payload layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Client → server: `[string name]`.
    Login = 0x10,
    /// Client → server: `[u8 dx + 128][u8 dy + 128]`.
    Move = 0x20,
    /// Both directions: `[string text]`.
    Say = 0x30,
    /// Server → client: `[string text]`.
    System = 0x40,
    /// Server → client: `[u16 hp][u16 max_hp][u16 mana][u16 max_mana]`.
    UpdateStats = 0x60,
    /// Client → server: `[u16 amount]`.
    Damage = 0x70,
}

impl TryFrom<u8> for Opcode {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x10 => Ok(Self::Login),
            0x20 => Ok(Self::Move),
            0x30 => Ok(Self::Say),
            0x40 => Ok(Self::System),
            0x60 => Ok(Self::UpdateStats),
            0x70 => Ok(Self::Damage),
            other => Err(ProtocolError::UnknownOpcode(other)),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}(0x{:02x})", *self as u8)
    }
}

// ---------------------------------------------------------------------------
// Packet
// ---------------------------------------------------------------------------

/// An opcode plus its payload, backed by a [`PacketBuffer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    opcode: Opcode,
    body: PacketBuffer,
}

impl Packet {
    /// Starts an outbound packet. The opcode is written as the first byte.
    pub fn new(opcode: Opcode) -> Self {
        let mut body = PacketBuffer::with_capacity(16);
        body.write_u8(opcode as u8);
        Self { opcode, body }
    }

    /// Parses the opcode of a received frame body and positions the read
    /// cursor at the start of the payload.
    pub fn from_frame(frame: &[u8]) -> Result<Self, ProtocolError> {
        let mut body = PacketBuffer::from_bytes(frame);
        let raw = body.read_u8().map_err(|_| ProtocolError::EmptyFrame)?;
        let opcode = Opcode::try_from(raw)?;
        Ok(Self { opcode, body })
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// Mutable access to the payload for reading or writing fields.
    pub fn body(&mut self) -> &mut PacketBuffer {
        &mut self.body
    }

    /// Opcode and payload, without a length prefix.
    pub fn as_bytes(&self) -> &[u8] {
        self.body.as_bytes()
    }

    /// Wraps the packet in its length prefix, ready for the socket.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Overflow`] if opcode plus payload exceed
    /// the 65535 bytes a `u16` length can describe.
    pub fn to_frame(&self) -> Result<Vec<u8>, ProtocolError> {
        let body = self.body.as_bytes();
        let len = u16::try_from(body.len()).map_err(|_| {
            ProtocolError::Overflow {
                len: body.len(),
                max: u16::MAX as usize,
            }
        })?;
        let mut out = Vec::with_capacity(crate::LENGTH_PREFIX + body.len());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(body);
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// ClientMessage
// ---------------------------------------------------------------------------

/// Messages a game client sends to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Claim a player identity for this session.
    Login { name: String },
    /// Step by a signed offset. Nominally -1..=1 on each axis but the
    /// wire allows -128..=127 and the server does not clamp it.
    Move { dx: i16, dy: i16 },
    /// Chat line or spell words.
    Say { text: String },
    /// Client-reported damage taken.
    Damage { amount: u16 },
}

impl ClientMessage {
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Login { .. } => Opcode::Login,
            Self::Move { .. } => Opcode::Move,
            Self::Say { .. } => Opcode::Say,
            Self::Damage { .. } => Opcode::Damage,
        }
    }

    /// Decodes a frame body received from a client.
    pub fn decode(frame: &[u8]) -> Result<Self, ProtocolError> {
        let mut packet = Packet::from_frame(frame)?;
        let opcode = packet.opcode();
        let body = packet.body();
        match opcode {
            Opcode::Login => Ok(Self::Login {
                name: body.read_string()?,
            }),
            Opcode::Move => {
                let dx = body.read_u8()? as i16 - MOVE_BIAS;
                let dy = body.read_u8()? as i16 - MOVE_BIAS;
                Ok(Self::Move { dx, dy })
            }
            Opcode::Say => Ok(Self::Say {
                text: body.read_string()?,
            }),
            Opcode::Damage => Ok(Self::Damage {
                amount: body.read_u16()?,
            }),
            other @ (Opcode::System | Opcode::UpdateStats) => {
                Err(ProtocolError::UnexpectedOpcode(other))
            }
        }
    }

    /// Encodes the message as a packet.
    pub fn encode(&self) -> Result<Packet, ProtocolError> {
        let mut packet = Packet::new(self.opcode());
        let body = packet.body();
        match self {
            Self::Login { name } => body.write_string(name)?,
            Self::Move { dx, dy } => {
                body.write_u8(bias(*dx)?);
                body.write_u8(bias(*dy)?);
            }
            Self::Say { text } => body.write_string(text)?,
            Self::Damage { amount } => body.write_u16(*amount),
        }
        Ok(packet)
    }

    /// Encodes and frames the message in one step.
    pub fn to_frame(&self) -> Result<Vec<u8>, ProtocolError> {
        self.encode()?.to_frame()
    }
}

fn bias(delta: i16) -> Result<u8, ProtocolError> {
    delta
        .checked_add(MOVE_BIAS)
        .and_then(|v| u8::try_from(v).ok())
        .ok_or(ProtocolError::Overflow {
            len: delta.unsigned_abs() as usize,
            max: MOVE_BIAS as usize,
        })
}

// ---------------------------------------------------------------------------
// ServerMessage
// ---------------------------------------------------------------------------

/// Messages the server sends to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// The receiving player's current vitals.
    UpdateStats {
        hp: u16,
        max_hp: u16,
        mana: u16,
        max_mana: u16,
    },
    /// A public line, already formatted as `"<name>: <text>"`.
    Chat { text: String },
    /// A notice meant only for the receiving player.
    System { text: String },
}

impl ServerMessage {
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::UpdateStats { .. } => Opcode::UpdateStats,
            Self::Chat { .. } => Opcode::Say,
            Self::System { .. } => Opcode::System,
        }
    }

    /// Shorthand for a [`ServerMessage::System`] notice.
    pub fn system(text: impl Into<String>) -> Self {
        Self::System { text: text.into() }
    }

    /// Decodes a frame body received from the server.
    pub fn decode(frame: &[u8]) -> Result<Self, ProtocolError> {
        let mut packet = Packet::from_frame(frame)?;
        let opcode = packet.opcode();
        let body = packet.body();
        match opcode {
            Opcode::UpdateStats => Ok(Self::UpdateStats {
                hp: body.read_u16()?,
                max_hp: body.read_u16()?,
                mana: body.read_u16()?,
                max_mana: body.read_u16()?,
            }),
            Opcode::Say => Ok(Self::Chat {
                text: body.read_string()?,
            }),
            Opcode::System => Ok(Self::System {
                text: body.read_string()?,
            }),
            other @ (Opcode::Login | Opcode::Move | Opcode::Damage) => {
                Err(ProtocolError::UnexpectedOpcode(other))
            }
        }
    }

    /// Encodes the message as a packet.
    pub fn encode(&self) -> Result<Packet, ProtocolError> {
        let mut packet = Packet::new(self.opcode());
        let body = packet.body();
        match self {
            Self::UpdateStats {
                hp,
                max_hp,
                mana,
                max_mana,
            } => {
                body.write_u16(*hp);
                body.write_u16(*max_hp);
                body.write_u16(*mana);
                body.write_u16(*max_mana);
            }
            Self::Chat { text } | Self::System { text } => {
                body.write_string(text)?
            }
        }
        Ok(packet)
    }

    /// Encodes and frames the message in one step.
    pub fn to_frame(&self) -> Result<Vec<u8>, ProtocolError> {
        self.encode()?.to_frame()
    }
}
