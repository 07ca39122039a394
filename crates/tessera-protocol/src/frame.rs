//! Length-prefixed framing over a raw byte stream.
//!
//! On the wire every packet is wrapped as `[u16 LE length][length bytes]`.
//! TCP delivers bytes, not messages, so a single read can hold a fragment
//! of one frame or several frames back to back. [`FrameReader`] buffers
//! whatever arrives and hands out complete frames in arrival order.

use bytes::{Buf, Bytes, BytesMut};

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX: usize = 2;

/// Reassembles length-prefixed frames from arbitrary chunks.
#[derive(Debug, Default)]
pub struct FrameReader {
    buf: BytesMut,
}

impl FrameReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends newly received bytes to the accumulation buffer.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Pops the next complete frame body, without its length prefix.
    ///
    /// Returns `None` when the buffer holds less than one whole frame; the
    /// partial bytes stay buffered for the next [`extend`](Self::extend).
    pub fn next_frame(&mut self) -> Option<Bytes> {
        if self.buf.len() < LENGTH_PREFIX {
            return None;
        }
        let len = u16::from_le_bytes([self.buf[0], self.buf[1]]) as usize;
        if self.buf.len() < LENGTH_PREFIX + len {
            return None;
        }
        self.buf.advance(LENGTH_PREFIX);
        Some(self.buf.split_to(len).freeze())
    }

    /// Appends `chunk` and drains every complete frame, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Bytes> {
        self.extend(chunk);
        std::iter::from_fn(|| self.next_frame()).collect()
    }

    /// Number of bytes waiting for the rest of their frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }
}
