//! Growable byte buffer with independent read and write cursors.
//!
//! This is the wire codec's workhorse. Writers append little-endian
//! integers and length-prefixed strings at `write_pos`; readers consume
//! them sequentially from `read_pos`. Every read is bounds-checked against
//! `write_pos` and fails with [`ProtocolError::Truncated`] instead of
//! reading garbage.
//!
//! ```text
//!   0           read_pos          write_pos         capacity
//!   |---consumed---|----readable----|----spare----|
//! ```

use crate::ProtocolError;

/// Smallest capacity the buffer grows to on its first write.
const MIN_CAPACITY: usize = 16;

/// Largest byte length a `u16` length prefix can describe.
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// An owned byte buffer with separate read and write cursors.
///
/// The backing `Vec` is kept zero-filled to its full length, so
/// `buf.len()` *is* the capacity. Growth doubles it and copies the
/// existing bytes; neither cursor moves during growth.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PacketBuffer {
    buf: Vec<u8>,
    read_pos: usize,
    write_pos: usize,
}

impl PacketBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity],
            read_pos: 0,
            write_pos: 0,
        }
    }

    /// Wraps received bytes for reading.
    ///
    /// The write cursor sits at the end of `raw`, so every byte is readable.
    pub fn from_bytes(raw: &[u8]) -> Self {
        Self {
            buf: raw.to_vec(),
            read_pos: 0,
            write_pos: raw.len(),
        }
    }

    /// Current backing capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn read_pos(&self) -> usize {
        self.read_pos
    }

    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    /// Bytes written but not yet read.
    pub fn remaining(&self) -> usize {
        self.write_pos - self.read_pos
    }

    /// Returns exactly the written bytes, `[0, write_pos)`.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.write_pos]
    }

    /// Consumes the buffer, returning the written bytes.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.buf.truncate(self.write_pos);
        self.buf
    }

    // -- Writing ------------------------------------------------------------

    /// Doubles the capacity until `additional` more bytes fit.
    fn reserve(&mut self, additional: usize) {
        let required = self.write_pos + additional;
        if required <= self.buf.len() {
            return;
        }
        let mut capacity = self.buf.len().max(MIN_CAPACITY);
        while capacity < required {
            capacity *= 2;
        }
        self.buf.resize(capacity, 0);
    }

    fn put(&mut self, bytes: &[u8]) {
        self.reserve(bytes.len());
        let end = self.write_pos + bytes.len();
        self.buf[self.write_pos..end].copy_from_slice(bytes);
        self.write_pos = end;
    }

    pub fn write_u8(&mut self, value: u8) {
        self.put(&[value]);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.put(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.put(&value.to_le_bytes());
    }

    /// Writes a UTF-8 string prefixed with its byte length as a `u16`.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Overflow`] if the string is longer than
    /// 65535 bytes. Nothing is written in that case.
    pub fn write_string(&mut self, value: &str) -> Result<(), ProtocolError> {
        let len = u16::try_from(value.len()).map_err(|_| {
            ProtocolError::Overflow {
                len: value.len(),
                max: MAX_STRING_LEN,
            }
        })?;
        self.write_u16(len);
        self.put(value.as_bytes());
        Ok(())
    }

    // -- Reading ------------------------------------------------------------

    fn take(&mut self, n: usize) -> Result<&[u8], ProtocolError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(ProtocolError::Truncated {
                needed: n,
                remaining,
            });
        }
        let start = self.read_pos;
        self.read_pos += n;
        Ok(&self.buf[start..self.read_pos])
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], ProtocolError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, ProtocolError> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, ProtocolError> {
        self.take_array().map(u16::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32, ProtocolError> {
        self.take_array().map(u32::from_le_bytes)
    }

    /// Reads a `u16`-length-prefixed UTF-8 string.
    ///
    /// On a truncated body the length prefix has already been consumed;
    /// callers discard the packet anyway.
    pub fn read_string(&mut self) -> Result<String, ProtocolError> {
        let len = self.read_u16()? as usize;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| ProtocolError::InvalidUtf8)
    }
}
