//! Bounded read position over a code buffer.

use crate::error::DecodeError;

/// Read cursor over an immutable byte buffer.
///
/// The cursor remembers where the current instruction began so that
/// out-of-data errors can report the instruction address and how many
/// bytes it needed.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    bytes: &'a [u8],
    base: u32,
    pos: usize,
    start: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor over `bytes`, whose first byte lives at `base`.
    pub fn new(bytes: &'a [u8], base: u32) -> Self {
        Self {
            bytes,
            base,
            pos: 0,
            start: 0,
        }
    }

    /// Current offset into the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Virtual address of the next unread byte.
    pub fn address(&self) -> u32 {
        self.base.wrapping_add(self.pos as u32)
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Returns true if `n` more bytes can be read.
    pub fn can_read(&self, n: usize) -> bool {
        self.remaining() >= n
    }

    /// Marks the current position as the start of a new instruction.
    pub fn begin_instruction(&mut self) {
        self.start = self.pos;
    }

    /// Address of the instruction being decoded.
    pub fn instruction_address(&self) -> u32 {
        self.base.wrapping_add(self.start as u32)
    }

    /// Bytes consumed since [`begin_instruction`](Self::begin_instruction).
    pub fn consumed(&self) -> &'a [u8] {
        &self.bytes[self.start..self.pos]
    }

    /// Moves back to the start of the current instruction.
    pub fn rewind(&mut self) {
        self.pos = self.start;
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if !self.can_read(n) {
            return Err(DecodeError::out_of_data(
                self.instruction_address(),
                self.pos - self.start + n,
                self.bytes.len() - self.start,
            ));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, DecodeError> {
        Ok(self.read_u8()? as i8)
    }

    /// Reads a little-endian 16-bit value.
    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    /// Reads a little-endian 32-bit value.
    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(self.read_u32()? as i32)
    }
}
