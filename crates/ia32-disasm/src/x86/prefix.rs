//! Legacy prefix parsing.

use super::cursor::Cursor;
use crate::error::DecodeError;
use ia32_core::{RepeatPrefix, Segment};

/// Prefix state for one instruction. Rebuilt from scratch every decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Prefixes {
    /// Segment override (0x26, 0x2E, 0x36, 0x3E, 0x64, 0x65)
    pub segment: Option<Segment>,
    /// Operand size override (0x66)
    pub operand_size: bool,
    /// REP (0xF3) or REPNE (0xF2)
    pub repeat: Option<RepeatPrefix>,
}

impl Prefixes {
    /// Consumes prefix bytes and returns them together with the first
    /// non-prefix byte, which is the opcode.
    ///
    /// Prefixes may repeat and appear in any order; the last segment or
    /// repeat prefix seen wins.
    pub fn parse(cursor: &mut Cursor<'_>) -> Result<(Self, u8), DecodeError> {
        let mut prefixes = Self::default();

        loop {
            let byte = cursor.read_u8()?;
            if !prefixes.apply(byte) {
                return Ok((prefixes, byte));
            }
        }
    }

    /// Records `byte` if it is a prefix. Returns false for any other byte.
    pub fn apply(&mut self, byte: u8) -> bool {
        match byte {
            0xF2 => self.repeat = Some(RepeatPrefix::Repne),
            0xF3 => self.repeat = Some(RepeatPrefix::Rep),
            0x66 => self.operand_size = true,
            _ => match Segment::from_prefix(byte) {
                Some(segment) => self.segment = Some(segment),
                None => return false,
            },
        }
        true
    }

    /// Resolves an entry's operand size. Zero means "full size": 32 bits,
    /// or 16 under an operand-size override.
    pub fn operand_size(&self, size: u16) -> u16 {
        match size {
            0 if self.operand_size => 16,
            0 => 32,
            size => size,
        }
    }
}
