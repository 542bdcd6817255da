//! Decoding error types.

use thiserror::Error;

/// Error type for instruction decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A read ran past the end of the buffer.
    #[error("out of data at {address:#010x}: need {needed} bytes, have {available}")]
    OutOfData {
        /// Address of the instruction being decoded.
        address: u32,
        /// Bytes the instruction needed so far, counted from its first byte.
        needed: usize,
        /// Bytes left in the buffer from the instruction's first byte.
        available: usize,
    },

    /// No decode routine is registered for the opcode.
    #[error("unknown opcode at {address:#010x}: {bytes:02x?}")]
    UnknownOpcode {
        address: u32,
        /// Prefix, opcode and ModR/M bytes consumed before the lookup failed.
        bytes: Vec<u8>,
    },
}

impl DecodeError {
    /// Creates a new OutOfData error.
    pub fn out_of_data(address: u32, needed: usize, available: usize) -> Self {
        Self::OutOfData {
            address,
            needed,
            available,
        }
    }

    /// Creates a new UnknownOpcode error.
    pub fn unknown_opcode(address: u32, bytes: &[u8]) -> Self {
        Self::UnknownOpcode {
            address,
            bytes: bytes.to_vec(),
        }
    }

    /// Returns the address of the instruction that failed to decode.
    pub fn address(&self) -> u32 {
        match self {
            Self::OutOfData { address, .. } | Self::UnknownOpcode { address, .. } => *address,
        }
    }

    pub fn is_out_of_data(&self) -> bool {
        matches!(self, Self::OutOfData { .. })
    }

    pub fn is_unknown_opcode(&self) -> bool {
        matches!(self, Self::UnknownOpcode { .. })
    }
}
