//! Disassembler traits.

use crate::config::DecoderConfig;
use crate::x86::{disassemble, Decoder, Disassembly};
use crate::DecodeError;
use ia32_core::Instruction;

/// Result of decoding an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedInstruction {
    /// The decoded instruction.
    pub instruction: Instruction,
    /// Number of bytes consumed.
    pub size: usize,
}

/// Instruction decoder seam for callers that work one instruction at a time.
pub trait Disassembler {
    /// Decode a single instruction starting at the given address.
    ///
    /// # Arguments
    /// * `bytes` - The raw bytes to decode
    /// * `address` - The virtual address of the first byte
    ///
    /// # Returns
    /// The decoded instruction and the number of bytes consumed.
    fn decode_instruction(&self, bytes: &[u8], address: u32) -> Result<DecodedInstruction, DecodeError>;

    /// Returns the minimum instruction size.
    fn min_instruction_size(&self) -> usize;

    /// Returns the maximum instruction size.
    fn max_instruction_size(&self) -> usize;

    /// Disassemble a block of code, stopping at the first error.
    fn disassemble_block(&self, bytes: &[u8], start_address: u32) -> Disassembly {
        let mut block = Disassembly::default();
        let mut offset = 0;

        while offset < bytes.len() {
            let address = start_address.wrapping_add(offset as u32);
            match self.decode_instruction(&bytes[offset..], address) {
                Ok(decoded) => {
                    offset += decoded.size;
                    block.instructions.push(decoded.instruction);
                }
                Err(e) => {
                    block.error = Some(e);
                    break;
                }
            }
        }

        block
    }
}

/// 32-bit x86 decoder.
#[derive(Debug, Clone, Default)]
pub struct X86Disassembler {
    pub config: DecoderConfig,
}

impl X86Disassembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }
}

impl Disassembler for X86Disassembler {
    fn decode_instruction(&self, bytes: &[u8], address: u32) -> Result<DecodedInstruction, DecodeError> {
        let instruction = Decoder::new(bytes, address).decode_next()?;
        Ok(DecodedInstruction {
            size: instruction.length,
            instruction,
        })
    }

    fn min_instruction_size(&self) -> usize {
        1
    }

    // Architectural limit; repeated prefixes can exceed it here.
    fn max_instruction_size(&self) -> usize {
        15
    }

    /// Applies the configured unknown-opcode policy and instruction limit.
    fn disassemble_block(&self, bytes: &[u8], start_address: u32) -> Disassembly {
        disassemble(bytes, start_address, &self.config)
    }
}
