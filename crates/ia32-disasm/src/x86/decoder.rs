//! IA-32 instruction decoder and disassembly loop.

use super::cursor::Cursor;
use super::forms::{decode_operands, decode_x87, Context};
use super::opcodes::{self, Dispatch};
use super::prefix::Prefixes;
use crate::config::DecoderConfig;
use crate::error::DecodeError;
use ia32_core::{Instruction, InstructionKind, Operand};
use log::{debug, trace};

/// Sequential decoder over one code buffer.
///
/// Each call to [`decode_next`](Self::decode_next) starts with fresh prefix
/// state. As an iterator it applies the configured unknown-opcode policy and
/// stops for good after the first error it yields.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    cursor: Cursor<'a>,
    config: DecoderConfig,
    decoded: usize,
    fused: bool,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder with the default configuration.
    pub fn new(bytes: &'a [u8], base: u32) -> Self {
        Self::with_config(bytes, base, DecoderConfig::default())
    }

    pub fn with_config(bytes: &'a [u8], base: u32, config: DecoderConfig) -> Self {
        Self {
            cursor: Cursor::new(bytes, base),
            config,
            decoded: 0,
            fused: false,
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Offset of the next instruction in the buffer.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Address of the next instruction.
    pub fn address(&self) -> u32 {
        self.cursor.address()
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor.is_at_end()
    }

    /// Decodes one instruction and advances past it.
    ///
    /// On error the position is left at the start of the failed instruction.
    pub fn decode_next(&mut self) -> Result<Instruction, DecodeError> {
        self.cursor.begin_instruction();
        let result = self.decode_instruction();
        if result.is_err() {
            self.cursor.rewind();
        }
        result
    }

    fn decode_instruction(&mut self) -> Result<Instruction, DecodeError> {
        let (prefixes, mut opcode) = Prefixes::parse(&mut self.cursor)?;

        let mut dispatch = opcodes::lookup(opcode, false);
        if let Dispatch::Escape = dispatch {
            opcode = self.cursor.read_u8()?;
            dispatch = opcodes::lookup(opcode, true);
        }

        let mut ctx = Context::new(&mut self.cursor, prefixes, opcode);
        let (kind, operands) = match dispatch {
            Dispatch::Invalid | Dispatch::Escape => return Err(ctx.unknown()),
            Dispatch::Direct(entry) => (entry.kind, decode_operands(&mut ctx, &entry)?),
            Dispatch::Group(table) => {
                let reg = ctx.modrm()?.reg;
                let entry = table[reg as usize].ok_or_else(|| ctx.unknown())?;
                (entry.kind, decode_operands(&mut ctx, &entry)?)
            }
            Dispatch::X87 => decode_x87(&mut ctx)?,
        };

        let kind = if prefixes.operand_size {
            kind.with_operand_size_16()
        } else {
            kind
        };

        // REP/REPNE only mean something on string instructions
        let repeat = if kind.is_string() {
            prefixes.repeat
        } else {
            None
        };

        let instruction = Instruction::new(
            self.cursor.instruction_address(),
            self.cursor.consumed().len(),
            kind,
        )
        .with_operands(operands)
        .with_repeat(repeat);

        trace!(
            "{:#010x}: {:?} {:?} ({} bytes)",
            instruction.address,
            instruction.kind,
            instruction.operands,
            instruction.length
        );

        Ok(instruction)
    }

    /// Consumes one byte as an `Unknown` placeholder.
    fn resync(&mut self) -> Result<Instruction, DecodeError> {
        self.cursor.begin_instruction();
        let address = self.cursor.address();
        let byte = self.cursor.read_u8()?;
        debug!("resync at {:#010x}: skipping byte {:02x}", address, byte);
        Ok(Instruction::new(address, 1, InstructionKind::Unknown)
            .with_operands(vec![Operand::imm(byte as u32, 8)]))
    }
}

impl Iterator for Decoder<'_> {
    type Item = Result<Instruction, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.fused || self.cursor.is_at_end() {
            return None;
        }
        if let Some(max) = self.config.max_instructions {
            if self.decoded >= max {
                debug!("instruction limit {} reached at {:#010x}", max, self.address());
                self.fused = true;
                return None;
            }
        }

        let result = match self.decode_next() {
            Err(err) if err.is_unknown_opcode() && self.config.resyncs() => self.resync(),
            result => result,
        };

        match result {
            Ok(instruction) => {
                self.decoded += 1;
                Some(Ok(instruction))
            }
            Err(err) => {
                debug!("disassembly stopped: {}", err);
                self.fused = true;
                Some(Err(err))
            }
        }
    }
}

impl std::iter::FusedIterator for Decoder<'_> {}

/// Output of a disassembly run over one region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Disassembly {
    /// Instructions in address order.
    pub instructions: Vec<Instruction>,
    /// The error that ended the run early, if any.
    pub error: Option<DecodeError>,
}

impl Disassembly {
    /// Returns true if the run ended without an error.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Number of bytes covered by the decoded instructions.
    pub fn decoded_len(&self) -> usize {
        self.instructions.iter().map(|inst| inst.length).sum()
    }
}

impl FromIterator<Result<Instruction, DecodeError>> for Disassembly {
    fn from_iter<I: IntoIterator<Item = Result<Instruction, DecodeError>>>(iter: I) -> Self {
        let mut disassembly = Self::default();
        for item in iter {
            match item {
                Ok(instruction) => disassembly.instructions.push(instruction),
                Err(err) => {
                    disassembly.error = Some(err);
                    break;
                }
            }
        }
        disassembly
    }
}

/// Disassembles `bytes` from `base` until the end of the buffer, the
/// instruction limit, or the first error the policy does not absorb.
pub fn disassemble(bytes: &[u8], base: u32, config: &DecoderConfig) -> Disassembly {
    Decoder::with_config(bytes, base, config.clone()).collect()
}
