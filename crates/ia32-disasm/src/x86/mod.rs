//! IA-32 (32-bit protected mode) instruction decoder.
//!
//! Decoding is table driven:
//! - Legacy prefixes (segment overrides, operand size, REP/REPNE)
//! - One- and two-byte (0x0F) opcode maps, with ModR/M `reg` group tables
//! - ModR/M and SIB addressing
//! - x87 escape tables (0xD8-0xDF)

mod cursor;
mod decoder;
mod forms;
mod modrm;
pub mod opcodes;
mod prefix;
pub mod x87;

pub use decoder::{disassemble, Decoder, Disassembly};
