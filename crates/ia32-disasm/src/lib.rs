//! # ia32-disasm
//!
//! Table-driven instruction decoder for 32-bit x86.
//!
//! ```
//! use ia32_disasm::{disassemble, DecoderConfig};
//! use ia32_core::InstructionKind;
//!
//! let out = disassemble(&[0x55, 0x89, 0xE5, 0xC3], 0x401000, &DecoderConfig::default());
//! assert!(out.is_complete());
//! assert_eq!(out.instructions[2].kind, InstructionKind::Ret);
//! assert_eq!(out.instructions[2].address, 0x401003);
//! ```

pub mod config;
pub mod error;
pub mod traits;
pub mod x86;

#[cfg(feature = "parallel")]
pub mod parallel;

pub use config::{DecoderConfig, UnknownOpcodePolicy};
pub use error::DecodeError;
pub use traits::{DecodedInstruction, Disassembler, X86Disassembler};
pub use x86::{disassemble, Decoder, Disassembly};

#[cfg(feature = "parallel")]
pub use parallel::{disassemble_regions_parallel, CodeRegion};
