//! # ia32-core
//!
//! Data model for decoded 32-bit x86 code: instructions, operands and
//! register tables. The decoding engine lives in `ia32-disasm`.

pub mod instruction;
pub mod operand;
pub mod register;

pub use instruction::{Condition, ControlFlow, Instruction, InstructionKind, RepeatPrefix};
pub use operand::{Addressing, Immediate, MemoryRef, Operand};
pub use register::{Register, RegisterClass, Segment};
