//! Instruction operand types.

use crate::{Register, Segment};

/// An instruction operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operand {
    /// General purpose or segment register.
    Register(Register),
    /// x87 stack register ST(i).
    FpuRegister(u8),
    /// Immediate value.
    Immediate(Immediate),
    /// Memory reference.
    Memory(MemoryRef),
    /// Branch target, already resolved against the end of the instruction.
    Relative {
        /// Absolute target address.
        target: u32,
    },
}

impl Operand {
    /// Creates a register operand.
    pub fn reg(reg: Register) -> Self {
        Self::Register(reg)
    }

    /// Creates an x87 stack register operand.
    pub fn st(index: u8) -> Self {
        Self::FpuRegister(index & 0x7)
    }

    /// Creates an immediate operand from its final 32-bit pattern.
    pub fn imm(value: u32, size: u16) -> Self {
        Self::Immediate(Immediate { value, size })
    }

    /// Creates an 8-bit immediate sign-extended to 32 bits.
    pub fn imm8_sx(byte: u8) -> Self {
        Self::imm(byte as i8 as i32 as u32, 8)
    }

    /// Creates a memory operand.
    pub fn mem(addressing: Addressing, size: u16, segment: Option<Segment>) -> Self {
        Self::Memory(MemoryRef {
            addressing,
            size,
            segment,
        })
    }

    /// Creates a relative branch operand.
    pub fn rel(target: u32) -> Self {
        Self::Relative { target }
    }

    /// Returns true if this is a register operand.
    pub fn is_register(&self) -> bool {
        matches!(self, Self::Register(_))
    }

    /// Returns true if this is an immediate operand.
    pub fn is_immediate(&self) -> bool {
        matches!(self, Self::Immediate(_))
    }

    /// Returns true if this is a memory operand.
    pub fn is_memory(&self) -> bool {
        matches!(self, Self::Memory(_))
    }

    /// Returns the memory reference, if any.
    pub fn as_memory(&self) -> Option<&MemoryRef> {
        match self {
            Self::Memory(mem) => Some(mem),
            _ => None,
        }
    }

    /// Returns the immediate, if any.
    pub fn as_immediate(&self) -> Option<Immediate> {
        match self {
            Self::Immediate(imm) => Some(*imm),
            _ => None,
        }
    }
}

/// Immediate value operand.
///
/// `value` always holds the final 32-bit pattern, after any sign extension
/// the encoding requires. `size` is the width of the field as encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Immediate {
    pub value: u32,
    /// Encoded size in bits (8, 16 or 32).
    pub size: u16,
}

impl Immediate {
    /// Returns the value reinterpreted as signed.
    pub fn as_i32(&self) -> i32 {
        self.value as i32
    }
}

/// Memory reference operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryRef {
    /// How the effective address is formed.
    pub addressing: Addressing,
    /// Access size in bits.
    pub size: u16,
    /// Segment override, if a prefix supplied one.
    pub segment: Option<Segment>,
}

impl MemoryRef {
    /// Returns the base register, if the addressing form has one.
    pub fn base(&self) -> Option<Register> {
        match self.addressing {
            Addressing::Base(base) | Addressing::BaseDisp { base, .. } => Some(base),
            Addressing::Indexed { base, .. } => base,
            Addressing::Direct(_) => None,
        }
    }

    /// Returns the signed displacement (the absolute address for direct forms).
    pub fn displacement(&self) -> i32 {
        match self.addressing {
            Addressing::Base(_) => 0,
            Addressing::BaseDisp { disp, .. } | Addressing::Indexed { disp, .. } => disp,
            Addressing::Direct(address) => address as i32,
        }
    }
}

/// Effective address forms produced by ModR/M, SIB and moffs encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Addressing {
    /// `[base]`
    Base(Register),
    /// `[base + disp]`; 8-bit displacements are stored sign-extended.
    BaseDisp { base: Register, disp: i32 },
    /// `[base + index*scale + disp]`, base optional.
    Indexed {
        base: Option<Register>,
        index: Register,
        /// 1, 2, 4 or 8.
        scale: u8,
        disp: i32,
    },
    /// `[disp32]`
    Direct(u32),
}
