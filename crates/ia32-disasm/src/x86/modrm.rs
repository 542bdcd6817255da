//! ModR/M and SIB byte decoding.

use super::cursor::Cursor;
use crate::error::DecodeError;
use ia32_core::{Addressing, Operand, Register, Segment};

/// Decoded ModR/M byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModRM {
    /// Mod field (2 bits)
    pub mod_: u8,
    /// Reg field (3 bits): register or opcode extension
    pub reg: u8,
    /// R/M field (3 bits)
    pub rm: u8,
}

impl ModRM {
    pub fn parse(byte: u8) -> Self {
        Self {
            mod_: (byte >> 6) & 0x3,
            reg: (byte >> 3) & 0x7,
            rm: byte & 0x7,
        }
    }

    /// Reassembles the raw byte.
    pub fn byte(&self) -> u8 {
        (self.mod_ << 6) | (self.reg << 3) | self.rm
    }

    /// Returns true if this ModR/M encodes a register operand (mod=11).
    pub fn is_register(&self) -> bool {
        self.mod_ == 0b11
    }

    /// Returns true if this ModR/M requires a SIB byte.
    pub fn needs_sib(&self) -> bool {
        self.mod_ != 0b11 && self.rm == 0b100
    }

    /// Returns true for the `[disp32]` form (mod=00, rm=101).
    pub fn is_direct(&self) -> bool {
        self.mod_ == 0b00 && self.rm == 0b101
    }
}

/// Decoded SIB byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sib {
    /// Scale (2 bits) - actual scale is 1 << scale
    pub scale: u8,
    /// Index register (3 bits); 100 means no index
    pub index: u8,
    /// Base register (3 bits)
    pub base: u8,
}

impl Sib {
    pub fn parse(byte: u8) -> Self {
        Self {
            scale: (byte >> 6) & 0x3,
            index: (byte >> 3) & 0x7,
            base: byte & 0x7,
        }
    }

    /// Returns the actual scale factor (1, 2, 4, or 8).
    pub fn scale_factor(&self) -> u8 {
        1 << self.scale
    }

    pub fn has_index(&self) -> bool {
        self.index != 0b100
    }
}

/// Decode the reg field of ModR/M as a register operand.
pub fn decode_modrm_reg(modrm: ModRM, size: u16) -> Operand {
    Operand::Register(Register::gpr(modrm.reg.into(), size))
}

/// Decode the r/m field of ModR/M, reading any SIB and displacement bytes.
///
/// `size` is the width of the operand: it selects the register for mod=11
/// and becomes the access size of a memory operand.
pub fn decode_modrm_rm(
    cursor: &mut Cursor<'_>,
    modrm: ModRM,
    segment: Option<Segment>,
    size: u16,
) -> Result<Operand, DecodeError> {
    if modrm.is_register() {
        return Ok(Operand::Register(Register::gpr(modrm.rm.into(), size)));
    }

    let addressing = if modrm.needs_sib() {
        let sib = Sib::parse(cursor.read_u8()?);

        // SIB base=101 with mod=00 has no base register, only a disp32
        let has_base = !(sib.base == 0b101 && modrm.mod_ == 0b00);
        let disp = if has_base {
            read_displacement(cursor, modrm)?
        } else {
            cursor.read_i32()?
        };
        let base = has_base.then(|| Register::gpr(sib.base.into(), 32));

        match (base, sib.has_index()) {
            (base, true) => Addressing::Indexed {
                base,
                index: Register::gpr(sib.index.into(), 32),
                scale: sib.scale_factor(),
                disp,
            },
            (Some(base), false) => base_addressing(base, modrm, disp),
            (None, false) => Addressing::Direct(disp as u32),
        }
    } else if modrm.is_direct() {
        Addressing::Direct(cursor.read_u32()?)
    } else {
        let disp = read_displacement(cursor, modrm)?;
        base_addressing(Register::gpr(modrm.rm.into(), 32), modrm, disp)
    };

    Ok(Operand::mem(addressing, size, segment))
}

/// Reads the displacement selected by mod: none, disp8 (sign-extended) or disp32.
fn read_displacement(cursor: &mut Cursor<'_>, modrm: ModRM) -> Result<i32, DecodeError> {
    match modrm.mod_ {
        0b01 => Ok(cursor.read_i8()? as i32),
        0b10 => cursor.read_i32(),
        _ => Ok(0),
    }
}

fn base_addressing(base: Register, modrm: ModRM, disp: i32) -> Addressing {
    if modrm.mod_ == 0b00 {
        Addressing::Base(base)
    } else {
        Addressing::BaseDisp { base, disp }
    }
}
