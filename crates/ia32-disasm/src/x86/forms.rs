//! Operand decode routines, one per [`OperandEncoding`].

use super::cursor::Cursor;
use super::modrm::{decode_modrm_reg, decode_modrm_rm, ModRM};
use super::opcodes::{OpcodeEntry, OperandEncoding};
use super::prefix::Prefixes;
use super::x87::{self, X87Operands};
use crate::error::DecodeError;
use ia32_core::{register::x86, Addressing, InstructionKind, Operand, Register, Segment};

/// Per-instruction decode state shared by the routines.
pub struct Context<'c, 'a> {
    pub cursor: &'c mut Cursor<'a>,
    pub prefixes: Prefixes,
    pub opcode: u8,
    modrm: Option<ModRM>,
}

impl<'c, 'a> Context<'c, 'a> {
    pub fn new(cursor: &'c mut Cursor<'a>, prefixes: Prefixes, opcode: u8) -> Self {
        Self {
            cursor,
            prefixes,
            opcode,
            modrm: None,
        }
    }

    /// Returns the ModR/M byte, reading it on first use.
    pub fn modrm(&mut self) -> Result<ModRM, DecodeError> {
        match self.modrm {
            Some(modrm) => Ok(modrm),
            None => {
                let modrm = ModRM::parse(self.cursor.read_u8()?);
                self.modrm = Some(modrm);
                Ok(modrm)
            }
        }
    }

    /// Resolved operand width for a table size.
    pub fn width(&self, size: u16) -> u16 {
        self.prefixes.operand_size(size)
    }

    fn rm(&mut self, size: u16) -> Result<Operand, DecodeError> {
        let modrm = self.modrm()?;
        decode_modrm_rm(self.cursor, modrm, self.prefixes.segment, size)
    }

    fn reg(&mut self, size: u16) -> Result<Operand, DecodeError> {
        Ok(decode_modrm_reg(self.modrm()?, size))
    }

    fn sreg(&mut self) -> Result<Operand, DecodeError> {
        let modrm = self.modrm()?;
        match Segment::from_id(modrm.reg as u16) {
            Some(segment) => Ok(Operand::reg(segment.into())),
            None => Err(self.unknown()),
        }
    }

    /// Reads an immediate of `size` bits, zero-extended.
    fn imm(&mut self, size: u16) -> Result<Operand, DecodeError> {
        let value = match size {
            8 => self.cursor.read_u8()? as u32,
            16 => self.cursor.read_u16()? as u32,
            _ => self.cursor.read_u32()?,
        };
        Ok(Operand::imm(value, size))
    }

    fn imm8(&mut self) -> Result<Operand, DecodeError> {
        self.imm(8)
    }

    fn imm8s(&mut self) -> Result<Operand, DecodeError> {
        Ok(Operand::imm8_sx(self.cursor.read_u8()?))
    }

    /// Reads a relative displacement and resolves it against the end of
    /// the instruction. The displacement is always the last field.
    fn rel(&mut self, size: u16) -> Result<Operand, DecodeError> {
        let disp = match size {
            8 => self.cursor.read_i8()? as i32,
            _ => self.cursor.read_i32()?,
        };
        Ok(Operand::rel(self.cursor.address().wrapping_add(disp as u32)))
    }

    fn moffs(&mut self, size: u16) -> Result<Operand, DecodeError> {
        let addr = self.cursor.read_u32()?;
        Ok(Operand::mem(Addressing::Direct(addr), size, self.prefixes.segment))
    }

    /// Source string operand: [esi], segment overridable.
    fn source(&self, size: u16) -> Operand {
        Operand::mem(
            Addressing::Base(Register::gpr(x86::ESI, 32)),
            size,
            self.prefixes.segment,
        )
    }

    /// Destination string operand: es:[edi], never overridden.
    fn destination(&self, size: u16) -> Operand {
        Operand::mem(Addressing::Base(Register::gpr(x86::EDI, 32)), size, None)
    }

    /// Error for the bytes consumed so far.
    pub fn unknown(&self) -> DecodeError {
        DecodeError::unknown_opcode(self.cursor.instruction_address(), self.cursor.consumed())
    }
}

fn acc(size: u16) -> Operand {
    Operand::reg(Register::gpr(x86::EAX, size))
}

fn cl() -> Operand {
    Operand::reg(Register::gpr(x86::ECX, 8))
}

fn opcode_reg(opcode: u8, size: u16) -> Operand {
    Operand::reg(Register::gpr((opcode & 7).into(), size))
}

/// Decodes the operands of `entry`, reading the remaining instruction bytes.
///
/// ModR/M, SIB and displacement come first, immediates last.
pub fn decode_operands(
    ctx: &mut Context<'_, '_>,
    entry: &OpcodeEntry,
) -> Result<Vec<Operand>, DecodeError> {
    use OperandEncoding::*;

    let size = ctx.width(entry.default_size);
    let opcode = ctx.opcode;

    let operands = match entry.encoding {
        None => vec![],
        OpReg => vec![opcode_reg(opcode, size)],
        OpReg_Imm => vec![opcode_reg(opcode, size), ctx.imm(size)?],
        Acc_OpReg => vec![acc(size), opcode_reg(opcode, size)],
        OpSeg => {
            let segment = Segment::from_id(((opcode >> 3) & 7) as u16).ok_or_else(|| ctx.unknown())?;
            vec![Operand::reg(segment.into())]
        }

        ModRmRm_Reg => {
            let rm = ctx.rm(size)?;
            vec![rm, ctx.reg(size)?]
        }
        ModRmReg_Rm => {
            let reg = ctx.reg(size)?;
            vec![reg, ctx.rm(size)?]
        }
        ModRmReg_Rm_Imm => {
            let reg = ctx.reg(size)?;
            let rm = ctx.rm(size)?;
            vec![reg, rm, ctx.imm(size)?]
        }
        ModRmReg_Rm_Imm8s => {
            let reg = ctx.reg(size)?;
            let rm = ctx.rm(size)?;
            vec![reg, rm, ctx.imm8s()?]
        }
        ModRmReg_Rm8 => {
            let reg = ctx.reg(size)?;
            vec![reg, ctx.rm(8)?]
        }
        ModRmReg_Rm16 => {
            let reg = ctx.reg(size)?;
            vec![reg, ctx.rm(16)?]
        }
        ModRmRm_Sreg => {
            let sreg = ctx.sreg()?;
            vec![ctx.rm(16)?, sreg]
        }
        ModRmSreg_Rm => {
            let sreg = ctx.sreg()?;
            vec![sreg, ctx.rm(16)?]
        }
        ModRmRm_Reg_Imm8 => {
            let rm = ctx.rm(size)?;
            let reg = ctx.reg(size)?;
            vec![rm, reg, ctx.imm8()?]
        }
        ModRmRm_Reg_Cl => {
            let rm = ctx.rm(size)?;
            vec![rm, ctx.reg(size)?, cl()]
        }
        ModRmRmOnly => vec![ctx.rm(size)?],
        ModRmFarPtr => {
            if ctx.modrm()?.is_register() {
                return Err(ctx.unknown());
            }
            // 16-bit selector after the offset
            vec![ctx.rm(size + 16)?]
        }

        Rm_Imm => {
            let rm = ctx.rm(size)?;
            vec![rm, ctx.imm(size)?]
        }
        Rm_Imm8s => {
            let rm = ctx.rm(size)?;
            vec![rm, ctx.imm8s()?]
        }
        Rm_Imm8 => {
            let rm = ctx.rm(size)?;
            vec![rm, ctx.imm8()?]
        }
        Rm_One => vec![ctx.rm(size)?, Operand::imm(1, 8)],
        Rm_Cl => vec![ctx.rm(size)?, cl()],

        Acc_Imm => vec![acc(size), ctx.imm(size)?],
        Acc_Moffs => vec![acc(size), ctx.moffs(size)?],
        Moffs_Acc => vec![ctx.moffs(size)?, acc(size)],

        Rel8 => vec![ctx.rel(8)?],
        Rel32 => vec![ctx.rel(32)?],
        Imm8 => vec![ctx.imm8()?],
        Imm8s => vec![ctx.imm8s()?],
        Imm16 => vec![ctx.imm(16)?],
        ImmFull => vec![ctx.imm(size)?],
        Imm16_Imm8 => {
            let frame = ctx.imm(16)?;
            vec![frame, ctx.imm8()?]
        }

        StrMovs => vec![ctx.destination(size), ctx.source(size)],
        StrCmps => vec![ctx.source(size), ctx.destination(size)],
        StrStos => vec![ctx.destination(size), acc(size)],
        StrLods => vec![acc(size), ctx.source(size)],
        StrScas => vec![acc(size), ctx.destination(size)],
    };

    Ok(operands)
}

/// Decodes an x87 escape instruction (0xD8-0xDF).
pub fn decode_x87(
    ctx: &mut Context<'_, '_>,
) -> Result<(InstructionKind, Vec<Operand>), DecodeError> {
    let modrm = ctx.modrm()?;
    let entry = x87::lookup(ctx.opcode, modrm.byte()).ok_or_else(|| ctx.unknown())?;

    let operands = match entry.operands {
        X87Operands::None => vec![],
        X87Operands::Mem => vec![ctx.rm(entry.mem_size)?],
        X87Operands::St => vec![Operand::st(modrm.rm)],
        X87Operands::St0Sti => vec![Operand::st(0), Operand::st(modrm.rm)],
        X87Operands::StiSt0 => vec![Operand::st(modrm.rm), Operand::st(0)],
        X87Operands::Ax => vec![acc(16)],
    };

    Ok((entry.kind, operands))
}
