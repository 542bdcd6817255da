//! x87 FPU instruction tables.
//!
//! x87 instructions use escape opcodes 0xD8-0xDF.
//! The encoding depends on both the escape byte and the ModR/M byte:
//! - When ModR/M < 0xC0: memory operand, reg field (bits 5:3) selects the instruction
//! - When ModR/M >= 0xC0: register operand ST(i), selected by the full ModR/M byte

use ia32_core::{Condition, InstructionKind};

/// Operand shape of an x87 form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum X87Operands {
    None,
    /// Memory operand of `mem_size` bits
    Mem,
    /// ST(i)
    St,
    /// ST(0), ST(i)
    St0Sti,
    /// ST(i), ST(0)
    StiSt0,
    /// AX (FNSTSW AX)
    Ax,
}

/// x87 table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct X87Entry {
    pub kind: InstructionKind,
    pub operands: X87Operands,
    /// Memory operand size in bits (memory forms only)
    pub mem_size: u16,
}

impl X87Entry {
    const fn new(kind: InstructionKind) -> Self {
        Self {
            kind,
            operands: X87Operands::None,
            mem_size: 0,
        }
    }

    const fn mem(kind: InstructionKind, size: u16) -> Self {
        Self {
            kind,
            operands: X87Operands::Mem,
            mem_size: size,
        }
    }

    const fn reg(kind: InstructionKind, operands: X87Operands) -> Self {
        Self {
            kind,
            operands,
            mem_size: 0,
        }
    }
}

use InstructionKind as K;
use X87Operands as O;

const fn m(kind: InstructionKind, size: u16) -> Option<X87Entry> {
    Some(X87Entry::mem(kind, size))
}

/// Memory forms, indexed by `[escape - 0xD8][reg]`.
pub static X87_MEM: [[Option<X87Entry>; 8]; 8] = [
    // D8: m32fp arithmetic
    [
        m(K::Fadd, 32),
        m(K::Fmul, 32),
        m(K::Fcom, 32),
        m(K::Fcomp, 32),
        m(K::Fsub, 32),
        m(K::Fsubr, 32),
        m(K::Fdiv, 32),
        m(K::Fdivr, 32),
    ],
    // D9: m32fp load/store, environment (28 bytes), control word
    [
        m(K::Fld, 32),
        None,
        m(K::Fst, 32),
        m(K::Fstp, 32),
        m(K::Fldenv, 224),
        m(K::Fldcw, 16),
        m(K::Fnstenv, 224),
        m(K::Fnstcw, 16),
    ],
    // DA: m32int arithmetic
    [
        m(K::Fiadd, 32),
        m(K::Fimul, 32),
        m(K::Ficom, 32),
        m(K::Ficomp, 32),
        m(K::Fisub, 32),
        m(K::Fisubr, 32),
        m(K::Fidiv, 32),
        m(K::Fidivr, 32),
    ],
    // DB: m32int load/store, m80fp
    [
        m(K::Fild, 32),
        m(K::Fisttp, 32),
        m(K::Fist, 32),
        m(K::Fistp, 32),
        None,
        m(K::Fld, 80),
        None,
        m(K::Fstp, 80),
    ],
    // DC: m64fp arithmetic
    [
        m(K::Fadd, 64),
        m(K::Fmul, 64),
        m(K::Fcom, 64),
        m(K::Fcomp, 64),
        m(K::Fsub, 64),
        m(K::Fsubr, 64),
        m(K::Fdiv, 64),
        m(K::Fdivr, 64),
    ],
    // DD: m64fp load/store, state image (108 bytes), status word
    [
        m(K::Fld, 64),
        m(K::Fisttp, 64),
        m(K::Fst, 64),
        m(K::Fstp, 64),
        m(K::Frstor, 864),
        None,
        m(K::Fnsave, 864),
        m(K::Fnstsw, 16),
    ],
    // DE: m16int arithmetic
    [
        m(K::Fiadd, 16),
        m(K::Fimul, 16),
        m(K::Ficom, 16),
        m(K::Ficomp, 16),
        m(K::Fisub, 16),
        m(K::Fisubr, 16),
        m(K::Fidiv, 16),
        m(K::Fidivr, 16),
    ],
    // DF: m16int load/store, m80bcd, m64int
    [
        m(K::Fild, 16),
        m(K::Fisttp, 16),
        m(K::Fist, 16),
        m(K::Fistp, 16),
        m(K::Fbld, 80),
        m(K::Fild, 64),
        m(K::Fbstp, 80),
        m(K::Fistp, 64),
    ],
];

/// Looks up a memory form (ModR/M < 0xC0).
pub fn lookup_mem(escape: u8, reg: u8) -> Option<X87Entry> {
    let row = X87_MEM.get(escape.wrapping_sub(0xD8) as usize)?;
    row[(reg & 7) as usize]
}

/// Looks up a register form (ModR/M >= 0xC0).
pub fn lookup_reg(escape: u8, modrm: u8) -> Option<X87Entry> {
    match escape {
        0xD8 => lookup_d8_reg(modrm),
        0xD9 => lookup_d9_reg(modrm),
        0xDA => lookup_da_reg(modrm),
        0xDB => lookup_db_reg(modrm),
        0xDC => lookup_dc_reg(modrm),
        0xDD => lookup_dd_reg(modrm),
        0xDE => lookup_de_reg(modrm),
        0xDF => lookup_df_reg(modrm),
        _ => None,
    }
}

fn lookup_d8_reg(modrm: u8) -> Option<X87Entry> {
    let kind = match modrm {
        0xC0..=0xC7 => K::Fadd,
        0xC8..=0xCF => K::Fmul,
        0xD0..=0xD7 => return Some(X87Entry::reg(K::Fcom, O::St)),
        0xD8..=0xDF => return Some(X87Entry::reg(K::Fcomp, O::St)),
        0xE0..=0xE7 => K::Fsub,
        0xE8..=0xEF => K::Fsubr,
        0xF0..=0xF7 => K::Fdiv,
        0xF8..=0xFF => K::Fdivr,
        _ => return None,
    };
    Some(X87Entry::reg(kind, O::St0Sti))
}

fn lookup_d9_reg(modrm: u8) -> Option<X87Entry> {
    let kind = match modrm {
        0xC0..=0xC7 => return Some(X87Entry::reg(K::Fld, O::St)),
        0xC8..=0xCF => return Some(X87Entry::reg(K::Fxch, O::St)),
        0xD8..=0xDF => return Some(X87Entry::reg(K::Fstp, O::St)),
        0xD0 => K::Fnop,
        0xE0 => K::Fchs,
        0xE1 => K::Fabs,
        0xE4 => K::Ftst,
        0xE5 => K::Fxam,
        0xE8 => K::Fld1,
        0xE9 => K::Fldl2t,
        0xEA => K::Fldl2e,
        0xEB => K::Fldpi,
        0xEC => K::Fldlg2,
        0xED => K::Fldln2,
        0xEE => K::Fldz,
        0xF0 => K::F2xm1,
        0xF1 => K::Fyl2x,
        0xF2 => K::Fptan,
        0xF3 => K::Fpatan,
        0xF4 => K::Fxtract,
        0xF5 => K::Fprem1,
        0xF6 => K::Fdecstp,
        0xF7 => K::Fincstp,
        0xF8 => K::Fprem,
        0xF9 => K::Fyl2xp1,
        0xFA => K::Fsqrt,
        0xFB => K::Fsincos,
        0xFC => K::Frndint,
        0xFD => K::Fscale,
        0xFE => K::Fsin,
        0xFF => K::Fcos,
        _ => return None,
    };
    Some(X87Entry::new(kind))
}

fn lookup_da_reg(modrm: u8) -> Option<X87Entry> {
    let condition = match modrm {
        0xC0..=0xC7 => Condition::Below,
        0xC8..=0xCF => Condition::Equal,
        0xD0..=0xD7 => Condition::BelowOrEqual,
        0xD8..=0xDF => Condition::Parity,
        0xE9 => return Some(X87Entry::new(K::Fucompp)),
        _ => return None,
    };
    Some(X87Entry::reg(K::Fcmovcc(condition), O::St0Sti))
}

fn lookup_db_reg(modrm: u8) -> Option<X87Entry> {
    let kind = match modrm {
        0xC0..=0xC7 => K::Fcmovcc(Condition::AboveOrEqual),
        0xC8..=0xCF => K::Fcmovcc(Condition::NotEqual),
        0xD0..=0xD7 => K::Fcmovcc(Condition::Above),
        0xD8..=0xDF => K::Fcmovcc(Condition::NotParity),
        0xE2 => return Some(X87Entry::new(K::Fnclex)),
        0xE3 => return Some(X87Entry::new(K::Fninit)),
        0xE8..=0xEF => K::Fucomi,
        0xF0..=0xF7 => K::Fcomi,
        _ => return None,
    };
    Some(X87Entry::reg(kind, O::St0Sti))
}

// DC reverses the operand order of D8 and swaps the SUB/SUBR and DIV/DIVR rows.
fn lookup_dc_reg(modrm: u8) -> Option<X87Entry> {
    let kind = match modrm {
        0xC0..=0xC7 => K::Fadd,
        0xC8..=0xCF => K::Fmul,
        0xD0..=0xD7 => return Some(X87Entry::reg(K::Fcom, O::St)),
        0xD8..=0xDF => return Some(X87Entry::reg(K::Fcomp, O::St)),
        0xE0..=0xE7 => K::Fsubr,
        0xE8..=0xEF => K::Fsub,
        0xF0..=0xF7 => K::Fdivr,
        0xF8..=0xFF => K::Fdiv,
        _ => return None,
    };
    Some(X87Entry::reg(kind, O::StiSt0))
}

fn lookup_dd_reg(modrm: u8) -> Option<X87Entry> {
    let kind = match modrm {
        0xC0..=0xC7 => K::Ffree,
        0xD0..=0xD7 => K::Fst,
        0xD8..=0xDF => K::Fstp,
        0xE0..=0xE7 => K::Fucom,
        0xE8..=0xEF => K::Fucomp,
        _ => return None,
    };
    Some(X87Entry::reg(kind, O::St))
}

fn lookup_de_reg(modrm: u8) -> Option<X87Entry> {
    let kind = match modrm {
        0xC0..=0xC7 => K::Faddp,
        0xC8..=0xCF => K::Fmulp,
        0xD9 => return Some(X87Entry::new(K::Fcompp)),
        0xE0..=0xE7 => K::Fsubrp,
        0xE8..=0xEF => K::Fsubp,
        0xF0..=0xF7 => K::Fdivrp,
        0xF8..=0xFF => K::Fdivp,
        _ => return None,
    };
    Some(X87Entry::reg(kind, O::StiSt0))
}

fn lookup_df_reg(modrm: u8) -> Option<X87Entry> {
    match modrm {
        0xE0 => Some(X87Entry::reg(K::Fnstsw, O::Ax)),
        0xE8..=0xEF => Some(X87Entry::reg(K::Fucomip, O::St0Sti)),
        0xF0..=0xF7 => Some(X87Entry::reg(K::Fcomip, O::St0Sti)),
        _ => None,
    }
}

/// Resolves an escape byte and ModR/M byte to an x87 entry.
pub fn lookup(escape: u8, modrm: u8) -> Option<X87Entry> {
    if modrm < 0xC0 {
        lookup_mem(escape, (modrm >> 3) & 7)
    } else {
        lookup_reg(escape, modrm)
    }
}
