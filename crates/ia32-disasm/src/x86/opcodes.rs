//! Opcode dispatch tables.
//!
//! Every opcode byte maps to a [`Dispatch`]: a single entry, a group table
//! indexed by the ModR/M `reg` field, the x87 escape handler, or nothing.
//! An entry pairs an instruction class with the [`OperandEncoding`] whose
//! decode routine reads the rest of the instruction.

#![allow(non_camel_case_types)]

use ia32_core::{Condition, InstructionKind};

/// Operand encoding form. Each variant has exactly one decode routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandEncoding {
    /// No operands
    None,
    /// Register in the low 3 bits of the opcode
    OpReg,
    /// Register in opcode, immediate of the operand size
    OpReg_Imm,
    /// Accumulator, register in opcode (XCHG)
    Acc_OpReg,
    /// Segment register in opcode bits 5:3 (PUSH/POP sreg)
    OpSeg,
    /// ModR/M: r/m, reg
    ModRmRm_Reg,
    /// ModR/M: reg, r/m
    ModRmReg_Rm,
    /// ModR/M: reg, r/m, full-size immediate
    ModRmReg_Rm_Imm,
    /// ModR/M: reg, r/m, sign-extended 8-bit immediate
    ModRmReg_Rm_Imm8s,
    /// ModR/M: reg, byte r/m (MOVZX/MOVSX)
    ModRmReg_Rm8,
    /// ModR/M: reg, word r/m (MOVZX/MOVSX)
    ModRmReg_Rm16,
    /// ModR/M: word r/m, segment register
    ModRmRm_Sreg,
    /// ModR/M: segment register, word r/m
    ModRmSreg_Rm,
    /// ModR/M: r/m, reg, 8-bit immediate (SHLD/SHRD)
    ModRmRm_Reg_Imm8,
    /// ModR/M: r/m, reg, CL (SHLD/SHRD)
    ModRmRm_Reg_Cl,
    /// ModR/M: r/m only (reg field is opcode extension)
    ModRmRmOnly,
    /// ModR/M: m16:32 far pointer, memory only
    ModRmFarPtr,
    /// r/m, immediate of the operand size
    Rm_Imm,
    /// r/m, 8-bit immediate sign-extended to 32 bits
    Rm_Imm8s,
    /// r/m, unsigned 8-bit immediate
    Rm_Imm8,
    /// r/m, literal 1
    Rm_One,
    /// r/m, CL
    Rm_Cl,
    /// AL/AX/EAX, immediate
    Acc_Imm,
    /// AL/AX/EAX, [moffs32]
    Acc_Moffs,
    /// [moffs32], AL/AX/EAX
    Moffs_Acc,
    /// Relative offset (calls/jumps)
    Rel8,
    Rel32,
    /// Immediate only
    Imm8,
    Imm8s,
    Imm16,
    ImmFull,
    /// ENTER imm16, imm8
    Imm16_Imm8,
    /// String forms with implicit ESI/EDI operands
    StrMovs,
    StrCmps,
    StrStos,
    StrLods,
    StrScas,
}

impl OperandEncoding {
    /// Every encoding form, in declaration order.
    pub const ALL: [OperandEncoding; 37] = {
        use OperandEncoding::*;
        [
            None,
            OpReg,
            OpReg_Imm,
            Acc_OpReg,
            OpSeg,
            ModRmRm_Reg,
            ModRmReg_Rm,
            ModRmReg_Rm_Imm,
            ModRmReg_Rm_Imm8s,
            ModRmReg_Rm8,
            ModRmReg_Rm16,
            ModRmRm_Sreg,
            ModRmSreg_Rm,
            ModRmRm_Reg_Imm8,
            ModRmRm_Reg_Cl,
            ModRmRmOnly,
            ModRmFarPtr,
            Rm_Imm,
            Rm_Imm8s,
            Rm_Imm8,
            Rm_One,
            Rm_Cl,
            Acc_Imm,
            Acc_Moffs,
            Moffs_Acc,
            Rel8,
            Rel32,
            Imm8,
            Imm8s,
            Imm16,
            ImmFull,
            Imm16_Imm8,
            StrMovs,
            StrCmps,
            StrStos,
            StrLods,
            StrScas,
        ]
    };

    /// Position of this form in [`ALL`](Self::ALL).
    pub const fn ordinal(self) -> usize {
        use OperandEncoding::*;
        match self {
            None => 0,
            OpReg => 1,
            OpReg_Imm => 2,
            Acc_OpReg => 3,
            OpSeg => 4,
            ModRmRm_Reg => 5,
            ModRmReg_Rm => 6,
            ModRmReg_Rm_Imm => 7,
            ModRmReg_Rm_Imm8s => 8,
            ModRmReg_Rm8 => 9,
            ModRmReg_Rm16 => 10,
            ModRmRm_Sreg => 11,
            ModRmSreg_Rm => 12,
            ModRmRm_Reg_Imm8 => 13,
            ModRmRm_Reg_Cl => 14,
            ModRmRmOnly => 15,
            ModRmFarPtr => 16,
            Rm_Imm => 17,
            Rm_Imm8s => 18,
            Rm_Imm8 => 19,
            Rm_One => 20,
            Rm_Cl => 21,
            Acc_Imm => 22,
            Acc_Moffs => 23,
            Moffs_Acc => 24,
            Rel8 => 25,
            Rel32 => 26,
            Imm8 => 27,
            Imm8s => 28,
            Imm16 => 29,
            ImmFull => 30,
            Imm16_Imm8 => 31,
            StrMovs => 32,
            StrCmps => 33,
            StrStos => 34,
            StrLods => 35,
            StrScas => 36,
        }
    }

    /// Returns true if the form reads a ModR/M byte.
    pub fn has_modrm(&self) -> bool {
        use OperandEncoding::*;
        matches!(
            self,
            ModRmRm_Reg
                | ModRmReg_Rm
                | ModRmReg_Rm_Imm
                | ModRmReg_Rm_Imm8s
                | ModRmReg_Rm8
                | ModRmReg_Rm16
                | ModRmRm_Sreg
                | ModRmSreg_Rm
                | ModRmRm_Reg_Imm8
                | ModRmRm_Reg_Cl
                | ModRmRmOnly
                | ModRmFarPtr
                | Rm_Imm
                | Rm_Imm8s
                | Rm_Imm8
                | Rm_One
                | Rm_Cl
        )
    }
}

/// Opcode table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeEntry {
    /// Instruction class
    pub kind: InstructionKind,
    /// Operand encoding
    pub encoding: OperandEncoding,
    /// Operand size in bits (0 = 32, or 16 under an operand-size prefix)
    pub default_size: u16,
}

impl OpcodeEntry {
    pub const fn new(kind: InstructionKind, encoding: OperandEncoding) -> Self {
        Self {
            kind,
            encoding,
            default_size: 0,
        }
    }

    pub const fn with_size(mut self, size: u16) -> Self {
        self.default_size = size;
        self
    }
}

/// Eight entries selected by the ModR/M `reg` field.
pub type GroupTable = [Option<OpcodeEntry>; 8];

/// How an opcode byte is resolved.
#[derive(Debug, Clone, Copy)]
pub enum Dispatch {
    /// No routine handles this byte.
    Invalid,
    /// The opcode alone selects the routine.
    Direct(OpcodeEntry),
    /// The ModR/M `reg` field selects the routine.
    Group(&'static GroupTable),
    /// x87 escape (0xD8-0xDF), resolved by the x87 tables.
    X87,
    /// 0x0F: the next byte indexes the two-byte table.
    Escape,
}

impl Dispatch {
    /// Returns true if some routine handles this byte.
    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid)
    }
}

use InstructionKind as K;
use OperandEncoding as E;

const fn entry(kind: InstructionKind, encoding: OperandEncoding) -> Option<OpcodeEntry> {
    Some(OpcodeEntry::new(kind, encoding))
}

const fn sized(kind: InstructionKind, encoding: OperandEncoding, size: u16) -> Option<OpcodeEntry> {
    Some(OpcodeEntry::new(kind, encoding).with_size(size))
}

const fn direct(kind: InstructionKind, encoding: OperandEncoding) -> Dispatch {
    Dispatch::Direct(OpcodeEntry::new(kind, encoding))
}

const fn direct_sized(kind: InstructionKind, encoding: OperandEncoding, size: u16) -> Dispatch {
    Dispatch::Direct(OpcodeEntry::new(kind, encoding).with_size(size))
}

/// Group 1 operations (0x80-0x83), also the order of the 0x00-0x3D ALU rows.
pub const GROUP1_OPS: [InstructionKind; 8] = [
    K::Add,
    K::Or,
    K::Adc,
    K::Sbb,
    K::And,
    K::Sub,
    K::Xor,
    K::Cmp,
];

/// Group 2 operations (shift/rotate). /6 is the undocumented SAL alias of SHL.
pub const GROUP2_OPS: [InstructionKind; 8] = [
    K::Rol,
    K::Ror,
    K::Rcl,
    K::Rcr,
    K::Shl,
    K::Shr,
    K::Shl,
    K::Sar,
];

const fn uniform_group(
    ops: [InstructionKind; 8],
    encoding: OperandEncoding,
    size: u16,
) -> GroupTable {
    let mut table: GroupTable = [None; 8];
    let mut reg = 0;
    while reg < 8 {
        table[reg] = sized(ops[reg], encoding, size);
        reg += 1;
    }
    table
}

/// 80 /r ib, 82 /r ib
pub static GROUP1_EB_IB: GroupTable = uniform_group(GROUP1_OPS, E::Rm_Imm, 8);
/// 81 /r iz
pub static GROUP1_EV_IZ: GroupTable = uniform_group(GROUP1_OPS, E::Rm_Imm, 0);
/// 83 /r ib (sign-extended)
pub static GROUP1_EV_IB: GroupTable = uniform_group(GROUP1_OPS, E::Rm_Imm8s, 0);

/// C0 /r ib
pub static GROUP2_EB_IB: GroupTable = uniform_group(GROUP2_OPS, E::Rm_Imm8, 8);
/// C1 /r ib
pub static GROUP2_EV_IB: GroupTable = uniform_group(GROUP2_OPS, E::Rm_Imm8, 0);
/// D0 /r
pub static GROUP2_EB_1: GroupTable = uniform_group(GROUP2_OPS, E::Rm_One, 8);
/// D1 /r
pub static GROUP2_EV_1: GroupTable = uniform_group(GROUP2_OPS, E::Rm_One, 0);
/// D2 /r
pub static GROUP2_EB_CL: GroupTable = uniform_group(GROUP2_OPS, E::Rm_Cl, 8);
/// D3 /r
pub static GROUP2_EV_CL: GroupTable = uniform_group(GROUP2_OPS, E::Rm_Cl, 0);

const fn group3(size: u16) -> GroupTable {
    [
        sized(K::Test, E::Rm_Imm, size),
        None,
        sized(K::Not, E::ModRmRmOnly, size),
        sized(K::Neg, E::ModRmRmOnly, size),
        sized(K::Mul, E::ModRmRmOnly, size),
        sized(K::Imul, E::ModRmRmOnly, size),
        sized(K::Div, E::ModRmRmOnly, size),
        sized(K::Idiv, E::ModRmRmOnly, size),
    ]
}

/// F6 /r: TEST Eb,Ib and unary byte ALU
pub static GROUP3_EB: GroupTable = group3(8);
/// F7 /r: TEST Ev,Iz and unary ALU
pub static GROUP3_EV: GroupTable = group3(0);

/// FE /r
pub static GROUP4: GroupTable = [
    sized(K::Inc, E::ModRmRmOnly, 8),
    sized(K::Dec, E::ModRmRmOnly, 8),
    None,
    None,
    None,
    None,
    None,
    None,
];

/// FF /r. Near indirect CALL/JMP always take a 32-bit target.
pub static GROUP5: GroupTable = [
    entry(K::Inc, E::ModRmRmOnly),
    entry(K::Dec, E::ModRmRmOnly),
    sized(K::Call, E::ModRmRmOnly, 32),
    entry(K::CallFar, E::ModRmFarPtr),
    sized(K::Jmp, E::ModRmRmOnly, 32),
    entry(K::JmpFar, E::ModRmFarPtr),
    entry(K::Push, E::ModRmRmOnly),
    None,
];

/// 8F /0
pub static GROUP1A: GroupTable = [
    entry(K::Pop, E::ModRmRmOnly),
    None,
    None,
    None,
    None,
    None,
    None,
    None,
];

/// C6 /0
pub static GROUP11_EB: GroupTable = [
    sized(K::Mov, E::Rm_Imm, 8),
    None,
    None,
    None,
    None,
    None,
    None,
    None,
];

/// C7 /0
pub static GROUP11_EV: GroupTable = [
    entry(K::Mov, E::Rm_Imm),
    None,
    None,
    None,
    None,
    None,
    None,
    None,
];

/// 0F BA /4-/7
pub static GROUP8: GroupTable = [
    None,
    None,
    None,
    None,
    entry(K::Bt, E::Rm_Imm8),
    entry(K::Bts, E::Rm_Imm8),
    entry(K::Btr, E::Rm_Imm8),
    entry(K::Btc, E::Rm_Imm8),
];

/// One-byte opcode table.
pub static OPCODE_TABLE: [Dispatch; 256] = {
    let mut table = [Dispatch::Invalid; 256];

    // ADD/OR/ADC/SBB/AND/SUB/XOR/CMP rows: Eb,Gb Ev,Gv Gb,Eb Gv,Ev AL,Ib eAX,Iz
    let mut row = 0;
    while row < 8 {
        let base = row * 8;
        let kind = GROUP1_OPS[row];
        table[base] = direct_sized(kind, E::ModRmRm_Reg, 8);
        table[base + 1] = direct(kind, E::ModRmRm_Reg);
        table[base + 2] = direct_sized(kind, E::ModRmReg_Rm, 8);
        table[base + 3] = direct(kind, E::ModRmReg_Rm);
        table[base + 4] = direct_sized(kind, E::Acc_Imm, 8);
        table[base + 5] = direct(kind, E::Acc_Imm);
        row += 1;
    }

    // PUSH/POP ES, CS, SS, DS (0x0F is the escape, not POP CS)
    table[0x06] = direct(K::Push, E::OpSeg);
    table[0x07] = direct(K::Pop, E::OpSeg);
    table[0x0E] = direct(K::Push, E::OpSeg);
    table[0x0F] = Dispatch::Escape;
    table[0x16] = direct(K::Push, E::OpSeg);
    table[0x17] = direct(K::Pop, E::OpSeg);
    table[0x1E] = direct(K::Push, E::OpSeg);
    table[0x1F] = direct(K::Pop, E::OpSeg);

    // BCD adjust
    table[0x27] = direct(K::Daa, E::None);
    table[0x2F] = direct(K::Das, E::None);
    table[0x37] = direct(K::Aaa, E::None);
    table[0x3F] = direct(K::Aas, E::None);

    // INC/DEC/PUSH/POP r32
    let mut reg = 0;
    while reg < 8 {
        table[0x40 + reg] = direct(K::Inc, E::OpReg);
        table[0x48 + reg] = direct(K::Dec, E::OpReg);
        table[0x50 + reg] = direct(K::Push, E::OpReg);
        table[0x58 + reg] = direct(K::Pop, E::OpReg);
        reg += 1;
    }

    table[0x60] = direct(K::Pushad, E::None);
    table[0x61] = direct(K::Popad, E::None);
    table[0x68] = direct(K::Push, E::ImmFull);
    table[0x69] = direct(K::Imul, E::ModRmReg_Rm_Imm);
    table[0x6A] = direct(K::Push, E::Imm8s);
    table[0x6B] = direct(K::Imul, E::ModRmReg_Rm_Imm8s);

    // Jcc rel8
    let mut cc = 0;
    while cc < 16 {
        table[0x70 + cc] = direct(K::Jcc(Condition::from_code(cc as u8)), E::Rel8);
        cc += 1;
    }

    table[0x80] = Dispatch::Group(&GROUP1_EB_IB);
    table[0x81] = Dispatch::Group(&GROUP1_EV_IZ);
    table[0x82] = Dispatch::Group(&GROUP1_EB_IB);
    table[0x83] = Dispatch::Group(&GROUP1_EV_IB);
    table[0x84] = direct_sized(K::Test, E::ModRmRm_Reg, 8);
    table[0x85] = direct(K::Test, E::ModRmRm_Reg);
    table[0x86] = direct_sized(K::Xchg, E::ModRmRm_Reg, 8);
    table[0x87] = direct(K::Xchg, E::ModRmRm_Reg);

    // MOV
    table[0x88] = direct_sized(K::Mov, E::ModRmRm_Reg, 8);
    table[0x89] = direct(K::Mov, E::ModRmRm_Reg);
    table[0x8A] = direct_sized(K::Mov, E::ModRmReg_Rm, 8);
    table[0x8B] = direct(K::Mov, E::ModRmReg_Rm);
    table[0x8C] = direct_sized(K::Mov, E::ModRmRm_Sreg, 16);
    table[0x8D] = direct(K::Lea, E::ModRmReg_Rm);
    table[0x8E] = direct_sized(K::Mov, E::ModRmSreg_Rm, 16);
    table[0x8F] = Dispatch::Group(&GROUP1A);

    // XCHG eAX, r32; 0x90 (xchg eax, eax) is NOP
    table[0x90] = direct(K::Nop, E::None);
    let mut reg = 1;
    while reg < 8 {
        table[0x90 + reg] = direct(K::Xchg, E::Acc_OpReg);
        reg += 1;
    }

    table[0x98] = direct(K::Cwde, E::None);
    table[0x99] = direct(K::Cdq, E::None);
    table[0x9B] = direct(K::Wait, E::None);
    table[0x9C] = direct(K::Pushfd, E::None);
    table[0x9D] = direct(K::Popfd, E::None);
    table[0x9E] = direct(K::Sahf, E::None);
    table[0x9F] = direct(K::Lahf, E::None);

    // MOV moffs
    table[0xA0] = direct_sized(K::Mov, E::Acc_Moffs, 8);
    table[0xA1] = direct(K::Mov, E::Acc_Moffs);
    table[0xA2] = direct_sized(K::Mov, E::Moffs_Acc, 8);
    table[0xA3] = direct(K::Mov, E::Moffs_Acc);

    // String instructions, TEST accumulator
    table[0xA4] = direct_sized(K::Movs, E::StrMovs, 8);
    table[0xA5] = direct(K::Movs, E::StrMovs);
    table[0xA6] = direct_sized(K::Cmps, E::StrCmps, 8);
    table[0xA7] = direct(K::Cmps, E::StrCmps);
    table[0xA8] = direct_sized(K::Test, E::Acc_Imm, 8);
    table[0xA9] = direct(K::Test, E::Acc_Imm);
    table[0xAA] = direct_sized(K::Stos, E::StrStos, 8);
    table[0xAB] = direct(K::Stos, E::StrStos);
    table[0xAC] = direct_sized(K::Lods, E::StrLods, 8);
    table[0xAD] = direct(K::Lods, E::StrLods);
    table[0xAE] = direct_sized(K::Scas, E::StrScas, 8);
    table[0xAF] = direct(K::Scas, E::StrScas);

    // MOV r, imm
    let mut reg = 0;
    while reg < 8 {
        table[0xB0 + reg] = direct_sized(K::Mov, E::OpReg_Imm, 8);
        table[0xB8 + reg] = direct(K::Mov, E::OpReg_Imm);
        reg += 1;
    }

    table[0xC0] = Dispatch::Group(&GROUP2_EB_IB);
    table[0xC1] = Dispatch::Group(&GROUP2_EV_IB);
    table[0xC2] = direct(K::Ret, E::Imm16);
    table[0xC3] = direct(K::Ret, E::None);
    table[0xC6] = Dispatch::Group(&GROUP11_EB);
    table[0xC7] = Dispatch::Group(&GROUP11_EV);
    table[0xC8] = direct(K::Enter, E::Imm16_Imm8);
    table[0xC9] = direct(K::Leave, E::None);
    table[0xCA] = direct(K::RetFar, E::Imm16);
    table[0xCB] = direct(K::RetFar, E::None);
    table[0xCC] = direct(K::Int3, E::None);
    table[0xCD] = direct(K::Int, E::Imm8);

    table[0xD0] = Dispatch::Group(&GROUP2_EB_1);
    table[0xD1] = Dispatch::Group(&GROUP2_EV_1);
    table[0xD2] = Dispatch::Group(&GROUP2_EB_CL);
    table[0xD3] = Dispatch::Group(&GROUP2_EV_CL);

    let mut esc = 0;
    while esc < 8 {
        table[0xD8 + esc] = Dispatch::X87;
        esc += 1;
    }

    table[0xE0] = direct(K::Loopne, E::Rel8);
    table[0xE1] = direct(K::Loope, E::Rel8);
    table[0xE2] = direct(K::Loop, E::Rel8);
    table[0xE3] = direct(K::Jecxz, E::Rel8);
    table[0xE8] = direct(K::Call, E::Rel32);
    table[0xE9] = direct(K::Jmp, E::Rel32);
    table[0xEB] = direct(K::Jmp, E::Rel8);

    table[0xF4] = direct(K::Hlt, E::None);
    table[0xF5] = direct(K::Cmc, E::None);
    table[0xF6] = Dispatch::Group(&GROUP3_EB);
    table[0xF7] = Dispatch::Group(&GROUP3_EV);
    table[0xF8] = direct(K::Clc, E::None);
    table[0xF9] = direct(K::Stc, E::None);
    table[0xFA] = direct(K::Cli, E::None);
    table[0xFB] = direct(K::Sti, E::None);
    table[0xFC] = direct(K::Cld, E::None);
    table[0xFD] = direct(K::Std, E::None);
    table[0xFE] = Dispatch::Group(&GROUP4);
    table[0xFF] = Dispatch::Group(&GROUP5);

    table
};

/// Two-byte opcode table (0x0F xx).
pub static OPCODE_TABLE_0F: [Dispatch; 256] = {
    let mut table = [Dispatch::Invalid; 256];

    table[0x31] = direct(K::Rdtsc, E::None);
    table[0xA0] = direct(K::Push, E::OpSeg);
    table[0xA1] = direct(K::Pop, E::OpSeg);
    table[0xA2] = direct(K::Cpuid, E::None);
    table[0xA8] = direct(K::Push, E::OpSeg);
    table[0xA9] = direct(K::Pop, E::OpSeg);

    // CMOVcc, Jcc rel32, SETcc
    let mut cc = 0;
    while cc < 16 {
        let condition = Condition::from_code(cc as u8);
        table[0x40 + cc] = direct(K::Cmovcc(condition), E::ModRmReg_Rm);
        table[0x80 + cc] = direct(K::Jcc(condition), E::Rel32);
        table[0x90 + cc] = direct_sized(K::Setcc(condition), E::ModRmRmOnly, 8);
        cc += 1;
    }

    // Bit test, double shifts
    table[0xA3] = direct(K::Bt, E::ModRmRm_Reg);
    table[0xA4] = direct(K::Shld, E::ModRmRm_Reg_Imm8);
    table[0xA5] = direct(K::Shld, E::ModRmRm_Reg_Cl);
    table[0xAB] = direct(K::Bts, E::ModRmRm_Reg);
    table[0xAC] = direct(K::Shrd, E::ModRmRm_Reg_Imm8);
    table[0xAD] = direct(K::Shrd, E::ModRmRm_Reg_Cl);
    table[0xAF] = direct(K::Imul, E::ModRmReg_Rm);
    table[0xB3] = direct(K::Btr, E::ModRmRm_Reg);
    table[0xBA] = Dispatch::Group(&GROUP8);
    table[0xBB] = direct(K::Btc, E::ModRmRm_Reg);
    table[0xBC] = direct(K::Bsf, E::ModRmReg_Rm);
    table[0xBD] = direct(K::Bsr, E::ModRmReg_Rm);

    // MOVZX/MOVSX
    table[0xB6] = direct(K::Movzx, E::ModRmReg_Rm8);
    table[0xB7] = direct(K::Movzx, E::ModRmReg_Rm16);
    table[0xBE] = direct(K::Movsx, E::ModRmReg_Rm8);
    table[0xBF] = direct(K::Movsx, E::ModRmReg_Rm16);

    // BSWAP r32
    let mut reg = 0;
    while reg < 8 {
        table[0xC8 + reg] = direct_sized(K::Bswap, E::OpReg, 32);
        reg += 1;
    }

    table
};

/// Looks up the dispatch for an opcode byte in the one- or two-byte map.
pub fn lookup(opcode: u8, two_byte: bool) -> Dispatch {
    if two_byte {
        OPCODE_TABLE_0F[opcode as usize]
    } else {
        OPCODE_TABLE[opcode as usize]
    }
}
