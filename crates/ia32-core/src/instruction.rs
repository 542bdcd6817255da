//! Decoded instruction representation.

use crate::Operand;

/// One decoded IA-32 instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instruction {
    /// Virtual address of the first byte (prefixes included).
    pub address: u32,
    /// Encoded length in bytes, prefixes included.
    pub length: usize,
    /// Instruction class.
    pub kind: InstructionKind,
    /// Operands, destination first.
    pub operands: Vec<Operand>,
    /// REP/REPNE prefix on a string instruction.
    pub repeat: Option<RepeatPrefix>,
}

impl Instruction {
    /// Creates an instruction with no operands.
    pub fn new(address: u32, length: usize, kind: InstructionKind) -> Self {
        Self {
            address,
            length,
            kind,
            operands: Vec::new(),
            repeat: None,
        }
    }

    /// Sets operands.
    pub fn with_operands(mut self, operands: Vec<Operand>) -> Self {
        self.operands = operands;
        self
    }

    /// Sets the repeat prefix.
    pub fn with_repeat(mut self, repeat: Option<RepeatPrefix>) -> Self {
        self.repeat = repeat;
        self
    }

    /// Returns the address of the following instruction.
    pub fn end_address(&self) -> u32 {
        self.address.wrapping_add(self.length as u32)
    }

    /// Returns the resolved target of a relative branch operand.
    pub fn relative_target(&self) -> Option<u32> {
        self.operands.iter().find_map(|op| match op {
            Operand::Relative { target } => Some(*target),
            _ => None,
        })
    }

    /// Classifies how control leaves this instruction.
    pub fn control_flow(&self) -> ControlFlow {
        let next = self.end_address();
        match self.kind {
            InstructionKind::Jmp => match self.relative_target() {
                Some(target) => ControlFlow::UnconditionalBranch { target },
                None => ControlFlow::IndirectBranch,
            },
            InstructionKind::Jcc(condition) => self.conditional(condition, next),
            InstructionKind::Loop => self.conditional(Condition::CounterNotZero, next),
            InstructionKind::Loope => self.conditional(Condition::CounterNotZeroAndEqual, next),
            InstructionKind::Loopne => {
                self.conditional(Condition::CounterNotZeroAndNotEqual, next)
            }
            InstructionKind::Jecxz => self.conditional(Condition::CounterZero, next),
            InstructionKind::Call => match self.relative_target() {
                Some(target) => ControlFlow::Call {
                    target,
                    return_addr: next,
                },
                None => ControlFlow::IndirectCall { return_addr: next },
            },
            InstructionKind::JmpFar => ControlFlow::IndirectBranch,
            InstructionKind::CallFar => ControlFlow::IndirectCall { return_addr: next },
            InstructionKind::Ret | InstructionKind::RetFar => ControlFlow::Return,
            InstructionKind::Int => ControlFlow::Syscall,
            InstructionKind::Int3 | InstructionKind::Hlt => ControlFlow::Halt,
            _ => ControlFlow::Sequential,
        }
    }

    fn conditional(&self, condition: Condition, fallthrough: u32) -> ControlFlow {
        match self.relative_target() {
            Some(target) => ControlFlow::ConditionalBranch {
                target,
                condition,
                fallthrough,
            },
            None => ControlFlow::Sequential,
        }
    }

    /// Returns true if this instruction transfers control.
    pub fn is_branch(&self) -> bool {
        !matches!(self.control_flow(), ControlFlow::Sequential)
    }

    /// Returns true if this instruction is a call.
    pub fn is_call(&self) -> bool {
        matches!(self.kind, InstructionKind::Call | InstructionKind::CallFar)
    }

    /// Returns true if this instruction is a return.
    pub fn is_return(&self) -> bool {
        matches!(self.kind, InstructionKind::Ret | InstructionKind::RetFar)
    }
}

/// REP-family prefix attached to a string instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RepeatPrefix {
    /// 0xF3: REP / REPE / REPZ
    Rep,
    /// 0xF2: REPNE / REPNZ
    Repne,
}

/// Instruction class tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InstructionKind {
    // Data transfer
    Mov,
    Movzx,
    Movsx,
    Push,
    Pop,
    Pushad,
    Popad,
    Pusha,
    Popa,
    Pushfd,
    Popfd,
    Pushf,
    Popf,
    Xchg,
    Lea,
    Bswap,
    Cwde,
    Cdq,
    Cbw,
    Cwd,
    Sahf,
    Lahf,
    Cmovcc(Condition),
    Setcc(Condition),

    // Arithmetic and logic
    Add,
    Or,
    Adc,
    Sbb,
    And,
    Sub,
    Xor,
    Cmp,
    Test,
    Inc,
    Dec,
    Not,
    Neg,
    Mul,
    Imul,
    Div,
    Idiv,
    Daa,
    Das,
    Aaa,
    Aas,

    // Shift and rotate
    Rol,
    Ror,
    Rcl,
    Rcr,
    Shl,
    Shr,
    Sar,
    Shld,
    Shrd,

    // Bit test and scan
    Bt,
    Bts,
    Btr,
    Btc,
    Bsf,
    Bsr,

    // Control transfer
    Jmp,
    /// Far jump through an m16:32 pointer.
    JmpFar,
    Jcc(Condition),
    Call,
    /// Far call through an m16:32 pointer.
    CallFar,
    Ret,
    RetFar,
    Loop,
    Loope,
    Loopne,
    Jecxz,
    Int,
    Int3,
    Enter,
    Leave,

    // String
    Movs,
    Cmps,
    Stos,
    Lods,
    Scas,

    // Flags and system
    Nop,
    Hlt,
    Wait,
    Clc,
    Stc,
    Cmc,
    Cli,
    Sti,
    Cld,
    Std,
    Cpuid,
    Rdtsc,

    // x87 arithmetic
    Fadd,
    Faddp,
    Fiadd,
    Fmul,
    Fmulp,
    Fimul,
    Fsub,
    Fsubp,
    Fisub,
    Fsubr,
    Fsubrp,
    Fisubr,
    Fdiv,
    Fdivp,
    Fidiv,
    Fdivr,
    Fdivrp,
    Fidivr,

    // x87 comparison
    Fcom,
    Fcomp,
    Fcompp,
    Ficom,
    Ficomp,
    Fucom,
    Fucomp,
    Fucompp,
    Fcomi,
    Fcomip,
    Fucomi,
    Fucomip,
    Ftst,
    Fxam,

    // x87 load/store
    Fld,
    Fild,
    Fbld,
    Fst,
    Fstp,
    Fist,
    Fistp,
    Fisttp,
    Fbstp,
    Fxch,
    Ffree,
    Fcmovcc(Condition),
    Fld1,
    Fldl2t,
    Fldl2e,
    Fldpi,
    Fldlg2,
    Fldln2,
    Fldz,

    // x87 control
    Fldenv,
    Fldcw,
    Fnstenv,
    Fnstcw,
    Frstor,
    Fnsave,
    Fnstsw,
    Fnclex,
    Fninit,
    Fnop,
    Fdecstp,
    Fincstp,

    // x87 math
    Fchs,
    Fabs,
    F2xm1,
    Fyl2x,
    Fptan,
    Fpatan,
    Fxtract,
    Fprem1,
    Fprem,
    Fyl2xp1,
    Fsqrt,
    Fsincos,
    Frndint,
    Fscale,
    Fsin,
    Fcos,

    /// Placeholder for a byte that did not decode.
    Unknown,
}

impl InstructionKind {
    /// Returns true for the x87 floating point classes.
    pub fn is_x87(&self) -> bool {
        use InstructionKind::*;
        matches!(
            self,
            Fadd | Faddp
                | Fiadd
                | Fmul
                | Fmulp
                | Fimul
                | Fsub
                | Fsubp
                | Fisub
                | Fsubr
                | Fsubrp
                | Fisubr
                | Fdiv
                | Fdivp
                | Fidiv
                | Fdivr
                | Fdivrp
                | Fidivr
                | Fcom
                | Fcomp
                | Fcompp
                | Ficom
                | Ficomp
                | Fucom
                | Fucomp
                | Fucompp
                | Fcomi
                | Fcomip
                | Fucomi
                | Fucomip
                | Ftst
                | Fxam
                | Fld
                | Fild
                | Fbld
                | Fst
                | Fstp
                | Fist
                | Fistp
                | Fisttp
                | Fbstp
                | Fxch
                | Ffree
                | Fcmovcc(_)
                | Fld1
                | Fldl2t
                | Fldl2e
                | Fldpi
                | Fldlg2
                | Fldln2
                | Fldz
                | Fldenv
                | Fldcw
                | Fnstenv
                | Fnstcw
                | Frstor
                | Fnsave
                | Fnstsw
                | Fnclex
                | Fninit
                | Fnop
                | Fdecstp
                | Fincstp
                | Fchs
                | Fabs
                | F2xm1
                | Fyl2x
                | Fptan
                | Fpatan
                | Fxtract
                | Fprem1
                | Fprem
                | Fyl2xp1
                | Fsqrt
                | Fsincos
                | Frndint
                | Fscale
                | Fsin
                | Fcos
        )
    }

    /// Returns true for the string instruction classes.
    pub fn is_string(&self) -> bool {
        use InstructionKind::*;
        matches!(self, Movs | Cmps | Stos | Lods | Scas)
    }

    /// Returns the class selected by an operand-size prefix for the
    /// zero-operand forms whose mnemonic encodes the width.
    pub fn with_operand_size_16(self) -> Self {
        use InstructionKind::*;
        match self {
            Cwde => Cbw,
            Cdq => Cwd,
            Pushad => Pusha,
            Popad => Popa,
            Pushfd => Pushf,
            Popfd => Popf,
            kind => kind,
        }
    }
}

/// Branch condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Condition {
    // Unsigned comparisons
    Equal,
    NotEqual,
    Above,         // CF=0 and ZF=0
    AboveOrEqual,  // CF=0
    Below,         // CF=1
    BelowOrEqual,  // CF=1 or ZF=1

    // Signed comparisons
    Greater,        // ZF=0 and SF=OF
    GreaterOrEqual, // SF=OF
    Less,           // SF!=OF
    LessOrEqual,    // ZF=1 or SF!=OF

    // Flag-based
    Sign,        // SF=1
    NotSign,     // SF=0
    Overflow,    // OF=1
    NotOverflow, // OF=0
    Parity,      // PF=1
    NotParity,   // PF=0

    // Counter-based (LOOP family, JECXZ)
    CounterZero,
    CounterNotZero,
    CounterNotZeroAndEqual,    // LOOPE: ECX!=0 and ZF=1
    CounterNotZeroAndNotEqual, // LOOPNE: ECX!=0 and ZF=0
    CounterZeroOrNotEqual,
    CounterZeroOrEqual,
}

impl Condition {
    /// Decodes the 4-bit condition code carried in the low nibble of
    /// Jcc, SETcc and CMOVcc opcodes.
    pub const fn from_code(code: u8) -> Self {
        match code & 0x0F {
            0x0 => Self::Overflow,
            0x1 => Self::NotOverflow,
            0x2 => Self::Below,
            0x3 => Self::AboveOrEqual,
            0x4 => Self::Equal,
            0x5 => Self::NotEqual,
            0x6 => Self::BelowOrEqual,
            0x7 => Self::Above,
            0x8 => Self::Sign,
            0x9 => Self::NotSign,
            0xA => Self::Parity,
            0xB => Self::NotParity,
            0xC => Self::Less,
            0xD => Self::GreaterOrEqual,
            0xE => Self::LessOrEqual,
            _ => Self::Greater,
        }
    }

    /// Returns the inverse condition.
    pub fn inverse(&self) -> Self {
        match self {
            Self::Equal => Self::NotEqual,
            Self::NotEqual => Self::Equal,
            Self::Above => Self::BelowOrEqual,
            Self::AboveOrEqual => Self::Below,
            Self::Below => Self::AboveOrEqual,
            Self::BelowOrEqual => Self::Above,
            Self::Greater => Self::LessOrEqual,
            Self::GreaterOrEqual => Self::Less,
            Self::Less => Self::GreaterOrEqual,
            Self::LessOrEqual => Self::Greater,
            Self::Sign => Self::NotSign,
            Self::NotSign => Self::Sign,
            Self::Overflow => Self::NotOverflow,
            Self::NotOverflow => Self::Overflow,
            Self::Parity => Self::NotParity,
            Self::NotParity => Self::Parity,
            Self::CounterZero => Self::CounterNotZero,
            Self::CounterNotZero => Self::CounterZero,
            Self::CounterNotZeroAndEqual => Self::CounterZeroOrNotEqual,
            Self::CounterZeroOrNotEqual => Self::CounterNotZeroAndEqual,
            Self::CounterNotZeroAndNotEqual => Self::CounterZeroOrEqual,
            Self::CounterZeroOrEqual => Self::CounterNotZeroAndNotEqual,
        }
    }
}

/// Control flow classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlFlow {
    /// Falls through to the next instruction.
    Sequential,

    /// Unconditional branch to a known address.
    UnconditionalBranch { target: u32 },

    /// Conditional branch - may fall through or jump.
    ConditionalBranch {
        target: u32,
        condition: Condition,
        fallthrough: u32,
    },

    /// Jump through a register or memory operand.
    IndirectBranch,

    /// Call to a known address.
    Call { target: u32, return_addr: u32 },

    /// Call through a register or memory operand.
    IndirectCall { return_addr: u32 },

    /// Return from procedure.
    Return,

    /// Software interrupt (INT n).
    Syscall,

    /// Stops execution (HLT, INT3).
    Halt,
}
