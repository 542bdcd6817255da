//! IA-32 register tables.
//!
//! Registers are identified by their class, the 3-bit number used in
//! instruction encodings, and a width in bits. The same encoding number
//! names a different architectural register at each width: 4 is ESP at
//! 32 bits, SP at 16 bits and AH at 8 bits.

/// Register class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegisterClass {
    /// General purpose register (eax, cx, dl, ...).
    General,
    /// Segment register (cs, ds, ...).
    Segment,
}

/// An architectural register at a given width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Register {
    /// The class of register.
    pub class: RegisterClass,
    /// Encoding number (0-7 for general registers, 0-5 for segments).
    pub id: u16,
    /// Size of the register in bits.
    pub size: u16,
}

impl Register {
    /// Creates a new register.
    pub const fn new(class: RegisterClass, id: u16, size: u16) -> Self {
        Self { class, id, size }
    }

    /// Creates a general purpose register from a 3-bit encoding field.
    pub const fn gpr(id: u16, size: u16) -> Self {
        Self::new(RegisterClass::General, id & 0x7, size)
    }

    /// Creates a segment register.
    pub const fn segment(segment: Segment) -> Self {
        Self::new(RegisterClass::Segment, segment as u16, 16)
    }

    /// Returns the canonical lowercase name of this register.
    pub fn name(&self) -> &'static str {
        match self.class {
            RegisterClass::General => gpr_name(self.id, self.size),
            RegisterClass::Segment => match Segment::from_id(self.id) {
                Some(seg) => seg.name(),
                None => "unknown",
            },
        }
    }

    /// Returns true if this register is the accumulator at any width.
    pub fn is_accumulator(&self) -> bool {
        self.class == RegisterClass::General && self.id == x86::EAX
    }
}

/// Encoding numbers for general purpose and segment registers.
pub mod x86 {
    // General purpose registers, in ModR/M encoding order.
    pub const EAX: u16 = 0;
    pub const ECX: u16 = 1;
    pub const EDX: u16 = 2;
    pub const EBX: u16 = 3;
    pub const ESP: u16 = 4;
    pub const EBP: u16 = 5;
    pub const ESI: u16 = 6;
    pub const EDI: u16 = 7;

    pub const AL: u16 = 0;
    pub const CL: u16 = 1;
    pub const DL: u16 = 2;
    pub const BL: u16 = 3;

    // 8-bit high halves share the encoding numbers 4-7.
    pub const AH: u16 = 4;
    pub const CH: u16 = 5;
    pub const DH: u16 = 6;
    pub const BH: u16 = 7;

    // Segment registers, in Sreg encoding order.
    pub const ES: u16 = 0;
    pub const CS: u16 = 1;
    pub const SS: u16 = 2;
    pub const DS: u16 = 3;
    pub const FS: u16 = 4;
    pub const GS: u16 = 5;
}

/// Segment registers, numbered as in the ModR/M `reg` field of
/// `MOV Sreg` forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Segment {
    ES = 0,
    CS = 1,
    SS = 2,
    DS = 3,
    FS = 4,
    GS = 5,
}

impl Segment {
    /// Looks up a segment by its Sreg encoding number.
    pub fn from_id(id: u16) -> Option<Self> {
        match id {
            x86::ES => Some(Self::ES),
            x86::CS => Some(Self::CS),
            x86::SS => Some(Self::SS),
            x86::DS => Some(Self::DS),
            x86::FS => Some(Self::FS),
            x86::GS => Some(Self::GS),
            _ => None,
        }
    }

    /// Returns the segment selected by a segment-override prefix byte.
    pub fn from_prefix(byte: u8) -> Option<Self> {
        match byte {
            0x26 => Some(Self::ES),
            0x2E => Some(Self::CS),
            0x36 => Some(Self::SS),
            0x3E => Some(Self::DS),
            0x64 => Some(Self::FS),
            0x65 => Some(Self::GS),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ES => "es",
            Self::CS => "cs",
            Self::SS => "ss",
            Self::DS => "ds",
            Self::FS => "fs",
            Self::GS => "gs",
        }
    }
}

impl From<Segment> for Register {
    fn from(segment: Segment) -> Self {
        Register::segment(segment)
    }
}

fn gpr_name(id: u16, size: u16) -> &'static str {
    match (id, size) {
        // 32-bit
        (x86::EAX, 32) => "eax",
        (x86::ECX, 32) => "ecx",
        (x86::EDX, 32) => "edx",
        (x86::EBX, 32) => "ebx",
        (x86::ESP, 32) => "esp",
        (x86::EBP, 32) => "ebp",
        (x86::ESI, 32) => "esi",
        (x86::EDI, 32) => "edi",

        // 16-bit
        (x86::EAX, 16) => "ax",
        (x86::ECX, 16) => "cx",
        (x86::EDX, 16) => "dx",
        (x86::EBX, 16) => "bx",
        (x86::ESP, 16) => "sp",
        (x86::EBP, 16) => "bp",
        (x86::ESI, 16) => "si",
        (x86::EDI, 16) => "di",

        // 8-bit
        (x86::EAX, 8) => "al",
        (x86::ECX, 8) => "cl",
        (x86::EDX, 8) => "dl",
        (x86::EBX, 8) => "bl",
        (x86::AH, 8) => "ah",
        (x86::CH, 8) => "ch",
        (x86::DH, 8) => "dh",
        (x86::BH, 8) => "bh",

        _ => "unknown",
    }
}
