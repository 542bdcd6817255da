//! Decoder configuration.
//!
//! The only behavioral choice the decoding loop leaves open is what to do
//! with a byte no decode routine claims: stop, or emit a one-byte
//! placeholder and continue at the next byte.

/// What the disassembly loop does when it meets an unknown opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnknownOpcodePolicy {
    /// Report the error and end the region.
    #[default]
    Stop,
    /// Emit an `Unknown` placeholder one byte long and carry on.
    Resync,
}

impl UnknownOpcodePolicy {
    /// Parses a policy name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "stop" | "halt" => Some(Self::Stop),
            "resync" | "skip" | "continue" => Some(Self::Resync),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Resync => "resync",
        }
    }
}

/// Configuration for a [`Decoder`](crate::Decoder).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecoderConfig {
    /// Unknown opcode handling.
    pub unknown_opcode: UnknownOpcodePolicy,
    /// Stop after this many instructions.
    pub max_instructions: Option<usize>,
}

impl DecoderConfig {
    /// Creates the default configuration (stop on unknown opcodes, no cap).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the unknown opcode policy.
    pub fn with_unknown_opcode_policy(mut self, policy: UnknownOpcodePolicy) -> Self {
        self.unknown_opcode = policy;
        self
    }

    /// Caps the number of instructions the loop produces.
    pub fn with_max_instructions(mut self, max: usize) -> Self {
        self.max_instructions = Some(max);
        self
    }

    /// Returns true if unknown opcodes are skipped rather than fatal.
    pub fn resyncs(&self) -> bool {
        self.unknown_opcode == UnknownOpcodePolicy::Resync
    }
}
