//! Parallel disassembly of independent code regions.
//!
//! Each region gets its own [`Decoder`](crate::Decoder); the byte buffers are
//! only read, so regions can be decoded on any thread without coordination.

use rayon::prelude::*;

use crate::config::DecoderConfig;
use crate::x86::{disassemble, Disassembly};

/// A contiguous run of code and the address of its first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeRegion<'a> {
    pub base: u32,
    pub bytes: &'a [u8],
}

impl<'a> CodeRegion<'a> {
    pub fn new(base: u32, bytes: &'a [u8]) -> Self {
        Self { base, bytes }
    }

    /// Address one past the last byte.
    pub fn end(&self) -> u32 {
        self.base.wrapping_add(self.bytes.len() as u32)
    }
}

/// Disassemble multiple regions in parallel.
///
/// Results are returned in the same order as `regions`.
///
/// # Example
/// ```
/// use ia32_disasm::{disassemble_regions_parallel, CodeRegion, DecoderConfig};
///
/// let regions = [
///     CodeRegion::new(0x1000, &[0x55, 0xC3]),
///     CodeRegion::new(0x2000, &[0x90, 0x90, 0xC3]),
/// ];
/// let results = disassemble_regions_parallel(&regions, &DecoderConfig::default());
/// assert_eq!(results[1].instructions.len(), 3);
/// ```
pub fn disassemble_regions_parallel(
    regions: &[CodeRegion<'_>],
    config: &DecoderConfig,
) -> Vec<Disassembly> {
    regions
        .par_iter()
        .map(|region| disassemble(region.bytes, region.base, config))
        .collect()
}
