#![no_main]

use ia32_disasm::{disassemble, Decoder, DecoderConfig, UnknownOpcodePolicy};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Single decode must never panic and never overrun the input
    if let Ok(inst) = Decoder::new(data, 0x1000).decode_next() {
        assert!(inst.length >= 1 && inst.length <= data.len());
    }

    // Resyncing over the whole buffer must tile it without gaps
    let config = DecoderConfig::new()
        .with_unknown_opcode_policy(UnknownOpcodePolicy::Resync)
        .with_max_instructions(4096);
    let out = disassemble(data, 0x1000, &config);
    let mut next = 0x1000u32;
    for inst in &out.instructions {
        assert_eq!(inst.address, next);
        next = inst.end_address();
    }
});
