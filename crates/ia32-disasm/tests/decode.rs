//! Decoding tests for each opcode family.

use ia32_core::{
    register::x86, Addressing, Condition, ControlFlow, Instruction, InstructionKind, Operand,
    Register, RepeatPrefix, Segment,
};
use ia32_disasm::x86::opcodes::{GROUP1_OPS, GROUP2_OPS};
use ia32_disasm::{disassemble, DecodeError, Decoder, DecoderConfig, UnknownOpcodePolicy};

fn decode_at(bytes: &[u8], address: u32) -> Instruction {
    match Decoder::new(bytes, address).decode_next() {
        Ok(inst) => inst,
        Err(err) => panic!("failed to decode {bytes:02x?}: {err}"),
    }
}

fn decode(bytes: &[u8]) -> Instruction {
    decode_at(bytes, 0)
}

fn decode_err(bytes: &[u8]) -> DecodeError {
    Decoder::new(bytes, 0).decode_next().unwrap_err()
}

fn r32(id: u16) -> Operand {
    Operand::reg(Register::gpr(id, 32))
}

fn r16(id: u16) -> Operand {
    Operand::reg(Register::gpr(id, 16))
}

fn r8(id: u16) -> Operand {
    Operand::reg(Register::gpr(id, 8))
}

fn base(id: u16, size: u16) -> Operand {
    Operand::mem(Addressing::Base(Register::gpr(id, 32)), size, None)
}

fn direct(address: u32, size: u16) -> Operand {
    Operand::mem(Addressing::Direct(address), size, None)
}

// =============================================================================
// Documented scenarios
// =============================================================================

#[test]
fn test_adc_rm32_imm32() {
    let inst = decode(&[0x81, 0xD0, 0x78, 0x56, 0x34, 0x12]);
    assert_eq!(inst.kind, InstructionKind::Adc);
    assert_eq!(inst.operands, vec![r32(x86::EAX), Operand::imm(0x1234_5678, 32)]);
    assert_eq!(inst.length, 6);
}

#[test]
fn test_adc_rm32_imm8() {
    let inst = decode(&[0x83, 0xD0, 0x42]);
    assert_eq!(inst.kind, InstructionKind::Adc);
    assert_eq!(inst.operands[0], r32(x86::EAX));
    assert_eq!(inst.operands[1].as_immediate().unwrap().value, 0x0000_0042);
}

#[test]
fn test_call_rel32() {
    let inst = decode(&[0xE8, 0x78, 0x56, 0x34, 0x12]);
    assert_eq!(inst.kind, InstructionKind::Call);
    assert_eq!(inst.operands, vec![Operand::rel(0x1234_567D)]);
    assert_eq!(
        inst.control_flow(),
        ControlFlow::Call {
            target: 0x1234_567D,
            return_addr: 5
        }
    );
}

#[test]
fn test_jge_rel8_wraps_below_zero() {
    let inst = decode(&[0x7D, 0xFB]);
    assert_eq!(inst.kind, InstructionKind::Jcc(Condition::GreaterOrEqual));
    assert_eq!(inst.operands, vec![Operand::rel(0xFFFF_FFFD)]);
}

#[test]
fn test_lea_scaled_index_no_base() {
    let inst = decode(&[0x8D, 0x04, 0x8D, 0x00, 0x00, 0x00, 0x00]);
    assert_eq!(inst.kind, InstructionKind::Lea);
    assert_eq!(inst.length, 7);
    assert_eq!(
        inst.operands,
        vec![
            r32(x86::EAX),
            Operand::mem(
                Addressing::Indexed {
                    base: None,
                    index: Register::gpr(x86::ECX, 32),
                    scale: 4,
                    disp: 0,
                },
                32,
                None,
            ),
        ]
    );
}

#[test]
fn test_neg_ecx() {
    let inst = decode(&[0xF7, 0xD9]);
    assert_eq!(inst.kind, InstructionKind::Neg);
    assert_eq!(inst.operands, vec![r32(x86::ECX)]);
}

// =============================================================================
// Group-1 ALU
// =============================================================================

#[test]
fn test_alu_rows() {
    for (row, kind) in GROUP1_OPS.iter().enumerate() {
        let op = (row * 8) as u8;

        // op ecx -> eax; ModR/M C8 = reg ecx, rm eax
        let inst = decode(&[op + 1, 0xC8]);
        assert_eq!(inst.kind, *kind);
        assert_eq!(inst.operands, vec![r32(x86::EAX), r32(x86::ECX)]);

        let inst = decode(&[op + 2, 0xC8]);
        assert_eq!(inst.operands, vec![r8(x86::CL), r8(x86::AL)]);

        let inst = decode(&[op + 3, 0x45, 0xF8]);
        assert_eq!(inst.operands[0], r32(x86::EAX));
        assert_eq!(inst.operands[1].as_memory().unwrap().displacement(), -8);

        let inst = decode(&[op + 4, 0x7F]);
        assert_eq!(inst.operands, vec![r8(x86::AL), Operand::imm(0x7F, 8)]);

        let inst = decode(&[op + 5, 0x01, 0x00, 0x00, 0x80]);
        assert_eq!(inst.operands, vec![r32(x86::EAX), Operand::imm(0x8000_0001, 32)]);
        assert_eq!(inst.length, 5);
    }
}

#[test]
fn test_group1_every_reg() {
    for reg in 0..8u8 {
        let modrm = 0xC3 | (reg << 3);
        let expected = GROUP1_OPS[reg as usize];

        let inst = decode(&[0x80, modrm, 0x90]);
        assert_eq!(inst.kind, expected);
        assert_eq!(inst.operands, vec![r8(x86::BL), Operand::imm(0x90, 8)]);

        let inst = decode(&[0x82, modrm, 0x90]);
        assert_eq!(inst.kind, expected);

        let inst = decode(&[0x81, modrm, 0x78, 0x56, 0x34, 0x12]);
        assert_eq!(inst.kind, expected);
        assert_eq!(inst.operands, vec![r32(x86::EBX), Operand::imm(0x1234_5678, 32)]);

        let inst = decode(&[0x83, modrm, 0xB8]);
        assert_eq!(inst.kind, expected);
        assert_eq!(inst.operands, vec![r32(x86::EBX), Operand::imm(0xFFFF_FFB8, 8)]);
    }
}

#[test]
fn test_group1_memory_operand_with_immediate_last() {
    // add dword [ebp-4], 0x10
    let inst = decode(&[0x83, 0x45, 0xFC, 0x10]);
    assert_eq!(inst.kind, InstructionKind::Add);
    let mem = inst.operands[0].as_memory().unwrap();
    assert_eq!(mem.size, 32);
    assert_eq!(mem.displacement(), -4);
    assert_eq!(inst.operands[1].as_immediate().unwrap().value, 0x10);
    assert_eq!(inst.length, 4);
}

// =============================================================================
// Shift / rotate
// =============================================================================

#[test]
fn test_shift_groups_every_reg() {
    for reg in 0..8u8 {
        let modrm = 0xC0 | (reg << 3);
        let expected = GROUP2_OPS[reg as usize];

        let inst = decode(&[0xC0, modrm, 0x03]);
        assert_eq!(inst.kind, expected);
        assert_eq!(inst.operands, vec![r8(x86::AL), Operand::imm(3, 8)]);

        let inst = decode(&[0xC1, modrm, 0x1F]);
        assert_eq!(inst.operands, vec![r32(x86::EAX), Operand::imm(0x1F, 8)]);

        let inst = decode(&[0xD0, modrm]);
        assert_eq!(inst.kind, expected);
        assert_eq!(inst.operands, vec![r8(x86::AL), Operand::imm(1, 8)]);

        let inst = decode(&[0xD1, modrm]);
        assert_eq!(inst.operands, vec![r32(x86::EAX), Operand::imm(1, 8)]);

        let inst = decode(&[0xD2, modrm]);
        assert_eq!(inst.operands, vec![r8(x86::AL), r8(x86::CL)]);

        let inst = decode(&[0xD3, modrm]);
        assert_eq!(inst.kind, expected);
        assert_eq!(inst.operands, vec![r32(x86::EAX), r8(x86::CL)]);
    }
}

#[test]
fn test_sal_alias() {
    assert_eq!(decode(&[0xD1, 0xF0]).kind, InstructionKind::Shl);
    assert_eq!(decode(&[0xD1, 0xE0]).kind, InstructionKind::Shl);
}

// =============================================================================
// Unary groups
// =============================================================================

#[test]
fn test_group3_every_reg() {
    let unary = [
        InstructionKind::Not,
        InstructionKind::Neg,
        InstructionKind::Mul,
        InstructionKind::Imul,
        InstructionKind::Div,
        InstructionKind::Idiv,
    ];

    let inst = decode(&[0xF7, 0xC1, 0x01, 0x00, 0x00, 0x00]);
    assert_eq!(inst.kind, InstructionKind::Test);
    assert_eq!(inst.operands, vec![r32(x86::ECX), Operand::imm(1, 32)]);

    let inst = decode(&[0xF6, 0xC1, 0x80]);
    assert_eq!(inst.operands, vec![r8(x86::CL), Operand::imm(0x80, 8)]);

    assert!(decode_err(&[0xF7, 0xC9]).is_unknown_opcode());
    assert!(decode_err(&[0xF6, 0xC9]).is_unknown_opcode());

    for (i, kind) in unary.iter().enumerate() {
        let reg = (i + 2) as u8;
        let inst = decode(&[0xF7, 0xC1 | (reg << 3)]);
        assert_eq!(inst.kind, *kind);
        assert_eq!(inst.operands, vec![r32(x86::ECX)]);

        let inst = decode(&[0xF6, 0x01 | (reg << 3)]);
        assert_eq!(inst.kind, *kind);
        assert_eq!(inst.operands, vec![base(x86::ECX, 8)]);
    }
}

#[test]
fn test_inc_dec_groups() {
    assert_eq!(decode(&[0xFE, 0xC0]).operands, vec![r8(x86::AL)]);
    assert_eq!(decode(&[0xFE, 0xC8]).kind, InstructionKind::Dec);
    for reg in 2..8u8 {
        assert!(decode_err(&[0xFE, 0xC0 | (reg << 3)]).is_unknown_opcode());
    }

    assert_eq!(decode(&[0x41]).kind, InstructionKind::Inc);
    assert_eq!(decode(&[0x4F]).operands, vec![r32(x86::EDI)]);
}

#[test]
fn test_group5_every_reg() {
    let inst = decode(&[0xFF, 0x00]);
    assert_eq!(inst.kind, InstructionKind::Inc);
    assert_eq!(inst.operands, vec![base(x86::EAX, 32)]);

    assert_eq!(decode(&[0xFF, 0xC9]).kind, InstructionKind::Dec);

    let inst = decode(&[0xFF, 0x15, 0x00, 0x20, 0x40, 0x00]);
    assert_eq!(inst.kind, InstructionKind::Call);
    assert_eq!(inst.operands, vec![direct(0x0040_2000, 32)]);
    assert_eq!(inst.control_flow(), ControlFlow::IndirectCall { return_addr: 6 });

    let inst = decode(&[0xFF, 0xE0]);
    assert_eq!(inst.kind, InstructionKind::Jmp);
    assert_eq!(inst.operands, vec![r32(x86::EAX)]);
    assert_eq!(inst.control_flow(), ControlFlow::IndirectBranch);

    let inst = decode(&[0xFF, 0x75, 0x08]);
    assert_eq!(inst.kind, InstructionKind::Push);

    // call far [0x401000]
    let inst = decode(&[0xFF, 0x1D, 0x00, 0x10, 0x40, 0x00]);
    assert_eq!(inst.kind, InstructionKind::CallFar);
    assert_eq!(inst.operands, vec![direct(0x0040_1000, 48)]);
    assert_eq!(inst.length, 6);
    assert_eq!(inst.control_flow(), ControlFlow::IndirectCall { return_addr: 6 });

    // jmp far [ebp+8]
    let inst = decode(&[0xFF, 0x6D, 0x08]);
    assert_eq!(inst.kind, InstructionKind::JmpFar);
    assert_eq!(inst.operands[0].as_memory().unwrap().size, 48);
    assert_eq!(inst.control_flow(), ControlFlow::IndirectBranch);

    // m16:16 under the operand-size prefix
    let inst = decode(&[0x66, 0xFF, 0x18]);
    assert_eq!(inst.operands, vec![base(x86::EAX, 32)]);

    // Far pointers have no register form
    for reg in [3u8, 5] {
        let err = decode_err(&[0xFF, 0xC0 | (reg << 3)]);
        assert_eq!(err, DecodeError::unknown_opcode(0, &[0xFF, 0xC0 | (reg << 3)]));
    }
    assert_eq!(decode_err(&[0xFF, 0x38]), DecodeError::unknown_opcode(0, &[0xFF, 0x38]));
    assert_eq!(decode_err(&[0xFF, 0xF8]), DecodeError::unknown_opcode(0, &[0xFF, 0xF8]));
}

// =============================================================================
// Data transfer
// =============================================================================

#[test]
fn test_mov_forms() {
    let inst = decode(&[0x8B, 0x45, 0x08]);
    assert_eq!(inst.kind, InstructionKind::Mov);
    assert_eq!(inst.operands[0], r32(x86::EAX));

    let inst = decode(&[0xB0, 0x12]);
    assert_eq!(inst.operands, vec![r8(x86::AL), Operand::imm(0x12, 8)]);

    let inst = decode(&[0xBC, 0x00, 0x00, 0x10, 0x00]);
    assert_eq!(inst.operands, vec![r32(x86::ESP), Operand::imm(0x0010_0000, 32)]);

    let inst = decode(&[0xA1, 0x00, 0x30, 0x40, 0x00]);
    assert_eq!(inst.operands, vec![r32(x86::EAX), direct(0x0040_3000, 32)]);

    let inst = decode(&[0xA2, 0x00, 0x30, 0x40, 0x00]);
    assert_eq!(inst.operands, vec![direct(0x0040_3000, 8), r8(x86::AL)]);

    // mov dword [0x403000], 1
    let inst = decode(&[0xC7, 0x05, 0x00, 0x30, 0x40, 0x00, 0x01, 0x00, 0x00, 0x00]);
    assert_eq!(inst.operands, vec![direct(0x0040_3000, 32), Operand::imm(1, 32)]);
    assert_eq!(inst.length, 10);

    let inst = decode(&[0xC6, 0x00, 0xFF]);
    assert_eq!(inst.operands, vec![base(x86::EAX, 8), Operand::imm(0xFF, 8)]);
    assert!(decode_err(&[0xC7, 0xC8, 0, 0, 0, 0]).is_unknown_opcode());
}

#[test]
fn test_segment_register_moves() {
    let inst = decode(&[0x8C, 0xD8]);
    assert_eq!(
        inst.operands,
        vec![r16(x86::EAX), Operand::reg(Segment::DS.into())]
    );

    let inst = decode(&[0x8E, 0xE0]);
    assert_eq!(
        inst.operands,
        vec![Operand::reg(Segment::FS.into()), r16(x86::EAX)]
    );

    let pushes = [(0x06, Segment::ES), (0x0E, Segment::CS), (0x16, Segment::SS), (0x1E, Segment::DS)];
    for (opcode, segment) in pushes {
        let inst = decode(&[opcode]);
        assert_eq!(inst.kind, InstructionKind::Push);
        assert_eq!(inst.operands, vec![Operand::reg(segment.into())]);
    }
    assert_eq!(decode(&[0x1F]).kind, InstructionKind::Pop);

    let two_byte = [
        (0xA0, InstructionKind::Push, Segment::FS),
        (0xA1, InstructionKind::Pop, Segment::FS),
        (0xA8, InstructionKind::Push, Segment::GS),
        (0xA9, InstructionKind::Pop, Segment::GS),
    ];
    for (opcode, kind, segment) in two_byte {
        let inst = decode(&[0x0F, opcode]);
        assert_eq!(inst.kind, kind);
        assert_eq!(inst.operands, vec![Operand::reg(segment.into())]);
        assert_eq!(inst.length, 2);
    }
}

#[test]
fn test_push_pop_xchg() {
    assert_eq!(decode(&[0x50]).operands, vec![r32(x86::EAX)]);
    assert_eq!(decode(&[0x5F]).kind, InstructionKind::Pop);

    let inst = decode(&[0x6A, 0xFF]);
    assert_eq!(inst.operands, vec![Operand::imm(0xFFFF_FFFF, 8)]);

    let inst = decode(&[0x68, 0x00, 0x10, 0x40, 0x00]);
    assert_eq!(inst.operands, vec![Operand::imm(0x0040_1000, 32)]);

    let inst = decode(&[0x8F, 0x00]);
    assert_eq!(inst.kind, InstructionKind::Pop);
    assert_eq!(inst.operands, vec![base(x86::EAX, 32)]);

    let inst = decode(&[0x93]);
    assert_eq!(inst.kind, InstructionKind::Xchg);
    assert_eq!(inst.operands, vec![r32(x86::EAX), r32(x86::EBX)]);

    let inst = decode(&[0x90]);
    assert_eq!(inst.kind, InstructionKind::Nop);
    assert!(inst.operands.is_empty());

    let inst = decode(&[0x87, 0xCA]);
    assert_eq!(inst.operands, vec![r32(x86::EDX), r32(x86::ECX)]);
}

#[test]
fn test_two_byte_data_transfer() {
    let inst = decode(&[0x0F, 0xB6, 0xC1]);
    assert_eq!(inst.kind, InstructionKind::Movzx);
    assert_eq!(inst.operands, vec![r32(x86::EAX), r8(x86::CL)]);

    let inst = decode(&[0x0F, 0xBF, 0x45, 0x08]);
    assert_eq!(inst.kind, InstructionKind::Movsx);
    assert_eq!(inst.operands[1].as_memory().unwrap().size, 16);

    let inst = decode(&[0x0F, 0x44, 0xC1]);
    assert_eq!(inst.kind, InstructionKind::Cmovcc(Condition::Equal));

    let inst = decode(&[0x0F, 0x94, 0xC0]);
    assert_eq!(inst.kind, InstructionKind::Setcc(Condition::Equal));
    assert_eq!(inst.operands, vec![r8(x86::AL)]);

    let inst = decode(&[0x0F, 0xC9]);
    assert_eq!(inst.kind, InstructionKind::Bswap);
    assert_eq!(inst.operands, vec![r32(x86::ECX)]);
}

#[test]
fn test_two_byte_bit_and_shift_ops() {
    let inst = decode(&[0x0F, 0xAF, 0xC1]);
    assert_eq!(inst.kind, InstructionKind::Imul);
    assert_eq!(inst.operands, vec![r32(x86::EAX), r32(x86::ECX)]);

    let inst = decode(&[0x0F, 0xA4, 0xC1, 0x04]);
    assert_eq!(inst.kind, InstructionKind::Shld);
    assert_eq!(inst.operands, vec![r32(x86::ECX), r32(x86::EAX), Operand::imm(4, 8)]);

    let inst = decode(&[0x0F, 0xAD, 0xC1]);
    assert_eq!(inst.kind, InstructionKind::Shrd);
    assert_eq!(inst.operands[2], r8(x86::CL));

    let inst = decode(&[0x0F, 0xA3, 0xC8]);
    assert_eq!(inst.kind, InstructionKind::Bt);

    let kinds = [
        InstructionKind::Bt,
        InstructionKind::Bts,
        InstructionKind::Btr,
        InstructionKind::Btc,
    ];
    for reg in 0..8u8 {
        let result = Decoder::new(&[0x0F, 0xBA, 0xC0 | (reg << 3), 0x05], 0).decode_next();
        if reg < 4 {
            assert!(result.unwrap_err().is_unknown_opcode());
        } else {
            let inst = result.unwrap();
            assert_eq!(inst.kind, kinds[(reg - 4) as usize]);
            assert_eq!(inst.operands, vec![r32(x86::EAX), Operand::imm(5, 8)]);
        }
    }

    assert_eq!(decode(&[0x0F, 0xBC, 0xC1]).kind, InstructionKind::Bsf);
    assert_eq!(decode(&[0x0F, 0xA2]).kind, InstructionKind::Cpuid);
    assert_eq!(decode(&[0x0F, 0x31]).kind, InstructionKind::Rdtsc);
}

#[test]
fn test_imul_three_operand() {
    let inst = decode(&[0x69, 0xC1, 0x10, 0x00, 0x00, 0x00]);
    assert_eq!(inst.operands, vec![r32(x86::EAX), r32(x86::ECX), Operand::imm(0x10, 32)]);

    let inst = decode(&[0x6B, 0xC1, 0xFE]);
    assert_eq!(inst.operands[2], Operand::imm(0xFFFF_FFFE, 8));
}

// =============================================================================
// Control transfer
// =============================================================================

#[test]
fn test_jcc_every_condition() {
    for cc in 0..16u8 {
        let short = decode_at(&[0x70 + cc, 0x10], 0x1000);
        assert_eq!(short.kind, InstructionKind::Jcc(Condition::from_code(cc)));
        assert_eq!(short.relative_target(), Some(0x1012));

        let near = decode_at(&[0x0F, 0x80 + cc, 0x00, 0x01, 0x00, 0x00], 0x1000);
        assert_eq!(near.kind, short.kind);
        assert_eq!(near.relative_target(), Some(0x1106));
    }
}

#[test]
fn test_loop_family() {
    let inst = decode_at(&[0xE2, 0xFE], 0x2000);
    assert_eq!(inst.kind, InstructionKind::Loop);
    assert_eq!(
        inst.control_flow(),
        ControlFlow::ConditionalBranch {
            target: 0x2000,
            condition: Condition::CounterNotZero,
            fallthrough: 0x2002,
        }
    );
    assert_eq!(decode(&[0xE3, 0x00]).kind, InstructionKind::Jecxz);
}

#[test]
fn test_returns_and_interrupts() {
    let inst = decode(&[0xC2, 0x08, 0x00]);
    assert_eq!(inst.kind, InstructionKind::Ret);
    assert_eq!(inst.operands, vec![Operand::imm(8, 16)]);
    assert!(inst.is_return());

    assert_eq!(decode(&[0xCB]).kind, InstructionKind::RetFar);
    assert_eq!(decode(&[0xCC]).control_flow(), ControlFlow::Halt);

    let inst = decode(&[0xCD, 0x80]);
    assert_eq!(inst.kind, InstructionKind::Int);
    assert_eq!(inst.operands, vec![Operand::imm(0x80, 8)]);
    assert_eq!(inst.control_flow(), ControlFlow::Syscall);

    let inst = decode(&[0xC8, 0x10, 0x00, 0x01]);
    assert_eq!(inst.kind, InstructionKind::Enter);
    assert_eq!(inst.operands, vec![Operand::imm(0x10, 16), Operand::imm(1, 8)]);
}

// =============================================================================
// String instructions
// =============================================================================

#[test]
fn test_string_operands() {
    let inst = decode(&[0xF3, 0xA5]);
    assert_eq!(inst.kind, InstructionKind::Movs);
    assert_eq!(inst.repeat, Some(RepeatPrefix::Rep));
    assert_eq!(inst.operands, vec![base(x86::EDI, 32), base(x86::ESI, 32)]);

    let inst = decode(&[0xF2, 0xAE]);
    assert_eq!(inst.kind, InstructionKind::Scas);
    assert_eq!(inst.repeat, Some(RepeatPrefix::Repne));
    assert_eq!(inst.operands, vec![r8(x86::AL), base(x86::EDI, 8)]);

    let inst = decode(&[0xAC]);
    assert_eq!(inst.operands, vec![r8(x86::AL), base(x86::ESI, 8)]);
    assert_eq!(inst.repeat, None);

    let inst = decode(&[0xAB]);
    assert_eq!(inst.operands, vec![base(x86::EDI, 32), r32(x86::EAX)]);

    let inst = decode(&[0xA6]);
    assert_eq!(inst.operands, vec![base(x86::ESI, 8), base(x86::EDI, 8)]);

    let inst = decode(&[0x66, 0xF3, 0xA5]);
    assert_eq!(inst.operands, vec![base(x86::EDI, 16), base(x86::ESI, 16)]);
    assert_eq!(inst.length, 3);
}

// =============================================================================
// Prefixes
// =============================================================================

#[test]
fn test_operand_size_prefix() {
    let inst = decode(&[0x66, 0x05, 0x34, 0x12]);
    assert_eq!(inst.kind, InstructionKind::Add);
    assert_eq!(inst.operands, vec![r16(x86::EAX), Operand::imm(0x1234, 16)]);
    assert_eq!(inst.length, 4);

    let inst = decode(&[0x66, 0x83, 0xC0, 0xFF]);
    assert_eq!(inst.operands, vec![r16(x86::EAX), Operand::imm(0xFFFF_FFFF, 8)]);

    let inst = decode(&[0x66, 0x8B, 0x00]);
    assert_eq!(inst.operands, vec![r16(x86::EAX), base(x86::EAX, 16)]);

    // Byte forms ignore the prefix
    let inst = decode(&[0x66, 0x88, 0xC8]);
    assert_eq!(inst.operands, vec![r8(x86::AL), r8(x86::CL)]);
}

#[test]
fn test_operand_size_prefix_selects_word_mnemonics() {
    let pairs = [
        (0x98, InstructionKind::Cwde, InstructionKind::Cbw),
        (0x99, InstructionKind::Cdq, InstructionKind::Cwd),
        (0x60, InstructionKind::Pushad, InstructionKind::Pusha),
        (0x61, InstructionKind::Popad, InstructionKind::Popa),
        (0x9C, InstructionKind::Pushfd, InstructionKind::Pushf),
        (0x9D, InstructionKind::Popfd, InstructionKind::Popf),
    ];
    for (opcode, dword, word) in pairs {
        let inst = decode(&[opcode]);
        assert_eq!(inst.kind, dword, "{opcode:#04x}");
        assert_eq!(inst.length, 1);

        let inst = decode(&[0x66, opcode]);
        assert_eq!(inst.kind, word, "66 {opcode:#04x}");
        assert!(inst.operands.is_empty());
        assert_eq!(inst.length, 2);
    }
}

#[test]
fn test_segment_override_on_memory() {
    let inst = decode(&[0x64, 0xA1, 0x00, 0x00, 0x00, 0x00]);
    assert_eq!(inst.length, 6);
    assert_eq!(
        inst.operands[1],
        Operand::mem(Addressing::Direct(0), 32, Some(Segment::FS))
    );

    let inst = decode(&[0x2E, 0x8B, 0x44, 0x24, 0x04]);
    assert_eq!(inst.operands[1].as_memory().unwrap().segment, Some(Segment::CS));
}

#[test]
fn test_segment_override_dropped_on_register_forms() {
    let inst = decode(&[0x3E, 0x90]);
    assert_eq!(inst.kind, InstructionKind::Nop);
    assert_eq!(inst.length, 2);

    let inst = decode(&[0x26, 0x89, 0xC8]);
    assert_eq!(inst.operands, vec![r32(x86::EAX), r32(x86::ECX)]);
}

#[test]
fn test_prefix_state_resets_between_instructions() {
    let out = disassemble(&[0x66, 0x40, 0x40, 0x64, 0xAC, 0xAC], 0, &DecoderConfig::default());
    assert!(out.is_complete());
    assert_eq!(out.instructions[0].operands, vec![r16(x86::EAX)]);
    assert_eq!(out.instructions[1].operands, vec![r32(x86::EAX)]);
    assert_eq!(out.instructions[2].operands[1].as_memory().unwrap().segment, Some(Segment::FS));
    assert_eq!(out.instructions[3].operands[1].as_memory().unwrap().segment, None);
}

// =============================================================================
// x87
// =============================================================================

#[test]
fn test_x87_register_forms() {
    let inst = decode(&[0xD8, 0xC1]);
    assert_eq!(inst.kind, InstructionKind::Fadd);
    assert_eq!(inst.operands, vec![Operand::st(0), Operand::st(1)]);

    let inst = decode(&[0xDC, 0xC1]);
    assert_eq!(inst.operands, vec![Operand::st(1), Operand::st(0)]);

    let inst = decode(&[0xD9, 0xC9]);
    assert_eq!(inst.kind, InstructionKind::Fxch);
    assert_eq!(inst.operands, vec![Operand::st(1)]);

    let inst = decode(&[0xDF, 0xE0]);
    assert_eq!(inst.kind, InstructionKind::Fnstsw);
    assert_eq!(inst.operands, vec![r16(x86::EAX)]);

    let inst = decode(&[0xDB, 0xF1]);
    assert_eq!(inst.kind, InstructionKind::Fcomi);

    assert_eq!(decode(&[0xD9, 0xE8]).kind, InstructionKind::Fld1);
    assert!(decode(&[0xD9, 0xE8]).operands.is_empty());
    assert_eq!(decode(&[0xDE, 0xD9]).kind, InstructionKind::Fcompp);
}

#[test]
fn test_x87_memory_forms() {
    let inst = decode(&[0xDC, 0x0D, 0x00, 0x30, 0x40, 0x00]);
    assert_eq!(inst.kind, InstructionKind::Fmul);
    assert_eq!(inst.operands, vec![direct(0x0040_3000, 64)]);

    let inst = decode(&[0xDB, 0x6D, 0xF0]);
    assert_eq!(inst.kind, InstructionKind::Fld);
    assert_eq!(inst.operands[0].as_memory().unwrap().size, 80);

    let inst = decode(&[0xDE, 0x00]);
    assert_eq!(inst.kind, InstructionKind::Fiadd);
    assert_eq!(inst.operands, vec![base(x86::EAX, 16)]);

    let inst = decode(&[0xD9, 0x7D, 0xFE]);
    assert_eq!(inst.kind, InstructionKind::Fnstcw);
    assert_eq!(inst.operands[0].as_memory().unwrap().size, 16);

    assert!(decode_err(&[0xD9, 0x08]).is_unknown_opcode());
    assert!(decode_err(&[0xD9, 0xD1]).is_unknown_opcode());
}

// =============================================================================
// Errors and loop policy
// =============================================================================

#[test]
fn test_out_of_data_reports_needed_bytes() {
    let err = decode_err(&[0x81, 0xD0, 0x78, 0x56]);
    assert_eq!(err, DecodeError::out_of_data(0, 6, 4));

    assert!(decode_err(&[0x0F]).is_out_of_data());
    assert!(decode_err(&[0x66, 0xF3]).is_out_of_data());
    assert!(decode_err(&[0x8B, 0x04]).is_out_of_data());
}

#[test]
fn test_unknown_opcodes() {
    assert_eq!(decode_err(&[0x0F, 0x0B]), DecodeError::unknown_opcode(0, &[0x0F, 0x0B]));
    assert_eq!(decode_err(&[0x67, 0x90]), DecodeError::unknown_opcode(0, &[0x67]));
    assert_eq!(decode_err(&[0xF0, 0x01, 0x00]), DecodeError::unknown_opcode(0, &[0xF0]));
    assert_eq!(decode_err(&[0x66, 0xD6]), DecodeError::unknown_opcode(0, &[0x66, 0xD6]));
}

#[test]
fn test_stop_policy() {
    let out = disassemble(&[0x90, 0x0F, 0x0B, 0x90], 0x100, &DecoderConfig::default());
    assert_eq!(out.instructions.len(), 1);
    assert_eq!(out.error, Some(DecodeError::unknown_opcode(0x101, &[0x0F, 0x0B])));
}

#[test]
fn test_resync_policy() {
    let config = DecoderConfig::new().with_unknown_opcode_policy(UnknownOpcodePolicy::Resync);
    let out = disassemble(&[0x90, 0x0F, 0x0B, 0xC3], 0x100, &config);
    assert!(out.is_complete());

    let kinds: Vec<_> = out.instructions.iter().map(|i| i.kind).collect();
    // 0F is skipped, then 0B C3 decodes as or eax, ebx
    assert_eq!(
        kinds,
        vec![InstructionKind::Nop, InstructionKind::Unknown, InstructionKind::Or]
    );
    assert_eq!(out.instructions[1].address, 0x101);
    assert_eq!(out.instructions[2].address, 0x102);
    assert_eq!(out.decoded_len(), 4);
}

#[test]
fn test_out_of_data_stops_even_when_resyncing() {
    let config = DecoderConfig::new().with_unknown_opcode_policy(UnknownOpcodePolicy::Resync);
    let out = disassemble(&[0x90, 0xE9, 0x00, 0x00], 0, &config);
    assert_eq!(out.instructions.len(), 1);
    assert!(out.error.unwrap().is_out_of_data());
}

#[test]
fn test_function_prologue_epilogue() {
    let code = [
        0x55, // push ebp
        0x89, 0xE5, // mov ebp, esp
        0x83, 0xEC, 0x10, // sub esp, 0x10
        0x8B, 0x45, 0x08, // mov eax, [ebp+8]
        0x85, 0xC0, // test eax, eax
        0x74, 0x03, // je +3
        0x40, // inc eax
        0xEB, 0x01, // jmp +1
        0x48, // dec eax
        0xC9, // leave
        0xC3, // ret
    ];
    let out = disassemble(&code, 0x0040_1000, &DecoderConfig::default());
    assert!(out.is_complete());
    assert_eq!(out.instructions.len(), 11);
    assert_eq!(out.decoded_len(), code.len());

    let je = &out.instructions[5];
    assert_eq!(je.address, 0x0040_100B);
    assert_eq!(je.relative_target(), Some(0x0040_1010));
    assert_eq!(out.instructions[7].relative_target(), Some(0x0040_1011));
    assert!(out.instructions[10].is_return());
}
