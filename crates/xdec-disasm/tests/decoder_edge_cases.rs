//! Decoder behavior beyond the per-opcode conformance rows.
//!
//! - Prefix interactions and the 15-byte limit
//! - Truncated input
//! - Mode-dependent decoding of the same bytes
//! - The legacy one-byte map (ALU, branches, stack, MOV)
//! - EVEX masking, broadcast, rounding and SAE
//! - Constant offsets

use xdec_core::{
    Bitness, Code, Instruction, MemorySize, OpKind, Operand, Register, RoundingControl,
};
use xdec_disasm::{DecodeError, Decoder, Disassembler, X86Disassembler};

fn bytes(hex: &str) -> Vec<u8> {
    hex::decode(hex.replace(' ', "")).expect("valid hex")
}

fn decode_at(bitness: Bitness, hex: &str, ip: u64) -> Instruction {
    let data = bytes(hex);
    let mut decoder = Decoder::new(bitness, &data, ip);
    let instr = decoder.decode();
    assert_eq!(decoder.position(), instr.len());
    instr
}

fn decode(bitness: Bitness, hex: &str) -> Instruction {
    decode_at(bitness, hex, 0)
}

fn try_decode(bitness: Bitness, hex: &str) -> Result<Instruction, DecodeError> {
    let data = bytes(hex);
    Decoder::new(bitness, &data, 0).try_decode()
}

const MODES: [Bitness; 3] = [Bitness::Bits16, Bitness::Bits32, Bitness::Bits64];

// =============================================================================
// Lengths and Truncation
// =============================================================================

#[test]
fn test_empty_input_is_invalid_with_zero_length() {
    for bitness in MODES {
        let mut decoder = Decoder::new(bitness, &[], 0x1000);
        assert!(!decoder.can_decode());
        let instr = decoder.decode();
        assert_eq!(instr.code(), Code::INVALID);
        assert_eq!(instr.len(), 0);
        assert_eq!(instr.ip(), 0x1000);
        assert_eq!(decoder.next(), None);
    }
}

#[test]
fn test_truncated_input_consumes_available_bytes() {
    for bitness in MODES {
        let instr = decode(bitness, "66");
        assert_eq!(instr.code(), Code::INVALID);
        assert_eq!(instr.len(), 1);

        // ADD needs a ModRM byte
        let instr = decode(bitness, "01");
        assert_eq!(instr.code(), Code::INVALID);
        assert_eq!(instr.len(), 1);
    }

    // A 32-bit displacement cut short
    let instr = decode(Bitness::Bits32, "01 05 78 56");
    assert_eq!(instr.code(), Code::INVALID);
    assert_eq!(instr.len(), 4);

    assert_eq!(
        try_decode(Bitness::Bits64, "0FC1"),
        Err(DecodeError::UnexpectedEndOfInput { offset: 2 })
    );
}

#[test]
fn test_appended_bytes_do_not_change_the_result() {
    let cases = [
        (Bitness::Bits16, "B0 5A"),
        (Bitness::Bits32, "0FC0 38"),
        (Bitness::Bits64, "62 F14C0B C2 50 01 A5"),
        (Bitness::Bits64, "48 B8 8877665544332211"),
    ];
    for (bitness, hex) in cases {
        let exact = decode(bitness, hex);
        let padded = decode(bitness, &format!("{hex} 90 90 CC FF"));
        assert_eq!(exact, padded, "{hex}");
    }
}

#[test]
fn test_fourteen_prefixes_fit() {
    let hex = format!("{} 90", "26 ".repeat(14));
    let instr = decode(Bitness::Bits32, &hex);
    assert_eq!(instr.code(), Code::Nopd);
    assert_eq!(instr.len(), 15);
    assert_eq!(instr.segment_prefix(), Register::ES);
}

#[test]
fn test_fifteen_byte_limit() {
    let hex = format!("{} 90", "26 ".repeat(15));
    let instr = decode(Bitness::Bits32, &hex);
    assert_eq!(instr.code(), Code::INVALID);
    assert_eq!(instr.len(), 15);
    assert!(matches!(
        try_decode(Bitness::Bits32, &hex),
        Err(DecodeError::InstructionTooLong { .. })
    ));

    // The ModRM byte would be the 16th
    let hex = format!("{} 0FC0 CE", "26 ".repeat(13));
    let instr = decode(Bitness::Bits64, &hex);
    assert_eq!(instr.code(), Code::INVALID);
    assert_eq!(instr.len(), 15);
}

// =============================================================================
// Prefixes
// =============================================================================

#[test]
fn test_rex_before_legacy_prefix_is_dropped() {
    let instr = decode(Bitness::Bits64, "48 66 01 C8");
    assert_eq!(instr.code(), Code::Add_rm16_r16);
    assert_eq!(instr.op_register(0), Register::AX);
    assert_eq!(instr.op_register(1), Register::CX);
    assert_eq!(instr.len(), 4);
}

#[test]
fn test_rex_is_inc_dec_outside_64bit() {
    let instr = decode(Bitness::Bits32, "48");
    assert_eq!(instr.code(), Code::Dec_r32);
    assert_eq!(instr.op_register(0), Register::EAX);
    let instr = decode(Bitness::Bits16, "41");
    assert_eq!(instr.code(), Code::Inc_r16);
    assert_eq!(instr.op_register(0), Register::CX);
}

#[test]
fn test_mandatory_prefix_is_consumed() {
    let instr = decode(Bitness::Bits64, "F3 90");
    assert_eq!(instr.code(), Code::Pause);
    assert!(!instr.has_repe_prefix());

    // Last of F2/F3 wins
    let instr = decode(Bitness::Bits64, "F2 F3 90");
    assert_eq!(instr.code(), Code::Pause);

    let instr = decode(Bitness::Bits32, "F3 0FC2 CD 01");
    assert_eq!(instr.code(), Code::Cmpss_xmm_xmmm32_imm8);
    assert!(!instr.has_repe_prefix());
}

#[test]
fn test_nop_and_xchg() {
    assert_eq!(decode(Bitness::Bits32, "90").code(), Code::Nopd);
    assert_eq!(decode(Bitness::Bits32, "66 90").code(), Code::Nopw);
    assert_eq!(decode(Bitness::Bits64, "48 90").code(), Code::Nopq);

    let instr = decode(Bitness::Bits64, "41 90");
    assert_eq!(instr.code(), Code::Xchg_r32_EAX);
    assert_eq!(instr.op_register(0), Register::R8D);
    assert_eq!(instr.op_register(1), Register::EAX);
}

#[test]
fn test_lock_prefix() {
    let instr = decode(Bitness::Bits64, "F0 01 08");
    assert_eq!(instr.code(), Code::Add_rm32_r32);
    assert!(instr.has_lock_prefix());
    assert_eq!(instr.op_kind(0), OpKind::Memory);
    assert_eq!(instr.memory_base(), Register::RAX);
    assert_eq!(instr.op_register(1), Register::ECX);

    // Register form
    let instr = decode(Bitness::Bits64, "F0 01 C8");
    assert_eq!(instr.code(), Code::INVALID);
    assert_eq!(instr.len(), 3);

    // The immediate still belongs to the rejected instruction
    let instr = decode(Bitness::Bits64, "F0 80 C0 01");
    assert_eq!(instr.code(), Code::INVALID);
    assert_eq!(instr.len(), 4);
    let instr = decode(Bitness::Bits64, "F0 81 C0 01 00 00 00");
    assert_eq!(instr.code(), Code::INVALID);
    assert_eq!(instr.len(), 7);
    let instr = decode(Bitness::Bits64, "F0 81 00 01 00 00 00");
    assert_eq!(instr.code(), Code::Add_rm32_imm32);
    assert_eq!(instr.len(), 7);

    // CMP never takes LOCK
    assert!(matches!(
        try_decode(Bitness::Bits64, "F0 39 08"),
        Err(DecodeError::InvalidPrefixCombination { .. })
    ));
}

#[test]
fn test_rejected_instruction_keeps_the_stream_in_sync() {
    // lock add eax, 0x90909090 (register form) ; ret
    let data = bytes("F0 81 C0 90 90 90 90 C3");
    let codes: Vec<Code> = Decoder::new(Bitness::Bits64, &data, 0).map(|i| i.code()).collect();
    assert_eq!(codes, vec![Code::INVALID, Code::Retnq]);

    let disasm = X86Disassembler::new(Bitness::Bits64);
    let block = disasm.disassemble_block(&bytes("62 F17CC8 58 C3 90"), 0);
    assert_eq!(block.len(), 2);
    assert!(block[0].is_err());
    assert_eq!(block[1].as_ref().map(|i| i.code()), Ok(Code::Nopd));
}

#[test]
fn test_segment_override_and_defaults() {
    let instr = decode(Bitness::Bits32, "8B 45 08");
    assert_eq!(instr.code(), Code::Mov_r32_rm32);
    assert_eq!(instr.memory_base(), Register::EBP);
    assert_eq!(instr.memory_segment(), Register::SS);
    assert_eq!(instr.memory_displacement(), 8);
    assert_eq!(instr.memory_displ_size(), 1);
    assert_eq!(instr.segment_prefix(), Register::None);

    let instr = decode(Bitness::Bits32, "64 8B 45 08");
    assert_eq!(instr.memory_segment(), Register::FS);
    assert_eq!(instr.segment_prefix(), Register::FS);

    // FS stays in effect over a later DS in 64-bit mode
    let instr = decode(Bitness::Bits64, "64 3E 8B 00");
    assert_eq!(instr.memory_segment(), Register::FS);
}

#[test]
fn test_vex_after_legacy_prefix_is_rejected() {
    for prefix in ["66", "F2", "F3", "F0", "40"] {
        let hex = format!("{prefix} C5F8 58 C2");
        let instr = decode(Bitness::Bits64, &hex);
        assert_eq!(instr.code(), Code::INVALID, "{hex}");
        // Decoding runs to the end of the instruction
        assert_eq!(instr.len(), 5, "{hex}");
        assert!(matches!(
            try_decode(Bitness::Bits64, &hex),
            Err(DecodeError::InvalidPrefixCombination { .. })
        ));
    }

    // Segment and address-size prefixes are fine
    let instr = decode(Bitness::Bits64, "67 26 C5F8 58 C2");
    assert_eq!(instr.code(), Code::VEX_Vaddps_xmm_xmm_xmmm128);
}

// =============================================================================
// Literal Examples
// =============================================================================

#[test]
fn test_mov_al_imm8_16bit() {
    let instr = decode(Bitness::Bits16, "B0 5A");
    assert_eq!(instr.code(), Code::Mov_AL_imm8);
    assert_eq!(instr.op_count(), 2);
    assert_eq!(instr.op_register(0), Register::AL);
    assert_eq!(instr.op_kind(1), OpKind::Immediate8);
    assert_eq!(instr.immediate8(), 0x5A);
    assert_eq!(instr.len(), 2);
}

#[test]
fn test_xadd_memory_32bit() {
    let instr = decode(Bitness::Bits32, "0FC0 38");
    assert_eq!(instr.code(), Code::Xadd_rm8_r8);
    assert_eq!(instr.op_kind(0), OpKind::Memory);
    assert_eq!(instr.memory_segment(), Register::DS);
    assert_eq!(instr.memory_base(), Register::EAX);
    assert_eq!(instr.memory_size(), MemorySize::UInt8);
    assert_eq!(instr.op_register(1), Register::BH);
    assert_eq!(instr.len(), 3);
}

#[test]
fn test_vex_vcmpps() {
    for bitness in MODES {
        let instr = decode(bitness, "C5C8 C2 10 A5");
        assert_eq!(instr.code(), Code::VEX_Vcmpps_xmm_xmm_xmmm128_imm8);
        assert_eq!(instr.op_register(0), Register::XMM2);
        assert_eq!(instr.op_register(1), Register::XMM6);
        assert_eq!(instr.op_kind(2), OpKind::Memory);
        assert_eq!(instr.memory_size(), MemorySize::Packed128_Float32);
        assert_eq!(instr.immediate8(), 0xA5);
        assert_eq!(instr.len(), 5);
    }
}

#[test]
fn test_xrstors64() {
    let instr = decode(Bitness::Bits64, "48 0FC7 18");
    assert_eq!(instr.code(), Code::Xrstors64_m0);
    assert_eq!(instr.memory_size(), MemorySize::Xsave64);
    assert_eq!(instr.len(), 4);

    // /1 is CMPXCHG16B
    let instr = decode(Bitness::Bits64, "48 0FC7 08");
    assert_eq!(instr.code(), Code::Cmpxchg16b_m128);
    assert_eq!(instr.memory_size(), MemorySize::UInt128);
}

#[test]
fn test_evex_vcmpps_in_every_mode() {
    for bitness in MODES {
        let instr = decode(bitness, "62 F14C0B C2 50 01 A5");
        assert_eq!(instr.code(), Code::EVEX_Vcmpps_k_k1_xmm_xmmm128b32_imm8);
        assert_eq!(instr.op_register(0), Register::K2);
        assert_eq!(instr.op_register(1), Register::XMM6);
        assert_eq!(instr.op_kind(2), OpKind::Memory);
        assert_eq!(instr.memory_size(), MemorySize::Packed128_Float32);
        // disp8 * 16
        assert_eq!(instr.memory_displacement(), 16);
        assert_eq!(instr.op_mask(), Register::K3);
        assert!(!instr.zeroing_masking());
        assert_eq!(instr.immediate8(), 0xA5);
        assert_eq!(instr.len(), 8);
    }
    let instr = decode(Bitness::Bits16, "62 F14C0B C2 50 01 A5");
    assert_eq!(instr.memory_base(), Register::BX);
    assert_eq!(instr.memory_index(), Register::SI);
    assert_eq!(instr.memory_segment(), Register::DS);
}

#[test]
fn test_operand_size_prefix_flips_with_mode() {
    let instr = decode(Bitness::Bits16, "66 0FC1 CE");
    assert_eq!(instr.code(), Code::Xadd_rm32_r32);
    assert_eq!(instr.op_register(0), Register::ESI);
    assert_eq!(instr.op_register(1), Register::ECX);

    let instr = decode(Bitness::Bits32, "66 0FC1 CE");
    assert_eq!(instr.code(), Code::Xadd_rm16_r16);
    assert_eq!(instr.op_register(0), Register::SI);
    assert_eq!(instr.op_register(1), Register::CX);
}

// =============================================================================
// Addressing
// =============================================================================

#[test]
fn test_sib_without_base() {
    let instr = decode(Bitness::Bits32, "8B 04 8D 00 10 00 00");
    assert_eq!(instr.code(), Code::Mov_r32_rm32);
    assert_eq!(instr.memory_base(), Register::None);
    assert_eq!(instr.memory_index(), Register::ECX);
    assert_eq!(instr.memory_index_scale(), 4);
    assert_eq!(instr.memory_displacement(), 0x1000);
    assert_eq!(instr.memory_displ_size(), 4);
    assert_eq!(instr.len(), 7);
}

#[test]
fn test_stack_pointer_base() {
    let instr = decode(Bitness::Bits64, "48 8B 04 24");
    assert_eq!(instr.code(), Code::Mov_r64_rm64);
    assert_eq!(instr.op_register(0), Register::RAX);
    assert_eq!(instr.memory_base(), Register::RSP);
    assert_eq!(instr.memory_index(), Register::None);
    assert_eq!(instr.memory_segment(), Register::SS);
}

#[test]
fn test_rex_extends_base_and_index() {
    // mov rax, [r9+r10*8+0x10]
    let instr = decode(Bitness::Bits64, "4B 8B 44 D1 10");
    assert_eq!(instr.memory_base(), Register::R9);
    assert_eq!(instr.memory_index(), Register::R10);
    assert_eq!(instr.memory_index_scale(), 8);
    assert_eq!(instr.memory_displacement(), 0x10);
}

#[test]
fn test_eip_relative_with_address_size_prefix() {
    let instr = decode_at(Bitness::Bits64, "67 8D 05 10 00 00 00", 0xFFFF_FFF0);
    assert_eq!(instr.code(), Code::Lea_r32_m);
    assert_eq!(instr.memory_base(), Register::EIP);
    // next ip 0xFFFF_FFF7 + 0x10 wraps at 32 bits
    assert_eq!(instr.memory_displacement64(), 0x7);
    assert_eq!(instr.memory_displ_size(), 4);
}

#[test]
fn test_rm_101_is_absolute_outside_64bit() {
    let instr = decode(Bitness::Bits32, "8B 05 78 56 34 12");
    assert_eq!(instr.memory_base(), Register::None);
    assert_eq!(instr.memory_displacement(), 0x1234_5678);
}

// =============================================================================
// Legacy One-Byte Map
// =============================================================================

#[test]
fn test_group1_sign_extended_immediate() {
    let instr = decode(Bitness::Bits64, "48 83 C0 F0");
    assert_eq!(instr.code(), Code::Add_rm64_imm8);
    assert_eq!(instr.op_register(0), Register::RAX);
    assert_eq!(instr.op_kind(1), OpKind::Immediate8to64);
    assert_eq!(instr.immediate(1), Some(0xFFFF_FFFF_FFFF_FFF0));
}

#[test]
fn test_opcode_82_depends_on_mode() {
    let instr = decode(Bitness::Bits32, "82 C0 01");
    assert_eq!(instr.code(), Code::Add_rm8_imm8_82);
    assert_eq!(instr.op_register(0), Register::AL);

    let instr = decode(Bitness::Bits64, "82 C0 01");
    assert_eq!(instr.code(), Code::INVALID);
    assert_eq!(instr.len(), 1);
}

#[test]
fn test_bound_vs_evex() {
    let instr = decode(Bitness::Bits32, "62 08");
    assert_eq!(instr.code(), Code::Bound_r32_m3232);
    assert_eq!(instr.op_register(0), Register::ECX);
    assert_eq!(instr.memory_size(), MemorySize::Bound32_DwordDword);
}

#[test]
fn test_branch_targets() {
    let instr = decode_at(Bitness::Bits64, "74 FE", 0x1000);
    assert_eq!(instr.code(), Code::Je_rel8_64);
    assert_eq!(instr.op_kind(0), OpKind::NearBranch64);
    assert_eq!(instr.near_branch_target(), Some(0x1000));

    let instr = decode_at(Bitness::Bits32, "E8 00 00 00 00", 0x40_1000);
    assert_eq!(instr.code(), Code::Call_rel32_32);
    assert_eq!(instr.op(0), Operand::NearBranch32(0x40_1005));

    let instr = decode_at(Bitness::Bits32, "66 E8 10 00", 0x40_1000);
    assert_eq!(instr.code(), Code::Call_rel16);
    assert_eq!(instr.op(0), Operand::NearBranch16(0x1014));

    let instr = decode_at(Bitness::Bits64, "E9 FB FF FF FF", 0x2000);
    assert_eq!(instr.code(), Code::Jmp_rel32_64);
    assert_eq!(instr.near_branch_target(), Some(0x2000));
}

#[test]
fn test_stack_operand_size() {
    let instr = decode(Bitness::Bits64, "55");
    assert_eq!(instr.code(), Code::Push_r64);
    assert_eq!(instr.op_register(0), Register::RBP);

    let instr = decode(Bitness::Bits64, "66 55");
    assert_eq!(instr.code(), Code::Push_r16);
    assert_eq!(instr.op_register(0), Register::BP);

    let instr = decode(Bitness::Bits64, "41 5D");
    assert_eq!(instr.code(), Code::Pop_r64);
    assert_eq!(instr.op_register(0), Register::R13);

    let instr = decode(Bitness::Bits32, "6A FF");
    assert_eq!(instr.code(), Code::Pushd_imm8);
    assert_eq!(instr.immediate(0), Some(0xFFFF_FFFF));
}

#[test]
fn test_mov_register_immediates() {
    let instr = decode(Bitness::Bits64, "48 B8 8877665544332211");
    assert_eq!(instr.code(), Code::Mov_RAX_imm64);
    assert_eq!(instr.op_kind(1), OpKind::Immediate64);
    assert_eq!(instr.immediate(1), Some(0x1122_3344_5566_7788));
    assert_eq!(instr.len(), 10);

    let instr = decode(Bitness::Bits64, "BB 78 56 34 12");
    assert_eq!(instr.code(), Code::Mov_EBX_imm32);
    assert_eq!(instr.op_register(0), Register::EBX);
    assert_eq!(instr.immediate(1), Some(0x1234_5678));

    let instr = decode(Bitness::Bits16, "B4 7F");
    assert_eq!(instr.code(), Code::Mov_AH_imm8);
    assert_eq!(instr.op_register(0), Register::AH);
}

#[test]
fn test_alu_accumulator_forms() {
    let instr = decode(Bitness::Bits64, "48 3D 00 00 00 80");
    assert_eq!(instr.code(), Code::Cmp_RAX_imm32);
    assert_eq!(instr.op_register(0), Register::RAX);
    assert_eq!(instr.op_kind(1), OpKind::Immediate32to64);
    assert_eq!(instr.immediate(1), Some(0xFFFF_FFFF_8000_0000));

    let instr = decode(Bitness::Bits16, "25 34 12");
    assert_eq!(instr.code(), Code::And_AX_imm16);
    assert_eq!(instr.immediate(1), Some(0x1234));
}

// =============================================================================
// EVEX Masking, Broadcast, Rounding
// =============================================================================

#[test]
fn test_evex_plain_zmm_form() {
    let instr = decode(Bitness::Bits64, "62 F17C48 58 C2");
    assert_eq!(instr.code(), Code::EVEX_Vaddps_zmm_k1z_zmm_zmmm512b32_er);
    assert_eq!(instr.op_register(0), Register::ZMM0);
    assert_eq!(instr.op_register(1), Register::ZMM0);
    assert_eq!(instr.op_register(2), Register::ZMM2);
    assert_eq!(instr.rounding_control(), RoundingControl::None);
    assert!(!instr.suppress_all_exceptions());
    assert_eq!(instr.op_mask(), Register::None);
}

#[test]
fn test_evex_embedded_rounding() {
    let cases = [
        ("62 F17C18 58 C2", RoundingControl::RoundToNearest),
        ("62 F17C38 58 C2", RoundingControl::RoundDown),
        ("62 F17C58 58 C2", RoundingControl::RoundUp),
        ("62 F17C78 58 C2", RoundingControl::RoundTowardZero),
    ];
    for (hex, rc) in cases {
        let instr = decode(Bitness::Bits64, hex);
        // L'L is the rounding mode, the vector length is 512
        assert_eq!(instr.code(), Code::EVEX_Vaddps_zmm_k1z_zmm_zmmm512b32_er, "{hex}");
        assert_eq!(instr.op_register(2), Register::ZMM2);
        assert_eq!(instr.rounding_control(), rc, "{hex}");
        assert!(instr.suppress_all_exceptions());
        assert!(!instr.is_broadcast());
    }

    let instr = decode(Bitness::Bits64, "62 F17E38 58 C2");
    assert_eq!(instr.code(), Code::EVEX_Vaddss_xmm_k1z_xmm_xmmm32_er);
    assert_eq!(instr.op_register(0), Register::XMM0);
    assert_eq!(instr.rounding_control(), RoundingControl::RoundDown);
}

#[test]
fn test_evex_broadcast_memory() {
    let instr = decode(Bitness::Bits64, "62 F17C58 58 00");
    assert_eq!(instr.code(), Code::EVEX_Vaddps_zmm_k1z_zmm_zmmm512b32_er);
    assert_eq!(instr.memory_size(), MemorySize::Broadcast512_Float32);
    assert!(instr.is_broadcast());
    assert_eq!(instr.rounding_control(), RoundingControl::None);
    assert!(!instr.suppress_all_exceptions());

    // {k2}{z} with a broadcast disp8: N is the element size
    let instr = decode(Bitness::Bits64, "62 F17C9A 58 40 01");
    assert_eq!(instr.code(), Code::EVEX_Vaddps_xmm_k1z_xmm_xmmm128b32);
    assert_eq!(instr.memory_size(), MemorySize::Broadcast128_Float32);
    assert_eq!(instr.memory_displacement(), 4);
    assert_eq!(instr.op_mask(), Register::K2);
    assert!(instr.zeroing_masking());
}

#[test]
fn test_evex_full_vector_disp8() {
    // vaddpd zmm1, zmm2, [rax+0x40*1]
    let instr = decode(Bitness::Bits64, "62 F1ED48 58 48 01");
    assert_eq!(instr.code(), Code::EVEX_Vaddpd_zmm_k1z_zmm_zmmm512b64_er);
    assert_eq!(instr.op_register(0), Register::ZMM1);
    assert_eq!(instr.op_register(1), Register::ZMM2);
    assert_eq!(instr.memory_size(), MemorySize::Packed512_Float64);
    assert_eq!(instr.memory_displacement(), 0x40);
    assert_eq!(instr.memory_displ_size(), 1);
}

#[test]
fn test_evex_reserved_encodings() {
    // {z} without an opmask
    assert!(matches!(
        try_decode(Bitness::Bits64, "62 F17C88 58 C2"),
        Err(DecodeError::ReservedBitsSet { .. })
    ));
    assert_eq!(decode(Bitness::Bits64, "62 F17C88 58 C2").len(), 6);
    assert_eq!(decode(Bitness::Bits64, "62 F17CC8 58 C3").len(), 6);

    // EVEX.b on a register form without {er}/{sae}
    assert!(matches!(
        try_decode(Bitness::Bits64, "62 F17C18 C6 C2 01"),
        Err(DecodeError::ReservedBitsSet { .. })
    ));

    // Opmask on an instruction that takes none
    assert!(matches!(
        try_decode(Bitness::Bits64, "62 F17D09 C5 C2 01"),
        Err(DecodeError::ReservedBitsSet { .. })
    ));
}

#[test]
fn test_evex_register_extensions() {
    // EVEX.B clear: xmm10 in 64-bit mode, ignored elsewhere
    let instr = decode(Bitness::Bits64, "62 D17C08 58 C2");
    assert_eq!(instr.op_register(2), Register::XMM10);
    let instr = decode(Bitness::Bits32, "62 D17C08 58 C2");
    assert_eq!(instr.op_register(2), Register::XMM2);

    // EVEX.R' clear selects a general-purpose register above r15
    assert!(matches!(
        try_decode(Bitness::Bits64, "62 E17D08 C5 C2 01"),
        Err(DecodeError::RegisterOutOfRange { .. })
    ));
    let instr = decode(Bitness::Bits32, "62 E17D08 C5 C2 01");
    assert_eq!(instr.code(), Code::EVEX_Vpextrw_r32_xmm_imm8);
    assert_eq!(instr.op_register(0), Register::EAX);
}

#[test]
fn test_vvvv_must_be_unused() {
    // VPEXTRW has no vvvv operand
    let instr = decode(Bitness::Bits64, "C5F1 C5 C2 01");
    assert_eq!(instr.code(), Code::INVALID);
    assert_eq!(instr.len(), 5);
    assert_eq!(decode(Bitness::Bits64, "C5B9 C5 C0 01").len(), 5);
    assert!(matches!(
        try_decode(Bitness::Bits64, "C5F1 C5 C2 01"),
        Err(DecodeError::ReservedBitsSet { .. })
    ));
    let instr = decode(Bitness::Bits64, "C5F9 C5 C2 01");
    assert_eq!(instr.code(), Code::VEX_Vpextrw_r32_xmm_imm8);
}

// =============================================================================
// Constant Offsets
// =============================================================================

#[test]
fn test_immediate_offsets() {
    let instr = decode(Bitness::Bits32, "68 5A A5 12 34");
    assert_eq!(instr.code(), Code::Pushd_imm32);
    let offsets = instr.constant_offsets();
    assert_eq!((offsets.immediate_offset, offsets.immediate_size), (1, 4));
    assert!(!offsets.has_displacement());
}

#[test]
fn test_displacement_offsets() {
    let instr = decode(Bitness::Bits32, "01 48 5A");
    let offsets = instr.constant_offsets();
    assert_eq!((offsets.displacement_offset, offsets.displacement_size), (2, 1));
    assert!(!offsets.has_immediate());

    // Displacement and immediate together
    let instr = decode(Bitness::Bits64, "48 81 84 C8 78 56 34 12 44 33 22 11");
    assert_eq!(instr.code(), Code::Add_rm64_imm32);
    let offsets = instr.constant_offsets();
    assert_eq!((offsets.displacement_offset, offsets.displacement_size), (4, 4));
    assert_eq!((offsets.immediate_offset, offsets.immediate_size), (8, 4));
    assert_eq!(instr.len(), 12);
}

#[test]
fn test_branch_offsets() {
    let instr = decode(Bitness::Bits64, "0F1F 00");
    assert_eq!(instr.constant_offsets(), Default::default());
    let instr = decode(Bitness::Bits64, "E8 00 00 00 00");
    let offsets = instr.constant_offsets();
    assert_eq!((offsets.immediate_offset, offsets.immediate_size), (1, 4));
}
