//! Property-based tests for the x86 decoder.
//!
//! These tests verify invariants that should hold for any input:
//! - Decoding never panics on arbitrary input
//! - The decoded length is within bounds and never exceeds the input
//! - Deterministic decoding (same input → same output)
//! - Trailing bytes never change an instruction
//! - Extension bits are ignored outside 64-bit mode

use proptest::prelude::*;

use xdec_core::{Bitness, Code, Instruction};
use xdec_disasm::traits::Disassembler;
use xdec_disasm::{Decoder, X86Disassembler, MAX_INSTRUCTION_LENGTH};

fn bitness() -> impl Strategy<Value = Bitness> {
    prop_oneof![Just(Bitness::Bits16), Just(Bitness::Bits32), Just(Bitness::Bits64)]
}

fn decode(bitness: Bitness, bytes: &[u8], ip: u64) -> Instruction {
    Decoder::new(bitness, bytes, ip).decode()
}

// =============================================================================
// Decoder Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(10000))]

    /// Decoding arbitrary bytes should never panic.
    #[test]
    fn decode_never_panics(bitness in bitness(), bytes in prop::collection::vec(any::<u8>(), 0..32)) {
        let _ = Decoder::new(bitness, &bytes, 0x1000).try_decode();
    }

    /// The decoded length stays within the input and the 15-byte limit.
    #[test]
    fn decoded_length_is_bounded(bitness in bitness(), bytes in prop::collection::vec(any::<u8>(), 1..32)) {
        let mut decoder = Decoder::new(bitness, &bytes, 0x1000);
        let instr = decoder.decode();
        prop_assert!(instr.len() <= MAX_INSTRUCTION_LENGTH, "Instruction is {} bytes", instr.len());
        prop_assert!(instr.len() <= bytes.len(), "Instruction length cannot exceed input length");
        prop_assert_eq!(decoder.position(), instr.len());
        if instr.code() != Code::INVALID {
            prop_assert!(!instr.is_empty(), "Valid instructions consume at least one byte");
        }
    }

    /// Decoding is deterministic: same input always produces same output.
    #[test]
    fn decode_is_deterministic(bitness in bitness(), bytes in prop::collection::vec(any::<u8>(), 1..32)) {
        let first = decode(bitness, &bytes, 0x1000);
        let second = decode(bitness, &bytes, 0x1000);
        prop_assert_eq!(first, second);
    }

    /// A valid instruction decodes identically with extra bytes after it.
    #[test]
    fn trailing_bytes_are_never_read(
        bitness in bitness(),
        bytes in prop::collection::vec(any::<u8>(), 1..16),
        tail in prop::collection::vec(any::<u8>(), 1..16)
    ) {
        let instr = decode(bitness, &bytes, 0);
        if instr.code() != Code::INVALID {
            let mut longer = bytes[..instr.len()].to_vec();
            longer.extend_from_slice(&tail);
            prop_assert_eq!(decode(bitness, &longer, 0), instr);
        }
    }

    /// `decode` and `try_decode` agree.
    #[test]
    fn try_decode_matches_decode(bitness in bitness(), bytes in prop::collection::vec(any::<u8>(), 0..24)) {
        let instr = decode(bitness, &bytes, 0x40_0000);
        match Decoder::new(bitness, &bytes, 0x40_0000).try_decode() {
            Ok(ok) => prop_assert_eq!(ok, instr),
            Err(_) => prop_assert_eq!(instr.code(), Code::INVALID),
        }
    }

    /// The starting address only moves branch targets and RIP-relative
    /// displacements, never the decoded code or length.
    #[test]
    fn address_does_not_change_decoding(
        bitness in bitness(),
        bytes in prop::collection::vec(any::<u8>(), 1..24),
        addr in any::<u64>()
    ) {
        let base = decode(bitness, &bytes, 0);
        let moved = decode(bitness, &bytes, addr);
        prop_assert_eq!(base.code(), moved.code());
        prop_assert_eq!(base.len(), moved.len());
        prop_assert_eq!(moved.ip(), addr);
    }

    /// Sequential decoding covers all bytes (no gaps or overlaps).
    #[test]
    fn sequential_decode_covers_all_bytes(bitness in bitness(), bytes in prop::collection::vec(any::<u8>(), 16..128)) {
        let mut decoder = Decoder::new(bitness, &bytes, 0x1000);
        let mut covered = 0;
        while decoder.can_decode() {
            let start = decoder.position();
            let instr = decoder.decode();
            prop_assert_eq!(instr.ip(), 0x1000 + start as u64);
            // Invalid instructions still consume what was read
            prop_assert!(!instr.is_empty(), "No progress at offset {}", start);
            covered += decoder.position() - start;
        }
        prop_assert_eq!(covered, bytes.len());
    }
}

// =============================================================================
// Specific Encoding Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// REX bytes are INC/DEC outside 64-bit mode.
    #[test]
    fn rex_is_an_opcode_outside_64bit(rex in 0x40u8..=0x4F, rest in prop::collection::vec(any::<u8>(), 0..8)) {
        let mut bytes = vec![rex];
        bytes.extend_from_slice(&rest);
        let instr = decode(Bitness::Bits32, &bytes, 0);
        prop_assert_eq!(instr.len(), 1);
        let expected = if rex < 0x48 { Code::Inc_r32 } else { Code::Dec_r32 };
        prop_assert_eq!(instr.code(), expected);
    }

    /// EVEX.R', EVEX.B and EVEX.X are ignored outside 64-bit mode.
    #[test]
    fn evex_extensions_ignored_outside_64bit(ext in 0u8..4, modrm_reg in 0u8..8, modrm_rm in 0u8..8) {
        // vaddps xmm, xmm0, xmm with the B and R' bits varied
        let p0 = 0xC1 | (ext << 4);
        let modrm = 0xC0 | (modrm_reg << 3) | modrm_rm;
        let plain = decode(Bitness::Bits32, &[0x62, 0xF1, 0x7C, 0x08, 0x58, modrm], 0);
        let extended = decode(Bitness::Bits32, &[0x62, p0, 0x7C, 0x08, 0x58, modrm], 0);
        prop_assert_eq!(plain, extended);
    }

    /// Segment prefixes never make a valid instruction invalid.
    #[test]
    fn segment_prefixes_are_transparent(
        bitness in bitness(),
        segment in prop::sample::select(vec![0x26u8, 0x2E, 0x36, 0x3E, 0x64, 0x65]),
        bytes in prop::collection::vec(any::<u8>(), 1..12)
    ) {
        let plain = decode(bitness, &bytes, 0);
        let mut prefixed = vec![segment];
        prefixed.extend_from_slice(&bytes);
        let instr = decode(bitness, &prefixed, 0);
        if plain.code() != Code::INVALID && plain.len() < MAX_INSTRUCTION_LENGTH {
            prop_assert_eq!(instr.code(), plain.code());
            prop_assert_eq!(instr.len(), plain.len() + 1);
        }
    }

    /// The trait front end agrees with the decoder.
    #[test]
    fn disassembler_trait_matches_decoder(bitness in bitness(), bytes in prop::collection::vec(any::<u8>(), 1..24)) {
        let disasm = X86Disassembler::new(bitness);
        let instr = decode(bitness, &bytes, 0x2000);
        match disasm.decode_instruction(&bytes, 0x2000) {
            Ok(ok) => prop_assert_eq!(ok, instr),
            Err(_) => prop_assert!(instr.is_invalid()),
        }
    }
}
