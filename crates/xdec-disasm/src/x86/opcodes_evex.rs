//! EVEX-encoded 0F map.
//!
//! Packed forms accept `{k1}{z}` and embedded broadcast; the 512-bit packed
//! and the scalar forms additionally take `{er}` or `{sae}` on register operands.

use super::opcodes::{OpEntry, Op, Template, ER, K1, SAE, Z};
use xdec_core::{Code, MemorySize};

const K1Z: u8 = K1 | Z;

static VADDPS: [OpEntry; 4] = [
    OpEntry::Plain(
        Template::fixed(Code::EVEX_Vaddps_xmm_k1z_xmm_xmmm128b32, &[Op::Vx, Op::Hx, Op::Wx])
            .mem(MemorySize::Packed128_Float32)
            .bcst(MemorySize::Broadcast128_Float32)
            .flags(K1Z),
    ),
    OpEntry::Plain(
        Template::fixed(Code::EVEX_Vaddps_ymm_k1z_ymm_ymmm256b32, &[Op::Vy, Op::Hy, Op::Wy])
            .mem(MemorySize::Packed256_Float32)
            .bcst(MemorySize::Broadcast256_Float32)
            .flags(K1Z),
    ),
    OpEntry::Plain(
        Template::fixed(Code::EVEX_Vaddps_zmm_k1z_zmm_zmmm512b32_er, &[Op::Vz, Op::Hz, Op::Wz])
            .mem(MemorySize::Packed512_Float32)
            .bcst(MemorySize::Broadcast512_Float32)
            .flags(K1Z | ER),
    ),
    OpEntry::Invalid,
];

static VADDPD: [OpEntry; 4] = [
    OpEntry::Plain(
        Template::fixed(Code::EVEX_Vaddpd_xmm_k1z_xmm_xmmm128b64, &[Op::Vx, Op::Hx, Op::Wx])
            .mem(MemorySize::Packed128_Float64)
            .bcst(MemorySize::Broadcast128_Float64)
            .flags(K1Z),
    ),
    OpEntry::Plain(
        Template::fixed(Code::EVEX_Vaddpd_ymm_k1z_ymm_ymmm256b64, &[Op::Vy, Op::Hy, Op::Wy])
            .mem(MemorySize::Packed256_Float64)
            .bcst(MemorySize::Broadcast256_Float64)
            .flags(K1Z),
    ),
    OpEntry::Plain(
        Template::fixed(Code::EVEX_Vaddpd_zmm_k1z_zmm_zmmm512b64_er, &[Op::Vz, Op::Hz, Op::Wz])
            .mem(MemorySize::Packed512_Float64)
            .bcst(MemorySize::Broadcast512_Float64)
            .flags(K1Z | ER),
    ),
    OpEntry::Invalid,
];

static VADDPS_W: [OpEntry; 2] = [OpEntry::LengthEr(&VADDPS), OpEntry::Invalid];
static VADDPD_W: [OpEntry; 2] = [OpEntry::Invalid, OpEntry::LengthEr(&VADDPD)];
static VADDSS_W: [OpEntry; 2] = [
    OpEntry::Plain(
        Template::fixed(Code::EVEX_Vaddss_xmm_k1z_xmm_xmmm32_er, &[Op::Vx, Op::Hx, Op::Wx])
            .mem(MemorySize::Float32)
            .flags(K1Z | ER),
    ),
    OpEntry::Invalid,
];
static VADDSD_W: [OpEntry; 2] = [
    OpEntry::Invalid,
    OpEntry::Plain(
        Template::fixed(Code::EVEX_Vaddsd_xmm_k1z_xmm_xmmm64_er, &[Op::Vx, Op::Hx, Op::Wx])
            .mem(MemorySize::Float64)
            .flags(K1Z | ER),
    ),
];

static OPCODE_58: [OpEntry; 4] = [
    OpEntry::W(&VADDPS_W),
    OpEntry::W(&VADDPD_W),
    OpEntry::W(&VADDSS_W),
    OpEntry::W(&VADDSD_W),
];

#[rustfmt::skip]
static VCMPPS: [OpEntry; 4] = [
    OpEntry::Plain(
        Template::fixed(Code::EVEX_Vcmpps_k_k1_xmm_xmmm128b32_imm8, &[Op::Kr, Op::Hx, Op::Wx, Op::Ib])
            .mem(MemorySize::Packed128_Float32)
            .bcst(MemorySize::Broadcast128_Float32)
            .flags(K1),
    ),
    OpEntry::Plain(
        Template::fixed(Code::EVEX_Vcmpps_k_k1_ymm_ymmm256b32_imm8, &[Op::Kr, Op::Hy, Op::Wy, Op::Ib])
            .mem(MemorySize::Packed256_Float32)
            .bcst(MemorySize::Broadcast256_Float32)
            .flags(K1),
    ),
    OpEntry::Plain(
        Template::fixed(Code::EVEX_Vcmpps_k_k1_zmm_zmmm512b32_imm8_sae, &[Op::Kr, Op::Hz, Op::Wz, Op::Ib])
            .mem(MemorySize::Packed512_Float32)
            .bcst(MemorySize::Broadcast512_Float32)
            .flags(K1 | SAE),
    ),
    OpEntry::Invalid,
];

#[rustfmt::skip]
static VCMPPD: [OpEntry; 4] = [
    OpEntry::Plain(
        Template::fixed(Code::EVEX_Vcmppd_k_k1_xmm_xmmm128b64_imm8, &[Op::Kr, Op::Hx, Op::Wx, Op::Ib])
            .mem(MemorySize::Packed128_Float64)
            .bcst(MemorySize::Broadcast128_Float64)
            .flags(K1),
    ),
    OpEntry::Plain(
        Template::fixed(Code::EVEX_Vcmppd_k_k1_ymm_ymmm256b64_imm8, &[Op::Kr, Op::Hy, Op::Wy, Op::Ib])
            .mem(MemorySize::Packed256_Float64)
            .bcst(MemorySize::Broadcast256_Float64)
            .flags(K1),
    ),
    OpEntry::Plain(
        Template::fixed(Code::EVEX_Vcmppd_k_k1_zmm_zmmm512b64_imm8_sae, &[Op::Kr, Op::Hz, Op::Wz, Op::Ib])
            .mem(MemorySize::Packed512_Float64)
            .bcst(MemorySize::Broadcast512_Float64)
            .flags(K1 | SAE),
    ),
    OpEntry::Invalid,
];

static VCMPPS_W: [OpEntry; 2] = [OpEntry::LengthEr(&VCMPPS), OpEntry::Invalid];
static VCMPPD_W: [OpEntry; 2] = [OpEntry::Invalid, OpEntry::LengthEr(&VCMPPD)];
// Scalar compares ignore L'L
#[rustfmt::skip]
static VCMPSS_W: [OpEntry; 2] = [
    OpEntry::Plain(
        Template::fixed(Code::EVEX_Vcmpss_k_k1_xmm_xmmm32_imm8_sae, &[Op::Kr, Op::Hx, Op::Wx, Op::Ib])
            .mem(MemorySize::Float32)
            .flags(K1 | SAE),
    ),
    OpEntry::Invalid,
];
#[rustfmt::skip]
static VCMPSD_W: [OpEntry; 2] = [
    OpEntry::Invalid,
    OpEntry::Plain(
        Template::fixed(Code::EVEX_Vcmpsd_k_k1_xmm_xmmm64_imm8_sae, &[Op::Kr, Op::Hx, Op::Wx, Op::Ib])
            .mem(MemorySize::Float64)
            .flags(K1 | SAE),
    ),
];

static OPCODE_C2: [OpEntry; 4] = [
    OpEntry::W(&VCMPPS_W),
    OpEntry::W(&VCMPPD_W),
    OpEntry::W(&VCMPSS_W),
    OpEntry::W(&VCMPSD_W),
];

static VPINSRW: [OpEntry; 4] = [
    OpEntry::Plain(
        Template::by_w(
            Code::EVEX_Vpinsrw_xmm_xmm_r32m16_imm8,
            Code::EVEX_Vpinsrw_xmm_xmm_r64m16_imm8,
            &[Op::Vx, Op::Hx, Op::Ev, Op::Ib],
        )
        .mem(MemorySize::UInt16),
    ),
    OpEntry::Invalid,
    OpEntry::Invalid,
    OpEntry::Invalid,
];

static OPCODE_C4: [OpEntry; 4] = [
    OpEntry::Invalid,
    OpEntry::Length(&VPINSRW),
    OpEntry::Invalid,
    OpEntry::Invalid,
];

static VPEXTRW: [OpEntry; 4] = [
    OpEntry::Plain(Template::by_w(
        Code::EVEX_Vpextrw_r32_xmm_imm8,
        Code::EVEX_Vpextrw_r64_xmm_imm8,
        &[Op::Gv, Op::Ux, Op::Ib],
    )),
    OpEntry::Invalid,
    OpEntry::Invalid,
    OpEntry::Invalid,
];

static OPCODE_C5: [OpEntry; 4] = [
    OpEntry::Invalid,
    OpEntry::Length(&VPEXTRW),
    OpEntry::Invalid,
    OpEntry::Invalid,
];

#[rustfmt::skip]
static VSHUFPS: [OpEntry; 4] = [
    OpEntry::Plain(
        Template::fixed(Code::EVEX_Vshufps_xmm_k1z_xmm_xmmm128b32_imm8, &[Op::Vx, Op::Hx, Op::Wx, Op::Ib])
            .mem(MemorySize::Packed128_Float32)
            .bcst(MemorySize::Broadcast128_Float32)
            .flags(K1Z),
    ),
    OpEntry::Plain(
        Template::fixed(Code::EVEX_Vshufps_ymm_k1z_ymm_ymmm256b32_imm8, &[Op::Vy, Op::Hy, Op::Wy, Op::Ib])
            .mem(MemorySize::Packed256_Float32)
            .bcst(MemorySize::Broadcast256_Float32)
            .flags(K1Z),
    ),
    OpEntry::Plain(
        Template::fixed(Code::EVEX_Vshufps_zmm_k1z_zmm_zmmm512b32_imm8, &[Op::Vz, Op::Hz, Op::Wz, Op::Ib])
            .mem(MemorySize::Packed512_Float32)
            .bcst(MemorySize::Broadcast512_Float32)
            .flags(K1Z),
    ),
    OpEntry::Invalid,
];

#[rustfmt::skip]
static VSHUFPD: [OpEntry; 4] = [
    OpEntry::Plain(
        Template::fixed(Code::EVEX_Vshufpd_xmm_k1z_xmm_xmmm128b64_imm8, &[Op::Vx, Op::Hx, Op::Wx, Op::Ib])
            .mem(MemorySize::Packed128_Float64)
            .bcst(MemorySize::Broadcast128_Float64)
            .flags(K1Z),
    ),
    OpEntry::Plain(
        Template::fixed(Code::EVEX_Vshufpd_ymm_k1z_ymm_ymmm256b64_imm8, &[Op::Vy, Op::Hy, Op::Wy, Op::Ib])
            .mem(MemorySize::Packed256_Float64)
            .bcst(MemorySize::Broadcast256_Float64)
            .flags(K1Z),
    ),
    OpEntry::Plain(
        Template::fixed(Code::EVEX_Vshufpd_zmm_k1z_zmm_zmmm512b64_imm8, &[Op::Vz, Op::Hz, Op::Wz, Op::Ib])
            .mem(MemorySize::Packed512_Float64)
            .bcst(MemorySize::Broadcast512_Float64)
            .flags(K1Z),
    ),
    OpEntry::Invalid,
];

static VSHUFPS_W: [OpEntry; 2] = [OpEntry::Length(&VSHUFPS), OpEntry::Invalid];
static VSHUFPD_W: [OpEntry; 2] = [OpEntry::Invalid, OpEntry::Length(&VSHUFPD)];

static OPCODE_C6: [OpEntry; 4] = [
    OpEntry::W(&VSHUFPS_W),
    OpEntry::W(&VSHUFPD_W),
    OpEntry::Invalid,
    OpEntry::Invalid,
];

/// EVEX map 1 (0F xx).
pub static EVEX_0F: [OpEntry; 256] = {
    let mut table = [OpEntry::Invalid; 256];
    table[0x58] = OpEntry::Prefix {
        table: &OPCODE_58,
        keep_66: false,
    };
    table[0xC2] = OpEntry::Prefix {
        table: &OPCODE_C2,
        keep_66: false,
    };
    table[0xC4] = OpEntry::Prefix {
        table: &OPCODE_C4,
        keep_66: false,
    };
    table[0xC5] = OpEntry::Prefix {
        table: &OPCODE_C5,
        keep_66: false,
    };
    table[0xC6] = OpEntry::Prefix {
        table: &OPCODE_C6,
        keep_66: false,
    };
    table
};
