//! VEX-encoded 0F map.

use super::opcodes::{OpEntry, Op, Template};
use xdec_core::{Code, MemorySize};

#[rustfmt::skip]
static VADDPS: [OpEntry; 4] = [
    OpEntry::Plain(
        Template::fixed(Code::VEX_Vaddps_xmm_xmm_xmmm128, &[Op::Vx, Op::Hx, Op::Wx]).mem(MemorySize::Packed128_Float32),
    ),
    OpEntry::Plain(
        Template::fixed(Code::VEX_Vaddps_ymm_ymm_ymmm256, &[Op::Vy, Op::Hy, Op::Wy]).mem(MemorySize::Packed256_Float32),
    ),
    OpEntry::Invalid,
    OpEntry::Invalid,
];

#[rustfmt::skip]
static VADDPD: [OpEntry; 4] = [
    OpEntry::Plain(
        Template::fixed(Code::VEX_Vaddpd_xmm_xmm_xmmm128, &[Op::Vx, Op::Hx, Op::Wx]).mem(MemorySize::Packed128_Float64),
    ),
    OpEntry::Plain(
        Template::fixed(Code::VEX_Vaddpd_ymm_ymm_ymmm256, &[Op::Vy, Op::Hy, Op::Wy]).mem(MemorySize::Packed256_Float64),
    ),
    OpEntry::Invalid,
    OpEntry::Invalid,
];

#[rustfmt::skip]
static OPCODE_58: [OpEntry; 4] = [
    OpEntry::Length(&VADDPS),
    OpEntry::Length(&VADDPD),
    OpEntry::Plain(Template::fixed(Code::VEX_Vaddss_xmm_xmm_xmmm32, &[Op::Vx, Op::Hx, Op::Wx]).mem(MemorySize::Float32)),
    OpEntry::Plain(Template::fixed(Code::VEX_Vaddsd_xmm_xmm_xmmm64, &[Op::Vx, Op::Hx, Op::Wx]).mem(MemorySize::Float64)),
];

static VCMPPS: [OpEntry; 4] = [
    OpEntry::Plain(
        Template::fixed(Code::VEX_Vcmpps_xmm_xmm_xmmm128_imm8, &[Op::Vx, Op::Hx, Op::Wx, Op::Ib])
            .mem(MemorySize::Packed128_Float32),
    ),
    OpEntry::Plain(
        Template::fixed(Code::VEX_Vcmpps_ymm_ymm_ymmm256_imm8, &[Op::Vy, Op::Hy, Op::Wy, Op::Ib])
            .mem(MemorySize::Packed256_Float32),
    ),
    OpEntry::Invalid,
    OpEntry::Invalid,
];

static VCMPPD: [OpEntry; 4] = [
    OpEntry::Plain(
        Template::fixed(Code::VEX_Vcmppd_xmm_xmm_xmmm128_imm8, &[Op::Vx, Op::Hx, Op::Wx, Op::Ib])
            .mem(MemorySize::Packed128_Float64),
    ),
    OpEntry::Plain(
        Template::fixed(Code::VEX_Vcmppd_ymm_ymm_ymmm256_imm8, &[Op::Vy, Op::Hy, Op::Wy, Op::Ib])
            .mem(MemorySize::Packed256_Float64),
    ),
    OpEntry::Invalid,
    OpEntry::Invalid,
];

// Scalar compares ignore VEX.L
#[rustfmt::skip]
static OPCODE_C2: [OpEntry; 4] = [
    OpEntry::Length(&VCMPPS),
    OpEntry::Length(&VCMPPD),
    OpEntry::Plain(
        Template::fixed(Code::VEX_Vcmpss_xmm_xmm_xmmm32_imm8, &[Op::Vx, Op::Hx, Op::Wx, Op::Ib]).mem(MemorySize::Float32),
    ),
    OpEntry::Plain(
        Template::fixed(Code::VEX_Vcmpsd_xmm_xmm_xmmm64_imm8, &[Op::Vx, Op::Hx, Op::Wx, Op::Ib]).mem(MemorySize::Float64),
    ),
];

static VPINSRW: [OpEntry; 4] = [
    OpEntry::Plain(
        Template::by_w(
            Code::VEX_Vpinsrw_xmm_xmm_r32m16_imm8,
            Code::VEX_Vpinsrw_xmm_xmm_r64m16_imm8,
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
        Code::VEX_Vpextrw_r32_xmm_imm8,
        Code::VEX_Vpextrw_r64_xmm_imm8,
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

static VSHUFPS: [OpEntry; 4] = [
    OpEntry::Plain(
        Template::fixed(Code::VEX_Vshufps_xmm_xmm_xmmm128_imm8, &[Op::Vx, Op::Hx, Op::Wx, Op::Ib])
            .mem(MemorySize::Packed128_Float32),
    ),
    OpEntry::Plain(
        Template::fixed(Code::VEX_Vshufps_ymm_ymm_ymmm256_imm8, &[Op::Vy, Op::Hy, Op::Wy, Op::Ib])
            .mem(MemorySize::Packed256_Float32),
    ),
    OpEntry::Invalid,
    OpEntry::Invalid,
];

static VSHUFPD: [OpEntry; 4] = [
    OpEntry::Plain(
        Template::fixed(Code::VEX_Vshufpd_xmm_xmm_xmmm128_imm8, &[Op::Vx, Op::Hx, Op::Wx, Op::Ib])
            .mem(MemorySize::Packed128_Float64),
    ),
    OpEntry::Plain(
        Template::fixed(Code::VEX_Vshufpd_ymm_ymm_ymmm256_imm8, &[Op::Vy, Op::Hy, Op::Wy, Op::Ib])
            .mem(MemorySize::Packed256_Float64),
    ),
    OpEntry::Invalid,
    OpEntry::Invalid,
];

static OPCODE_C6: [OpEntry; 4] = [
    OpEntry::Length(&VSHUFPS),
    OpEntry::Length(&VSHUFPD),
    OpEntry::Invalid,
    OpEntry::Invalid,
];

/// VEX map 1 (0F xx).
pub static VEX_0F: [OpEntry; 256] = {
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
