//! Two-byte opcode map (0F xx), legacy encoding.

use super::opcodes::{OpEntry, Op, Template, INVALID, LOCK};
use xdec_core::{Code, MemorySize};

const SIZES_V: [MemorySize; 3] = [MemorySize::UInt16, MemorySize::UInt32, MemorySize::UInt64];

#[rustfmt::skip]
static OPCODE_10: [OpEntry; 4] = [
    OpEntry::Plain(Template::fixed(Code::Movups_xmm_xmmm128, &[Op::Vx, Op::Wx]).mem(MemorySize::Packed128_Float32)),
    OpEntry::Plain(Template::fixed(Code::Movupd_xmm_xmmm128, &[Op::Vx, Op::Wx]).mem(MemorySize::Packed128_Float64)),
    OpEntry::Plain(Template::fixed(Code::Movss_xmm_xmmm32, &[Op::Vx, Op::Wx]).mem(MemorySize::Float32)),
    OpEntry::Plain(Template::fixed(Code::Movsd_xmm_xmmm64, &[Op::Vx, Op::Wx]).mem(MemorySize::Float64)),
];

#[rustfmt::skip]
static OPCODE_58: [OpEntry; 4] = [
    OpEntry::Plain(Template::fixed(Code::Addps_xmm_xmmm128, &[Op::Vx, Op::Wx]).mem(MemorySize::Packed128_Float32)),
    OpEntry::Plain(Template::fixed(Code::Addpd_xmm_xmmm128, &[Op::Vx, Op::Wx]).mem(MemorySize::Packed128_Float64)),
    OpEntry::Plain(Template::fixed(Code::Addss_xmm_xmmm32, &[Op::Vx, Op::Wx]).mem(MemorySize::Float32)),
    OpEntry::Plain(Template::fixed(Code::Addsd_xmm_xmmm64, &[Op::Vx, Op::Wx]).mem(MemorySize::Float64)),
];

#[rustfmt::skip]
static OPCODE_C2: [OpEntry; 4] = [
    OpEntry::Plain(
        Template::fixed(Code::Cmpps_xmm_xmmm128_imm8, &[Op::Vx, Op::Wx, Op::Ib]).mem(MemorySize::Packed128_Float32),
    ),
    OpEntry::Plain(
        Template::fixed(Code::Cmppd_xmm_xmmm128_imm8, &[Op::Vx, Op::Wx, Op::Ib]).mem(MemorySize::Packed128_Float64),
    ),
    OpEntry::Plain(Template::fixed(Code::Cmpss_xmm_xmmm32_imm8, &[Op::Vx, Op::Wx, Op::Ib]).mem(MemorySize::Float32)),
    OpEntry::Plain(Template::fixed(Code::Cmpsd_xmm_xmmm64_imm8, &[Op::Vx, Op::Wx, Op::Ib]).mem(MemorySize::Float64)),
];

static MOVNTI: OpEntry = OpEntry::Plain(
    Template::by_w(Code::Movnti_m32_r32, Code::Movnti_m64_r64, &[Op::M, Op::Gv])
        .mems([MemorySize::Unknown, MemorySize::UInt32, MemorySize::UInt64]),
);

#[rustfmt::skip]
static OPCODE_C4: [OpEntry; 4] = [
    OpEntry::Plain(
        Template::by_w(Code::Pinsrw_mm_r32m16_imm8, Code::Pinsrw_mm_r64m16_imm8, &[Op::P, Op::Ev, Op::Ib])
            .mem(MemorySize::UInt16),
    ),
    OpEntry::Plain(
        Template::by_w(Code::Pinsrw_xmm_r32m16_imm8, Code::Pinsrw_xmm_r64m16_imm8, &[Op::Vx, Op::Ev, Op::Ib])
            .mem(MemorySize::UInt16),
    ),
    OpEntry::Invalid,
    OpEntry::Invalid,
];

#[rustfmt::skip]
static OPCODE_C5: [OpEntry; 4] = [
    OpEntry::Plain(Template::by_w(Code::Pextrw_r32_mm_imm8, Code::Pextrw_r64_mm_imm8, &[Op::Gv, Op::N, Op::Ib])),
    OpEntry::Plain(Template::by_w(Code::Pextrw_r32_xmm_imm8, Code::Pextrw_r64_xmm_imm8, &[Op::Gv, Op::Ux, Op::Ib])),
    OpEntry::Invalid,
    OpEntry::Invalid,
];

#[rustfmt::skip]
static OPCODE_C6: [OpEntry; 4] = [
    OpEntry::Plain(
        Template::fixed(Code::Shufps_xmm_xmmm128_imm8, &[Op::Vx, Op::Wx, Op::Ib]).mem(MemorySize::Packed128_Float32),
    ),
    OpEntry::Plain(
        Template::fixed(Code::Shufpd_xmm_xmmm128_imm8, &[Op::Vx, Op::Wx, Op::Ib]).mem(MemorySize::Packed128_Float64),
    ),
    OpEntry::Invalid,
    OpEntry::Invalid,
];

// 0F C7 /6 and /7, memory forms
static VMPTRLD_VMCLEAR_VMXON: [OpEntry; 4] = [
    OpEntry::Plain(Template::fixed(Code::Vmptrld_m64, &[Op::M]).mem(MemorySize::UInt64)),
    OpEntry::Plain(Template::fixed(Code::Vmclear_m64, &[Op::M]).mem(MemorySize::UInt64)),
    OpEntry::Plain(Template::fixed(Code::Vmxon_m64, &[Op::M]).mem(MemorySize::UInt64)),
    OpEntry::Invalid,
];

static VMPTRST: [OpEntry; 4] = [
    OpEntry::Plain(Template::fixed(Code::Vmptrst_m64, &[Op::M]).mem(MemorySize::UInt64)),
    OpEntry::Invalid,
    OpEntry::Invalid,
    OpEntry::Invalid,
];

static GROUP_C7_MEM: [OpEntry; 8] = [
    OpEntry::Invalid,
    OpEntry::Plain(
        Template::by_w(Code::Cmpxchg8b_m64, Code::Cmpxchg16b_m128, &[Op::M])
            .mems([MemorySize::Unknown, MemorySize::UInt64, MemorySize::UInt128])
            .lock(),
    ),
    OpEntry::Invalid,
    OpEntry::Plain(
        Template::by_w(Code::Xrstors_m0, Code::Xrstors64_m0, &[Op::M])
            .mems([MemorySize::Unknown, MemorySize::Xsave, MemorySize::Xsave64]),
    ),
    OpEntry::Plain(
        Template::by_w(Code::Xsavec_m0, Code::Xsavec64_m0, &[Op::M])
            .mems([MemorySize::Unknown, MemorySize::Xsave, MemorySize::Xsave64]),
    ),
    OpEntry::Plain(
        Template::by_w(Code::Xsaves_m0, Code::Xsaves64_m0, &[Op::M])
            .mems([MemorySize::Unknown, MemorySize::Xsave, MemorySize::Xsave64]),
    ),
    OpEntry::Prefix {
        table: &VMPTRLD_VMCLEAR_VMXON,
        keep_66: false,
    },
    OpEntry::Prefix {
        table: &VMPTRST,
        keep_66: false,
    },
];

// 0F C7 /7, register forms: RDSEED keeps the 66h operand size, F3h selects RDPID
#[rustfmt::skip]
static RDSEED_RDPID: [OpEntry; 4] = [
    OpEntry::Plain(Template::op_size([Code::Rdseed_r16, Code::Rdseed_r32, Code::Rdseed_r64], &[Op::Ev])),
    OpEntry::Plain(Template::op_size([Code::Rdseed_r16, Code::Rdseed_r32, Code::Rdseed_r64], &[Op::Ev])),
    OpEntry::Plain(Template::by_mode(Code::Rdpid_r32, Code::Rdpid_r64, &[Op::Ev])),
    OpEntry::Invalid,
];

#[rustfmt::skip]
static GROUP_C7_REG: [OpEntry; 8] = [
    OpEntry::Invalid,
    OpEntry::Invalid,
    OpEntry::Invalid,
    OpEntry::Invalid,
    OpEntry::Invalid,
    OpEntry::Invalid,
    OpEntry::Plain(Template::op_size([Code::Rdrand_r16, Code::Rdrand_r32, Code::Rdrand_r64], &[Op::Ev])),
    OpEntry::Prefix {
        table: &RDSEED_RDPID,
        keep_66: true,
    },
];

static C7_MEM: OpEntry = OpEntry::Group(&GROUP_C7_MEM);
static C7_REG: OpEntry = OpEntry::Group(&GROUP_C7_REG);

/// 0F xx, legacy encoding.
#[rustfmt::skip]
pub static MAP_0F: [OpEntry; 256] = {
    let mut table = [OpEntry::Invalid; 256];

    table[0x05] = OpEntry::Plain(Template::fixed(Code::Syscall, &[]));
    table[0x0B] = OpEntry::Plain(Template::fixed(Code::Ud2, &[]));
    table[0x10] = OpEntry::Prefix {
        table: &OPCODE_10,
        keep_66: false,
    };
    table[0x1F] = OpEntry::Plain(Template::op_size([Code::Nop_rm16, Code::Nop_rm32, Code::Nop_rm64], &[Op::Ev]).mems(SIZES_V));
    table[0x58] = OpEntry::Prefix {
        table: &OPCODE_58,
        keep_66: false,
    };

    table[0xC0] = OpEntry::Plain(Template::fixed(Code::Xadd_rm8_r8, &[Op::Eb, Op::Gb]).mem(MemorySize::UInt8).flags(LOCK));
    table[0xC1] = OpEntry::Plain(
        Template::op_size([Code::Xadd_rm16_r16, Code::Xadd_rm32_r32, Code::Xadd_rm64_r64], &[Op::Ev, Op::Gv])
            .mems(SIZES_V)
            .flags(LOCK),
    );
    table[0xC2] = OpEntry::Prefix {
        table: &OPCODE_C2,
        keep_66: false,
    };
    table[0xC3] = OpEntry::ModSplit {
        reg: &INVALID,
        mem: &MOVNTI,
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
    table[0xC7] = OpEntry::ModSplit {
        reg: &C7_REG,
        mem: &C7_MEM,
    };

    let mut r = 0;
    while r < 8 {
        table[0xC8 + r] = OpEntry::Plain(Template::op_size([Code::Bswap_r16, Code::Bswap_r32, Code::Bswap_r64], &[Op::Zv]));
        r += 1;
    }

    table
};
