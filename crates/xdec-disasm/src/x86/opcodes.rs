//! Opcode table model and the one-byte opcode map.
//!
//! Tables are `static` data. A lookup walks nested [`OpEntry`] nodes (ModRM
//! group, mod split, mandatory prefix, W, vector length, mode) until it
//! reaches a [`Template`], which names the `Code` for each operand-size slot
//! and the operand encodings in order.

use xdec_core::{Code, MemorySize};

/// Template flag: LOCK allowed on the memory form.
pub const LOCK: u8 = 1 << 0;
/// Template flag: EVEX opmask `{k1}` allowed.
pub const K1: u8 = 1 << 1;
/// Template flag: EVEX zeroing `{z}` allowed.
pub const Z: u8 = 1 << 2;
/// Template flag: EVEX.b on a register form means `{sae}`.
pub const SAE: u8 = 1 << 3;
/// Template flag: EVEX.b on a register form means `{er}` (static rounding plus sae).
pub const ER: u8 = 1 << 4;

/// How a template picks one of its three `Code` slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Select {
    /// Slot 0 always
    Fixed,
    /// 16/32/64-bit operand size (66h, REX.W)
    OpSize,
    /// Slot 2 when W is set in 64-bit mode, slot 1 otherwise
    W,
    /// Slot 2 in 64-bit mode, slot 1 otherwise
    Mode,
    /// Near branches: always 64-bit in 64-bit mode
    Branch,
    /// Stack operations: 64-bit in 64-bit mode unless 66h
    Stack,
}

/// Operand encoding, one per operand slot of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// 8-bit GPR in ModRM.reg
    Gb,
    /// Slot-sized GPR in ModRM.reg
    Gv,
    /// 8-bit GPR or memory in ModRM.rm
    Eb,
    /// Slot-sized GPR or memory in ModRM.rm
    Ev,
    /// Memory only
    M,
    Vx,
    Vy,
    Vz,
    Hx,
    Hy,
    Hz,
    Wx,
    Wy,
    Wz,
    /// XMM in ModRM.rm, register form only
    Ux,
    /// MMX register in ModRM.reg
    P,
    /// MMX register in ModRM.rm, register form only
    N,
    /// Opmask register in ModRM.reg
    Kr,
    Ib,
    Iw,
    /// imm16/imm32, imm32 sign-extended for 64-bit operands
    Iz,
    /// imm8 sign-extended to the operand size
    IbSx,
    /// Full operand-size immediate (imm64 with REX.W)
    Iv,
    Jb,
    Jz,
    /// 8-bit GPR in the low three opcode bits
    Zb,
    /// Slot-sized GPR in the low three opcode bits
    Zv,
    /// AL
    AccB,
    /// AX/EAX/RAX
    Acc,
}

impl Op {
    pub fn uses_modrm(self) -> bool {
        matches!(
            self,
            Op::Gb
                | Op::Gv
                | Op::Eb
                | Op::Ev
                | Op::M
                | Op::Vx
                | Op::Vy
                | Op::Vz
                | Op::Wx
                | Op::Wy
                | Op::Wz
                | Op::Ux
                | Op::P
                | Op::N
                | Op::Kr
        )
    }

    /// Operand encoded in VEX/EVEX.vvvv.
    pub fn is_vvvv(self) -> bool {
        matches!(self, Op::Hx | Op::Hy | Op::Hz)
    }
}

/// Leaf of the opcode tables.
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub codes: [Code; 3],
    pub select: Select,
    pub ops: &'static [Op],
    /// Memory operand size per slot
    pub mems: [MemorySize; 3],
    /// Memory size when EVEX.b is set on the memory form, `Unknown` if broadcast is not allowed
    pub bcst: MemorySize,
    pub flags: u8,
}

impl Template {
    const fn new(codes: [Code; 3], select: Select, ops: &'static [Op]) -> Self {
        Self {
            codes,
            select,
            ops,
            mems: [MemorySize::Unknown; 3],
            bcst: MemorySize::Unknown,
            flags: 0,
        }
    }

    pub const fn fixed(code: Code, ops: &'static [Op]) -> Self {
        Self::new([code; 3], Select::Fixed, ops)
    }

    pub const fn op_size(codes: [Code; 3], ops: &'static [Op]) -> Self {
        Self::new(codes, Select::OpSize, ops)
    }

    pub const fn by_w(code32: Code, code64: Code, ops: &'static [Op]) -> Self {
        Self::new([Code::INVALID, code32, code64], Select::W, ops)
    }

    pub const fn by_mode(code32: Code, code64: Code, ops: &'static [Op]) -> Self {
        Self::new([Code::INVALID, code32, code64], Select::Mode, ops)
    }

    pub const fn branch(codes: [Code; 3], ops: &'static [Op]) -> Self {
        Self::new(codes, Select::Branch, ops)
    }

    pub const fn stack(codes: [Code; 3], ops: &'static [Op]) -> Self {
        Self::new(codes, Select::Stack, ops)
    }

    pub const fn mem(mut self, size: MemorySize) -> Self {
        self.mems = [size; 3];
        self
    }

    pub const fn mems(mut self, sizes: [MemorySize; 3]) -> Self {
        self.mems = sizes;
        self
    }

    pub const fn bcst(mut self, size: MemorySize) -> Self {
        self.bcst = size;
        self
    }

    pub const fn flags(mut self, flags: u8) -> Self {
        self.flags |= flags;
        self
    }

    pub const fn lock(self) -> Self {
        self.flags(LOCK)
    }

    pub fn has(&self, flag: u8) -> bool {
        self.flags & flag != 0
    }

    /// True if any operand sits in ModRM.
    pub fn uses_modrm(&self) -> bool {
        self.ops.iter().any(|op| op.uses_modrm())
    }

    pub fn uses_vvvv(&self) -> bool {
        self.ops.iter().any(|op| op.is_vvvv())
    }
}

/// Node of an opcode table.
#[derive(Debug, Clone, Copy)]
pub enum OpEntry {
    /// Undefined or reserved encoding
    Invalid,
    Plain(Template),
    /// Indexed by ModRM.reg
    Group(&'static [OpEntry; 8]),
    /// Register form (mod=11) vs memory form
    ModSplit {
        reg: &'static OpEntry,
        mem: &'static OpEntry,
    },
    /// Indexed by the mandatory prefix (none, 66, F3, F2). With `keep_66`
    /// an operand-size prefix also acting as the mandatory prefix still
    /// changes the operand size.
    Prefix {
        table: &'static [OpEntry; 4],
        keep_66: bool,
    },
    /// Indexed by W as encoded
    W(&'static [OpEntry; 2]),
    /// Indexed by VEX.L / EVEX.L'L
    Length(&'static [OpEntry; 4]),
    /// Like `Length`, but a register form with EVEX.b selects index 2
    /// (the 512-bit rounding/sae form) whatever L'L holds
    LengthEr(&'static [OpEntry; 4]),
    Mode {
        legacy: &'static OpEntry,
        long: &'static OpEntry,
    },
    /// Indexed by REX.B
    RexB {
        clear: &'static OpEntry,
        set: &'static OpEntry,
    },
}

pub static INVALID: OpEntry = OpEntry::Invalid;

// ALU ops 00-3D, in ModRM.reg order:
// rm8_r8, rm16/32/64_r, r8_rm8, r16/32/64_rm, AL_imm8, AX/EAX/RAX_imm
const ALU: [[Code; 12]; 8] = [
    [
        Code::Add_rm8_r8,
        Code::Add_rm16_r16,
        Code::Add_rm32_r32,
        Code::Add_rm64_r64,
        Code::Add_r8_rm8,
        Code::Add_r16_rm16,
        Code::Add_r32_rm32,
        Code::Add_r64_rm64,
        Code::Add_AL_imm8,
        Code::Add_AX_imm16,
        Code::Add_EAX_imm32,
        Code::Add_RAX_imm32,
    ],
    [
        Code::Or_rm8_r8,
        Code::Or_rm16_r16,
        Code::Or_rm32_r32,
        Code::Or_rm64_r64,
        Code::Or_r8_rm8,
        Code::Or_r16_rm16,
        Code::Or_r32_rm32,
        Code::Or_r64_rm64,
        Code::Or_AL_imm8,
        Code::Or_AX_imm16,
        Code::Or_EAX_imm32,
        Code::Or_RAX_imm32,
    ],
    [
        Code::Adc_rm8_r8,
        Code::Adc_rm16_r16,
        Code::Adc_rm32_r32,
        Code::Adc_rm64_r64,
        Code::Adc_r8_rm8,
        Code::Adc_r16_rm16,
        Code::Adc_r32_rm32,
        Code::Adc_r64_rm64,
        Code::Adc_AL_imm8,
        Code::Adc_AX_imm16,
        Code::Adc_EAX_imm32,
        Code::Adc_RAX_imm32,
    ],
    [
        Code::Sbb_rm8_r8,
        Code::Sbb_rm16_r16,
        Code::Sbb_rm32_r32,
        Code::Sbb_rm64_r64,
        Code::Sbb_r8_rm8,
        Code::Sbb_r16_rm16,
        Code::Sbb_r32_rm32,
        Code::Sbb_r64_rm64,
        Code::Sbb_AL_imm8,
        Code::Sbb_AX_imm16,
        Code::Sbb_EAX_imm32,
        Code::Sbb_RAX_imm32,
    ],
    [
        Code::And_rm8_r8,
        Code::And_rm16_r16,
        Code::And_rm32_r32,
        Code::And_rm64_r64,
        Code::And_r8_rm8,
        Code::And_r16_rm16,
        Code::And_r32_rm32,
        Code::And_r64_rm64,
        Code::And_AL_imm8,
        Code::And_AX_imm16,
        Code::And_EAX_imm32,
        Code::And_RAX_imm32,
    ],
    [
        Code::Sub_rm8_r8,
        Code::Sub_rm16_r16,
        Code::Sub_rm32_r32,
        Code::Sub_rm64_r64,
        Code::Sub_r8_rm8,
        Code::Sub_r16_rm16,
        Code::Sub_r32_rm32,
        Code::Sub_r64_rm64,
        Code::Sub_AL_imm8,
        Code::Sub_AX_imm16,
        Code::Sub_EAX_imm32,
        Code::Sub_RAX_imm32,
    ],
    [
        Code::Xor_rm8_r8,
        Code::Xor_rm16_r16,
        Code::Xor_rm32_r32,
        Code::Xor_rm64_r64,
        Code::Xor_r8_rm8,
        Code::Xor_r16_rm16,
        Code::Xor_r32_rm32,
        Code::Xor_r64_rm64,
        Code::Xor_AL_imm8,
        Code::Xor_AX_imm16,
        Code::Xor_EAX_imm32,
        Code::Xor_RAX_imm32,
    ],
    [
        Code::Cmp_rm8_r8,
        Code::Cmp_rm16_r16,
        Code::Cmp_rm32_r32,
        Code::Cmp_rm64_r64,
        Code::Cmp_r8_rm8,
        Code::Cmp_r16_rm16,
        Code::Cmp_r32_rm32,
        Code::Cmp_r64_rm64,
        Code::Cmp_AL_imm8,
        Code::Cmp_AX_imm16,
        Code::Cmp_EAX_imm32,
        Code::Cmp_RAX_imm32,
    ],
];

// Group 1 (80-83), in ModRM.reg order:
// 80 rm8_imm8, 81 rm16_imm16/rm32_imm32/rm64_imm32, 82 rm8_imm8, 83 rm16/32/64_imm8
const GROUP1: [[Code; 8]; 8] = [
    [
        Code::Add_rm8_imm8,
        Code::Add_rm16_imm16,
        Code::Add_rm32_imm32,
        Code::Add_rm64_imm32,
        Code::Add_rm8_imm8_82,
        Code::Add_rm16_imm8,
        Code::Add_rm32_imm8,
        Code::Add_rm64_imm8,
    ],
    [
        Code::Or_rm8_imm8,
        Code::Or_rm16_imm16,
        Code::Or_rm32_imm32,
        Code::Or_rm64_imm32,
        Code::Or_rm8_imm8_82,
        Code::Or_rm16_imm8,
        Code::Or_rm32_imm8,
        Code::Or_rm64_imm8,
    ],
    [
        Code::Adc_rm8_imm8,
        Code::Adc_rm16_imm16,
        Code::Adc_rm32_imm32,
        Code::Adc_rm64_imm32,
        Code::Adc_rm8_imm8_82,
        Code::Adc_rm16_imm8,
        Code::Adc_rm32_imm8,
        Code::Adc_rm64_imm8,
    ],
    [
        Code::Sbb_rm8_imm8,
        Code::Sbb_rm16_imm16,
        Code::Sbb_rm32_imm32,
        Code::Sbb_rm64_imm32,
        Code::Sbb_rm8_imm8_82,
        Code::Sbb_rm16_imm8,
        Code::Sbb_rm32_imm8,
        Code::Sbb_rm64_imm8,
    ],
    [
        Code::And_rm8_imm8,
        Code::And_rm16_imm16,
        Code::And_rm32_imm32,
        Code::And_rm64_imm32,
        Code::And_rm8_imm8_82,
        Code::And_rm16_imm8,
        Code::And_rm32_imm8,
        Code::And_rm64_imm8,
    ],
    [
        Code::Sub_rm8_imm8,
        Code::Sub_rm16_imm16,
        Code::Sub_rm32_imm32,
        Code::Sub_rm64_imm32,
        Code::Sub_rm8_imm8_82,
        Code::Sub_rm16_imm8,
        Code::Sub_rm32_imm8,
        Code::Sub_rm64_imm8,
    ],
    [
        Code::Xor_rm8_imm8,
        Code::Xor_rm16_imm16,
        Code::Xor_rm32_imm32,
        Code::Xor_rm64_imm32,
        Code::Xor_rm8_imm8_82,
        Code::Xor_rm16_imm8,
        Code::Xor_rm32_imm8,
        Code::Xor_rm64_imm8,
    ],
    [
        Code::Cmp_rm8_imm8,
        Code::Cmp_rm16_imm16,
        Code::Cmp_rm32_imm32,
        Code::Cmp_rm64_imm32,
        Code::Cmp_rm8_imm8_82,
        Code::Cmp_rm16_imm8,
        Code::Cmp_rm32_imm8,
        Code::Cmp_rm64_imm8,
    ],
];

const JCC: [[Code; 3]; 16] = [
    [Code::Jo_rel8_16, Code::Jo_rel8_32, Code::Jo_rel8_64],
    [Code::Jno_rel8_16, Code::Jno_rel8_32, Code::Jno_rel8_64],
    [Code::Jb_rel8_16, Code::Jb_rel8_32, Code::Jb_rel8_64],
    [Code::Jae_rel8_16, Code::Jae_rel8_32, Code::Jae_rel8_64],
    [Code::Je_rel8_16, Code::Je_rel8_32, Code::Je_rel8_64],
    [Code::Jne_rel8_16, Code::Jne_rel8_32, Code::Jne_rel8_64],
    [Code::Jbe_rel8_16, Code::Jbe_rel8_32, Code::Jbe_rel8_64],
    [Code::Ja_rel8_16, Code::Ja_rel8_32, Code::Ja_rel8_64],
    [Code::Js_rel8_16, Code::Js_rel8_32, Code::Js_rel8_64],
    [Code::Jns_rel8_16, Code::Jns_rel8_32, Code::Jns_rel8_64],
    [Code::Jp_rel8_16, Code::Jp_rel8_32, Code::Jp_rel8_64],
    [Code::Jnp_rel8_16, Code::Jnp_rel8_32, Code::Jnp_rel8_64],
    [Code::Jl_rel8_16, Code::Jl_rel8_32, Code::Jl_rel8_64],
    [Code::Jge_rel8_16, Code::Jge_rel8_32, Code::Jge_rel8_64],
    [Code::Jle_rel8_16, Code::Jle_rel8_32, Code::Jle_rel8_64],
    [Code::Jg_rel8_16, Code::Jg_rel8_32, Code::Jg_rel8_64],
];

const MOV_R8_IMM8: [Code; 8] = [
    Code::Mov_AL_imm8,
    Code::Mov_CL_imm8,
    Code::Mov_DL_imm8,
    Code::Mov_BL_imm8,
    Code::Mov_AH_imm8,
    Code::Mov_CH_imm8,
    Code::Mov_DH_imm8,
    Code::Mov_BH_imm8,
];

const MOV_RV_IMM: [[Code; 3]; 8] = [
    [Code::Mov_AX_imm16, Code::Mov_EAX_imm32, Code::Mov_RAX_imm64],
    [Code::Mov_CX_imm16, Code::Mov_ECX_imm32, Code::Mov_RCX_imm64],
    [Code::Mov_DX_imm16, Code::Mov_EDX_imm32, Code::Mov_RDX_imm64],
    [Code::Mov_BX_imm16, Code::Mov_EBX_imm32, Code::Mov_RBX_imm64],
    [Code::Mov_SP_imm16, Code::Mov_ESP_imm32, Code::Mov_RSP_imm64],
    [Code::Mov_BP_imm16, Code::Mov_EBP_imm32, Code::Mov_RBP_imm64],
    [Code::Mov_SI_imm16, Code::Mov_ESI_imm32, Code::Mov_RSI_imm64],
    [Code::Mov_DI_imm16, Code::Mov_EDI_imm32, Code::Mov_RDI_imm64],
];

const SIZES_V: [MemorySize; 3] = [MemorySize::UInt16, MemorySize::UInt32, MemorySize::UInt64];

/// The six encodings of one ALU op: Eb,Gb / Ev,Gv / Gb,Eb / Gv,Ev / AL,Ib / rAX,Iz.
const fn alu_entries(codes: &[Code; 12], lockable: bool) -> [OpEntry; 6] {
    let lock = if lockable { LOCK } else { 0 };
    [
        OpEntry::Plain(
            Template::fixed(codes[0], &[Op::Eb, Op::Gb])
                .mem(MemorySize::UInt8)
                .flags(lock),
        ),
        OpEntry::Plain(
            Template::op_size([codes[1], codes[2], codes[3]], &[Op::Ev, Op::Gv])
                .mems(SIZES_V)
                .flags(lock),
        ),
        OpEntry::Plain(Template::fixed(codes[4], &[Op::Gb, Op::Eb]).mem(MemorySize::UInt8)),
        OpEntry::Plain(
            Template::op_size([codes[5], codes[6], codes[7]], &[Op::Gv, Op::Ev]).mems(SIZES_V),
        ),
        OpEntry::Plain(Template::fixed(codes[8], &[Op::AccB, Op::Ib])),
        OpEntry::Plain(Template::op_size([codes[9], codes[10], codes[11]], &[Op::Acc, Op::Iz])),
    ]
}

/// Group 1 for opcode `0x80 + form`.
const fn group1(form: usize) -> [OpEntry; 8] {
    let mut group = [OpEntry::Invalid; 8];
    let mut reg = 0;
    while reg < 8 {
        let codes = &GROUP1[reg];
        // CMP does not write its destination
        let lock = if reg == 7 { 0 } else { LOCK };
        group[reg] = match form {
            0 => OpEntry::Plain(
                Template::fixed(codes[0], &[Op::Eb, Op::Ib])
                    .mem(MemorySize::UInt8)
                    .flags(lock),
            ),
            1 => OpEntry::Plain(
                Template::op_size([codes[1], codes[2], codes[3]], &[Op::Ev, Op::Iz])
                    .mems(SIZES_V)
                    .flags(lock),
            ),
            2 => OpEntry::Plain(
                Template::fixed(codes[4], &[Op::Eb, Op::Ib])
                    .mem(MemorySize::UInt8)
                    .flags(lock),
            ),
            _ => OpEntry::Plain(
                Template::op_size([codes[5], codes[6], codes[7]], &[Op::Ev, Op::IbSx])
                    .mems(SIZES_V)
                    .flags(lock),
            ),
        };
        reg += 1;
    }
    group
}

static GROUP_80: [OpEntry; 8] = group1(0);
static GROUP_81: [OpEntry; 8] = group1(1);
static GROUP_82: [OpEntry; 8] = group1(2);
static GROUP_83: [OpEntry; 8] = group1(3);
static GROUP_82_LEGACY: OpEntry = OpEntry::Group(&GROUP_82);

static NOP: OpEntry = OpEntry::Plain(Template::op_size([Code::Nopw, Code::Nopd, Code::Nopq], &[]));
static XCHG_R8_RAX: OpEntry = OpEntry::Plain(Template::op_size(
    [Code::Xchg_r16_AX, Code::Xchg_r32_EAX, Code::Xchg_r64_RAX],
    &[Op::Zv, Op::Acc],
));
static OPCODE_90: [OpEntry; 4] = [
    OpEntry::RexB {
        clear: &NOP,
        set: &XCHG_R8_RAX,
    },
    OpEntry::RexB {
        clear: &NOP,
        set: &XCHG_R8_RAX,
    },
    OpEntry::Plain(Template::fixed(Code::Pause, &[])),
    OpEntry::RexB {
        clear: &NOP,
        set: &XCHG_R8_RAX,
    },
];

/// One-byte opcode map. `0F` is an escape and handled by the decoder.
#[rustfmt::skip]
pub static PRIMARY: [OpEntry; 256] = {
    let mut table = [OpEntry::Invalid; 256];

    // ALU
    let mut op = 0;
    while op < 8 {
        let entries = alu_entries(&ALU[op], op != 7);
        let mut i = 0;
        while i < 6 {
            table[op * 8 + i] = entries[i];
            i += 1;
        }
        op += 1;
    }

    // INC/DEC (REX in 64-bit mode), PUSH/POP
    let mut r = 0;
    while r < 8 {
        table[0x40 + r] = OpEntry::Plain(Template::op_size([Code::Inc_r16, Code::Inc_r32, Code::INVALID], &[Op::Zv]));
        table[0x48 + r] = OpEntry::Plain(Template::op_size([Code::Dec_r16, Code::Dec_r32, Code::INVALID], &[Op::Zv]));
        table[0x50 + r] = OpEntry::Plain(Template::stack([Code::Push_r16, Code::Push_r32, Code::Push_r64], &[Op::Zv]));
        table[0x58 + r] = OpEntry::Plain(Template::stack([Code::Pop_r16, Code::Pop_r32, Code::Pop_r64], &[Op::Zv]));
        r += 1;
    }

    // BOUND (EVEX escape in 64-bit mode)
    table[0x62] = OpEntry::Plain(
        Template::op_size([Code::Bound_r16_m1616, Code::Bound_r32_m3232, Code::INVALID], &[Op::Gv, Op::M])
            .mems([MemorySize::Bound16_WordWord, MemorySize::Bound32_DwordDword, MemorySize::Unknown]),
    );
    table[0x68] = OpEntry::Plain(Template::stack([Code::Push_imm16, Code::Pushd_imm32, Code::Pushq_imm32], &[Op::Iz]));
    table[0x6A] = OpEntry::Plain(Template::stack([Code::Pushw_imm8, Code::Pushd_imm8, Code::Pushq_imm8], &[Op::IbSx]));

    // Jcc rel8
    let mut cc = 0;
    while cc < 16 {
        table[0x70 + cc] = OpEntry::Plain(Template::branch(JCC[cc], &[Op::Jb]));
        cc += 1;
    }

    // Group 1
    table[0x80] = OpEntry::Group(&GROUP_80);
    table[0x81] = OpEntry::Group(&GROUP_81);
    table[0x82] = OpEntry::Mode {
        legacy: &GROUP_82_LEGACY,
        long: &INVALID,
    };
    table[0x83] = OpEntry::Group(&GROUP_83);

    // TEST, XCHG, MOV
    table[0x84] = OpEntry::Plain(Template::fixed(Code::Test_rm8_r8, &[Op::Eb, Op::Gb]).mem(MemorySize::UInt8));
    table[0x85] = OpEntry::Plain(
        Template::op_size([Code::Test_rm16_r16, Code::Test_rm32_r32, Code::Test_rm64_r64], &[Op::Ev, Op::Gv])
            .mems(SIZES_V),
    );
    table[0x86] = OpEntry::Plain(Template::fixed(Code::Xchg_rm8_r8, &[Op::Eb, Op::Gb]).mem(MemorySize::UInt8).lock());
    table[0x87] = OpEntry::Plain(
        Template::op_size([Code::Xchg_rm16_r16, Code::Xchg_rm32_r32, Code::Xchg_rm64_r64], &[Op::Ev, Op::Gv])
            .mems(SIZES_V)
            .lock(),
    );
    table[0x88] = OpEntry::Plain(Template::fixed(Code::Mov_rm8_r8, &[Op::Eb, Op::Gb]).mem(MemorySize::UInt8));
    table[0x89] = OpEntry::Plain(
        Template::op_size([Code::Mov_rm16_r16, Code::Mov_rm32_r32, Code::Mov_rm64_r64], &[Op::Ev, Op::Gv])
            .mems(SIZES_V),
    );
    table[0x8A] = OpEntry::Plain(Template::fixed(Code::Mov_r8_rm8, &[Op::Gb, Op::Eb]).mem(MemorySize::UInt8));
    table[0x8B] = OpEntry::Plain(
        Template::op_size([Code::Mov_r16_rm16, Code::Mov_r32_rm32, Code::Mov_r64_rm64], &[Op::Gv, Op::Ev])
            .mems(SIZES_V),
    );
    table[0x8D] = OpEntry::Plain(Template::op_size([Code::Lea_r16_m, Code::Lea_r32_m, Code::Lea_r64_m], &[Op::Gv, Op::M]));

    // NOP / PAUSE / XCHG rAX
    table[0x90] = OpEntry::Prefix {
        table: &OPCODE_90,
        keep_66: true,
    };
    let mut r = 1;
    while r < 8 {
        table[0x90 + r] = OpEntry::Plain(Template::op_size(
            [Code::Xchg_r16_AX, Code::Xchg_r32_EAX, Code::Xchg_r64_RAX],
            &[Op::Zv, Op::Acc],
        ));
        r += 1;
    }

    table[0xA8] = OpEntry::Plain(Template::fixed(Code::Test_AL_imm8, &[Op::AccB, Op::Ib]));
    table[0xA9] = OpEntry::Plain(Template::op_size(
        [Code::Test_AX_imm16, Code::Test_EAX_imm32, Code::Test_RAX_imm32],
        &[Op::Acc, Op::Iz],
    ));

    // MOV reg, imm
    let mut r = 0;
    while r < 8 {
        table[0xB0 + r] = OpEntry::Plain(Template::fixed(MOV_R8_IMM8[r], &[Op::Zb, Op::Ib]));
        table[0xB8 + r] = OpEntry::Plain(Template::op_size(MOV_RV_IMM[r], &[Op::Zv, Op::Iv]));
        r += 1;
    }

    table[0xC2] = OpEntry::Plain(Template::branch([Code::Retnw_imm16, Code::Retnd_imm16, Code::Retnq_imm16], &[Op::Iw]));
    table[0xC3] = OpEntry::Plain(Template::branch([Code::Retnw, Code::Retnd, Code::Retnq], &[]));
    // LES/LDS (VEX escapes in 64-bit mode or with a register-form ModRM)
    table[0xC4] = OpEntry::Plain(
        Template::op_size([Code::Les_r16_m1616, Code::Les_r32_m1632, Code::INVALID], &[Op::Gv, Op::M])
            .mems([MemorySize::SegPtr16, MemorySize::SegPtr32, MemorySize::Unknown]),
    );
    table[0xC5] = OpEntry::Plain(
        Template::op_size([Code::Lds_r16_m1616, Code::Lds_r32_m1632, Code::INVALID], &[Op::Gv, Op::M])
            .mems([MemorySize::SegPtr16, MemorySize::SegPtr32, MemorySize::Unknown]),
    );
    table[0xCC] = OpEntry::Plain(Template::fixed(Code::Int3, &[]));

    table[0xE8] = OpEntry::Plain(Template::branch([Code::Call_rel16, Code::Call_rel32_32, Code::Call_rel32_64], &[Op::Jz]));
    table[0xE9] = OpEntry::Plain(Template::branch([Code::Jmp_rel16, Code::Jmp_rel32_32, Code::Jmp_rel32_64], &[Op::Jz]));
    table[0xEB] = OpEntry::Plain(Template::branch([Code::Jmp_rel8_16, Code::Jmp_rel8_32, Code::Jmp_rel8_64], &[Op::Jb]));
    table[0xF4] = OpEntry::Plain(Template::fixed(Code::Hlt, &[]));

    table
};

#[cfg(test)]
mod tests {
    use super::*;

    fn template(entry: &OpEntry) -> &Template {
        match entry {
            OpEntry::Plain(template) => template,
            other => panic!("expected a template, got {other:?}"),
        }
    }

    #[test]
    fn test_alu_layout() {
        assert_eq!(template(&PRIMARY[0x00]).codes[0], Code::Add_rm8_r8);
        assert_eq!(template(&PRIMARY[0x0B]).codes[1], Code::Or_r32_rm32);
        assert_eq!(template(&PRIMARY[0x3D]).codes[2], Code::Cmp_RAX_imm32);
        assert!(template(&PRIMARY[0x01]).has(LOCK));
        assert!(!template(&PRIMARY[0x39]).has(LOCK));
        assert!(!template(&PRIMARY[0x03]).has(LOCK));
    }

    #[test]
    fn test_group1() {
        let OpEntry::Group(group) = PRIMARY[0x83] else {
            panic!("0x83 is a group");
        };
        let sub = template(&group[5]);
        assert_eq!(sub.codes, [Code::Sub_rm16_imm8, Code::Sub_rm32_imm8, Code::Sub_rm64_imm8]);
        assert_eq!(sub.ops, &[Op::Ev, Op::IbSx]);
        assert!(!template(&group[7]).has(LOCK));
        assert!(matches!(PRIMARY[0x82], OpEntry::Mode { .. }));
    }

    #[test]
    fn test_register_in_opcode() {
        assert_eq!(template(&PRIMARY[0xB4]).codes[0], Code::Mov_AH_imm8);
        assert_eq!(template(&PRIMARY[0xBF]).codes[2], Code::Mov_RDI_imm64);
        assert_eq!(template(&PRIMARY[0x55]).select, Select::Stack);
    }

    #[test]
    fn test_undefined_slots() {
        assert!(matches!(PRIMARY[0x0F], OpEntry::Invalid));
        assert!(matches!(PRIMARY[0xD6], OpEntry::Invalid));
    }

    #[test]
    fn test_template_operand_queries() {
        let lea = template(&PRIMARY[0x8D]);
        assert!(lea.uses_modrm());
        assert!(!lea.uses_vvvv());
        assert!(!template(&PRIMARY[0xCC]).uses_modrm());
    }
}
