//! x86 register set.
//!
//! `Register` is a flat tag over every architectural register the decoder can
//! produce. Registers of one class are contiguous, so a class base plus a
//! register number gives the concrete register.

use std::fmt;

macro_rules! registers {
    ($($name:ident),* $(,)?) => {
        /// An x86 register, or `None` for an absent register slot.
        #[allow(clippy::upper_case_acronyms)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(u8)]
        pub enum Register {
            #[default]
            $($name),*
        }

        impl Register {
            /// Every register in declaration order.
            pub const ALL: &'static [Register] = &[$(Register::$name),*];

            /// Returns the register name in upper case, e.g. `"XMM6"`.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Register::$name => stringify!($name)),*
                }
            }
        }
    };
}

registers! {
    None,
    // 8-bit general purpose
    AL, CL, DL, BL, AH, CH, DH, BH,
    SPL, BPL, SIL, DIL, R8L, R9L, R10L, R11L,
    R12L, R13L, R14L, R15L,
    // 16-bit general purpose
    AX, CX, DX, BX, SP, BP, SI, DI,
    R8W, R9W, R10W, R11W, R12W, R13W, R14W, R15W,
    // 32-bit general purpose
    EAX, ECX, EDX, EBX, ESP, EBP, ESI, EDI,
    R8D, R9D, R10D, R11D, R12D, R13D, R14D, R15D,
    // 64-bit general purpose
    RAX, RCX, RDX, RBX, RSP, RBP, RSI, RDI,
    R8, R9, R10, R11, R12, R13, R14, R15,
    // Instruction pointers
    EIP, RIP,
    // Segment registers
    ES, CS, SS, DS, FS, GS,
    XMM0, XMM1, XMM2, XMM3, XMM4, XMM5, XMM6, XMM7,
    XMM8, XMM9, XMM10, XMM11, XMM12, XMM13, XMM14, XMM15,
    XMM16, XMM17, XMM18, XMM19, XMM20, XMM21, XMM22, XMM23,
    XMM24, XMM25, XMM26, XMM27, XMM28, XMM29, XMM30, XMM31,
    YMM0, YMM1, YMM2, YMM3, YMM4, YMM5, YMM6, YMM7,
    YMM8, YMM9, YMM10, YMM11, YMM12, YMM13, YMM14, YMM15,
    YMM16, YMM17, YMM18, YMM19, YMM20, YMM21, YMM22, YMM23,
    YMM24, YMM25, YMM26, YMM27, YMM28, YMM29, YMM30, YMM31,
    ZMM0, ZMM1, ZMM2, ZMM3, ZMM4, ZMM5, ZMM6, ZMM7,
    ZMM8, ZMM9, ZMM10, ZMM11, ZMM12, ZMM13, ZMM14, ZMM15,
    ZMM16, ZMM17, ZMM18, ZMM19, ZMM20, ZMM21, ZMM22, ZMM23,
    ZMM24, ZMM25, ZMM26, ZMM27, ZMM28, ZMM29, ZMM30, ZMM31,
    // MMX
    MM0, MM1, MM2, MM3, MM4, MM5, MM6, MM7,
    // AVX-512 opmask
    K0, K1, K2, K3, K4, K5, K6, K7,
}

impl Register {
    /// Returns the register `n` places after `self` in declaration order.
    ///
    /// Falls back to `Register::None` when that runs off the end of the set.
    pub fn offset(self, n: u8) -> Register {
        Self::ALL
            .get(self as usize + n as usize)
            .copied()
            .unwrap_or(Register::None)
    }

    /// 8-bit GPR `n` (0-15). Without a REX prefix, 4-7 are AH/CH/DH/BH.
    pub fn gpr8(n: u8, has_rex: bool) -> Register {
        match n {
            0..=3 => Register::AL.offset(n),
            4..=7 if !has_rex => Register::AH.offset(n - 4),
            4..=7 => Register::SPL.offset(n - 4),
            _ => Register::R8L.offset(n - 8),
        }
    }

    /// 16-bit GPR `n` (0-15).
    pub fn gpr16(n: u8) -> Register {
        Register::AX.offset(n & 15)
    }

    /// 32-bit GPR `n` (0-15).
    pub fn gpr32(n: u8) -> Register {
        Register::EAX.offset(n & 15)
    }

    /// 64-bit GPR `n` (0-15).
    pub fn gpr64(n: u8) -> Register {
        Register::RAX.offset(n & 15)
    }

    pub fn xmm(n: u8) -> Register {
        Register::XMM0.offset(n & 31)
    }

    pub fn ymm(n: u8) -> Register {
        Register::YMM0.offset(n & 31)
    }

    pub fn zmm(n: u8) -> Register {
        Register::ZMM0.offset(n & 31)
    }

    pub fn mm(n: u8) -> Register {
        Register::MM0.offset(n & 7)
    }

    pub fn k(n: u8) -> Register {
        Register::K0.offset(n & 7)
    }

    /// Segment register in encoding order (ES, CS, SS, DS, FS, GS).
    pub fn segment(n: u8) -> Register {
        if n < 6 {
            Register::ES.offset(n)
        } else {
            Register::None
        }
    }

    const fn in_range(self, first: Register, last: Register) -> bool {
        let v = self as u8;
        v >= first as u8 && v <= last as u8
    }

    pub const fn is_gpr8(self) -> bool {
        self.in_range(Register::AL, Register::R15L)
    }

    pub const fn is_gpr16(self) -> bool {
        self.in_range(Register::AX, Register::R15W)
    }

    pub const fn is_gpr32(self) -> bool {
        self.in_range(Register::EAX, Register::R15D)
    }

    pub const fn is_gpr64(self) -> bool {
        self.in_range(Register::RAX, Register::R15)
    }

    pub const fn is_gpr(self) -> bool {
        self.in_range(Register::AL, Register::R15)
    }

    pub const fn is_segment(self) -> bool {
        self.in_range(Register::ES, Register::GS)
    }

    pub const fn is_xmm(self) -> bool {
        self.in_range(Register::XMM0, Register::XMM31)
    }

    pub const fn is_ymm(self) -> bool {
        self.in_range(Register::YMM0, Register::YMM31)
    }

    pub const fn is_zmm(self) -> bool {
        self.in_range(Register::ZMM0, Register::ZMM31)
    }

    /// XMM, YMM or ZMM.
    pub const fn is_vector(self) -> bool {
        self.in_range(Register::XMM0, Register::ZMM31)
    }

    pub const fn is_mm(self) -> bool {
        self.in_range(Register::MM0, Register::MM7)
    }

    pub const fn is_k(self) -> bool {
        self.in_range(Register::K0, Register::K7)
    }

    /// Register width in bytes, 0 for `None`.
    pub const fn size(self) -> usize {
        if self.is_gpr8() {
            1
        } else if self.is_gpr16() || self.is_segment() {
            2
        } else if self.is_gpr32() || matches!(self, Register::EIP) {
            4
        } else if self.is_gpr64() || self.is_mm() || self.is_k() || matches!(self, Register::RIP) {
            8
        } else if self.is_xmm() {
            16
        } else if self.is_ymm() {
            32
        } else if self.is_zmm() {
            64
        } else {
            0
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name().to_ascii_lowercase())
    }
}
