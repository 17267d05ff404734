//! ModR/M, SIB and displacement decoding.

use super::cursor::ByteCursor;
use super::encoding::EncodingContext;
use crate::DecodeError;
use xdec_core::{Bitness, Register};

/// Decoded ModR/M byte (raw 3-bit fields, no extensions applied).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModRm {
    /// Mod field (2 bits)
    pub mod_: u8,
    /// Reg field (3 bits)
    pub reg: u8,
    /// R/M field (3 bits)
    pub rm: u8,
}

impl ModRm {
    pub fn parse(byte: u8) -> Self {
        Self {
            mod_: (byte >> 6) & 0x3,
            reg: (byte >> 3) & 0x7,
            rm: byte & 0x7,
        }
    }

    /// Returns true if this ModR/M encodes a register operand (mod=11).
    pub fn is_register(&self) -> bool {
        self.mod_ == 0b11
    }
}

/// Decoded SIB byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sib {
    /// Scale (2 bits) - actual scale is 1 << scale
    pub scale: u8,
    pub index: u8,
    pub base: u8,
}

impl Sib {
    pub fn parse(byte: u8) -> Self {
        Self {
            scale: (byte >> 6) & 0x3,
            index: (byte >> 3) & 0x7,
            base: byte & 0x7,
        }
    }

    /// Returns the actual scale factor (1, 2, 4, or 8).
    pub fn scale_factor(&self) -> u8 {
        1 << self.scale
    }
}

/// Effective address size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSize {
    Bits16,
    Bits32,
    Bits64,
}

impl AddressSize {
    /// Address size for a mode, toggled by the 67h prefix.
    pub fn resolve(bitness: Bitness, override_67: bool) -> Self {
        match (bitness, override_67) {
            (Bitness::Bits16, false) | (Bitness::Bits32, true) => Self::Bits16,
            (Bitness::Bits16, true) | (Bitness::Bits32, false) | (Bitness::Bits64, true) => {
                Self::Bits32
            }
            (Bitness::Bits64, false) => Self::Bits64,
        }
    }

    fn gpr(self, n: u8) -> Register {
        match self {
            Self::Bits16 => Register::gpr16(n),
            Self::Bits32 => Register::gpr32(n),
            Self::Bits64 => Register::gpr64(n),
        }
    }
}

/// Addressing decoded from ModR/M, SIB and displacement bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    pub base: Register,
    pub index: Register,
    pub scale: u8,
    /// Displacement at the address width. For instruction-relative forms this
    /// is the raw displacement until [`Address::relocate`] runs.
    pub displacement: u64,
    pub displ_size: u8,
    /// Offset of the displacement bytes from the start of the instruction
    pub displ_offset: usize,
}

impl Address {
    fn new(base: Register, index: Register) -> Self {
        Self {
            base,
            index,
            scale: 1,
            displacement: 0,
            displ_size: 0,
            displ_offset: 0,
        }
    }

    pub fn is_ip_relative(&self) -> bool {
        matches!(self.base, Register::RIP | Register::EIP)
    }

    /// Turns an instruction-relative displacement into the absolute target.
    pub fn relocate(&mut self, next_ip: u64) {
        match self.base {
            Register::RIP => {
                let disp = self.displacement as u32 as i32 as i64 as u64;
                self.displacement = next_ip.wrapping_add(disp);
            }
            Register::EIP => {
                let target = (next_ip as u32).wrapping_add(self.displacement as u32);
                self.displacement = target as u64;
            }
            _ => {}
        }
    }

    /// Default segment for this addressing form: SS for a BP/SP-family base.
    pub fn default_segment(&self) -> Register {
        match self.base {
            Register::BP
            | Register::EBP
            | Register::RBP
            | Register::SP
            | Register::ESP
            | Register::RSP => Register::SS,
            _ => Register::DS,
        }
    }
}

const MEM_REGS_16: [(Register, Register); 8] = [
    (Register::BX, Register::SI),
    (Register::BX, Register::DI),
    (Register::BP, Register::SI),
    (Register::BP, Register::DI),
    (Register::SI, Register::None),
    (Register::DI, Register::None),
    (Register::BP, Register::None),
    (Register::BX, Register::None),
];

/// Reads the SIB byte and displacement of a memory-form ModR/M.
///
/// `disp8_scale` is the EVEX compressed-displacement factor N (1 otherwise).
pub(crate) fn decode_address(
    cursor: &mut ByteCursor<'_>,
    modrm: ModRm,
    size: AddressSize,
    ctx: &EncodingContext,
    long_mode: bool,
    disp8_scale: u32,
) -> Result<Address, DecodeError> {
    debug_assert!(!modrm.is_register());
    if size == AddressSize::Bits16 {
        decode_address16(cursor, modrm, disp8_scale)
    } else {
        decode_address32_64(cursor, modrm, size, ctx, long_mode, disp8_scale)
    }
}

fn decode_address16(
    cursor: &mut ByteCursor<'_>,
    modrm: ModRm,
    disp8_scale: u32,
) -> Result<Address, DecodeError> {
    let (base, index) = MEM_REGS_16[modrm.rm as usize];
    let mut address = Address::new(base, index);
    match modrm.mod_ {
        0 if modrm.rm == 6 => {
            address.base = Register::None;
            address.displ_offset = cursor.consumed();
            address.displacement = cursor.read_u16()? as u64;
            address.displ_size = 2;
        }
        0 => {}
        1 => {
            address.displ_offset = cursor.consumed();
            let disp = (cursor.read_u8()? as i8 as i32).wrapping_mul(disp8_scale as i32);
            address.displacement = disp as u16 as u64;
            address.displ_size = 1;
        }
        _ => {
            address.displ_offset = cursor.consumed();
            address.displacement = cursor.read_u16()? as u64;
            address.displ_size = 2;
        }
    }
    Ok(address)
}

fn decode_address32_64(
    cursor: &mut ByteCursor<'_>,
    modrm: ModRm,
    size: AddressSize,
    ctx: &EncodingContext,
    long_mode: bool,
    disp8_scale: u32,
) -> Result<Address, DecodeError> {
    let mut address = Address::new(Register::None, Register::None);
    let mut base_is_disp32 = false;

    if modrm.rm == 4 {
        let sib = Sib::parse(cursor.read_u8()?);
        let index = sib.index + ctx.x;
        if index != 4 {
            address.index = size.gpr(index);
        }
        address.scale = sib.scale_factor();
        if sib.base == 5 && modrm.mod_ == 0 {
            base_is_disp32 = true;
        } else {
            address.base = size.gpr(sib.base + ctx.b);
        }
    } else if modrm.rm == 5 && modrm.mod_ == 0 {
        base_is_disp32 = true;
        // No SIB: instruction-relative in 64-bit mode
        if long_mode {
            address.base = match size {
                AddressSize::Bits64 => Register::RIP,
                _ => Register::EIP,
            };
        }
    } else {
        address.base = size.gpr(modrm.rm + ctx.b);
    }

    let extend = |disp: i32| -> u64 {
        match size {
            AddressSize::Bits64 => disp as i64 as u64,
            _ => disp as u32 as u64,
        }
    };

    match modrm.mod_ {
        0 if base_is_disp32 => {
            address.displ_offset = cursor.consumed();
            address.displacement = extend(cursor.read_u32()? as i32);
            address.displ_size = 4;
        }
        0 => {}
        1 => {
            address.displ_offset = cursor.consumed();
            let disp = (cursor.read_u8()? as i8 as i32).wrapping_mul(disp8_scale as i32);
            address.displacement = extend(disp);
            address.displ_size = 1;
        }
        _ => {
            address.displ_offset = cursor.consumed();
            address.displacement = extend(cursor.read_u32()? as i32);
            address.displ_size = 4;
        }
    }
    Ok(address)
}
