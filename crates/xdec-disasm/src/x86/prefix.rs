//! Legacy prefix and REX scanning.

use super::cursor::ByteCursor;
use crate::DecodeError;
use xdec_core::{Bitness, Register};

/// Mandatory prefix in table-index order.
///
/// Legacy SSE opcodes take it from 66h/F3h/F2h; VEX and EVEX encode it in `pp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MandatoryPrefix {
    #[default]
    None = 0,
    P66 = 1,
    PF3 = 2,
    PF2 = 3,
}

impl MandatoryPrefix {
    /// Maps a VEX/EVEX `pp` field.
    pub fn from_pp(pp: u8) -> Self {
        match pp & 3 {
            0 => Self::None,
            1 => Self::P66,
            2 => Self::PF3,
            _ => Self::PF2,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// REX prefix fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rex {
    /// REX.W - 64-bit operand size
    pub w: bool,
    /// REX.R - extends ModR/M reg field
    pub r: bool,
    /// REX.X - extends SIB index field
    pub x: bool,
    /// REX.B - extends ModR/M r/m, SIB base, or opcode reg
    pub b: bool,
}

impl Rex {
    /// Parse a REX byte.
    pub fn from_byte(byte: u8) -> Self {
        Self {
            w: byte & 0x08 != 0,
            r: byte & 0x04 != 0,
            x: byte & 0x02 != 0,
            b: byte & 0x01 != 0,
        }
    }
}

/// Prefixes seen before the opcode or escape byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct Prefixes {
    /// Segment override as encoded, `Register::None` if absent
    pub segment: Register,
    /// LOCK prefix (0xF0)
    pub lock: bool,
    /// REP/REPE prefix (0xF3)
    pub repe: bool,
    /// REPNE prefix (0xF2)
    pub repne: bool,
    /// Operand size override (0x66)
    pub operand_size: bool,
    /// Address size override (0x67)
    pub address_size: bool,
    pub mandatory: MandatoryPrefix,
    /// REX prefix that immediately precedes the opcode (64-bit mode only)
    pub rex: Option<Rex>,
}

impl Prefixes {
    /// True if any prefix that VEX/EVEX forbids was seen.
    pub fn conflicts_with_vex(&self) -> bool {
        self.rex.is_some() || self.mandatory != MandatoryPrefix::None || self.lock
    }
}

/// Consumes legacy prefixes (and REX in 64-bit mode) up to the first opcode byte.
pub struct PrefixScanner {
    bitness: Bitness,
}

impl PrefixScanner {
    pub fn new(bitness: Bitness) -> Self {
        Self { bitness }
    }

    /// Scans prefixes and returns them with the first non-prefix byte.
    ///
    /// Fails only when the input (or the length limit) runs out.
    pub(crate) fn scan(&self, cursor: &mut ByteCursor<'_>) -> Result<(Prefixes, u8), DecodeError> {
        let is_64 = self.bitness.is_64();
        let mut prefixes = Prefixes::default();

        loop {
            let byte = cursor.read_u8()?;
            match byte {
                0x26 | 0x2E | 0x36 | 0x3E => {
                    // ES/CS/SS/DS are ignored once FS/GS is in effect in 64-bit mode
                    let fs_gs = matches!(prefixes.segment, Register::FS | Register::GS);
                    if !(is_64 && fs_gs) {
                        prefixes.segment = Register::segment((byte >> 3) & 3);
                    }
                }
                0x64 => prefixes.segment = Register::FS,
                0x65 => prefixes.segment = Register::GS,
                0x66 => {
                    prefixes.operand_size = true;
                    if prefixes.mandatory == MandatoryPrefix::None {
                        prefixes.mandatory = MandatoryPrefix::P66;
                    }
                }
                0x67 => prefixes.address_size = true,
                0xF0 => prefixes.lock = true,
                0xF2 => {
                    prefixes.repne = true;
                    prefixes.repe = false;
                    prefixes.mandatory = MandatoryPrefix::PF2;
                }
                0xF3 => {
                    prefixes.repe = true;
                    prefixes.repne = false;
                    prefixes.mandatory = MandatoryPrefix::PF3;
                }
                0x40..=0x4F if is_64 => {
                    prefixes.rex = Some(Rex::from_byte(byte));
                    continue;
                }
                _ => return Ok((prefixes, byte)),
            }
            // A REX prefix only counts when it is the last prefix
            prefixes.rex = None;
        }
    }
}
