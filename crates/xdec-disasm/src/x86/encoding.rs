//! REX/VEX/EVEX field extraction.
//!
//! Each constructor maps the raw prefix bytes to a normalized [`EncodingContext`].
//! The functions are pure; nothing here touches the byte stream.

use super::prefix::{MandatoryPrefix, Prefixes};
use crate::DecodeError;

/// Encoding family of the instruction being decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingSpace {
    #[default]
    Legacy,
    Vex,
    Evex,
}

/// Opcode map selected by escape bytes or the VEX/EVEX map field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpcodeMap {
    #[default]
    Primary,
    Map0F,
    Map0F38,
    Map0F3A,
}

impl OpcodeMap {
    fn from_select(select: u8) -> Option<Self> {
        match select {
            1 => Some(Self::Map0F),
            2 => Some(Self::Map0F38),
            3 => Some(Self::Map0F3A),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Map0F => "0F",
            Self::Map0F38 => "0F38",
            Self::Map0F3A => "0F3A",
        }
    }
}

/// Normalized view of the REX, VEX or EVEX fields of one instruction.
///
/// Register-extension fields hold the value to add to a 3-bit register
/// number (0/8 for R/X/B, 0/16 for R'), already inverted where the encoding
/// stores them inverted, and already zero outside 64-bit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodingContext {
    pub space: EncodingSpace,
    pub map: OpcodeMap,
    pub mandatory: MandatoryPrefix,
    /// REX.W / VEX.W / EVEX.W as encoded, in every mode
    pub w: bool,
    /// ModRM.reg extension
    pub r: u8,
    /// SIB.index extension
    pub x: u8,
    /// ModRM.rm, SIB.base and opcode-register extension
    pub b: u8,
    /// EVEX.R', second ModRM.reg extension
    pub r_prime: u8,
    /// EVEX.X applied to a vector register in ModRM.rm
    pub x_vector: u8,
    /// Register number in vvvv, EVEX.V' included
    pub vvvv: u8,
    /// VEX.L or EVEX.L'L
    pub vector_length: u8,
    /// EVEX opmask selector, 0 = no masking
    pub aaa: u8,
    /// EVEX.z: zeroing instead of merging
    pub z: bool,
    /// EVEX.b: broadcast, or static rounding / SAE on register forms
    pub broadcast: bool,
    /// A REX prefix is in effect (selects SPL..DIL over AH..BH)
    pub has_rex: bool,
}

impl EncodingContext {
    /// Legacy encoding, optionally with a REX prefix.
    pub fn legacy(prefixes: &Prefixes) -> Self {
        let mut ctx = Self {
            mandatory: prefixes.mandatory,
            ..Self::default()
        };
        if let Some(rex) = prefixes.rex {
            ctx.has_rex = true;
            ctx.w = rex.w;
            ctx.r = (rex.r as u8) << 3;
            ctx.x = (rex.x as u8) << 3;
            ctx.b = (rex.b as u8) << 3;
        }
        ctx
    }

    /// Two-byte VEX (C5h): `R̄ v̄v̄v̄v̄ L pp`.
    pub fn from_vex2(byte: u8, is_64: bool) -> Self {
        let mut ctx = Self {
            space: EncodingSpace::Vex,
            map: OpcodeMap::Map0F,
            mandatory: MandatoryPrefix::from_pp(byte),
            vector_length: (byte >> 2) & 1,
            ..Self::default()
        };
        let inverted = !byte;
        if is_64 {
            ctx.r = (inverted >> 4) & 8;
            ctx.vvvv = (inverted >> 3) & 0x0F;
        } else {
            ctx.vvvv = (inverted >> 3) & 0x07;
        }
        ctx
    }

    /// Three-byte VEX (C4h): `R̄X̄B̄ mmmmm`, `W v̄v̄v̄v̄ L pp`.
    pub fn from_vex3(byte1: u8, byte2: u8, is_64: bool) -> Result<Self, DecodeError> {
        let map = OpcodeMap::from_select(byte1 & 0x1F)
            .ok_or_else(|| DecodeError::unknown_opcode("VEX map", byte1 & 0x1F))?;
        let mut ctx = Self {
            space: EncodingSpace::Vex,
            map,
            mandatory: MandatoryPrefix::from_pp(byte2),
            w: byte2 & 0x80 != 0,
            vector_length: (byte2 >> 2) & 1,
            ..Self::default()
        };
        if is_64 {
            // Inverted
            let ext = !byte1;
            ctx.r = (ext >> 4) & 8;
            ctx.x = (ext >> 3) & 8;
            ctx.b = (ext >> 2) & 8;
            ctx.vvvv = (!byte2 >> 3) & 0x0F;
        } else {
            ctx.vvvv = (!byte2 >> 3) & 0x07;
        }
        Ok(ctx)
    }

    /// EVEX (62h): `R̄X̄B̄R̄' 0 0 mm`, `W v̄v̄v̄v̄ 1 pp`, `z L'L b V̄' aaa`.
    ///
    /// Only the bits that make the rest of the instruction undecodable are
    /// rejected here. `z` without an opmask is left to the decoder.
    pub fn from_evex(p0: u8, p1: u8, p2: u8, is_64: bool) -> Result<Self, DecodeError> {
        if p1 & 0x04 == 0 {
            return Err(DecodeError::reserved("EVEX P1 bit 2 must be set"));
        }
        if p0 & 0x0C != 0 {
            return Err(DecodeError::reserved("EVEX P0 bits 3:2 must be zero"));
        }
        let map = OpcodeMap::from_select(p0 & 3)
            .ok_or_else(|| DecodeError::unknown_opcode("EVEX map", p0 & 3))?;

        let mut ctx = Self {
            space: EncodingSpace::Evex,
            map,
            mandatory: MandatoryPrefix::from_pp(p1),
            w: p1 & 0x80 != 0,
            vector_length: (p2 >> 5) & 3,
            aaa: p2 & 7,
            z: p2 & 0x80 != 0,
            broadcast: p2 & 0x10 != 0,
            ..Self::default()
        };
        if is_64 {
            let ext = !p0;
            ctx.r = (ext >> 4) & 8;
            ctx.x = (ext >> 3) & 8;
            ctx.b = (ext >> 2) & 8;
            ctx.r_prime = ext & 0x10;
            ctx.x_vector = (ext & 0x40) >> 2;
            ctx.vvvv = ((!p1 >> 3) & 0x0F) + ((!p2 & 8) << 1);
        } else {
            ctx.vvvv = (!p1 >> 3) & 0x07;
        }
        Ok(ctx)
    }

    pub fn is_legacy(&self) -> bool {
        self.space == EncodingSpace::Legacy
    }

    pub fn is_evex(&self) -> bool {
        self.space == EncodingSpace::Evex
    }
}
