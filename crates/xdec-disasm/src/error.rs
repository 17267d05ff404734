//! Decode error types.
//!
//! Every variant is an input-driven outcome. [`Decoder::decode`](crate::Decoder::decode)
//! turns all of them into `Code::INVALID`; [`Decoder::try_decode`](crate::Decoder::try_decode)
//! hands them to the caller.

use thiserror::Error;

/// Error type for instruction decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The input ended before the instruction did.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEndOfInput { offset: usize },

    /// The instruction would exceed the 15-byte architectural limit.
    #[error("instruction at offset {offset} is longer than 15 bytes")]
    InstructionTooLong { offset: usize },

    /// No table entry for the opcode in the current encoding and mode.
    #[error("unknown opcode {opcode:#04x} in {map} map")]
    UnknownOpcode { map: &'static str, opcode: u8 },

    /// The encoding uses a reserved bit pattern.
    #[error("reserved bits set: {reason}")]
    ReservedBitsSet { reason: &'static str },

    /// Prefixes that cannot be combined with this encoding.
    #[error("invalid prefix combination: {reason}")]
    InvalidPrefixCombination { reason: &'static str },

    /// An extension bit selects a register the operand cannot use.
    #[error("register out of range: {reason}")]
    RegisterOutOfRange { reason: &'static str },
}

impl DecodeError {
    /// Creates a new UnexpectedEndOfInput error.
    pub fn end_of_input(offset: usize) -> Self {
        Self::UnexpectedEndOfInput { offset }
    }

    /// Creates a new InstructionTooLong error.
    pub fn too_long(offset: usize) -> Self {
        Self::InstructionTooLong { offset }
    }

    /// Creates a new UnknownOpcode error.
    pub fn unknown_opcode(map: &'static str, opcode: u8) -> Self {
        Self::UnknownOpcode { map, opcode }
    }

    /// Creates a new ReservedBitsSet error.
    pub fn reserved(reason: &'static str) -> Self {
        Self::ReservedBitsSet { reason }
    }

    /// Creates a new InvalidPrefixCombination error.
    pub fn bad_prefixes(reason: &'static str) -> Self {
        Self::InvalidPrefixCombination { reason }
    }

    /// Creates a new RegisterOutOfRange error.
    pub fn register_out_of_range(reason: &'static str) -> Self {
        Self::RegisterOutOfRange { reason }
    }
}
