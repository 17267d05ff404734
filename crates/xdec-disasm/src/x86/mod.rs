//! x86/x64 instruction decoder.
//!
//! Decoding runs in fixed stages:
//! - legacy prefixes and REX ([`prefix`])
//! - escape bytes, VEX and EVEX payloads ([`encoding`])
//! - a walk through the static opcode tables down to a template
//! - ModR/M, SIB and displacement, then registers and immediates
//!
//! Every stage reads through one bounds-checked cursor, so no byte pattern can
//! read past the input or past the 15-byte instruction limit.

mod cursor;
mod decoder;
pub mod encoding;
mod modrm;
mod opcodes;
mod opcodes_0f;
mod opcodes_evex;
mod opcodes_vex;
mod operand;
pub mod prefix;

pub use cursor::MAX_INSTRUCTION_LENGTH;
pub use decoder::{Decoder, X86Disassembler};
pub use encoding::{EncodingContext, EncodingSpace, OpcodeMap};
pub use prefix::MandatoryPrefix;
