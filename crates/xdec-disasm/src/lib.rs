//! # xdec-disasm
//!
//! Table-driven x86/x64 instruction decoder.
//!
//! Decodes 16-, 32- and 64-bit machine code with legacy, REX, VEX and EVEX
//! encodings into [`xdec_core::Instruction`] values:
//!
//! ```
//! use xdec_core::{Bitness, Code, Register};
//! use xdec_disasm::Decoder;
//!
//! let mut decoder = Decoder::new(Bitness::Bits32, &[0x0F, 0xC0, 0x38], 0);
//! let instr = decoder.decode();
//! assert_eq!(instr.code(), Code::Xadd_rm8_r8);
//! assert_eq!(instr.memory_base(), Register::EAX);
//! assert_eq!(instr.op_register(1), Register::BH);
//! ```
//!
//! Malformed input never panics and never aborts a scan: [`Decoder::decode`]
//! reports it as `Code::INVALID` with the number of bytes consumed.

pub mod error;
pub mod traits;
pub mod x86;

pub use error::DecodeError;
pub use traits::Disassembler;
pub use x86::{Decoder, EncodingContext, X86Disassembler, MAX_INSTRUCTION_LENGTH};
