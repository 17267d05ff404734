//! # xdec-core
//!
//! Data model for the xdec x86/x64 decoder. This crate defines the
//! value types a decoded instruction is made of: the `Code` tag, registers,
//! memory operand shapes, operand kinds and the `Instruction` record itself.
//!
//! Nothing here decodes bytes; see `xdec-disasm` for that.

pub mod bitness;
pub mod code;
pub mod error;
pub mod instruction;
pub mod memory_size;
pub mod register;

pub use bitness::Bitness;
pub use code::{Code, EncodingKind};
pub use error::Error;
pub use instruction::{
    ConstantOffsets, Instruction, MemoryOperand, OpKind, Operand, RoundingControl,
};
pub use memory_size::MemorySize;
pub use register::Register;
