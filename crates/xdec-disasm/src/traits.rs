//! Disassembler traits.

use crate::DecodeError;
use xdec_core::{Bitness, Instruction};

/// Decoder for one instruction set and processor mode.
pub trait Disassembler {
    /// Decode a single instruction starting at the given address.
    ///
    /// # Arguments
    /// * `bytes` - The raw bytes to decode
    /// * `address` - The virtual address of the first byte
    ///
    /// # Returns
    /// The decoded instruction; its length is the number of bytes consumed.
    fn decode_instruction(&self, bytes: &[u8], address: u64) -> Result<Instruction, DecodeError>;

    /// Returns the minimum instruction size.
    fn min_instruction_size(&self) -> usize {
        1
    }

    /// Returns the maximum instruction size.
    fn max_instruction_size(&self) -> usize;

    /// Returns the processor mode instructions are decoded in.
    fn bitness(&self) -> Bitness;

    /// Disassemble a block of code into instructions.
    fn disassemble_block(
        &self,
        bytes: &[u8],
        start_address: u64,
    ) -> Vec<Result<Instruction, DecodeError>> {
        let mut instructions = Vec::new();
        let mut offset = 0;

        while offset < bytes.len() {
            let remaining = &bytes[offset..];
            let address = start_address.wrapping_add(offset as u64);

            match self.decode_instruction(remaining, address) {
                Ok(instruction) => {
                    offset += instruction.len();
                    instructions.push(Ok(instruction));
                }
                Err(e) => {
                    // On error, skip one byte and continue
                    offset += 1;
                    instructions.push(Err(e));
                }
            }
        }

        instructions
    }
}
