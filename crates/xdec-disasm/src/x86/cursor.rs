//! Bounds-checked byte reader.

use crate::DecodeError;

/// Longest legal x86 instruction, prefixes included.
pub const MAX_INSTRUCTION_LENGTH: usize = 15;

/// Sequential reader over one instruction's bytes.
///
/// Never reads past the end of the slice or past the 15-byte limit; both
/// conditions surface as errors. Multi-byte reads keep the bytes that were
/// available, so a truncated immediate still counts toward the length.
#[derive(Debug)]
pub(crate) struct ByteCursor<'a> {
    data: &'a [u8],
    start: usize,
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8], start: usize) -> Self {
        Self {
            data,
            start,
            pos: start,
        }
    }

    /// Bytes consumed since construction.
    pub fn consumed(&self) -> usize {
        self.pos - self.start
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        if self.consumed() >= MAX_INSTRUCTION_LENGTH {
            return Err(DecodeError::too_long(self.pos));
        }
        let byte = *self
            .data
            .get(self.pos)
            .ok_or_else(|| DecodeError::end_of_input(self.pos))?;
        self.pos += 1;
        Ok(byte)
    }

    /// Next byte without consuming it, if one may still be read.
    pub fn peek_u8(&self) -> Option<u8> {
        if self.consumed() >= MAX_INSTRUCTION_LENGTH {
            return None;
        }
        self.data.get(self.pos).copied()
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes([self.read_u8()?, self.read_u8()?]))
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes([
            self.read_u8()?,
            self.read_u8()?,
            self.read_u8()?,
            self.read_u8()?,
        ]))
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        let low = self.read_u32()? as u64;
        let high = self.read_u32()? as u64;
        Ok(low | (high << 32))
    }
}
