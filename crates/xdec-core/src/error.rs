//! Error types for xdec-core.

use thiserror::Error;

/// Core error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Processor mode other than 16, 32 or 64 bits.
    #[error("invalid bitness {0}: expected 16, 32 or 64")]
    InvalidBitness(u32),
}
