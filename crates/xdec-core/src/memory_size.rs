//! Memory operand shapes.

/// Size and element layout of the data a memory operand accesses.
///
/// Broadcast variants name the vector width the single loaded element is
/// replicated to; the memory access itself is one element wide.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MemorySize {
    /// Address-only operand (`lea`) or no memory operand at all.
    #[default]
    Unknown,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    UInt128,
    /// 16-bit offset + 16-bit selector
    SegPtr16,
    /// 32-bit offset + 16-bit selector
    SegPtr32,
    /// `bound` pair of 16-bit signed bounds
    Bound16_WordWord,
    /// `bound` pair of 32-bit signed bounds
    Bound32_DwordDword,
    /// XSAVE area, size depends on the enabled state components
    Xsave,
    Xsave64,
    Float32,
    Float64,
    Packed128_Float32,
    Packed128_Float64,
    Packed256_Float32,
    Packed256_Float64,
    Packed512_Float32,
    Packed512_Float64,
    Broadcast128_Float32,
    Broadcast128_Float64,
    Broadcast256_Float32,
    Broadcast256_Float64,
    Broadcast512_Float32,
    Broadcast512_Float64,
}

impl MemorySize {
    /// Number of bytes read or written, 0 when unknown or variable.
    pub const fn size(self) -> usize {
        match self {
            Self::Unknown | Self::Xsave | Self::Xsave64 => 0,
            Self::UInt8 => 1,
            Self::UInt16 => 2,
            Self::UInt32 | Self::Float32 | Self::SegPtr16 | Self::Bound16_WordWord => 4,
            Self::SegPtr32 => 6,
            Self::UInt64 | Self::Float64 | Self::Bound32_DwordDword => 8,
            Self::UInt128 | Self::Packed128_Float32 | Self::Packed128_Float64 => 16,
            Self::Packed256_Float32 | Self::Packed256_Float64 => 32,
            Self::Packed512_Float32 | Self::Packed512_Float64 => 64,
            Self::Broadcast128_Float32
            | Self::Broadcast256_Float32
            | Self::Broadcast512_Float32 => 4,
            Self::Broadcast128_Float64
            | Self::Broadcast256_Float64
            | Self::Broadcast512_Float64 => 8,
        }
    }

    /// Size of one element; equals `size()` for scalar shapes.
    pub const fn element_size(self) -> usize {
        match self {
            Self::Packed128_Float32 | Self::Packed256_Float32 | Self::Packed512_Float32 => 4,
            Self::Packed128_Float64 | Self::Packed256_Float64 | Self::Packed512_Float64 => 8,
            Self::SegPtr16 | Self::SegPtr32 => 0,
            Self::Bound16_WordWord => 2,
            Self::Bound32_DwordDword => 4,
            other => other.size(),
        }
    }

    pub const fn is_broadcast(self) -> bool {
        matches!(
            self,
            Self::Broadcast128_Float32
                | Self::Broadcast128_Float64
                | Self::Broadcast256_Float32
                | Self::Broadcast256_Float64
                | Self::Broadcast512_Float32
                | Self::Broadcast512_Float64
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_reads_one_element() {
        assert_eq!(MemorySize::Broadcast512_Float32.size(), 4);
        assert_eq!(MemorySize::Broadcast256_Float64.size(), 8);
        assert!(MemorySize::Broadcast128_Float32.is_broadcast());
        assert!(!MemorySize::Packed128_Float32.is_broadcast());
    }

    #[test]
    fn test_element_size() {
        assert_eq!(MemorySize::Packed512_Float64.size(), 64);
        assert_eq!(MemorySize::Packed512_Float64.element_size(), 8);
        assert_eq!(MemorySize::Float32.element_size(), 4);
        assert_eq!(MemorySize::Xsave.size(), 0);
    }
}
