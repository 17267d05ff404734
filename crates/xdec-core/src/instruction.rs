//! The decoded instruction record.

use crate::{Code, MemorySize, Register};

/// Kind of an operand slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpKind {
    Register,
    NearBranch16,
    NearBranch32,
    NearBranch64,
    Immediate8,
    Immediate16,
    Immediate32,
    Immediate64,
    Immediate8to16,
    Immediate8to32,
    Immediate8to64,
    Immediate32to64,
    Memory,
}

/// EVEX static rounding mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoundingControl {
    #[default]
    None,
    RoundToNearest,
    RoundDown,
    RoundUp,
    RoundTowardZero,
}

/// One operand slot. The variant is the operand kind and carries its payload.
///
/// Memory operands carry no payload here: an instruction has at most one, and
/// its addressing lives in [`Instruction::memory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operand {
    Register(Register),
    Memory,
    Immediate8(u8),
    Immediate16(u16),
    Immediate32(u32),
    Immediate64(u64),
    /// imm8 sign-extended to 16 bits
    Immediate8to16(i8),
    /// imm8 sign-extended to 32 bits
    Immediate8to32(i8),
    /// imm8 sign-extended to 64 bits
    Immediate8to64(i8),
    /// imm32 sign-extended to 64 bits
    Immediate32to64(i32),
    /// Absolute branch target
    NearBranch16(u16),
    NearBranch32(u32),
    NearBranch64(u64),
}

impl Default for Operand {
    fn default() -> Self {
        Operand::Register(Register::None)
    }
}

impl Operand {
    pub const fn kind(&self) -> OpKind {
        match self {
            Operand::Register(_) => OpKind::Register,
            Operand::Memory => OpKind::Memory,
            Operand::Immediate8(_) => OpKind::Immediate8,
            Operand::Immediate16(_) => OpKind::Immediate16,
            Operand::Immediate32(_) => OpKind::Immediate32,
            Operand::Immediate64(_) => OpKind::Immediate64,
            Operand::Immediate8to16(_) => OpKind::Immediate8to16,
            Operand::Immediate8to32(_) => OpKind::Immediate8to32,
            Operand::Immediate8to64(_) => OpKind::Immediate8to64,
            Operand::Immediate32to64(_) => OpKind::Immediate32to64,
            Operand::NearBranch16(_) => OpKind::NearBranch16,
            Operand::NearBranch32(_) => OpKind::NearBranch32,
            Operand::NearBranch64(_) => OpKind::NearBranch64,
        }
    }

    /// Immediate value extended to the operand's width, then zero-extended to 64 bits.
    pub const fn immediate(&self) -> Option<u64> {
        match *self {
            Operand::Immediate8(v) => Some(v as u64),
            Operand::Immediate16(v) => Some(v as u64),
            Operand::Immediate32(v) => Some(v as u64),
            Operand::Immediate64(v) => Some(v),
            Operand::Immediate8to16(v) => Some(v as i16 as u16 as u64),
            Operand::Immediate8to32(v) => Some(v as i32 as u32 as u64),
            Operand::Immediate8to64(v) => Some(v as i64 as u64),
            Operand::Immediate32to64(v) => Some(v as i64 as u64),
            _ => None,
        }
    }

    pub const fn near_branch(&self) -> Option<u64> {
        match *self {
            Operand::NearBranch16(v) => Some(v as u64),
            Operand::NearBranch32(v) => Some(v as u64),
            Operand::NearBranch64(v) => Some(v),
            _ => None,
        }
    }
}

/// Addressing of the instruction's memory operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryOperand {
    /// Effective segment: the override prefix if present, else the default.
    pub segment: Register,
    /// Base register; `RIP`/`EIP` for instruction-relative addressing.
    pub base: Register,
    pub index: Register,
    /// 1, 2, 4 or 8, as encoded. A SIB byte without an index still carries its scale bits.
    pub scale: u8,
    /// Displacement sized to the address width. For `RIP`/`EIP` bases this is the
    /// absolute target.
    pub displacement: u64,
    /// Encoded displacement size in bytes: 0, 1, 2 or 4.
    pub displ_size: u8,
    pub size: MemorySize,
}

impl Default for MemoryOperand {
    fn default() -> Self {
        Self {
            segment: Register::None,
            base: Register::None,
            index: Register::None,
            scale: 1,
            displacement: 0,
            displ_size: 0,
            size: MemorySize::Unknown,
        }
    }
}

/// Location of the displacement and immediate bytes inside the instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstantOffsets {
    pub displacement_offset: u8,
    pub displacement_size: u8,
    pub immediate_offset: u8,
    pub immediate_size: u8,
}

impl ConstantOffsets {
    pub const fn has_displacement(&self) -> bool {
        self.displacement_size != 0
    }

    pub const fn has_immediate(&self) -> bool {
        self.immediate_size != 0
    }
}

const MAX_OPERANDS: usize = 4;

const PREFIX_REPE: u8 = 1 << 0;
const PREFIX_REPNE: u8 = 1 << 1;
const PREFIX_LOCK: u8 = 1 << 2;

/// A decoded instruction.
///
/// Produced by value for every decode call; an undecodable byte sequence
/// yields `Code::INVALID` with every other field at its default, except the
/// instruction pointer and the number of bytes consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instruction {
    ip: u64,
    len: u8,
    code: Code,
    op_count: u8,
    operands: [Operand; MAX_OPERANDS],
    memory: MemoryOperand,
    segment_prefix: Register,
    prefixes: u8,
    op_mask: Register,
    zeroing_masking: bool,
    broadcast: bool,
    rounding_control: RoundingControl,
    suppress_all_exceptions: bool,
    offsets: ConstantOffsets,
}

impl Instruction {
    /// Creates an `INVALID` instruction covering `len` bytes at `ip`.
    pub fn invalid(ip: u64, len: usize) -> Self {
        let mut instruction = Self::default();
        instruction.set_ip(ip);
        instruction.set_len(len);
        instruction
    }

    // Accessors

    pub const fn code(&self) -> Code {
        self.code
    }

    pub const fn is_invalid(&self) -> bool {
        self.code.is_invalid()
    }

    /// Address of the first byte.
    pub const fn ip(&self) -> u64 {
        self.ip
    }

    /// Number of bytes the instruction occupies.
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// True when no bytes were consumed (decode at end of input).
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn next_ip(&self) -> u64 {
        self.ip.wrapping_add(self.len as u64)
    }

    pub const fn op_count(&self) -> usize {
        self.op_count as usize
    }

    /// The populated operand slots.
    pub fn operands(&self) -> &[Operand] {
        &self.operands[..self.op_count()]
    }

    /// Operand slot `index`; unused slots hold `Operand::Register(Register::None)`.
    pub fn op(&self, index: usize) -> Operand {
        self.operands.get(index).copied().unwrap_or_default()
    }

    pub fn op_kind(&self, index: usize) -> OpKind {
        self.op(index).kind()
    }

    /// Register of operand `index`, or `Register::None` if it is not a register.
    pub fn op_register(&self, index: usize) -> Register {
        match self.op(index) {
            Operand::Register(reg) => reg,
            _ => Register::None,
        }
    }

    /// Immediate value of operand `index` (see [`Operand::immediate`]).
    pub fn immediate(&self, index: usize) -> Option<u64> {
        self.op(index).immediate()
    }

    /// Value of the first `Immediate8` operand, 0 if there is none.
    pub fn immediate8(&self) -> u8 {
        self.operands()
            .iter()
            .find_map(|op| match op {
                Operand::Immediate8(v) => Some(*v),
                _ => None,
            })
            .unwrap_or(0)
    }

    /// Target of the first near-branch operand.
    pub fn near_branch_target(&self) -> Option<u64> {
        self.operands().iter().find_map(Operand::near_branch)
    }

    pub fn has_memory_operand(&self) -> bool {
        self.operands().iter().any(|op| matches!(op, Operand::Memory))
    }

    pub const fn memory(&self) -> &MemoryOperand {
        &self.memory
    }

    pub const fn memory_segment(&self) -> Register {
        self.memory.segment
    }

    pub const fn memory_base(&self) -> Register {
        self.memory.base
    }

    pub const fn memory_index(&self) -> Register {
        self.memory.index
    }

    pub const fn memory_index_scale(&self) -> u32 {
        self.memory.scale as u32
    }

    /// Low 32 bits of the displacement.
    pub const fn memory_displacement(&self) -> u32 {
        self.memory.displacement as u32
    }

    pub const fn memory_displacement64(&self) -> u64 {
        self.memory.displacement
    }

    pub const fn memory_displ_size(&self) -> u32 {
        self.memory.displ_size as u32
    }

    pub const fn memory_size(&self) -> MemorySize {
        self.memory.size
    }

    /// Segment override prefix as encoded, `Register::None` if absent.
    pub const fn segment_prefix(&self) -> Register {
        self.segment_prefix
    }

    pub const fn has_repe_prefix(&self) -> bool {
        self.prefixes & PREFIX_REPE != 0
    }

    pub const fn has_repne_prefix(&self) -> bool {
        self.prefixes & PREFIX_REPNE != 0
    }

    pub const fn has_lock_prefix(&self) -> bool {
        self.prefixes & PREFIX_LOCK != 0
    }

    /// EVEX opmask register, `Register::None` when unmasked.
    pub const fn op_mask(&self) -> Register {
        self.op_mask
    }

    pub const fn has_op_mask(&self) -> bool {
        !matches!(self.op_mask, Register::None)
    }

    pub const fn zeroing_masking(&self) -> bool {
        self.zeroing_masking
    }

    pub const fn merging_masking(&self) -> bool {
        !self.zeroing_masking
    }

    /// True when the memory operand is an EVEX embedded broadcast.
    pub const fn is_broadcast(&self) -> bool {
        self.broadcast
    }

    pub const fn rounding_control(&self) -> RoundingControl {
        self.rounding_control
    }

    pub const fn suppress_all_exceptions(&self) -> bool {
        self.suppress_all_exceptions
    }

    pub const fn constant_offsets(&self) -> ConstantOffsets {
        self.offsets
    }

    // Setters used by the decoder

    pub fn set_code(&mut self, code: Code) {
        self.code = code;
    }

    pub fn set_ip(&mut self, ip: u64) {
        self.ip = ip;
    }

    /// Sets the byte length; x86 instructions are at most 15 bytes long.
    pub fn set_len(&mut self, len: usize) {
        self.len = len.min(u8::MAX as usize) as u8;
    }

    /// Appends an operand. Returns false if all four slots are taken.
    pub fn push_operand(&mut self, operand: Operand) -> bool {
        let Some(slot) = self.operands.get_mut(self.op_count as usize) else {
            return false;
        };
        *slot = operand;
        self.op_count += 1;
        true
    }

    pub fn set_memory(&mut self, memory: MemoryOperand) {
        self.memory = memory;
    }

    pub fn set_memory_size(&mut self, size: MemorySize) {
        self.memory.size = size;
    }

    pub fn set_segment_prefix(&mut self, segment: Register) {
        self.segment_prefix = segment;
    }

    fn set_prefix_flag(&mut self, flag: u8, value: bool) {
        if value {
            self.prefixes |= flag;
        } else {
            self.prefixes &= !flag;
        }
    }

    pub fn set_repe_prefix(&mut self, value: bool) {
        self.set_prefix_flag(PREFIX_REPE, value);
    }

    pub fn set_repne_prefix(&mut self, value: bool) {
        self.set_prefix_flag(PREFIX_REPNE, value);
    }

    pub fn set_lock_prefix(&mut self, value: bool) {
        self.set_prefix_flag(PREFIX_LOCK, value);
    }

    pub fn set_op_mask(&mut self, op_mask: Register) {
        self.op_mask = op_mask;
    }

    pub fn set_zeroing_masking(&mut self, value: bool) {
        self.zeroing_masking = value;
    }

    pub fn set_broadcast(&mut self, value: bool) {
        self.broadcast = value;
    }

    pub fn set_rounding_control(&mut self, rc: RoundingControl) {
        self.rounding_control = rc;
    }

    pub fn set_suppress_all_exceptions(&mut self, value: bool) {
        self.suppress_all_exceptions = value;
    }

    pub fn set_constant_offsets(&mut self, offsets: ConstantOffsets) {
        self.offsets = offsets;
    }
}
