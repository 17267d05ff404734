//! x86/x64 instruction decoder.

use super::cursor::{ByteCursor, MAX_INSTRUCTION_LENGTH};
use super::encoding::{EncodingContext, EncodingSpace, OpcodeMap};
use super::modrm::{decode_address, Address, AddressSize, ModRm};
use super::opcodes::{OpEntry, Op, Select, Template, ER, K1, LOCK, PRIMARY, SAE, Z};
use super::opcodes_0f::MAP_0F;
use super::opcodes_evex::EVEX_0F;
use super::opcodes_vex::VEX_0F;
use super::operand::OperandResolver;
use super::prefix::{MandatoryPrefix, PrefixScanner, Prefixes};
use crate::error::DecodeError;
use crate::traits::Disassembler;
use xdec_core::{
    Bitness, Code, ConstantOffsets, Instruction, MemoryOperand, MemorySize, Operand, Register,
    RoundingControl,
};

/// Decodes instructions from a byte slice, one per call.
///
/// The decoder only remembers its position and instruction pointer; every
/// instruction is decoded from scratch.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    bitness: Bitness,
    data: &'a [u8],
    position: usize,
    ip: u64,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder over `data`; `ip` is the address of `data[0]`.
    pub fn new(bitness: Bitness, data: &'a [u8], ip: u64) -> Self {
        Self {
            bitness,
            data,
            position: 0,
            ip,
        }
    }

    pub fn bitness(&self) -> Bitness {
        self.bitness
    }

    /// Offset of the next instruction in the input.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves to `position`. The instruction pointer is left unchanged.
    pub fn set_position(&mut self, position: usize) {
        self.position = position.min(self.data.len());
    }

    /// Address of the next instruction.
    pub fn ip(&self) -> u64 {
        self.ip
    }

    pub fn set_ip(&mut self, ip: u64) {
        self.ip = ip;
    }

    /// True while input remains.
    pub fn can_decode(&self) -> bool {
        self.position < self.data.len()
    }

    /// Decodes the next instruction.
    ///
    /// Malformed input yields `Code::INVALID`. Its length spans the whole
    /// instruction when only a field is illegal (a misplaced LOCK, a nonzero
    /// vvvv, a disallowed opmask), and the bytes read so far when the input is
    /// truncated or the opcode is undefined.
    pub fn decode(&mut self) -> Instruction {
        let ip = self.ip;
        let (result, len) = self.decode_next();
        result.unwrap_or_else(|error| {
            tracing::trace!(ip, len, %error, "invalid instruction");
            Instruction::invalid(ip, len)
        })
    }

    /// Like [`Decoder::decode`], but reports why an instruction is invalid.
    ///
    /// The position advances past the consumed bytes either way.
    pub fn try_decode(&mut self) -> Result<Instruction, DecodeError> {
        self.decode_next().0
    }

    fn decode_next(&mut self) -> (Result<Instruction, DecodeError>, usize) {
        let mut cursor = ByteCursor::new(self.data, self.position);
        let result = InstructionDecoder {
            bitness: self.bitness,
            ip: self.ip,
        }
        .decode(&mut cursor);
        let len = cursor.consumed();
        self.position += len;
        self.ip = self.ip.wrapping_add(len as u64);
        (result, len)
    }
}

impl Iterator for Decoder<'_> {
    type Item = Instruction;

    fn next(&mut self) -> Option<Self::Item> {
        if self.can_decode() {
            Some(self.decode())
        } else {
            None
        }
    }
}

/// Per-instruction decoding state.
struct InstructionDecoder {
    bitness: Bitness,
    ip: u64,
}

/// Prefix effects that survive the table walk.
#[derive(Debug, Clone, Copy)]
struct PrefixState {
    operand_size: bool,
    repe: bool,
    repne: bool,
}

/// First encoding defect found in an otherwise decodable instruction.
///
/// A defect marks the instruction invalid but decoding carries on, so the
/// reported length still spans its displacement and immediates.
#[derive(Debug, Default)]
struct Defect(Option<DecodeError>);

impl Defect {
    fn record(&mut self, error: DecodeError) {
        self.0.get_or_insert(error);
    }

    fn into_result<T>(self, value: T) -> Result<T, DecodeError> {
        match self.0 {
            Some(error) => Err(error),
            None => Ok(value),
        }
    }
}

impl InstructionDecoder {
    fn is_64(&self) -> bool {
        self.bitness.is_64()
    }

    fn decode(&self, cursor: &mut ByteCursor<'_>) -> Result<Instruction, DecodeError> {
        let (prefixes, first) = PrefixScanner::new(self.bitness).scan(cursor)?;
        let (ctx, opcode) = self.read_opcode(cursor, &prefixes, first)?;

        let mut defect = Defect::default();
        if !ctx.is_legacy() && prefixes.conflicts_with_vex() {
            defect.record(DecodeError::bad_prefixes("VEX/EVEX after REX, 66h, F2h, F3h or LOCK"));
        }

        let table: &'static [OpEntry; 256] = match (ctx.space, ctx.map) {
            (EncodingSpace::Legacy, OpcodeMap::Primary) => &PRIMARY,
            (EncodingSpace::Legacy, OpcodeMap::Map0F) => &MAP_0F,
            (EncodingSpace::Vex, OpcodeMap::Map0F) => &VEX_0F,
            (EncodingSpace::Evex, OpcodeMap::Map0F) => &EVEX_0F,
            _ => return Err(DecodeError::unknown_opcode(ctx.map.name(), opcode)),
        };

        let mut state = PrefixState {
            operand_size: prefixes.operand_size,
            repe: prefixes.repe,
            repne: prefixes.repne,
        };
        let mut modrm = None;
        let unknown = || DecodeError::unknown_opcode(ctx.map.name(), opcode);
        let template = self
            .walk(&table[opcode as usize], cursor, &ctx, &mut state, &mut modrm)?
            .ok_or_else(unknown)?;

        if modrm.is_none() && template.uses_modrm() {
            modrm = Some(ModRm::parse(cursor.read_u8()?));
        }

        let slot = self.slot(template.select, state.operand_size, ctx.w);
        let code = template.codes[slot];
        if code == Code::INVALID {
            return Err(unknown());
        }

        let mut instruction = Instruction::default();
        instruction.set_code(code);
        self.check_evex(&mut instruction, template, &ctx, modrm, &mut defect);
        if !ctx.is_legacy() && !template.uses_vvvv() && ctx.vvvv != 0 {
            defect.record(DecodeError::reserved("vvvv must be 1111b"));
        }

        // Memory operand: SIB and displacement precede any immediate
        let memory_op = template.ops.iter().any(|&op| is_memory_capable(op));
        let mut address = None;
        if let Some(modrm) = modrm.filter(|m| !m.is_register()) {
            if template.ops.iter().any(|op| matches!(op, Op::Ux | Op::N)) {
                return Err(unknown());
            }
            if memory_op {
                let size = self.memory_size(template, &ctx, slot, &mut defect);
                let disp8_scale = if ctx.is_evex() { size.size().max(1) as u32 } else { 1 };
                let address_size = AddressSize::resolve(self.bitness, prefixes.address_size);
                address = Some(decode_address(
                    cursor,
                    modrm,
                    address_size,
                    &ctx,
                    self.is_64(),
                    disp8_scale,
                )?);
                instruction.set_broadcast(ctx.is_evex() && ctx.broadcast);
                instruction.set_memory_size(size);
            }
        } else if template.ops.contains(&Op::M) {
            return Err(unknown());
        }

        if prefixes.lock && !(template.has(LOCK) && address.is_some()) {
            defect.record(DecodeError::bad_prefixes("LOCK not allowed on this instruction"));
        }

        let resolver = OperandResolver {
            ctx: &ctx,
            modrm,
            opcode,
            slot,
            ip: self.ip,
        };
        let mut offsets = ConstantOffsets::default();
        for &op in template.ops {
            let operand = if address.is_some() && is_memory_capable(op) {
                Operand::Memory
            } else if is_immediate(op) {
                let immediate = resolver.immediate(op, cursor)?;
                if offsets.immediate_size == 0 {
                    offsets.immediate_offset = immediate.offset as u8;
                    offsets.immediate_size = immediate.size;
                }
                immediate.operand
            } else {
                match resolver.register(op) {
                    Ok(register) => Operand::Register(register),
                    Err(error) => {
                        defect.record(error);
                        Operand::Register(Register::None)
                    }
                }
            };
            instruction.push_operand(operand);
        }

        let len = cursor.consumed();
        debug_assert!(len <= MAX_INSTRUCTION_LENGTH);
        if let Some(mut address) = address {
            if address.is_ip_relative() {
                address.relocate(self.ip.wrapping_add(len as u64));
            }
            if address.displ_size != 0 {
                offsets.displacement_offset = address.displ_offset as u8;
                offsets.displacement_size = address.displ_size;
            }
            let segment = match prefixes.segment {
                Register::None => address.default_segment(),
                segment => segment,
            };
            instruction.set_memory(memory_operand(&address, segment, instruction.memory_size()));
        }

        instruction.set_ip(self.ip);
        instruction.set_len(len);
        instruction.set_segment_prefix(prefixes.segment);
        instruction.set_lock_prefix(prefixes.lock);
        instruction.set_repe_prefix(state.repe);
        instruction.set_repne_prefix(state.repne);
        instruction.set_constant_offsets(offsets);
        defect.into_result(instruction)
    }

    /// Reads escape and VEX/EVEX bytes and the opcode byte that follows them.
    fn read_opcode(
        &self,
        cursor: &mut ByteCursor<'_>,
        prefixes: &Prefixes,
        first: u8,
    ) -> Result<(EncodingContext, u8), DecodeError> {
        let is_64 = self.is_64();
        // Outside 64-bit mode C4/C5/62 are LES/LDS/BOUND unless a register-form ModRM follows
        let vex_follows = is_64 || cursor.peek_u8().is_some_and(|next| next >= 0xC0);

        let ctx = match first {
            0x0F => {
                let mut ctx = EncodingContext::legacy(prefixes);
                let opcode = cursor.read_u8()?;
                match opcode {
                    0x38 | 0x3A => {
                        ctx.map = if opcode == 0x38 {
                            OpcodeMap::Map0F38
                        } else {
                            OpcodeMap::Map0F3A
                        };
                        let opcode = cursor.read_u8()?;
                        return Err(DecodeError::unknown_opcode(ctx.map.name(), opcode));
                    }
                    _ => {
                        ctx.map = OpcodeMap::Map0F;
                        return Ok((ctx, opcode));
                    }
                }
            }
            0xC5 if vex_follows => {
                let byte = cursor.read_u8()?;
                EncodingContext::from_vex2(byte, is_64)
            }
            0xC4 if vex_follows => {
                let byte1 = cursor.read_u8()?;
                let byte2 = cursor.read_u8()?;
                EncodingContext::from_vex3(byte1, byte2, is_64)?
            }
            0x62 if vex_follows => {
                let p0 = cursor.read_u8()?;
                let p1 = cursor.read_u8()?;
                let p2 = cursor.read_u8()?;
                EncodingContext::from_evex(p0, p1, p2, is_64)?
            }
            opcode => return Ok((EncodingContext::legacy(prefixes), opcode)),
        };
        let opcode = cursor.read_u8()?;
        Ok((ctx, opcode))
    }

    /// Walks nested table nodes down to a template, reading ModRM on demand.
    ///
    /// Returns `None` when the walk ends on an undefined entry.
    fn walk(
        &self,
        mut entry: &'static OpEntry,
        cursor: &mut ByteCursor<'_>,
        ctx: &EncodingContext,
        state: &mut PrefixState,
        modrm: &mut Option<ModRm>,
    ) -> Result<Option<&'static Template>, DecodeError> {
        let mut read_modrm = |cursor: &mut ByteCursor<'_>| -> Result<ModRm, DecodeError> {
            if let Some(m) = *modrm {
                return Ok(m);
            }
            let m = ModRm::parse(cursor.read_u8()?);
            *modrm = Some(m);
            Ok(m)
        };

        loop {
            entry = match *entry {
                OpEntry::Invalid => return Ok(None),
                OpEntry::Plain(ref template) => return Ok(Some(template)),
                OpEntry::Group(table) => &table[read_modrm(cursor)?.reg as usize],
                OpEntry::ModSplit { reg, mem } => {
                    if read_modrm(cursor)?.is_register() {
                        reg
                    } else {
                        mem
                    }
                }
                OpEntry::Prefix { table, keep_66 } => {
                    match ctx.mandatory {
                        MandatoryPrefix::P66 if !keep_66 => state.operand_size = false,
                        MandatoryPrefix::PF3 => state.repe = false,
                        MandatoryPrefix::PF2 => state.repne = false,
                        _ => {}
                    }
                    &table[ctx.mandatory.index()]
                }
                OpEntry::W(table) => &table[ctx.w as usize],
                OpEntry::Length(table) => &table[ctx.vector_length as usize & 3],
                OpEntry::LengthEr(table) => {
                    if ctx.broadcast && read_modrm(cursor)?.is_register() {
                        &table[2]
                    } else {
                        &table[ctx.vector_length as usize & 3]
                    }
                }
                OpEntry::Mode { legacy, long } => {
                    if self.is_64() {
                        long
                    } else {
                        legacy
                    }
                }
                OpEntry::RexB { clear, set } => {
                    if ctx.b != 0 {
                        set
                    } else {
                        clear
                    }
                }
            };
        }
    }

    /// Picks the template's code slot: 0, 1, 2 for 16-, 32-, 64-bit forms.
    fn slot(&self, select: Select, operand_size: bool, w: bool) -> usize {
        let op_size = || match self.bitness {
            Bitness::Bits64 if w => 2,
            Bitness::Bits64 | Bitness::Bits32 => usize::from(!operand_size),
            Bitness::Bits16 => usize::from(operand_size),
        };
        match select {
            Select::Fixed => 0,
            Select::OpSize => op_size(),
            Select::W => 1 + usize::from(w && self.is_64()),
            Select::Mode => 1 + usize::from(self.is_64()),
            Select::Branch if self.is_64() => 2,
            Select::Branch => op_size(),
            Select::Stack if self.is_64() => {
                if operand_size && !w {
                    0
                } else {
                    2
                }
            }
            Select::Stack => op_size(),
        }
    }

    /// Memory operand size, switching to the broadcast element for EVEX.b.
    fn memory_size(
        &self,
        template: &Template,
        ctx: &EncodingContext,
        slot: usize,
        defect: &mut Defect,
    ) -> MemorySize {
        if ctx.is_evex() && ctx.broadcast {
            if template.bcst != MemorySize::Unknown {
                return template.bcst;
            }
            defect.record(DecodeError::reserved(
                "EVEX.b on a memory operand that cannot broadcast",
            ));
        }
        template.mems[slot]
    }

    /// Validates and records the EVEX opmask, zeroing and rounding fields.
    fn check_evex(
        &self,
        instruction: &mut Instruction,
        template: &Template,
        ctx: &EncodingContext,
        modrm: Option<ModRm>,
        defect: &mut Defect,
    ) {
        if !ctx.is_evex() {
            return;
        }
        if ctx.aaa != 0 {
            if !template.has(K1) {
                defect.record(DecodeError::reserved("opmask not allowed"));
            }
            instruction.set_op_mask(Register::k(ctx.aaa));
        }
        if ctx.z {
            if ctx.aaa == 0 {
                defect.record(DecodeError::reserved("EVEX zeroing without an opmask"));
            }
            if !template.has(Z) {
                defect.record(DecodeError::reserved("zeroing-masking not allowed"));
            }
            instruction.set_zeroing_masking(true);
        }
        if ctx.broadcast && modrm.is_some_and(|m| m.is_register()) {
            if template.has(ER) {
                instruction.set_rounding_control(rounding_control(ctx.vector_length));
                instruction.set_suppress_all_exceptions(true);
            } else if template.has(SAE) {
                instruction.set_suppress_all_exceptions(true);
            } else {
                defect.record(DecodeError::reserved(
                    "EVEX.b on a register operand without rounding or sae",
                ));
            }
        }
    }
}

fn rounding_control(vector_length: u8) -> RoundingControl {
    match vector_length & 3 {
        0 => RoundingControl::RoundToNearest,
        1 => RoundingControl::RoundDown,
        2 => RoundingControl::RoundUp,
        _ => RoundingControl::RoundTowardZero,
    }
}

/// Operands that become memory operands when ModRM.mod != 11.
fn is_memory_capable(op: Op) -> bool {
    matches!(op, Op::Eb | Op::Ev | Op::M | Op::Wx | Op::Wy | Op::Wz)
}

fn is_immediate(op: Op) -> bool {
    matches!(op, Op::Ib | Op::Iw | Op::Iz | Op::IbSx | Op::Iv | Op::Jb | Op::Jz)
}

fn memory_operand(address: &Address, segment: Register, size: MemorySize) -> MemoryOperand {
    MemoryOperand {
        segment,
        base: address.base,
        index: address.index,
        scale: address.scale,
        displacement: address.displacement,
        displ_size: address.displ_size,
        size,
    }
}

/// [`Disassembler`] front end for one processor mode.
#[derive(Debug, Clone, Copy)]
pub struct X86Disassembler {
    bitness: Bitness,
}

impl X86Disassembler {
    pub fn new(bitness: Bitness) -> Self {
        Self { bitness }
    }
}

impl Default for X86Disassembler {
    fn default() -> Self {
        Self::new(Bitness::Bits64)
    }
}

impl Disassembler for X86Disassembler {
    fn decode_instruction(&self, bytes: &[u8], address: u64) -> Result<Instruction, DecodeError> {
        Decoder::new(self.bitness, bytes, address).try_decode()
    }

    /// Rejected instructions advance by the bytes they consumed, like
    /// [`Decoder`], so the block stays aligned with the instruction stream.
    fn disassemble_block(
        &self,
        bytes: &[u8],
        start_address: u64,
    ) -> Vec<Result<Instruction, DecodeError>> {
        let mut decoder = Decoder::new(self.bitness, bytes, start_address);
        let mut instructions = Vec::new();
        while decoder.can_decode() {
            instructions.push(decoder.try_decode());
        }
        instructions
    }

    fn max_instruction_size(&self) -> usize {
        MAX_INSTRUCTION_LENGTH
    }

    fn bitness(&self) -> Bitness {
        self.bitness
    }
}
