//! Operand materialization.
//!
//! Turns the operand encodings of a resolved [`Template`] into concrete
//! registers and immediates. Memory operands are decoded by the caller (the
//! addressing bytes precede every immediate); this module only handles the
//! register and immediate slots.

use super::cursor::ByteCursor;
use super::encoding::EncodingContext;
use super::modrm::ModRm;
use super::opcodes::Op;
use crate::DecodeError;
use xdec_core::{Operand, Register};

/// GPR of the width selected by a template slot (16/32/64).
fn gpr(slot: usize, n: u8) -> Register {
    match slot {
        0 => Register::gpr16(n),
        1 => Register::gpr32(n),
        _ => Register::gpr64(n),
    }
}

/// Immediate bytes read for one operand.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Immediate {
    pub operand: Operand,
    /// Offset of the first immediate byte from the start of the instruction
    pub offset: usize,
    pub size: u8,
}

/// Everything needed to resolve the register and immediate operands of one
/// instruction once its template and operand-size slot are known.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OperandResolver<'c> {
    pub ctx: &'c EncodingContext,
    pub modrm: Option<ModRm>,
    pub opcode: u8,
    pub slot: usize,
    pub ip: u64,
}

impl OperandResolver<'_> {
    fn modrm(&self) -> ModRm {
        // Templates with ModRM operands always have the byte read before resolution
        self.modrm.unwrap_or(ModRm { mod_: 3, reg: 0, rm: 0 })
    }

    /// Vector register number in ModRM.reg, all extensions applied.
    fn vector_reg(&self) -> u8 {
        self.modrm().reg + self.ctx.r + self.ctx.r_prime
    }

    /// Vector register number in ModRM.rm (register form).
    fn vector_rm(&self) -> u8 {
        self.modrm().rm + self.ctx.b + self.ctx.x_vector
    }

    fn gpr_reg(&self) -> Result<u8, DecodeError> {
        if self.ctx.r_prime != 0 {
            return Err(DecodeError::register_out_of_range(
                "EVEX.R' set for a general-purpose register",
            ));
        }
        Ok(self.modrm().reg + self.ctx.r)
    }

    /// Resolves a register operand, or the register form of a ModRM.rm operand.
    pub fn register(&self, op: Op) -> Result<Register, DecodeError> {
        let reg = match op {
            Op::Gb => Register::gpr8(self.gpr_reg()?, self.ctx.has_rex),
            Op::Gv => gpr(self.slot, self.gpr_reg()?),
            Op::Eb => Register::gpr8(self.modrm().rm + self.ctx.b, self.ctx.has_rex),
            Op::Ev => gpr(self.slot, self.modrm().rm + self.ctx.b),
            Op::Vx => Register::xmm(self.vector_reg()),
            Op::Vy => Register::ymm(self.vector_reg()),
            Op::Vz => Register::zmm(self.vector_reg()),
            Op::Hx => Register::xmm(self.ctx.vvvv),
            Op::Hy => Register::ymm(self.ctx.vvvv),
            Op::Hz => Register::zmm(self.ctx.vvvv),
            Op::Wx | Op::Ux => Register::xmm(self.vector_rm()),
            Op::Wy => Register::ymm(self.vector_rm()),
            Op::Wz => Register::zmm(self.vector_rm()),
            Op::P => Register::mm(self.modrm().reg),
            Op::N => Register::mm(self.modrm().rm),
            Op::Kr => {
                if self.ctx.r != 0 || self.ctx.r_prime != 0 {
                    return Err(DecodeError::register_out_of_range("opmask register above k7"));
                }
                Register::k(self.modrm().reg)
            }
            Op::Zb => Register::gpr8((self.opcode & 7) + self.ctx.b, self.ctx.has_rex),
            Op::Zv => gpr(self.slot, (self.opcode & 7) + self.ctx.b),
            Op::AccB => Register::AL,
            Op::Acc => gpr(self.slot, 0),
            Op::M | Op::Ib | Op::Iw | Op::Iz | Op::IbSx | Op::Iv | Op::Jb | Op::Jz => {
                Register::None
            }
        };
        Ok(reg)
    }

    /// Reads an immediate or branch displacement.
    ///
    /// Branch displacements are always the last bytes of an instruction, so
    /// the target is taken relative to the cursor position after the read.
    pub fn immediate(&self, op: Op, cursor: &mut ByteCursor<'_>) -> Result<Immediate, DecodeError> {
        let offset = cursor.consumed();
        let operand = match (op, self.slot) {
            (Op::Ib, _) => Operand::Immediate8(cursor.read_u8()?),
            (Op::Iw, _) => Operand::Immediate16(cursor.read_u16()?),
            (Op::Iz, 0) | (Op::Iv, 0) => Operand::Immediate16(cursor.read_u16()?),
            (Op::Iz, 1) | (Op::Iv, 1) => Operand::Immediate32(cursor.read_u32()?),
            (Op::Iz, _) => Operand::Immediate32to64(cursor.read_u32()? as i32),
            (Op::Iv, _) => Operand::Immediate64(cursor.read_u64()?),
            (Op::IbSx, 0) => Operand::Immediate8to16(cursor.read_u8()? as i8),
            (Op::IbSx, 1) => Operand::Immediate8to32(cursor.read_u8()? as i8),
            (Op::IbSx, _) => Operand::Immediate8to64(cursor.read_u8()? as i8),
            (Op::Jb, _) => {
                let disp = cursor.read_u8()? as i8 as i64;
                self.branch(disp, cursor)
            }
            (Op::Jz, 0) => {
                let disp = cursor.read_u16()? as i16 as i64;
                self.branch(disp, cursor)
            }
            (Op::Jz, _) => {
                let disp = cursor.read_u32()? as i32 as i64;
                self.branch(disp, cursor)
            }
            (other, _) => unreachable!("{other:?} is not an immediate operand"),
        };
        let size = (cursor.consumed() - offset) as u8;
        Ok(Immediate { operand, offset, size })
    }

    fn branch(&self, disp: i64, cursor: &ByteCursor<'_>) -> Operand {
        let target = self.ip.wrapping_add(cursor.consumed() as u64).wrapping_add(disp as u64);
        match self.slot {
            0 => Operand::NearBranch16(target as u16),
            1 => Operand::NearBranch32(target as u32),
            _ => Operand::NearBranch64(target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::x86::encoding::EncodingSpace;

    fn resolver(ctx: &EncodingContext, modrm: u8, slot: usize) -> OperandResolver<'_> {
        OperandResolver {
            ctx,
            modrm: Some(ModRm::parse(modrm)),
            opcode: 0,
            slot,
            ip: 0,
        }
    }

    #[test]
    fn test_gpr_widths_follow_slot() {
        let ctx = EncodingContext::default();
        // mod=11 reg=1 rm=6
        assert_eq!(resolver(&ctx, 0xCE, 0).register(Op::Gv).unwrap(), Register::CX);
        assert_eq!(resolver(&ctx, 0xCE, 1).register(Op::Ev).unwrap(), Register::ESI);
        assert_eq!(resolver(&ctx, 0xCE, 2).register(Op::Ev).unwrap(), Register::RSI);
        assert_eq!(resolver(&ctx, 0xCE, 1).register(Op::Eb).unwrap(), Register::DH);
    }

    #[test]
    fn test_rex_selects_uniform_byte_registers() {
        let ctx = EncodingContext {
            has_rex: true,
            r: 8,
            ..EncodingContext::default()
        };
        let r = resolver(&ctx, 0xEC, 1);
        assert_eq!(r.register(Op::Gb).unwrap(), Register::R13L);
        assert_eq!(r.register(Op::Eb).unwrap(), Register::SPL);
    }

    #[test]
    fn test_evex_vector_extensions() {
        let ctx = EncodingContext {
            space: EncodingSpace::Evex,
            r: 8,
            r_prime: 16,
            b: 8,
            x_vector: 16,
            vvvv: 21,
            ..EncodingContext::default()
        };
        let r = resolver(&ctx, 0xCD, 0);
        assert_eq!(r.register(Op::Vz).unwrap(), Register::ZMM25);
        assert_eq!(r.register(Op::Hy).unwrap(), Register::YMM21);
        assert_eq!(r.register(Op::Wx).unwrap(), Register::XMM29);
        // A GPR in ModRM.rm ignores EVEX.X
        assert_eq!(r.register(Op::Ev).unwrap(), Register::R13W);
        assert_eq!(
            r.register(Op::Gv),
            Err(DecodeError::register_out_of_range("EVEX.R' set for a general-purpose register"))
        );
    }

    #[test]
    fn test_opmask_rejects_extensions() {
        let ctx = EncodingContext {
            space: EncodingSpace::Evex,
            r: 8,
            ..EncodingContext::default()
        };
        assert!(matches!(
            resolver(&ctx, 0xD0, 0).register(Op::Kr),
            Err(DecodeError::RegisterOutOfRange { .. })
        ));
        let ctx = EncodingContext::default();
        assert_eq!(resolver(&ctx, 0xD0, 0).register(Op::Kr).unwrap(), Register::K2);
    }

    #[test]
    fn test_mmx_ignores_extensions() {
        let ctx = EncodingContext {
            r: 8,
            b: 8,
            ..EncodingContext::default()
        };
        let r = resolver(&ctx, 0xCD, 1);
        assert_eq!(r.register(Op::P).unwrap(), Register::MM1);
        assert_eq!(r.register(Op::N).unwrap(), Register::MM5);
    }

    #[test]
    fn test_immediate_extension() {
        let ctx = EncodingContext::default();
        let data = [0xFF, 0x5A, 0xA5, 0x34, 0x12];
        let mut cursor = ByteCursor::new(&data, 0);
        let r = resolver(&ctx, 0xC0, 2);
        let imm = r.immediate(Op::IbSx, &mut cursor).unwrap();
        assert_eq!(imm.operand, Operand::Immediate8to64(-1));
        assert_eq!((imm.offset, imm.size), (0, 1));
        let imm = r.immediate(Op::Iz, &mut cursor).unwrap();
        assert_eq!(imm.operand, Operand::Immediate32to64(0x1234_A55A));
        assert_eq!((imm.offset, imm.size), (1, 4));
    }

    #[test]
    fn test_branch_targets_wrap_to_slot_width() {
        let ctx = EncodingContext::default();
        // jmp $-2 at 0xFFFF in 16-bit code
        let data = [0xEB, 0xFE];
        let mut cursor = ByteCursor::new(&data, 0);
        cursor.read_u8().unwrap();
        let r = OperandResolver {
            ctx: &ctx,
            modrm: None,
            opcode: 0xEB,
            slot: 0,
            ip: 0xFFFF,
        };
        let imm = r.immediate(Op::Jb, &mut cursor).unwrap();
        assert_eq!(imm.operand, Operand::NearBranch16(0xFFFF));

        let data = [0xE8, 0x10, 0x00, 0x00, 0x00];
        let mut cursor = ByteCursor::new(&data, 0);
        cursor.read_u8().unwrap();
        let r = OperandResolver { slot: 2, ip: 0x1000, ..r };
        let imm = r.immediate(Op::Jz, &mut cursor).unwrap();
        assert_eq!(imm.operand, Operand::NearBranch64(0x1015));
        assert_eq!((imm.offset, imm.size), (1, 4));
    }
}
