//! Instruction codes.
//!
//! A `Code` names one mnemonic together with its operand signature, e.g.
//! `Xadd_rm8_r8` or `EVEX_Vcmpps_k_k1_xmm_xmmm128b32_imm8`. Codes are grouped
//! by encoding: legacy first, then `VEX_`, then `EVEX_`.

use std::fmt;

/// Encoding family a `Code` belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EncodingKind {
    Legacy,
    Vex,
    Evex,
}

macro_rules! codes {
    ($($name:ident),* $(,)?) => {
        /// Mnemonic plus operand signature of a decoded instruction.
        #[allow(non_camel_case_types)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(u16)]
        pub enum Code {
            /// Undecodable input.
            #[default]
            INVALID,
            $($name),*
        }

        impl Code {
            /// Every code in declaration order, `INVALID` first.
            pub const ALL: &'static [Code] = &[Code::INVALID, $(Code::$name),*];

            pub const fn name(self) -> &'static str {
                match self {
                    Code::INVALID => "INVALID",
                    $(Code::$name => stringify!($name)),*
                }
            }
        }
    };
}

codes! {
    // Arithmetic / logic
    Add_rm8_r8,
    Add_rm16_r16,
    Add_rm32_r32,
    Add_rm64_r64,
    Add_r8_rm8,
    Add_r16_rm16,
    Add_r32_rm32,
    Add_r64_rm64,
    Add_AL_imm8,
    Add_AX_imm16,
    Add_EAX_imm32,
    Add_RAX_imm32,
    Or_rm8_r8,
    Or_rm16_r16,
    Or_rm32_r32,
    Or_rm64_r64,
    Or_r8_rm8,
    Or_r16_rm16,
    Or_r32_rm32,
    Or_r64_rm64,
    Or_AL_imm8,
    Or_AX_imm16,
    Or_EAX_imm32,
    Or_RAX_imm32,
    Adc_rm8_r8,
    Adc_rm16_r16,
    Adc_rm32_r32,
    Adc_rm64_r64,
    Adc_r8_rm8,
    Adc_r16_rm16,
    Adc_r32_rm32,
    Adc_r64_rm64,
    Adc_AL_imm8,
    Adc_AX_imm16,
    Adc_EAX_imm32,
    Adc_RAX_imm32,
    Sbb_rm8_r8,
    Sbb_rm16_r16,
    Sbb_rm32_r32,
    Sbb_rm64_r64,
    Sbb_r8_rm8,
    Sbb_r16_rm16,
    Sbb_r32_rm32,
    Sbb_r64_rm64,
    Sbb_AL_imm8,
    Sbb_AX_imm16,
    Sbb_EAX_imm32,
    Sbb_RAX_imm32,
    And_rm8_r8,
    And_rm16_r16,
    And_rm32_r32,
    And_rm64_r64,
    And_r8_rm8,
    And_r16_rm16,
    And_r32_rm32,
    And_r64_rm64,
    And_AL_imm8,
    And_AX_imm16,
    And_EAX_imm32,
    And_RAX_imm32,
    Sub_rm8_r8,
    Sub_rm16_r16,
    Sub_rm32_r32,
    Sub_rm64_r64,
    Sub_r8_rm8,
    Sub_r16_rm16,
    Sub_r32_rm32,
    Sub_r64_rm64,
    Sub_AL_imm8,
    Sub_AX_imm16,
    Sub_EAX_imm32,
    Sub_RAX_imm32,
    Xor_rm8_r8,
    Xor_rm16_r16,
    Xor_rm32_r32,
    Xor_rm64_r64,
    Xor_r8_rm8,
    Xor_r16_rm16,
    Xor_r32_rm32,
    Xor_r64_rm64,
    Xor_AL_imm8,
    Xor_AX_imm16,
    Xor_EAX_imm32,
    Xor_RAX_imm32,
    Cmp_rm8_r8,
    Cmp_rm16_r16,
    Cmp_rm32_r32,
    Cmp_rm64_r64,
    Cmp_r8_rm8,
    Cmp_r16_rm16,
    Cmp_r32_rm32,
    Cmp_r64_rm64,
    Cmp_AL_imm8,
    Cmp_AX_imm16,
    Cmp_EAX_imm32,
    Cmp_RAX_imm32,
    Add_rm8_imm8,
    Add_rm16_imm16,
    Add_rm32_imm32,
    Add_rm64_imm32,
    Add_rm8_imm8_82,
    Add_rm16_imm8,
    Add_rm32_imm8,
    Add_rm64_imm8,
    Or_rm8_imm8,
    Or_rm16_imm16,
    Or_rm32_imm32,
    Or_rm64_imm32,
    Or_rm8_imm8_82,
    Or_rm16_imm8,
    Or_rm32_imm8,
    Or_rm64_imm8,
    Adc_rm8_imm8,
    Adc_rm16_imm16,
    Adc_rm32_imm32,
    Adc_rm64_imm32,
    Adc_rm8_imm8_82,
    Adc_rm16_imm8,
    Adc_rm32_imm8,
    Adc_rm64_imm8,
    Sbb_rm8_imm8,
    Sbb_rm16_imm16,
    Sbb_rm32_imm32,
    Sbb_rm64_imm32,
    Sbb_rm8_imm8_82,
    Sbb_rm16_imm8,
    Sbb_rm32_imm8,
    Sbb_rm64_imm8,
    And_rm8_imm8,
    And_rm16_imm16,
    And_rm32_imm32,
    And_rm64_imm32,
    And_rm8_imm8_82,
    And_rm16_imm8,
    And_rm32_imm8,
    And_rm64_imm8,
    Sub_rm8_imm8,
    Sub_rm16_imm16,
    Sub_rm32_imm32,
    Sub_rm64_imm32,
    Sub_rm8_imm8_82,
    Sub_rm16_imm8,
    Sub_rm32_imm8,
    Sub_rm64_imm8,
    Xor_rm8_imm8,
    Xor_rm16_imm16,
    Xor_rm32_imm32,
    Xor_rm64_imm32,
    Xor_rm8_imm8_82,
    Xor_rm16_imm8,
    Xor_rm32_imm8,
    Xor_rm64_imm8,
    Cmp_rm8_imm8,
    Cmp_rm16_imm16,
    Cmp_rm32_imm32,
    Cmp_rm64_imm32,
    Cmp_rm8_imm8_82,
    Cmp_rm16_imm8,
    Cmp_rm32_imm8,
    Cmp_rm64_imm8,
    Inc_r16,
    Inc_r32,
    Dec_r16,
    Dec_r32,
    Push_r16,
    Push_r32,
    Push_r64,
    Pop_r16,
    Pop_r32,
    Pop_r64,
    Bound_r16_m1616,
    Bound_r32_m3232,
    Push_imm16,
    Pushd_imm32,
    Pushq_imm32,
    Pushw_imm8,
    Pushd_imm8,
    Pushq_imm8,
    Jo_rel8_16,
    Jo_rel8_32,
    Jo_rel8_64,
    Jno_rel8_16,
    Jno_rel8_32,
    Jno_rel8_64,
    Jb_rel8_16,
    Jb_rel8_32,
    Jb_rel8_64,
    Jae_rel8_16,
    Jae_rel8_32,
    Jae_rel8_64,
    Je_rel8_16,
    Je_rel8_32,
    Je_rel8_64,
    Jne_rel8_16,
    Jne_rel8_32,
    Jne_rel8_64,
    Jbe_rel8_16,
    Jbe_rel8_32,
    Jbe_rel8_64,
    Ja_rel8_16,
    Ja_rel8_32,
    Ja_rel8_64,
    Js_rel8_16,
    Js_rel8_32,
    Js_rel8_64,
    Jns_rel8_16,
    Jns_rel8_32,
    Jns_rel8_64,
    Jp_rel8_16,
    Jp_rel8_32,
    Jp_rel8_64,
    Jnp_rel8_16,
    Jnp_rel8_32,
    Jnp_rel8_64,
    Jl_rel8_16,
    Jl_rel8_32,
    Jl_rel8_64,
    Jge_rel8_16,
    Jge_rel8_32,
    Jge_rel8_64,
    Jle_rel8_16,
    Jle_rel8_32,
    Jle_rel8_64,
    Jg_rel8_16,
    Jg_rel8_32,
    Jg_rel8_64,
    Test_rm8_r8,
    Test_rm16_r16,
    Test_rm32_r32,
    Test_rm64_r64,
    Xchg_rm8_r8,
    Xchg_rm16_r16,
    Xchg_rm32_r32,
    Xchg_rm64_r64,
    Mov_rm8_r8,
    Mov_rm16_r16,
    Mov_rm32_r32,
    Mov_rm64_r64,
    Mov_r8_rm8,
    Mov_r16_rm16,
    Mov_r32_rm32,
    Mov_r64_rm64,
    Lea_r16_m,
    Lea_r32_m,
    Lea_r64_m,
    Nopw,
    Nopd,
    Nopq,
    Pause,
    Xchg_r16_AX,
    Xchg_r32_EAX,
    Xchg_r64_RAX,
    Test_AL_imm8,
    Test_AX_imm16,
    Test_EAX_imm32,
    Test_RAX_imm32,
    Mov_AL_imm8,
    Mov_CL_imm8,
    Mov_DL_imm8,
    Mov_BL_imm8,
    Mov_AH_imm8,
    Mov_CH_imm8,
    Mov_DH_imm8,
    Mov_BH_imm8,
    Mov_AX_imm16,
    Mov_EAX_imm32,
    Mov_RAX_imm64,
    Mov_CX_imm16,
    Mov_ECX_imm32,
    Mov_RCX_imm64,
    Mov_DX_imm16,
    Mov_EDX_imm32,
    Mov_RDX_imm64,
    Mov_BX_imm16,
    Mov_EBX_imm32,
    Mov_RBX_imm64,
    Mov_SP_imm16,
    Mov_ESP_imm32,
    Mov_RSP_imm64,
    Mov_BP_imm16,
    Mov_EBP_imm32,
    Mov_RBP_imm64,
    Mov_SI_imm16,
    Mov_ESI_imm32,
    Mov_RSI_imm64,
    Mov_DI_imm16,
    Mov_EDI_imm32,
    Mov_RDI_imm64,
    Retnw_imm16,
    Retnd_imm16,
    Retnq_imm16,
    Retnw,
    Retnd,
    Retnq,
    Les_r16_m1616,
    Les_r32_m1632,
    Lds_r16_m1616,
    Lds_r32_m1632,
    Int3,
    Call_rel16,
    Call_rel32_32,
    Call_rel32_64,
    Jmp_rel16,
    Jmp_rel32_32,
    Jmp_rel32_64,
    Jmp_rel8_16,
    Jmp_rel8_32,
    Jmp_rel8_64,
    Hlt,
    // Two-byte opcodes
    Syscall,
    Ud2,
    Movups_xmm_xmmm128,
    Movupd_xmm_xmmm128,
    Movss_xmm_xmmm32,
    Movsd_xmm_xmmm64,
    Nop_rm16,
    Nop_rm32,
    Nop_rm64,
    Addps_xmm_xmmm128,
    Addpd_xmm_xmmm128,
    Addss_xmm_xmmm32,
    Addsd_xmm_xmmm64,
    Xadd_rm8_r8,
    Xadd_rm16_r16,
    Xadd_rm32_r32,
    Xadd_rm64_r64,
    Cmpps_xmm_xmmm128_imm8,
    Cmppd_xmm_xmmm128_imm8,
    Cmpss_xmm_xmmm32_imm8,
    Cmpsd_xmm_xmmm64_imm8,
    Movnti_m32_r32,
    Movnti_m64_r64,
    Pinsrw_mm_r32m16_imm8,
    Pinsrw_mm_r64m16_imm8,
    Pinsrw_xmm_r32m16_imm8,
    Pinsrw_xmm_r64m16_imm8,
    Pextrw_r32_mm_imm8,
    Pextrw_r64_mm_imm8,
    Pextrw_r32_xmm_imm8,
    Pextrw_r64_xmm_imm8,
    Shufps_xmm_xmmm128_imm8,
    Shufpd_xmm_xmmm128_imm8,
    Cmpxchg8b_m64,
    Cmpxchg16b_m128,
    Xrstors_m0,
    Xrstors64_m0,
    Xsavec_m0,
    Xsavec64_m0,
    Xsaves_m0,
    Xsaves64_m0,
    Vmptrld_m64,
    Vmclear_m64,
    Vmxon_m64,
    Vmptrst_m64,
    Rdrand_r16,
    Rdrand_r32,
    Rdrand_r64,
    Rdseed_r16,
    Rdseed_r32,
    Rdseed_r64,
    Rdpid_r32,
    Rdpid_r64,
    Bswap_r16,
    Bswap_r32,
    Bswap_r64,
    // VEX
    VEX_Vaddps_xmm_xmm_xmmm128,
    VEX_Vaddps_ymm_ymm_ymmm256,
    VEX_Vaddpd_xmm_xmm_xmmm128,
    VEX_Vaddpd_ymm_ymm_ymmm256,
    VEX_Vaddss_xmm_xmm_xmmm32,
    VEX_Vaddsd_xmm_xmm_xmmm64,
    VEX_Vcmpps_xmm_xmm_xmmm128_imm8,
    VEX_Vcmpps_ymm_ymm_ymmm256_imm8,
    VEX_Vcmppd_xmm_xmm_xmmm128_imm8,
    VEX_Vcmppd_ymm_ymm_ymmm256_imm8,
    VEX_Vcmpss_xmm_xmm_xmmm32_imm8,
    VEX_Vcmpsd_xmm_xmm_xmmm64_imm8,
    VEX_Vpinsrw_xmm_xmm_r32m16_imm8,
    VEX_Vpinsrw_xmm_xmm_r64m16_imm8,
    VEX_Vpextrw_r32_xmm_imm8,
    VEX_Vpextrw_r64_xmm_imm8,
    VEX_Vshufps_xmm_xmm_xmmm128_imm8,
    VEX_Vshufps_ymm_ymm_ymmm256_imm8,
    VEX_Vshufpd_xmm_xmm_xmmm128_imm8,
    VEX_Vshufpd_ymm_ymm_ymmm256_imm8,
    // EVEX
    EVEX_Vaddps_xmm_k1z_xmm_xmmm128b32,
    EVEX_Vaddps_ymm_k1z_ymm_ymmm256b32,
    EVEX_Vaddps_zmm_k1z_zmm_zmmm512b32_er,
    EVEX_Vaddpd_xmm_k1z_xmm_xmmm128b64,
    EVEX_Vaddpd_ymm_k1z_ymm_ymmm256b64,
    EVEX_Vaddpd_zmm_k1z_zmm_zmmm512b64_er,
    EVEX_Vaddss_xmm_k1z_xmm_xmmm32_er,
    EVEX_Vaddsd_xmm_k1z_xmm_xmmm64_er,
    EVEX_Vcmpps_k_k1_xmm_xmmm128b32_imm8,
    EVEX_Vcmpps_k_k1_ymm_ymmm256b32_imm8,
    EVEX_Vcmpps_k_k1_zmm_zmmm512b32_imm8_sae,
    EVEX_Vcmppd_k_k1_xmm_xmmm128b64_imm8,
    EVEX_Vcmppd_k_k1_ymm_ymmm256b64_imm8,
    EVEX_Vcmppd_k_k1_zmm_zmmm512b64_imm8_sae,
    EVEX_Vcmpss_k_k1_xmm_xmmm32_imm8_sae,
    EVEX_Vcmpsd_k_k1_xmm_xmmm64_imm8_sae,
    EVEX_Vpinsrw_xmm_xmm_r32m16_imm8,
    EVEX_Vpinsrw_xmm_xmm_r64m16_imm8,
    EVEX_Vpextrw_r32_xmm_imm8,
    EVEX_Vpextrw_r64_xmm_imm8,
    EVEX_Vshufps_xmm_k1z_xmm_xmmm128b32_imm8,
    EVEX_Vshufps_ymm_k1z_ymm_ymmm256b32_imm8,
    EVEX_Vshufps_zmm_k1z_zmm_zmmm512b32_imm8,
    EVEX_Vshufpd_xmm_k1z_xmm_xmmm128b64_imm8,
    EVEX_Vshufpd_ymm_k1z_ymm_ymmm256b64_imm8,
    EVEX_Vshufpd_zmm_k1z_zmm_zmmm512b64_imm8,
}

impl Code {
    pub const fn is_invalid(self) -> bool {
        matches!(self, Code::INVALID)
    }

    /// Encoding family, derived from the declaration order.
    pub const fn encoding(self) -> EncodingKind {
        let v = self as u16;
        if v >= Code::EVEX_Vaddps_xmm_k1z_xmm_xmmm128b32 as u16 {
            EncodingKind::Evex
        } else if v >= Code::VEX_Vaddps_xmm_xmm_xmmm128 as u16 {
            EncodingKind::Vex
        } else {
            EncodingKind::Legacy
        }
    }

    /// Mnemonic in lower case, e.g. `"vcmpps"` for `EVEX_Vcmpps_k_k1_xmm_xmmm128b32_imm8`.
    pub fn mnemonic(self) -> String {
        let name = self.name();
        let name = name
            .strip_prefix("EVEX_")
            .or_else(|| name.strip_prefix("VEX_"))
            .unwrap_or(name);
        let end = name.find('_').unwrap_or(name.len());
        name[..end].to_ascii_lowercase()
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
