//! xdec - x86/x64 instruction decoder
//!
//! Usage:
//!   xdec 0FC0 38                        Decode hex bytes in 64-bit mode
//!   xdec -b 16 "62 F14C0B C2 50 01 A5"  Decode in 16-bit mode
//!   xdec --file code.bin --ip 0x401000  Decode a raw code file
//!   xdec -vv ...                        Log why instructions are invalid

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, Level};
use xdec_core::{Bitness, Instruction, Operand, Register, RoundingControl};
use xdec_disasm::Decoder;

#[derive(Parser)]
#[command(name = "xdec")]
#[command(about = "Decode x86/x64 machine code", long_about = None)]
struct Cli {
    /// Hex-encoded bytes; whitespace between bytes is ignored
    bytes: Vec<String>,

    /// Read raw bytes from a file instead
    #[arg(short, long, conflicts_with = "bytes")]
    file: Option<PathBuf>,

    /// Processor mode: 16, 32 or 64
    #[arg(short, long, default_value = "64", value_parser = parse_bitness)]
    bitness: Bitness,

    /// Address of the first byte
    #[arg(long, default_value = "0", value_parser = parse_hex)]
    ip: u64,

    /// Stop after this many instructions
    #[arg(short, long)]
    count: Option<usize>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_hex(s: &str) -> Result<u64, String> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).map_err(|e| e.to_string())
}

fn parse_bitness(s: &str) -> Result<Bitness, String> {
    let bits: u32 = s.parse().map_err(|e| format!("{e}"))?;
    Bitness::try_from(bits).map_err(|e| e.to_string())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_bytes(cli: &Cli) -> Result<Vec<u8>> {
    if let Some(path) = &cli.file {
        return fs::read(path).with_context(|| format!("Failed to read {}", path.display()));
    }
    if cli.bytes.is_empty() {
        bail!("No input: pass hex bytes or --file");
    }
    let hex: String = cli.bytes.concat().chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&hex).context("Input is not valid hex")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let data = load_bytes(&cli)?;
    debug!(bitness = %cli.bitness, ip = cli.ip, len = data.len(), "decoding");

    let mut offset = 0;
    let mut invalid = 0;
    for instr in Decoder::new(cli.bitness, &data, cli.ip).take(cli.count.unwrap_or(usize::MAX)) {
        let raw = &data[offset..offset + instr.len()];
        offset += instr.len();
        if instr.is_invalid() {
            invalid += 1;
        }
        println!("{}", format_line(&instr, raw));
    }
    debug!(decoded = offset, invalid, "done");

    Ok(())
}

fn format_line(instr: &Instruction, raw: &[u8]) -> String {
    let mut line = format!("{:016x}  {:<30}  {}", instr.ip(), hex::encode_upper(raw), instr.code());
    let operands: Vec<String> = (0..instr.op_count()).map(|i| format_operand(instr, i)).collect();
    if !operands.is_empty() {
        let _ = write!(line, " {}", operands.join(", "));
    }
    if instr.has_op_mask() {
        let _ = write!(line, " {{{}}}", instr.op_mask());
    }
    if instr.zeroing_masking() {
        line.push_str(" {z}");
    }
    match instr.rounding_control() {
        RoundingControl::None if instr.suppress_all_exceptions() => line.push_str(" {sae}"),
        RoundingControl::None => {}
        rc => {
            let _ = write!(line, " {{{rc:?}}}");
        }
    }
    line
}

fn format_operand(instr: &Instruction, index: usize) -> String {
    match instr.op(index) {
        Operand::Register(reg) => reg.to_string(),
        Operand::Memory => format_memory(instr),
        op => op
            .immediate()
            .or(op.near_branch())
            .map(|value| format!("{value:#x}"))
            .unwrap_or_default(),
    }
}

fn format_memory(instr: &Instruction) -> String {
    let mut terms = Vec::new();
    if instr.memory_base() != Register::None {
        terms.push(instr.memory_base().to_string());
    }
    if instr.memory_index() != Register::None {
        terms.push(format!("{}*{}", instr.memory_index(), instr.memory_index_scale()));
    }
    if instr.memory_displ_size() != 0 || terms.is_empty() {
        terms.push(format!("{:#x}", instr.memory_displacement64()));
    }
    let bcst = if instr.is_broadcast() { " {bcst}" } else { "" };
    format!("{:?} {}:[{}]{}", instr.memory_size(), instr.memory_segment(), terms.join("+"), bcst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("0x401000"), Ok(0x40_1000));
        assert_eq!(parse_hex("ff"), Ok(0xFF));
        assert!(parse_hex("xyz").is_err());
    }

    #[test]
    fn test_parse_bitness() {
        assert_eq!(parse_bitness("16"), Ok(Bitness::Bits16));
        assert!(parse_bitness("8").is_err());
        assert!(parse_bitness("sixty-four").is_err());
    }

    #[test]
    fn test_format_line() {
        let data = [0x0F, 0xC0, 0x38];
        let instr = Decoder::new(Bitness::Bits32, &data, 0x1000).decode();
        let line = format_line(&instr, &data);
        assert!(line.starts_with("0000000000001000  0FC038"));
        assert!(line.ends_with("Xadd_rm8_r8 UInt8 ds:[eax], bh"), "{line}");
    }

    #[test]
    fn test_format_evex() {
        let data = [0x62, 0xF1, 0x7C, 0x38, 0x58, 0xC2];
        let instr = Decoder::new(Bitness::Bits64, &data, 0).decode();
        let line = format_line(&instr, &data);
        assert!(line.ends_with("zmm0, zmm0, zmm2 {RoundDown}"), "{line}");
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["xdec", "-b", "32", "--ip", "0x10", "90", "CC"]).unwrap();
        assert_eq!(cli.bitness, Bitness::Bits32);
        assert_eq!(cli.ip, 0x10);
        assert_eq!(load_bytes(&cli).unwrap(), vec![0x90, 0xCC]);
    }
}
