use std::path::PathBuf;

use clap::{ArgEnum, Parser};

use crate::config::ArchSelection;

#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Args {
    /// Pointer width of the kernel: 32, 64 or auto
    #[clap(short, long, default_value = "64", value_name = "ARCH")]
    pub arch: ArchSelection,

    /// Load address of _text in hex, 0x prefix optional
    #[clap(short, long, value_name = "HEX", parse(try_from_str = parse_hex))]
    pub base: Option<u64>,

    /// Raise log level; repeat for more
    #[clap(short, long, parse(from_occurrences))]
    pub verbose: u8,

    /// Override the label alignment boundary
    #[clap(long, value_name = "N", parse(try_from_str = parse_int))]
    pub align: Option<u64>,

    /// Override the distance from _text to stext
    #[clap(long, value_name = "N", parse(try_from_str = parse_int))]
    pub stext_offset: Option<u64>,

    #[clap(long, arg_enum, default_value = "text")]
    pub format: Format,

    /// Demangle Rust symbol names
    #[clap(long)]
    pub demangle: bool,

    /// Print the symbol containing each address instead of the table
    #[clap(long, value_name = "HEX", parse(try_from_str = parse_hex))]
    pub resolve: Vec<u64>,

    #[clap(value_name = "KERNEL_FILE", parse(from_os_str))]
    pub kernel_file: PathBuf,
}

#[derive(ArgEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

pub fn parse_hex(s: &str) -> Result<u64, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u64::from_str_radix(digits, 16).map_err(|e| format!("{:?}: {}", s, e))
}

/// Decimal, or hex with a 0x prefix.
pub fn parse_int(s: &str) -> Result<u64, String> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    }
    .map_err(|e| format!("{:?}: {}", s, e))
}
