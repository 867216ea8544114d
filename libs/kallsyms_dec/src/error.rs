extern crate thiserror;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("anchor pattern for base {base:#x} not found")]
    PatternNotFound { base: u64 },
    #[error("base address {base:#x} does not fit in {pointer_size}-byte pointers")]
    BaseAddressOverflow { base: u64, pointer_size: usize },
    #[error("malformed address table at {start:#x}: {reason}")]
    MalformedAddressTable { start: usize, reason: &'static str },
    #[error("symbol count mismatch: address table holds {derived}, kallsyms_num_syms reads {stored}")]
    SymbolCountMismatch { derived: u64, stored: u64 },
    #[error("reading {len} bytes at {offset:#x} runs past the end of the image ({size:#x} bytes)")]
    OutOfBounds { offset: usize, len: usize, size: usize },
    #[error("symbol #{index} decompressed to an empty name")]
    EmptySymbolName { index: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("unknown architecture {0:?} (expected 32 or 64)")]
    UnknownArch(String),
    #[error("pointer size must be 4 or 8, got {0}")]
    PointerSize(usize),
    #[error("align boundary {align:#x} is not a power of two >= pointer size {pointer_size}")]
    AlignBoundary { align: usize, pointer_size: usize },
}
