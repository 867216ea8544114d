//! Builds kallsyms tables laid out the way the kernel link emits them into
//! a raw image: address array, count word, compressed names, markers,
//! token strings and the token index, each block starting on the next
//! label boundary.

extern crate thiserror;
use thiserror::Error;

mod compress;

use compress::{
    make_dic::{make_dic, TOKEN_SLOTS},
    tokenize::Tokenizer,
};

pub const MARKER_STRIDE: usize = 256;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackError {
    #[error("symbol #{index} has an empty name")]
    EmptyName { index: usize },
    #[error("symbol #{index} has a NUL byte in its name")]
    NulInName { index: usize },
    #[error("symbol #{index} needs {tokens} tokens (max 255)")]
    NameTooLong { index: usize, tokens: usize },
    #[error("token strings take {size} bytes, beyond the 16-bit index")]
    TokenTableTooLarge { size: usize },
    #[error("address {address:#x} does not fit in {pointer_size} bytes")]
    AddressOverflow { address: u64, pointer_size: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Target {
    pub pointer_size: usize,
    pub align_boundary: usize,
}

impl Target {
    pub const BITS64: Target = Target { pointer_size: 8, align_boundary: 0x100 };
    pub const BITS32: Target = Target { pointer_size: 4, align_boundary: 4 * 4 };

    fn align_next(&self, off: usize) -> usize {
        (off + self.align_boundary) & !(self.align_boundary - 1)
    }

    fn push_pointer(&self, out: &mut Vec<u8>, value: u64) -> Result<(), PackError> {
        let bytes = value.to_le_bytes();
        if self.pointer_size < 8 && value >> (self.pointer_size * 8) != 0 {
            return Err(PackError::AddressOverflow {
                address: value,
                pointer_size: self.pointer_size,
            });
        }
        out.extend_from_slice(&bytes[..self.pointer_size]);
        Ok(())
    }
}

/// Offsets of every block written into `Packed::image`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PackOffsets {
    pub addresses_start: usize,
    pub addresses_end: usize,
    pub num_syms: usize,
    pub names_start: usize,
    pub markers_start: usize,
    pub tokens_start: usize,
    pub token_index_start: usize,
    pub end: usize,
}

#[derive(Clone, Debug)]
pub struct Packed {
    pub image: Vec<u8>,
    pub offsets: PackOffsets,
    pub tokens: Vec<Vec<u8>>,
}

pub struct Packer {
    target: Target,
    prefix: Vec<u8>,
    suffix: Vec<u8>,
    max_tokens: usize,
}

impl Packer {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            prefix: vec![],
            suffix: vec![],
            max_tokens: TOKEN_SLOTS,
        }
    }

    /// Bytes placed before the address table; zero-padded up to pointer
    /// alignment so the table sits on a pointer boundary.
    pub fn prefix(mut self, bytes: &[u8]) -> Self {
        self.prefix = bytes.to_vec();
        self
    }

    pub fn suffix(mut self, bytes: &[u8]) -> Self {
        self.suffix = bytes.to_vec();
        self
    }

    /// Caps the number of multi-byte tokens; 0 keeps only one-byte tokens.
    pub fn max_tokens(mut self, n: usize) -> Self {
        self.max_tokens = n;
        self
    }

    /// `symbols` are `(address, type char followed by name)`.
    pub fn pack(&self, symbols: &[(u64, &str)]) -> Result<Packed, PackError> {
        let target = &self.target;

        for (index, (_, name)) in symbols.iter().enumerate() {
            if name.is_empty() {
                return Err(PackError::EmptyName { index });
            }
            if name.as_bytes().contains(&0) {
                return Err(PackError::NulInName { index });
            }
        }

        let names: Vec<&[u8]> = symbols.iter().map(|(_, n)| n.as_bytes()).collect();
        let dic = make_dic(&names, self.max_tokens);
        let tokenizer = Tokenizer::new(&dic);

        let mut encoded: Vec<Vec<u8>> = Vec::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            // every byte of every name owns a slot, so this cannot miss
            let ids = tokenizer.tokenize(name).unwrap_or_default();
            if ids.is_empty() || ids.len() > u8::MAX as usize {
                return Err(PackError::NameTooLong { index, tokens: ids.len() });
            }
            encoded.push(ids);
        }

        let mut off = PackOffsets::default();
        let mut image = self.prefix.clone();
        let misalign = image.len() % target.pointer_size;
        if misalign != 0 {
            image.resize(image.len() + target.pointer_size - misalign, 0);
        }

        // addresses
        off.addresses_start = image.len();
        for (addr, _) in symbols {
            target.push_pointer(&mut image, *addr)?;
        }
        off.addresses_end = image.len();

        // count word; the gap before it holds the zero terminator
        off.num_syms = target.align_next(off.addresses_end);
        image.resize(off.num_syms, 0);
        target.push_pointer(&mut image, symbols.len() as u64)?;

        // names
        off.names_start = target.align_next(off.num_syms);
        image.resize(off.names_start, 0);
        let mut markers: Vec<u64> = vec![];
        for (i, ids) in encoded.iter().enumerate() {
            if i % MARKER_STRIDE == 0 {
                markers.push((image.len() - off.names_start) as u64);
            }
            image.push(ids.len() as u8);
            image.extend_from_slice(ids);
        }

        // markers
        off.markers_start = target.align_next(image.len());
        image.resize(off.markers_start, 0);
        for m in markers {
            target.push_pointer(&mut image, m)?;
        }

        // token strings
        off.tokens_start = target.align_next(image.len());
        image.resize(off.tokens_start, 0);
        let mut index: Vec<u16> = Vec::with_capacity(TOKEN_SLOTS);
        for tok in dic.iter() {
            let rel = image.len() - off.tokens_start;
            let rel = u16::try_from(rel)
                .map_err(|_| PackError::TokenTableTooLarge { size: rel })?;
            index.push(rel);
            image.extend_from_slice(tok);
            image.push(0);
        }

        // token index
        off.token_index_start = target.align_next(image.len());
        image.resize(off.token_index_start, 0);
        for rel in index {
            image.extend_from_slice(&rel.to_le_bytes());
        }
        off.end = image.len();

        image.extend_from_slice(&self.suffix);

        Ok(Packed {
            image,
            offsets: off,
            tokens: dic,
        })
    }
}

pub fn pack(symbols: &[(u64, &str)], target: Target) -> Result<Packed, PackError> {
    Packer::new(target).pack(symbols)
}
