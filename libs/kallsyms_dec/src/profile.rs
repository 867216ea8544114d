use core::fmt;
use core::str::FromStr;

use crate::error::ProfileError;

/// Token index entries are u16 on every architecture.
pub const TOKEN_INDEX_ENTRY_SIZE: usize = 2;

pub const TOKEN_COUNT: usize = 256;

/// One marker is emitted for every this many symbols.
pub const MARKER_STRIDE: usize = 256;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Arch {
    Bits32,
    #[default]
    Bits64,
}

impl FromStr for Arch {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "32" => Ok(Arch::Bits32),
            "64" => Ok(Arch::Bits64),
            other => Err(ProfileError::UnknownArch(other.to_string())),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arch::Bits32 => write!(f, "32"),
            Arch::Bits64 => write!(f, "64"),
        }
    }
}

/// Architecture-dependent constants of the kallsyms encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArchitectureProfile {
    pointer_size: usize,
    align_boundary: usize,
    text_stext_offset: u64,
    default_text_base: u64,
}

impl ArchitectureProfile {
    pub const BITS64: ArchitectureProfile = ArchitectureProfile {
        pointer_size: 8,
        align_boundary: 0x100,
        text_stext_offset: 0x40,
        default_text_base: 0xffff_ffc0_0008_0000,
    };

    pub const BITS32: ArchitectureProfile = ArchitectureProfile {
        pointer_size: 4,
        align_boundary: 4 * 4,
        text_stext_offset: 0,
        default_text_base: 0xc000_8000,
    };

    pub fn for_arch(arch: Arch) -> Self {
        match arch {
            Arch::Bits32 => Self::BITS32,
            Arch::Bits64 => Self::BITS64,
        }
    }

    pub fn new(
        pointer_size: usize,
        align_boundary: usize,
        text_stext_offset: u64,
        default_text_base: u64,
    ) -> Result<Self, ProfileError> {
        if pointer_size != 4 && pointer_size != 8 {
            return Err(ProfileError::PointerSize(pointer_size));
        }
        if !align_boundary.is_power_of_two() || align_boundary < pointer_size {
            return Err(ProfileError::AlignBoundary {
                align: align_boundary,
                pointer_size,
            });
        }
        Ok(Self {
            pointer_size,
            align_boundary,
            text_stext_offset,
            default_text_base,
        })
    }

    pub fn with_align_boundary(self, align_boundary: usize) -> Result<Self, ProfileError> {
        Self::new(
            self.pointer_size,
            align_boundary,
            self.text_stext_offset,
            self.default_text_base,
        )
    }

    pub fn with_text_stext_offset(self, text_stext_offset: u64) -> Self {
        Self {
            text_stext_offset,
            ..self
        }
    }

    pub fn pointer_size(&self) -> usize {
        self.pointer_size
    }

    pub fn align_boundary(&self) -> usize {
        self.align_boundary
    }

    pub fn text_stext_offset(&self) -> u64 {
        self.text_stext_offset
    }

    pub fn default_text_base(&self) -> u64 {
        self.default_text_base
    }

    /// Next label boundary strictly after `offset`; an already aligned
    /// offset still moves a full boundary forward.
    pub fn align_next(&self, offset: usize) -> Option<usize> {
        offset
            .checked_add(self.align_boundary)
            .map(|o| o & !(self.align_boundary - 1))
    }

    /// Little-endian pointer decode. `bytes` must be exactly one pointer.
    pub fn decode_pointer(&self, bytes: &[u8]) -> u64 {
        let mut buf = [0u8; 8];
        buf[..self.pointer_size].copy_from_slice(&bytes[..self.pointer_size]);
        u64::from_le_bytes(buf)
    }

    /// Little-endian pointer encode, `None` if `value` is wider than a pointer.
    pub fn encode_pointer(&self, value: u64) -> Option<Vec<u8>> {
        if self.pointer_size < 8 && value >> (self.pointer_size * 8) != 0 {
            return None;
        }
        Some(value.to_le_bytes()[..self.pointer_size].to_vec())
    }
}
