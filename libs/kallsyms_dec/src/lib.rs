//! Recovers the kallsyms symbol table from a raw kernel image that has no
//! section headers pointing at it.
//!
//! The address table is found by searching for the `_text`/`stext` pair
//! derived from the load base; every later block is located purely by
//! label alignment, and names are expanded through the 256-entry token
//! dictionary.
//!
//! ```no_run
//! use kallsyms_dec::{decode, ArchitectureProfile};
//!
//! let image = std::fs::read("Image").unwrap();
//! for sym in &decode(&image, &ArchitectureProfile::BITS64, None).unwrap() {
//!     println!("{:016x} {} {}", sym.address, sym.kind, sym.name);
//! }
//! ```

mod error;
mod layout;
mod locate;
mod names;
mod profile;
mod reader;
mod scan;
mod symbol;
mod token;

#[cfg(test)]
mod testutil;

pub use error::{DecodeError, ProfileError};
pub use layout::{resolve_layout, LayoutOffsets};
pub use locate::{anchor_pattern, locate_addresses};
pub use names::decompress_symbols;
pub use profile::{Arch, ArchitectureProfile, MARKER_STRIDE, TOKEN_COUNT, TOKEN_INDEX_ENTRY_SIZE};
pub use scan::scan_address_table;
pub use symbol::{SymbolRecord, SymbolTable};
pub use token::TokenTable;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoded {
    pub layout: LayoutOffsets,
    pub symbols: SymbolTable,
}

pub struct Decoder<'a> {
    image: &'a [u8],
    profile: ArchitectureProfile,
    base: Option<u64>,
}

impl<'a> Decoder<'a> {
    pub fn new(image: &'a [u8], profile: ArchitectureProfile) -> Self {
        Self {
            image,
            profile,
            base: None,
        }
    }

    /// Load address of `_text`; defaults to the profile's text base.
    pub fn base(mut self, base: u64) -> Self {
        self.base = Some(base);
        self
    }

    pub fn base_address(&self) -> u64 {
        self.base.unwrap_or(self.profile.default_text_base())
    }

    pub fn run(&self) -> Result<Decoded, DecodeError> {
        let image = self.image;
        let profile = &self.profile;

        let addresses_start = locate_addresses(image, profile, self.base_address())?;
        let (addresses_end, count) = scan_address_table(image, addresses_start, profile)?;
        let layout = resolve_layout(image, addresses_start, addresses_end, count, profile)?;
        let tokens = TokenTable::decode(image, layout.tokens_start, layout.token_index_start)?;
        let symbols = decompress_symbols(image, &layout, count, &tokens, profile)?;

        Ok(Decoded { layout, symbols })
    }
}

pub fn decode(
    image: &[u8],
    profile: &ArchitectureProfile,
    base: Option<u64>,
) -> Result<SymbolTable, DecodeError> {
    let mut decoder = Decoder::new(image, *profile);
    if let Some(base) = base {
        decoder = decoder.base(base);
    }
    decoder.run().map(|d| d.symbols)
}
