/*
 * Blocks following the address table, each starting on the next label
 * boundary after the previous one ends:
 *
 *   addresses_start -> .-------------------------------.
 *                      | addr[0] (_text)               |
 *                      | addr[1] (stext)               |
 *                      |   ..                          |
 *   addresses_end   -> | 0 (first zero slot)           |
 *                      +-------------------------------+
 *   num_syms        -> | kallsyms_num_syms: pointer    |
 *                      +-------------------------------+
 *   names_start     -> | len: u8, token ids[len]       | x num_syms
 *                      +-------------------------------+
 *   markers_start   -> | pointer                       | x ceil(num_syms / 256)
 *                      +-------------------------------+
 *   tokens_start    -> | NUL-terminated string         | x 256
 *                      +-------------------------------+
 *   token_index     -> | u16 offset from tokens_start  | x 256
 *                      '-------------------------------'
 */

use crate::{
    error::DecodeError,
    profile::{ArchitectureProfile, MARKER_STRIDE, TOKEN_COUNT, TOKEN_INDEX_ENTRY_SIZE},
    reader::Reader,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutOffsets {
    pub addresses_start: usize,
    pub addresses_end: usize,
    pub num_syms: usize,
    pub names_start: usize,
    pub markers_start: usize,
    pub tokens_start: usize,
    pub token_index_start: usize,
}

/// Locates every block after the address table.
///
/// Checks the stored `kallsyms_num_syms` against `count`, then walks the
/// name records and the 256 token strings. Every record, every token
/// string and the full 512-byte token index must lie inside `image`,
/// otherwise `OutOfBounds` is returned. The marker block is skipped by
/// size only.
pub fn resolve_layout(
    image: &[u8],
    addresses_start: usize,
    addresses_end: usize,
    count: usize,
    profile: &ArchitectureProfile,
) -> Result<LayoutOffsets, DecodeError> {
    let r = Reader::new(image);

    let num_syms = r.align_next(addresses_end, profile)?;
    let stored = r.pointer(num_syms, profile)?;
    if stored != count as u64 {
        return Err(DecodeError::SymbolCountMismatch {
            derived: count as u64,
            stored,
        });
    }

    let names_start = r.align_next(num_syms, profile)?;
    let mut cursor = names_start;
    for _ in 0..count {
        let len = r.u8(cursor)? as usize;
        r.slice(cursor + 1, len)?;
        cursor += len + 1;
    }
    let markers_start = r.align_next(cursor, profile)?;

    let markers_len = ((count + MARKER_STRIDE - 1) / MARKER_STRIDE) * profile.pointer_size();
    let tokens_start = r.align_next(r.advance(markers_start, markers_len)?, profile)?;

    let mut cursor = tokens_start;
    for _ in 0..TOKEN_COUNT {
        let token = r.cstr(cursor)?;
        cursor += token.len() + 1;
    }
    let token_index_start = r.align_next(cursor, profile)?;
    r.slice(token_index_start, TOKEN_COUNT * TOKEN_INDEX_ENTRY_SIZE)?;

    Ok(LayoutOffsets {
        addresses_start,
        addresses_end,
        num_syms,
        names_start,
        markers_start,
        tokens_start,
        token_index_start,
    })
}
