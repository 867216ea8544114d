use crate::{
    error::DecodeError,
    layout::LayoutOffsets,
    profile::ArchitectureProfile,
    reader::Reader,
    symbol::{SymbolRecord, SymbolTable},
    token::TokenTable,
};

/// Expands every name record and pairs it with its address.
///
/// Records are read from `layout.names_start` as a length byte followed
/// by that many token ids. The first expanded byte is the symbol kind,
/// mapped byte-to-char (nm type letters are ASCII); the remaining bytes
/// form the name, decoded as lossy UTF-8.
pub fn decompress_symbols(
    image: &[u8],
    layout: &LayoutOffsets,
    count: usize,
    tokens: &TokenTable,
    profile: &ArchitectureProfile,
) -> Result<SymbolTable, DecodeError> {
    let r = Reader::new(image);
    let ps = profile.pointer_size();

    // grows to the longest name actually expanded
    let mut buf: Vec<u8> = vec![];
    let mut symbols: Vec<SymbolRecord> = Vec::with_capacity(count);
    let mut cursor = layout.names_start;

    for index in 0..count {
        let len = r.u8(cursor)? as usize;
        let ids = r.slice(cursor + 1, len)?;
        cursor += len + 1;

        buf.clear();
        for id in ids {
            buf.extend_from_slice(tokens.get(*id));
        }

        let (kind, name) = match buf.split_first() {
            Some((kind, name)) => (*kind as char, String::from_utf8_lossy(name).into_owned()),
            None => return Err(DecodeError::EmptySymbolName { index }),
        };
        let address = r.pointer(layout.addresses_start + index * ps, profile)?;

        symbols.push(SymbolRecord {
            address,
            kind,
            name,
        });
    }

    Ok(SymbolTable::new(symbols))
}
