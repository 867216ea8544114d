use std::{borrow::Cow, io::Write};

use kallsyms_dec::{ArchitectureProfile, SymbolTable};
use serde::Serialize;

#[derive(Serialize)]
struct JsonRecord<'a> {
    address: String,
    kind: char,
    name: Cow<'a, str>,
}

/// Rust-for-Linux symbols come out demangled; anything else is untouched.
pub fn display_name(name: &str, demangle: bool) -> Cow<'_, str> {
    if demangle {
        if let Ok(d) = rustc_demangle::try_demangle(name) {
            return Cow::Owned(format!("{:#}", d));
        }
    }
    Cow::Borrowed(name)
}

fn address_width(profile: &ArchitectureProfile) -> usize {
    (profile.pointer_size() * 2).max(8)
}

pub fn write_text<W: Write>(
    w: &mut W,
    table: &SymbolTable,
    profile: &ArchitectureProfile,
    demangle: bool,
) -> std::io::Result<()> {
    let width = address_width(profile);
    for sym in table {
        writeln!(
            w,
            "{:0width$x} {} {}",
            sym.address,
            sym.kind,
            display_name(&sym.name, demangle),
            width = width
        )?;
    }
    Ok(())
}

pub fn write_json<W: Write>(
    w: &mut W,
    table: &SymbolTable,
    profile: &ArchitectureProfile,
    demangle: bool,
) -> anyhow::Result<()> {
    let width = address_width(profile);
    let records: Vec<JsonRecord> = table
        .iter()
        .map(|sym| JsonRecord {
            address: format!("{:0width$x}", sym.address, width = width),
            kind: sym.kind,
            name: display_name(&sym.name, demangle),
        })
        .collect();

    serde_json::to_writer_pretty(&mut *w, &records)?;
    writeln!(w)?;
    Ok(())
}

/// One `ADDR name+0xoff` line per address; `?` when nothing precedes it.
pub fn write_resolved<W: Write>(
    w: &mut W,
    table: &SymbolTable,
    addresses: &[u64],
    profile: &ArchitectureProfile,
    demangle: bool,
) -> std::io::Result<()> {
    let width = address_width(profile);
    for addr in addresses {
        match table.resolve(*addr) {
            Some((sym, off)) => writeln!(
                w,
                "{:0width$x} {}+{:#x}",
                addr,
                display_name(&sym.name, demangle),
                off,
                width = width
            )?,
            None => writeln!(w, "{:0width$x} ?", addr, width = width)?,
        }
    }
    Ok(())
}
