use kallsyms_enc::{Packed, Packer, Target};

use crate::{
    profile::ArchitectureProfile,
    symbol::SymbolTable,
};

pub fn target(profile: &ArchitectureProfile) -> Target {
    Target {
        pointer_size: profile.pointer_size(),
        align_boundary: profile.align_boundary(),
    }
}

/// 64-bit image, base 0x10000: `_text` = start_kernel, `stext` = secondary.
pub fn scenario_image() -> Packed {
    Packer::new(target(&ArchitectureProfile::BITS64))
        .prefix(&[0xd5u8; 0x30])
        .suffix(&[0x1fu8; 0x40])
        .pack(&[(0x10000, "Tstart_kernel"), (0x10040, "tsecondary")])
        .unwrap()
}

pub fn records(table: &SymbolTable) -> Vec<(u64, char, &str)> {
    table
        .iter()
        .map(|s| (s.address, s.kind, s.name.as_str()))
        .collect()
}
