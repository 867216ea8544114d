extern crate kmp_search;
use kmp_search::kmp_search;

use crate::{
    error::DecodeError,
    profile::ArchitectureProfile,
};

/// `_text` followed by `stext`: the first two entries of the address table.
pub fn anchor_pattern(profile: &ArchitectureProfile, base: u64) -> Result<Vec<u8>, DecodeError> {
    let overflow = DecodeError::BaseAddressOverflow {
        base,
        pointer_size: profile.pointer_size(),
    };

    let stext = base
        .checked_add(profile.text_stext_offset())
        .ok_or_else(|| overflow.clone())?;
    let mut needle = profile.encode_pointer(base).ok_or_else(|| overflow.clone())?;
    needle.extend(profile.encode_pointer(stext).ok_or(overflow)?);
    Ok(needle)
}

/// Offset of the address table: the first place the anchor pattern occurs.
pub fn locate_addresses(
    image: &[u8],
    profile: &ArchitectureProfile,
    base: u64,
) -> Result<usize, DecodeError> {
    let needle = anchor_pattern(profile, base)?;
    kmp_search(&needle, image).ok_or(DecodeError::PatternNotFound { base })
}

#[cfg(test)]
mod tests {
    use crate::{
        error::DecodeError,
        locate::{anchor_pattern, locate_addresses},
        profile::ArchitectureProfile,
    };

    #[test]
    fn pattern_64() {
        assert_eq!(
            anchor_pattern(&ArchitectureProfile::BITS64, 0xffffffc000080000),
            Ok(vec![
                0x00, 0x00, 0x08, 0x00, 0xc0, 0xff, 0xff, 0xff,
                0x40, 0x00, 0x08, 0x00, 0xc0, 0xff, 0xff, 0xff,
            ])
        );
    }

    #[test]
    fn pattern_32() {
        assert_eq!(
            anchor_pattern(&ArchitectureProfile::BITS32, 0xc0008000),
            Ok(vec![0x00, 0x80, 0x00, 0xc0, 0x00, 0x80, 0x00, 0xc0])
        );
    }

    #[test]
    fn base_wider_than_pointer() {
        assert_eq!(
            anchor_pattern(&ArchitectureProfile::BITS32, 0xffffffc000080000),
            Err(DecodeError::BaseAddressOverflow {
                base: 0xffffffc000080000,
                pointer_size: 4,
            })
        );
        assert_eq!(
            anchor_pattern(&ArchitectureProfile::BITS64, u64::MAX - 0x10),
            Err(DecodeError::BaseAddressOverflow {
                base: u64::MAX - 0x10,
                pointer_size: 8,
            })
        );
    }

    #[test]
    fn first_match_wins() {
        let p = ArchitectureProfile::BITS32;
        let mut image = vec![0xaau8; 6];
        image.extend(anchor_pattern(&p, 0xc0008000).unwrap());
        image.extend([0u8; 4]);
        image.extend(anchor_pattern(&p, 0xc0008000).unwrap());

        assert_eq!(locate_addresses(&image, &p, 0xc0008000), Ok(6));
    }

    #[test]
    fn not_found() {
        let p = ArchitectureProfile::BITS64;
        let image = vec![0u8; 0x400];

        assert_eq!(
            locate_addresses(&image, &p, 0x10000),
            Err(DecodeError::PatternNotFound { base: 0x10000 })
        );
        assert_eq!(
            locate_addresses(&[], &p, 0x10000),
            Err(DecodeError::PatternNotFound { base: 0x10000 })
        );
    }
}
