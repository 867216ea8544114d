use crate::{
    error::DecodeError,
    profile::ArchitectureProfile,
};

/// Walks the address table in pointer strides up to the first zero slot.
/// Returns `(addresses_end, symbol_count)`.
///
/// A genuine symbol at address 0 ends the table early; the stored count
/// check in layout resolution then reports the mismatch.
pub fn scan_address_table(
    image: &[u8],
    addresses_start: usize,
    profile: &ArchitectureProfile,
) -> Result<(usize, usize), DecodeError> {
    let ps = profile.pointer_size();
    let table = image
        .get(addresses_start..)
        .ok_or(DecodeError::MalformedAddressTable {
            start: addresses_start,
            reason: "table starts past the end of the image",
        })?;

    let slots = table
        .chunks_exact(ps)
        .position(|slot| profile.decode_pointer(slot) == 0)
        .ok_or(DecodeError::MalformedAddressTable {
            start: addresses_start,
            reason: "no zero terminator before the end of the image",
        })?;

    // stride walk: the table size is a whole number of pointers
    Ok((addresses_start + slots * ps, slots))
}

#[cfg(test)]
mod tests {
    use crate::{
        error::DecodeError,
        profile::ArchitectureProfile,
        scan::scan_address_table,
    };

    fn table(profile: &ArchitectureProfile, addrs: &[u64]) -> Vec<u8> {
        let mut image = vec![0xeeu8; 3];
        for a in addrs {
            image.extend(profile.encode_pointer(*a).unwrap());
        }
        image
    }

    #[test]
    fn count_64() {
        let p = ArchitectureProfile::BITS64;
        let image = table(&p, &[0x10000, 0x10040, 0x10080, 0, 0x42]);

        assert_eq!(scan_address_table(&image, 3, &p), Ok((3 + 24, 3)));
    }

    #[test]
    fn stride_not_bytes() {
        // zero bytes straddling two slots are not a terminator
        let p = ArchitectureProfile::BITS32;
        let image = table(&p, &[0x0000_8000, 0x00c0_0000, 0]);

        assert_eq!(scan_address_table(&image, 3, &p), Ok((3 + 8, 2)));
    }

    #[test]
    fn no_terminator() {
        let p = ArchitectureProfile::BITS32;
        let mut image = table(&p, &[0xc0008000, 0xc0008010]);
        image.extend([0u8; 3]);

        assert_eq!(
            scan_address_table(&image, 3, &p),
            Err(DecodeError::MalformedAddressTable {
                start: 3,
                reason: "no zero terminator before the end of the image",
            })
        );
    }

    #[test]
    fn start_past_end() {
        let p = ArchitectureProfile::BITS64;
        assert!(matches!(
            scan_address_table(&[0u8; 8], 9, &p),
            Err(DecodeError::MalformedAddressTable { start: 9, .. })
        ));
    }
}
