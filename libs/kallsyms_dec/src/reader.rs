use crate::{
    error::DecodeError,
    profile::ArchitectureProfile,
};

/// Bounds-checked little-endian reads over the borrowed image.
#[derive(Clone, Copy)]
pub(crate) struct Reader<'a> {
    image: &'a [u8],
}

impl<'a> Reader<'a> {
    pub fn new(image: &'a [u8]) -> Self {
        Self { image }
    }

    fn out_of_bounds(&self, offset: usize, len: usize) -> DecodeError {
        DecodeError::OutOfBounds {
            offset,
            len,
            size: self.image.len(),
        }
    }

    /// `offset + n`, failing the same way a read there would.
    pub fn advance(&self, offset: usize, n: usize) -> Result<usize, DecodeError> {
        offset
            .checked_add(n)
            .ok_or_else(|| self.out_of_bounds(offset, n))
    }

    pub fn align_next(&self, offset: usize, profile: &ArchitectureProfile) -> Result<usize, DecodeError> {
        profile
            .align_next(offset)
            .ok_or_else(|| self.out_of_bounds(offset, profile.align_boundary()))
    }

    pub fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.advance(offset, len)?;
        self.image
            .get(offset..end)
            .ok_or_else(|| self.out_of_bounds(offset, len))
    }

    pub fn u8(&self, offset: usize) -> Result<u8, DecodeError> {
        Ok(self.slice(offset, 1)?[0])
    }

    pub fn u16(&self, offset: usize) -> Result<u16, DecodeError> {
        let b = self.slice(offset, 2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn pointer(&self, offset: usize, profile: &ArchitectureProfile) -> Result<u64, DecodeError> {
        let b = self.slice(offset, profile.pointer_size())?;
        Ok(profile.decode_pointer(b))
    }

    /// NUL-terminated string at `offset`, terminator excluded.
    pub fn cstr(&self, offset: usize) -> Result<&'a [u8], DecodeError> {
        let rest = self
            .image
            .get(offset..)
            .ok_or_else(|| self.out_of_bounds(offset, 1))?;
        match rest.iter().position(|c| *c == 0) {
            Some(len) => Ok(&rest[..len]),
            None => Err(self.out_of_bounds(offset, rest.len() + 1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::DecodeError,
        profile::ArchitectureProfile,
        reader::Reader,
    };

    #[test]
    fn reads() {
        let data = [0x34u8, 0x12, b'a', b'b', 0, 0x78, 0x56, 0x34, 0x12];
        let r = Reader::new(&data);

        assert_eq!(r.u8(0), Ok(0x34));
        assert_eq!(r.u16(0), Ok(0x1234));
        assert_eq!(r.cstr(2), Ok(&b"ab"[..]));
        assert_eq!(r.cstr(4), Ok(&b""[..]));
        assert_eq!(r.pointer(5, &ArchitectureProfile::BITS32), Ok(0x12345678));
    }

    #[test]
    fn out_of_bounds() {
        let data = [1u8, 2, 3, b'x'];
        let r = Reader::new(&data);

        assert_eq!(
            r.u16(3),
            Err(DecodeError::OutOfBounds { offset: 3, len: 2, size: 4 })
        );
        assert_eq!(
            r.pointer(0, &ArchitectureProfile::BITS64),
            Err(DecodeError::OutOfBounds { offset: 0, len: 8, size: 4 })
        );
        assert_eq!(
            r.cstr(3),
            Err(DecodeError::OutOfBounds { offset: 3, len: 2, size: 4 })
        );
        assert_eq!(
            r.cstr(5),
            Err(DecodeError::OutOfBounds { offset: 5, len: 1, size: 4 })
        );
        assert_eq!(
            r.slice(usize::MAX, 2),
            Err(DecodeError::OutOfBounds { offset: usize::MAX, len: 2, size: 4 })
        );
        assert_eq!(r.slice(4, 0), Ok(&[][..]));
    }
}
