use crate::{
    error::DecodeError,
    profile::{TOKEN_COUNT, TOKEN_INDEX_ENTRY_SIZE},
    reader::Reader,
};

/// The 256 dictionary strings, borrowed from the image.
///
/// Index entries are offsets into the token block and may point into the
/// middle of another entry's string, so several ids can share storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenTable<'a> {
    tokens: [&'a [u8]; TOKEN_COUNT],
}

impl<'a> TokenTable<'a> {
    pub fn decode(
        image: &'a [u8],
        tokens_start: usize,
        token_index_start: usize,
    ) -> Result<Self, DecodeError> {
        let r = Reader::new(image);
        let mut tokens: [&'a [u8]; TOKEN_COUNT] = [&[]; TOKEN_COUNT];

        for (i, token) in tokens.iter_mut().enumerate() {
            let rel = r.u16(token_index_start + i * TOKEN_INDEX_ENTRY_SIZE)?;
            *token = r.cstr(r.advance(tokens_start, rel as usize)?)?;
        }

        Ok(Self { tokens })
    }

    pub fn get(&self, id: u8) -> &'a [u8] {
        self.tokens[id as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        self.tokens.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::DecodeError,
        token::TokenTable,
        testutil::scenario_image,
    };

    #[test]
    fn matches_encoder_dictionary() {
        let packed = scenario_image();
        let off = packed.offsets;
        let table = TokenTable::decode(&packed.image, off.tokens_start, off.token_index_start)
            .unwrap();

        let decoded: Vec<Vec<u8>> = table.iter().map(|t| t.to_vec()).collect();
        assert_eq!(decoded, packed.tokens);
        assert_eq!(table.get(b'T'), b"T");
    }

    #[test]
    fn stable_across_decodes() {
        let packed = scenario_image();
        let off = packed.offsets;
        let first = TokenTable::decode(&packed.image, off.tokens_start, off.token_index_start);
        let second = TokenTable::decode(&packed.image, off.tokens_start, off.token_index_start);

        assert_eq!(first, second);
    }

    #[test]
    fn overlapping_entries() {
        // "init\0" stored once; id 1 points at "it" inside it
        let mut image = b"init\0".to_vec();
        let tokens_start = 0;
        let token_index_start = 8;
        image.resize(token_index_start, 0);
        let mut index = vec![4u16; 256];
        index[0] = 0;
        index[1] = 2;
        for rel in index {
            image.extend(rel.to_le_bytes());
        }

        let table = TokenTable::decode(&image, tokens_start, token_index_start).unwrap();
        assert_eq!(table.get(0), b"init");
        assert_eq!(table.get(1), b"it");
        assert_eq!(table.get(2), b"");
        assert_eq!(table.iter().filter(|t| t.is_empty()).count(), 254);
    }

    #[test]
    fn index_points_past_end() {
        let mut image = vec![0u8; 8];
        for _ in 0..256 {
            image.extend(0x300u16.to_le_bytes());
        }

        assert_eq!(
            TokenTable::decode(&image, 0, 8),
            Err(DecodeError::OutOfBounds {
                offset: 0x300,
                len: 1,
                size: 8 + 512,
            })
        );
    }
}
