pub struct CharCounter {
    table: [usize; 256],
}

impl CharCounter {
    pub fn new() -> Self {
        Self { table: [0; 256] }
    }

    pub fn count_up<'a>(&mut self, bytes: impl Iterator<Item = &'a u8>) {
        for c in bytes {
            self.table[*c as usize] += 1;
        }
    }

    pub fn is_used(&self, c: u8) -> bool {
        self.table[c as usize] > 0
    }

    /// Byte values never seen, ascending. These are the dictionary slots
    /// free to carry multi-byte tokens.
    pub fn unused(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=255u8).filter(move |c| !self.is_used(*c))
    }

    pub fn iter_by_freq(&self) -> impl Iterator<Item = (u8, usize)> {
        let mut chr_cnt: Vec<(u8, usize)> = self
            .table
            .iter()
            .enumerate()
            .map(|(c, s)| (c as u8, *s))
            .collect();
        chr_cnt.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        chr_cnt.into_iter().take_while(|(_c, s)| *s != 0)
    }
}
