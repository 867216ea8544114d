extern crate kmp_search;
use kmp_search::Kmp;

/// Dictionary entries in matching order: longest first, so a multi-byte
/// token wins over the single bytes it is made of.
pub struct Tokenizer<'d> {
    entries: Vec<(u8, Kmp<'d>)>,
}

impl<'d> Tokenizer<'d> {
    pub fn new(dic: &'d [Vec<u8>]) -> Self {
        let mut order: Vec<(u8, &[u8])> = dic
            .iter()
            .enumerate()
            .filter(|(_, tok)| !tok.is_empty())
            .map(|(i, tok)| (i as u8, tok.as_slice()))
            .collect();
        order.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then(a.0.cmp(&b.0)));

        Self {
            entries: order
                .into_iter()
                .map(|(id, tok)| (id, Kmp::new(tok)))
                .collect(),
        }
    }

    /// Token ids spelling `data`, or `None` if some byte has no entry.
    pub fn tokenize(&self, data: &[u8]) -> Option<Vec<u8>> {
        let mut result: Vec<u8> = Vec::new();
        if self.tokenize_into(data, 0, &mut result) {
            Some(result)
        } else {
            None
        }
    }

    fn tokenize_into(&self, data: &[u8], first: usize, result: &mut Vec<u8>) -> bool {
        if data.is_empty() {
            return true;
        }

        for (n, (id, kmp)) in self.entries.iter().enumerate().skip(first) {
            let mut last_end = 0;
            let mut found = false;
            for start in kmp.find_all(data) {
                // the gap cannot hold this entry or any before it
                if start > last_end && !self.tokenize_into(&data[last_end..start], n + 1, result) {
                    return false;
                }
                result.push(*id);
                last_end = start + kmp.pattern().len();
                found = true;
            }
            if found {
                return last_end == data.len()
                    || self.tokenize_into(&data[last_end..], n + 1, result);
            }
        }

        false
    }
}
