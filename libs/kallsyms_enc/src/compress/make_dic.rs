extern crate kmp_search;
use kmp_search::Kmp;

use crate::compress::{
    char_counter::CharCounter,
    guess_best_token::guess_best_token,
};

pub const TOKEN_SLOTS: usize = 256;

fn split_by_token<'a>(sym: &'a [u8], kmp: &Kmp) -> Vec<&'a [u8]> {
    let mut pieces = vec![];
    let mut last_end = 0;
    for pos in kmp.find_all(sym) {
        if pos > last_end {
            pieces.push(&sym[last_end..pos]);
        }
        last_end = pos + kmp.pattern().len();
    }
    if last_end < sym.len() {
        pieces.push(&sym[last_end..]);
    }
    pieces
}

/// Builds the 256-slot token table for `names`.
///
/// Every byte occurring in a name keeps its own value as a one-byte token,
/// so any name can always be expressed. The remaining slots receive
/// multi-byte tokens, best first, until either `max_tokens` are placed or
/// nothing left is worth a slot. Slots left over hold the empty string.
pub fn make_dic(names: &[&[u8]], max_tokens: usize) -> Vec<Vec<u8>> {
    let mut counter = CharCounter::new();
    for name in names {
        counter.count_up(name.iter());
    }

    let mut dic: Vec<Vec<u8>> = (0..TOKEN_SLOTS)
        .map(|c| {
            if counter.is_used(c as u8) {
                vec![c as u8]
            } else {
                vec![]
            }
        })
        .collect();

    let free: Vec<u8> = counter.unused().take(max_tokens).collect();
    let mut fragments: Vec<&[u8]> = names.to_vec();

    for slot in free {
        let token = match guess_best_token(&fragments) {
            Some((token, _count)) => token.to_vec(),
            None => break,
        };

        let kmp = Kmp::new(&token);
        let mut newfragments: Vec<&[u8]> = vec![];
        for &frag in fragments.iter() {
            newfragments.append(&mut split_by_token(frag, &kmp));
        }
        fragments = newfragments;
        dic[slot as usize] = token;
    }

    dic
}

#[cfg(test)]
mod tests {
    use crate::compress::make_dic::{
        make_dic,
        split_by_token,
        TOKEN_SLOTS,
    };
    use kmp_search::Kmp;

    #[test]
    fn split() {
        let kmp = Kmp::new(b"_test_");
        assert_eq!(
            split_by_token(b"bar1_test_23_test_", &kmp),
            vec![&b"bar1"[..], &b"23"[..]]
        );
        assert_eq!(split_by_token(b"_test_", &kmp), Vec::<&[u8]>::new());
        assert_eq!(split_by_token(b"foo", &kmp), vec![&b"foo"[..]]);
    }

    #[test]
    fn single_bytes_keep_their_slot() {
        let dic = make_dic(&[b"Tfoo", b"tbar"], 0);

        assert_eq!(dic.len(), TOKEN_SLOTS);
        assert_eq!(dic[b'T' as usize], b"T".to_vec());
        assert_eq!(dic[b'o' as usize], b"o".to_vec());
        assert_eq!(dic[b'r' as usize], b"r".to_vec());
        assert_eq!(dic[b'x' as usize], Vec::<u8>::new());
        assert_eq!(dic.iter().filter(|t| !t.is_empty()).count(), 7);
    }

    #[test]
    fn tokens_go_to_free_slots() {
        let syms: Vec<&[u8]> = vec![
            b"tfoo_test_1",
            b"tbar1_test_23",
            b"tbar2_test_456",
        ];

        let dic = make_dic(&syms, TOKEN_SLOTS);

        // byte 0 is never used by a name, so it is the first free slot
        assert_eq!(dic[0], b"_test_".to_vec());
        assert_eq!(dic[b'_' as usize], b"_".to_vec());
        assert!(dic.iter().filter(|t| t.len() > 1).count() >= 1);
    }
}
