extern crate kmp_search;
use kmp_search::Kmp;

use crate::compress::char_counter::CharCounter;

/*
 * A token of `len` bytes used `count` times shrinks the name block by
 * (len - 1) * count bytes and costs len + 1 bytes in the token block
 * (the index entry is paid whether the slot is used or not).
 */
fn saving(len: usize, count: usize) -> isize {
    let saved = (len.saturating_sub(1) * count) as isize;
    saved - (len as isize + 1)
}

fn enlarge<'a>(
    fragments: &[&'a [u8]],
    mut token: &'a [u8],
    count: usize,
    right: bool,
) -> (&'a [u8], usize) {
    let mut candidates: Vec<(&[u8], usize, isize)> =
        vec![(token, count, saving(token.len(), count))];

    loop {
        let mut tbl: [(&[u8], usize); 256] = [(&[], 0); 256];
        let kmp = Kmp::new(token);

        for &frag in fragments {
            if frag.len() <= token.len() {
                continue;
            }
            let subject = if right {
                &frag[..(frag.len() - 1)]
            } else {
                &frag[1..]
            };

            for i in kmp.find_all(subject) {
                let tok_l = i;
                let tok_r = tok_l + token.len();

                let c = frag[if right { tok_r } else { tok_l }] as usize;
                tbl[c].0 = &frag[tok_l..=tok_r];
                tbl[c].1 += 1;
            }
        }

        let mut best_i = 0usize;
        for i in 0..tbl.len() {
            if tbl[i].1 > tbl[best_i].1 {
                best_i = i;
            }
        }

        let (newtoken, cnt) = tbl[best_i];
        if cnt == 0 {
            break;
        }

        candidates.push((newtoken, cnt, saving(newtoken.len(), cnt)));
        token = newtoken;
    }

    let mut max_i = 0usize;
    for i in 1..candidates.len() {
        if candidates[i].2 >= candidates[max_i].2 {
            max_i = i;
        }
    }

    let (tok, cnt, _saving) = candidates[max_i];
    (tok, cnt)
}

/// Grows the most frequent byte to the left, then to the right, keeping
/// the extension that saves the most space. Returns `None` when nothing
/// longer than one byte would pay for its slot.
pub fn guess_best_token<'a>(fragments: &[&'a [u8]]) -> Option<(&'a [u8], usize)> {
    let mut counter = CharCounter::new();
    for frag in fragments {
        counter.count_up(frag.iter());
    }

    let (seed, count) = counter.iter_by_freq().next()?;
    let token = fragments
        .iter()
        .find_map(|&frag| frag.iter().position(|c| *c == seed).map(|i| &frag[i..=i]))?;

    let (token, count) = enlarge(fragments, token, count, false);
    let (token, count) = enlarge(fragments, token, count, true);

    if token.len() < 2 || saving(token.len(), count) <= 0 {
        None
    } else {
        Some((token, count))
    }
}
