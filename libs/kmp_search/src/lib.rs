/// Precomputed Knuth-Morris-Pratt matcher for one byte pattern.
pub struct Kmp<'p> {
    pattern: &'p [u8],
    // failure[i]: length of the longest proper border of pattern[..=i]
    failure: Vec<usize>,
}

impl<'p> Kmp<'p> {
    pub fn new(pattern: &'p [u8]) -> Self {
        let mut failure = vec![0usize; pattern.len()];
        let mut k = 0;
        for i in 1..pattern.len() {
            while k > 0 && pattern[i] != pattern[k] {
                k = failure[k - 1];
            }
            if pattern[i] == pattern[k] {
                k += 1;
            }
            failure[i] = k;
        }
        Self { pattern, failure }
    }

    pub fn pattern(&self) -> &'p [u8] {
        self.pattern
    }

    /// First match at or after `from`. An empty pattern never matches.
    pub fn find_from(&self, subject: &[u8], from: usize) -> Option<usize> {
        let plen = self.pattern.len();
        if plen == 0 || from >= subject.len() || subject.len() - from < plen {
            return None;
        }

        let mut k = 0;
        for (i, &c) in subject.iter().enumerate().skip(from) {
            while k > 0 && c != self.pattern[k] {
                k = self.failure[k - 1];
            }
            if c == self.pattern[k] {
                k += 1;
            }
            if k == plen {
                return Some(i + 1 - plen);
            }
        }

        None
    }

    pub fn find(&self, subject: &[u8]) -> Option<usize> {
        self.find_from(subject, 0)
    }

    /// Non-overlapping matches, left to right.
    pub fn find_all<'s>(&'s self, subject: &'s [u8]) -> impl Iterator<Item = usize> + 's {
        KMPSearchAll {
            kmp: self,
            subject,
            curr: 0,
        }
    }
}

struct KMPSearchAll<'k, 's> {
    kmp: &'k Kmp<'k>,
    subject: &'s [u8],
    curr: usize,
}

impl<'k, 's> Iterator for KMPSearchAll<'k, 's> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        match self.kmp.find_from(self.subject, self.curr) {
            Some(pos) => {
                self.curr = pos + self.kmp.pattern.len();
                Some(pos)
            },
            None => {
                self.curr = self.subject.len();
                None
            }
        }
    }
}

pub fn kmp_search(pattern: &[u8], subject: &[u8]) -> Option<usize> {
    Kmp::new(pattern).find(subject)
}

pub fn kmp_search_all(pattern: &[u8], subject: &[u8]) -> Vec<usize> {
    Kmp::new(pattern).find_all(subject).collect()
}
