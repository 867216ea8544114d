#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolRecord {
    pub address: u64,
    /// Type letter as printed by nm: T/t text, D/d data, B/b bss, ...
    pub kind: char,
    pub name: String,
}

/// Symbols in address-table order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: Vec<SymbolRecord>,
    // indices into `symbols`, sorted by address
    by_address: Vec<usize>,
}

impl SymbolTable {
    pub fn new(symbols: Vec<SymbolRecord>) -> Self {
        let mut by_address: Vec<usize> = (0..symbols.len()).collect();
        by_address.sort_by_key(|i| symbols[*i].address);
        Self { symbols, by_address }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&SymbolRecord> {
        self.symbols.get(i)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, SymbolRecord> {
        self.symbols.iter()
    }

    fn nth_addr(&self, i: usize) -> u64 {
        self.symbols[self.by_address[i]].address
    }

    fn search_idx(&self, addr: u64) -> Option<usize> {
        if self.symbols.is_empty() || addr < self.nth_addr(0) {
            return None;
        }

        let mut left: usize = 0;
        let mut right: usize = self.by_address.len() - 1;

        let idx = loop {
            if right - left < 2 {
                break if self.nth_addr(right) <= addr {
                    right
                } else {
                    left
                };
            }

            let center = (left + right) / 2;
            if self.nth_addr(center) <= addr {
                left = center;
            } else {
                right = center;
            }
        };

        Some(idx)
    }

    /// Nearest symbol at or below `addr`, and the distance from it.
    /// Among symbols sharing an address the last in table order wins.
    pub fn resolve(&self, addr: u64) -> Option<(&SymbolRecord, u64)> {
        let idx = self.search_idx(addr)?;
        let sym = &self.symbols[self.by_address[idx]];
        Some((sym, addr - sym.address))
    }
}

impl<'t> IntoIterator for &'t SymbolTable {
    type Item = &'t SymbolRecord;
    type IntoIter = core::slice::Iter<'t, SymbolRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::symbol::{SymbolRecord, SymbolTable};

    fn sym(address: u64, name: &str) -> SymbolRecord {
        SymbolRecord {
            address,
            kind: 't',
            name: name.to_string(),
        }
    }

    #[test]
    fn resolve() {
        let table = SymbolTable::new(vec![
            sym(0x1000, "test_function3"),
            sym(0x3000, "test_function1"),
            sym(0x2000, "test_function2"),
        ]);

        let name = |addr| table.resolve(addr).map(|(s, off)| (s.name.as_str(), off));

        assert_eq!(name(0x0fff), None);
        assert_eq!(name(0x1000), Some(("test_function3", 0)));
        assert_eq!(name(0x1fff), Some(("test_function3", 0xfff)));
        assert_eq!(name(0x2000), Some(("test_function2", 0)));
        assert_eq!(name(0x10000), Some(("test_function1", 0xd000)));
    }

    #[test]
    fn keeps_table_order() {
        let table = SymbolTable::new(vec![sym(0x3000, "b"), sym(0x1000, "a")]);

        let names: Vec<&str> = table.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(table.get(1), Some(&sym(0x1000, "a")));
    }

    #[test]
    fn empty() {
        let table = SymbolTable::new(vec![]);

        assert!(table.is_empty());
        assert_eq!(table.resolve(0x1000), None);
    }
}
