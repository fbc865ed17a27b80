use super::{Symbol, ALPH_SIZE, BITS_PER_WORD, PSEUDO_EOF};
use crate::bitstream::BitInput;
use crate::error::{Error, Result};

/// Occurrence count for every byte value plus the end-of-stream symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; ALPH_SIZE + 1],
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FrequencyTable {
    /// Create a table with every count at zero
    pub fn new() -> Self {
        FrequencyTable {
            counts: [0; ALPH_SIZE + 1],
        }
    }

    /// Count the bytes of an in-memory buffer.
    ///
    /// The sentinel is counted once when `data` is non-empty.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut table = Self::new();
        for &byte in data {
            table.counts[byte as usize] += 1;
        }
        if !data.is_empty() {
            table.insert_sentinel();
        }
        table
    }

    /// Get the count of a symbol, zero for anything outside the alphabet
    pub fn get(&self, symbol: Symbol) -> u64 {
        self.counts.get(symbol as usize).copied().unwrap_or(0)
    }

    /// Overwrite the count of a symbol
    pub fn set(&mut self, symbol: Symbol, count: u64) -> Result<()> {
        let slot = self.counts.get_mut(symbol as usize).ok_or_else(|| {
            Error::InvalidInput(format!("symbol {} outside the alphabet", symbol))
        })?;
        *slot = count;
        Ok(())
    }

    /// Mark the end-of-stream symbol as occurring exactly once
    pub fn insert_sentinel(&mut self) {
        self.counts[PSEUDO_EOF as usize] = 1;
    }

    /// True when no symbol has a positive count
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&count| count == 0)
    }

    /// Symbols with a positive count, in ascending symbol order
    pub fn symbols(&self) -> impl Iterator<Item = (Symbol, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(symbol, &count)| (symbol as Symbol, count))
    }

    /// Number of symbols with a positive count
    pub fn distinct(&self) -> usize {
        self.symbols().count()
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Read `input` to exhaustion one byte at a time, counting every value.
///
/// Leaves `input` at its end; reset it before reading it again. An empty input
/// yields an empty table, which the caller has to special-case.
pub fn read_for_counts<I: BitInput>(input: &mut I) -> Result<FrequencyTable> {
    let mut table = FrequencyTable::new();
    let mut any = false;
    while let Some(byte) = input.read_bits(BITS_PER_WORD)? {
        table.counts[byte as usize] += 1;
        any = true;
    }
    if any {
        table.insert_sentinel();
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitstream::BitInputStream;
    use std::io::Cursor;

    #[test]
    fn test_counts_each_byte() {
        let mut input = BitInputStream::new(Cursor::new(b"aabccc".to_vec()));
        let table = read_for_counts(&mut input).unwrap();
        assert_eq!(table.get(b'a' as Symbol), 2);
        assert_eq!(table.get(b'b' as Symbol), 1);
        assert_eq!(table.get(b'c' as Symbol), 3);
        assert_eq!(table.get(b'd' as Symbol), 0);
        assert_eq!(table.get(PSEUDO_EOF), 1);
        assert_eq!(table.distinct(), 4);
        assert_eq!(table.total(), 7);
    }

    #[test]
    fn test_matches_in_memory_count() {
        let data: Vec<u8> = (0..=255u8).chain(0..10).collect();
        let mut input = BitInputStream::new(Cursor::new(data.clone()));
        assert_eq!(
            read_for_counts(&mut input).unwrap(),
            FrequencyTable::from_bytes(&data)
        );
    }

    #[test]
    fn test_empty_input_gives_empty_table() {
        let mut input = BitInputStream::new(Cursor::new(Vec::new()));
        let table = read_for_counts(&mut input).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.get(PSEUDO_EOF), 0);
    }

    #[test]
    fn test_set_rejects_symbols_outside_alphabet() {
        let mut table = FrequencyTable::new();
        assert!(table.set(PSEUDO_EOF, 1).is_ok());
        assert!(matches!(
            table.set(PSEUDO_EOF + 1, 1),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(table.get(PSEUDO_EOF + 1), 0);
    }

    #[test]
    fn test_symbols_ascending() {
        let table = FrequencyTable::from_bytes(b"zza");
        let symbols: Vec<_> = table.symbols().collect();
        assert_eq!(
            symbols,
            vec![(b'a' as Symbol, 1), (b'z' as Symbol, 2), (PSEUDO_EOF, 1)]
        );
    }
}
