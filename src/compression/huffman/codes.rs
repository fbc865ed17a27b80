use super::tree::HuffNode;
use super::{Symbol, ALPH_SIZE, MAX_CODE_LEN};
use crate::bitstream::{BitOutput, MAX_FIELD_BITS};
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A codeword: the low `len` bits of `bits`, first bit most significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Code {
    bits: u128,
    len: u32,
}

impl Code {
    /// The zero-length code given to the root of a single-leaf tree.
    pub const EMPTY: Code = Code { bits: 0, len: 0 };

    pub fn bits(&self) -> u128 {
        self.bits
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends one bit, `true` for a right edge.
    fn push(self, bit: bool) -> Code {
        Code {
            bits: (self.bits << 1) | u128::from(bit),
            len: self.len + 1,
        }
    }

    /// True if `self` is a prefix of `other`, including equality.
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        if self.len == 0 {
            return true;
        }
        self.len <= other.len && other.bits >> (other.len - self.len) == self.bits
    }

    /// Emits the code in its original order, in fields of at most 32 bits.
    pub fn write_to<O: BitOutput>(&self, out: &mut O) -> Result<()> {
        let mut remaining = self.len;
        while remaining > 0 {
            let n = remaining.min(MAX_FIELD_BITS);
            remaining -= n;
            let chunk = ((self.bits >> remaining) & ((1u128 << n) - 1)) as u32;
            out.write_bits(n, chunk)?;
        }
        Ok(())
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for shift in (0..self.len).rev() {
            let bit = (self.bits >> shift) & 1;
            write!(f, "{}", bit)?;
        }
        Ok(())
    }
}

impl FromStr for Code {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.chars().try_fold(Code::EMPTY, |code, ch| {
            if code.len >= MAX_CODE_LEN {
                return Err(Error::InvalidInput(format!(
                    "code longer than {} bits",
                    MAX_CODE_LEN
                )));
            }
            match ch {
                '0' => Ok(code.push(false)),
                '1' => Ok(code.push(true)),
                other => Err(Error::InvalidInput(format!(
                    "unexpected character {:?} in code",
                    other
                ))),
            }
        })
    }
}

/// Codeword for every symbol that appears in a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: Vec<Option<Code>>,
}

impl CodeTable {
    /// Records the root-to-leaf path of every leaf, left = 0 and right = 1.
    ///
    /// A lone leaf root gets [`Code::EMPTY`].
    pub fn from_tree(root: &HuffNode) -> Result<Self> {
        let mut codes = vec![None; ALPH_SIZE + 1];
        collect_codes(root, Code::EMPTY, &mut codes)?;
        Ok(CodeTable { codes })
    }

    pub fn get(&self, symbol: Symbol) -> Option<Code> {
        self.codes.get(symbol as usize).copied().flatten()
    }

    /// Symbols and their codes in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.map(|code| (symbol as Symbol, code)))
    }

    /// Number of symbols with a code.
    pub fn len(&self) -> usize {
        self.codes.iter().filter(|code| code.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn collect_codes(node: &HuffNode, code: Code, codes: &mut [Option<Code>]) -> Result<()> {
    match node {
        HuffNode::Leaf { symbol, .. } => {
            let slot = codes.get_mut(*symbol as usize).ok_or_else(|| {
                Error::Construction(format!("leaf symbol {} outside the alphabet", symbol))
            })?;
            if slot.is_some() {
                return Err(Error::Construction(format!(
                    "symbol {} appears on more than one leaf",
                    symbol
                )));
            }
            *slot = Some(code);
        }
        HuffNode::Internal { left, right, .. } => {
            if code.len >= MAX_CODE_LEN {
                return Err(Error::Construction(format!(
                    "tree deeper than {} levels",
                    MAX_CODE_LEN
                )));
            }
            collect_codes(left, code.push(false), codes)?;
            collect_codes(right, code.push(true), codes)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::tree::build_tree;
    use super::super::{FrequencyTable, PSEUDO_EOF};
    use super::*;
    use crate::bitstream::{BitInput, BitInputStream, BitOutputStream};
    use std::io::Cursor;

    fn code(s: &str) -> Code {
        s.parse().unwrap()
    }

    #[test]
    fn test_two_a_one_b_codes() {
        let tree = build_tree(&FrequencyTable::from_bytes(&[0x41, 0x41, 0x42])).unwrap();
        let table = CodeTable::from_tree(&tree).unwrap();
        assert_eq!(table.get(0x41), Some(code("0")));
        assert_eq!(table.get(0x42), Some(code("10")));
        assert_eq!(table.get(PSEUDO_EOF), Some(code("11")));
        assert_eq!(table.get(0x43), None);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_every_leaf_gets_one_code() {
        let data = b"this is an example for huffman encoding";
        let tree = build_tree(&FrequencyTable::from_bytes(data)).unwrap();
        let table = CodeTable::from_tree(&tree).unwrap();
        assert_eq!(table.len(), tree.leaf_count());
        for &byte in data.iter() {
            assert!(table.get(byte as Symbol).is_some(), "missing code for {}", byte);
        }
    }

    #[test]
    fn test_lone_leaf_gets_empty_code() {
        let table = CodeTable::from_tree(&HuffNode::leaf(PSEUDO_EOF, 1)).unwrap();
        assert_eq!(table.get(PSEUDO_EOF), Some(Code::EMPTY));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_duplicate_leaf_is_rejected() {
        let tree = HuffNode::internal(HuffNode::leaf(7, 1), HuffNode::leaf(7, 1));
        assert!(matches!(
            CodeTable::from_tree(&tree),
            Err(Error::Construction(_))
        ));
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(code("0110").to_string(), "0110");
        assert_eq!(code("0110").len(), 4);
        assert_eq!(code("0110").bits(), 0b0110);
        assert_eq!(Code::EMPTY.to_string(), "");
        assert!("012".parse::<Code>().is_err());
    }

    #[test]
    fn test_prefix_relation() {
        assert!(code("01").is_prefix_of(&code("011")));
        assert!(code("011").is_prefix_of(&code("011")));
        assert!(!code("011").is_prefix_of(&code("01")));
        assert!(!code("10").is_prefix_of(&code("011")));
        assert!(Code::EMPTY.is_prefix_of(&code("1")));
    }

    #[test]
    fn test_long_code_written_in_order() {
        let text: String = (0..75).map(|i| if i % 3 == 0 { '1' } else { '0' }).collect();
        let long = code(&text);

        let mut out = BitOutputStream::new(Vec::new());
        long.write_to(&mut out).unwrap();
        out.close().unwrap();
        assert_eq!(out.bits_written(), 75);

        let mut input = BitInputStream::new(Cursor::new(out.into_inner()));
        let mut back = String::new();
        for _ in 0..75 {
            back.push(if input.read_bits(1).unwrap() == Some(1) { '1' } else { '0' });
        }
        assert_eq!(back, text);
    }
}
