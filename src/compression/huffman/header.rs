use super::tree::HuffNode;
use super::{
    Symbol, ALPH_SIZE, BITS_PER_INT, BITS_PER_WORD, HUFF_NUMBER, HUFF_TREE, MAX_CODE_LEN,
    PSEUDO_EOF,
};
use crate::bitstream::{BitInput, BitOutput};
use crate::error::{Error, Result};

/// Width of a leaf symbol field: one more than a byte so the sentinel fits.
const SYMBOL_BITS: u32 = BITS_PER_WORD + 1;

/// Writes the 32-bit format identifier.
pub fn write_magic<O: BitOutput>(out: &mut O) -> Result<()> {
    out.write_bits(BITS_PER_INT, HUFF_TREE)
}

/// Reads the format identifier and rejects anything but [`HUFF_TREE`].
pub fn read_magic<I: BitInput>(input: &mut I) -> Result<()> {
    match input.read_bits(BITS_PER_INT)? {
        Some(HUFF_TREE) => Ok(()),
        Some(HUFF_NUMBER) => Err(Error::MalformedHeader(
            "legacy count-based header is not supported".to_string(),
        )),
        Some(other) => Err(Error::MalformedHeader(format!(
            "illegal header starts with {:#010x}",
            other
        ))),
        None => Err(Error::MalformedHeader(
            "input too short for the format identifier".to_string(),
        )),
    }
}

/// Serializes the tree shape in pre-order.
///
/// An internal node is a single `0` followed by its left then right subtree.
/// A leaf is a `1` followed by its symbol in 9 bits.
pub fn write_header<O: BitOutput>(root: &HuffNode, out: &mut O) -> Result<()> {
    match root {
        HuffNode::Internal { left, right, .. } => {
            out.write_bits(1, 0)?;
            write_header(left, out)?;
            write_header(right, out)
        }
        HuffNode::Leaf { symbol, .. } => {
            out.write_bits(1, 1)?;
            out.write_bits(SYMBOL_BITS, u32::from(*symbol))
        }
    }
}

/// Rebuilds a tree written by [`write_header`]. Weights come back as zero.
///
/// Besides running out of input, the header is rejected when a leaf symbol is
/// outside the alphabet or repeated, when nesting exceeds [`MAX_CODE_LEN`], or
/// when no leaf holds the end-of-stream symbol.
pub fn read_header<I: BitInput>(input: &mut I) -> Result<HuffNode> {
    let mut seen = vec![false; ALPH_SIZE + 1];
    let root = read_node(input, 0, &mut seen)?;
    if !seen[PSEUDO_EOF as usize] {
        return Err(Error::MalformedHeader(
            "tree has no end-of-stream leaf".to_string(),
        ));
    }
    Ok(root)
}

fn read_node<I: BitInput>(input: &mut I, depth: u32, seen: &mut [bool]) -> Result<HuffNode> {
    let flag = input.read_bits(1)?.ok_or_else(|| {
        Error::MalformedHeader("input ended inside the tree header".to_string())
    })?;

    if flag == 0 {
        if depth >= MAX_CODE_LEN {
            return Err(Error::MalformedHeader(format!(
                "tree nested deeper than {} levels",
                MAX_CODE_LEN
            )));
        }
        let left = read_node(input, depth + 1, seen)?;
        let right = read_node(input, depth + 1, seen)?;
        return Ok(HuffNode::internal(left, right));
    }

    let value = input.read_bits(SYMBOL_BITS)?.ok_or_else(|| {
        Error::MalformedHeader("input ended inside a leaf symbol".to_string())
    })? as usize;
    let slot = seen.get_mut(value).ok_or_else(|| {
        Error::MalformedHeader(format!("leaf symbol {} outside the alphabet", value))
    })?;
    if *slot {
        return Err(Error::MalformedHeader(format!(
            "symbol {} appears on more than one leaf",
            value
        )));
    }
    *slot = true;
    Ok(HuffNode::leaf(value as Symbol, 0))
}

#[cfg(test)]
mod tests {
    use super::super::tree::build_tree;
    use super::super::FrequencyTable;
    use super::*;
    use crate::bitstream::{BitInputStream, BitOutputStream};
    use std::io::Cursor;

    fn bits(fields: &[(u32, u32)]) -> BitInputStream<Cursor<Vec<u8>>> {
        let mut out = BitOutputStream::new(Vec::new());
        for &(n, value) in fields {
            out.write_bits(n, value).unwrap();
        }
        out.close().unwrap();
        BitInputStream::new(Cursor::new(out.into_inner()))
    }

    fn header_bytes(root: &HuffNode) -> Vec<u8> {
        let mut out = BitOutputStream::new(Vec::new());
        write_header(root, &mut out).unwrap();
        out.close().unwrap();
        out.into_inner()
    }

    #[test]
    fn test_hand_built_header_matches_builder() {
        let mut input = bits(&[(1, 0), (1, 1), (9, 0x41), (1, 1), (9, PSEUDO_EOF as u32)]);
        let tree = read_header(&mut input).unwrap();

        for k in [1, 3, 50] {
            let mut table = FrequencyTable::new();
            table.set(0x41, k).unwrap();
            table.insert_sentinel();
            assert!(tree.same_shape(&build_tree(&table).unwrap()));
        }
    }

    #[test]
    fn test_exact_header_bits() {
        let tree = build_tree(&FrequencyTable::from_bytes(&[0x41, 0x41, 0x42])).unwrap();
        // 0 1:041 0 1:042 1:100
        assert_eq!(header_bytes(&tree), vec![0x48, 0x29, 0x0b, 0x00]);
    }

    #[test]
    fn test_header_is_idempotent() {
        let data = b"mississippi river banks";
        let first = build_tree(&FrequencyTable::from_bytes(data)).unwrap();
        let second = build_tree(&FrequencyTable::from_bytes(data)).unwrap();
        assert_eq!(header_bytes(&first), header_bytes(&second));
    }

    #[test]
    fn test_read_back_written_tree() {
        let data: Vec<u8> = (0..=255u8).flat_map(|b| vec![b; (b % 7) as usize + 1]).collect();
        let tree = build_tree(&FrequencyTable::from_bytes(&data)).unwrap();
        let mut input = BitInputStream::new(Cursor::new(header_bytes(&tree)));
        let back = read_header(&mut input).unwrap();
        assert!(back.same_shape(&tree));
        assert_eq!(back.weight(), 0);
    }

    #[test]
    fn test_lone_sentinel_leaf() {
        let mut input = bits(&[(1, 1), (9, PSEUDO_EOF as u32)]);
        let tree = read_header(&mut input).unwrap();
        assert_eq!(tree, HuffNode::leaf(PSEUDO_EOF, 0));
    }

    #[test]
    fn test_truncated_header() {
        let mut input = bits(&[(1, 0), (1, 1), (9, 0x41)]);
        // Padding zeros read as internal nodes, then input runs out.
        assert!(matches!(
            read_header(&mut input),
            Err(Error::MalformedHeader(_))
        ));

        let mut empty = BitInputStream::new(Cursor::new(Vec::new()));
        assert!(matches!(
            read_header(&mut empty),
            Err(Error::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_symbol_outside_alphabet() {
        let mut input = bits(&[(1, 0), (1, 1), (9, 300), (1, 1), (9, PSEUDO_EOF as u32)]);
        let err = read_header(&mut input).unwrap_err();
        assert!(err.to_string().contains("outside the alphabet"));
    }

    #[test]
    fn test_duplicate_symbol() {
        let mut input = bits(&[
            (1, 0),
            (1, 1),
            (9, PSEUDO_EOF as u32),
            (1, 1),
            (9, PSEUDO_EOF as u32),
        ]);
        let err = read_header(&mut input).unwrap_err();
        assert!(err.to_string().contains("more than one leaf"));
    }

    #[test]
    fn test_missing_sentinel() {
        let mut input = bits(&[(1, 0), (1, 1), (9, 0x41), (1, 1), (9, 0x42)]);
        let err = read_header(&mut input).unwrap_err();
        assert!(err.to_string().contains("no end-of-stream leaf"));
    }

    #[test]
    fn test_nesting_limit() {
        let mut input = BitInputStream::new(Cursor::new(vec![0u8; 64]));
        let err = read_header(&mut input).unwrap_err();
        assert!(err.to_string().contains("nested deeper"));
    }

    #[test]
    fn test_magic() {
        let mut out = BitOutputStream::new(Vec::new());
        write_magic(&mut out).unwrap();
        out.close().unwrap();
        assert_eq!(out.get_ref(), &vec![0xfa, 0xce, 0x82, 0x01]);

        let mut good = BitInputStream::new(Cursor::new(out.into_inner()));
        assert!(read_magic(&mut good).is_ok());

        let mut legacy = bits(&[(32, HUFF_NUMBER)]);
        let err = read_magic(&mut legacy).unwrap_err();
        assert!(err.to_string().contains("legacy"));

        let mut wrong = bits(&[(32, 0xdead_beef)]);
        let err = read_magic(&mut wrong).unwrap_err();
        assert!(err.to_string().contains("0xdeadbeef"));

        let mut short = bits(&[(8, 0xfa)]);
        assert!(matches!(
            read_magic(&mut short),
            Err(Error::MalformedHeader(_))
        ));
    }
}
