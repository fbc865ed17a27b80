use super::codes::CodeTable;
use super::tree::HuffNode;
use super::{Symbol, BITS_PER_WORD, PSEUDO_EOF};
use crate::bitstream::{BitInput, BitOutput};
use crate::error::{Error, Result};
use std::ptr;

/// Replaces every byte of `input` with its code, then appends the
/// end-of-stream code. Nothing follows the final codeword.
///
/// Returns the number of bytes encoded.
pub fn write_compressed_bits<I: BitInput, O: BitOutput>(
    codes: &CodeTable,
    input: &mut I,
    out: &mut O,
) -> Result<u64> {
    let eof = codes.get(PSEUDO_EOF).ok_or_else(|| {
        Error::Construction("code table has no end-of-stream code".to_string())
    })?;

    let mut count = 0u64;
    while let Some(byte) = input.read_bits(BITS_PER_WORD)? {
        let code = codes.get(byte as Symbol).ok_or_else(|| {
            Error::InvalidInput(format!("byte {:#04x} has no code", byte))
        })?;
        code.write_to(out)?;
        count += 1;
    }
    eof.write_to(out)?;
    Ok(count)
}

/// Walks the tree one bit at a time, writing each literal leaf reached and
/// stopping at the end-of-stream leaf.
///
/// Returns the number of bytes decoded.
pub fn read_compressed_bits<I: BitInput, O: BitOutput>(
    root: &HuffNode,
    input: &mut I,
    out: &mut O,
) -> Result<u64> {
    let mut count = 0u64;
    let mut current = root;
    loop {
        match current {
            HuffNode::Internal { left, right, .. } => {
                let bit = input.read_bits(1)?.ok_or_else(|| {
                    Error::TruncatedStream("input ended before the end-of-stream code".to_string())
                })?;
                current = if bit == 0 { left } else { right };
            }
            HuffNode::Leaf { symbol, .. } if *symbol == PSEUDO_EOF => return Ok(count),
            HuffNode::Leaf { symbol, .. } => {
                if ptr::eq(current, root) {
                    return Err(Error::MalformedHeader(format!(
                        "single-leaf tree holds literal {} instead of end-of-stream",
                        symbol
                    )));
                }
                out.write_bits(BITS_PER_WORD, u32::from(*symbol))?;
                count += 1;
                current = root;
            }
        }
    }
}
