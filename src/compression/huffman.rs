//! Huffman coding with a self-describing tree header.
//!
//! Compression makes two passes over its input. The first counts every byte,
//! the tree and code table are built from those counts, and the second pass
//! replaces each byte with its code. The output is, bit-packed with no
//! alignment in between:
//!
//! 1. the 32-bit identifier [`HUFF_TREE`]
//! 2. the tree shape in pre-order, see [`write_header`]
//! 3. the codes of the input bytes followed by the code of [`PSEUDO_EOF`]
//!
//! The decoder never sees frequencies. It rebuilds the tree from the header
//! and walks it bit by bit until it reaches the end-of-stream leaf.
//!
//! # Examples
//!
//! ```
//! use huffcodec::bitstream::{BitInputStream, BitOutputStream};
//! use huffcodec::compression::HuffProcessor;
//! use std::io::Cursor;
//!
//! let processor = HuffProcessor::new();
//!
//! let mut input = BitInputStream::new(Cursor::new(b"AAB".to_vec()));
//! let mut packed = BitOutputStream::new(Vec::new());
//! processor.compress_stream(&mut input, &mut packed).unwrap();
//!
//! let mut input = BitInputStream::new(Cursor::new(packed.into_inner()));
//! let mut restored = BitOutputStream::new(Vec::new());
//! processor.decompress_stream(&mut input, &mut restored).unwrap();
//! assert_eq!(restored.into_inner(), b"AAB");
//! ```

use crate::bitstream::{BitInput, BitInputStream, BitOutput, BitOutputStream};
use crate::compression::Compression;
use crate::error::Result;
use log::{debug, trace};
use std::io::Cursor;

mod codes;
mod frequency;
mod header;
mod stream;
mod tree;


pub use codes::{Code, CodeTable};
pub use frequency::{read_for_counts, FrequencyTable};
pub use header::{read_header, read_magic, write_header, write_magic};
pub use stream::{read_compressed_bits, write_compressed_bits};
pub use tree::{build_tree, HuffNode};

/// A byte value in `0..ALPH_SIZE`, or [`PSEUDO_EOF`].
pub type Symbol = u16;

pub const BITS_PER_WORD: u32 = 8;
pub const BITS_PER_INT: u32 = 32;
pub const ALPH_SIZE: usize = 1 << BITS_PER_WORD;
/// End-of-stream symbol, one past the last byte value.
pub const PSEUDO_EOF: Symbol = ALPH_SIZE as Symbol;

/// Identifier of the legacy count-based framing.
pub const HUFF_NUMBER: u32 = 0xface_8200;
/// Identifier of the tree-header framing written by this crate.
pub const HUFF_TREE: u32 = HUFF_NUMBER | 1;

/// Longest code, and deepest tree, the codec accepts.
pub const MAX_CODE_LEN: u32 = 128;

/// Log pass summaries.
pub const DEBUG_LOW: u32 = 1;
/// Also log every code.
pub const DEBUG_HIGH: u32 = 4;

/// Bit traffic of one compress or decompress call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecStats {
    /// Bits taken from the input, over both passes when compressing.
    pub bits_read: u64,
    /// Bits handed to the output, excluding the final byte padding.
    pub bits_written: u64,
}

/// Compresses and decompresses streams in the tree-header format.
#[derive(Debug, Clone, Copy, Default)]
pub struct HuffProcessor {
    debug_level: u32,
}

impl HuffProcessor {
    /// Create a processor that logs nothing
    pub fn new() -> Self {
        Self::with_debug(0)
    }

    /// Create a processor logging at `level`, see [`DEBUG_LOW`] and [`DEBUG_HIGH`]
    pub fn with_debug(level: u32) -> Self {
        HuffProcessor { debug_level: level }
    }

    pub fn debug_level(&self) -> u32 {
        self.debug_level
    }

    /// Compresses all of `input` into `out`.
    ///
    /// `input` is read twice and reset in between. `out` is closed whether or
    /// not compression succeeds. An empty input produces a tree holding only
    /// the end-of-stream leaf and no body bits.
    pub fn compress_stream<I: BitInput, O: BitOutput>(
        &self,
        input: &mut I,
        out: &mut O,
    ) -> Result<CodecStats> {
        let result = self.write_compressed(input, out);
        self.finish("compress", result, input, out)
    }

    /// Restores the bytes of a compressed stream into `out`.
    ///
    /// `out` is closed whether or not decompression succeeds; on failure its
    /// contents are not meaningful.
    pub fn decompress_stream<I: BitInput, O: BitOutput>(
        &self,
        input: &mut I,
        out: &mut O,
    ) -> Result<CodecStats> {
        let result = self.read_compressed(input, out);
        self.finish("decompress", result, input, out)
    }

    fn write_compressed<I: BitInput, O: BitOutput>(&self, input: &mut I, out: &mut O) -> Result<()> {
        let mut counts = read_for_counts(input)?;
        if counts.is_empty() {
            counts.insert_sentinel();
        }
        let root = build_tree(&counts)?;
        let codes = CodeTable::from_tree(&root)?;

        if self.debug_level >= DEBUG_LOW {
            debug!(
                "counted {} bytes over {} symbols, tree depth {}",
                counts.total() - counts.get(PSEUDO_EOF),
                counts.distinct(),
                root.depth()
            );
        }
        if self.debug_level >= DEBUG_HIGH {
            for (symbol, code) in codes.iter() {
                trace!("{:>3} {:>10} {}", symbol, counts.get(symbol), code);
            }
        }

        write_magic(out)?;
        write_header(&root, out)?;
        let header_bits = out.bits_written();

        input.reset()?;
        let encoded = write_compressed_bits(&codes, input, out)?;
        if self.debug_level >= DEBUG_LOW {
            debug!(
                "header {} bits, body {} bits for {} bytes",
                header_bits,
                out.bits_written() - header_bits,
                encoded
            );
        }
        Ok(())
    }

    fn read_compressed<I: BitInput, O: BitOutput>(&self, input: &mut I, out: &mut O) -> Result<()> {
        read_magic(input)?;
        let root = read_header(input)?;
        if self.debug_level >= DEBUG_LOW {
            debug!(
                "header holds {} leaves, depth {}",
                root.leaf_count(),
                root.depth()
            );
        }
        if self.debug_level >= DEBUG_HIGH {
            for (symbol, code) in CodeTable::from_tree(&root)?.iter() {
                trace!("{:>3} {}", symbol, code);
            }
        }

        let decoded = read_compressed_bits(&root, input, out)?;
        if self.debug_level >= DEBUG_LOW {
            debug!("decoded {} bytes", decoded);
        }
        Ok(())
    }

    /// Closes `out` and reports the first failure, the operation's before the close's.
    fn finish<I: BitInput, O: BitOutput>(
        &self,
        op: &str,
        result: Result<()>,
        input: &I,
        out: &mut O,
    ) -> Result<CodecStats> {
        let closed = out.close();
        result?;
        closed?;

        let stats = CodecStats {
            bits_read: input.bits_read(),
            bits_written: out.bits_written(),
        };
        if self.debug_level >= DEBUG_LOW {
            debug!(
                "{}: read {} bits, wrote {} bits",
                op, stats.bits_read, stats.bits_written
            );
        }
        Ok(stats)
    }
}

impl Compression for HuffProcessor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut input = BitInputStream::new(Cursor::new(data));
        let mut out = BitOutputStream::new(Vec::new());
        self.compress_stream(&mut input, &mut out)?;
        Ok(out.into_inner())
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut input = BitInputStream::new(Cursor::new(data));
        let mut out = BitOutputStream::new(Vec::with_capacity(data.len() * 2));
        self.decompress_stream(&mut input, &mut out)?;
        Ok(out.into_inner())
    }
}
