//! Compression algorithms implementation.
//!
//! This module provides tree-header Huffman coding:
//! - Frequency counting over the byte alphabet plus an end-of-stream symbol
//! - Greedy prefix-tree construction with a fixed tie-break policy
//! - A self-delimiting tree header and a sentinel-terminated body
//!
//! # Examples
//!
//! ```rust
//! use huffcodec::compression::{Compression, HuffProcessor};
//!
//! let processor = HuffProcessor::new();
//! let packed = processor.compress(b"abracadabra").unwrap();
//! assert_eq!(processor.decompress(&packed).unwrap(), b"abracadabra");
//! ```

pub use crate::error::Result;

/// Trait for compression algorithms
pub trait Compression {
    /// Compress the input data
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompress the compressed data
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

pub mod huffman;
pub use huffman::{
    build_tree, read_for_counts, read_header, read_compressed_bits, write_compressed_bits,
    write_header, Code, CodeTable, CodecStats, FrequencyTable, HuffNode, HuffProcessor,
};
