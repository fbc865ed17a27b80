//! Bit-addressable input and output over byte streams.
//!
//! The codec never touches bytes directly. It reads and writes fixed-width,
//! MSB-first bit fields through the [`BitInput`] and [`BitOutput`] traits, which
//! lets the compressed header and body be packed back to back without any
//! alignment padding.
//!
//! Two implementations are provided:
//! - [`BitInputStream`] over any `Read + Seek` source (seeking makes `reset` possible)
//! - [`BitOutputStream`] over any `Write` sink
//!
//! # Examples
//!
//! ```
//! use huffcodec::bitstream::{BitInput, BitInputStream, BitOutput, BitOutputStream};
//! use std::io::Cursor;
//!
//! let mut out = BitOutputStream::new(Vec::new());
//! out.write_bits(3, 0b101).unwrap();
//! out.write_bits(9, 256).unwrap();
//! out.close().unwrap();
//!
//! let mut input = BitInputStream::new(Cursor::new(out.into_inner()));
//! assert_eq!(input.read_bits(3).unwrap(), Some(0b101));
//! assert_eq!(input.read_bits(9).unwrap(), Some(256));
//! ```

use crate::error::{Error, Result};
use bitvec::prelude::*;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};

/// Bytes pulled from the source per refill.
const CHUNK_BYTES: usize = 4096;

/// Buffered bits that trigger a flush to the sink.
const FLUSH_BITS: usize = 8 * 4096;

/// Widest field a single call may read or write.
pub const MAX_FIELD_BITS: u32 = 32;

/// A source of MSB-first bit fields.
pub trait BitInput {
    /// Reads an `n`-bit field, `n` in `1..=32`.
    ///
    /// Returns `Ok(None)` once fewer than `n` bits remain.
    fn read_bits(&mut self, n: u32) -> Result<Option<u32>>;

    /// Restarts the stream from its first bit.
    fn reset(&mut self) -> Result<()>;

    /// Total bits handed out since construction, across resets.
    fn bits_read(&self) -> u64;
}

/// A sink for MSB-first bit fields.
pub trait BitOutput {
    /// Writes the low `n` bits of `value`, `n` in `1..=32`.
    fn write_bits(&mut self, n: u32, value: u32) -> Result<()>;

    /// Pads the final partial byte with zeros and flushes. Calling it again is a no-op.
    fn close(&mut self) -> Result<()>;

    /// Total bits accepted since construction, excluding padding.
    fn bits_written(&self) -> u64;
}

fn check_width(n: u32) -> Result<()> {
    if n == 0 || n > MAX_FIELD_BITS {
        return Err(Error::InvalidInput(format!(
            "bit width {} outside 1..={}",
            n, MAX_FIELD_BITS
        )));
    }
    Ok(())
}

/// Reads bit fields from a seekable byte source.
#[derive(Debug)]
pub struct BitInputStream<R> {
    inner: R,
    /// Bits pulled from `inner` but not yet consumed start at `pos`.
    buffer: BitVec<u8, Msb0>,
    pos: usize,
    exhausted: bool,
    bits_read: u64,
}

impl<R: Read + Seek> BitInputStream<R> {
    /// Wraps a byte source positioned at its start.
    pub fn new(inner: R) -> Self {
        BitInputStream {
            inner,
            buffer: BitVec::new(),
            pos: 0,
            exhausted: false,
            bits_read: 0,
        }
    }

    /// Returns the wrapped source.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn available(&self) -> usize {
        self.buffer.len() - self.pos
    }

    /// Tops the buffer up until `needed` bits are available or the source ends.
    fn fill(&mut self, needed: usize) -> Result<()> {
        if self.pos > 0 {
            let mut rest = BitVec::<u8, Msb0>::with_capacity(self.available() + CHUNK_BYTES * 8);
            rest.extend_from_bitslice(&self.buffer[self.pos..]);
            self.buffer = rest;
            self.pos = 0;
        }

        let mut chunk = [0u8; CHUNK_BYTES];
        while self.buffer.len() < needed && !self.exhausted {
            match self.inner.read(&mut chunk) {
                Ok(0) => self.exhausted = true,
                Ok(k) => self.buffer.extend_from_raw_slice(&chunk[..k]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

impl<R: Read + Seek> BitInput for BitInputStream<R> {
    fn read_bits(&mut self, n: u32) -> Result<Option<u32>> {
        check_width(n)?;
        let width = n as usize;

        if self.available() < width {
            self.fill(width)?;
            if self.available() < width {
                return Ok(None);
            }
        }

        let value = self.buffer[self.pos..self.pos + width]
            .iter()
            .by_vals()
            .fold(0u32, |acc, bit| (acc << 1) | bit as u32);
        self.pos += width;
        self.bits_read += u64::from(n);
        Ok(Some(value))
    }

    fn reset(&mut self) -> Result<()> {
        self.inner.seek(SeekFrom::Start(0))?;
        self.buffer.clear();
        self.pos = 0;
        self.exhausted = false;
        Ok(())
    }

    fn bits_read(&self) -> u64 {
        self.bits_read
    }
}

/// Writes bit fields to a byte sink.
///
/// Bits are only guaranteed to reach the sink after [`BitOutput::close`].
#[derive(Debug)]
pub struct BitOutputStream<W: Write> {
    inner: W,
    buffer: BitVec<u8, Msb0>,
    bits_written: u64,
    closed: bool,
}

impl<W: Write> BitOutputStream<W> {
    /// Wraps a byte sink.
    pub fn new(inner: W) -> Self {
        BitOutputStream {
            inner,
            buffer: BitVec::with_capacity(FLUSH_BITS + MAX_FIELD_BITS as usize),
            bits_written: 0,
            closed: false,
        }
    }

    /// Borrows the wrapped sink.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Returns the wrapped sink. Unflushed bits are lost unless the stream was closed.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Writes every complete byte in the buffer and keeps the leftover bits.
    fn flush_whole_bytes(&mut self) -> Result<()> {
        let whole = self.buffer.len() / 8;
        if whole == 0 {
            return Ok(());
        }
        self.inner.write_all(&self.buffer.as_raw_slice()[..whole])?;

        let mut rest = BitVec::<u8, Msb0>::with_capacity(FLUSH_BITS + MAX_FIELD_BITS as usize);
        rest.extend_from_bitslice(&self.buffer[whole * 8..]);
        self.buffer = rest;
        Ok(())
    }
}

impl<W: Write> BitOutput for BitOutputStream<W> {
    fn write_bits(&mut self, n: u32, value: u32) -> Result<()> {
        check_width(n)?;
        if self.closed {
            return Err(Error::InvalidInput("write to a closed bit stream".to_string()));
        }
        if n < MAX_FIELD_BITS && value >> n != 0 {
            return Err(Error::InvalidInput(format!(
                "value {:#x} does not fit in {} bits",
                value, n
            )));
        }

        for shift in (0..n).rev() {
            self.buffer.push((value >> shift) & 1 == 1);
        }
        self.bits_written += u64::from(n);

        if self.buffer.len() >= FLUSH_BITS {
            self.flush_whole_bytes()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        while self.buffer.len() % 8 != 0 {
            self.buffer.push(false);
        }
        self.flush_whole_bytes()?;
        self.inner.flush()?;
        Ok(())
    }

    fn bits_written(&self) -> u64 {
        self.bits_written
    }
}
