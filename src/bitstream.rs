// src/bitstream.rs

//! Byte-buffered, MSB-first bit streams over arbitrary readers and writers.
//!
//! The writer packs the first bit written into bit 7 of the first output
//! byte; the reader hands bits back in the same order. Multi-bit values
//! move through `write_bits`/`read_bits` high-order bit first, so a run of
//! whole bytes written at a byte-aligned position is identical to a
//! big-endian binary layout.

use crate::utils::error::{ArchiveError, Result};
use std::io::{Read, Write};

/// Writes individual bits into an underlying byte sink.
pub struct BitWriter<W: Write> {
    inner: W,
    acc: u8,
    /// Bits already packed into `acc`, in `[0, 8)`.
    pos: u8,
}

impl<W: Write> BitWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            acc: 0,
            pos: 0,
        }
    }

    /// Appends a single bit.
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        if bit {
            self.acc |= 1 << (7 - self.pos);
        }
        self.pos += 1;
        if self.pos == 8 {
            self.inner.write_all(&[self.acc])?;
            self.acc = 0;
            self.pos = 0;
        }
        Ok(())
    }

    /// Appends the low `count` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u64, count: u32) -> Result<()> {
        debug_assert!(count <= 64);
        for i in (0..count).rev() {
            self.write_bit((value >> i) & 1 != 0)?;
        }
        Ok(())
    }

    /// Flushes a partially filled byte, padding the tail with zero bits.
    ///
    /// A no-op when the stream is already byte-aligned, so the next write
    /// always starts on a byte boundary afterwards.
    pub fn flush(&mut self) -> Result<()> {
        if self.pos > 0 {
            self.inner.write_all(&[self.acc])?;
            self.acc = 0;
            self.pos = 0;
        }
        Ok(())
    }

    /// Flushes any pending bits and returns the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.flush()?;
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Reads individual bits from an underlying byte source.
pub struct BitReader<R: Read> {
    inner: R,
    acc: u8,
    /// Next bit of `acc` to hand out; 8 means the accumulator is empty.
    pos: u8,
}

impl<R: Read> BitReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            acc: 0,
            pos: 8,
        }
    }

    /// Reads one bit, or `None` at end of stream.
    pub fn read_bit(&mut self) -> Result<Option<bool>> {
        if self.pos == 8 {
            let mut byte = [0u8; 1];
            match self.inner.read_exact(&mut byte) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
                Err(e) => return Err(e.into()),
            }
            self.acc = byte[0];
            self.pos = 0;
        }
        let bit = (self.acc >> (7 - self.pos)) & 1;
        self.pos += 1;
        Ok(Some(bit != 0))
    }

    /// Reads `count` bits MSB-first into the low bits of the result.
    ///
    /// Fails with [`ArchiveError::UnexpectedEof`] if the stream ends
    /// before `count` bits arrive.
    pub fn read_bits(&mut self, count: u32) -> Result<u64> {
        debug_assert!(count <= 64);
        let mut value = 0u64;
        for _ in 0..count {
            let bit = self.read_bit()?.ok_or(ArchiveError::UnexpectedEof)?;
            value = (value << 1) | u64::from(bit);
        }
        Ok(value)
    }

    /// Discards the rest of a partially consumed byte, so the next
    /// `read_bit` starts on a byte boundary.
    pub fn align_to_byte(&mut self) {
        self.pos = 8;
    }
}
