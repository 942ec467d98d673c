// src/symbol.rs

//! Symbol framing: grouping the source byte stream into 8-bit or 16-bit
//! alphabet elements.
//!
//! Two-byte symbols are assembled big-endian (the first byte read is the
//! high byte). A file of odd length framed with two-byte symbols gets its
//! trailing half symbol completed with [`PADDING_BYTE`]; the decoder
//! suppresses that byte again, bounded by the entry's original length.

use crate::utils::error::Result;
use std::io::Read;

/// Value appended to complete a trailing half symbol.
pub const PADDING_BYTE: u8 = 0x00;

/// Number of bytes grouped into one alphabet element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolWidth {
    One,
    Two,
}

impl SymbolWidth {
    /// Parses the width byte stored in the archive header.
    pub fn from_header_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(SymbolWidth::One),
            2 => Some(SymbolWidth::Two),
            _ => None,
        }
    }

    /// The width in bytes, as stored in the archive header.
    pub fn as_byte(self) -> u8 {
        match self {
            SymbolWidth::One => 1,
            SymbolWidth::Two => 2,
        }
    }

    /// Number of distinct symbols under this width.
    pub fn alphabet_size(self) -> usize {
        1usize << (8 * self.as_byte() as u32)
    }

    /// Bit count of one serialized symbol in the code table.
    pub fn bits(self) -> u32 {
        8 * u32::from(self.as_byte())
    }
}

/// Streams fixed-width symbols out of a byte source of known length.
pub struct SymbolReader<R: Read> {
    inner: R,
    width: SymbolWidth,
    remaining: u64,
}

impl<R: Read> SymbolReader<R> {
    /// Frames `len` bytes of `inner` as symbols of the given width.
    pub fn new(inner: R, len: u64, width: SymbolWidth) -> Self {
        Self {
            inner,
            width,
            remaining: len,
        }
    }

    /// Returns the next symbol and the number of source bytes it covers,
    /// or `None` once the declared length is exhausted.
    ///
    /// A source that ends before the declared length fails with an I/O
    /// error; the caller's length measurement and the stream must agree.
    pub fn next_symbol(&mut self) -> Result<Option<(u16, u64)>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        let take = u64::from(self.width.as_byte()).min(self.remaining) as usize;
        let mut buf = [0u8; 2];
        self.inner.read_exact(&mut buf[..take])?;
        self.remaining -= take as u64;

        let symbol = match self.width {
            SymbolWidth::One => u16::from(buf[0]),
            SymbolWidth::Two if take == 2 => u16::from_be_bytes([buf[0], buf[1]]),
            SymbolWidth::Two => u16::from_be_bytes([buf[0], PADDING_BYTE]),
        };
        Ok(Some((symbol, take as u64)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn one_byte_symbols_pass_through() {
        let mut symbols = SymbolReader::new(Cursor::new(vec![0x41, 0x00, 0xFF]), 3, SymbolWidth::One);
        assert_eq!(symbols.next_symbol().unwrap(), Some((0x41, 1)));
        assert_eq!(symbols.next_symbol().unwrap(), Some((0x00, 1)));
        assert_eq!(symbols.next_symbol().unwrap(), Some((0xFF, 1)));
        assert_eq!(symbols.next_symbol().unwrap(), None);
    }

    #[test]
    fn two_byte_symbols_are_big_endian() {
        let mut symbols = SymbolReader::new(Cursor::new(vec![0x11, 0x22, 0x33, 0x44]), 4, SymbolWidth::Two);
        assert_eq!(symbols.next_symbol().unwrap(), Some((0x1122, 2)));
        assert_eq!(symbols.next_symbol().unwrap(), Some((0x3344, 2)));
        assert_eq!(symbols.next_symbol().unwrap(), None);
    }

    #[test]
    fn odd_length_pads_the_final_symbol() {
        let mut symbols = SymbolReader::new(Cursor::new(vec![0x11, 0x22, 0x33]), 3, SymbolWidth::Two);
        assert_eq!(symbols.next_symbol().unwrap(), Some((0x1122, 2)));
        assert_eq!(symbols.next_symbol().unwrap(), Some((0x3300, 1)));
        assert_eq!(symbols.next_symbol().unwrap(), None);
    }

    #[test]
    fn short_source_is_an_error() {
        let mut symbols = SymbolReader::new(Cursor::new(vec![0x11]), 4, SymbolWidth::Two);
        assert!(symbols.next_symbol().is_err());
    }
}
