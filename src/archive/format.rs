// src/archive/format.rs

//! The on-disk container layout: magic bytes, version, and the fixed
//! archive header.
//!
//! Every field up to the per-entry payload is a whole number of bytes and
//! the stream is byte-aligned at each field boundary, so the header reads
//! and writes as plain big-endian integers. Only the per-entry code bits
//! and payload are bit-granular.

use crate::symbol::SymbolWidth;
use crate::utils::error::{ArchiveError, Result};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// First four bytes of every archive.
pub const MAGIC: [u8; 4] = *b"HUFF";

/// Current container revision.
pub const FORMAT_VERSION: u8 = 1;

/// Upper bound (exclusive) for serialized entry-name lengths.
pub const MAX_NAME_LEN: usize = 4096;

/// The fixed 10-byte archive header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub width: SymbolWidth,
    pub entry_count: u32,
}

impl Header {
    /// Serializes the header onto a byte-aligned stream.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&MAGIC)?;
        writer.write_u8(FORMAT_VERSION)?;
        writer.write_u8(self.width.as_byte())?;
        writer.write_u32::<BigEndian>(self.entry_count)?;
        Ok(())
    }

    /// Reads and validates the header at the start of an archive.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(ArchiveError::BadMagic);
        }
        let version = reader.read_u8()?;
        if version != FORMAT_VERSION {
            return Err(ArchiveError::UnsupportedVersion(version));
        }
        let width_byte = reader.read_u8()?;
        let width = SymbolWidth::from_header_byte(width_byte)
            .ok_or(ArchiveError::InvalidSymbolWidth(width_byte))?;
        let entry_count = reader.read_u32::<BigEndian>()?;
        Ok(Self { width, entry_count })
    }
}

/// Checks the serialized name-length bounds shared by encoder and decoder.
pub fn check_name_len(len: usize) -> Result<()> {
    if len == 0 || len >= MAX_NAME_LEN {
        return Err(ArchiveError::InvalidNameLength(len));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn header_round_trips() {
        let header = Header {
            width: SymbolWidth::Two,
            entry_count: 7,
        };
        let mut bytes = Vec::new();
        header.write_to(&mut bytes).unwrap();
        assert_eq!(bytes, [0x48, 0x55, 0x46, 0x46, 0x01, 0x02, 0x00, 0x00, 0x00, 0x07]);
        assert_eq!(Header::read_from(&mut Cursor::new(bytes)).unwrap(), header);
    }

    #[test]
    fn foreign_magic_is_rejected() {
        let mut bytes = Cursor::new(b"HUFX\x01\x01\x00\x00\x00\x01".to_vec());
        assert!(matches!(Header::read_from(&mut bytes), Err(ArchiveError::BadMagic)));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut bytes = Cursor::new(b"HUFF\x02\x01\x00\x00\x00\x01".to_vec());
        assert!(matches!(
            Header::read_from(&mut bytes),
            Err(ArchiveError::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn bad_symbol_width_is_rejected() {
        let mut bytes = Cursor::new(b"HUFF\x01\x03\x00\x00\x00\x01".to_vec());
        assert!(matches!(
            Header::read_from(&mut bytes),
            Err(ArchiveError::InvalidSymbolWidth(3))
        ));
    }

    #[test]
    fn name_length_bounds() {
        assert!(check_name_len(0).is_err());
        assert!(check_name_len(1).is_ok());
        assert!(check_name_len(MAX_NAME_LEN - 1).is_ok());
        assert!(check_name_len(MAX_NAME_LEN).is_err());
    }
}
