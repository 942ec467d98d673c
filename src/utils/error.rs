// src/utils/error.rs

use thiserror::Error;

/// The primary error type for all archive operations.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// An error occurred during I/O operations (read, write, seek, open,
    /// or directory creation).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input is not an archive (magic bytes mismatch).
    #[error("not a huffpack archive (magic bytes mismatch)")]
    BadMagic,

    /// The archive was produced by an unknown container revision.
    #[error("unsupported archive version {0}")]
    UnsupportedVersion(u8),

    /// The archive header declares a symbol width other than 1 or 2.
    #[error("invalid symbol width {0} in archive header")]
    InvalidSymbolWidth(u8),

    /// A serialized entry-name length is zero or exceeds the path limit.
    #[error("invalid entry name length {0}")]
    InvalidNameLength(usize),

    /// An entry name cannot be extracted safely (parent-directory
    /// segments, absolute paths, or bytes that do not form a name).
    #[error("unsafe entry name {0:?}")]
    UnsafeEntryName(String),

    /// A Huffman code exceeds the 64-bit code word.
    #[error("Huffman code length {0} exceeds 64 bits")]
    CodeTooLong(u32),

    /// A code table holds more entries than its 16-bit count field.
    #[error("code table with {0} entries cannot be serialized")]
    CodeTableOverflow(usize),

    /// A serialized code is a prefix or an extension of another code.
    #[error("code table entry for symbol {0} breaks the prefix property")]
    NonPrefixCode(u16),

    /// Two serialized codes resolve to the same position in the trie.
    #[error("duplicate code table entry for symbol {0}")]
    CodeCollision(u16),

    /// Payload decoding walked off the decoding trie.
    #[error("invalid code sequence in compressed payload")]
    InvalidCodeSequence,

    /// The bit stream ended before an entry's byte count was satisfied.
    #[error("unexpected end of archive data")]
    UnexpectedEof,
}

/// A specialized `Result` type for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;
