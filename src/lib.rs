//! A Huffman-coding archiver library.
//!
//! This crate packs files and whole directory trees into a single
//! self-describing archive and extracts all or a selected subset of the
//! contained entries. Each entry carries its own Huffman code table, built
//! from a full first pass over the input under an 8-bit or 16-bit symbol
//! alphabet, so decompression needs nothing beyond the archive itself.
//!
//! # Quick Start
//!
//! ```no_run
//! use huffpack::{extract_archive, write_archive, EntrySpec, ExtractSelection, SymbolWidth};
//! use std::path::Path;
//!
//! // Compress two files into one archive.
//! let entries = vec![
//!     EntrySpec { path: "data/a.txt".into(), name: "a.txt".into() },
//!     EntrySpec { path: "data/b.txt".into(), name: "b.txt".into() },
//! ];
//! write_archive(&entries, Path::new("out.hp"), SymbolWidth::One)?;
//!
//! // Later: extract only one of them.
//! let selection = ExtractSelection::Names(vec!["b.txt".into()]);
//! extract_archive(Path::new("out.hp"), Path::new("restored"), &selection)?;
//! # Ok::<(), huffpack::ArchiveError>(())
//! ```
//!
//! # Format
//!
//! The archive is a bit-exact wire contract: a fixed big-endian header,
//! then per-entry metadata, a serialized code table, and the compressed
//! bit payload, flushed to a byte boundary after every entry. See
//! [`archive::format`] for the layout constants.

// Core modules
pub mod archive;
pub mod bitstream;
pub mod huffman;
pub mod symbol;
pub mod utils;

// Public archiver API
pub use archive::decoder::{extract_archive, ExtractSelection, ExtractSummary};
pub use archive::encoder::{write_archive, EncodeSummary, EntrySpec};
pub use symbol::SymbolWidth;

// Error types
pub use utils::error::{ArchiveError, Result};

// Constants
pub const HUFFPACK_VERSION: &str = "0.2.0";
