// src/archive/decoder.rs

//! Archive reading: decoding-trie reconstruction and symbol stream
//! recovery.
//!
//! Decompression is strictly sequential. Every entry is parsed bit-for-bit
//! whether or not it is selected for extraction; skipping the payload of an
//! unwanted entry would leave the stream misaligned for the entries that
//! follow. Any error once a payload has begun aborts the whole decode —
//! there is no resynchronization point inside the stream.

use crate::archive::format::{self, Header};
use crate::bitstream::BitReader;
use crate::huffman::MAX_CODE_LEN;
use crate::symbol::SymbolWidth;
use crate::utils::error::{ArchiveError, Result};
use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Selects which entries an extraction writes to disk.
///
/// Non-selected entries are still parsed and their payloads consumed, so
/// the archive-level walk always covers the whole stream.
#[derive(Debug, Clone)]
pub enum ExtractSelection {
    /// Write every entry.
    All,
    /// Write only entries whose archive name matches exactly.
    Names(Vec<String>),
}

impl ExtractSelection {
    fn wants(&self, name: &str) -> bool {
        match self {
            ExtractSelection::All => true,
            ExtractSelection::Names(names) => names.iter().any(|n| n == name),
        }
    }
}

/// Totals reported after a successful extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractSummary {
    pub entries: u32,
    pub extracted: u32,
    pub output_bytes: u64,
}

/// Extracts `archive` into `output_dir`.
///
/// The output directory is created if missing; existing files are
/// overwritten. An entry whose output file cannot be opened is parsed but
/// not written, which is reported and does not disturb the entries that
/// follow.
pub fn extract_archive(
    archive: &Path,
    output_dir: &Path,
    selection: &ExtractSelection,
) -> Result<ExtractSummary> {
    let mut source = BufReader::new(File::open(archive)?);
    let header = Header::read_from(&mut source)?;
    info!(
        "archive holds {} entries, symbol width {}",
        header.entry_count,
        header.width.as_byte()
    );

    fs::create_dir_all(output_dir)?;

    let mut reader = BitReader::new(source);
    let mut summary = ExtractSummary {
        entries: header.entry_count,
        ..Default::default()
    };

    for index in 0..header.entry_count {
        let meta = read_entry_meta(&mut reader, header.width)?;
        info!(
            "entry {}/{}: {} ({} bytes)",
            index + 1,
            header.entry_count,
            meta.name,
            meta.original_len
        );

        let mut output = if selection.wants(&meta.name) {
            open_entry_output(output_dir, &meta.name)?
        } else {
            debug!("skipping {}", meta.name);
            None
        };

        let written = decode_entry(&mut reader, &meta, header.width, output.as_mut())?;
        if let Some(mut sink) = output.take() {
            sink.flush()?;
            summary.extracted += 1;
            summary.output_bytes += written;
        }
        // Entry payloads are padded to a byte boundary; drop the padding
        // bits before the next entry's metadata.
        reader.align_to_byte();
    }

    Ok(summary)
}

/// Per-entry metadata parsed ahead of the payload.
struct EntryMeta {
    name: String,
    original_len: u64,
    trie: DecodeTrie,
}

fn read_entry_meta<R: Read>(reader: &mut BitReader<R>, width: SymbolWidth) -> Result<EntryMeta> {
    let name_len = reader.read_bits(16)? as usize;
    format::check_name_len(name_len)?;

    let mut raw = Vec::with_capacity(name_len);
    for _ in 0..name_len {
        raw.push(reader.read_bits(8)? as u8);
    }
    let name = String::from_utf8(raw)
        .map_err(|e| ArchiveError::UnsafeEntryName(String::from_utf8_lossy(e.as_bytes()).into_owned()))?;

    let original_len = reader.read_bits(64)?;
    let table_entries = reader.read_bits(16)? as usize;

    let mut trie = DecodeTrie::new();
    for _ in 0..table_entries {
        let symbol = reader.read_bits(width.bits())? as u16;
        let code_len = reader.read_bits(8)? as u32;
        if code_len > MAX_CODE_LEN {
            return Err(ArchiveError::CodeTooLong(code_len));
        }
        let code = if code_len > 0 {
            reader.read_bits(code_len)?
        } else {
            0
        };
        trie.insert(symbol, code, code_len)?;
    }

    Ok(EntryMeta {
        name,
        original_len,
        trie,
    })
}

/// Opens the output file for a selected entry, or `None` when the entry
/// must degrade to parse-only because the file cannot be created.
fn open_entry_output(output_dir: &Path, name: &str) -> Result<Option<BufWriter<File>>> {
    let path = entry_output_path(output_dir, name)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    match File::create(&path) {
        Ok(file) => {
            debug!("extracting to {}", path.display());
            Ok(Some(BufWriter::new(file)))
        }
        Err(err) => {
            // Keep parsing so the stream stays aligned for the entries
            // that follow.
            warn!(
                "cannot open {} for writing, entry parsed but not extracted: {}",
                path.display(),
                err
            );
            Ok(None)
        }
    }
}

/// Joins an entry name under the output directory, rejecting names that
/// could land outside it.
fn entry_output_path(output_dir: &Path, name: &str) -> Result<PathBuf> {
    if name.starts_with('/') || name.contains('\\') || name.contains('\0') {
        return Err(ArchiveError::UnsafeEntryName(name.to_string()));
    }
    let mut path = output_dir.to_path_buf();
    for part in name.split('/') {
        if part.is_empty() || part == "." || part == ".." {
            return Err(ArchiveError::UnsafeEntryName(name.to_string()));
        }
        path.push(part);
    }
    Ok(path)
}

/// Decodes one entry's payload, writing original bytes when `output` is
/// present and only counting them otherwise. Returns the bytes emitted.
fn decode_entry<R: Read, W: Write>(
    reader: &mut BitReader<R>,
    meta: &EntryMeta,
    width: SymbolWidth,
    mut output: Option<&mut W>,
) -> Result<u64> {
    let mut emitted = 0u64;
    while emitted < meta.original_len {
        let symbol = meta.trie.decode_symbol(reader)?;
        match width {
            SymbolWidth::One => {
                if let Some(out) = output.as_mut() {
                    out.write_all(&[symbol as u8])?;
                }
                emitted += 1;
            }
            SymbolWidth::Two => {
                for &byte in &symbol.to_be_bytes() {
                    if emitted == meta.original_len {
                        // The low byte of the final symbol is framing
                        // padding when the original length is odd.
                        break;
                    }
                    if let Some(out) = output.as_mut() {
                        out.write_all(&[byte])?;
                    }
                    emitted += 1;
                }
            }
        }
    }
    Ok(emitted)
}

/// Binary decoding trie over an index arena.
///
/// Nodes are appended on insertion and children index into the same
/// vector, so teardown is one deallocation and traversal never recurses
/// even for 64-level codes.
struct DecodeTrie {
    nodes: Vec<TrieNode>,
}

#[derive(Default, Clone)]
struct TrieNode {
    children: [Option<u32>; 2],
    symbol: Option<u16>,
}

impl DecodeTrie {
    fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
        }
    }

    /// Inserts a (code, symbol) pair, descending left on 0 and right on 1
    /// with bits consumed MSB-first from `code`.
    fn insert(&mut self, symbol: u16, code: u64, len: u32) -> Result<()> {
        if len > MAX_CODE_LEN {
            return Err(ArchiveError::CodeTooLong(len));
        }
        if len == 0 {
            // Legal only as the lone entry of a degenerate table: the
            // root itself becomes the leaf.
            let root = &mut self.nodes[0];
            if root.symbol.is_some() {
                return Err(ArchiveError::CodeCollision(symbol));
            }
            if root.children.iter().any(Option::is_some) {
                return Err(ArchiveError::NonPrefixCode(symbol));
            }
            root.symbol = Some(symbol);
            return Ok(());
        }

        let mut index = 0usize;
        for i in (0..len).rev() {
            if self.nodes[index].symbol.is_some() {
                // An ancestor is already a leaf: this code extends a
                // shorter one.
                return Err(ArchiveError::NonPrefixCode(symbol));
            }
            let bit = ((code >> i) & 1) as usize;
            index = match self.nodes[index].children[bit] {
                Some(child) => child as usize,
                None => {
                    let child = self.nodes.len() as u32;
                    self.nodes.push(TrieNode::default());
                    self.nodes[index].children[bit] = Some(child);
                    child as usize
                }
            };
        }

        let node = &mut self.nodes[index];
        if node.symbol.is_some() {
            return Err(ArchiveError::CodeCollision(symbol));
        }
        if node.children.iter().any(Option::is_some) {
            // This code is a prefix of an already inserted longer code.
            return Err(ArchiveError::NonPrefixCode(symbol));
        }
        node.symbol = Some(symbol);
        Ok(())
    }

    /// Walks one code word off the bit stream and returns its symbol.
    fn decode_symbol<R: Read>(&self, reader: &mut BitReader<R>) -> Result<u16> {
        let mut index = 0usize;
        loop {
            if let Some(symbol) = self.nodes[index].symbol {
                return Ok(symbol);
            }
            let bit = reader.read_bit()?.ok_or(ArchiveError::UnexpectedEof)?;
            index = match self.nodes[index].children[usize::from(bit)] {
                Some(child) => child as usize,
                None => return Err(ArchiveError::InvalidCodeSequence),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn trie_rejects_code_extending_a_leaf() {
        let mut trie = DecodeTrie::new();
        trie.insert(b'A' as u16, 0b0, 1).unwrap();
        assert!(matches!(
            trie.insert(b'B' as u16, 0b01, 2),
            Err(ArchiveError::NonPrefixCode(_))
        ));
    }

    #[test]
    fn trie_rejects_code_prefixing_a_longer_one() {
        let mut trie = DecodeTrie::new();
        trie.insert(b'A' as u16, 0b01, 2).unwrap();
        assert!(matches!(
            trie.insert(b'B' as u16, 0b0, 1),
            Err(ArchiveError::NonPrefixCode(_))
        ));
    }

    #[test]
    fn trie_rejects_duplicate_codes() {
        let mut trie = DecodeTrie::new();
        trie.insert(b'A' as u16, 0b1, 1).unwrap();
        assert!(matches!(
            trie.insert(b'B' as u16, 0b1, 1),
            Err(ArchiveError::CodeCollision(_))
        ));
    }

    #[test]
    fn zero_length_code_claims_an_empty_trie_only() {
        let mut trie = DecodeTrie::new();
        trie.insert(b'A' as u16, 0, 0).unwrap();
        assert!(trie.insert(b'B' as u16, 0, 0).is_err());

        let mut trie = DecodeTrie::new();
        trie.insert(b'A' as u16, 0b0, 1).unwrap();
        assert!(matches!(
            trie.insert(b'B' as u16, 0, 0),
            Err(ArchiveError::NonPrefixCode(_))
        ));
    }

    #[test]
    fn decode_walks_to_the_labelled_leaf() {
        let mut trie = DecodeTrie::new();
        trie.insert(b'A' as u16, 0b0, 1).unwrap();
        trie.insert(b'B' as u16, 0b10, 2).unwrap();
        trie.insert(b'C' as u16, 0b11, 2).unwrap();

        // Bits 0 10 11, padded: 0b01011_000.
        let mut reader = BitReader::new(Cursor::new(vec![0b0101_1000]));
        assert_eq!(trie.decode_symbol(&mut reader).unwrap(), b'A' as u16);
        assert_eq!(trie.decode_symbol(&mut reader).unwrap(), b'B' as u16);
        assert_eq!(trie.decode_symbol(&mut reader).unwrap(), b'C' as u16);
    }

    #[test]
    fn missing_child_is_an_invalid_sequence() {
        let mut trie = DecodeTrie::new();
        trie.insert(b'A' as u16, 0b00, 2).unwrap();
        let mut reader = BitReader::new(Cursor::new(vec![0b0100_0000]));
        assert!(matches!(
            trie.decode_symbol(&mut reader),
            Err(ArchiveError::InvalidCodeSequence)
        ));
    }

    #[test]
    fn built_codes_always_insert_cleanly() {
        use crate::huffman;

        // Pseudo-random frequency tables; the builder's output must always
        // be a prefix code, observable as conflict-free trie insertion.
        let mut state = 0x2545_F491_4F6C_DD1Du64;
        for round in 0u64..16 {
            let mut freq = vec![0u64; SymbolWidth::One.alphabet_size()];
            for slot in freq.iter_mut() {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                if state % (round + 2) == 0 {
                    *slot = state % 1000;
                }
            }
            let table = huffman::build_codes(&freq, SymbolWidth::One).unwrap();
            let mut trie = DecodeTrie::new();
            for (symbol, code) in table.assigned() {
                trie.insert(symbol, code.bits, code.len).unwrap();
            }
        }
    }

    #[test]
    fn unsafe_names_are_rejected() {
        let dir = Path::new("/tmp/out");
        assert!(entry_output_path(dir, "ok/name.txt").is_ok());
        for name in ["../evil", "a/../../evil", "/etc/passwd", "a//b", "a/./b", "ends/"] {
            assert!(
                matches!(
                    entry_output_path(dir, name),
                    Err(ArchiveError::UnsafeEntryName(_))
                ),
                "{name} should be rejected"
            );
        }
    }
}
