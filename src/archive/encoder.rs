// src/archive/encoder.rs

//! Archive writing: per-entry frequency pass, code table serialization,
//! and the compressed payload.
//!
//! Each entry is encoded in two passes over its input: the first counts
//! symbol frequencies and builds the code table, the second re-reads the
//! file and emits one code per symbol. The bit stream is flushed to a byte
//! boundary after every entry, so each entry's metadata starts byte-aligned.

use crate::archive::format::{self, Header};
use crate::bitstream::BitWriter;
use crate::huffman::{self, CodeTable};
use crate::symbol::{SymbolReader, SymbolWidth};
use crate::utils::error::{ArchiveError, Result};
use log::{debug, info};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// One input scheduled for archiving: where to read it and the name it
/// carries inside the archive.
#[derive(Debug, Clone)]
pub struct EntrySpec {
    pub path: PathBuf,
    pub name: String,
}

/// Totals reported after a successful write, for the caller's statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeSummary {
    pub entries: u32,
    pub input_bytes: u64,
}

/// Compresses `entries` into a single archive at `output`.
///
/// Entries are written in the given order. If any step fails, the
/// partially written archive is removed; a file exists at `output`
/// afterwards only on success.
pub fn write_archive(
    entries: &[EntrySpec],
    output: &Path,
    width: SymbolWidth,
) -> Result<EncodeSummary> {
    let result = write_archive_inner(entries, output, width);
    if result.is_err() {
        // Never leave a truncated archive behind.
        let _ = fs::remove_file(output);
    }
    result
}

fn write_archive_inner(
    entries: &[EntrySpec],
    output: &Path,
    width: SymbolWidth,
) -> Result<EncodeSummary> {
    let mut sink = BufWriter::new(File::create(output)?);
    Header {
        width,
        entry_count: entries.len() as u32,
    }
    .write_to(&mut sink)?;

    let mut writer = BitWriter::new(sink);
    let mut summary = EncodeSummary {
        entries: entries.len() as u32,
        input_bytes: 0,
    };

    for (index, entry) in entries.iter().enumerate() {
        info!("archiving {}/{}: {}", index + 1, entries.len(), entry.name);
        summary.input_bytes += write_entry(&mut writer, entry, width)?;
        // Re-align so the next entry's metadata starts on a byte boundary.
        writer.flush()?;
    }

    writer.finish()?;
    Ok(summary)
}

/// Writes one entry (metadata, code table, payload) and returns its
/// original byte length.
fn write_entry<W: Write>(
    writer: &mut BitWriter<W>,
    entry: &EntrySpec,
    width: SymbolWidth,
) -> Result<u64> {
    let name = entry.name.as_bytes();
    format::check_name_len(name.len())?;

    let mut input = File::open(&entry.path)?;
    let len = input.metadata()?.len();

    writer.write_bits(name.len() as u64, 16)?;
    for &byte in name {
        writer.write_bits(u64::from(byte), 8)?;
    }
    writer.write_bits(len, 64)?;

    if len == 0 {
        // An empty file stores an empty code table and no payload.
        writer.write_bits(0, 16)?;
        debug!("{} is empty, stored without payload", entry.name);
        return Ok(0);
    }

    let freq = huffman::count_frequencies(BufReader::new(&mut input), len, width)?;
    let table = huffman::build_codes(&freq, width)?;
    input.seek(SeekFrom::Start(0))?;

    write_code_table(writer, &table, width)?;
    write_payload(writer, BufReader::new(input), len, width, &table)?;
    debug!("{}: {} bytes encoded", entry.name, len);
    Ok(len)
}

fn write_code_table<W: Write>(
    writer: &mut BitWriter<W>,
    table: &CodeTable,
    width: SymbolWidth,
) -> Result<()> {
    let count = table.assigned_count();
    if count > usize::from(u16::MAX) {
        // A 16-bit entry count cannot carry a full 65536-symbol alphabet.
        return Err(ArchiveError::CodeTableOverflow(count));
    }
    writer.write_bits(count as u64, 16)?;
    for (symbol, code) in table.assigned() {
        writer.write_bits(u64::from(symbol), width.bits())?;
        writer.write_bits(u64::from(code.len), 8)?;
        writer.write_bits(code.bits, code.len)?;
    }
    Ok(())
}

fn write_payload<W: Write, R: Read>(
    writer: &mut BitWriter<W>,
    input: R,
    len: u64,
    width: SymbolWidth,
    table: &CodeTable,
) -> Result<()> {
    let mut symbols = SymbolReader::new(input, len, width);
    while let Some((symbol, _)) = symbols.next_symbol()? {
        let code = table.get(symbol);
        // Both passes frame the input identically, so every symbol seen
        // here was counted and has a code.
        debug_assert!(code.len > 0);
        writer.write_bits(code.bits, code.len)?;
    }
    Ok(())
}
