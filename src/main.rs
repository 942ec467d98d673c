// src/main.rs

//! Command-line front end for the huffpack archiver.

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser};
use huffpack::utils::input;
use huffpack::{extract_archive, write_archive, ExtractSelection, SymbolWidth};
use humansize::{make_format, BINARY};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

/// Huffman-coding archiver: packs files and directory trees into a single
/// archive and extracts them again.
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    group = ArgGroup::new("mode").required(true).args(["compress", "decompress"])
)]
struct Cli {
    /// Compress the inputs into an archive.
    #[arg(short = 'c', long)]
    compress: bool,

    /// Decompress an archive.
    #[arg(short = 'd', long)]
    decompress: bool,

    /// Output archive file (compression) or directory (decompression,
    /// default: current directory).
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Symbol width in bytes used for compression.
    #[arg(
        short = 's',
        long = "symbol-size",
        default_value_t = 1,
        value_parser = clap::value_parser!(u8).range(1..=2)
    )]
    symbol_size: u8,

    /// Input files or directories (compression), or the archive followed
    /// by the entry names to extract (decompression; none extracts all).
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.compress {
        compress(&cli)
    } else {
        decompress(&cli)
    }
}

fn compress(cli: &Cli) -> Result<()> {
    let output = cli
        .output
        .as_deref()
        .context("compression requires -o <archive>")?;
    let width = SymbolWidth::from_header_byte(cli.symbol_size)
        .context("symbol size must be 1 or 2")?;

    let entries = input::collect_entries(&cli.inputs)?;
    if entries.is_empty() {
        bail!("no files found under the given inputs");
    }

    let summary = write_archive(&entries, output, width)
        .with_context(|| format!("failed to write {}", output.display()))?;

    let archive_len = fs::metadata(output)?.len();
    let format_size = make_format(BINARY);
    println!(
        "archived {} entries: {} in, {} out",
        summary.entries,
        format_size(summary.input_bytes),
        format_size(archive_len)
    );
    if summary.input_bytes > 0 {
        println!(
            "archive is {:.2}% of the original size",
            archive_len as f64 * 100.0 / summary.input_bytes as f64
        );
    }
    Ok(())
}

fn decompress(cli: &Cli) -> Result<()> {
    let archive = &cli.inputs[0];
    let wanted: Vec<String> = cli.inputs[1..]
        .iter()
        .map(|name| name.to_string_lossy().into_owned())
        .collect();
    let selection = if wanted.is_empty() {
        ExtractSelection::All
    } else {
        ExtractSelection::Names(wanted)
    };
    let output_dir = cli.output.clone().unwrap_or_else(|| PathBuf::from("."));

    let summary = extract_archive(archive, &output_dir, &selection)
        .with_context(|| format!("failed to extract {}", archive.display()))?;

    let format_size = make_format(BINARY);
    println!(
        "extracted {}/{} entries ({})",
        summary.extracted,
        summary.entries,
        format_size(summary.output_bytes)
    );
    Ok(())
}
