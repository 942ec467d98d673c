//! End-to-end round-trip coverage: everything written into an archive must
//! come back byte-identical, for both symbol widths and the degenerate
//! shapes the format calls out.

use huffpack::{extract_archive, write_archive, EntrySpec, ExtractSelection, SymbolWidth};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn round_trip(data: &[u8], width: SymbolWidth) -> Vec<u8> {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("input.bin");
    fs::write(&input, data).expect("Failed to write input");

    let archive = dir.path().join("archive.hp");
    let entries = vec![EntrySpec {
        path: input,
        name: "input.bin".to_string(),
    }];
    write_archive(&entries, &archive, width).expect("Failed to write archive");

    let out_dir = dir.path().join("out");
    extract_archive(&archive, &out_dir, &ExtractSelection::All).expect("Failed to extract");
    fs::read(out_dir.join("input.bin")).expect("Failed to read extracted file")
}

#[test]
fn empty_file_round_trips() {
    assert_eq!(round_trip(b"", SymbolWidth::One), b"");
    assert_eq!(round_trip(b"", SymbolWidth::Two), b"");
}

#[test]
fn single_byte_round_trips() {
    assert_eq!(round_trip(b"x", SymbolWidth::One), b"x");
    // One byte under two-byte symbols exercises the padded half symbol.
    assert_eq!(round_trip(b"x", SymbolWidth::Two), b"x");
}

#[test]
fn two_bytes_round_trip_wide() {
    assert_eq!(round_trip(b"xy", SymbolWidth::Two), b"xy");
}

#[test]
fn odd_length_round_trips_wide() {
    let data = [0x11, 0x22, 0x33];
    assert_eq!(round_trip(&data, SymbolWidth::Two), data);
}

#[test]
fn repeated_single_value_round_trips() {
    assert_eq!(round_trip(b"AAAA", SymbolWidth::One), b"AAAA");
    // Odd count of a single value: degenerate tree plus padding at once.
    let data = vec![0x7Fu8; 9];
    assert_eq!(round_trip(&data, SymbolWidth::Two), data);
}

#[test]
fn random_buffers_round_trip() {
    let mut rng = StdRng::seed_from_u64(0x48554646);
    for &len in &[1usize, 2, 3, 255, 1024, 4097] {
        let data: Vec<u8> = (0..len).map(|_| rng.random()).collect();
        assert_eq!(round_trip(&data, SymbolWidth::One), data, "len {len} W=1");
        assert_eq!(round_trip(&data, SymbolWidth::Two), data, "len {len} W=2");
    }
}

#[test]
fn skewed_data_compresses() {
    let mut data = vec![b'a'; 100_000];
    data.extend_from_slice(b"the quick brown fox");

    let dir = tempdir().unwrap();
    let input = dir.path().join("skewed.bin");
    fs::write(&input, &data).unwrap();
    let archive = dir.path().join("archive.hp");
    write_archive(
        &[EntrySpec {
            path: input,
            name: "skewed.bin".to_string(),
        }],
        &archive,
        SymbolWidth::One,
    )
    .unwrap();

    let archived = fs::metadata(&archive).unwrap().len();
    assert!(
        archived < data.len() as u64 / 2,
        "expected real compression, got {archived} bytes for {} input bytes",
        data.len()
    );
}

#[test]
fn encoding_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(7);
    let data: Vec<u8> = (0..4096).map(|_| rng.random_range(0..8u8) * 3).collect();

    let dir = tempdir().unwrap();
    let input = dir.path().join("input.bin");
    fs::write(&input, &data).unwrap();
    let entries = vec![EntrySpec {
        path: input,
        name: "input.bin".to_string(),
    }];

    let first = dir.path().join("first.hp");
    let second = dir.path().join("second.hp");
    write_archive(&entries, &first, SymbolWidth::One).unwrap();
    write_archive(&entries, &second, SymbolWidth::One).unwrap();
    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn multi_entry_archive_round_trips() {
    let dir = tempdir().unwrap();
    let contents: [(&str, &[u8]); 4] = [
        ("first.txt", b"some text with repeated letters eeeee"),
        ("second.bin", &[0xFF, 0x00, 0xFF, 0x00, 0x7E]),
        ("empty.dat", b""),
        ("nested/third.txt", b"deeper"),
    ];

    let mut entries = Vec::new();
    for (name, data) in contents {
        let path = dir.path().join(name.replace('/', "_"));
        fs::write(&path, data).unwrap();
        entries.push(EntrySpec {
            path,
            name: name.to_string(),
        });
    }

    let archive = dir.path().join("archive.hp");
    write_archive(&entries, &archive, SymbolWidth::One).unwrap();

    let out_dir = dir.path().join("out");
    let summary = extract_archive(&archive, &out_dir, &ExtractSelection::All).unwrap();
    assert_eq!(summary.entries, 4);
    assert_eq!(summary.extracted, 4);

    for (name, data) in contents {
        assert_eq!(
            fs::read(out_dir.join(Path::new(name))).unwrap(),
            data,
            "entry {name}"
        );
    }
}
