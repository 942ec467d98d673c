// src/utils/input.rs

//! Expansion of command-line inputs into (path, archive name) pairs.
//!
//! The core encoder never derives names itself; it consumes the pairs
//! produced here. A file found under a directory argument is named by its
//! path relative to that argument (the longest matching argument wins),
//! with `/` separators; a plain file argument is named by its base name.

use crate::archive::encoder::EntrySpec;
use crate::archive::format;
use crate::utils::error::{ArchiveError, Result};
use log::debug;
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Expands the command-line input paths into archive entries.
///
/// Directory arguments are walked recursively in sorted order, so the
/// entry order is stable across runs.
pub fn collect_entries(inputs: &[PathBuf]) -> Result<Vec<EntrySpec>> {
    let dir_roots: Vec<&Path> = inputs
        .iter()
        .filter(|path| path.is_dir())
        .map(PathBuf::as_path)
        .collect();

    let mut entries = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for item in WalkDir::new(input).sort_by_file_name() {
                let item = item.map_err(io::Error::from)?;
                if !item.file_type().is_file() {
                    if !item.file_type().is_dir() {
                        debug!("skipping non-regular file {}", item.path().display());
                    }
                    continue;
                }
                let name = name_for(item.path(), &dir_roots)?;
                entries.push(EntrySpec {
                    path: item.into_path(),
                    name,
                });
            }
        } else if input.is_file() {
            entries.push(EntrySpec {
                path: input.clone(),
                name: base_name(input)?,
            });
        } else {
            return Err(ArchiveError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such input: {}", input.display()),
            )));
        }
    }
    Ok(entries)
}

/// Names a walked file relative to the longest matching directory root.
fn name_for(path: &Path, roots: &[&Path]) -> Result<String> {
    let best = roots
        .iter()
        .filter_map(|root| {
            path.strip_prefix(root)
                .ok()
                .map(|rel| (root.as_os_str().len(), rel))
        })
        .max_by_key(|(root_len, _)| *root_len)
        .map(|(_, rel)| rel);

    match best {
        Some(rel) if !rel.as_os_str().is_empty() => archive_name(rel),
        _ => base_name(path),
    }
}

/// Serializes a relative path as a `/`-separated archive name.
fn archive_name(relative: &Path) -> Result<String> {
    let mut name = String::new();
    for component in relative.components() {
        let Component::Normal(part) = component else {
            return Err(ArchiveError::UnsafeEntryName(
                relative.to_string_lossy().into_owned(),
            ));
        };
        let Some(part) = part.to_str() else {
            return Err(ArchiveError::UnsafeEntryName(
                relative.to_string_lossy().into_owned(),
            ));
        };
        if !name.is_empty() {
            name.push('/');
        }
        name.push_str(part);
    }
    format::check_name_len(name.len())?;
    Ok(name)
}

fn base_name(path: &Path) -> Result<String> {
    match path.file_name().and_then(|name| name.to_str()) {
        Some(name) => {
            format::check_name_len(name.len())?;
            Ok(name.to_string())
        }
        None => Err(ArchiveError::UnsafeEntryName(
            path.to_string_lossy().into_owned(),
        )),
    }
}
