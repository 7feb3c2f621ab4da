//! Scratch directories and sized package fixtures.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Bytes in one binary megabyte.
pub const MIB: u64 = 1_048_576;

const CHUNK_LEN: usize = 64 * 1024;

/// Create a fresh scratch directory that is removed on drop.
///
/// # Errors
///
/// Returns an error if the temporary directory cannot be created.
pub fn scratch_dir() -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix("apkpack-")
        .tempdir()
        .context("failed to create scratch directory")
}

/// Write `len` bytes of a deterministic pattern to `path`, creating parent directories.
///
/// The pattern is seeded from the file name so that two fixtures of equal size
/// still carry different contents.
///
/// # Errors
///
/// Returns an error if the parent directory or the file cannot be written.
pub fn write_sized_file(path: &Path, len: u64) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let seed = path.file_name().map_or(0u8, |name| {
        name.as_encoded_bytes()
            .iter()
            .fold(0u8, |acc, byte| acc.wrapping_add(*byte))
    });
    let chunk: Vec<u8> = (0..CHUNK_LEN)
        .map(|index| {
            let low = u8::try_from(index % 251).unwrap_or(0);
            low.wrapping_add(seed)
        })
        .collect();

    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let mut remaining = len;
    while remaining > 0 {
        let take = usize::try_from(remaining.min(CHUNK_LEN as u64)).unwrap_or(CHUNK_LEN);
        writer
            .write_all(&chunk[..take])
            .with_context(|| format!("failed to write {}", path.display()))?;
        remaining -= take as u64;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(path.to_path_buf())
}

/// Populate `root` with files described as `(relative path, size in bytes)`.
///
/// # Errors
///
/// Returns an error if any fixture cannot be written.
pub fn write_tree(root: &Path, files: &[(&str, u64)]) -> Result<Vec<PathBuf>> {
    files
        .iter()
        .map(|(relative, len)| write_sized_file(&root.join(relative), *len))
        .collect()
}

/// The reference layout: `app1.apk` (5 MB), `app2.xapk` (12 MB) and `notes.txt` (1 MB).
///
/// # Errors
///
/// Returns an error if any fixture cannot be written.
pub fn write_reference_tree(root: &Path) -> Result<Vec<PathBuf>> {
    write_tree(
        root,
        &[
            ("app1.apk", 5 * MIB),
            ("app2.xapk", 12 * MIB),
            ("notes.txt", MIB),
        ],
    )
}
