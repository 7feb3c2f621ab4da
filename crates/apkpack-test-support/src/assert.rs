//! Assertion helpers for discovery results and produced archives.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use zip::ZipArchive;

/// Collect the base file names of `paths` into a sorted set.
#[must_use]
pub fn file_names(paths: &[PathBuf]) -> BTreeSet<String> {
    paths
        .iter()
        .filter_map(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect()
}

/// Read every entry of the archive at `path` into memory, keyed by entry name.
///
/// # Errors
///
/// Returns an error if the archive cannot be opened or an entry cannot be read.
pub fn read_archive(path: &Path) -> Result<BTreeMap<String, Vec<u8>>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut archive = ZipArchive::new(file).context("failed to decode archive")?;
    let mut entries = BTreeMap::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).context("failed to read entry")?;
        let mut contents = Vec::new();
        entry
            .read_to_end(&mut contents)
            .with_context(|| format!("failed to inflate {}", entry.name()))?;
        entries.insert(entry.name().to_string(), contents);
    }
    Ok(entries)
}

/// Compression method recorded for every entry of the archive at `path`.
///
/// # Errors
///
/// Returns an error if the archive cannot be opened or an entry cannot be read.
pub fn compression_methods(path: &Path) -> Result<Vec<zip::CompressionMethod>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut archive = ZipArchive::new(file).context("failed to decode archive")?;
    (0..archive.len())
        .map(|index| {
            archive
                .by_index(index)
                .map(|entry| entry.compression())
                .context("failed to read entry")
        })
        .collect()
}
