//! Bundling matched packages into a single deflate-compressed zip archive.
//!
//! # Design
//! - Entries are named by base filename; when two sources share a base name the
//!   later one wins and the earlier one is reported as shadowed.
//! - The output may not be one of the sources; this is checked before the
//!   output is created.
//! - The archive is finished, flushed and synced before any source is removed.
//! - A failed write removes the partial archive and never deletes sources.
//! - Deletion covers every requested source, shadowed ones included. It is
//!   best-effort and reported per file.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{ArchiveFailure, FsOpsError, FsOpsResult, SourceDeletionWarning};
use crate::model::{ArchiveReport, ArchiveRequest};

// Entries at or above this size need the zip64 extension.
const ZIP64_THRESHOLD: u64 = 0xFFFF_FFFF;

struct PlannedEntry<'a> {
    name: String,
    source: &'a Path,
}

struct EntryPlan<'a> {
    entries: Vec<PlannedEntry<'a>>,
    shadowed: Vec<PathBuf>,
}

/// Write every source of `request` into its archive and optionally remove the sources.
///
/// # Errors
///
/// - [`FsOpsError::EmptyInput`] when the request has no sources; nothing is written.
/// - [`FsOpsError::ArchiveCreation`] when the output path is also a source, or
///   when any step of writing the archive fails; the partial archive is
///   removed and no source is deleted.
pub fn create_archive(request: &ArchiveRequest) -> FsOpsResult<ArchiveReport> {
    let output = request.output_path();
    if request.source_paths().is_empty() {
        return Err(FsOpsError::EmptyInput);
    }
    ensure_output_is_not_a_source(output, request.source_paths())
        .map_err(|cause| FsOpsError::archive(output, cause))?;

    let plan = plan_entries(request.source_paths())
        .map_err(|cause| FsOpsError::archive(output, cause))?;
    for shadowed in &plan.shadowed {
        warn!(
            path = %shadowed.display(),
            "source shares its base name with a later source; entry skipped"
        );
    }

    let bytes_archived = match write_archive(output, &plan.entries) {
        Ok(bytes) => bytes,
        Err(cause) => {
            discard_partial(output);
            return Err(FsOpsError::archive(output, cause));
        }
    };
    info!(
        output = %output.display(),
        entries = plan.entries.len(),
        bytes_archived,
        "archive written"
    );

    let EntryPlan { entries, shadowed } = plan;
    let mut report = ArchiveReport {
        output_path: output.to_path_buf(),
        entries: entries.iter().map(|entry| entry.name.clone()).collect(),
        bytes_archived,
        shadowed,
        ..ArchiveReport::default()
    };
    if request.delete_originals_on_success() {
        remove_sources(request.source_paths(), &mut report);
    }
    Ok(report)
}

fn ensure_output_is_not_a_source(output: &Path, sources: &[PathBuf]) -> Result<(), ArchiveFailure> {
    let absolute =
        std::path::absolute(output).map_err(|err| ArchiveFailure::io("resolve_output", output, err))?;
    // An existing output can also alias a source through links or `..` components.
    let canonical = fs::canonicalize(output).ok();
    for source in sources {
        let same_path = std::path::absolute(source).is_ok_and(|path| path == absolute);
        let same_file = canonical
            .as_ref()
            .is_some_and(|output| fs::canonicalize(source).is_ok_and(|path| &path == output));
        if same_path || same_file {
            return Err(ArchiveFailure::io(
                "output_is_source",
                source,
                io::Error::new(io::ErrorKind::InvalidInput, "output path is also a source file"),
            ));
        }
    }
    Ok(())
}

fn plan_entries(sources: &[PathBuf]) -> Result<EntryPlan<'_>, ArchiveFailure> {
    let mut named = Vec::with_capacity(sources.len());
    for source in sources {
        let name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ArchiveFailure::io(
                    "entry_name",
                    source,
                    io::Error::new(io::ErrorKind::InvalidInput, "source has no file name"),
                )
            })?;
        named.push((name, source.as_path()));
    }

    let winners: Vec<bool> = {
        let mut last_index: HashMap<&str, usize> = HashMap::with_capacity(named.len());
        for (index, (name, _)) in named.iter().enumerate() {
            last_index.insert(name.as_str(), index);
        }
        named
            .iter()
            .enumerate()
            .map(|(index, (name, _))| last_index.get(name.as_str()) == Some(&index))
            .collect()
    };

    let mut plan = EntryPlan {
        entries: Vec::with_capacity(named.len()),
        shadowed: Vec::new(),
    };
    for ((name, source), wins) in named.into_iter().zip(winners) {
        if wins {
            plan.entries.push(PlannedEntry { name, source });
        } else {
            plan.shadowed.push(source.to_path_buf());
        }
    }
    Ok(plan)
}

fn write_archive(output: &Path, entries: &[PlannedEntry<'_>]) -> Result<u64, ArchiveFailure> {
    let file =
        File::create(output).map_err(|err| ArchiveFailure::io("create_output", output, err))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let mut bytes_archived = 0u64;

    for entry in entries {
        let mut source = File::open(entry.source)
            .map_err(|err| ArchiveFailure::io("open_source", entry.source, err))?;
        let size = source
            .metadata()
            .map_err(|err| ArchiveFailure::io("stat_source", entry.source, err))?
            .len();
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(size >= ZIP64_THRESHOLD);
        zip.start_file(entry.name.as_str(), options)
            .map_err(|err| ArchiveFailure::zip("start_entry", entry.source, err))?;
        bytes_archived += io::copy(&mut source, &mut zip)
            .map_err(|err| ArchiveFailure::io("copy_entry", entry.source, err))?;
    }

    let buffered = zip
        .finish()
        .map_err(|err| ArchiveFailure::zip("finish", output, err))?;
    let file = buffered
        .into_inner()
        .map_err(|err| ArchiveFailure::io("flush", output, err.into_error()))?;
    file.sync_all()
        .map_err(|err| ArchiveFailure::io("sync", output, err))?;
    Ok(bytes_archived)
}

fn discard_partial(output: &Path) {
    if let Err(err) = fs::remove_file(output)
        && err.kind() != io::ErrorKind::NotFound
    {
        warn!(
            error = %err,
            path = %output.display(),
            "failed to remove partial archive"
        );
    }
}

fn remove_sources(sources: &[PathBuf], report: &mut ArchiveReport) {
    for source in sources {
        match fs::remove_file(source) {
            Ok(()) => report.deleted.push(source.clone()),
            Err(err) => {
                warn!(
                    error = %err,
                    path = %source.display(),
                    "failed to remove archived source"
                );
                report.deletion_warnings.push(SourceDeletionWarning {
                    path: source.clone(),
                    source: err,
                });
            }
        }
    }
    info!(
        deleted = report.deleted.len(),
        failed = report.deletion_warnings.len(),
        "archived sources removed"
    );
}
