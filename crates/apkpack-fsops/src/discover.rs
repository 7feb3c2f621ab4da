//! Recursive discovery of package files.
//!
//! # Design
//! - Read-only: only directory listings and file metadata are consulted.
//! - Unreadable entries below the root are logged and skipped; only an invalid
//!   root is an error.
//! - Symlinked directories are only descended when [`Discoverer::follow_links`]
//!   is enabled. A symlink to a regular file is always a candidate and is sized
//!   by its target; dangling links are logged and skipped.

use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{FsOpsError, FsOpsResult};
use crate::model::{SelectionCriteria, is_package_name};

/// Walks a directory tree and returns package files that satisfy a [`SelectionCriteria`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Discoverer {
    follow_links: bool,
}

impl Discoverer {
    /// Discoverer that does not descend into symlinked directories.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            follow_links: false,
        }
    }

    /// Descend into symlinked directories.
    #[must_use]
    pub const fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Absolute paths of every package file under `root` that matches `criteria`.
    ///
    /// Order follows the directory walk and is only stable within one run.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::InvalidPath`] when `root` does not exist or is not
    /// a directory. A directory without matches yields an empty list.
    pub fn find_matches(
        &self,
        root: &Path,
        criteria: &SelectionCriteria,
    ) -> FsOpsResult<Vec<PathBuf>> {
        let root = resolve_root(root)?;
        let mut candidates = 0usize;
        let mut matches = Vec::new();

        for entry in WalkDir::new(&root).follow_links(self.follow_links) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(
                        error = %err,
                        path = %err.path().unwrap_or(root.as_path()).display(),
                        "failed to traverse scan entry"
                    );
                    continue;
                }
            };
            let file_type = entry.file_type();
            if !file_type.is_file() && !file_type.is_symlink() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_package_name(&name) {
                continue;
            }
            candidates += 1;
            if !criteria.matches_name(&name) {
                continue;
            }

            let size_bytes = match entry_metadata(&entry) {
                Ok(metadata) if metadata.is_file() => metadata.len(),
                Ok(_) => continue,
                Err(err) => {
                    warn!(
                        error = %err,
                        path = %entry.path().display(),
                        "failed to read package metadata"
                    );
                    continue;
                }
            };
            if !criteria.matches_size(size_bytes) {
                continue;
            }

            debug!(path = %entry.path().display(), size_bytes, "package matched");
            matches.push(entry.into_path());
        }

        info!(
            root = %root.display(),
            candidates,
            matched = matches.len(),
            "discovery finished"
        );
        Ok(matches)
    }
}

/// Absolute paths of every package file under `root` that matches `criteria`,
/// without following symlinks.
///
/// # Errors
///
/// Returns [`FsOpsError::InvalidPath`] when `root` does not exist or is not a directory.
pub fn find_matches(root: &Path, criteria: &SelectionCriteria) -> FsOpsResult<Vec<PathBuf>> {
    Discoverer::new().find_matches(root, criteria)
}

// Unfollowed symlinks report their own metadata; package links are sized by target.
fn entry_metadata(entry: &walkdir::DirEntry) -> io::Result<Metadata> {
    if entry.path_is_symlink() {
        fs::metadata(entry.path())
    } else {
        entry.metadata().map_err(io::Error::from)
    }
}

fn resolve_root(root: &Path) -> FsOpsResult<PathBuf> {
    let metadata = fs::metadata(root)
        .map_err(|err| FsOpsError::invalid_path(root, "unreadable", Some(err)))?;
    if !metadata.is_dir() {
        return Err(FsOpsError::invalid_path(root, "not_directory", None));
    }
    std::path::absolute(root)
        .map_err(|err| FsOpsError::invalid_path(root, "unresolvable", Some(err)))
}
