//! # Design
//!
//! - Provide structured, constant-message errors for discovery and archiving.
//! - Capture operation context (paths, fields, inputs) to make failures reproducible in tests.
//! - Preserve source errors without interpolating context into error messages.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for discovery and archive operations.
pub type FsOpsResult<T> = Result<T, FsOpsError>;

/// Errors produced while selecting and archiving package files.
#[derive(Debug, Error)]
pub enum FsOpsError {
    /// The scan root does not exist or is not a directory.
    #[error("scan root is not a readable directory")]
    InvalidPath {
        /// Scan root supplied by the caller.
        path: PathBuf,
        /// Static reason for the rejection.
        reason: &'static str,
        /// Underlying IO error when the root could not be inspected.
        #[source]
        source: Option<io::Error>,
    },
    /// Writing the archive failed; no source file was removed.
    #[error("archive creation failed")]
    ArchiveCreation {
        /// Output path of the archive.
        path: PathBuf,
        /// Step that failed while producing the archive.
        source: ArchiveFailure,
    },
    /// The archiver was invoked without any source files.
    #[error("no source files to archive")]
    EmptyInput,
    /// Input validation failures.
    #[error("fsops invalid input")]
    InvalidInput {
        /// Field that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
}

impl FsOpsError {
    pub(crate) fn invalid_path(
        path: impl Into<PathBuf>,
        reason: &'static str,
        source: Option<io::Error>,
    ) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason,
            source,
        }
    }

    pub(crate) fn archive(path: impl Into<PathBuf>, source: ArchiveFailure) -> Self {
        Self::ArchiveCreation {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_input(
        field: &'static str,
        reason: &'static str,
        value: impl ToString,
    ) -> Self {
        Self::InvalidInput {
            field,
            reason,
            value: Some(value.to_string()),
        }
    }
}

/// Cause of an archive creation failure.
#[derive(Debug, Error)]
pub enum ArchiveFailure {
    /// IO failures while reading sources or writing the archive.
    #[error("archive io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Zip encoder failures.
    #[error("archive zip failure")]
    Zip {
        /// Operation that triggered the zip failure.
        operation: &'static str,
        /// Path involved in the zip failure.
        path: PathBuf,
        /// Underlying zip error.
        source: zip::result::ZipError,
    },
}

impl ArchiveFailure {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn zip(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: zip::result::ZipError,
    ) -> Self {
        Self::Zip {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Label of the failing step.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Io { operation, .. } | Self::Zip { operation, .. } => *operation,
        }
    }

    /// Path involved in the failing step.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::Zip { path, .. } => path,
        }
    }
}

/// A matched source file that could not be removed after a successful archive.
///
/// Collected in the archive report; never returned as an `Err`.
#[derive(Debug, Error)]
#[error("failed to remove source file")]
pub struct SourceDeletionWarning {
    /// Source file that was left on disk.
    pub path: PathBuf,
    /// Underlying IO error.
    #[source]
    pub source: io::Error,
}
