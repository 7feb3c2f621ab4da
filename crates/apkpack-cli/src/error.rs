//! CLI error type and the mapping from library failures to exit codes.

use std::fmt::{self, Display, Formatter};

use anyhow::anyhow;
use apkpack_fsops::FsOpsError;

/// Exit code for invalid arguments or an unusable scan directory.
pub(crate) const EXIT_VALIDATION: i32 = 2;
/// Exit code for archive creation and other operational failures.
pub(crate) const EXIT_FAILURE: i32 = 3;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => EXIT_VALIDATION,
            Self::Failure(_) => EXIT_FAILURE,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<FsOpsError> for CliError {
    fn from(err: FsOpsError) -> Self {
        match err {
            FsOpsError::InvalidPath {
                path,
                reason,
                source,
            } => {
                let detail = match reason {
                    "not_directory" => "is not a directory",
                    "unresolvable" => "cannot be resolved to an absolute path",
                    _ => "does not exist or cannot be read",
                };
                let mut message = format!("directory {} {detail}", path.display());
                if let Some(source) = source {
                    message.push_str(&format!(": {source}"));
                }
                Self::validation(message)
            }
            FsOpsError::InvalidInput {
                field,
                reason,
                value,
            } => {
                let detail = match reason {
                    "not_finite" => "must be a finite number",
                    other => other,
                };
                let mut message = format!("invalid --{field}: {detail}");
                if let Some(value) = value {
                    message.push_str(&format!(" (got {value})"));
                }
                Self::validation(message)
            }
            FsOpsError::ArchiveCreation { path, source } => {
                let context = format!(
                    "failed to create archive {} (step {} on {})",
                    path.display(),
                    source.operation(),
                    source.path().display()
                );
                Self::failure(anyhow::Error::new(source).context(context))
            }
            FsOpsError::EmptyInput => Self::failure(anyhow!("no files were passed to the archiver")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn exit_codes_separate_validation_from_failure() {
        assert_eq!(CliError::validation("bad").exit_code(), 2);
        assert_eq!(CliError::failure(anyhow!("boom")).exit_code(), 3);
        assert_eq!(CliError::validation("bad").display_message(), "bad");
    }

    #[test]
    fn invalid_path_maps_to_validation() {
        let err = CliError::from(FsOpsError::InvalidPath {
            path: "/missing".into(),
            reason: "unreadable",
            source: Some(io::Error::new(io::ErrorKind::NotFound, "not found")),
        });
        assert_eq!(err.exit_code(), EXIT_VALIDATION);
        assert_eq!(
            err.display_message(),
            "directory /missing does not exist or cannot be read: not found"
        );
    }

    #[test]
    fn invalid_input_names_the_flag() {
        let err = CliError::from(FsOpsError::InvalidInput {
            field: "min_size",
            reason: "not_finite",
            value: Some("inf".to_string()),
        });
        assert_eq!(err.exit_code(), EXIT_VALIDATION);
        assert_eq!(
            err.display_message(),
            "invalid --min_size: must be a finite number (got inf)"
        );
    }

    #[test]
    fn empty_input_is_an_operational_failure() {
        let err = CliError::from(FsOpsError::EmptyInput);
        assert_eq!(err.exit_code(), EXIT_FAILURE);
        assert!(err.display_message().contains("no files"));
    }
}
