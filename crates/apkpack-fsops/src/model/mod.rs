//! Domain models for package selection and archiving.
//!
//! # Design
//! - Criteria are validated once at construction and immutable afterwards.
//! - Requests own their paths; reports carry everything a renderer needs.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{FsOpsError, FsOpsResult, SourceDeletionWarning};

/// Bytes in one binary megabyte; all size thresholds use this conversion.
pub const BYTES_PER_MB: u64 = 1_048_576;

/// Filename suffixes recognised as package files, compared case-insensitively.
pub const PACKAGE_SUFFIXES: [&str; 2] = [".apk", ".xapk"];

/// Filters applied to package files during discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionCriteria {
    keywords: Vec<String>,
    min_size_bytes: Option<i64>,
    max_size_bytes: Option<i64>,
}

impl SelectionCriteria {
    /// Start building a criteria set with no constraints.
    #[must_use]
    pub fn builder() -> SelectionCriteriaBuilder {
        SelectionCriteriaBuilder::default()
    }

    /// Lowercased, de-duplicated keywords that must all appear in a filename.
    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Inclusive lower size bound in bytes, never negative.
    #[must_use]
    pub const fn min_size_bytes(&self) -> Option<i64> {
        self.min_size_bytes
    }

    /// Inclusive upper size bound in bytes. A negative bound matches no file.
    #[must_use]
    pub const fn max_size_bytes(&self) -> Option<i64> {
        self.max_size_bytes
    }

    /// Whether `file_name` contains every keyword, ignoring case.
    #[must_use]
    pub fn matches_name(&self, file_name: &str) -> bool {
        if self.keywords.is_empty() {
            return true;
        }
        let lowered = file_name.to_lowercase();
        self.keywords
            .iter()
            .all(|keyword| lowered.contains(keyword.as_str()))
    }

    /// Whether `size_bytes` falls within both bounds.
    ///
    /// Inverted bounds are accepted and match nothing.
    #[must_use]
    pub fn matches_size(&self, size_bytes: u64) -> bool {
        let size = i64::try_from(size_bytes).unwrap_or(i64::MAX);
        self.min_size_bytes.is_none_or(|min| size >= min)
            && self.max_size_bytes.is_none_or(|max| size <= max)
    }
}

/// Builder for [`SelectionCriteria`] accepting megabyte thresholds.
#[derive(Debug, Clone, Default)]
pub struct SelectionCriteriaBuilder {
    keywords: Vec<String>,
    min_size_mb: Option<f64>,
    max_size_mb: Option<f64>,
}

impl SelectionCriteriaBuilder {
    /// Require `keyword` to appear in matching filenames.
    #[must_use]
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }

    /// Require every entry of `keywords` to appear in matching filenames.
    #[must_use]
    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords.extend(keywords.into_iter().map(Into::into));
        self
    }

    /// Inclusive lower bound in binary megabytes.
    #[must_use]
    pub const fn min_size_mb(mut self, megabytes: Option<f64>) -> Self {
        self.min_size_mb = megabytes;
        self
    }

    /// Inclusive upper bound in binary megabytes.
    #[must_use]
    pub const fn max_size_mb(mut self, megabytes: Option<f64>) -> Self {
        self.max_size_mb = megabytes;
        self
    }

    /// Validate the thresholds and produce immutable criteria.
    ///
    /// A negative lower bound is the same as no lower bound. A negative upper
    /// bound, or a lower bound above the upper bound, yields criteria that
    /// match no file.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::InvalidInput`] when a bound is NaN or infinite.
    pub fn build(self) -> FsOpsResult<SelectionCriteria> {
        let min_size_bytes = self
            .min_size_mb
            .map(|mb| megabytes_to_bytes("min_size", mb, Rounding::Up))
            .transpose()?
            .map(|bytes| bytes.max(0));
        let max_size_bytes = self
            .max_size_mb
            .map(|mb| megabytes_to_bytes("max_size", mb, Rounding::Down))
            .transpose()?;

        let mut seen = HashSet::new();
        let keywords = self
            .keywords
            .into_iter()
            .map(|keyword| keyword.to_lowercase())
            .filter(|keyword| seen.insert(keyword.clone()))
            .collect();

        Ok(SelectionCriteria {
            keywords,
            min_size_bytes,
            max_size_bytes,
        })
    }
}

#[derive(Clone, Copy)]
enum Rounding {
    Up,
    Down,
}

// Lower bounds round up and upper bounds round down so that integer byte
// comparisons agree with comparing fractional megabytes. Float to int casts
// saturate at the i64 range.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn megabytes_to_bytes(field: &'static str, megabytes: f64, rounding: Rounding) -> FsOpsResult<i64> {
    if !megabytes.is_finite() {
        return Err(FsOpsError::invalid_input(field, "not_finite", megabytes));
    }
    let bytes = megabytes * BYTES_PER_MB as f64;
    let rounded = match rounding {
        Rounding::Up => bytes.ceil(),
        Rounding::Down => bytes.floor(),
    };
    Ok(rounded as i64)
}

/// Whether `file_name` ends with a recognised package suffix, ignoring case.
#[must_use]
pub fn is_package_name(file_name: &str) -> bool {
    let lowered = file_name.to_lowercase();
    PACKAGE_SUFFIXES
        .iter()
        .any(|suffix| lowered.ends_with(*suffix))
}

/// Inputs for a single archive run.
#[derive(Debug, Clone)]
pub struct ArchiveRequest {
    output_path: PathBuf,
    source_paths: Vec<PathBuf>,
    delete_originals_on_success: bool,
}

impl ArchiveRequest {
    /// Build a request; repeated source paths are kept once, at their first position.
    #[must_use]
    pub fn new(
        output_path: impl Into<PathBuf>,
        source_paths: impl IntoIterator<Item = PathBuf>,
        delete_originals_on_success: bool,
    ) -> Self {
        let mut seen = HashSet::new();
        let source_paths = source_paths
            .into_iter()
            .filter(|path| seen.insert(path.clone()))
            .collect();
        Self {
            output_path: output_path.into(),
            source_paths,
            delete_originals_on_success,
        }
    }

    /// Destination of the archive.
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Unique source files in caller order.
    #[must_use]
    pub fn source_paths(&self) -> &[PathBuf] {
        &self.source_paths
    }

    /// Whether archived sources are removed once the archive is durable.
    #[must_use]
    pub const fn delete_originals_on_success(&self) -> bool {
        self.delete_originals_on_success
    }
}

/// Outcome of a successful archive run.
#[derive(Debug, Default)]
pub struct ArchiveReport {
    /// Archive that was written.
    pub output_path: PathBuf,
    /// Entry names in write order.
    pub entries: Vec<String>,
    /// Total uncompressed bytes copied into the archive.
    pub bytes_archived: u64,
    /// Sources dropped because a later source shares their base name.
    pub shadowed: Vec<PathBuf>,
    /// Sources removed after the archive was synced.
    pub deleted: Vec<PathBuf>,
    /// Sources that could not be removed.
    pub deletion_warnings: Vec<SourceDeletionWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult<T> = anyhow::Result<T>;

    #[test]
    fn package_suffixes_match_case_insensitively() {
        assert!(is_package_name("app.apk"));
        assert!(is_package_name("APP.APK"));
        assert!(is_package_name("bundle.XApk"));
        assert!(!is_package_name("notes.txt"));
        assert!(!is_package_name("app.apk.bak"));
        assert!(!is_package_name("apk"));
    }

    #[test]
    fn keywords_are_lowercased_and_deduplicated() -> TestResult<()> {
        let criteria = SelectionCriteria::builder()
            .keywords(["Game", "game", "PRO"])
            .build()?;
        assert_eq!(criteria.keywords(), ["game", "pro"]);
        assert!(criteria.matches_name("SuperGame-Pro.apk"));
        assert!(!criteria.matches_name("SuperGame.apk"));
        Ok(())
    }

    #[test]
    fn empty_keywords_match_everything() -> TestResult<()> {
        let criteria = SelectionCriteria::builder().build()?;
        assert!(criteria.matches_name("anything.xapk"));
        assert!(criteria.matches_size(0));
        assert!(criteria.matches_size(u64::MAX));
        Ok(())
    }

    #[test]
    fn size_bounds_are_inclusive() -> TestResult<()> {
        let criteria = SelectionCriteria::builder()
            .min_size_mb(Some(5.0))
            .max_size_mb(Some(12.0))
            .build()?;
        assert_eq!(criteria.min_size_bytes(), Some(5_242_880));
        assert_eq!(criteria.max_size_bytes(), Some(12_582_912));
        assert!(criteria.matches_size(5 * BYTES_PER_MB));
        assert!(criteria.matches_size(12 * BYTES_PER_MB));
        assert!(!criteria.matches_size(5 * BYTES_PER_MB - 1));
        assert!(!criteria.matches_size(12 * BYTES_PER_MB + 1));
        Ok(())
    }

    #[test]
    fn fractional_bounds_round_toward_the_interval() -> TestResult<()> {
        let criteria = SelectionCriteria::builder()
            .min_size_mb(Some(0.1))
            .max_size_mb(Some(0.1))
            .build()?;
        // 0.1 MB is 104857.6 bytes; no integer size can satisfy both bounds.
        assert_eq!(criteria.min_size_bytes(), Some(104_858));
        assert_eq!(criteria.max_size_bytes(), Some(104_857));
        assert!(!criteria.matches_size(104_857));
        assert!(!criteria.matches_size(104_858));
        Ok(())
    }

    #[test]
    fn non_finite_bounds_are_rejected() {
        let nan = SelectionCriteria::builder().max_size_mb(Some(f64::NAN)).build();
        assert!(matches!(
            nan,
            Err(FsOpsError::InvalidInput {
                field: "max_size",
                reason: "not_finite",
                ..
            })
        ));

        let infinite = SelectionCriteria::builder()
            .min_size_mb(Some(f64::INFINITY))
            .build();
        assert!(matches!(
            infinite,
            Err(FsOpsError::InvalidInput {
                field: "min_size",
                reason: "not_finite",
                ..
            })
        ));
    }

    #[test]
    fn negative_lower_bound_imposes_no_constraint() -> TestResult<()> {
        let criteria = SelectionCriteria::builder().min_size_mb(Some(-1.0)).build()?;
        assert_eq!(criteria.min_size_bytes(), Some(0));
        assert!(criteria.matches_size(0));
        assert!(criteria.matches_size(u64::MAX));
        Ok(())
    }

    #[test]
    fn negative_upper_bound_matches_nothing() -> TestResult<()> {
        let criteria = SelectionCriteria::builder().max_size_mb(Some(-0.5)).build()?;
        assert_eq!(criteria.max_size_bytes(), Some(-524_288));
        assert!(!criteria.matches_size(0));
        assert!(!criteria.matches_size(BYTES_PER_MB));
        Ok(())
    }

    #[test]
    fn inverted_bounds_match_nothing() -> TestResult<()> {
        let criteria = SelectionCriteria::builder()
            .min_size_mb(Some(10.0))
            .max_size_mb(Some(1.0))
            .build()?;
        for size in [0, BYTES_PER_MB, 5 * BYTES_PER_MB, 10 * BYTES_PER_MB, 20 * BYTES_PER_MB] {
            assert!(!criteria.matches_size(size));
        }
        Ok(())
    }

    #[test]
    fn archive_request_keeps_first_occurrence_of_each_path() {
        let request = ArchiveRequest::new(
            "out.zip",
            vec![
                PathBuf::from("/a/one.apk"),
                PathBuf::from("/b/two.apk"),
                PathBuf::from("/a/one.apk"),
            ],
            true,
        );
        assert_eq!(
            request.source_paths(),
            [PathBuf::from("/a/one.apk"), PathBuf::from("/b/two.apk")]
        );
        assert!(request.delete_originals_on_success());
        assert_eq!(request.output_path(), Path::new("out.zip"));
    }
}
