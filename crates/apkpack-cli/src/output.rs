//! Renderers and formatting helpers for the pack report.
//!
//! Rendering writes to an injected sink so the command flow can be exercised
//! against an in-memory buffer.

use std::io::Write;
use std::path::PathBuf;

use anyhow::anyhow;
use apkpack_fsops::{ArchiveReport, SelectionCriteria};
use clap::ValueEnum;
use serde::Serialize;

use crate::error::{CliError, CliResult};

/// Notice printed when discovery finds nothing.
pub(crate) const NO_MATCHES_NOTICE: &str = "No APK or XAPK files found matching the criteria.";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum PackOutcome {
    NoMatches,
    DryRun,
    Archived,
}

/// Full result of a pack run, as rendered in JSON mode.
#[derive(Debug, Serialize)]
pub(crate) struct PackSummary {
    pub(crate) directory: PathBuf,
    pub(crate) criteria: SelectionCriteria,
    pub(crate) outcome: PackOutcome,
    pub(crate) matched: Vec<PathBuf>,
    pub(crate) archive: Option<ArchiveSummary>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ArchiveSummary {
    pub(crate) output: PathBuf,
    pub(crate) entries: Vec<String>,
    pub(crate) bytes_archived: u64,
    pub(crate) shadowed: Vec<PathBuf>,
    pub(crate) delete_requested: bool,
    pub(crate) deleted: Vec<PathBuf>,
    pub(crate) deletion_failures: Vec<DeletionFailure>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeletionFailure {
    pub(crate) path: PathBuf,
    pub(crate) error: String,
}

impl ArchiveSummary {
    pub(crate) fn from_report(report: ArchiveReport, delete_requested: bool) -> Self {
        Self {
            output: report.output_path,
            entries: report.entries,
            bytes_archived: report.bytes_archived,
            shadowed: report.shadowed,
            delete_requested,
            deleted: report.deleted,
            deletion_failures: report
                .deletion_warnings
                .into_iter()
                .map(|warning| DeletionFailure {
                    path: warning.path,
                    error: warning.source.to_string(),
                })
                .collect(),
        }
    }
}

/// Writes the pack report to a sink in the selected format.
pub(crate) struct Renderer<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> Renderer<W> {
    pub(crate) const fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }

    /// Report the selected files before archiving starts. JSON output is deferred to [`Self::finish`].
    pub(crate) fn selected(&mut self, matched: &[PathBuf]) -> CliResult<()> {
        if self.format == OutputFormat::Json {
            return Ok(());
        }
        self.line("Selected files:")?;
        for path in matched {
            self.line(&format!("- {}", path.display()))?;
        }
        Ok(())
    }

    pub(crate) fn finish(&mut self, summary: &PackSummary) -> CliResult<()> {
        match self.format {
            OutputFormat::Json => {
                let text = serde_json::to_string_pretty(summary)
                    .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
                self.line(&text)
            }
            OutputFormat::Table => self.finish_table(summary),
        }
    }

    fn finish_table(&mut self, summary: &PackSummary) -> CliResult<()> {
        match summary.outcome {
            PackOutcome::NoMatches => self.line(NO_MATCHES_NOTICE),
            PackOutcome::DryRun => self.line(&format!(
                "Dry run: {} file(s) would be archived; nothing was written.",
                summary.matched.len()
            )),
            PackOutcome::Archived => {
                let Some(archive) = &summary.archive else {
                    return Ok(());
                };
                self.line(&format!(
                    "Successfully created ZIP archive: {} ({} entries, {})",
                    archive.output.display(),
                    archive.entries.len(),
                    format_bytes(archive.bytes_archived)
                ))?;
                for path in &archive.shadowed {
                    self.line(&format!(
                        "Not archived (a later file has the same name): {}",
                        path.display()
                    ))?;
                }
                if archive.delete_requested {
                    self.render_deletions(archive)?;
                }
                Ok(())
            }
        }
    }

    fn render_deletions(&mut self, archive: &ArchiveSummary) -> CliResult<()> {
        if archive.deletion_failures.is_empty() {
            return self.line("Original files deleted.");
        }
        for failure in &archive.deletion_failures {
            self.line(&format!(
                "warning: could not delete {}: {}",
                failure.path.display(),
                failure.error
            ))?;
        }
        self.line(&format!(
            "Deleted {} of {} original files.",
            archive.deleted.len(),
            archive.deleted.len() + archive.deletion_failures.len()
        ))
    }

    fn line(&mut self, text: &str) -> CliResult<()> {
        writeln!(self.out, "{text}")
            .map_err(|err| CliError::failure(anyhow!("failed to write output: {err}")))
    }
}

#[must_use]
pub(crate) fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;
    let value = bytes_to_f64(bytes);
    if value >= GIB {
        format!("{:.2} GiB", value / GIB)
    } else if value >= MIB {
        format!("{:.2} MiB", value / MIB)
    } else if value >= KIB {
        format!("{:.2} KiB", value / KIB)
    } else {
        format!("{bytes} B")
    }
}

fn bytes_to_f64(value: u64) -> f64 {
    let high = u32::try_from(value >> 32).unwrap_or(u32::MAX);
    let low = u32::try_from(value & 0xFFFF_FFFF).unwrap_or(u32::MAX);
    f64::from(high) * 4_294_967_296.0 + f64::from(low)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(format: OutputFormat, summary: &PackSummary) -> anyhow::Result<String> {
        let mut renderer = Renderer::new(Vec::new(), format);
        renderer
            .selected(&summary.matched)
            .and_then(|()| renderer.finish(summary))
            .map_err(|err| anyhow!(err.display_message()))?;
        Ok(String::from_utf8(renderer.into_inner())?)
    }

    fn archived_summary(failures: Vec<DeletionFailure>) -> PackSummary {
        PackSummary {
            directory: PathBuf::from("/pkgs"),
            criteria: SelectionCriteria::default(),
            outcome: PackOutcome::Archived,
            matched: vec![PathBuf::from("/pkgs/a.apk"), PathBuf::from("/pkgs/b.xapk")],
            archive: Some(ArchiveSummary {
                output: PathBuf::from("out.zip"),
                entries: vec!["a.apk".to_string(), "b.xapk".to_string()],
                bytes_archived: 3 * 1024 * 1024,
                shadowed: Vec::new(),
                delete_requested: true,
                deleted: vec![PathBuf::from("/pkgs/a.apk")],
                deletion_failures: failures,
            }),
        }
    }

    #[test]
    fn format_bytes_displays_expected_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.00 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MiB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00 GiB");
    }

    #[test]
    fn table_lists_selection_then_archive_summary() -> anyhow::Result<()> {
        let mut summary = archived_summary(Vec::new());
        if let Some(archive) = summary.archive.as_mut() {
            archive.deleted.push(PathBuf::from("/pkgs/b.xapk"));
        }
        let text = render(OutputFormat::Table, &summary)?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "Selected files:",
                "- /pkgs/a.apk",
                "- /pkgs/b.xapk",
                "Successfully created ZIP archive: out.zip (2 entries, 3.00 MiB)",
                "Original files deleted.",
            ]
        );
        Ok(())
    }

    #[test]
    fn table_reports_partial_deletion() -> anyhow::Result<()> {
        let summary = archived_summary(vec![DeletionFailure {
            path: PathBuf::from("/pkgs/b.xapk"),
            error: "permission denied".to_string(),
        }]);
        let text = render(OutputFormat::Table, &summary)?;
        assert!(text.contains("warning: could not delete /pkgs/b.xapk: permission denied"));
        assert!(text.contains("Deleted 1 of 2 original files."));
        assert!(!text.contains("Original files deleted."));
        Ok(())
    }

    #[test]
    fn table_reports_no_matches() -> anyhow::Result<()> {
        let summary = PackSummary {
            directory: PathBuf::from("/empty"),
            criteria: SelectionCriteria::default(),
            outcome: PackOutcome::NoMatches,
            matched: Vec::new(),
            archive: None,
        };
        let mut renderer = Renderer::new(Vec::new(), OutputFormat::Table);
        renderer
            .finish(&summary)
            .map_err(|err| anyhow!(err.display_message()))?;
        assert_eq!(
            String::from_utf8(renderer.into_inner())?,
            format!("{NO_MATCHES_NOTICE}\n")
        );
        Ok(())
    }

    #[test]
    fn json_emits_a_single_document() -> anyhow::Result<()> {
        let summary = archived_summary(Vec::new());
        let text = render(OutputFormat::Json, &summary)?;
        let value: serde_json::Value = serde_json::from_str(&text)?;
        assert_eq!(value["outcome"], "archived");
        assert_eq!(value["matched"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["archive"]["bytes_archived"], 3 * 1024 * 1024);
        assert_eq!(value["criteria"]["keywords"], serde_json::json!([]));
        Ok(())
    }
}
