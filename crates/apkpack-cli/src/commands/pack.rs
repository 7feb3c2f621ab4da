//! Discovery followed by archiving, the only command apkpack runs.

use std::io::Write;

use apkpack_fsops::{ArchiveRequest, Discoverer, create_archive};
use tracing::info;

use crate::config::RunConfig;
use crate::error::CliResult;
use crate::output::{ArchiveSummary, PackOutcome, PackSummary, Renderer};

pub(crate) fn handle_pack<W: Write>(
    config: &RunConfig,
    renderer: &mut Renderer<W>,
) -> CliResult<PackSummary> {
    let matched = Discoverer::new()
        .follow_links(config.follow_links)
        .find_matches(&config.directory, &config.criteria)?;

    let mut summary = PackSummary {
        directory: config.directory.clone(),
        criteria: config.criteria.clone(),
        outcome: PackOutcome::NoMatches,
        matched,
        archive: None,
    };
    if summary.matched.is_empty() {
        info!("no package files matched");
        renderer.finish(&summary)?;
        return Ok(summary);
    }

    renderer.selected(&summary.matched)?;
    if config.dry_run {
        summary.outcome = PackOutcome::DryRun;
        renderer.finish(&summary)?;
        return Ok(summary);
    }

    let request = ArchiveRequest::new(
        &config.output,
        summary.matched.iter().cloned(),
        config.delete,
    );
    let report = create_archive(&request)?;
    summary.outcome = PackOutcome::Archived;
    summary.archive = Some(ArchiveSummary::from_report(report, config.delete));
    renderer.finish(&summary)?;
    Ok(summary)
}
