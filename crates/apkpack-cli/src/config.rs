//! Validated run configuration derived from parsed arguments.

use std::path::PathBuf;

use apkpack_fsops::SelectionCriteria;

use crate::cli::Cli;
use crate::error::{CliError, CliResult};

/// Everything a pack run needs, validated once before any filesystem work.
#[derive(Debug, Clone)]
pub(crate) struct RunConfig {
    pub(crate) directory: PathBuf,
    pub(crate) criteria: SelectionCriteria,
    pub(crate) output: PathBuf,
    pub(crate) delete: bool,
    pub(crate) dry_run: bool,
    pub(crate) follow_links: bool,
}

impl TryFrom<&Cli> for RunConfig {
    type Error = CliError;

    fn try_from(cli: &Cli) -> CliResult<Self> {
        if cli.output.as_os_str().is_empty() {
            return Err(CliError::validation("--output must not be empty"));
        }
        let criteria = SelectionCriteria::builder()
            .keywords(cli.keywords.iter().cloned())
            .min_size_mb(cli.min_size)
            .max_size_mb(cli.max_size)
            .build()?;
        Ok(Self {
            directory: cli.directory.clone(),
            criteria,
            output: cli.output.clone(),
            delete: cli.delete,
            dry_run: cli.dry_run,
            follow_links: cli.follow_links,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("apkpack").chain(args.iter().copied()))
    }

    #[test]
    fn run_config_carries_criteria_and_flags() -> anyhow::Result<()> {
        let cli = parse(&["pkgs", "-k", "Game", "Pro", "--min_size", "1.5", "--delete"])?;
        let config = RunConfig::try_from(&cli).map_err(|err| anyhow::anyhow!(err.display_message()))?;
        assert_eq!(config.directory, PathBuf::from("pkgs"));
        assert_eq!(config.criteria.keywords(), ["game", "pro"]);
        assert_eq!(config.criteria.min_size_bytes(), Some(1_572_864));
        assert_eq!(config.criteria.max_size_bytes(), None);
        assert!(config.delete);
        assert!(!config.dry_run);
        Ok(())
    }

    #[test]
    fn inverted_and_negative_bounds_are_accepted() -> anyhow::Result<()> {
        let cli = parse(&["pkgs", "--min_size", "10", "--max_size", "1"])?;
        let config = RunConfig::try_from(&cli).map_err(|err| anyhow::anyhow!(err.display_message()))?;
        assert!(!config.criteria.matches_size(5 * 1_048_576));

        let cli = parse(&["pkgs", "--min_size", "-1"])?;
        let config = RunConfig::try_from(&cli).map_err(|err| anyhow::anyhow!(err.display_message()))?;
        assert_eq!(config.criteria.min_size_bytes(), Some(0));
        Ok(())
    }

    #[test]
    fn non_finite_size_is_a_validation_error() -> anyhow::Result<()> {
        let cli = parse(&["pkgs", "--max_size", "NaN"])?;
        let Err(err) = RunConfig::try_from(&cli) else {
            panic!("expected validation error");
        };
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.display_message(),
            "invalid --max_size: must be a finite number (got NaN)"
        );
        Ok(())
    }
}
