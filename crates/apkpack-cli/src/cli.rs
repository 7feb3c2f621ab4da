//! Command-line interface for selecting and archiving APK/XAPK files.

use std::io::{self, Write};
use std::path::PathBuf;

use apkpack_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, TelemetryError, init_logging};
use clap::Parser;
use tracing::info_span;
use uuid::Uuid;

use crate::commands::pack::handle_pack;
use crate::config::RunConfig;
use crate::error::CliResult;
use crate::output::{OutputFormat, PackSummary, Renderer};

const DEFAULT_OUTPUT: &str = "selected_apks.zip";

/// Parses CLI arguments, executes the pack run, and returns the process exit code.
///
/// Argument errors exit through clap with status 2.
pub fn run() -> i32 {
    let cli = Cli::parse();
    install_logging(&cli);

    let stdout = io::stdout();
    let mut renderer = Renderer::new(stdout.lock(), cli.format);
    match execute(&cli, &mut renderer) {
        Ok(_) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

pub(crate) fn execute<W: Write>(cli: &Cli, renderer: &mut Renderer<W>) -> CliResult<PackSummary> {
    let config = RunConfig::try_from(cli)?;
    let span = info_span!(
        "pack",
        run_id = %Uuid::new_v4(),
        directory = %config.directory.display()
    );
    let _entered = span.enter();
    handle_pack(&config, renderer)
}

fn install_logging(cli: &Cli) {
    let defaults = LoggingConfig::default();
    let config = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.unwrap_or(defaults.format),
    };
    if let Err(err) = init_logging(&config) {
        eprintln!("warning: logging disabled: {err}");
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "apkpack",
    version,
    about = "Select APK/XAPK files in a directory tree and bundle them into a ZIP archive"
)]
pub(crate) struct Cli {
    #[arg(help = "Directory to search recursively for APK/XAPK files")]
    pub(crate) directory: PathBuf,
    #[arg(
        short = 'o',
        long,
        env = "APKPACK_OUTPUT",
        default_value = DEFAULT_OUTPUT,
        help = "Path of the ZIP archive to create (overwritten if present)"
    )]
    pub(crate) output: PathBuf,
    #[arg(
        short = 'k',
        long,
        num_args = 1..,
        value_name = "KW",
        help = "Keywords that must all appear in the file name (case-insensitive)"
    )]
    pub(crate) keywords: Vec<String>,
    #[arg(
        long = "min_size",
        visible_alias = "min-size",
        value_name = "MB",
        allow_negative_numbers = true,
        help = "Minimum file size in megabytes (1 MB = 1,048,576 bytes), inclusive"
    )]
    pub(crate) min_size: Option<f64>,
    #[arg(
        long = "max_size",
        visible_alias = "max-size",
        value_name = "MB",
        allow_negative_numbers = true,
        help = "Maximum file size in megabytes (1 MB = 1,048,576 bytes), inclusive"
    )]
    pub(crate) max_size: Option<f64>,
    #[arg(long, help = "Delete the original files after the archive is written")]
    pub(crate) delete: bool,
    #[arg(
        long,
        conflicts_with = "delete",
        help = "List matching files without writing an archive"
    )]
    pub(crate) dry_run: bool,
    #[arg(long, help = "Follow symbolic links while scanning")]
    pub(crate) follow_links: bool,
    #[arg(
        long,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Report format written to stdout"
    )]
    pub(crate) format: OutputFormat,
    #[arg(
        long,
        env = "APKPACK_LOG_LEVEL",
        default_value = DEFAULT_LOG_LEVEL,
        help = "Log filter for stderr diagnostics (RUST_LOG takes precedence)"
    )]
    pub(crate) log_level: String,
    #[arg(
        long,
        env = "APKPACK_LOG_FORMAT",
        value_name = "pretty|json",
        value_parser = parse_log_format,
        help = "Log format for stderr diagnostics (defaults to pretty in debug builds, json in release)"
    )]
    pub(crate) log_format: Option<LogFormat>,
}

fn parse_log_format(value: &str) -> Result<LogFormat, TelemetryError> {
    value.parse()
}
