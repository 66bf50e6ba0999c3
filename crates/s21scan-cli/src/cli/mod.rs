mod commands;
mod helpers;

use clap::Parser;
use s21scan_core::domain::ScanError;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_ENV: &str = "S21SCAN_LOG";

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let scan_error = error.as_scan_error();
            eprintln!("{}", scan_error.diagnostic_line());
            eprintln!("{}", scan_error.fatal_exit_line());
            scan_error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("s21scan".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            init_tracing(cli.verbose);
            dispatch_parsed(cli)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

/// Installs the stderr subscriber once; `--verbose` wins over `S21SCAN_LOG`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);
    let _ = Registry::default().with(filter).with(fmt_layer).try_init();
}

#[derive(Parser)]
#[command(
    name = "s21scan",
    version,
    about = "Resonance dip extraction and sweep metrics for S2,1 magnitude data"
)]
struct Cli {
    /// Analysis configuration (JSON); command-line flags override it
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// List records and classify parameters into sweep axes and controls
    Overview(commands::OverviewArgs),
    /// Extract resonance dips from every record
    Extract(commands::ExtractArgs),
    /// Tabulate resonance metrics along one sweep axis
    Sweep(commands::SweepArgs),
    /// Export records as data.csv, meta.csv and config.csv
    Export(commands::ExportArgs),
}

fn dispatch_parsed(cli: Cli) -> Result<i32, CliError> {
    let config = helpers::load_config(cli.config.as_deref())?;
    match cli.command {
        CliCommand::Overview(args) => commands::run_overview_command(args),
        CliCommand::Extract(args) => commands::run_extract_command(args, config),
        CliCommand::Sweep(args) => commands::run_sweep_command(args, config),
        CliCommand::Export(args) => commands::run_export_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Scan(ScanError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<ScanError> for CliError {
    fn from(error: ScanError) -> Self {
        Self::Scan(error)
    }
}

impl CliError {
    fn as_scan_error(&self) -> ScanError {
        match self {
            Self::Usage(message) => ScanError::config("INPUT.CLI_USAGE", message.clone()),
            Self::Scan(error) => error.clone(),
            Self::Internal(error) => ScanError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CliError, run};
    use s21scan_core::domain::{ScanError, ScanErrorKind};

    #[test]
    fn usage_errors_map_to_input_validation_exit_code() {
        let error = run(["sweep"]).expect_err("missing file argument should fail");
        assert!(matches!(error, CliError::Usage(_)));
        let scan_error = error.as_scan_error();
        assert_eq!(scan_error.kind(), ScanErrorKind::Config);
        assert_eq!(scan_error.exit_code(), 2);
    }

    #[test]
    fn help_exits_cleanly() {
        assert_eq!(run(["--help"]).expect("help should print"), 0);
    }

    #[test]
    fn scan_errors_pass_through_unchanged() {
        let original = ScanError::baseline_not_found("SWEEP.BASELINE_NOT_FOUND", "no er = 1");
        let error = CliError::from(original.clone());
        assert_eq!(error.as_scan_error(), original);

        let internal = CliError::from(anyhow::anyhow!("disk full"));
        assert_eq!(internal.as_scan_error().exit_code(), 3);
    }
}
