//! Plumbing shared by the `save-states` and `montepi` binaries.

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::error::{ExitStatus, MontePiError};

/// Exit code table appended to both binaries' `--help`.
pub const EXIT_CODES_HELP: &str = "\
Exit codes:
  0  success
  1  invalid arguments
  2  output file could not be opened or written
  3  checkpoint source could not be opened
  4  checkpoint source could not be read or decoded
  5  internal failure";

/// `-q` wins over `-v`; `RUST_LOG`, when set, wins over both.
pub fn setup_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Parse arguments; usage errors exit with code 1, `--help`/`--version` with 0.
pub fn parse_args<P: Parser>() -> Result<P, ExitCode> {
    P::try_parse().map_err(|e| {
        let _ = e.print();
        match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitStatus::Success.into(),
            _ => ExitStatus::InvalidArguments.into(),
        }
    })
}

/// Report a failure and turn it into its documented exit code.
pub fn report_failure(err: &MontePiError) -> ExitCode {
    error!("{err}");
    err.exit_status().into()
}
