//! Save generator states separated by a fixed number of draws.
//!
//! Typical usage:
//!
//! ```bash
//! # 16 taus states, 20G draws apart, into taus_rng_16_states_with_stride_20000000000.dat
//! save-states -i 20000000000 -s 16
//!
//! # List the supported generator algorithms
//! save-states -t
//! ```

use std::fs::File;
use std::io::BufWriter;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use montepi::checkpoint::CheckpointWriter;
use montepi::cli::{parse_args, report_failure, setup_logging, EXIT_CODES_HELP};
use montepi::generator::{generate_checkpoints, GeneratorConfig};
use montepi::rng::{algorithm_names, Algorithm};
use montepi::{MontePiError, Result};

/// Write a sequence of generator checkpoints spaced `interval` draws apart
#[derive(Parser)]
#[command(name = "save-states")]
#[command(version, about, long_about = None, after_help = EXIT_CODES_HELP)]
struct Args {
    /// Draws between consecutive saved states
    #[arg(short, long, env = "MONTEPI_INTERVAL", required_unless_present = "list_types",
          value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,

    /// Number of states to save
    #[arg(short, long, env = "MONTEPI_STATES", required_unless_present = "list_types",
          value_parser = clap::value_parser!(u64).range(1..))]
    states: Option<u64>,

    /// Output file (default: <algorithm>_rng_<states>_states_with_stride_<interval>.dat)
    #[arg(short = 'f', long, env = "MONTEPI_OUTPUT")]
    output: Option<String>,

    /// Generator algorithm (see --list-types)
    #[arg(short, long, env = "MONTEPI_ALGORITHM", default_value = "taus")]
    algorithm: Algorithm,

    /// Seed for the generator
    #[arg(long, env = "MONTEPI_SEED", default_value_t = 0)]
    seed: u64,

    /// Print the supported generator algorithms and exit
    #[arg(short = 't', long)]
    list_types: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn run(args: &Args) -> Result<()> {
    let (Some(interval), Some(count)) = (args.interval, args.states) else {
        return Err(MontePiError::Configuration(
            "both --interval and --states are required".into(),
        ));
    };
    let config = GeneratorConfig {
        algorithm: args.algorithm,
        seed: args.seed,
        interval,
        count,
    };
    config.validate()?;

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| config.default_file_name());
    let file = File::create(&path).map_err(|e| MontePiError::output(path.clone(), e))?;
    let mut writer = CheckpointWriter::new(BufWriter::new(file), path.clone());

    info!(
        "state_size={} algorithm={}",
        config.algorithm.state_size(),
        config.algorithm
    );
    let summary = generate_checkpoints(&config, &mut writer)?;
    info!(
        "Saved {} {} states ({} draws) to {}",
        summary.records, summary.algorithm, summary.draws, path
    );
    Ok(())
}

fn main() -> ExitCode {
    let args: Args = match parse_args() {
        Ok(args) => args,
        Err(code) => return code,
    };

    if args.list_types {
        for name in algorithm_names() {
            println!("{name}");
        }
        return ExitCode::SUCCESS;
    }

    setup_logging(args.verbose, args.quiet);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_failure(&e),
    }
}
