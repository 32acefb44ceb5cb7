//! Estimate pi by throwing darts on parallel threads.
//!
//! Each thread starts from its own saved generator state, so runs are
//! reproducible and streams never overlap:
//!
//! ```bash
//! save-states -i 20000000000 -s 16
//! montepi -r taus_rng_16_states_with_stride_20000000000.dat -p 16 -t 1000000000
//! ```

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::process::ExitCode;
use std::time::Instant;

use chrono::Local;
use clap::Parser;

use montepi::cli::{parse_args, report_failure, setup_logging, EXIT_CODES_HELP};
use montepi::error::IoContext;
use montepi::sampler::{load_checkpoints, run_sampler, SamplerConfig};
use montepi::{MontePiError, Result};

/// Monte Carlo estimation of pi from saved generator states
#[derive(Parser)]
#[command(name = "montepi")]
#[command(version, about, long_about = None, after_help = EXIT_CODES_HELP)]
struct Args {
    /// File of saved generator states, one per thread
    #[arg(short, long, env = "MONTEPI_RNG_STATES")]
    rng_states: String,

    /// Number of worker threads
    #[arg(short = 'p', long, env = "MONTEPI_THREADS", default_value_t = 1,
          value_parser = clap::value_parser!(u64).range(1..))]
    threads: u64,

    /// Total number of darts to throw
    #[arg(short = 't', long, env = "MONTEPI_THROWS", default_value_t = 100_000_000,
          value_parser = clap::value_parser!(u64).range(1..))]
    throws: u64,

    /// Write the report to this file instead of stdout
    #[arg(short = 'f', long, env = "MONTEPI_OUTPUT")]
    output: Option<String>,

    /// Print start and completion timestamps
    #[arg(short, long)]
    summary: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

/// Local time in `ctime` layout, e.g. `Tue Feb 21 09:04:55 2017`.
fn wall_clock() -> String {
    Local::now().format("%a %b %e %H:%M:%S %Y").to_string()
}

fn run(args: &Args) -> Result<()> {
    let config = SamplerConfig {
        threads: usize::try_from(args.threads)
            .map_err(|_| MontePiError::Configuration(format!("invalid threads = {}", args.threads)))?,
        total_trials: args.throws,
    };
    config.validate()?;

    let (mut out, label): (Box<dyn Write>, String) = match &args.output {
        Some(path) => {
            let file = File::create(path).map_err(|e| MontePiError::output(path.clone(), e))?;
            (Box::new(file), path.clone())
        }
        None => (Box::new(io::stdout()), "stdout".to_string()),
    };
    let report_err = |e: io::Error| MontePiError::output(label.clone(), e);

    if args.summary {
        writeln!(out, "Started {}", wall_clock()).map_err(report_err)?;
    }

    let source = File::open(&args.rng_states).map_err(|e| MontePiError::Io {
        context: IoContext::CheckpointSource(args.rng_states.clone()),
        source: e,
    })?;
    let checkpoints = load_checkpoints(BufReader::new(source), config.threads)?;

    let start = Instant::now();
    let estimate = run_sampler(&checkpoints, &config)?;
    let elapsed = start.elapsed();

    writeln!(out, "{} milliseconds", elapsed.as_millis()).map_err(report_err)?;
    writeln!(out, "{estimate}").map_err(report_err)?;
    if args.summary {
        writeln!(out, "Completed {}", wall_clock()).map_err(report_err)?;
    }
    out.flush().map_err(report_err)
}

fn main() -> ExitCode {
    let args: Args = match parse_args() {
        Ok(args) => args,
        Err(code) => return code,
    };

    setup_logging(args.verbose, args.quiet);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_failure(&e),
    }
}
