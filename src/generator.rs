//! Stream checkpoint generator.
//!
//! Advances one generator and records its state every `interval` draws.
//! Checkpoint `k` is the state after exactly `k * interval` draws from the
//! freshly seeded generator, so checkpoint 0 is the seeded state itself and
//! `count` checkpoints cost `(count - 1) * interval` draws.

use std::io::Write;

use tracing::{debug, info};

use crate::checkpoint::CheckpointWriter;
use crate::error::{MontePiError, Result};
use crate::rng::{Algorithm, StreamRng};

/// Parameters for one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub algorithm: Algorithm,
    pub seed: u64,
    /// Draws between consecutive checkpoints.
    pub interval: u64,
    /// Number of checkpoints to write.
    pub count: u64,
}

impl GeneratorConfig {
    pub fn new(interval: u64, count: u64) -> Self {
        Self {
            algorithm: Algorithm::default(),
            seed: 0,
            interval,
            count,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval < 1 {
            return Err(MontePiError::Configuration(format!(
                "invalid interval = {}",
                self.interval
            )));
        }
        if self.count < 1 {
            return Err(MontePiError::Configuration(format!(
                "invalid states to save = {}",
                self.count
            )));
        }
        if (self.count - 1).checked_mul(self.interval).is_none() {
            return Err(MontePiError::Configuration(format!(
                "{} states with stride {} exceed the draw counter",
                self.count, self.interval
            )));
        }
        Ok(())
    }

    /// File name used when the caller does not pick one.
    pub fn default_file_name(&self) -> String {
        format!(
            "{}_rng_{}_states_with_stride_{}.dat",
            self.algorithm, self.count, self.interval
        )
    }
}

/// What a generation run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationSummary {
    pub algorithm: Algorithm,
    pub records: u64,
    pub draws: u64,
}

/// Write `config.count` checkpoints to `writer`.
pub fn generate_checkpoints<W: Write>(
    config: &GeneratorConfig,
    writer: &mut CheckpointWriter<W>,
) -> Result<GenerationSummary> {
    config.validate()?;

    let mut rng = StreamRng::seeded(config.algorithm, config.seed);
    debug!(
        algorithm = %config.algorithm,
        state_size = config.algorithm.state_size(),
        seed = config.seed,
        "Seeded generator"
    );

    let first_record = writer.records_written();
    let mut draws: u64 = 0;
    for k in 0..config.count {
        if k > 0 {
            let mut last = 0.0;
            for _ in 0..config.interval {
                last = rng.next_uniform();
            }
            draws += config.interval;
            info!("{:>5} {:.5}", human_count(draws), last);
        }
        writer.write(&rng.capture())?;
    }

    Ok(GenerationSummary {
        algorithm: config.algorithm,
        records: writer.records_written() - first_record,
        draws,
    })
}

/// Draw count with a decimal SI suffix, e.g. `20G` or `999`.
pub fn human_count(n: u64) -> String {
    const UNITS: [(u64, char); 6] = [
        (1_000_000_000_000_000_000, 'E'),
        (1_000_000_000_000_000, 'P'),
        (1_000_000_000_000, 'T'),
        (1_000_000_000, 'G'),
        (1_000_000, 'M'),
        (1_000, 'k'),
    ];
    UNITS
        .iter()
        .find(|(scale, _)| n >= *scale)
        .map(|(scale, suffix)| format!("{}{suffix}", n / scale))
        .unwrap_or_else(|| n.to_string())
}
