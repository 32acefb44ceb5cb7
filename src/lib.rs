//! Parallel Monte Carlo estimation of pi from checkpointed random streams.
//!
//! Two halves, the second consuming the first's output:
//!
//! - [`generator`] advances a single generator and writes its full state
//!   every `interval` draws, giving non-overlapping stream starting points.
//! - [`sampler`] loads one checkpoint per worker, runs the workers on
//!   dedicated threads and aggregates their hit counts behind a
//!   completion barrier.
//!
//! # Example
//!
//! ```
//! use montepi::checkpoint::{CheckpointReader, CheckpointWriter};
//! use montepi::generator::{generate_checkpoints, GeneratorConfig};
//! use montepi::sampler::{run_sampler, SamplerConfig};
//!
//! let mut writer = CheckpointWriter::new(Vec::new(), "memory");
//! generate_checkpoints(&GeneratorConfig::new(1000, 4), &mut writer)?;
//! let bytes = writer.into_inner();
//!
//! let checkpoints = CheckpointReader::new(bytes.as_slice()).read_exact(4)?;
//! let config = SamplerConfig { threads: 4, total_trials: 40_000 };
//! let estimate = run_sampler(&checkpoints, &config)?;
//! assert!(estimate.pi() > 2.9 && estimate.pi() < 3.4);
//! # Ok::<(), montepi::MontePiError>(())
//! ```

pub mod checkpoint;
pub mod cli;
pub mod error;
pub mod estimate;
pub mod generator;
pub mod rng;
pub mod sampler;

pub use error::{ExitStatus, MontePiError, Result};
pub use estimate::Estimate;
pub use rng::{Algorithm, GeneratorState, StreamRng};
