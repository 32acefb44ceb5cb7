//! Parallel sampler.
//!
//! One OS thread per checkpoint. Each thread owns a private generator
//! restored from its checkpoint and a private hit counter; the only shared
//! state is the [`CompletionBarrier`]. The coordinator blocks on the
//! barrier, aggregates, then joins every thread.

mod barrier;
mod partition;
mod worker;

use std::io::Read;
use std::sync::Arc;
use std::thread;

use tracing::info;

use crate::checkpoint::CheckpointReader;
use crate::error::{IoContext, MontePiError, Result};
use crate::estimate::{Estimate, WorkerResult};
use crate::rng::{GeneratorState, StreamRng};

pub use barrier::CompletionBarrier;
pub use partition::partition_trials;
pub use worker::{throw_darts, WorkerTask};

/// Parameters for one sampling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    pub threads: usize,
    pub total_trials: u64,
}

impl SamplerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.threads < 1 {
            return Err(MontePiError::Configuration(format!(
                "invalid threads = {}",
                self.threads
            )));
        }
        Ok(())
    }
}

/// Read one checkpoint per worker, in file order.
pub fn load_checkpoints<R: Read>(source: R, threads: usize) -> Result<Vec<GeneratorState>> {
    CheckpointReader::new(source).read_exact(threads)
}

/// Build one task per worker. Fails before anything is spawned.
pub fn plan_tasks(checkpoints: &[GeneratorState], config: &SamplerConfig) -> Result<Vec<WorkerTask>> {
    config.validate()?;
    if checkpoints.len() < config.threads {
        return Err(MontePiError::Serialization(format!(
            "{} checkpoints available for {} workers",
            checkpoints.len(),
            config.threads
        )));
    }

    partition_trials(config.total_trials, config.threads)
        .into_iter()
        .zip(checkpoints)
        .enumerate()
        .map(|(id, (trials, state))| {
            StreamRng::restore(state).map(|rng| WorkerTask { id, rng, trials })
        })
        .collect()
}

/// Run the sampler: checkpoint `k` seeds worker `k`.
pub fn run_sampler(checkpoints: &[GeneratorState], config: &SamplerConfig) -> Result<Estimate> {
    let tasks = plan_tasks(checkpoints, config)?;
    let shares: Vec<u64> = tasks.iter().map(|task| task.trials).collect();
    let barrier = Arc::new(CompletionBarrier::new(tasks.len()));

    info!(
        "Spawning {} workers for {} trials",
        config.threads, config.total_trials
    );

    let mut handles = Vec::with_capacity(tasks.len());
    let mut spawn_error = None;
    let mut tasks = tasks.into_iter();

    while let Some(task) = tasks.next() {
        let id = task.id;
        let worker_barrier = Arc::clone(&barrier);
        let spawned = thread::Builder::new()
            .name(format!("montepi-worker-{id}"))
            .spawn(move || task.run(&worker_barrier));

        match spawned {
            Ok(handle) => handles.push(handle),
            Err(e) => {
                // Release the slots of everyone who will never run. These
                // slots are still pending, so withdrawing cannot fail.
                let _ = barrier.withdraw(id);
                for rest in tasks.by_ref() {
                    let _ = barrier.withdraw(rest.id);
                }
                spawn_error = Some(e);
            }
        }
    }

    let waited = barrier.wait();
    let joined = join_workers(handles);

    if let Some(e) = spawn_error {
        return Err(MontePiError::Io {
            context: IoContext::Spawn,
            source: e,
        });
    }
    joined?;
    let hits = waited?;

    let workers = hits
        .into_iter()
        .zip(shares)
        .enumerate()
        .map(|(worker, (hits, trials))| WorkerResult {
            worker,
            trials,
            hits,
        })
        .collect();
    Ok(Estimate::from_workers(workers))
}

fn join_workers(handles: Vec<thread::JoinHandle<Result<()>>>) -> Result<()> {
    let mut first_error = None;
    for handle in handles {
        let outcome = match handle.join() {
            Ok(result) => result,
            Err(_) => Err(MontePiError::ConcurrencyInvariant(
                "worker thread panicked".into(),
            )),
        };
        if let Err(e) = outcome {
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}
