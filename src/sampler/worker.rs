use tracing::debug;

use super::barrier::CompletionBarrier;
use crate::error::Result;
use crate::rng::StreamRng;

/// Everything one worker needs, moved into its thread at spawn time.
#[derive(Debug)]
pub struct WorkerTask {
    pub id: usize,
    /// Private copy of the assigned checkpoint's generator.
    pub rng: StreamRng,
    pub trials: u64,
}

impl WorkerTask {
    /// Throw this task's darts and publish the hit count.
    pub fn run(mut self, barrier: &CompletionBarrier) -> Result<()> {
        let guard = CompletionGuard::new(barrier, self.id);
        let hits = throw_darts(&mut self.rng, self.trials);
        debug!(worker = self.id, trials = self.trials, hits, "Worker finished");
        guard.publish(hits)
    }
}

/// Throw `throws` darts at the unit square and count those landing inside
/// the quarter circle of unit radius.
pub fn throw_darts(rng: &mut StreamRng, throws: u64) -> u64 {
    let mut hits = 0;
    for _ in 0..throws {
        let x = rng.next_uniform();
        let y = rng.next_uniform();
        if x * x + y * y <= 1.0 {
            hits += 1;
        }
    }
    hits
}

/// Releases the worker's barrier slot even if the worker unwinds.
struct CompletionGuard<'a> {
    barrier: &'a CompletionBarrier,
    worker: usize,
    armed: bool,
}

impl<'a> CompletionGuard<'a> {
    fn new(barrier: &'a CompletionBarrier, worker: usize) -> Self {
        Self {
            barrier,
            worker,
            armed: true,
        }
    }

    fn publish(mut self, hits: u64) -> Result<()> {
        self.armed = false;
        self.barrier.publish(self.worker, hits)
    }
}

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let _ = self.barrier.withdraw(self.worker);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Algorithm;
    use std::panic;

    #[test]
    fn test_zero_throws_zero_hits() {
        let mut rng = StreamRng::seeded(Algorithm::Taus, 1);
        let before = rng.capture();
        assert_eq!(throw_darts(&mut rng, 0), 0);
        assert_eq!(rng.capture(), before);
    }

    #[test]
    fn test_hits_bounded_by_throws() {
        let mut rng = StreamRng::seeded(Algorithm::ChaCha8, 2);
        let hits = throw_darts(&mut rng, 5_000);
        assert!(hits <= 5_000);
        // pi/4 of the darts, loosely
        assert!((3_600..4_250).contains(&hits), "hits {hits}");
    }

    #[test]
    fn test_task_publishes_to_its_slot() {
        let barrier = CompletionBarrier::new(2);
        for id in 0..2 {
            WorkerTask {
                id,
                rng: StreamRng::seeded(Algorithm::Taus, id as u64),
                trials: if id == 0 { 100 } else { 0 },
            }
            .run(&barrier)
            .unwrap();
        }
        let hits = barrier.wait().unwrap();
        assert!(hits[0] > 0 && hits[0] <= 100);
        assert_eq!(hits[1], 0);
    }

    #[test]
    fn test_guard_withdraws_on_unwind() {
        let barrier = CompletionBarrier::new(1);
        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            let _guard = CompletionGuard::new(&barrier, 0);
            panic!("worker blew up");
        }));
        assert!(result.is_err());
        assert_eq!(barrier.outstanding(), 0);
        assert!(barrier.wait().is_err());
    }
}
