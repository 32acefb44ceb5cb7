//! Aggregated sampling results.

use std::f64::consts::PI;
use std::fmt;

/// Square area over quarter-circle area.
pub const AREA_RATIO: f64 = 4.0;

/// One worker's share of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerResult {
    pub worker: usize,
    pub trials: u64,
    pub hits: u64,
}

/// Aggregation result, built once by the coordinator after the barrier.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    workers: Vec<WorkerResult>,
    hits: u64,
    trials: u64,
}

impl Estimate {
    pub fn from_workers(workers: Vec<WorkerResult>) -> Self {
        let hits = workers.iter().map(|w| w.hits).sum();
        let trials = workers.iter().map(|w| w.trials).sum();
        Self {
            workers,
            hits,
            trials,
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    pub fn workers(&self) -> &[WorkerResult] {
        &self.workers
    }

    /// Estimate of pi; 0.0 when no trials were run.
    pub fn pi(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        AREA_RATIO * self.hits as f64 / self.trials as f64
    }

    /// Signed distance from the true value.
    pub fn error(&self) -> f64 {
        PI - self.pi()
    }
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} = {:.15} : error {:.15}",
            self.hits,
            self.trials,
            self.pi(),
            self.error()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(worker: usize, trials: u64, hits: u64) -> WorkerResult {
        WorkerResult {
            worker,
            trials,
            hits,
        }
    }

    #[test]
    fn test_totals() {
        let est = Estimate::from_workers(vec![result(0, 10, 8), result(1, 10, 7)]);
        assert_eq!(est.hits(), 15);
        assert_eq!(est.trials(), 20);
        assert_eq!(est.pi(), 3.0);
        assert!((est.error() - (PI - 3.0)).abs() < 1e-15);
    }

    #[test]
    fn test_no_trials() {
        let est = Estimate::from_workers(vec![result(0, 0, 0)]);
        assert_eq!(est.pi(), 0.0);
    }

    #[test]
    fn test_display() {
        let est = Estimate::from_workers(vec![result(0, 4, 3)]);
        assert_eq!(
            est.to_string(),
            format!("3/4 = 3.000000000000000 : error {:.15}", PI - 3.0)
        );
    }
}
