//! One-shot completion barrier.
//!
//! A single mutex guards the outstanding-worker count together with one
//! result slot per worker; one condition variable wakes the coordinator
//! when the count reaches zero. Everything a worker publishes under the
//! lock happens-before the coordinator's read after `wait` returns.

use parking_lot::{Condvar, Mutex};

use crate::error::{MontePiError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Pending,
    Published(u64),
    /// Worker left without a result (panic, or never spawned).
    Withdrawn,
}

#[derive(Debug)]
struct BarrierState {
    outstanding: usize,
    slots: Vec<Slot>,
    released: bool,
}

/// Shared coordination object for one sampling run.
#[derive(Debug)]
pub struct CompletionBarrier {
    state: Mutex<BarrierState>,
    done: Condvar,
}

impl CompletionBarrier {
    pub fn new(workers: usize) -> Self {
        Self {
            state: Mutex::new(BarrierState {
                outstanding: workers,
                slots: vec![Slot::Pending; workers],
                released: false,
            }),
            done: Condvar::new(),
        }
    }

    /// Store a worker's hit count and mark it finished.
    pub fn publish(&self, worker: usize, hits: u64) -> Result<()> {
        self.finish(worker, Slot::Published(hits))
    }

    /// Mark a worker finished without a result.
    pub fn withdraw(&self, worker: usize) -> Result<()> {
        self.finish(worker, Slot::Withdrawn)
    }

    fn finish(&self, worker: usize, outcome: Slot) -> Result<()> {
        let mut state = self.state.lock();
        if state.outstanding == 0 {
            return Err(MontePiError::ConcurrencyInvariant(format!(
                "worker {worker} finished with no workers outstanding"
            )));
        }
        match state.slots.get_mut(worker) {
            Some(slot @ Slot::Pending) => *slot = outcome,
            Some(_) => {
                return Err(MontePiError::ConcurrencyInvariant(format!(
                    "worker {worker} finished twice"
                )))
            }
            None => {
                return Err(MontePiError::ConcurrencyInvariant(format!(
                    "worker {worker} has no result slot"
                )))
            }
        }
        state.outstanding -= 1;
        if state.outstanding == 0 {
            self.done.notify_one();
        }
        Ok(())
    }

    /// Block until every worker has finished, then hand out the hit counts.
    ///
    /// One-shot: a second call fails. Fails as well if any worker withdrew.
    pub fn wait(&self) -> Result<Vec<u64>> {
        let mut state = self.state.lock();
        while state.outstanding > 0 {
            self.done.wait(&mut state);
        }
        if state.released {
            return Err(MontePiError::ConcurrencyInvariant(
                "completion barrier already released".into(),
            ));
        }
        state.released = true;

        state
            .slots
            .iter()
            .enumerate()
            .map(|(worker, slot)| match slot {
                Slot::Published(hits) => Ok(*hits),
                Slot::Withdrawn => Err(MontePiError::ConcurrencyInvariant(format!(
                    "worker {worker} exited without publishing a result"
                ))),
                Slot::Pending => Err(MontePiError::ConcurrencyInvariant(format!(
                    "worker {worker} still pending after release"
                ))),
            })
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn outstanding(&self) -> usize {
        self.state.lock().outstanding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_wait_collects_in_worker_order() {
        let barrier = Arc::new(CompletionBarrier::new(3));
        let handles: Vec<_> = (0..3)
            .map(|worker| {
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || barrier.publish(worker, worker as u64 * 10).unwrap())
            })
            .collect();

        assert_eq!(barrier.wait().unwrap(), vec![0, 10, 20]);
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(barrier.outstanding(), 0);
    }

    #[test]
    fn test_zero_workers_releases_immediately() {
        let barrier = CompletionBarrier::new(0);
        assert!(barrier.wait().unwrap().is_empty());
    }

    #[test]
    fn test_double_publish_is_violation() {
        let barrier = CompletionBarrier::new(2);
        barrier.publish(0, 1).unwrap();
        assert!(matches!(
            barrier.publish(0, 1),
            Err(MontePiError::ConcurrencyInvariant(_))
        ));
        assert_eq!(barrier.outstanding(), 1);
    }

    #[test]
    fn test_publish_after_release_is_violation() {
        let barrier = CompletionBarrier::new(1);
        barrier.publish(0, 5).unwrap();
        assert!(matches!(
            barrier.publish(0, 5),
            Err(MontePiError::ConcurrencyInvariant(_))
        ));
    }

    #[test]
    fn test_unknown_worker_is_violation() {
        let barrier = CompletionBarrier::new(1);
        assert!(barrier.publish(3, 0).is_err());
    }

    #[test]
    fn test_wait_is_one_shot() {
        let barrier = CompletionBarrier::new(1);
        barrier.publish(0, 7).unwrap();
        assert_eq!(barrier.wait().unwrap(), vec![7]);
        assert!(matches!(
            barrier.wait(),
            Err(MontePiError::ConcurrencyInvariant(_))
        ));
    }

    #[test]
    fn test_withdrawn_worker_fails_wait() {
        let barrier = CompletionBarrier::new(2);
        barrier.publish(0, 7).unwrap();
        barrier.withdraw(1).unwrap();
        let err = barrier.wait().unwrap_err();
        assert!(err.to_string().contains("worker 1"), "{err}");
    }
}
