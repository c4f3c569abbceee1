use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct SimulationCounter {
    trials: AtomicU64,
}

impl SimulationCounter {
    pub const fn new() -> Self {
        Self {
            trials: AtomicU64::new(0),
        }
    }

    pub fn record(&self, trials: u64) -> u64 {
        self.trials.fetch_add(trials, Ordering::Relaxed) + trials
    }

    pub fn total(&self) -> u64 {
        self.trials.load(Ordering::Relaxed)
    }
}

pub static SIMULATIONS: SimulationCounter = SimulationCounter::new();

pub fn simulations_ran() -> u64 {
    SIMULATIONS.total()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn counter_accumulates_from_zero() {
        let counter = SimulationCounter::new();
        assert_eq!(counter.total(), 0);
        assert_eq!(counter.record(12), 12);
        assert_eq!(counter.record(24), 36);
        assert_eq!(counter.total(), 36);
    }

    #[test]
    fn concurrent_records_are_not_lost() {
        let counter = Arc::new(SimulationCounter::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        counter.record(12);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker panicked");
        }
        assert_eq!(counter.total(), 8 * 1_000 * 12);
    }
}
