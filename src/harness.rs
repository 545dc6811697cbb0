//! Trial loop shared by every benchmark.
//!
//! Each trial builds fresh state with an untimed `setup`, quiesces background
//! reclamation, times a single `action`, and only then releases the state. The
//! action's outcome (including a miss) is kept alive until the clock stops and
//! is otherwise ignored.

use crate::{Error, Result};
use std::{
    fmt,
    hint::black_box,
    time::{Duration, Instant},
};
use tracing::trace;

/// Default number of recorded trials per cell.
pub const ITERATIONS: usize = 50;

/// Default number of unrecorded trials run ahead of the recorded ones.
pub const WARMUP_ITERATIONS: usize = 2;

/// Suspends and resumes automatic reclamation around a timed region.
pub trait Quiesce {
    fn suspend(&self);
    fn resume(&self);
}

/// Reclamation is already deterministic: trial state is dropped after the
/// clock stops, so there is nothing to suspend.
#[derive(Clone, Copy, Debug, Default)]
pub struct Deterministic;

impl Quiesce for Deterministic {
    fn suspend(&self) {}
    fn resume(&self) {}
}

/// Scoped suspension. Resumes on drop, including during unwinding.
pub struct Quiesced<'a> {
    quiesce: &'a dyn Quiesce,
}

impl<'a> Quiesced<'a> {
    pub fn acquire(quiesce: &'a dyn Quiesce) -> Self {
        quiesce.suspend();
        Self { quiesce }
    }
}

impl Drop for Quiesced<'_> {
    fn drop(&mut self) {
        self.quiesce.resume();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HarnessConfig {
    pub iterations: usize,
    pub warmup: usize,
    /// Keep the raw sample on each result instead of discarding it.
    pub keep_raw: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            iterations: ITERATIONS,
            warmup: WARMUP_ITERATIONS,
            keep_raw: false,
        }
    }
}

/// Per-trial durations, in trial order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TimingSample(Vec<Duration>);

impl TimingSample {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn durations(&self) -> &[Duration] {
        &self.0
    }
}

impl From<Vec<Duration>> for TimingSample {
    fn from(durations: Vec<Duration>) -> Self {
        Self(durations)
    }
}

pub struct Harness {
    config: HarnessConfig,
    quiesce: Box<dyn Quiesce>,
}

impl fmt::Debug for Harness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Harness")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Harness {
    /// Fails with [Error::EmptySample] when no trials would be recorded.
    pub fn new(config: HarnessConfig) -> Result<Self> {
        if config.iterations == 0 {
            return Err(Error::EmptySample);
        }
        Ok(Self {
            config,
            quiesce: Box::new(Deterministic),
        })
    }

    pub fn with_quiesce(mut self, quiesce: impl Quiesce + 'static) -> Self {
        self.quiesce = Box::new(quiesce);
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run `warmup + iterations` independent trials and record the timed
    /// portion of the last `iterations`.
    pub fn measure<S, O>(
        &self,
        mut setup: impl FnMut() -> S,
        mut action: impl FnMut(&mut S) -> O,
    ) -> TimingSample {
        let total = self.config.warmup + self.config.iterations;
        let mut durations = Vec::with_capacity(self.config.iterations);
        for iter in 0..total {
            let mut state = setup();
            let (outcome, elapsed) = {
                let _quiesced = Quiesced::acquire(self.quiesce.as_ref());
                let start = Instant::now();
                let outcome = action(&mut state);
                (outcome, start.elapsed())
            };
            black_box(&outcome);
            drop(outcome);
            drop(state);
            if iter >= self.config.warmup {
                durations.push(elapsed);
            }
        }
        trace!(
            iterations = self.config.iterations,
            warmup = self.config.warmup,
            "measured"
        );
        TimingSample(durations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Lookup;
    use std::{
        cell::Cell,
        panic::{catch_unwind, AssertUnwindSafe},
        rc::Rc,
        thread,
    };

    #[derive(Clone, Default)]
    struct Counting {
        suspended: Rc<Cell<bool>>,
        suspends: Rc<Cell<usize>>,
        resumes: Rc<Cell<usize>>,
    }

    impl Quiesce for Counting {
        fn suspend(&self) {
            self.suspended.set(true);
            self.suspends.set(self.suspends.get() + 1);
        }

        fn resume(&self) {
            self.suspended.set(false);
            self.resumes.set(self.resumes.get() + 1);
        }
    }

    fn harness(iterations: usize, warmup: usize) -> Harness {
        Harness::new(HarnessConfig {
            iterations,
            warmup,
            keep_raw: false,
        })
        .unwrap()
    }

    #[test]
    fn test_records_one_duration_per_iteration() {
        let setups = Cell::new(0);
        let sample = harness(10, 3).measure(
            || setups.set(setups.get() + 1),
            |_| (),
        );
        assert_eq!(sample.len(), 10);
        assert_eq!(setups.get(), 13);
    }

    #[test]
    fn test_setup_excluded_from_timing() {
        let sample = harness(5, 0).measure(|| thread::sleep(Duration::from_millis(20)), |_| 1u8);
        for duration in sample.durations() {
            assert!(*duration < Duration::from_millis(20));
        }
    }

    #[test]
    fn test_trials_never_share_state() {
        let sample = harness(8, 0).measure(Vec::<u32>::new, |state| {
            assert!(state.is_empty());
            state.push(1);
        });
        assert_eq!(sample.len(), 8);
    }

    #[test]
    fn test_quiesced_during_action_and_released() {
        let counting = Counting::default();
        let observed = counting.suspended.clone();
        let h = harness(4, 1).with_quiesce(counting.clone());
        let sample = h.measure(|| (), |_| assert!(observed.get()));
        assert_eq!(sample.len(), 4);
        assert_eq!(counting.suspends.get(), 5);
        assert_eq!(counting.resumes.get(), 5);
        assert!(!counting.suspended.get());
    }

    #[test]
    fn test_absence_is_recorded_not_raised() {
        let counting = Counting::default();
        let misses = Cell::new(0);
        let h = harness(6, 0).with_quiesce(counting.clone());
        let sample = h.measure(
            || (),
            |_| {
                misses.set(misses.get() + 1);
                Lookup::<u64>::NotFound
            },
        );
        assert_eq!(sample.len(), 6);
        assert_eq!(misses.get(), 6);
        assert_eq!(counting.resumes.get(), 6);
    }

    #[test]
    fn test_released_when_action_panics() {
        let counting = Counting::default();
        let h = harness(1, 0).with_quiesce(counting.clone());
        let result = catch_unwind(AssertUnwindSafe(|| {
            h.measure(|| (), |_| panic!("action failed"))
        }));
        assert!(result.is_err());
        assert_eq!(counting.suspends.get(), 1);
        assert_eq!(counting.resumes.get(), 1);
        assert!(!counting.suspended.get());
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let result = Harness::new(HarnessConfig {
            iterations: 0,
            warmup: 2,
            keep_raw: false,
        });
        assert!(matches!(result, Err(Error::EmptySample)));
    }
}
