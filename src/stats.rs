//! Reduction of a timing sample to the figures reported per cell.

use crate::{harness::TimingSample, Error, Result};
use std::time::Duration;

/// Running totals over nanosecond durations.
struct Stats {
    min_ns: u128,
    max_ns: u128,
    total_ns: u128,
    count: usize,
}

impl Stats {
    fn new() -> Self {
        Self {
            min_ns: u128::MAX,
            max_ns: 0,
            total_ns: 0,
            count: 0,
        }
    }

    fn add(&mut self, ns: u128) {
        self.min_ns = self.min_ns.min(ns);
        self.max_ns = self.max_ns.max(ns);
        self.total_ns += ns;
        self.count += 1;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    /// Arithmetic mean, the aggregate every comparison is made on.
    pub mean: Duration,
    pub min: Duration,
    pub max: Duration,
    /// Population standard deviation.
    pub std_dev: Duration,
    pub count: usize,
}

impl Summary {
    /// Mean nanoseconds per key operation when a trial performs `ops` of them.
    pub fn per_op(&self, ops: usize) -> f64 {
        self.mean.as_nanos() as f64 / ops.max(1) as f64
    }
}

fn nanos(ns: u128) -> Duration {
    Duration::from_nanos(u64::try_from(ns).unwrap_or(u64::MAX))
}

/// Reduce `sample` to its mean and extremes.
pub fn reduce(sample: &TimingSample) -> Result<Summary> {
    if sample.is_empty() {
        return Err(Error::EmptySample);
    }
    let mut stats = Stats::new();
    for duration in sample.durations() {
        stats.add(duration.as_nanos());
    }
    let mean_ns = stats.total_ns as f64 / stats.count as f64;
    let variance = sample
        .durations()
        .iter()
        .map(|d| {
            let diff = d.as_nanos() as f64 - mean_ns;
            diff * diff
        })
        .sum::<f64>()
        / stats.count as f64;

    Ok(Summary {
        mean: nanos(mean_ns as u128),
        min: nanos(stats.min_ns),
        max: nanos(stats.max_ns),
        std_dev: Duration::from_nanos(variance.sqrt() as u64),
        count: stats.count,
    })
}
