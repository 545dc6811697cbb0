//! Runs one catalog operation against several implementations over the same
//! workload and ranks them.

use crate::{
    catalog::Operation,
    container::Container,
    harness::{Harness, TimingSample},
    stats::{self, Summary},
    workload::{BenchKey, Descriptor, Workload},
    Error, Result,
};
use std::{fmt, marker::PhantomData, time::Duration};
use tracing::{debug, warn};

/// Ratio a runner-up must exceed before the winner counts as meaningfully faster.
pub const NOISE_THRESHOLD: f64 = 1.01;

/// A pluggable implementation under test, erased over its container type.
pub trait Subject<K> {
    fn name(&self) -> &str;

    /// Fails with [Error::ContainerUnavailable] when the implementation cannot
    /// be used in this run.
    fn available(&self) -> Result<()> {
        Ok(())
    }

    fn measure(
        &self,
        operation: Operation,
        workload: &Workload<K>,
        harness: &Harness,
    ) -> Result<TimingSample>;
}

/// A [Subject] backed by the container type `C`.
pub struct Implementation<C> {
    name: String,
    _container: PhantomData<fn() -> C>,
}

impl<C> Implementation<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            _container: PhantomData,
        }
    }
}

impl<K: BenchKey, C: Container<K, u64>> Subject<K> for Implementation<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn measure(
        &self,
        operation: Operation,
        workload: &Workload<K>,
        harness: &Harness,
    ) -> Result<TimingSample> {
        Ok(operation.run::<K, C>(workload, harness))
    }
}

#[derive(Clone, Debug)]
pub struct BenchmarkResult {
    pub operation: Operation,
    pub implementation: String,
    pub descriptor: Descriptor,
    /// Mean trial duration.
    pub aggregate: Duration,
    pub summary: Summary,
    pub raw: Option<TimingSample>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Standing {
    pub implementation: String,
    pub aggregate: Duration,
}

#[derive(Clone, Debug)]
pub struct ComparisonOutcome {
    pub operation: Operation,
    pub descriptor: Descriptor,
    /// Every measured implementation, in the order they were given.
    pub results: Vec<Standing>,
    pub winner: String,
    /// Runner-up aggregate over winner aggregate (1.0 when unopposed).
    pub ratio: f64,
    /// Whether `ratio` clears the noise threshold.
    pub significant: bool,
}

impl ComparisonOutcome {
    pub fn winner_aggregate(&self) -> Duration {
        self.results
            .iter()
            .find(|s| s.implementation == self.winner)
            .map(|s| s.aggregate)
            .unwrap_or_default()
    }

    /// Aggregate of `implementation` relative to the winner's.
    pub fn relative(&self, implementation: &str) -> Option<f64> {
        let standing = self
            .results
            .iter()
            .find(|s| s.implementation == implementation)?;
        Some(ratio(standing.aggregate, self.winner_aggregate()))
    }
}

impl fmt::Display for ComparisonOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]: {} wins ({:.2}x)",
            self.operation, self.descriptor, self.winner, self.ratio
        )
    }
}

/// `numerator / denominator`, or 1.0 when either side is zero.
pub(crate) fn ratio(numerator: Duration, denominator: Duration) -> f64 {
    if numerator.is_zero() || denominator.is_zero() {
        return 1.0;
    }
    numerator.as_nanos() as f64 / denominator.as_nanos() as f64
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnalyzerConfig {
    pub threshold: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            threshold: NOISE_THRESHOLD,
        }
    }
}

#[derive(Debug)]
pub struct Analyzer {
    harness: Harness,
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(harness: Harness, config: AnalyzerConfig) -> Self {
        Self { harness, config }
    }

    pub fn harness(&self) -> &Harness {
        &self.harness
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Measure and reduce a single (operation, workload, implementation) cell.
    pub fn benchmark<K: BenchKey>(
        &self,
        operation: Operation,
        workload: &Workload<K>,
        subject: &dyn Subject<K>,
    ) -> Result<BenchmarkResult> {
        let sample = subject.measure(operation, workload, &self.harness)?;
        let summary = stats::reduce(&sample)?;
        debug!(
            operation = operation.name(),
            implementation = subject.name(),
            workload = %workload.descriptor(),
            mean = ?summary.mean,
            "measured"
        );
        Ok(BenchmarkResult {
            operation,
            implementation: subject.name().to_string(),
            descriptor: *workload.descriptor(),
            aggregate: summary.mean,
            summary,
            raw: self.harness.config().keep_raw.then_some(sample),
        })
    }

    /// Benchmark every available subject on the same workload and rank them.
    ///
    /// Unavailable subjects are skipped. Any other failure aborts the cell.
    pub fn compare<K: BenchKey>(
        &self,
        operation: Operation,
        workload: &Workload<K>,
        subjects: &[Box<dyn Subject<K>>],
    ) -> Result<(ComparisonOutcome, Vec<BenchmarkResult>)> {
        let mut results = Vec::with_capacity(subjects.len());
        for subject in subjects {
            let measured = subject
                .available()
                .and_then(|()| self.benchmark(operation, workload, subject.as_ref()));
            match measured {
                Ok(result) => results.push(result),
                Err(err @ Error::ContainerUnavailable(_)) => {
                    warn!(implementation = subject.name(), %err, "skipping implementation");
                }
                Err(err) => return Err(err),
            }
        }
        let outcome = self.rank(operation, *workload.descriptor(), &results)?;
        Ok((outcome, results))
    }

    /// Declare the fastest result the winner and compute its margin over the
    /// runner-up.
    pub fn rank(
        &self,
        operation: Operation,
        descriptor: Descriptor,
        results: &[BenchmarkResult],
    ) -> Result<ComparisonOutcome> {
        let mut order: Vec<&BenchmarkResult> = results.iter().collect();
        order.sort_by_key(|r| r.aggregate);
        let winner = order.first().ok_or(Error::NoSubjects)?;
        let ratio = order
            .get(1)
            .map(|runner_up| ratio(runner_up.aggregate, winner.aggregate))
            .unwrap_or(1.0);

        Ok(ComparisonOutcome {
            operation,
            descriptor,
            results: results
                .iter()
                .map(|r| Standing {
                    implementation: r.implementation.clone(),
                    aggregate: r.aggregate,
                })
                .collect(),
            winner: winner.implementation.clone(),
            ratio,
            significant: ratio > self.config.threshold,
        })
    }
}
