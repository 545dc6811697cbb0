//! Sweeps the catalog over every configured workload.
//!
//! A suite groups its comparisons into one [Section] per workload. Structural
//! failures in a workload or a single cell are logged and skipped so the rest
//! of the sweep still runs.

use crate::{
    analyzer::{self, Analyzer, BenchmarkResult, ComparisonOutcome, Subject},
    catalog::Operation,
    collision::{CollisionKey, CollisionMode, DEFAULT_BUCKETS},
    registry,
    workload::{self, BenchKey, Descriptor, Key, KeyType, Workload},
    Result,
};
use std::time::Duration;
use tracing::{error, info};

/// Workload sizes swept by default.
pub const SIZES: [usize; 4] = [1_000, 10_000, 100_000, 500_000];

/// Collision workloads grow quadratically, so they sweep smaller sizes.
pub const COLLISION_SIZES: [usize; 5] = [10, 50, 100, 500, 1_000];

#[derive(Clone, Debug)]
pub struct SuiteConfig {
    pub implementations: Vec<String>,
    pub key_types: Vec<KeyType>,
    pub sizes: Vec<usize>,
    pub seed: Option<u64>,
    pub operations: Vec<Operation>,
    pub collisions: Vec<CollisionMode>,
    pub collision_sizes: Vec<usize>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            implementations: registry::DEFAULT.iter().map(|s| s.to_string()).collect(),
            key_types: KeyType::ALL.to_vec(),
            sizes: SIZES.to_vec(),
            seed: None,
            operations: Operation::ALL.to_vec(),
            collisions: Vec::new(),
            collision_sizes: COLLISION_SIZES.to_vec(),
        }
    }
}

impl SuiteConfig {
    /// The collision modes exercised by `--collisions`.
    pub fn with_default_collisions(mut self) -> Self {
        self.collisions = vec![
            CollisionMode::Constant,
            CollisionMode::Modulo(DEFAULT_BUCKETS),
        ];
        self
    }
}

/// Cost of colliding keys for one implementation and operation, against
/// sequential keys of the same size.
#[derive(Clone, Debug, PartialEq)]
pub struct Slowdown {
    pub operation: Operation,
    pub implementation: String,
    pub collision: Duration,
    pub baseline: Duration,
}

impl Slowdown {
    /// Collision aggregate over baseline aggregate.
    pub fn factor(&self) -> f64 {
        analyzer::ratio(self.collision, self.baseline)
    }
}

/// Every comparison made over one workload.
#[derive(Clone, Debug)]
pub struct Section {
    pub descriptor: Descriptor,
    pub outcomes: Vec<ComparisonOutcome>,
    pub results: Vec<BenchmarkResult>,
    /// Filled for collision workloads only.
    pub slowdowns: Vec<Slowdown>,
}

pub struct Suite<'a> {
    analyzer: &'a Analyzer,
    config: SuiteConfig,
}

impl<'a> Suite<'a> {
    pub fn new(analyzer: &'a Analyzer, config: SuiteConfig) -> Self {
        Self { analyzer, config }
    }

    /// Run the sweep, handing each finished section to `on_section`.
    ///
    /// Fails only when a requested implementation cannot be resolved.
    pub fn run(&self, mut on_section: impl FnMut(&Section)) -> Result<Vec<Section>> {
        let subjects: Vec<Box<dyn Subject<Key>>> =
            registry::resolve_all(&self.config.implementations)?;
        let collision_subjects: Vec<Box<dyn Subject<CollisionKey>>> =
            registry::resolve_all(&self.config.implementations)?;
        info!(
            implementations = ?self.config.implementations,
            sizes = ?self.config.sizes,
            "starting sweep"
        );

        let mut sections = Vec::new();
        for &key_type in &self.config.key_types {
            for &size in &self.config.sizes {
                match workload::generate(key_type, size, self.config.seed) {
                    Ok(workload) => {
                        let section = self.section(&workload, &subjects);
                        on_section(&section);
                        sections.push(section);
                    }
                    Err(err) => error!(%key_type, size, %err, "skipping workload"),
                }
            }
        }
        for &mode in &self.config.collisions {
            for &size in &self.config.collision_sizes {
                match workload::collisions(size, mode) {
                    Ok(workload) => {
                        let mut section = self.section(&workload, &collision_subjects);
                        section.slowdowns = self.slowdowns(&section, &subjects);
                        on_section(&section);
                        sections.push(section);
                    }
                    Err(err) => error!(%mode, size, %err, "skipping workload"),
                }
            }
        }
        info!(sections = sections.len(), "sweep complete");
        Ok(sections)
    }

    fn section<K: BenchKey>(
        &self,
        workload: &Workload<K>,
        subjects: &[Box<dyn Subject<K>>],
    ) -> Section {
        let mut section = Section {
            descriptor: *workload.descriptor(),
            outcomes: Vec::new(),
            results: Vec::new(),
            slowdowns: Vec::new(),
        };
        for &operation in &self.config.operations {
            match self.analyzer.compare(operation, workload, subjects) {
                Ok((outcome, results)) => {
                    section.outcomes.push(outcome);
                    section.results.extend(results);
                }
                Err(err) => error!(
                    operation = operation.name(),
                    workload = %workload.descriptor(),
                    %err,
                    "skipping cell"
                ),
            }
        }
        section
    }

    /// Re-measure every cell of a collision section on sequential keys of the
    /// same size and relate the two.
    fn slowdowns(&self, section: &Section, subjects: &[Box<dyn Subject<Key>>]) -> Vec<Slowdown> {
        let size = section.descriptor.size;
        let baseline = match workload::generate(KeyType::Sequential, size, None) {
            Ok(baseline) => baseline,
            Err(err) => {
                error!(size, %err, "skipping collision baseline");
                return Vec::new();
            }
        };
        let mut slowdowns = Vec::new();
        for outcome in &section.outcomes {
            let operation = outcome.operation;
            let measured = match self.analyzer.compare(operation, &baseline, subjects) {
                Ok((_, measured)) => measured,
                Err(err) => {
                    error!(operation = operation.name(), size, %err, "skipping collision baseline");
                    continue;
                }
            };
            for result in section.results.iter().filter(|r| r.operation == operation) {
                let Some(base) = measured
                    .iter()
                    .find(|b| b.implementation == result.implementation)
                else {
                    continue;
                };
                slowdowns.push(Slowdown {
                    operation,
                    implementation: result.implementation.clone(),
                    collision: result.aggregate,
                    baseline: base.aggregate,
                });
            }
        }
        slowdowns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analyzer::AnalyzerConfig,
        harness::{Harness, HarnessConfig},
        workload::Distribution,
        Error,
    };

    fn analyzer() -> Analyzer {
        let harness = Harness::new(HarnessConfig {
            iterations: 2,
            warmup: 0,
            keep_raw: false,
        })
        .unwrap();
        Analyzer::new(harness, AnalyzerConfig::default())
    }

    fn small() -> SuiteConfig {
        SuiteConfig {
            implementations: vec!["std".into(), "btree".into()],
            key_types: vec![KeyType::Sequential, KeyType::RandomString],
            sizes: vec![0, 64],
            seed: Some(1),
            operations: vec![Operation::Creation, Operation::FailedLookup],
            collisions: Vec::new(),
            collision_sizes: vec![16],
        }
    }

    #[test]
    fn test_invalid_workloads_are_skipped() {
        let analyzer = analyzer();
        let mut seen = 0;
        let sections = Suite::new(&analyzer, small()).run(|_| seen += 1).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(seen, 2);
        for section in &sections {
            assert_eq!(section.descriptor.size, 64);
            assert_eq!(section.outcomes.len(), 2);
            assert_eq!(section.results.len(), 4);
        }
    }

    #[test]
    fn test_collision_sections() {
        let analyzer = analyzer();
        let config = SuiteConfig {
            key_types: Vec::new(),
            ..small()
        }
        .with_default_collisions();
        let sections = Suite::new(&analyzer, config).run(|_| ()).unwrap();
        assert_eq!(sections.len(), 2);
        assert!(sections
            .iter()
            .all(|s| matches!(s.descriptor.distribution, Distribution::Collision(_))));
    }

    #[test]
    fn test_collision_slowdown_against_sequential_keys() {
        let analyzer = analyzer();
        let config = SuiteConfig {
            implementations: vec!["std".into(), "linear".into()],
            key_types: vec![KeyType::Sequential],
            sizes: vec![32],
            operations: vec![Operation::SuccessfulLookup, Operation::DeletionMissing],
            collisions: vec![CollisionMode::Constant],
            ..small()
        };
        let sections = Suite::new(&analyzer, config).run(|_| ()).unwrap();
        assert_eq!(sections.len(), 2);
        assert!(sections[0].slowdowns.is_empty());

        let collided = &sections[1];
        assert_eq!(collided.slowdowns.len(), 4);
        for slowdown in &collided.slowdowns {
            assert!(slowdown.factor() >= 0.0);
            assert!(slowdown.factor().is_finite());
            let cell = collided
                .results
                .iter()
                .find(|r| {
                    r.operation == slowdown.operation && r.implementation == slowdown.implementation
                })
                .unwrap();
            assert_eq!(cell.aggregate, slowdown.collision);
        }
        let names: Vec<_> = collided
            .slowdowns
            .iter()
            .filter(|s| s.operation == Operation::SuccessfulLookup)
            .map(|s| s.implementation.as_str())
            .collect();
        assert_eq!(names, ["std", "linear"]);
    }

    #[test]
    fn test_unknown_implementation_is_fatal() {
        let analyzer = analyzer();
        let config = SuiteConfig {
            implementations: vec!["std".into(), "swiss".into()],
            ..small()
        };
        let ran = Suite::new(&analyzer, config).run(|_| ());
        assert!(matches!(ran, Err(Error::ContainerUnavailable(_))));
    }
}
