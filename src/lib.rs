//! Micro-benchmarks for associative containers.
//!
//! Workloads of sequential, random, or deliberately colliding keys are run
//! through a fixed catalog of map operations against several pluggable
//! container implementations. Every trial times only the operation itself;
//! setup and teardown stay outside the clock. Results are reduced to a mean per
//! cell and ranked with a configurable noise floor.
//!
//! Benchmarks run strictly one at a time on the calling thread.

pub mod analyzer;
pub mod catalog;
pub mod collision;
pub mod container;
mod error;
pub mod harness;
pub mod registry;
pub mod report;
pub mod stats;
pub mod suite;
pub mod workload;

pub use analyzer::{
    Analyzer, AnalyzerConfig, BenchmarkResult, ComparisonOutcome, Implementation, Subject,
};
pub use catalog::Operation;
pub use collision::{make_collision_key, CollisionKey, CollisionMode};
pub use container::{Container, LinearMap, Lookup};
pub use error::{Error, Result};
pub use harness::{Harness, HarnessConfig, TimingSample};
pub use stats::{reduce, Summary};
pub use workload::{generate, Key, KeyType, Workload};
