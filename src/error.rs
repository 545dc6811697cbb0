//! Errors raised while generating workloads, timing trials, and comparing subjects.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid workload: {0}")]
    InvalidWorkload(String),
    #[error("key not found")]
    KeyNotFound,
    #[error("empty sample")]
    EmptySample,
    #[error("container unavailable: {0}")]
    ContainerUnavailable(String),
    #[error("no subjects to compare")]
    NoSubjects,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
