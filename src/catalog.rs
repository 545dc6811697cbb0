//! The operations every container is measured on.
//!
//! Each [Operation] pairs an untimed setup with a timed action over a
//! [Container]. Anything the action needs besides the container (probe keys,
//! owned pairs to insert) is prepared in setup or ahead of the trial loop so
//! that key construction never lands inside the clock.

use crate::{
    container::{Container, Lookup},
    harness::{Harness, TimingSample},
    workload::{BenchKey, Workload},
};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    Creation,
    SuccessfulLookup,
    FailedLookup,
    InsertionNew,
    InsertionUpdate,
    Deletion,
    DeletionMissing,
    Membership,
    Iteration,
}

impl Operation {
    pub const ALL: [Operation; 9] = [
        Operation::Creation,
        Operation::SuccessfulLookup,
        Operation::FailedLookup,
        Operation::InsertionUpdate,
        Operation::InsertionNew,
        Operation::Deletion,
        Operation::DeletionMissing,
        Operation::Membership,
        Operation::Iteration,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Creation => "Creation",
            Operation::SuccessfulLookup => "Successful Lookups",
            Operation::FailedLookup => "Failed Lookups",
            Operation::InsertionNew => "Insertion (New)",
            Operation::InsertionUpdate => "Insertion (Update)",
            Operation::Deletion => "Deletion",
            Operation::DeletionMissing => "Deletion (Missing)",
            Operation::Membership => "Membership",
            Operation::Iteration => "Iteration",
        }
    }

    /// Snake-case identifier used in flat result files.
    pub fn slug(&self) -> &'static str {
        match self {
            Operation::Creation => "creation",
            Operation::SuccessfulLookup => "lookup_success",
            Operation::FailedLookup => "lookup_fail",
            Operation::InsertionNew => "insert_new",
            Operation::InsertionUpdate => "insert_update",
            Operation::Deletion => "delete",
            Operation::DeletionMissing => "delete_missing",
            Operation::Membership => "membership",
            Operation::Iteration => "iterate",
        }
    }

    /// Measure this operation for container type `C` over `workload`.
    pub fn run<K, C>(self, workload: &Workload<K>, harness: &Harness) -> TimingSample
    where
        K: BenchKey,
        C: Container<K, u64>,
    {
        let keys = workload.keys();
        let populated = || C::construct_from_pairs(workload.pairs());
        match self {
            Operation::Creation => harness.measure(
                || workload.pairs(),
                |pairs| C::construct_from_pairs(std::mem::take(pairs)),
            ),
            Operation::SuccessfulLookup => harness.measure(populated, |container| {
                keys.iter()
                    .filter(|key| container.get(key).is_found())
                    .count()
            }),
            Operation::FailedLookup => {
                // Populated with even identities, probed with odd ones, both
                // spanning twice the workload size.
                let span = workload.len() as u64 * 2;
                let probes: Vec<K> = (1..span).step_by(2).map(|i| workload.mint(i)).collect();
                harness.measure(
                    || C::construct_from_pairs((0..span).step_by(2).map(|i| (workload.mint(i), i))),
                    |container| {
                        probes
                            .iter()
                            .filter(|key| matches!(container.get(key), Lookup::NotFound))
                            .count()
                    },
                )
            }
            Operation::InsertionNew => harness.measure(
                || (C::construct(), workload.pairs()),
                |(container, pairs)| {
                    for (key, value) in pairs.drain(..) {
                        container.set(key, value);
                    }
                    container.len()
                },
            ),
            Operation::InsertionUpdate => harness.measure(
                || {
                    let updates: Vec<_> = workload
                        .pairs()
                        .into_iter()
                        .map(|(key, value)| (key, value + 1))
                        .collect();
                    (populated(), updates)
                },
                |(container, updates)| {
                    for (key, value) in updates.drain(..) {
                        container.set(key, value);
                    }
                    container.len()
                },
            ),
            Operation::Deletion => harness.measure(populated, |container| {
                // Repeated random keys miss on their second delete.
                keys.iter()
                    .filter(|key| container.delete(key).is_found())
                    .count()
            }),
            Operation::DeletionMissing => {
                let probes: Vec<K> = (0..keys.len() as u64).map(|i| workload.absent(i)).collect();
                harness.measure(populated, |container| {
                    probes
                        .iter()
                        .filter(|key| matches!(container.delete(key), Lookup::NotFound))
                        .count()
                })
            }
            Operation::Membership => {
                let probes: Vec<K> = keys
                    .iter()
                    .enumerate()
                    .map(|(i, key)| {
                        if i % 2 == 0 {
                            key.clone()
                        } else {
                            workload.absent(i as u64)
                        }
                    })
                    .collect();
                harness.measure(populated, |container| {
                    probes.iter().filter(|key| container.contains(key)).count()
                })
            }
            Operation::Iteration => harness.measure(populated, |container| {
                let drained: Vec<(&K, &u64)> = container.iterate().collect();
                drained.len()
            }),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
