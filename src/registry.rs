//! Resolution of implementation names to subjects.

use crate::{
    analyzer::{Implementation, Subject},
    container::LinearMap,
    workload::BenchKey,
    Error, Result,
};
use std::collections::{BTreeMap, HashMap as StdHashMap};

/// Names of every built-in implementation, in default comparison order.
pub const BUILTIN: [&str; 4] = ["std", "hashbrown", "btree", "linear"];

/// Implementations compared when none are requested.
pub const DEFAULT: [&str; 2] = ["std", "hashbrown"];

pub fn resolve<K: BenchKey>(name: &str) -> Result<Box<dyn Subject<K>>> {
    let subject: Box<dyn Subject<K>> = match name {
        "std" => Box::new(Implementation::<StdHashMap<K, u64>>::new(name)),
        "hashbrown" => Box::new(Implementation::<hashbrown::HashMap<K, u64>>::new(name)),
        "btree" => Box::new(Implementation::<BTreeMap<K, u64>>::new(name)),
        "linear" => Box::new(Implementation::<LinearMap<K, u64>>::new(name)),
        other => {
            return Err(Error::ContainerUnavailable(format!(
                "unknown implementation {other:?} (known: {})",
                BUILTIN.join(", ")
            )))
        }
    };
    Ok(subject)
}

pub fn resolve_all<K: BenchKey, S: AsRef<str>>(names: &[S]) -> Result<Vec<Box<dyn Subject<K>>>> {
    names.iter().map(|name| resolve(name.as_ref())).collect()
}
