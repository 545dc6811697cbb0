//! The capability interface every container-under-test implements, and the
//! adapters for the built-in subjects.

use crate::{Error, Result};
use std::{
    collections::{BTreeMap, HashMap as StdHashMap},
    hash::Hash,
};

/// Outcome of a keyed access that may legitimately miss.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn into_result(self) -> Result<T> {
        match self {
            Lookup::Found(value) => Ok(value),
            Lookup::NotFound => Err(Error::KeyNotFound),
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Lookup::Found(value),
            None => Lookup::NotFound,
        }
    }
}

/// An associative container that can be benchmarked.
pub trait Container<K, V>: Sized {
    fn construct_from_pairs<I: IntoIterator<Item = (K, V)>>(pairs: I) -> Self;

    fn construct() -> Self {
        Self::construct_from_pairs(std::iter::empty())
    }

    fn get(&self, key: &K) -> Lookup<&V>;

    fn contains(&self, key: &K) -> bool;

    /// Insert `key`, overwriting any previous value.
    fn set(&mut self, key: K, value: V);

    fn delete(&mut self, key: &K) -> Lookup<V>;

    /// Every entry exactly once, in container order.
    fn iterate<'a>(&'a self) -> impl Iterator<Item = (&'a K, &'a V)>
    where
        K: 'a,
        V: 'a;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Hash + Eq, V> Container<K, V> for StdHashMap<K, V> {
    fn construct_from_pairs<I: IntoIterator<Item = (K, V)>>(pairs: I) -> Self {
        pairs.into_iter().collect()
    }

    fn get(&self, key: &K) -> Lookup<&V> {
        StdHashMap::get(self, key).into()
    }

    fn contains(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    fn set(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn delete(&mut self, key: &K) -> Lookup<V> {
        self.remove(key).into()
    }

    fn iterate<'a>(&'a self) -> impl Iterator<Item = (&'a K, &'a V)>
    where
        K: 'a,
        V: 'a,
    {
        self.iter()
    }

    fn len(&self) -> usize {
        StdHashMap::len(self)
    }
}

impl<K: Hash + Eq, V> Container<K, V> for hashbrown::HashMap<K, V> {
    fn construct_from_pairs<I: IntoIterator<Item = (K, V)>>(pairs: I) -> Self {
        pairs.into_iter().collect()
    }

    fn get(&self, key: &K) -> Lookup<&V> {
        hashbrown::HashMap::get(self, key).into()
    }

    fn contains(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    fn set(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn delete(&mut self, key: &K) -> Lookup<V> {
        self.remove(key).into()
    }

    fn iterate<'a>(&'a self) -> impl Iterator<Item = (&'a K, &'a V)>
    where
        K: 'a,
        V: 'a,
    {
        self.iter()
    }

    fn len(&self) -> usize {
        hashbrown::HashMap::len(self)
    }
}

impl<K: Ord, V> Container<K, V> for BTreeMap<K, V> {
    fn construct_from_pairs<I: IntoIterator<Item = (K, V)>>(pairs: I) -> Self {
        pairs.into_iter().collect()
    }

    fn get(&self, key: &K) -> Lookup<&V> {
        BTreeMap::get(self, key).into()
    }

    fn contains(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    fn set(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn delete(&mut self, key: &K) -> Lookup<V> {
        self.remove(key).into()
    }

    fn iterate<'a>(&'a self) -> impl Iterator<Item = (&'a K, &'a V)>
    where
        K: 'a,
        V: 'a,
    {
        self.iter()
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }
}

/// Association list with linear probing over a flat vector.
///
/// Every access scans from the front, so it is the baseline hashed containers
/// are expected to beat by a wide margin on membership.
#[derive(Clone, Debug, Default)]
pub struct LinearMap<K, V> {
    entries: Vec<(K, V)>,
}

impl<K: Eq, V> LinearMap<K, V> {
    fn position(&self, key: &K) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

impl<K: Eq, V> Container<K, V> for LinearMap<K, V> {
    fn construct_from_pairs<I: IntoIterator<Item = (K, V)>>(pairs: I) -> Self {
        let mut map = LinearMap {
            entries: Vec::new(),
        };
        for (key, value) in pairs {
            map.set(key, value);
        }
        map
    }

    fn get(&self, key: &K) -> Lookup<&V> {
        self.position(key).map(|i| &self.entries[i].1).into()
    }

    fn contains(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    fn set(&mut self, key: K, value: V) {
        match self.position(&key) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((key, value)),
        }
    }

    fn delete(&mut self, key: &K) -> Lookup<V> {
        self.position(key)
            .map(|i| self.entries.swap_remove(i).1)
            .into()
    }

    fn iterate<'a>(&'a self) -> impl Iterator<Item = (&'a K, &'a V)>
    where
        K: 'a,
        V: 'a,
    {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
