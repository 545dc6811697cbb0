//! Workload generation.
//!
//! A [Workload] owns the ordered keys fed to one benchmark cell, along with a
//! way to mint keys outside of that set (for probes that must miss).

use crate::{
    collision::{make_collision_key, CollisionKey, CollisionMode},
    Error, Result,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{fmt, hash::Hash, rc::Rc, str::FromStr};

/// Length of every generated string key.
pub const STRING_KEY_LEN: usize = 8;

/// Alphabet string keys are drawn from.
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Random integers are drawn from `[0, size * RANDOM_INT_SPREAD)`.
const RANDOM_INT_SPREAD: u64 = 10;

/// Anything usable as a key by the catalog and by every built-in container.
pub trait BenchKey: Hash + Eq + Ord + Clone + fmt::Debug + 'static {}

impl<T: Hash + Eq + Ord + Clone + fmt::Debug + 'static> BenchKey for T {}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Int(u64),
    Str(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{i}"),
            Key::Str(s) => write!(f, "{s:?}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyType {
    Sequential,
    RandomInt,
    RandomString,
}

impl KeyType {
    pub const ALL: [KeyType; 3] = [
        KeyType::Sequential,
        KeyType::RandomInt,
        KeyType::RandomString,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            KeyType::Sequential => "sequential",
            KeyType::RandomInt => "random_ints",
            KeyType::RandomString => "random_strings",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "sequential" | "seq" => Ok(KeyType::Sequential),
            "random_ints" | "random_int" => Ok(KeyType::RandomInt),
            "random_strings" | "random_string" => Ok(KeyType::RandomString),
            other => Err(Error::InvalidWorkload(format!("unknown key type: {other}"))),
        }
    }
}

/// Which key population a workload was built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Distribution {
    Keys(KeyType),
    Collision(CollisionMode),
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distribution::Keys(key_type) => key_type.fmt(f),
            Distribution::Collision(mode) => mode.fmt(f),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Descriptor {
    pub distribution: Distribution,
    pub size: usize,
    pub seed: Option<u64>,
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} n={}", self.distribution, self.size)?;
        if let Some(seed) = self.seed {
            write!(f, " seed={seed}")?;
        }
        Ok(())
    }
}

/// An immutable, ordered key sequence for one benchmark run.
pub struct Workload<K> {
    descriptor: Descriptor,
    keys: Vec<K>,
    mint: Rc<dyn Fn(u64) -> K>,
}

impl<K: BenchKey> Workload<K> {
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Key with the given integer identity, independent of the generated set.
    pub fn mint(&self, index: u64) -> K {
        (self.mint)(index)
    }

    /// Key guaranteed absent from the generated set.
    pub fn absent(&self, index: u64) -> K {
        self.mint(self.keys.len() as u64 * RANDOM_INT_SPREAD + index)
    }

    /// Each key paired with its position, the value stored by the catalog.
    pub fn pairs(&self) -> Vec<(K, u64)> {
        self.keys
            .iter()
            .cloned()
            .zip(0u64..)
            .collect()
    }
}

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn random_string(rng: &mut StdRng) -> String {
    (0..STRING_KEY_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Generate `size` keys of `key_type`.
///
/// Seeded generation is deterministic. Random integers may repeat.
pub fn generate(key_type: KeyType, size: usize, seed: Option<u64>) -> Result<Workload<Key>> {
    if size == 0 {
        return Err(Error::InvalidWorkload("size must be positive".into()));
    }
    let keys = match key_type {
        KeyType::Sequential => (0..size as u64).map(Key::Int).collect(),
        KeyType::RandomInt => {
            let mut rng = rng(seed);
            let bound = size as u64 * RANDOM_INT_SPREAD;
            (0..size).map(|_| Key::Int(rng.gen_range(0..bound))).collect()
        }
        KeyType::RandomString => {
            let mut rng = rng(seed);
            (0..size).map(|_| Key::Str(random_string(&mut rng))).collect()
        }
    };
    Ok(Workload {
        descriptor: Descriptor {
            distribution: Distribution::Keys(key_type),
            size,
            seed,
        },
        keys,
        mint: Rc::new(Key::Int),
    })
}

/// Build a workload of collision keys with identities `0..size`.
pub fn collisions(size: usize, mode: CollisionMode) -> Result<Workload<CollisionKey>> {
    if size == 0 {
        return Err(Error::InvalidWorkload("size must be positive".into()));
    }
    Ok(Workload {
        descriptor: Descriptor {
            distribution: Distribution::Collision(mode),
            size,
            seed: None,
        },
        keys: (0..size as u64)
            .map(|i| make_collision_key(i, mode))
            .collect(),
        mint: Rc::new(move |i| make_collision_key(i, mode)),
    })
}
