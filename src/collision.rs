//! Keys whose hash is decoupled from their identity.
//!
//! A [CollisionKey] feeds only its surrogate to [Hasher], while equality and
//! ordering look only at the identity. Any container that hashes through [Hash]
//! therefore sees the bucket layout chosen by the [CollisionMode], with no
//! special-case code on the container side.

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    num::NonZeroU64,
};

/// Surrogate reported by every key under [CollisionMode::Constant].
pub const CONSTANT_SURROGATE: u64 = 42;

/// Bucket count used for "poor but not degenerate" hashing when none is given.
pub const DEFAULT_BUCKETS: NonZeroU64 = match NonZeroU64::new(10) {
    Some(buckets) => buckets,
    None => panic!("bucket count must be non-zero"),
};

/// How a [CollisionKey] derives its hash surrogate from its identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionMode {
    /// Every key lands in the same bucket chain.
    Constant,
    /// Keys are spread over exactly `K` buckets (`identity % K`).
    Modulo(NonZeroU64),
}

impl CollisionMode {
    pub fn surrogate(&self, identity: u64) -> u64 {
        match self {
            CollisionMode::Constant => CONSTANT_SURROGATE,
            CollisionMode::Modulo(buckets) => identity % buckets.get(),
        }
    }
}

impl fmt::Display for CollisionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionMode::Constant => write!(f, "collide-constant"),
            CollisionMode::Modulo(k) => write!(f, "collide-mod{k}"),
        }
    }
}

#[derive(Clone, Copy)]
pub struct CollisionKey {
    identity: u64,
    surrogate: u64,
}

impl CollisionKey {
    pub fn new(identity: u64, surrogate: u64) -> Self {
        Self {
            identity,
            surrogate,
        }
    }

    pub fn identity(&self) -> u64 {
        self.identity
    }

    pub fn surrogate(&self) -> u64 {
        self.surrogate
    }
}

/// Build a key for `identity` whose surrogate follows `mode`.
pub fn make_collision_key(identity: u64, mode: CollisionMode) -> CollisionKey {
    CollisionKey::new(identity, mode.surrogate(identity))
}

impl PartialEq for CollisionKey {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for CollisionKey {}

impl PartialOrd for CollisionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CollisionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity.cmp(&other.identity)
    }
}

impl Hash for CollisionKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.surrogate.hash(state);
    }
}

impl fmt::Debug for CollisionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CollisionKey({})", self.identity)
    }
}
