//! Operation caches for the set-algebra kernel.
//!
//! Results of the recursive operations are memoized by operand *identity*:
//! cache keys hold strong handles, so a cached operand tuple keeps its nodes
//! (and therefore its addresses) valid for the cache's lifetime.

use std::collections::HashMap;
use std::hash::Hash;

use crate::node::Sfdd;

/// Binary operations of the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpType {
    Union,
    Intersection,
    SymmetricDifference,
    Subtraction,
}

/// Cache key for a binary operation.
#[derive(PartialEq, Eq, Hash)]
pub struct OpKey<K> {
    op: OpType,
    a: Sfdd<K>,
    b: Sfdd<K>,
}

impl<K> OpKey<K> {
    /// Key for a commutative operation: operand order is normalized by node
    /// address, so `{a, b}` and `{b, a}` collide.
    pub fn commutative(op: OpType, a: &Sfdd<K>, b: &Sfdd<K>) -> Self {
        let (a, b) = if a.addr() <= b.addr() { (a, b) } else { (b, a) };
        Self { op, a: a.clone(), b: b.clone() }
    }

    /// Key for a non-commutative operation (subtraction).
    pub fn ordered(op: OpType, a: &Sfdd<K>, b: &Sfdd<K>) -> Self {
        Self { op, a: a.clone(), b: b.clone() }
    }
}

/// Cache key for the n-ary union: the identity-set of the operand collection.
#[derive(PartialEq, Eq, Hash)]
pub struct OperandsKey<K>(Vec<Sfdd<K>>);

impl<K> OperandsKey<K> {
    /// Builds the key: operands sorted by address and deduplicated by identity.
    pub fn new(operands: &[Sfdd<K>]) -> Self {
        let mut operands: Vec<Sfdd<K>> = operands.to_vec();
        operands.sort_by_key(Sfdd::addr);
        operands.dedup();
        Self(operands)
    }

    /// The deduplicated operands.
    pub fn operands(&self) -> &[Sfdd<K>] {
        &self.0
    }
}

/// A memoization cache backed by a `HashMap`.
#[derive(Debug)]
pub struct Cache<Key, V> {
    map: HashMap<Key, V>,
}

impl<Key: Eq + Hash, V: Clone> Cache<Key, V> {
    /// Creates a new empty cache.
    pub fn new() -> Self {
        Self { map: HashMap::new() }
    }

    /// Looks up a cached result.
    pub fn get(&self, key: &Key) -> Option<V> {
        self.map.get(key).cloned()
    }

    /// Inserts a result into the cache.
    pub fn insert(&mut self, key: Key, value: V) {
        self.map.insert(key, value);
    }

    /// Clears the cache.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<Key: Eq + Hash, V: Clone> Default for Cache<Key, V> {
    fn default() -> Self {
        Self::new()
    }
}
