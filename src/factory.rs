//! The SFDD factory: node minting and the recursive set-algebra kernel.
//!
//! All nodes of a family live in one factory *island*: the factory pins the
//! two terminals, interns every internal node through a weak unique table,
//! and memoizes the recursive operations by operand identity. Nodes from
//! different factories must never be mixed.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::hash::Hash;
use std::rc::{Rc, Weak};

use log::trace;

use crate::cache::{Cache, OpKey, OpType, OperandsKey};
use crate::node::{Sfdd, SfddNode};
use crate::table::WeakTable;

/// Shared state of a factory island.
///
/// The factory exclusively owns `zero` and `one`; every other node is held
/// weakly by the unique table and stays alive only through external handles
/// (or through a live parent's `take`/`skip`, or through a cache entry).
pub(crate) struct FactoryRep<K> {
    unique: RefCell<WeakTable<SfddNode<K>>>,
    zero: Sfdd<K>,
    one: Sfdd<K>,
    /// Binary operation cache; commutative operations normalize their key.
    cache: RefCell<Cache<OpKey<K>, Sfdd<K>>>,
    /// N-ary union cache, keyed by the identity-set of the operands.
    union_all_cache: RefCell<Cache<OperandsKey<K>, Sfdd<K>>>,
}

/// The SFDD factory: mints canonical nodes and runs the set-algebra kernel.
///
/// Cloning a factory yields a handle to the same island.
///
/// # Example
///
/// ```
/// use sfdd_rs::SfddFactory;
///
/// let factory = SfddFactory::<u32>::new();
/// let a = factory.make([vec![1, 2]]);
/// let b = factory.make([vec![1, 3]]);
///
/// let both = factory.union(&a, &b);
/// assert_eq!(both.count(), 2);
/// assert_eq!(both, factory.make([vec![1, 2], vec![1, 3]]));
/// ```
pub struct SfddFactory<K> {
    pub(crate) rep: Rc<FactoryRep<K>>,
}

impl<K> Clone for SfddFactory<K> {
    fn clone(&self) -> Self {
        Self { rep: Rc::clone(&self.rep) }
    }
}

impl<K: Eq + Hash> Default for SfddFactory<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> SfddFactory<K> {
    /// Creates a factory with the default unique-table sizing.
    pub fn new() -> Self
    where
        K: Eq + Hash,
    {
        Self::with_capacity(10)
    }

    /// Creates a factory whose unique table starts with `2^bits` buckets.
    pub fn with_capacity(bits: usize) -> Self
    where
        K: Eq + Hash,
    {
        let rep = Rc::new_cyclic(|weak: &Weak<FactoryRep<K>>| FactoryRep {
            unique: RefCell::new(WeakTable::with_bucket_bits(bits)),
            zero: Sfdd(Rc::new(SfddNode::zero(weak.clone()))),
            one: Sfdd(Rc::new(SfddNode::one(weak.clone()))),
            cache: RefCell::new(Cache::new()),
            union_all_cache: RefCell::new(Cache::new()),
        });
        Self { rep }
    }

    pub(crate) fn from_rep(rep: Rc<FactoryRep<K>>) -> Self {
        Self { rep }
    }

    /// The rejecting terminal `⊥`: the empty family.
    pub fn zero(&self) -> Sfdd<K> {
        self.rep.zero.clone()
    }

    /// The accepting terminal `⊤`: the family `{∅}`.
    pub fn one(&self) -> Sfdd<K> {
        self.rep.one.clone()
    }

    /// The exact number of live internal nodes in this island.
    pub fn node_count(&self) -> usize {
        self.rep.unique.borrow().real_size()
    }

    /// The unique table's population overestimate (dead slots included).
    pub fn table_len(&self) -> usize {
        self.rep.unique.borrow().len()
    }

    /// Flushes all operation caches, releasing their strong references.
    pub fn clear_caches(&self)
    where
        K: Eq + Hash,
    {
        self.rep.cache.borrow_mut().clear();
        self.rep.union_all_cache.borrow_mut().clear();
    }
}

impl<K: Clone + Ord + Hash> SfddFactory<K> {
    // ========================================================================
    // Node Construction
    // ========================================================================

    /// Mints the canonical node `⟨key, take, skip⟩`.
    ///
    /// This is the only way internal nodes come into existence. If
    /// `take = ⊥`, the node collapses to `skip`.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not strictly smaller than a child root's key, or if
    /// a child was minted by a different factory.
    pub fn node(&self, key: K, take: Sfdd<K>, skip: Sfdd<K>) -> Sfdd<K> {
        if take.is_zero() {
            return skip;
        }

        if let Some(k) = take.key() {
            assert!(key < *k, "Ordering violation: the take child's key must be below the node's key");
        }
        if let Some(k) = skip.key() {
            assert!(key < *k, "Ordering violation: the skip child's key must be below the node's key");
        }
        assert!(
            take.same_factory(&self.rep) && skip.same_factory(&self.rep),
            "Children minted by a different factory"
        );

        let candidate = Rc::new(SfddNode::internal(key, take, skip, Rc::downgrade(&self.rep)));
        let (minted, canonical) =
            self.rep.unique.borrow_mut().insert_with(candidate, SfddNode::structural_eq);
        if minted {
            trace!("node: minted (count = {})", canonical.count);
        }
        Sfdd(canonical)
    }

    /// Builds the family denoted by a collection of sets.
    ///
    /// Each inner sequence is one member set: it is sorted ascending and
    /// deduplicated, then built bottom-up so its lowest key ends at the root.
    /// An empty inner sequence contributes the empty set (`⊤`).
    pub fn make<I, S>(&self, sequences: I) -> Sfdd<K>
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = K>,
    {
        let mut family = self.zero();
        for sequence in sequences {
            let mut keys: Vec<K> = sequence.into_iter().collect();
            keys.sort();
            keys.dedup();

            let mut member = self.one();
            for key in keys.into_iter().rev() {
                member = self.node(key, member, self.zero());
            }
            family = self.union(&family, &member);
        }
        family
    }

    // ========================================================================
    // Set-Theoretic Operations
    // ========================================================================

    /// Union: member sets in either family.
    pub fn union(&self, a: &Sfdd<K>, b: &Sfdd<K>) -> Sfdd<K> {
        if a.is_zero() || a == b {
            return b.clone();
        }
        if b.is_zero() {
            return a.clone();
        }

        let key = OpKey::commutative(OpType::Union, a, b);
        if let Some(result) = self.rep.cache.borrow().get(&key) {
            return result;
        }

        let result = if a.is_one() {
            let (bk, bt, bs) = b.parts();
            self.node(bk, bt, self.union(&bs, a))
        } else if b.is_one() {
            let (ak, at, asx) = a.parts();
            self.node(ak, at, self.union(&asx, b))
        } else {
            let (ak, at, asx) = a.parts();
            let (bk, bt, bsx) = b.parts();
            match bk.cmp(&ak) {
                Ordering::Greater => self.node(ak, at, self.union(&asx, b)),
                Ordering::Equal => self.node(ak, self.union(&at, &bt), self.union(&asx, &bsx)),
                Ordering::Less => self.node(bk, bt, self.union(&bsx, a)),
            }
        };

        self.rep.cache.borrow_mut().insert(key, result.clone());
        result
    }

    /// Intersection: member sets in both families.
    pub fn intersection(&self, a: &Sfdd<K>, b: &Sfdd<K>) -> Sfdd<K> {
        if a.is_zero() || a == b {
            return a.clone();
        }
        if b.is_zero() {
            return b.clone();
        }

        let key = OpKey::commutative(OpType::Intersection, a, b);
        if let Some(result) = self.rep.cache.borrow().get(&key) {
            return result;
        }

        let result = if a.is_one() {
            b.skip_most()
        } else if b.is_one() {
            a.skip_most()
        } else {
            let (ak, at, asx) = a.parts();
            let (bk, bt, bsx) = b.parts();
            match bk.cmp(&ak) {
                Ordering::Greater => self.intersection(&asx, b),
                Ordering::Equal => self.node(ak, self.intersection(&at, &bt), self.intersection(&asx, &bsx)),
                Ordering::Less => self.intersection(a, &bsx),
            }
        };

        self.rep.cache.borrow_mut().insert(key, result.clone());
        result
    }

    /// Symmetric difference: member sets in exactly one of the two families.
    pub fn symmetric_difference(&self, a: &Sfdd<K>, b: &Sfdd<K>) -> Sfdd<K> {
        if a.is_zero() {
            return b.clone();
        }
        if b.is_zero() {
            return a.clone();
        }
        if a == b {
            return self.zero();
        }

        let key = OpKey::commutative(OpType::SymmetricDifference, a, b);
        if let Some(result) = self.rep.cache.borrow().get(&key) {
            return result;
        }

        let result = if a.is_one() {
            let (bk, bt, bs) = b.parts();
            self.node(bk, bt, self.symmetric_difference(a, &bs))
        } else if b.is_one() {
            let (ak, at, asx) = a.parts();
            self.node(ak, at, self.symmetric_difference(&asx, b))
        } else {
            let (ak, at, asx) = a.parts();
            let (bk, bt, bsx) = b.parts();
            match bk.cmp(&ak) {
                Ordering::Greater => self.node(ak, at, self.symmetric_difference(&asx, b)),
                Ordering::Equal => self.node(
                    ak,
                    self.symmetric_difference(&at, &bt),
                    self.symmetric_difference(&asx, &bsx),
                ),
                Ordering::Less => self.node(bk, bt, self.symmetric_difference(a, &bsx)),
            }
        };

        self.rep.cache.borrow_mut().insert(key, result.clone());
        result
    }

    /// Subtraction: member sets of `a` that are not in `b`.
    pub fn subtracting(&self, a: &Sfdd<K>, b: &Sfdd<K>) -> Sfdd<K> {
        if a.is_zero() || b.is_zero() {
            return a.clone();
        }
        if a == b {
            return self.zero();
        }

        let key = OpKey::ordered(OpType::Subtraction, a, b);
        if let Some(result) = self.rep.cache.borrow().get(&key) {
            return result;
        }

        let result = if a.is_one() {
            if b.skip_most().is_one() {
                self.zero()
            } else {
                a.clone()
            }
        } else if b.is_one() {
            let (ak, at, asx) = a.parts();
            self.node(ak, at, self.subtracting(&asx, b))
        } else {
            let (ak, at, asx) = a.parts();
            let (bk, bt, bsx) = b.parts();
            match bk.cmp(&ak) {
                Ordering::Greater => self.node(ak, at, self.subtracting(&asx, b)),
                Ordering::Equal => self.node(ak, self.subtracting(&at, &bt), self.subtracting(&asx, &bsx)),
                Ordering::Less => self.subtracting(a, &bsx),
            }
        };

        self.rep.cache.borrow_mut().insert(key, result.clone());
        result
    }

    /// N-ary union of an operand collection.
    ///
    /// `⊥` operands and duplicates (by identity) are dropped, a `⊤` is set
    /// aside, the remaining operands are grouped by root key and merged per
    /// group, and the per-key roots are folded into a single spine in strictly
    /// increasing root-key order, terminals last. The result is cached under
    /// the identity-set of the full operand collection.
    pub fn union_all<I>(&self, operands: I) -> Sfdd<K>
    where
        I: IntoIterator<Item = Sfdd<K>>,
    {
        let operands: Vec<Sfdd<K>> = operands.into_iter().collect();
        let key = OperandsKey::new(&operands);
        if let Some(result) = self.rep.union_all_cache.borrow().get(&key) {
            return result;
        }

        let mut tail = self.zero();
        let mut roots: Vec<Sfdd<K>> = Vec::new();
        for y in key.operands() {
            if y.is_zero() {
                continue;
            }
            if y.is_one() {
                tail = self.one();
                continue;
            }
            roots.push(y.clone());
        }
        roots.sort_by(|x, y| x.key().cmp(&y.key()));

        // Merge groups sharing a root key into a single per-key root.
        let mut merged: Vec<Sfdd<K>> = Vec::new();
        let mut start = 0;
        while start < roots.len() {
            let mut end = start + 1;
            while end < roots.len() && roots[end].key() == roots[start].key() {
                end += 1;
            }
            if end - start == 1 {
                merged.push(roots[start].clone());
            } else {
                let group = &roots[start..end];
                let take_operands: Vec<Sfdd<K>> = group.iter().map(|y| y.parts().1).collect();
                let skip_operands: Vec<Sfdd<K>> = group.iter().map(|y| y.parts().2).collect();
                let takes = self.union_all(take_operands);
                let skips = self.union_all(skip_operands);
                let (k, _, _) = group[0].parts();
                merged.push(self.node(k, takes, skips));
            }
            start = end;
        }

        // Fold the spine: each root key is strictly above everything folded
        // so far, so only the skip branch grows.
        let mut result = tail;
        for y in merged.into_iter().rev() {
            let (k, t, s) = y.parts();
            result = self.node(k, t, self.union(&s, &result));
        }

        self.rep.union_all_cache.borrow_mut().insert(key, result.clone());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_make_canonicity() {
        let factory = SfddFactory::<u32>::new();

        // The same family built in different orders is the same node.
        let a = factory.make([vec![1, 2], vec![1]]);
        let b = factory.make([vec![1], vec![2, 1]]);
        assert_eq!(a, b);

        // Duplicate member sets collapse.
        let c = factory.make([vec![1], vec![1], vec![1, 2]]);
        assert_eq!(a, c);
        assert_eq!(c.count(), 2);
    }

    #[test]
    fn test_make_empty_sequences() {
        let factory = SfddFactory::<u32>::new();

        let empty: [Vec<u32>; 0] = [];
        assert!(factory.make(empty).is_zero());

        // An empty member set yields ⊤.
        let only_empty = factory.make([Vec::<u32>::new()]);
        assert_eq!(only_empty, factory.one());
    }

    #[test]
    fn test_node_reduction_and_uniquing() {
        let factory = SfddFactory::<u32>::new();

        // take = ⊥ collapses to skip.
        let skip = factory.make([vec![5]]);
        let reduced = factory.node(1, factory.zero(), skip.clone());
        assert_eq!(reduced, skip);

        // Repeated construction returns the identical node.
        let a = factory.node(1, factory.one(), factory.zero());
        let b = factory.node(1, factory.one(), factory.zero());
        assert_eq!(a, b);
    }

    #[test]
    #[should_panic(expected = "Ordering violation")]
    fn test_node_ordering_violation() {
        let factory = SfddFactory::<u32>::new();
        let inner = factory.node(1, factory.one(), factory.zero());
        // 2 is not below the child's root key 1.
        let _ = factory.node(2, inner, factory.zero());
    }

    #[test]
    #[should_panic(expected = "different factory")]
    fn test_node_rejects_foreign_children() {
        let factory = SfddFactory::<u32>::new();
        let other = SfddFactory::<u32>::new();
        // A structurally fine child from another island must still be refused.
        let foreign = other.node(2, other.one(), other.zero());
        let _ = factory.node(1, foreign, factory.zero());
    }

    #[test]
    fn test_union() {
        let factory = SfddFactory::<u32>::new();
        let a = factory.make([vec![1, 2]]);
        let b = factory.make([vec![1, 3]]);

        let u = factory.union(&a, &b);
        assert_eq!(u, factory.make([vec![1, 2], vec![1, 3]]));
        assert_eq!(u.count(), 2);

        assert_eq!(factory.union(&a, &a), a);
        assert_eq!(factory.union(&a, &factory.zero()), a);
        assert_eq!(factory.union(&factory.zero(), &a), a);

        // ⊤ adds the empty set.
        let with_empty = factory.union(&a, &factory.one());
        assert_eq!(with_empty.count(), 2);
        assert!(with_empty.contains(&[]));
    }

    #[test]
    fn test_intersection() {
        let factory = SfddFactory::<u32>::new();
        let a = factory.make([vec![1, 2, 3]]);
        let b = factory.make([vec![1, 2, 3], vec![1]]);

        assert_eq!(factory.intersection(&a, &b), a);
        assert_eq!(factory.intersection(&a, &a), a);
        assert!(factory.intersection(&a, &factory.zero()).is_zero());

        // ⊤ keeps only the empty set.
        assert!(factory.intersection(&a, &factory.one()).is_zero());
        let with_empty = factory.make([vec![1], vec![]]);
        assert_eq!(factory.intersection(&with_empty, &factory.one()), factory.one());
    }

    #[test]
    fn test_symmetric_difference() {
        let factory = SfddFactory::<u32>::new();
        let a = factory.make([vec![1, 2]]);
        let b = factory.make([vec![1, 2], vec![3]]);

        assert_eq!(factory.symmetric_difference(&a, &b), factory.make([vec![3]]));
        assert!(factory.symmetric_difference(&a, &a).is_zero());
        assert_eq!(factory.symmetric_difference(&a, &factory.zero()), a);
    }

    #[test]
    fn test_subtracting() {
        let factory = SfddFactory::<u32>::new();
        let a = factory.make([vec![1, 2], vec![1, 3]]);
        let b = factory.make([vec![1, 2]]);

        assert_eq!(factory.subtracting(&a, &b), factory.make([vec![1, 3]]));
        assert!(factory.subtracting(&a, &a).is_zero());
        assert_eq!(factory.subtracting(&a, &factory.zero()), a);

        // Subtracting ⊤ removes exactly the empty set.
        let with_empty = factory.make([vec![1], vec![]]);
        assert_eq!(factory.subtracting(&with_empty, &factory.one()), factory.make([vec![1]]));
        assert!(factory.subtracting(&factory.one(), &with_empty).is_zero());
    }

    #[test]
    fn test_union_all() {
        let factory = SfddFactory::<u32>::new();
        let a = factory.make([vec![1, 2]]);
        let b = factory.make([vec![1, 3]]);
        let c = factory.make([vec![2]]);

        let all = factory.union_all([a.clone(), b.clone(), c.clone(), factory.one(), factory.zero()]);
        let expected = factory.make([vec![1, 2], vec![1, 3], vec![2], vec![]]);
        assert_eq!(all, expected);

        // Duplicates by identity are dropped.
        assert_eq!(factory.union_all([a.clone(), a.clone()]), a);

        // Degenerate collections.
        assert!(factory.union_all([]).is_zero());
        assert_eq!(factory.union_all([factory.one()]), factory.one());
    }

    #[test]
    fn test_node_count_and_eviction() {
        let factory = SfddFactory::<u32>::new();
        assert_eq!(factory.node_count(), 0);

        let family = factory.make([vec![1, 2], vec![1]]);
        assert!(factory.node_count() > 0);
        assert!(factory.table_len() >= factory.node_count());

        // Caches pin intermediate results; once flushed, dropping the last
        // handle lets the island shrink back to nothing.
        drop(family);
        factory.clear_caches();
        assert_eq!(factory.node_count(), 0);
    }
}
