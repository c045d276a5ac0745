//! The SFDD node type and the [`Sfdd`] handle.
//!
//! Nodes are immutable and canonical: they are only minted by
//! [`SfddFactory::node`][crate::factory::SfddFactory::node], which interns
//! them through the factory's weak unique table. Handle equality is pointer
//! identity, and canonicity makes that coincide with semantic equality.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use crate::factory::{FactoryRep, SfddFactory};
use crate::iter::SetIterator;
use crate::utils::{pairing2, pairing3, MyHash};

/// The shape of a node.
///
/// # Semantics
///
/// An internal node represents the family:
/// ```text
/// F(node) = {S ∪ {key} | S ∈ F(take)} ∪ F(skip)
/// ```
///
/// - `take` branch: member sets containing `key` (stored without `key`)
/// - `skip` branch: member sets not containing `key`
pub(crate) enum NodeKind<K> {
    /// The rejecting terminal `⊥`: the empty family.
    Zero,
    /// The accepting terminal `⊤`: the family `{∅}`.
    One,
    /// A decision on `key`.
    Internal { key: K, take: Sfdd<K>, skip: Sfdd<K> },
}

/// An SFDD node.
///
/// # Invariants
///
/// - `key` is strictly smaller than the keys of both children's roots.
/// - `take` is never `⊥`; the factory reduces such nodes to their `skip`.
/// - `count` is the number of member sets.
/// - `hash` is a deep structural fingerprint over `(key, take, skip, count)`,
///   precomputed at mint time; children contribute their own fingerprint.
pub struct SfddNode<K> {
    pub(crate) kind: NodeKind<K>,
    pub(crate) count: u64,
    pub(crate) hash: u64,
    /// Non-owning back-reference to the factory that minted this node.
    pub(crate) factory: Weak<FactoryRep<K>>,
}

impl<K> SfddNode<K> {
    const ZERO_HASH: u64 = 0x9e37_79b9_7f4a_7c15;
    const ONE_HASH: u64 = 0xd1b5_4a32_d192_ed03;

    pub(crate) fn zero(factory: Weak<FactoryRep<K>>) -> Self {
        Self {
            kind: NodeKind::Zero,
            count: 0,
            hash: Self::ZERO_HASH,
            factory,
        }
    }

    pub(crate) fn one(factory: Weak<FactoryRep<K>>) -> Self {
        Self {
            kind: NodeKind::One,
            count: 1,
            hash: Self::ONE_HASH,
            factory,
        }
    }

    pub(crate) fn internal(key: K, take: Sfdd<K>, skip: Sfdd<K>, factory: Weak<FactoryRep<K>>) -> Self
    where
        K: Hash,
    {
        let count = take.count() + skip.count();
        let hash = Self::compute_hash(&key, &take, &skip, count);
        Self {
            kind: NodeKind::Internal { key, take, skip },
            count,
            hash,
            factory,
        }
    }

    /// Computes the deep fingerprint from `(key, take, skip, count)`.
    fn compute_hash(key: &K, take: &Sfdd<K>, skip: &Sfdd<K>, count: u64) -> u64
    where
        K: Hash,
    {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let key_hash = hasher.finish();
        pairing3(key_hash, pairing2(take.node_hash(), skip.node_hash()), count)
    }

    /// Structural equality used by the unique table: the key by value, the
    /// children by identity.
    pub(crate) fn structural_eq(&self, other: &Self) -> bool
    where
        K: PartialEq,
    {
        match (&self.kind, &other.kind) {
            (NodeKind::Zero, NodeKind::Zero) => true,
            (NodeKind::One, NodeKind::One) => true,
            (
                NodeKind::Internal { key: k1, take: t1, skip: s1 },
                NodeKind::Internal { key: k2, take: t2, skip: s2 },
            ) => self.count == other.count && k1 == k2 && t1 == t2 && s1 == s2,
            _ => false,
        }
    }
}

impl<K> MyHash for SfddNode<K> {
    fn hash(&self) -> u64 {
        self.hash
    }
}

/// A handle to a canonical SFDD node.
///
/// Cloning a handle is cheap (reference-counted). Two handles compare equal
/// iff they point to the very same node, which by canonicity means the two
/// families are equal.
pub struct Sfdd<K>(pub(crate) Rc<SfddNode<K>>);

impl<K> Clone for Sfdd<K> {
    fn clone(&self) -> Self {
        Sfdd(Rc::clone(&self.0))
    }
}

impl<K> PartialEq for Sfdd<K> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<K> Eq for Sfdd<K> {}

impl<K> Hash for Sfdd<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

impl<K> Sfdd<K> {
    /// Returns true if this is the empty family `⊥`.
    pub fn is_zero(&self) -> bool {
        matches!(self.0.kind, NodeKind::Zero)
    }

    /// Returns true if this is the `{∅}` family `⊤`.
    pub fn is_one(&self) -> bool {
        matches!(self.0.kind, NodeKind::One)
    }

    /// Returns true if this is a terminal.
    pub fn is_terminal(&self) -> bool {
        !matches!(self.0.kind, NodeKind::Internal { .. })
    }

    /// Returns true if the family contains no member set.
    pub fn is_empty(&self) -> bool {
        self.is_zero()
    }

    /// The number of member sets.
    pub fn count(&self) -> u64 {
        self.0.count
    }

    /// The decision key, or `None` for terminals.
    pub fn key(&self) -> Option<&K> {
        match &self.0.kind {
            NodeKind::Internal { key, .. } => Some(key),
            _ => None,
        }
    }

    /// The take child (member sets containing the key), or `None` for terminals.
    pub fn take(&self) -> Option<Sfdd<K>> {
        match &self.0.kind {
            NodeKind::Internal { take, .. } => Some(take.clone()),
            _ => None,
        }
    }

    /// The skip child (member sets not containing the key), or `None` for terminals.
    pub fn skip(&self) -> Option<Sfdd<K>> {
        match &self.0.kind {
            NodeKind::Internal { skip, .. } => Some(skip.clone()),
            _ => None,
        }
    }

    /// The terminal reached by following `skip` links.
    ///
    /// Equals `⊤` iff the family contains the empty set.
    pub fn skip_most(&self) -> Sfdd<K> {
        let mut current = self.clone();
        loop {
            let next = match &current.0.kind {
                NodeKind::Internal { skip, .. } => skip.clone(),
                _ => break,
            };
            current = next;
        }
        current
    }

    /// Decomposes an internal node into `(key, take, skip)`.
    pub(crate) fn parts(&self) -> (K, Sfdd<K>, Sfdd<K>)
    where
        K: Clone,
    {
        match &self.0.kind {
            NodeKind::Internal { key, take, skip } => (key.clone(), take.clone(), skip.clone()),
            _ => unreachable!("terminal node has no decomposition"),
        }
    }

    /// The node's precomputed deep fingerprint.
    pub(crate) fn node_hash(&self) -> u64 {
        self.0.hash
    }

    /// The node's address, used to normalize commutative cache keys.
    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    /// Resolves the factory this node belongs to.
    ///
    /// # Panics
    ///
    /// Panics if the factory was dropped while the node handle outlived it.
    pub(crate) fn factory(&self) -> SfddFactory<K> {
        let rep = self.0.factory.upgrade().expect("node used after its factory was dropped");
        SfddFactory::from_rep(rep)
    }

    /// Returns true if this node was minted by the factory behind `rep`.
    pub(crate) fn same_factory(&self, rep: &Rc<FactoryRep<K>>) -> bool {
        std::ptr::eq(self.0.factory.as_ptr(), Rc::as_ptr(rep))
    }
}

impl<K: Clone + Ord + Hash> Sfdd<K> {
    /// Returns true if `set` is a member of the family.
    ///
    /// Keys strictly below the current root level cannot appear in any member
    /// set below it, so the walk descends `skip` and fails with keys left
    /// unconsumed.
    pub fn contains(&self, set: &[K]) -> bool {
        let mut keys: Vec<K> = set.to_vec();
        keys.sort();
        keys.dedup();

        let mut current = self.clone();
        let mut index = 0;
        loop {
            let next = match &current.0.kind {
                NodeKind::Internal { key, take, skip } if index < keys.len() => {
                    if keys[index] == *key {
                        index += 1;
                        take.clone()
                    } else {
                        skip.clone()
                    }
                }
                _ => break,
            };
            current = next;
        }
        index == keys.len() && current.skip_most().is_one()
    }

    /// Union of families: member sets in either.
    pub fn union(&self, other: &Sfdd<K>) -> Sfdd<K> {
        self.factory().union(self, other)
    }

    /// Intersection of families: member sets in both.
    pub fn intersection(&self, other: &Sfdd<K>) -> Sfdd<K> {
        self.factory().intersection(self, other)
    }

    /// Symmetric difference: member sets in exactly one of the two families.
    pub fn symmetric_difference(&self, other: &Sfdd<K>) -> Sfdd<K> {
        self.factory().symmetric_difference(self, other)
    }

    /// Subtraction: member sets of `self` that are not in `other`.
    pub fn subtracting(&self, other: &Sfdd<K>) -> Sfdd<K> {
        self.factory().subtracting(self, other)
    }
}

impl<K: Clone> Sfdd<K> {
    /// Returns a fresh cursor over the member sets.
    pub fn iter(&self) -> SetIterator<K> {
        SetIterator::new(self)
    }
}

impl<K: Clone> IntoIterator for &Sfdd<K> {
    type Item = Vec<K>;
    type IntoIter = SetIterator<K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: fmt::Debug> fmt::Debug for Sfdd<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.0.kind {
            NodeKind::Zero => write!(f, "⊥"),
            NodeKind::One => write!(f, "⊤"),
            NodeKind::Internal { key, take, skip } => {
                write!(f, "⟨{:?}, take: {:?}, skip: {:?}⟩", key, take, skip)
            }
        }
    }
}

impl<K: Clone + Display> Display for Sfdd<K> {
    /// Renders the family in extension, e.g. `{{1,2},{1}}`.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, set) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{{")?;
            for (j, key) in set.iter().enumerate() {
                if j > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", key)?;
            }
            write!(f, "}}")?;
        }
        write!(f, "}}")
    }
}
