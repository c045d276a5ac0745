//! The homomorphism algebra: composable transformers over SFDD nodes.
//!
//! A homomorphism is a function from nodes to nodes. Instances are minted by
//! a [`HomFactory`], which interns them through a second weak unique table so
//! that structurally-equal homomorphisms are identical references — equality
//! checks in the optimizer are pointer comparisons. Every instance carries
//! its own application cache keyed by input node identity.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use log::trace;

use crate::factory::SfddFactory;
use crate::node::{NodeKind, Sfdd};
use crate::table::WeakTable;
use crate::utils::MyHash;

/// The user-supplied recursion scheme of an inductive homomorphism: given the
/// homomorphism itself and an internal node, produce the transformers for the
/// `take` and `skip` branches.
pub type InductiveStep<K> = dyn Fn(&Hom<K>, &Sfdd<K>) -> (Hom<K>, Hom<K>);

/// The shape of a homomorphism.
pub(crate) enum HomKind<K> {
    /// `φ(y) = y`.
    Identity,
    /// `φ(y) = c`.
    Constant(Sfdd<K>),
    /// `φ(y) = ⋃ᵢ φᵢ(y)`.
    Union(Vec<Hom<K>>),
    /// `φ(y) = ⋂ᵢ φᵢ(y)`.
    Intersection(Vec<Hom<K>>),
    /// `φ(y) = φₙ(…(φ₁(y))…)`: left-to-right application.
    Composition(Vec<Hom<K>>),
    /// Iterates the body until a fixed point is reached under node identity.
    FixedPoint(Hom<K>),
    /// Ensures every member set contains all the keys (sorted ascending).
    Insert(Vec<K>),
    /// Ensures no member set contains any of the keys (sorted ascending).
    Remove(Vec<K>),
    /// Retains only the member sets containing every key (sorted ascending).
    Filter(Vec<K>),
    /// Descends through levels strictly below `key`, then applies `inner`.
    Dive { key: K, inner: Hom<K> },
    /// User-supplied recursion scheme; uniqued by the step's identity.
    Inductive {
        substitute: Option<Sfdd<K>>,
        step: Rc<InductiveStep<K>>,
    },
}

/// A homomorphism node: its shape, precomputed fingerprint, and per-instance
/// application cache.
pub struct HomNode<K> {
    pub(crate) kind: HomKind<K>,
    hash: u64,
    /// Application cache keyed by input node identity.
    cache: RefCell<HashMap<Sfdd<K>, Sfdd<K>>>,
    /// Non-owning back-reference to the homomorphism factory.
    rep: Weak<HomRep<K>>,
}

impl<K> MyHash for HomNode<K> {
    fn hash(&self) -> u64 {
        self.hash
    }
}

impl<K: Ord> HomNode<K> {
    /// Structural equality used by the unique table. Sub-homomorphisms and
    /// constant nodes are compared by identity, key lists by value, and
    /// inductive steps by the identity of their closure.
    fn structural_eq(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (HomKind::Identity, HomKind::Identity) => true,
            (HomKind::Constant(a), HomKind::Constant(b)) => a == b,
            (HomKind::Union(a), HomKind::Union(b)) => a == b,
            (HomKind::Intersection(a), HomKind::Intersection(b)) => a == b,
            (HomKind::Composition(a), HomKind::Composition(b)) => a == b,
            (HomKind::FixedPoint(a), HomKind::FixedPoint(b)) => a == b,
            (HomKind::Insert(a), HomKind::Insert(b)) => a == b,
            (HomKind::Remove(a), HomKind::Remove(b)) => a == b,
            (HomKind::Filter(a), HomKind::Filter(b)) => a == b,
            (HomKind::Dive { key: k1, inner: i1 }, HomKind::Dive { key: k2, inner: i2 }) => {
                k1 == k2 && i1 == i2
            }
            (
                HomKind::Inductive { substitute: s1, step: f1 },
                HomKind::Inductive { substitute: s2, step: f2 },
            ) => s1 == s2 && step_addr(f1) == step_addr(f2),
            _ => false,
        }
    }
}

fn step_addr<K>(step: &Rc<InductiveStep<K>>) -> usize {
    Rc::as_ptr(step) as *const () as usize
}

fn compute_hash<K: Hash>(kind: &HomKind<K>) -> u64 {
    let mut hasher = DefaultHasher::new();
    std::mem::discriminant(kind).hash(&mut hasher);
    match kind {
        HomKind::Identity => {}
        HomKind::Constant(c) => hasher.write_u64(c.node_hash()),
        HomKind::Union(children) | HomKind::Intersection(children) | HomKind::Composition(children) => {
            for child in children {
                hasher.write_u64(child.hom_hash());
            }
        }
        HomKind::FixedPoint(body) => hasher.write_u64(body.hom_hash()),
        HomKind::Insert(keys) | HomKind::Remove(keys) | HomKind::Filter(keys) => keys.hash(&mut hasher),
        HomKind::Dive { key, inner } => {
            key.hash(&mut hasher);
            hasher.write_u64(inner.hom_hash());
        }
        HomKind::Inductive { substitute, step } => {
            if let Some(s) = substitute {
                hasher.write_u64(s.node_hash());
            }
            step_addr(step).hash(&mut hasher);
        }
    }
    hasher.finish()
}

/// Shared state of a homomorphism factory.
pub(crate) struct HomRep<K> {
    pub(crate) factory: SfddFactory<K>,
    unique: RefCell<WeakTable<HomNode<K>>>,
}

/// Mints and uniques homomorphisms over one factory island.
///
/// # Example
///
/// ```
/// use sfdd_rs::{HomFactory, SfddFactory};
///
/// let factory = SfddFactory::<u32>::new();
/// let homs = HomFactory::new(&factory);
///
/// let family = factory.make([vec![1, 2], vec![2, 3]]);
/// let without_2 = homs.remove([2]).apply(&family);
/// assert_eq!(without_2, factory.make([vec![1], vec![3]]));
/// ```
pub struct HomFactory<K> {
    pub(crate) rep: Rc<HomRep<K>>,
}

impl<K> Clone for HomFactory<K> {
    fn clone(&self) -> Self {
        Self { rep: Rc::clone(&self.rep) }
    }
}

impl<K: Clone + Ord + Hash> HomFactory<K> {
    /// Creates a homomorphism factory for the given node factory's island.
    pub fn new(factory: &SfddFactory<K>) -> Self {
        Self {
            rep: Rc::new(HomRep {
                factory: factory.clone(),
                unique: RefCell::new(WeakTable::new()),
            }),
        }
    }

    fn mint(&self, kind: HomKind<K>) -> Hom<K> {
        let hash = compute_hash(&kind);
        let candidate = Rc::new(HomNode {
            kind,
            hash,
            cache: RefCell::new(HashMap::new()),
            rep: Rc::downgrade(&self.rep),
        });
        let (_, canonical) = self.rep.unique.borrow_mut().insert_with(candidate, HomNode::structural_eq);
        Hom(canonical)
    }

    fn sorted_keys(keys: impl IntoIterator<Item = K>) -> Vec<K> {
        let mut keys: Vec<K> = keys.into_iter().collect();
        keys.sort();
        keys.dedup();
        keys
    }

    fn collect_operands(homs: impl IntoIterator<Item = Hom<K>>, name: &str) -> Vec<Hom<K>> {
        let operands: Vec<Hom<K>> = homs.into_iter().collect();
        assert!(!operands.is_empty(), "{} of homomorphisms requires at least one operand", name);
        operands
    }

    /// The identity homomorphism.
    pub fn identity(&self) -> Hom<K> {
        self.mint(HomKind::Identity)
    }

    /// The constant homomorphism mapping every node to `c`.
    pub fn constant(&self, c: &Sfdd<K>) -> Hom<K> {
        self.mint(HomKind::Constant(c.clone()))
    }

    /// The pointwise union of the given homomorphisms.
    pub fn union(&self, homs: impl IntoIterator<Item = Hom<K>>) -> Hom<K> {
        let mut operands = Self::collect_operands(homs, "union");
        if operands.len() == 1 {
            return operands.swap_remove(0);
        }
        self.mint(HomKind::Union(operands))
    }

    /// The pointwise intersection of the given homomorphisms.
    pub fn intersection(&self, homs: impl IntoIterator<Item = Hom<K>>) -> Hom<K> {
        let mut operands = Self::collect_operands(homs, "intersection");
        if operands.len() == 1 {
            return operands.swap_remove(0);
        }
        self.mint(HomKind::Intersection(operands))
    }

    /// The composition of the given homomorphisms, applied left-to-right:
    /// `composition([f, g]).apply(y) = g.apply(f.apply(y))`.
    pub fn composition(&self, homs: impl IntoIterator<Item = Hom<K>>) -> Hom<K> {
        let mut operands = Self::collect_operands(homs, "composition");
        if operands.len() == 1 {
            return operands.swap_remove(0);
        }
        self.mint(HomKind::Composition(operands))
    }

    /// Iterates `body` until a fixed point is reached under node identity.
    ///
    /// The caller is responsible for monotonicity; a divergent body never
    /// terminates.
    pub fn fixed_point(&self, body: &Hom<K>) -> Hom<K> {
        self.mint(HomKind::FixedPoint(body.clone()))
    }

    /// Ensures every member set contains all of `keys`.
    pub fn insert(&self, keys: impl IntoIterator<Item = K>) -> Hom<K> {
        let keys = Self::sorted_keys(keys);
        if keys.is_empty() {
            return self.identity();
        }
        self.mint(HomKind::Insert(keys))
    }

    /// Ensures no member set contains any of `keys`.
    pub fn remove(&self, keys: impl IntoIterator<Item = K>) -> Hom<K> {
        let keys = Self::sorted_keys(keys);
        if keys.is_empty() {
            return self.identity();
        }
        self.mint(HomKind::Remove(keys))
    }

    /// Retains only the member sets containing every key of `keys`.
    pub fn filter(&self, keys: impl IntoIterator<Item = K>) -> Hom<K> {
        let keys = Self::sorted_keys(keys);
        if keys.is_empty() {
            return self.identity();
        }
        self.mint(HomKind::Filter(keys))
    }

    /// Applies `inner` at the level whose root key is `key`: the walk descends
    /// through levels with strictly smaller keys and hands everything at or
    /// below the target level (terminals included) to `inner`.
    pub fn dive(&self, key: K, inner: &Hom<K>) -> Hom<K> {
        self.mint(HomKind::Dive { key, inner: inner.clone() })
    }

    /// A user-supplied recursion scheme.
    ///
    /// At an internal node `y`, `step(self, y)` yields the transformers for
    /// the two branches; at `⊤` the result is `substitute` (or `⊤` if absent);
    /// `⊥` maps to itself. Because the step is opaque, two inductive
    /// homomorphisms are equal only if they are the same object, and the
    /// optimizer does not rewrite through them.
    pub fn inductive(
        &self,
        substitute: Option<&Sfdd<K>>,
        step: impl Fn(&Hom<K>, &Sfdd<K>) -> (Hom<K>, Hom<K>) + 'static,
    ) -> Hom<K> {
        self.mint(HomKind::Inductive {
            substitute: substitute.cloned(),
            step: Rc::new(step),
        })
    }
}

/// A handle to a canonical homomorphism.
///
/// Two handles compare equal iff they are the very same instance; uniquing in
/// the [`HomFactory`] makes that coincide with structural equality.
pub struct Hom<K>(pub(crate) Rc<HomNode<K>>);

impl<K> Clone for Hom<K> {
    fn clone(&self) -> Self {
        Hom(Rc::clone(&self.0))
    }
}

impl<K> PartialEq for Hom<K> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<K> Eq for Hom<K> {}

impl<K> Hash for Hom<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

impl<K: std::fmt::Debug> std::fmt::Debug for Hom<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0.kind {
            HomKind::Identity => write!(f, "Identity"),
            HomKind::Constant(c) => write!(f, "Constant({:?})", c),
            HomKind::Union(children) => write_children(f, "Union", children),
            HomKind::Intersection(children) => write_children(f, "Intersection", children),
            HomKind::Composition(children) => write_children(f, "Composition", children),
            HomKind::FixedPoint(body) => write!(f, "FixedPoint({:?})", body),
            HomKind::Insert(keys) => write!(f, "Insert({:?})", keys),
            HomKind::Remove(keys) => write!(f, "Remove({:?})", keys),
            HomKind::Filter(keys) => write!(f, "Filter({:?})", keys),
            HomKind::Dive { key, inner } => write!(f, "Dive({:?}, {:?})", key, inner),
            HomKind::Inductive { .. } => write!(f, "Inductive"),
        }
    }
}

fn write_children<K: std::fmt::Debug>(
    f: &mut std::fmt::Formatter<'_>,
    name: &str,
    children: &[Hom<K>],
) -> std::fmt::Result {
    write!(f, "{}(", name)?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{:?}", child)?;
    }
    write!(f, ")")
}

impl<K> Hom<K> {
    pub(crate) fn hom_hash(&self) -> u64 {
        self.0.hash
    }

    fn rep(&self) -> Rc<HomRep<K>> {
        self.0.rep.upgrade().expect("homomorphism used after its factory was dropped")
    }
}

impl<K: Clone + Ord + Hash> Hom<K> {
    /// Applies the homomorphism to a node.
    ///
    /// Results are memoized per instance, keyed by input node identity.
    pub fn apply(&self, y: &Sfdd<K>) -> Sfdd<K> {
        match &self.0.kind {
            HomKind::Identity => return y.clone(),
            HomKind::Constant(c) => return c.clone(),
            _ => {}
        }

        if let Some(result) = self.0.cache.borrow().get(y) {
            return result.clone();
        }
        let result = self.compute(y);
        self.0.cache.borrow_mut().insert(y.clone(), result.clone());
        result
    }

    fn compute(&self, y: &Sfdd<K>) -> Sfdd<K> {
        let rep = self.rep();
        let factory = &rep.factory;
        let homs = HomFactory { rep: rep.clone() };

        match &self.0.kind {
            HomKind::Identity | HomKind::Constant(_) => unreachable!("trivial homomorphisms short-circuit in apply"),
            HomKind::Union(children) => factory.union_all(children.iter().map(|child| child.apply(y))),
            HomKind::Intersection(children) => {
                let mut images = children.iter().map(|child| child.apply(y));
                let first = match images.next() {
                    Some(image) => image,
                    None => unreachable!("intersection homomorphism has no operands"),
                };
                images.fold(first, |acc, image| factory.intersection(&acc, &image))
            }
            HomKind::Composition(children) => {
                let mut current = y.clone();
                for child in children {
                    current = child.apply(&current);
                }
                current
            }
            HomKind::FixedPoint(body) => {
                let mut current = y.clone();
                loop {
                    let next = body.apply(&current);
                    if next == current {
                        break current;
                    }
                    trace!("fixed point: iterating");
                    current = next;
                }
            }
            HomKind::Insert(keys) => self.apply_insert(&homs, keys, y),
            HomKind::Remove(keys) => self.apply_remove(&homs, keys, y),
            HomKind::Filter(keys) => self.apply_filter(&homs, keys, y),
            HomKind::Dive { key, inner } => match &y.0.kind {
                NodeKind::Internal { key: yk, take, skip } if yk < key => {
                    factory.node(yk.clone(), self.apply(take), self.apply(skip))
                }
                _ => inner.apply(y),
            },
            HomKind::Inductive { substitute, step } => match &y.0.kind {
                NodeKind::Zero => y.clone(),
                NodeKind::One => match substitute {
                    Some(s) => s.clone(),
                    None => y.clone(),
                },
                NodeKind::Internal { key, take, skip } => {
                    let (hom_take, hom_skip) = step(self, y);
                    factory.node(key.clone(), hom_take.apply(take), hom_skip.apply(skip))
                }
            },
        }
    }

    fn apply_insert(&self, homs: &HomFactory<K>, keys: &[K], y: &Sfdd<K>) -> Sfdd<K> {
        let factory = &homs.rep.factory;
        let head = &keys[0];
        let rest = || homs.insert(keys[1..].iter().cloned());
        match &y.0.kind {
            NodeKind::Zero => y.clone(),
            NodeKind::One => factory.node(head.clone(), rest().apply(y), factory.zero()),
            NodeKind::Internal { key, take, skip } => match key.cmp(head) {
                // The insertion front is still below: recurse structurally.
                Ordering::Less => factory.node(key.clone(), self.apply(take), self.apply(skip)),
                // Sets already containing the key merge with those that must
                // gain it; the skip branch becomes empty.
                Ordering::Equal => {
                    factory.node(key.clone(), rest().apply(&factory.union(take, skip)), factory.zero())
                }
                Ordering::Greater => factory.node(head.clone(), rest().apply(y), factory.zero()),
            },
        }
    }

    fn apply_remove(&self, homs: &HomFactory<K>, keys: &[K], y: &Sfdd<K>) -> Sfdd<K> {
        let factory = &homs.rep.factory;
        let head = &keys[0];
        let rest = || homs.remove(keys[1..].iter().cloned());
        match &y.0.kind {
            NodeKind::Zero | NodeKind::One => y.clone(),
            NodeKind::Internal { key, take, skip } => match key.cmp(head) {
                Ordering::Less => factory.node(key.clone(), self.apply(take), self.apply(skip)),
                // Stripping the key merges both branches.
                Ordering::Equal => rest().apply(&factory.union(skip, take)),
                // The key is absent from every member set below this level.
                Ordering::Greater => rest().apply(y),
            },
        }
    }

    fn apply_filter(&self, homs: &HomFactory<K>, keys: &[K], y: &Sfdd<K>) -> Sfdd<K> {
        let factory = &homs.rep.factory;
        let head = &keys[0];
        let rest = || homs.filter(keys[1..].iter().cloned());
        match &y.0.kind {
            NodeKind::Zero | NodeKind::One => factory.zero(),
            NodeKind::Internal { key, take, skip } => match key.cmp(head) {
                Ordering::Less => factory.node(key.clone(), self.apply(take), self.apply(skip)),
                Ordering::Equal => factory.node(key.clone(), rest().apply(take), factory.zero()),
                Ordering::Greater => factory.zero(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn setup() -> (SfddFactory<u32>, HomFactory<u32>) {
        let factory = SfddFactory::<u32>::new();
        let homs = HomFactory::new(&factory);
        (factory, homs)
    }

    #[test]
    fn test_identity_and_constant() {
        let (factory, homs) = setup();
        let family = factory.make([vec![1, 2]]);

        assert_eq!(homs.identity().apply(&family), family);

        let constant = homs.constant(&factory.one());
        assert_eq!(constant.apply(&family), factory.one());
    }

    #[test]
    fn test_uniquing() {
        let (factory, homs) = setup();

        assert_eq!(homs.insert([1, 2]), homs.insert([2, 1, 2]));
        assert_eq!(homs.remove([3]), homs.remove([3]));
        assert_eq!(homs.identity(), homs.identity());
        assert_eq!(
            homs.dive(1, &homs.filter([2])),
            homs.dive(1, &homs.filter([2]))
        );

        // Empty key lists collapse to the identity.
        assert_eq!(homs.insert(Vec::new()), homs.identity());

        // Inductive homomorphisms are unique per step object.
        let a = homs.inductive(None, |h, _| (h.clone(), h.clone()));
        let b = homs.inductive(None, |h, _| (h.clone(), h.clone()));
        assert_ne!(a, b);

        let _ = factory;
    }

    #[test]
    fn test_insert() {
        let (factory, homs) = setup();

        let family = factory.make([vec![1, 2]]);
        assert_eq!(homs.insert([4]).apply(&family), factory.make([vec![1, 2, 4]]));

        // Insertion below, at, and above the root key.
        let family = factory.make([vec![2], vec![3]]);
        assert_eq!(homs.insert([1]).apply(&family), factory.make([vec![1, 2], vec![1, 3]]));
        assert_eq!(homs.insert([2]).apply(&family), factory.make([vec![2], vec![2, 3]]));
        assert_eq!(homs.insert([5]).apply(&family), factory.make([vec![2, 5], vec![3, 5]]));

        // On terminals.
        assert!(homs.insert([1]).apply(&factory.zero()).is_zero());
        assert_eq!(homs.insert([1]).apply(&factory.one()), factory.make([vec![1]]));

        // Multi-key insert.
        let family = factory.make([vec![2], vec![]]);
        assert_eq!(
            homs.insert([1, 3]).apply(&family),
            factory.make([vec![1, 2, 3], vec![1, 3]])
        );
    }

    #[test]
    fn test_remove() {
        let (factory, homs) = setup();

        let family = factory.make([vec![1, 2], vec![2, 3]]);
        assert_eq!(homs.remove([2]).apply(&family), factory.make([vec![1], vec![3]]));

        // Removal can merge member sets.
        let family = factory.make([vec![1, 2], vec![1]]);
        let removed = homs.remove([2]).apply(&family);
        assert_eq!(removed, factory.make([vec![1]]));
        assert_eq!(removed.count(), 1);

        // Keys absent from the family are no-ops.
        let family = factory.make([vec![5]]);
        assert_eq!(homs.remove([1, 9]).apply(&family), family);
        assert_eq!(homs.remove([1]).apply(&factory.one()), factory.one());
    }

    #[test]
    fn test_filter() {
        let (factory, homs) = setup();

        let family = factory.make([vec![1, 2], vec![1, 3]]);
        assert_eq!(homs.filter([2]).apply(&family), factory.make([vec![1, 2]]));
        assert_eq!(homs.filter([1]).apply(&family), family);
        assert!(homs.filter([9]).apply(&family).is_zero());

        // Terminals hold no keys.
        assert!(homs.filter([1]).apply(&factory.one()).is_zero());
        assert!(homs.filter([1]).apply(&factory.zero()).is_zero());

        let family = factory.make([vec![1, 2, 3], vec![1, 2], vec![2, 3]]);
        assert_eq!(
            homs.filter([2, 3]).apply(&family),
            factory.make([vec![1, 2, 3], vec![2, 3]])
        );
    }

    #[test]
    fn test_dive() {
        let (factory, homs) = setup();

        // On a family rooted at the target key, dive agrees with its body.
        let rooted = factory.make([vec![2, 3], vec![2]]);
        let filter = homs.filter([3]);
        let dived = homs.dive(2, &filter);
        assert_eq!(dived.apply(&rooted), filter.apply(&rooted));

        // Levels below the target are rebuilt around the application.
        let family = factory.make([vec![1, 2, 3], vec![1, 2]]);
        assert_eq!(dived.apply(&family), factory.make([vec![1, 2, 3]]));
    }

    #[test]
    fn test_union_intersection_composition() {
        let (factory, homs) = setup();
        let family = factory.make([vec![1], vec![2]]);

        let both = homs.union([homs.insert([3]), homs.identity()]);
        assert_eq!(
            both.apply(&family),
            factory.make([vec![1], vec![2], vec![1, 3], vec![2, 3]])
        );

        let meet = homs.intersection([homs.filter([1]), homs.identity()]);
        assert_eq!(meet.apply(&family), factory.make([vec![1]]));

        // Left-to-right: remove 1 first, then insert 3.
        let chain = homs.composition([homs.remove([1]), homs.insert([3])]);
        assert_eq!(chain.apply(&family), factory.make([vec![3], vec![2, 3]]));
    }

    #[test]
    fn test_fixed_point() {
        let (factory, homs) = setup();

        // Saturate with key 9: one application reaches the fixed point.
        let saturate = homs.fixed_point(&homs.union([homs.identity(), homs.insert([9])]));
        let family = factory.make([vec![1], vec![9]]);
        assert_eq!(
            saturate.apply(&family),
            factory.make([vec![1], vec![9], vec![1, 9]])
        );

        // A fixed input is returned as-is.
        let fixed = factory.make([vec![9]]);
        assert_eq!(saturate.apply(&fixed), fixed);
    }

    #[test]
    fn test_inductive() {
        let (factory, homs) = setup();
        let family = factory.make([vec![1, 2], vec![2]]);

        // The trivial scheme rebuilds the very same canonical nodes.
        let rebuild = homs.inductive(None, |this, _| (this.clone(), this.clone()));
        assert_eq!(rebuild.apply(&family), family);

        // Substituting ⊥ for ⊤ annihilates the family.
        let zero = factory.zero();
        let annihilate = homs.inductive(Some(&zero), |this, _| (this.clone(), this.clone()));
        assert!(annihilate.apply(&family).is_zero());
    }

    #[test]
    fn test_application_is_cached() {
        let (factory, homs) = setup();
        let family = factory.make([vec![1, 2], vec![3]]);

        let insert = homs.insert([5]);
        let first = insert.apply(&family);
        let second = insert.apply(&family);
        assert_eq!(first, second);

        // The structurally-equal instance shares the cache.
        let again = homs.insert([5]);
        assert_eq!(again, insert);
        assert_eq!(again.apply(&family), first);
    }
}
