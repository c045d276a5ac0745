//! The homomorphism optimizer: a single-pass, semantics-preserving rewrite.
//!
//! The pass pushes work down the diagram by prefixing combinators with
//! [`Dive`][crate::hom::HomFactory::dive] wrappers targeting the smallest key
//! they can touch, flattens compositions, reorders insert/remove runs by
//! descent depth, and splits fixed points of identity-carrying unions into
//! chains of independent fixed points. It never mutates its input and is
//! idempotent on its own output.

use std::hash::Hash;

use log::debug;

use crate::hom::{Hom, HomFactory, HomKind};

impl<K: Clone + Ord> Hom<K> {
    /// The smallest key this homomorphism can possibly touch, if known.
    ///
    /// `None` means "unbounded": identity, constants, inductive schemes, and
    /// any combinator with such a child. A known bound licenses wrapping the
    /// homomorphism in a `Dive` targeting it.
    pub fn min_key(&self) -> Option<K> {
        match &self.0.kind {
            HomKind::Identity | HomKind::Constant(_) | HomKind::Inductive { .. } => None,
            HomKind::Union(children) | HomKind::Intersection(children) | HomKind::Composition(children) => {
                let mut best: Option<K> = None;
                for child in children {
                    let key = child.min_key()?;
                    best = Some(match best {
                        None => key,
                        Some(b) if key < b => key,
                        Some(b) => b,
                    });
                }
                best
            }
            HomKind::FixedPoint(body) => body.min_key(),
            HomKind::Dive { inner, .. } => inner.min_key(),
            HomKind::Insert(keys) | HomKind::Remove(keys) | HomKind::Filter(keys) => keys.first().cloned(),
        }
    }
}

impl<K: Clone + Ord + Hash> HomFactory<K> {
    /// Rewrites `phi` into an equivalent, cheaper homomorphism.
    ///
    /// - **Union/Intersection**: children are optimized; if the rewritten
    ///   combinator has a known [`min_key`][Hom::min_key], it is wrapped in a
    ///   `Dive` targeting it.
    /// - **Composition**: children are optimized, nested compositions are
    ///   flattened (including ones this pass previously hid under a `Dive`),
    ///   and maximal runs of ≥ 2 insert/remove operations are sorted by
    ///   `min_key` (stably, so same-key operations keep their order) and
    ///   wrapped in a `Dive` at the run's smallest key.
    /// - **FixedPoint**: `fix(⋃ᵢ φᵢ ∪ id)` becomes the chained
    ///   `(φ₁ ∪ id).fix ∘ … ∘ (φₙ ∪ id).fix`.
    /// - **Insert/Remove/Filter** over several keys become a `Dive` over the
    ///   composition of their single-key forms, sorted ascending.
    pub fn optimize(&self, phi: &Hom<K>) -> Hom<K> {
        match &phi.0.kind {
            HomKind::Identity
            | HomKind::Constant(_)
            | HomKind::Inductive { .. }
            | HomKind::Dive { .. } => phi.clone(),

            HomKind::Insert(keys) if keys.len() >= 2 => {
                self.explode(keys, |k| self.insert([k]))
            }
            HomKind::Remove(keys) if keys.len() >= 2 => {
                self.explode(keys, |k| self.remove([k]))
            }
            HomKind::Filter(keys) if keys.len() >= 2 => {
                self.explode(keys, |k| self.filter([k]))
            }
            HomKind::Insert(_) | HomKind::Remove(_) | HomKind::Filter(_) => phi.clone(),

            HomKind::Union(children) => {
                let rewritten = self.union(children.iter().map(|child| self.optimize(child)));
                self.wrap_dive(rewritten)
            }
            HomKind::Intersection(children) => {
                let rewritten = self.intersection(children.iter().map(|child| self.optimize(child)));
                self.wrap_dive(rewritten)
            }

            HomKind::FixedPoint(body) => {
                let body = self.optimize(body);
                if let HomKind::Union(children) = &body.0.kind {
                    let id = self.identity();
                    if children.contains(&id) {
                        let parts: Vec<Hom<K>> = children
                            .iter()
                            .filter(|child| **child != id)
                            .map(|child| self.fixed_point(&self.union([child.clone(), id.clone()])))
                            .collect();
                        if parts.is_empty() {
                            return id;
                        }
                        debug!("optimize: splitting fixed point into {} chained fixed points", parts.len());
                        return self.composition(parts);
                    }
                }
                self.fixed_point(&body)
            }

            HomKind::Composition(children) => {
                let mut flat: Vec<Hom<K>> = Vec::new();
                for child in children {
                    let child = self.optimize(child);
                    flatten_into(child, &mut flat);
                }

                let mut segments: Vec<Hom<K>> = Vec::new();
                let mut run: Vec<Hom<K>> = Vec::new();
                for hom in flat {
                    if is_insert_or_remove(&hom) {
                        run.push(hom);
                    } else {
                        self.close_run(&mut run, &mut segments);
                        segments.push(hom);
                    }
                }
                self.close_run(&mut run, &mut segments);
                self.composition(segments)
            }
        }
    }

    /// Rule 4: a multi-key operation becomes a dive over the composition of
    /// its single-key forms, ascending.
    fn explode(&self, keys: &[K], op: impl Fn(K) -> Hom<K>) -> Hom<K> {
        let target = keys[0].clone();
        let singles: Vec<Hom<K>> = keys.iter().cloned().map(op).collect();
        debug!("optimize: exploding {}-key operation into a dive", singles.len());
        self.dive(target, &self.composition(singles))
    }

    /// Rule 1 helper: prefix with a dive when a bound on the touched keys is
    /// known.
    fn wrap_dive(&self, hom: Hom<K>) -> Hom<K> {
        match hom.min_key() {
            Some(key) => {
                debug!("optimize: wrapping combinator in a dive at its least key");
                self.dive(key, &hom)
            }
            None => hom,
        }
    }

    /// Closes a pending insert/remove run: runs of length ≥ 2 are stably
    /// sorted by `min_key` and hidden under a dive at the smallest one.
    fn close_run(&self, run: &mut Vec<Hom<K>>, segments: &mut Vec<Hom<K>>) {
        if run.len() < 2 {
            segments.append(run);
            return;
        }
        let mut sorted = std::mem::take(run);
        sorted.sort_by(|a, b| a.min_key().cmp(&b.min_key()));
        let target = match sorted[0].min_key() {
            Some(key) => key,
            None => unreachable!("insert/remove homomorphisms always have a least key"),
        };
        debug!("optimize: reordering a run of {} insert/remove operations", sorted.len());
        segments.push(self.dive(target, &self.composition(sorted)));
    }
}

/// Appends `hom` to `out`, splicing open nested compositions — including
/// compositions the optimizer previously hid under a `Dive` wrapper (those
/// are recognizable by their target being the body's least key).
fn flatten_into<K: Clone + Ord>(hom: Hom<K>, out: &mut Vec<Hom<K>>) {
    match &hom.0.kind {
        HomKind::Composition(children) => {
            for child in children {
                flatten_into(child.clone(), out);
            }
        }
        HomKind::Dive { key, inner } => {
            if let HomKind::Composition(children) = &inner.0.kind {
                if inner.min_key().as_ref() == Some(key) {
                    for child in children {
                        flatten_into(child.clone(), out);
                    }
                    return;
                }
            }
            out.push(hom.clone());
        }
        _ => out.push(hom),
    }
}

/// Run members are single-key insert/remove operations: operations on
/// distinct keys commute, and the stable sort keeps same-key operations in
/// their original order. Multi-key operations (only reachable here through a
/// user-built `Dive`) may overlap other run members and stay where they are.
fn is_insert_or_remove<K>(hom: &Hom<K>) -> bool {
    match &hom.0.kind {
        HomKind::Insert(keys) | HomKind::Remove(keys) => keys.len() == 1,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::factory::SfddFactory;
    use crate::hom::HomFactory;

    fn setup() -> (SfddFactory<u32>, HomFactory<u32>) {
        let factory = SfddFactory::<u32>::new();
        let homs = HomFactory::new(&factory);
        (factory, homs)
    }

    #[test]
    fn test_min_key() {
        let (factory, homs) = setup();

        assert_eq!(homs.insert([5, 3]).min_key(), Some(3));
        assert_eq!(homs.remove([7]).min_key(), Some(7));
        assert_eq!(homs.filter([2, 9]).min_key(), Some(2));
        assert_eq!(homs.identity().min_key(), None);
        assert_eq!(homs.constant(&factory.one()).min_key(), None);

        let union = homs.union([homs.insert([4]), homs.filter([6])]);
        assert_eq!(union.min_key(), Some(4));

        // Any unbounded child makes the combinator unbounded.
        let with_id = homs.union([homs.insert([4]), homs.identity()]);
        assert_eq!(with_id.min_key(), None);

        assert_eq!(homs.fixed_point(&homs.insert([8])).min_key(), Some(8));
        assert_eq!(homs.dive(2, &homs.insert([8])).min_key(), Some(8));
    }

    #[test]
    fn test_composition_run_is_sorted_and_dived() {
        let (_, homs) = setup();

        let phi = homs.composition([homs.insert([5]), homs.insert([3])]);
        let optimized = homs.optimize(&phi);

        let expected = homs.dive(3, &homs.composition([homs.insert([3]), homs.insert([5])]));
        assert_eq!(optimized, expected);
    }

    #[test]
    fn test_multi_key_operations_explode() {
        let (_, homs) = setup();

        let optimized = homs.optimize(&homs.insert([3, 5]));
        let expected = homs.dive(3, &homs.composition([homs.insert([3]), homs.insert([5])]));
        assert_eq!(optimized, expected);

        let optimized = homs.optimize(&homs.filter([2, 4]));
        let expected = homs.dive(2, &homs.composition([homs.filter([2]), homs.filter([4])]));
        assert_eq!(optimized, expected);
    }

    #[test]
    fn test_union_gets_dive_prefix() {
        let (_, homs) = setup();

        let phi = homs.union([homs.insert([4]), homs.remove([6])]);
        let optimized = homs.optimize(&phi);
        let expected = homs.dive(4, &phi);
        assert_eq!(optimized, expected);

        // No prefix when the bound is unknown.
        let open = homs.union([homs.insert([4]), homs.identity()]);
        assert_eq!(homs.optimize(&open), open);
    }

    #[test]
    fn test_fixed_point_splits_over_identity_union() {
        let (_, homs) = setup();

        let id = homs.identity();
        let a = homs.insert([1]);
        let b = homs.remove([2]);
        let phi = homs.fixed_point(&homs.union([a.clone(), b.clone(), id.clone()]));

        let optimized = homs.optimize(&phi);
        let expected = homs.composition([
            homs.fixed_point(&homs.union([a, id.clone()])),
            homs.fixed_point(&homs.union([b, id])),
        ]);
        assert_eq!(optimized, expected);
    }

    #[test]
    fn test_optimize_is_idempotent() {
        let (factory, homs) = setup();

        let candidates = [
            homs.insert([3, 5, 9]),
            homs.composition([homs.insert([5]), homs.remove([3]), homs.filter([1])]),
            homs.union([homs.insert([4]), homs.remove([6])]),
            homs.fixed_point(&homs.union([homs.insert([1]), homs.identity()])),
            homs.constant(&factory.make([vec![2]])),
        ];
        for phi in candidates {
            let once = homs.optimize(&phi);
            let twice = homs.optimize(&once);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_nested_dived_compositions_are_flattened() {
        let (_, homs) = setup();

        // optimize(Insert([3,7])) hides a composition under a dive; composing
        // it with another insert re-opens it and merges the runs.
        let inner = homs.optimize(&homs.insert([3, 7]));
        let phi = homs.composition([inner, homs.insert([5])]);
        let optimized = homs.optimize(&phi);

        let expected = homs.dive(
            3,
            &homs.composition([homs.insert([3]), homs.insert([5]), homs.insert([7])]),
        );
        assert_eq!(optimized, expected);
    }
}
