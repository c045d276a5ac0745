//! Graphviz DOT export for SFDD visualization.

use std::collections::HashMap;
use std::fmt::Display;
use std::fmt::Write;
use std::hash::Hash;

use crate::node::{NodeKind, Sfdd};

impl<K: Clone + Ord + Hash + Display> Sfdd<K> {
    /// Generates a DOT representation of the family for Graphviz.
    ///
    /// Terminals render as squares; `skip` edges are dashed, `take` edges
    /// solid. Nodes sharing a key are ranked on the same level.
    ///
    /// # Example
    ///
    /// ```
    /// use sfdd_rs::SfddFactory;
    ///
    /// let factory = SfddFactory::<u32>::new();
    /// let family = factory.make([vec![1, 2], vec![1]]);
    ///
    /// let dot = family.to_dot();
    /// assert!(dot.contains("digraph SFDD"));
    /// ```
    pub fn to_dot(&self) -> String {
        let mut ids: HashMap<usize, usize> = HashMap::new();
        let mut order: Vec<Sfdd<K>> = Vec::new();
        collect(self, &mut ids, &mut order);

        let mut dot = String::new();
        writeln!(dot, "digraph SFDD {{").unwrap();
        writeln!(dot, "  rankdir=TB;").unwrap();
        writeln!(dot, "  node [shape=circle];").unwrap();
        writeln!(dot).unwrap();

        writeln!(dot, "  // Terminals").unwrap();
        writeln!(dot, "  zero [label=\"⊥\", shape=square];").unwrap();
        writeln!(dot, "  one [label=\"⊤\", shape=square];").unwrap();
        writeln!(dot).unwrap();

        // Rank nodes sharing a key on the same level.
        let mut by_key: Vec<(&K, Vec<usize>)> = Vec::new();
        for node in &order {
            if let NodeKind::Internal { key, .. } = &node.0.kind {
                match by_key.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, nodes)) => nodes.push(ids[&node.addr()]),
                    None => by_key.push((key, vec![ids[&node.addr()]])),
                }
            }
        }
        by_key.sort_by(|(a, _), (b, _)| a.cmp(b));
        for (key, nodes) in &by_key {
            writeln!(dot, "  // Key {}", key).unwrap();
            writeln!(dot, "  {{ rank=same;").unwrap();
            for id in nodes {
                writeln!(dot, "    n{} [label=\"{}\"];", id, key).unwrap();
            }
            writeln!(dot, "  }}").unwrap();
        }

        writeln!(dot).unwrap();
        writeln!(dot, "  // Edges").unwrap();
        for node in &order {
            if let NodeKind::Internal { take, skip, .. } = &node.0.kind {
                let id = ids[&node.addr()];
                writeln!(dot, "  n{} -> {} [style=dashed];", id, target(skip, &ids)).unwrap();
                writeln!(dot, "  n{} -> {};", id, target(take, &ids)).unwrap();
            }
        }

        writeln!(dot, "}}").unwrap();
        dot
    }
}

fn collect<K>(node: &Sfdd<K>, ids: &mut HashMap<usize, usize>, order: &mut Vec<Sfdd<K>>) {
    if node.is_terminal() || ids.contains_key(&node.addr()) {
        return;
    }
    ids.insert(node.addr(), ids.len());
    order.push(node.clone());
    if let NodeKind::Internal { take, skip, .. } = &node.0.kind {
        collect(take, ids, order);
        collect(skip, ids, order);
    }
}

fn target<K>(node: &Sfdd<K>, ids: &HashMap<usize, usize>) -> String {
    if node.is_zero() {
        "zero".to_string()
    } else if node.is_one() {
        "one".to_string()
    } else {
        format!("n{}", ids[&node.addr()])
    }
}

#[cfg(test)]
mod tests {
    use crate::factory::SfddFactory;

    #[test]
    fn test_dot_terminal() {
        let factory = SfddFactory::<u32>::new();
        let dot = factory.zero().to_dot();
        assert!(dot.contains("digraph SFDD"));
        assert!(dot.contains("zero"));
    }

    #[test]
    fn test_dot_family() {
        let factory = SfddFactory::<u32>::new();
        let family = factory.make([vec![1, 2], vec![1]]);

        let dot = family.to_dot();
        assert!(dot.contains("// Key 1"));
        assert!(dot.contains("// Key 2"));
        assert!(dot.contains("style=dashed"));
        assert!(dot.contains("-> one"));
    }
}
