//! Debug utilities for inspecting SFDD structure.
//!
//! These helpers are primarily useful in tests and during development: the
//! multi-line rendering shows every reachable node once, making sharing
//! visible in a way the in-extension [`Display`][std::fmt::Display] form
//! cannot.

use std::collections::HashMap;
use std::fmt::Debug;
use std::fmt::Write;
use std::hash::Hash;

use crate::node::{NodeKind, Sfdd};

impl<K: Clone + Ord + Hash + Debug> Sfdd<K> {
    /// Renders the DAG reachable from this node, one line per node.
    ///
    /// Nodes are numbered in take-first DFS preorder; terminals render as `⊥`
    /// and `⊤` inline. Shared subgraphs appear once and are referenced by
    /// number afterwards.
    ///
    /// ```
    /// use sfdd_rs::SfddFactory;
    ///
    /// let factory = SfddFactory::<u32>::new();
    /// let family = factory.make([vec![1, 2], vec![1]]);
    /// let rendering = family.debug_string();
    /// assert!(rendering.contains("y0"));
    /// ```
    pub fn debug_string(&self) -> String {
        let mut ids: HashMap<usize, usize> = HashMap::new();
        let mut order: Vec<Sfdd<K>> = Vec::new();
        self.collect(&mut ids, &mut order);

        let mut result = String::new();
        writeln!(&mut result, "sfdd (root = {}, nodes = {}):", label(self, &ids), order.len()).unwrap();
        for node in &order {
            if let NodeKind::Internal { key, take, skip } = &node.0.kind {
                writeln!(
                    &mut result,
                    "  {} = ⟨{:?}, take: {}, skip: {}⟩ (count = {})",
                    label(node, &ids),
                    key,
                    label(take, &ids),
                    label(skip, &ids),
                    node.count(),
                )
                .unwrap();
            }
        }
        result
    }

    fn collect(&self, ids: &mut HashMap<usize, usize>, order: &mut Vec<Sfdd<K>>) {
        if self.is_terminal() || ids.contains_key(&self.addr()) {
            return;
        }
        ids.insert(self.addr(), ids.len());
        order.push(self.clone());
        if let NodeKind::Internal { take, skip, .. } = &self.0.kind {
            take.collect(ids, order);
            skip.collect(ids, order);
        }
    }
}

fn label<K>(node: &Sfdd<K>, ids: &HashMap<usize, usize>) -> String {
    if node.is_zero() {
        "⊥".to_string()
    } else if node.is_one() {
        "⊤".to_string()
    } else {
        format!("y{}", ids[&node.addr()])
    }
}
