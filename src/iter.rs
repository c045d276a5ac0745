//! Iterator for enumerating the member sets of a family.

use crate::node::{NodeKind, Sfdd};

/// Iterator that yields every member set of a family exactly once.
///
/// The traversal is a DFS that explores the `take` branch first, so keys are
/// committed in ascending order and each yielded `Vec<K>` is sorted. Each
/// call to [`Sfdd::iter`] produces a fresh, restartable cursor.
pub struct SetIterator<K> {
    /// Stack of (node, committed prefix, take branch already explored).
    stack: Vec<(Sfdd<K>, Vec<K>, bool)>,
}

impl<K: Clone> SetIterator<K> {
    pub(crate) fn new(root: &Sfdd<K>) -> Self {
        let mut stack = Vec::new();
        if !root.is_zero() {
            stack.push((root.clone(), Vec::new(), false));
        }
        Self { stack }
    }
}

impl<K: Clone> Iterator for SetIterator<K> {
    type Item = Vec<K>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((y, prefix, expanded)) = self.stack.pop() {
            match &y.0.kind {
                NodeKind::Zero => continue,
                NodeKind::One => return Some(prefix),
                NodeKind::Internal { key, take, skip } => {
                    if expanded {
                        // The take branch is done; continue into skip with the
                        // prefix truncated back to keys below this node's key.
                        self.stack.push((skip.clone(), prefix, false));
                    } else {
                        let mut committed = prefix.clone();
                        committed.push(key.clone());
                        self.stack.push((y.clone(), prefix, true));
                        self.stack.push((take.clone(), committed, false));
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::factory::SfddFactory;

    #[test]
    fn test_iter_terminals() {
        let factory = SfddFactory::<u32>::new();

        let none: Vec<Vec<u32>> = factory.zero().iter().collect();
        assert!(none.is_empty());

        let only_empty: Vec<Vec<u32>> = factory.one().iter().collect();
        assert_eq!(only_empty, vec![Vec::<u32>::new()]);
    }

    #[test]
    fn test_iter_take_first() {
        let factory = SfddFactory::<u32>::new();
        let family = factory.make([vec![1, 2], vec![1]]);

        let sets: Vec<Vec<u32>> = family.iter().collect();
        assert_eq!(sets, vec![vec![1, 2], vec![1]]);
    }

    #[test]
    fn test_iter_restartable() {
        let factory = SfddFactory::<u32>::new();
        let family = factory.make([vec![1, 3], vec![2], vec![]]);

        let first: Vec<Vec<u32>> = family.iter().collect();
        let second: Vec<Vec<u32>> = family.iter().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_iter_yields_each_set_once() {
        let factory = SfddFactory::<u32>::new();
        // Heavily shared diagram: all subsets of {1, 2, 3}.
        let family = factory.make([
            vec![],
            vec![1],
            vec![2],
            vec![3],
            vec![1, 2],
            vec![1, 3],
            vec![2, 3],
            vec![1, 2, 3],
        ]);
        assert_eq!(family.count(), 8);

        let mut sets: Vec<Vec<u32>> = family.iter().collect();
        assert_eq!(sets.len(), 8);
        sets.sort();
        sets.dedup();
        assert_eq!(sets.len(), 8);
    }

    #[test]
    fn test_into_iterator() {
        let factory = SfddFactory::<u32>::new();
        let family = factory.make([vec![4], vec![7]]);

        let mut total = 0;
        for set in &family {
            total += set.len();
        }
        assert_eq!(total, 2);
    }
}
