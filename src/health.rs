//! Linear-time structural checks.  Nothing here splays.

use std::fmt::Debug;

use crate::arena::NodeId;
use crate::tree::SplayTree;
use crate::types::Violation;

impl<K, S> SplayTree<K, S> {
    /// Count the distinct nodes reachable from the root and note whether
    /// any node was reached twice.
    fn walk(&self) -> (usize, bool) {
        let mut seen = vec![false; self.arena.capacity()];
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        let mut count = 0;
        let mut revisited = false;
        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut seen[id], true) {
                revisited = true;
                continue;
            }
            count += 1;
            let node = self.arena.node(id);
            stack.extend(node.left);
            stack.extend(node.right);
        }
        (count, revisited)
    }

    /// Number of nodes reachable from the root.  Matches [`len`] on a
    /// healthy tree.
    ///
    /// [`len`]: SplayTree::len
    pub fn node_count(&self) -> usize {
        self.walk().0
    }

    /// Number of nodes on the longest root-to-leaf path (0 when empty).
    pub fn height(&self) -> usize {
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();
        let mut height = 0;
        while let Some((id, depth)) = stack.pop() {
            height = height.max(depth);
            let node = self.arena.node(id);
            stack.extend(node.left.map(|l| (l, depth + 1)));
            stack.extend(node.right.map(|r| (r, depth + 1)));
        }
        height
    }
}

impl<K: Ord + Debug, S> SplayTree<K, S> {
    /// Verify the count and ordering invariants.
    ///
    /// Checks, in order: root nullity against the count, that child links
    /// form a tree, that the count matches the reachable nodes and the
    /// arena holds nothing else, and that every key lies within the
    /// closed interval its ancestors allow.  Returns the first problem.
    pub fn health_check(&self) -> Result<(), Violation> {
        match (self.root, self.len) {
            (None, 0) => {
                return if self.arena.live() == 0 {
                    Ok(())
                } else {
                    Err(Violation::Unreachable {
                        live: self.arena.live(),
                        reachable: 0,
                    })
                };
            }
            (Some(_), 0) => return Err(Violation::ZeroCountWithRoot),
            (None, count) => return Err(Violation::CountWithoutRoot { count }),
            (Some(_), _) => {}
        }

        let (reachable, revisited) = self.walk();
        if revisited {
            return Err(Violation::Cycle);
        }
        if reachable != self.len {
            return Err(Violation::CountMismatch {
                count: self.len,
                reachable,
            });
        }
        if reachable != self.arena.live() {
            return Err(Violation::Unreachable {
                live: self.arena.live(),
                reachable,
            });
        }

        // Range propagation from (-inf, +inf) at the root.
        let mut stack: Vec<(NodeId, Option<&K>, Option<&K>)> =
            self.root.map(|r| (r, None, None)).into_iter().collect();
        while let Some((id, lower, upper)) = stack.pop() {
            let node = self.arena.node(id);
            let below = lower.map_or(false, |lo| node.key < *lo);
            let above = upper.map_or(false, |hi| node.key > *hi);
            if below || above {
                return Err(Violation::OutOfOrder {
                    key: format!("{:?}", node.key),
                    lower: lower.map(|k| format!("{:?}", k)),
                    upper: upper.map(|k| format!("{:?}", k)),
                });
            }
            if let Some(l) = node.left {
                stack.push((l, lower, Some(&node.key)));
            }
            if let Some(r) = node.right {
                stack.push((r, Some(&node.key), upper));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_of(keys: &[i32]) -> SplayTree<i32, ()> {
        let mut t = SplayTree::new();
        for &k in keys {
            t.insert(k, ()).unwrap();
        }
        t
    }

    #[test]
    fn empty_tree_is_healthy() {
        let t: SplayTree<i32, ()> = SplayTree::new();
        assert_eq!(t.health_check(), Ok(()));
        assert_eq!(t.node_count(), 0);
        assert_eq!(t.height(), 0);
    }

    #[test]
    fn detects_count_drift() {
        let mut t = tree_of(&[1, 2, 3]);
        t.len = 4;
        assert_eq!(
            t.health_check(),
            Err(Violation::CountMismatch { count: 4, reachable: 3 })
        );
        t.len = 0;
        assert_eq!(t.health_check(), Err(Violation::ZeroCountWithRoot));
    }

    #[test]
    fn detects_nil_root_with_count() {
        let mut t = tree_of(&[1]);
        t.root = None;
        assert_eq!(t.health_check(), Err(Violation::CountWithoutRoot { count: 1 }));
    }

    #[test]
    fn detects_orphaned_nodes() {
        let mut t = tree_of(&[1, 2, 3]);
        let root = t.root.unwrap();
        t.arena.set_left(root, None);
        t.len = t.node_count();
        assert!(matches!(t.health_check(), Err(Violation::Unreachable { live: 3, .. })));
    }

    #[test]
    fn detects_cycles() {
        let mut t = tree_of(&[1, 2]);
        let root = t.root.unwrap();
        let child = t.arena.left(root).unwrap();
        t.arena.set_right(child, Some(root));
        assert_eq!(t.health_check(), Err(Violation::Cycle));
    }

    #[test]
    fn detects_misordered_key() {
        let mut t = tree_of(&[1, 2, 3]);
        // root is 3 with 2 (then 1) to its left; corrupt the deepest key
        let root = t.root.unwrap();
        let deep = {
            let mut id = root;
            while let Some(l) = t.arena.left(id) {
                id = l;
            }
            id
        };
        t.arena.node_mut(deep).key = 10;
        let err = t.health_check().unwrap_err();
        assert!(matches!(err, Violation::OutOfOrder { ref key, .. } if key == "10"));
        assert!(err.to_string().starts_with("Node with key 10 violates the BST property"));
    }

    #[test]
    fn duplicates_are_healthy() {
        let t = tree_of(&[5, 5, 5, 3, 5, 7, 5]);
        assert_eq!(t.health_check(), Ok(()));
        assert_eq!(t.node_count(), 7);
    }

    #[test]
    fn height_of_sequential_inserts_is_linear() {
        let t = tree_of(&(1..=50).collect::<Vec<_>>());
        assert_eq!(t.height(), 50);
    }
}
