//! Self-adjusting ordered multimap.
//!
//! Every dictionary operation, including the "read-only" ones, splays the
//! tree top-down so the touched record ends up at the root.  Amortized
//! O(log n) per operation over any sequence starting from empty; a single
//! operation may still walk a linear-length path.
//!
//! Duplicate keys are allowed.  Which of several equal records a search
//! lands on is whatever the search path reaches first.

use tracing::debug;

use crate::arena::{Arena, NodeId};
use crate::topdown;
use crate::types::{SplayError, UpdateError};

/// A splay tree mapping keys of type `K` to satellite values of type `S`.
///
/// The tree never looks inside `S`: it stores, returns and hands back
/// satellites but does not clone them except in [`copy_into`].
///
/// [`copy_into`]: SplayTree::copy_into
pub struct SplayTree<K, S> {
    pub(crate) arena: Arena<K, S>,
    pub(crate) root: Option<NodeId>,
    pub(crate) len: usize,
}

impl<K, S> Default for SplayTree<K, S> {
    fn default() -> Self {
        SplayTree {
            arena: Arena::default(),
            root: None,
            len: 0,
        }
    }
}

impl<K, S> SplayTree<K, S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The record at the root, without splaying.
    pub fn root(&self) -> Option<(&K, &S)> {
        self.root.map(|id| self.record(id))
    }

    /// Splay the minimum to the root and return it.
    pub fn min(&mut self) -> Option<(&K, &S)> {
        let root = topdown::leftmost(&mut self.arena, self.root?);
        self.root = Some(root);
        Some(self.record(root))
    }

    /// Splay the maximum to the root and return it.
    pub fn max(&mut self) -> Option<(&K, &S)> {
        let root = topdown::rightmost(&mut self.arena, self.root?);
        self.root = Some(root);
        Some(self.record(root))
    }

    /// Remove and return the minimum record.
    pub fn pop_min(&mut self) -> Option<(K, S)> {
        let root = topdown::leftmost(&mut self.arena, self.root?);
        Some(self.remove_root(root))
    }

    /// Remove and return the maximum record.
    pub fn pop_max(&mut self) -> Option<(K, S)> {
        let root = topdown::rightmost(&mut self.arena, self.root?);
        Some(self.remove_root(root))
    }

    /// Release every node and return to the empty state.  Safe on an
    /// empty tree.
    pub fn clear(&mut self) {
        if self.len > 0 {
            debug!(len = self.len, "clearing tree");
        }
        self.arena.clear();
        self.root = None;
        self.len = 0;
    }

    /// Transfer the whole tree into `dest` in constant time, leaving
    /// `self` empty.  `dest` must be empty.
    pub fn move_into(&mut self, dest: &mut SplayTree<K, S>) -> Result<(), SplayError> {
        if dest.root.is_some() {
            return Err(SplayError::InvalidArgument(
                "move destination is not empty".to_string(),
            ));
        }
        debug!(len = self.len, "moving tree");
        // `dest` may still own slots from an earlier life; drop them here.
        std::mem::swap(self, dest);
        self.clear();
        Ok(())
    }

    #[inline]
    fn record(&self, id: NodeId) -> (&K, &S) {
        let node = self.arena.node(id);
        (&node.key, &node.sat)
    }

    /// Unlink `radix`, which must be the root, and free it.  If it has a
    /// right subtree, that subtree's minimum is splayed up to replace it;
    /// having no left child, it takes the old root's left subtree.
    fn remove_root(&mut self, radix: NodeId) -> (K, S) {
        let left = self.arena.left(radix);
        self.root = match self.arena.right(radix) {
            Some(right) => {
                let successor = topdown::leftmost(&mut self.arena, right);
                debug_assert!(self.arena.left(successor).is_none());
                self.arena.set_left(successor, left);
                Some(successor)
            }
            None => left,
        };
        let node = self.arena.release(radix);
        self.len -= 1;
        (node.key, node.sat)
    }
}

impl<K: Ord, S> SplayTree<K, S> {
    /// Insert a record.  Duplicates are kept; the new record becomes the
    /// root and shadows older records with the same key.
    ///
    /// Fails only if the node cannot be allocated, in which case the tree
    /// is untouched.
    pub fn insert(&mut self, key: K, sat: S) -> Result<(), SplayError> {
        // Secure the slot before restructuring so a failure changes nothing.
        self.arena.ensure_vacancy()?;
        let (lesser, greater) = topdown::partition(&mut self.arena, self.root, &key);
        let n = self.arena.alloc(key, sat)?;
        self.arena.set_left(n, lesser);
        self.arena.set_right(n, greater);
        self.root = Some(n);
        self.len += 1;
        debug!(len = self.len, "inserted");
        Ok(())
    }

    /// Look up `key`, splaying it (or the last node on the failed search
    /// path) to the root.
    pub fn find(&mut self, key: &K) -> Option<(&K, &S)> {
        if self.splay(key) {
            self.root.map(|id| self.record(id))
        } else {
            None
        }
    }

    /// Like [`find`](Self::find) but yields the satellite mutably.
    pub fn find_mut(&mut self, key: &K) -> Option<&mut S> {
        if self.splay(key) {
            let root = self.root?;
            Some(&mut self.arena.node_mut(root).sat)
        } else {
            None
        }
    }

    pub fn contains(&mut self, key: &K) -> bool {
        self.splay(key)
    }

    /// Replace the satellite of one record with key `key`, returning the
    /// displaced satellite.  With duplicates, exactly one record changes
    /// and which one is unspecified.
    ///
    /// On `NotFound` the tree has still been splayed and `sat` comes back
    /// inside the error.
    pub fn update(&mut self, key: &K, sat: S) -> Result<S, UpdateError<S>> {
        match self.find_mut(key) {
            Some(slot) => Ok(std::mem::replace(slot, sat)),
            None => Err(UpdateError {
                error: SplayError::NotFound,
                sat,
            }),
        }
    }

    /// Remove one record with key `key` and hand its satellite back.
    pub fn erase(&mut self, key: &K) -> Result<S, SplayError> {
        if !self.splay(key) {
            return Err(SplayError::NotFound);
        }
        let radix = match self.root {
            Some(r) => r,
            None => unreachable!("successful search left no root"),
        };
        let (_, sat) = self.remove_root(radix);
        debug!(len = self.len, "erased");
        Ok(sat)
    }

    /// Search-and-splay.  Returns whether the new root holds `key`.
    fn splay(&mut self, key: &K) -> bool {
        let (root, found) = topdown::search(&mut self.arena, self.root, key);
        self.root = root;
        found
    }
}

impl<K: Clone, S: Clone> SplayTree<K, S> {
    /// Deep-copy every node into `dest`, which must be empty.  Satellites
    /// are copied with `Clone`; for reference-like satellites that copies
    /// the reference, not the payload.
    ///
    /// On allocation failure `dest` is left empty and `self` is untouched.
    pub fn copy_into(&self, dest: &mut SplayTree<K, S>) -> Result<(), SplayError> {
        if dest.root.is_some() {
            return Err(SplayError::InvalidArgument(
                "copy destination is not empty".to_string(),
            ));
        }
        dest.clear();

        let root = match self.root {
            Some(r) => r,
            None => return Ok(()),
        };

        // On failure the partial arena is dropped and `dest` keeps a fresh one.
        let mut arena = std::mem::take(&mut dest.arena);
        arena.try_reserve(self.len)?;
        let mut stack: Vec<(NodeId, NodeId)> = Vec::new();
        stack
            .try_reserve(self.len)
            .map_err(|_| SplayError::AllocationFailure)?;

        let new_root = arena.alloc(self.arena.node(root).key.clone(), self.arena.node(root).sat.clone())?;
        stack.push((root, new_root));
        while let Some((src, dst)) = stack.pop() {
            let node = self.arena.node(src);
            if let Some(l) = node.left {
                let child = self.arena.node(l);
                let copy = arena.alloc(child.key.clone(), child.sat.clone())?;
                arena.set_left(dst, Some(copy));
                stack.push((l, copy));
            }
            if let Some(r) = node.right {
                let child = self.arena.node(r);
                let copy = arena.alloc(child.key.clone(), child.sat.clone())?;
                arena.set_right(dst, Some(copy));
                stack.push((r, copy));
            }
        }

        dest.arena = arena;
        dest.root = Some(new_root);
        dest.len = self.len;
        debug!(len = self.len, "copied tree");
        Ok(())
    }
}

impl<K: Clone, S: Clone> Clone for SplayTree<K, S> {
    /// # Panics
    ///
    /// Panics if the copy cannot allocate its nodes.  [`copy_into`] is the
    /// fallible form.
    ///
    /// [`copy_into`]: SplayTree::copy_into
    fn clone(&self) -> Self {
        let mut out = SplayTree::new();
        if let Err(e) = self.copy_into(&mut out) {
            panic!("cloning splay tree: {}", e);
        }
        out
    }
}

impl<K: std::fmt::Debug, S: std::fmt::Debug> std::fmt::Debug for SplayTree<K, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplayTree")
            .field("len", &self.len)
            .field("root", &self.root())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_of(keys: &[i32]) -> SplayTree<i32, String> {
        let mut t = SplayTree::new();
        for &k in keys {
            t.insert(k, format!("s{}", k)).unwrap();
        }
        t
    }

    fn keys_of(t: &SplayTree<i32, String>) -> Vec<i32> {
        let mut copy = t.clone();
        let mut keys = Vec::new();
        while let Some((k, _)) = copy.pop_min() {
            keys.push(k);
        }
        keys
    }

    #[test]
    fn insert_then_find_round_trip() {
        let mut t = tree_of(&[5, 3, 8, 1, 4]);
        assert_eq!(t.len(), 5);
        assert_eq!(t.find(&4), Some((&4, &"s4".to_string())));
        assert_eq!(t.root().map(|(k, _)| *k), Some(4));
        assert_eq!(t.erase(&4).unwrap(), "s4");
        assert_eq!(t.find(&4), None);
        assert_eq!(t.len(), 4);
        assert_eq!(t.health_check(), Ok(()));
    }

    #[test]
    fn new_record_becomes_root() {
        let mut t = tree_of(&[10, 20]);
        t.insert(15, "fifteen".into()).unwrap();
        assert_eq!(t.root(), Some((&15, &"fifteen".to_string())));
    }

    #[test]
    fn miss_splays_last_compared_node() {
        let mut t = tree_of(&[10, 20, 30]);
        // 30 is the root with 20 (then 10) to its left; 20 is the last
        // node compared.
        assert_eq!(t.sketch(), "(30 (20 10 .) .)");
        assert_eq!(t.find(&25), None);
        assert_eq!(t.sketch(), "(20 10 30)");
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn duplicates_are_kept_and_erased_one_at_a_time() {
        let mut t = tree_of(&[7, 7, 7]);
        assert_eq!(t.len(), 3);
        assert!(t.contains(&7));
        t.erase(&7).unwrap();
        t.erase(&7).unwrap();
        assert_eq!(t.len(), 1);
        t.erase(&7).unwrap();
        assert!(matches!(t.erase(&7), Err(SplayError::NotFound)));
        assert!(t.is_empty());
        assert_eq!(t.health_check(), Ok(()));
    }

    #[test]
    fn update_replaces_one_satellite() {
        let mut t = tree_of(&[1, 2, 3]);
        assert_eq!(t.update(&2, "two".into()).unwrap(), "s2");
        assert_eq!(t.find(&2).map(|(_, s)| s.as_str()), Some("two"));
        let err = t.update(&9, "nine".into()).unwrap_err();
        assert!(matches!(err.error, SplayError::NotFound));
        assert_eq!(err.into_sat(), "nine");
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn failed_update_returns_the_satellite() {
        use std::rc::Rc;

        let payload = Rc::new("payload");
        let mut t = SplayTree::new();
        t.insert(1, Rc::clone(&payload)).unwrap();
        assert_eq!(Rc::strong_count(&payload), 2);

        let err = t.update(&99, Rc::clone(&payload)).unwrap_err();
        assert!(matches!(err.error, SplayError::NotFound));
        assert_eq!(Rc::strong_count(&payload), 3);
        let back = err.into_sat();
        assert!(Rc::ptr_eq(&back, &payload));
        drop(back);

        let old = t.update(&1, Rc::new("other")).unwrap();
        assert!(Rc::ptr_eq(&old, &payload));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn failed_insert_leaves_tree_untouched() {
        let mut t = tree_of(&[5, 3, 8, 1, 9, 4]);
        let before = t.sketch();
        t.arena.slot_limit = Some(t.arena.capacity());

        assert!(matches!(t.insert(6, "s6".into()), Err(SplayError::AllocationFailure)));
        assert_eq!(t.sketch(), before);
        assert_eq!(t.len(), 6);
        assert_eq!(t.health_check(), Ok(()));

        // A released slot needs no growth.
        t.erase(&9).unwrap();
        t.insert(6, "s6".into()).unwrap();
        assert_eq!(keys_of(&t), [1, 3, 4, 5, 6, 8]);
        assert_eq!(t.health_check(), Ok(()));
    }

    #[test]
    fn failed_copy_leaves_destination_empty() {
        let a = tree_of(&(1..=10).collect::<Vec<_>>());
        let before = a.sketch();
        let mut b = SplayTree::new();
        b.arena.slot_limit = Some(3);

        assert!(matches!(a.copy_into(&mut b), Err(SplayError::AllocationFailure)));
        assert!(b.is_empty());
        assert!(b.root().is_none());
        assert_eq!(b.health_check(), Ok(()));
        assert_eq!(a.sketch(), before);
        assert_eq!(a.len(), 10);

        // The destination stays usable.
        a.copy_into(&mut b).unwrap();
        assert_eq!(keys_of(&b), (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn find_mut_edits_in_place() {
        let mut t = tree_of(&[4, 2]);
        t.find_mut(&4).unwrap().push('!');
        assert_eq!(t.find(&4).map(|(_, s)| s.as_str()), Some("s4!"));
        assert!(t.find_mut(&3).is_none());
    }

    #[test]
    fn extremes_on_empty_and_single() {
        let mut t: SplayTree<i32, String> = SplayTree::new();
        assert!(t.min().is_none());
        assert!(t.max().is_none());
        assert!(t.pop_min().is_none());

        t.insert(42, "x".into()).unwrap();
        assert_eq!(t.min().map(|(k, _)| *k), Some(42));
        assert_eq!(t.max().map(|(k, _)| *k), Some(42));
        assert_eq!(t.len(), 1);
        assert_eq!(t.height(), 1);
    }

    #[test]
    fn pops_come_out_sorted() {
        let mut t = tree_of(&[9, 1, 8, 2, 7, 3, 6, 4, 5]);
        assert_eq!(t.min().map(|(k, _)| *k), Some(1));
        assert_eq!(t.max().map(|(k, _)| *k), Some(9));
        let mut down = Vec::new();
        while let Some((k, s)) = t.pop_max() {
            assert_eq!(s, format!("s{}", k));
            down.push(k);
            assert_eq!(t.health_check(), Ok(()));
        }
        assert_eq!(down, [9, 8, 7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut t = tree_of(&[3, 1, 2]);
        t.clear();
        assert!(t.is_empty());
        assert!(t.root().is_none());
        t.clear();
        assert!(t.is_empty());
        assert_eq!(t.health_check(), Ok(()));
    }

    #[test]
    fn copy_is_independent() {
        let a0 = tree_of(&[5, 2, 8, 2]);
        let mut a = a0.clone();
        let mut b = SplayTree::new();
        a.copy_into(&mut b).unwrap();
        assert_eq!(b.len(), 4);

        a.erase(&5).unwrap();
        a.insert(11, "s11".into()).unwrap();
        assert_eq!(keys_of(&b), [2, 2, 5, 8]);
        assert_eq!(b.health_check(), Ok(()));
    }

    #[test]
    fn copy_and_move_refuse_nonempty_destination() {
        let mut a = tree_of(&[1]);
        let mut b = tree_of(&[2]);
        assert!(matches!(a.copy_into(&mut b), Err(SplayError::InvalidArgument(_))));
        assert!(matches!(a.move_into(&mut b), Err(SplayError::InvalidArgument(_))));
        assert_eq!(a.len(), 1);
        assert_eq!(keys_of(&b), [2]);
    }

    #[test]
    fn move_transfers_everything() {
        let mut a = tree_of(&[3, 1, 4, 1, 5]);
        let mut b = SplayTree::new();
        a.move_into(&mut b).unwrap();
        assert!(a.is_empty());
        assert!(a.root().is_none());
        assert_eq!(a.health_check(), Ok(()));
        assert_eq!(keys_of(&b), [1, 1, 3, 4, 5]);
        assert_eq!(b.health_check(), Ok(()));
    }

    #[test]
    fn copy_of_empty_tree_is_empty() {
        let a: SplayTree<i32, String> = SplayTree::new();
        let mut b = SplayTree::new();
        a.copy_into(&mut b).unwrap();
        assert!(b.is_empty());
    }

    #[test]
    fn erased_slots_are_reused() {
        let mut t = tree_of(&[1, 2, 3]);
        t.erase(&2).unwrap();
        t.insert(4, "s4".into()).unwrap();
        assert_eq!(t.arena.capacity(), 3);
        assert_eq!(t.health_check(), Ok(()));
    }
}
