//! Top-down splaying (Sleator & Tarjan 1985, Fig. 12).
//!
//! The descent moves at most two links per round.  Nodes left behind are
//! parked in a four-slot ancestry buffer, then committed to one of two
//! remainder trees: the lesser tree (L) collects nodes whose keys precede
//! the target, the greater tree (R) those that follow it.  Each remainder
//! tree grows at its tip, the deepest open child slot: the right child of
//! L's maximum, the left child of R's minimum.  When the descent stops,
//! the winning node's subtrees are grafted onto the two tips and the
//! remainder trees become its children.
//!
//! ```text
//!  zig-zig (both steps toward-greater)     zig-zag (greater, then lesser)
//!
//!    C                  E                    A
//!     \                / \                    \
//!      E      ──►     C   .  ──► L tip         B      A ──► L tip
//!     / \              \                      /       B ──► R tip
//!    d   t              d                    t
//! ```
//!
//! Reference: Sleator & Tarjan, "Self-Adjusting Binary Search Trees",
//! JACM 32(3), 1985.

use std::cmp::Ordering;

use tracing::trace;

use crate::arena::{Arena, NodeId};

/// Slots of the ancestry buffer.  `*First` is the grandparent level,
/// `*Second` the parent level.  `Right*` means the recorded node linked
/// rightward (toward-greater) to the next node on the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    RightFirst = 0,
    LeftFirst = 1,
    RightSecond = 2,
    LeftSecond = 3,
}

/// One remainder tree.  `tip == None` means the open slot is `root` itself.
#[derive(Clone, Copy, Debug, Default)]
struct Remainder {
    root: Option<NodeId>,
    tip: Option<NodeId>,
}

/// Descent state for a single splay.
#[derive(Debug, Default)]
struct TopDown {
    lesser: Remainder,
    greater: Remainder,
    history: [Option<NodeId>; 4],
}

impl TopDown {
    fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn record(&mut self, step: Step, node: NodeId) {
        debug_assert!(self.history[step as usize].is_none());
        self.history[step as usize] = Some(node);
    }

    #[inline]
    fn ancestor(&self, step: Step) -> Option<NodeId> {
        self.history[step as usize]
    }

    fn is_history_blank(&self) -> bool {
        self.history[Step::RightFirst as usize].is_none()
            && self.history[Step::LeftFirst as usize].is_none()
    }

    /// Hang `n` on the lesser tree's tip; its right slot becomes the tip.
    fn attach_lesser<K, S>(&mut self, arena: &mut Arena<K, S>, n: NodeId) {
        match self.lesser.tip {
            None => self.lesser.root = Some(n),
            Some(tip) => {
                debug_assert!(arena.right(tip).is_none() || arena.right(tip) == Some(n));
                arena.set_right(tip, Some(n));
            }
        }
        arena.set_right(n, None);
        self.lesser.tip = Some(n);
    }

    /// Hang `n` on the greater tree's tip; its left slot becomes the tip.
    fn attach_greater<K, S>(&mut self, arena: &mut Arena<K, S>, n: NodeId) {
        match self.greater.tip {
            None => self.greater.root = Some(n),
            Some(tip) => {
                debug_assert!(arena.left(tip).is_none() || arena.left(tip) == Some(n));
                arena.set_left(tip, Some(n));
            }
        }
        arena.set_left(n, None);
        self.greater.tip = Some(n);
    }

    /// Commit the buffered ancestry to the remainder trees and clear it.
    ///
    /// The buffer must hold a first-level entry; it is not idempotent.
    fn set_aside<K, S>(&mut self, arena: &mut Arena<K, S>) {
        let right_first = self.ancestor(Step::RightFirst);
        let left_first = self.ancestor(Step::LeftFirst);
        debug_assert!(right_first.is_some() != left_first.is_some());

        match (
            self.ancestor(Step::RightSecond),
            self.ancestor(Step::LeftSecond),
            right_first,
            left_first,
        ) {
            // zig \
            (None, None, Some(a), _) => {
                trace!(target: "splay::topdown", "zig toward-greater");
                self.attach_lesser(arena, a);
            }
            // zig /
            (None, None, None, Some(a)) => {
                trace!(target: "splay::topdown", "zig toward-lesser");
                self.attach_greater(arena, a);
            }
            // zig-zig \\
            (Some(_), None, Some(a), _) => {
                trace!(target: "splay::topdown", "zig-zig toward-greater");
                let top = rotate_left(arena, a);
                self.attach_lesser(arena, top);
            }
            // zig-zag <
            (Some(b), None, None, Some(a)) => {
                trace!(target: "splay::topdown", "zig-zag lesser then greater");
                self.attach_greater(arena, a);
                self.attach_lesser(arena, b);
            }
            // zig-zig //
            (None, Some(_), _, Some(a)) => {
                trace!(target: "splay::topdown", "zig-zig toward-lesser");
                let top = rotate_right(arena, a);
                self.attach_greater(arena, top);
            }
            // zig-zag >
            (None, Some(b), Some(a), None) => {
                trace!(target: "splay::topdown", "zig-zag greater then lesser");
                self.attach_lesser(arena, a);
                self.attach_greater(arena, b);
            }
            _ => unreachable!("ancestry buffer holds {:?}", self.history),
        }

        self.history = [None; 4];
    }

    /// Graft `root`'s subtrees onto the tips and the remainder trees onto
    /// `root`, which becomes the root of the whole tree.
    fn assemble<K, S>(mut self, arena: &mut Arena<K, S>, root: NodeId) -> NodeId {
        if !self.is_history_blank() {
            self.set_aside(arena);
        }

        let left = arena.left(root);
        match self.lesser.tip {
            None => self.lesser.root = left,
            Some(tip) => arena.set_right(tip, left),
        }
        arena.set_left(root, self.lesser.root);

        let right = arena.right(root);
        match self.greater.tip {
            None => self.greater.root = right,
            Some(tip) => arena.set_left(tip, right),
        }
        arena.set_right(root, self.greater.root);

        root
    }
}

/// Left rotation about `t`, which must have a right child.  Returns the
/// new top of the rotated pair.
fn rotate_left<K, S>(arena: &mut Arena<K, S>, t: NodeId) -> NodeId {
    let u = match arena.right(t) {
        Some(u) => u,
        None => unreachable!("left rotation without a right child"),
    };
    let inner = arena.left(u);
    arena.set_right(t, inner);
    arena.set_left(u, Some(t));
    u
}

/// Right rotation about `t`, which must have a left child.
fn rotate_right<K, S>(arena: &mut Arena<K, S>, t: NodeId) -> NodeId {
    let s = match arena.left(t) {
        Some(s) => s,
        None => unreachable!("right rotation without a left child"),
    };
    let inner = arena.right(s);
    arena.set_left(t, inner);
    arena.set_right(s, Some(t));
    s
}

/// Which way the search for `key` leaves `node`, or `None` on a match.
#[inline]
fn direction<K: Ord, S>(arena: &Arena<K, S>, node: NodeId, key: &K) -> Option<bool> {
    match arena.node(node).key.cmp(key) {
        Ordering::Less => Some(true),
        Ordering::Greater => Some(false),
        Ordering::Equal => None,
    }
}

/// Search for `key` and splay.  Returns the new root and whether it holds
/// `key`.  On a miss the last node compared becomes the root.
pub(crate) fn search<K: Ord, S>(
    arena: &mut Arena<K, S>,
    root: Option<NodeId>,
    key: &K,
) -> (Option<NodeId>, bool) {
    let mut root = match root {
        Some(r) => r,
        None => return (None, false),
    };
    let mut td = TopDown::new();

    // Each round descends at most two links.  A round that stops early
    // (match, or no child to continue into) leaves at most the first
    // level buffered; `assemble` commits it as the final zig.
    let found = loop {
        let (child, step) = match direction(arena, root, key) {
            Some(true) => (arena.right(root), Step::RightFirst),
            Some(false) => (arena.left(root), Step::LeftFirst),
            None => break true,
        };
        match child {
            Some(c) => {
                td.record(step, root);
                root = c;
            }
            None => break false,
        }

        let (child, step) = match direction(arena, root, key) {
            Some(true) => (arena.right(root), Step::RightSecond),
            Some(false) => (arena.left(root), Step::LeftSecond),
            None => break true,
        };
        match child {
            Some(c) => {
                td.record(step, root);
                root = c;
            }
            None => break false,
        }

        td.set_aside(arena);
    };

    (Some(td.assemble(arena, root)), found)
}

/// Split every node of the tree around `key`: nodes whose key compares
/// less than `key` go to the lesser tree, all others (equal keys included)
/// to the greater tree.  Returns the two trees' roots.
pub(crate) fn partition<K: Ord, S>(
    arena: &mut Arena<K, S>,
    root: Option<NodeId>,
    key: &K,
) -> (Option<NodeId>, Option<NodeId>) {
    let mut td = TopDown::new();
    let mut cursor = root;

    while let Some(first) = cursor {
        if arena.node(first).key < *key {
            td.record(Step::RightFirst, first);
            cursor = arena.right(first);
        } else {
            td.record(Step::LeftFirst, first);
            cursor = arena.left(first);
        }

        if let Some(second) = cursor {
            if arena.node(second).key < *key {
                td.record(Step::RightSecond, second);
                cursor = arena.right(second);
            } else {
                td.record(Step::LeftSecond, second);
                cursor = arena.left(second);
            }
        }

        td.set_aside(arena);
    }

    (td.lesser.root, td.greater.root)
}

/// Splay the leftmost node to the root without comparing keys.
pub(crate) fn leftmost<K, S>(arena: &mut Arena<K, S>, root: NodeId) -> NodeId {
    let mut td = TopDown::new();
    let mut root = root;

    while let Some(child) = arena.left(root) {
        td.record(Step::LeftFirst, root);
        root = child;
        if let Some(grandchild) = arena.left(root) {
            td.record(Step::LeftSecond, root);
            root = grandchild;
        }
        td.set_aside(arena);
    }

    debug_assert!(td.lesser.root.is_none());
    td.assemble(arena, root)
}

/// Splay the rightmost node to the root without comparing keys.
pub(crate) fn rightmost<K, S>(arena: &mut Arena<K, S>, root: NodeId) -> NodeId {
    let mut td = TopDown::new();
    let mut root = root;

    while let Some(child) = arena.right(root) {
        td.record(Step::RightFirst, root);
        root = child;
        if let Some(grandchild) = arena.right(root) {
            td.record(Step::RightSecond, root);
            root = grandchild;
        }
        td.set_aside(arena);
    }

    debug_assert!(td.greater.root.is_none());
    td.assemble(arena, root)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a tree by hand from a preorder description and return its root.
    /// `shape` entries are (key, left index, right index) into `shape`.
    fn build(arena: &mut Arena<i32, ()>, shape: &[(i32, Option<usize>, Option<usize>)]) -> NodeId {
        let ids: Vec<NodeId> = shape.iter().map(|&(k, _, _)| arena.alloc(k, ()).unwrap()).collect();
        for (i, &(_, l, r)) in shape.iter().enumerate() {
            arena.set_left(ids[i], l.map(|j| ids[j]));
            arena.set_right(ids[i], r.map(|j| ids[j]));
        }
        ids[0]
    }

    fn sketch(arena: &Arena<i32, ()>, n: Option<NodeId>) -> String {
        match n {
            None => ".".to_string(),
            Some(id) => {
                let node = arena.node(id);
                if node.left.is_none() && node.right.is_none() {
                    node.key.to_string()
                } else {
                    format!("({} {} {})", node.key, sketch(arena, node.left), sketch(arena, node.right))
                }
            }
        }
    }

    /// Right-leaning chain 1 -> 2 -> ... -> n.
    fn right_chain(arena: &mut Arena<i32, ()>, n: i32) -> NodeId {
        let shape: Vec<_> = (0..n as usize)
            .map(|i| ((i + 1) as i32, None, if i + 1 < n as usize { Some(i + 1) } else { None }))
            .collect();
        build(arena, &shape)
    }

    #[test]
    fn search_hit_at_root_is_a_no_op() {
        let mut arena = Arena::default();
        let root = build(&mut arena, &[(2, Some(1), Some(2)), (1, None, None), (3, None, None)]);
        let (new_root, found) = search(&mut arena, Some(root), &2);
        assert!(found);
        assert_eq!(sketch(&arena, new_root), "(2 1 3)");
    }

    #[test]
    fn zig() {
        let mut arena = Arena::default();
        let root = build(&mut arena, &[(2, Some(1), Some(2)), (1, None, None), (3, None, None)]);
        let (new_root, found) = search(&mut arena, Some(root), &3);
        assert!(found);
        assert_eq!(sketch(&arena, new_root), "(3 (2 1 .) .)");
    }

    #[test]
    fn zig_zig_rotates_the_pair() {
        let mut arena = Arena::default();
        let root = right_chain(&mut arena, 3);
        let (new_root, found) = search(&mut arena, Some(root), &3);
        assert!(found);
        // 1 and 2 are rotated before being set aside, so 2 sits above 1.
        assert_eq!(sketch(&arena, new_root), "(3 (2 1 .) .)");
    }

    #[test]
    fn zig_zag_splits_the_pair() {
        let mut arena = Arena::default();
        // 1 -> right 3 -> left 2
        let root = build(&mut arena, &[(1, None, Some(1)), (3, Some(2), None), (2, None, None)]);
        let (new_root, found) = search(&mut arena, Some(root), &2);
        assert!(found);
        assert_eq!(sketch(&arena, new_root), "(2 1 3)");
    }

    #[test]
    fn miss_splays_last_compared_node() {
        let mut arena = Arena::default();
        let root = right_chain(&mut arena, 5);
        let (new_root, found) = search(&mut arena, Some(root), &10);
        assert!(!found);
        assert_eq!(arena.node(new_root.unwrap()).key, 5);
        assert_eq!(sketch(&arena, new_root), "(5 (2 1 (4 3 .)) .)");
    }

    #[test]
    fn search_on_empty_tree() {
        let mut arena: Arena<i32, ()> = Arena::default();
        assert_eq!(search(&mut arena, None, &1), (None, false));
    }

    #[test]
    fn partition_splits_around_key() {
        let mut arena = Arena::default();
        let root = right_chain(&mut arena, 6);
        let (lesser, greater) = partition(&mut arena, Some(root), &4);
        assert_eq!(sketch(&arena, lesser), "(2 1 3)");
        assert_eq!(sketch(&arena, greater), "(4 . (5 . 6))");
    }

    #[test]
    fn partition_sends_equal_keys_to_greater() {
        let mut arena = Arena::default();
        let root = build(&mut arena, &[(5, Some(1), None), (5, None, None)]);
        let (lesser, greater) = partition(&mut arena, Some(root), &5);
        assert!(lesser.is_none());
        assert_eq!(sketch(&arena, greater), "(5 . 5)");
    }

    #[test]
    fn leftmost_uses_only_greater_tree() {
        let mut arena = Arena::default();
        // left chain 7 -> 6 -> ... -> 1
        let shape: Vec<_> = (0..7usize)
            .map(|i| ((7 - i) as i32, if i < 6 { Some(i + 1) } else { None }, None))
            .collect();
        let root = build(&mut arena, &shape);
        let new_root = leftmost(&mut arena, root);
        assert_eq!(sketch(&arena, Some(new_root)), "(1 . (6 (4 (2 . 3) 5) 7))");
    }

    #[test]
    fn rightmost_of_single_node() {
        let mut arena = Arena::default();
        let root = build(&mut arena, &[(9, None, None)]);
        assert_eq!(rightmost(&mut arena, root), root);
        assert_eq!(sketch(&arena, Some(root)), "9");
    }

    #[test]
    fn rightmost_keeps_left_subtree_of_winner() {
        let mut arena = Arena::default();
        // 1 -> right 3 (left 2)
        let root = build(&mut arena, &[(1, None, Some(1)), (3, Some(2), None), (2, None, None)]);
        let new_root = rightmost(&mut arena, root);
        assert_eq!(sketch(&arena, Some(new_root)), "(3 (1 . 2) .)");
    }
}
