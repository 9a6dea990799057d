//! Index-addressed node storage.
//!
//! Nodes have no parent pointer; every link is an `Option<NodeId>` into
//! the arena, so splaying is plain index surgery and a node can never be
//! owned twice.  Released slots are threaded onto a free list and reused
//! by later insertions.

use crate::types::SplayError;

pub(crate) type NodeId = usize;

/// A tree vertex.  `left` holds keys not exceeding `key`, `right` keys at
/// least as large (duplicates may sit on either side).
#[derive(Clone, Debug)]
pub(crate) struct Node<K, S> {
    pub key: K,
    pub sat: S,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
}

#[derive(Clone, Debug)]
enum Slot<K, S> {
    Occupied(Node<K, S>),
    Vacant { next_free: Option<NodeId> },
}

#[derive(Clone, Debug)]
pub(crate) struct Arena<K, S> {
    slots: Vec<Slot<K, S>>,
    free: Option<NodeId>,
    live: usize,
    /// Refuse to grow past this many slots, simulating allocation failure.
    #[cfg(test)]
    pub slot_limit: Option<usize>,
}

impl<K, S> Default for Arena<K, S> {
    fn default() -> Self {
        Arena {
            slots: Vec::new(),
            free: None,
            live: 0,
            #[cfg(test)]
            slot_limit: None,
        }
    }
}

impl<K, S> Arena<K, S> {
    /// Number of occupied slots.
    pub fn live(&self) -> usize {
        self.live
    }

    /// Number of slots, occupied or not.  Every valid id is below this.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Reserve room for `additional` fresh slots, reporting failure
    /// instead of aborting.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), SplayError> {
        self.slots
            .try_reserve(additional)
            .map_err(|_| SplayError::AllocationFailure)
    }

    /// Make sure the next `alloc` cannot fail.
    pub fn ensure_vacancy(&mut self) -> Result<(), SplayError> {
        if self.free.is_none() {
            self.check_growth()?;
            if self.slots.len() == self.slots.capacity() {
                self.try_reserve(1)?;
            }
        }
        Ok(())
    }

    #[cfg(not(test))]
    #[inline]
    fn check_growth(&self) -> Result<(), SplayError> {
        Ok(())
    }

    #[cfg(test)]
    fn check_growth(&self) -> Result<(), SplayError> {
        match self.slot_limit {
            Some(limit) if self.slots.len() >= limit => Err(SplayError::AllocationFailure),
            _ => Ok(()),
        }
    }

    /// Store a new childless node.  On failure the arena is unchanged.
    pub fn alloc(&mut self, key: K, sat: S) -> Result<NodeId, SplayError> {
        let node = Slot::Occupied(Node {
            key,
            sat,
            left: None,
            right: None,
        });
        let id = match self.free {
            Some(id) => {
                self.free = match self.slots[id] {
                    Slot::Vacant { next_free } => next_free,
                    Slot::Occupied(_) => panic!("free list points at live node {}", id),
                };
                self.slots[id] = node;
                id
            }
            None => {
                self.check_growth()?;
                self.try_reserve(1)?;
                self.slots.push(node);
                self.slots.len() - 1
            }
        };
        self.live += 1;
        Ok(id)
    }

    /// Remove a node and hand back its contents.  Its links are returned
    /// as they were; the caller is responsible for having detached it.
    pub fn release(&mut self, id: NodeId) -> Node<K, S> {
        let slot = std::mem::replace(
            &mut self.slots[id],
            Slot::Vacant {
                next_free: self.free,
            },
        );
        match slot {
            Slot::Occupied(node) => {
                self.free = Some(id);
                self.live -= 1;
                node
            }
            Slot::Vacant { .. } => panic!("double release of node {}", id),
        }
    }

    /// Drop every node.  No recursion: the slots are a flat vector.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free = None;
        self.live = 0;
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node<K, S> {
        match &self.slots[id] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("dangling node id {}", id),
        }
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node<K, S> {
        match &mut self.slots[id] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("dangling node id {}", id),
        }
    }

    #[inline]
    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).left
    }

    #[inline]
    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).right
    }

    #[inline]
    pub fn set_left(&mut self, id: NodeId, child: Option<NodeId>) {
        self.node_mut(id).left = child;
    }

    #[inline]
    pub fn set_right(&mut self, id: NodeId, child: Option<NodeId>) {
        self.node_mut(id).right = child;
    }
}
