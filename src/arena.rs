//! Compacting slot storage for trie nodes.
//!
//! Nodes refer to each other through [`NodeIdx`] values instead of pointers,
//! so the whole tree can live in one growable table. Freeing a slot moves the
//! last entry into the hole, which keeps the table dense but invalidates the
//! moved entry's old index; the [`Relocate`] hook lets the entry repair every
//! reference that still names it by that index.

use std::ops::{Index, IndexMut};

/// The table never releases memory below this many slots.
pub(crate) const MIN_CAPACITY: usize = 8;

/// Index of a slot in an [`Arena`]. `0` is reserved to mean "no node".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct NodeIdx(u32);

impl NodeIdx {
    pub(crate) const NONE: Self = NodeIdx(0);

    pub(crate) fn is_none(self) -> bool {
        self.0 == 0
    }

    fn slot(self) -> usize {
        debug_assert!(!self.is_none());
        self.0 as usize - 1
    }
}

impl std::fmt::Debug for NodeIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            f.write_str("NodeIdx(none)")
        } else {
            write!(f, "NodeIdx({})", self.0)
        }
    }
}

/// Entries stored in an [`Arena`] repair their incoming references here,
/// right after the arena moved them from `from` to `to` during compaction.
pub(crate) trait Relocate: Sized {
    fn relocated(arena: &mut Arena<Self>, to: NodeIdx, from: NodeIdx);
}

/// Growable slot table addressed by [`NodeIdx`].
///
/// Live indices are `1..=len`; the sentinel `0` maps to no slot at all, so
/// the table wastes nothing on it. Capacity doubles when full and drops to a
/// third once occupancy falls below a third, without ever moving a live slot
/// to a different logical index. Only [`Arena::free`] moves entries, and the
/// moved entry is always the one in the last slot.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<T>,
}

impl<T: Relocate> Arena<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::with_capacity(MIN_CAPACITY),
        }
    }

    /// Number of live slots.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Store `value` in a fresh slot and return its index.
    pub(crate) fn alloc(&mut self, value: T) -> NodeIdx {
        if self.slots.len() == self.slots.capacity() {
            self.slots.reserve_exact(self.slots.capacity().max(MIN_CAPACITY));
        }
        self.slots.push(value);
        NodeIdx(self.slots.len() as u32)
    }

    /// Release the slot at `idx`.
    ///
    /// Unless `idx` is the last slot, the last entry is moved into the hole
    /// and notified through [`Relocate::relocated`]. Any index greater than
    /// `idx` that the caller still holds is invalid afterwards.
    pub(crate) fn free(&mut self, idx: NodeIdx) {
        let last = NodeIdx(self.slots.len() as u32);
        self.slots.swap_remove(idx.slot());
        if idx != last {
            T::relocated(self, idx, last);
        }
        let third = self.slots.capacity() / 3;
        if third >= MIN_CAPACITY && self.slots.len() < third {
            self.slots.shrink_to(third);
        }
    }

    /// Drop every slot.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.slots.shrink_to(MIN_CAPACITY);
    }
}

impl<T: Relocate> Index<NodeIdx> for Arena<T> {
    type Output = T;

    fn index(&self, idx: NodeIdx) -> &T {
        &self.slots[idx.slot()]
    }
}

impl<T: Relocate> IndexMut<NodeIdx> for Arena<T> {
    fn index_mut(&mut self, idx: NodeIdx) -> &mut T {
        &mut self.slots[idx.slot()]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct Tracked {
        id: u32,
        moved_from: Option<u32>,
    }

    impl Tracked {
        fn new(id: u32) -> Self {
            Self {
                id,
                moved_from: None,
            }
        }
    }

    impl Relocate for Tracked {
        fn relocated(arena: &mut Arena<Self>, to: NodeIdx, from: NodeIdx) {
            arena[to].moved_from = Some(from.0);
        }
    }

    #[test]
    fn indices_start_at_one() {
        let mut arena = Arena::new();
        assert_eq!(arena.alloc(Tracked::new(0)), NodeIdx(1));
        assert_eq!(arena.alloc(Tracked::new(1)), NodeIdx(2));
        assert!(NodeIdx::NONE.is_none());
        assert!(!NodeIdx(1).is_none());
    }

    #[test]
    fn freeing_the_last_slot_moves_nothing() {
        let mut arena = Arena::new();
        arena.alloc(Tracked::new(0));
        let last = arena.alloc(Tracked::new(1));
        arena.free(last);
        assert_eq!(arena.len(), 1);
        assert_eq!(arena[NodeIdx(1)].moved_from, None);
    }

    #[test]
    fn freeing_a_middle_slot_swaps_in_the_last() {
        let mut arena = Arena::new();
        for id in 0..3 {
            arena.alloc(Tracked::new(id));
        }
        arena.free(NodeIdx(1));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena[NodeIdx(1)].id, 2);
        assert_eq!(arena[NodeIdx(1)].moved_from, Some(3));
        assert_eq!(arena[NodeIdx(2)].id, 1);
    }

    #[test]
    fn capacity_doubles_from_the_minimum() {
        let mut arena = Arena::new();
        assert_eq!(arena.capacity(), MIN_CAPACITY);
        for id in 0..9 {
            arena.alloc(Tracked::new(id));
        }
        assert_eq!(arena.capacity(), 2 * MIN_CAPACITY);
        for id in 9..17 {
            arena.alloc(Tracked::new(id));
        }
        assert_eq!(arena.capacity(), 4 * MIN_CAPACITY);
    }

    #[test]
    fn capacity_shrinks_to_a_third() {
        let mut arena = Arena::new();
        for id in 0..100 {
            arena.alloc(Tracked::new(id));
        }
        let grown = arena.capacity();
        assert_eq!(grown, 128);
        while arena.len() > 42 {
            let last = NodeIdx(arena.len() as u32);
            arena.free(last);
        }
        assert_eq!(arena.capacity(), grown);
        // One slot below a third of 128 trips the shrink.
        arena.free(NodeIdx(arena.len() as u32));
        assert!(arena.capacity() <= 42);
        assert!(arena.capacity() >= arena.len());
    }

    #[test]
    fn capacity_never_drops_below_the_minimum() {
        let mut arena = Arena::new();
        for id in 0..100 {
            arena.alloc(Tracked::new(id));
        }
        while arena.len() > 1 {
            arena.free(NodeIdx(arena.len() as u32));
        }
        assert!(arena.capacity() >= MIN_CAPACITY);
    }
}
