//! Node storage for the skip list.
//!
//! Nodes live in a slab of slots addressed by `u32` indices rather than by
//! pointer; a forward link is just another slot index, with [`NULL`]
//! marking the end of a level. Slot 0 is always the head sentinel: full
//! height, no value, the origin of every level.
//!
//! The storage strategy is injected into the list as a type parameter (see
//! [`NodeStore`]) and fixed for the list's lifetime. [`FreeListStore`] is
//! the provided strategy: vacated slots are parked on a free list and
//! reused before the slab grows.

use std::mem::MaybeUninit;

use smallvec::{SmallVec, smallvec};

use super::level::MAX_LEVEL;

/// Slot index of a node within a store. u32 saves space vs usize on 64-bit.
pub type Idx = u32;

/// Marks a forward link that points past the end of its level.
pub const NULL: Idx = Idx::MAX;

/// Forward links, one per level the node participates in.
/// Heights are geometric with p = 1/2, so an inline capacity of 4 keeps
/// roughly 15 of 16 nodes free of a heap allocation.
type Links = SmallVec<[Idx; 4]>;

/// A node in the multi-level chain: one value and `height` forward links.
///
/// The value cell is uninitialized for the head sentinel and for slots
/// parked on a free list; everywhere else it holds a live `T`.
pub struct Node<T> {
    value: MaybeUninit<T>,
    links: Links,
}

impl<T> Node<T> {
    /// A node of the given height, all links null.
    pub fn new(height: usize, value: T) -> Node<T> {
        debug_assert!(
            height >= 1 && height <= MAX_LEVEL,
            "node height {} outside 1..={}",
            height,
            MAX_LEVEL
        );
        Node {
            value: MaybeUninit::new(value),
            links: smallvec![NULL; height],
        }
    }

    /// The head sentinel: full height, no value.
    pub fn head() -> Node<T> {
        Node {
            value: MaybeUninit::uninit(),
            links: smallvec![NULL; MAX_LEVEL],
        }
    }

    /// Number of levels this node participates in.
    #[inline]
    pub fn height(&self) -> usize {
        self.links.len()
    }

    /// The forward link at `level`.
    #[inline]
    pub fn next(&self, level: usize) -> Idx {
        self.links[level]
    }

    /// Point the forward link at `level` to `idx`.
    #[inline]
    pub fn set_next(&mut self, level: usize, idx: Idx) {
        self.links[level] = idx;
    }

    /// Read the stored value.
    ///
    /// # Safety
    /// The node must currently hold a value: not the head sentinel, not a
    /// slot parked on a free list.
    #[inline]
    pub unsafe fn value(&self) -> &T {
        unsafe { self.value.assume_init_ref() }
    }

    /// Move the value out, leaving the cell uninitialized.
    ///
    /// # Safety
    /// Same requirement as [`Node::value`], and the cell must not be read
    /// again until it is refilled.
    #[inline]
    pub unsafe fn take_value(&mut self) -> T {
        unsafe { self.value.assume_init_read() }
    }

    /// Refill a vacated slot with a fresh value and height.
    pub fn refill(&mut self, height: usize, value: T) {
        debug_assert!(
            height >= 1 && height <= MAX_LEVEL,
            "node height {} outside 1..={}",
            height,
            MAX_LEVEL
        );
        self.value = MaybeUninit::new(value);
        self.links.clear();
        self.links.resize(height, NULL);
    }
}

/// Allocation strategy for skip list nodes.
///
/// A store owns every slot, including the head sentinel. The list only
/// ever calls [`release`] on a node it has fully unlinked from every
/// level, and never touches a slot after releasing it.
///
/// [`release`]: NodeStore::release
pub trait NodeStore<T>: Default {
    /// The head sentinel's slot. Stable for the store's lifetime.
    fn head(&self) -> Idx;

    /// Allocate a node of the given height holding `value`, all links null.
    fn alloc(&mut self, height: usize, value: T) -> Idx;

    /// Reclaim a fully unlinked node, handing back its value.
    fn release(&mut self, idx: Idx) -> T;

    /// Borrow the node at `idx`.
    fn node(&self, idx: Idx) -> &Node<T>;

    /// Mutably borrow the node at `idx`.
    fn node_mut(&mut self, idx: Idx) -> &mut Node<T>;
}

/// The default store: a slab of slots with a free list for reuse.
pub struct FreeListStore<T> {
    /// Slot 0 is always the head sentinel.
    slots: Vec<Node<T>>,
    /// Vacated slots, most recently freed last.
    free: Vec<Idx>,
}

impl<T> Default for FreeListStore<T> {
    fn default() -> FreeListStore<T> {
        FreeListStore {
            slots: vec![Node::head()],
            free: Vec::new(),
        }
    }
}

impl<T> NodeStore<T> for FreeListStore<T> {
    #[inline]
    fn head(&self) -> Idx {
        0
    }

    fn alloc(&mut self, height: usize, value: T) -> Idx {
        if let Some(idx) = self.free.pop() {
            self.slots[idx as usize].refill(height, value);
            idx
        } else {
            let idx = self.slots.len() as Idx;
            self.slots.push(Node::new(height, value));
            idx
        }
    }

    fn release(&mut self, idx: Idx) -> T {
        debug_assert_ne!(idx, self.head(), "released the head sentinel");
        debug_assert!(!self.free.contains(&idx), "slot {} released twice", idx);
        let value = unsafe { self.slots[idx as usize].take_value() };
        self.free.push(idx);
        value
    }

    #[inline]
    fn node(&self, idx: Idx) -> &Node<T> {
        &self.slots[idx as usize]
    }

    #[inline]
    fn node_mut(&mut self, idx: Idx) -> &mut Node<T> {
        &mut self.slots[idx as usize]
    }
}
