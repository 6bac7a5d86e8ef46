//! An ordered set backed by a randomized skip list.
//!
//! Elements live in a multi-level chain. Level 0 links every element in
//! ascending order; each level above links a random subset of the level
//! below, so a search can vault over long runs of the bottom chain:
//!
//! ```text
//! level 2: HEAD ------------> 3 ----------------------> NULL
//! level 1: HEAD ----> 2 ----> 3 --------------> 7 ----> NULL
//! level 0: HEAD -> 1 -> 2 -> 3 -> 4 -> 5 -> 7 -> NULL
//! ```
//!
//! A node's height is drawn at insertion from a geometric distribution
//! (each extra level with probability 1/2) and never changes afterwards,
//! which keeps search, insert, and erase at O(log n) expected cost with no
//! rebalancing. Ordering comes from an injected [`Comparator`]; two
//! elements are duplicates when the relation calls them equal, and
//! duplicates are never stored.
//!
//! # Operations
//!
//! - `insert` / `erase` / `take`: O(log n) expected
//! - `find` / `upper_bound` / `contains`: O(log n) expected
//! - `iter`: O(n), ascending order
//! - `len` / `is_empty` / `height`: O(1)

mod cursor;
pub mod level;
pub mod store;

use std::fmt;
use std::marker::PhantomData;
use std::mem;

use crate::compare::{Comparator, NaturalOrder};

use self::level::{LevelGenerator, MAX_LEVEL};
use self::store::{FreeListStore, Idx, NULL, NodeStore};

pub use self::cursor::{Cursor, IntoIter};

/// An ordered set of unique elements, stored as a skip list.
///
/// `C` is the ordering relation and `S` the node store; both are supplied
/// at construction and fixed for the list's lifetime. With the defaults
/// this behaves as a set ordered by `T: Ord`.
pub struct SkipList<T, C = NaturalOrder, S = FreeListStore<T>>
where
    S: NodeStore<T>,
{
    /// Node storage. `store.head()` is the sentinel slot.
    store: S,
    /// The ordering relation.
    cmp: C,
    /// Levels currently in use: the height of the tallest live node, and 1
    /// when the list is empty. Always within 1..=MAX_LEVEL.
    height: usize,
    /// Number of stored elements.
    len: usize,
    /// Per-list source of node heights.
    levels: LevelGenerator,
    marker: PhantomData<T>,
}

impl<T: Ord> SkipList<T> {
    /// An empty list ordered by `T`'s natural order.
    pub fn new() -> SkipList<T> {
        SkipList::with_parts(NaturalOrder, FreeListStore::default())
    }
}

impl<T, C> SkipList<T, C> {
    /// An empty list using the given ordering relation.
    pub fn with_comparator(cmp: C) -> SkipList<T, C> {
        SkipList::with_parts(cmp, FreeListStore::default())
    }
}

impl<T, C, S: NodeStore<T>> SkipList<T, C, S> {
    /// An empty list using the given ordering relation and node store.
    pub fn with_parts(cmp: C, store: S) -> SkipList<T, C, S> {
        SkipList {
            store,
            cmp,
            height: 1,
            len: 0,
            levels: LevelGenerator::new(),
            marker: PhantomData,
        }
    }

    /// Number of stored elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the list holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels currently in use. At least 1, even when empty.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// A cursor at the smallest element, or at the end if the list is
    /// empty.
    pub fn iter(&self) -> Cursor<'_, T, C, S> {
        let first = self.store.node(self.store.head()).next(0);
        Cursor::new(self, first)
    }

    /// The cursor at the end position.
    pub fn end(&self) -> Cursor<'_, T, C, S> {
        Cursor::new(self, NULL)
    }

    /// Remove every element, dropping the values and restoring the head
    /// sentinel to its freshly constructed state.
    pub fn clear(&mut self) {
        let head = self.store.head();
        let mut at = self.store.node(head).next(0);
        while at != NULL {
            let next = self.store.node(at).next(0);
            self.store.release(at);
            at = next;
        }
        for level in 0..MAX_LEVEL {
            self.store.node_mut(head).set_next(level, NULL);
        }
        self.height = 1;
        self.len = 0;
    }
}

impl<T, C: Comparator<T>, S: NodeStore<T>> SkipList<T, C, S> {
    /// Walk toward `target`, recording the last node that orders strictly
    /// before it at every level.
    ///
    /// The walk starts at the head on the topmost active level, advances
    /// while the next node is still before the target, then drops a level
    /// and continues from where it stalled. Entries above the active
    /// height stay at the head, so a node taller than the current height
    /// splices against the returned array as-is. The level-0 successor of
    /// `preds[0]` is the first node that does not order before `target`.
    fn predecessors(&self, target: &T) -> [Idx; MAX_LEVEL] {
        let mut preds = [self.store.head(); MAX_LEVEL];
        let mut at = self.store.head();
        for level in (0..self.height).rev() {
            loop {
                let next = self.store.node(at).next(level);
                if next == NULL {
                    break;
                }
                let ahead = unsafe { self.store.node(next).value() };
                if self.cmp.cmp(ahead, target).is_lt() {
                    at = next;
                } else {
                    break;
                }
            }
            preds[level] = at;
        }
        preds
    }

    /// A cursor at the element the relation calls equal to `target`, or at
    /// the end if there is none.
    pub fn find(&self, target: &T) -> Cursor<'_, T, C, S> {
        let preds = self.predecessors(target);
        let candidate = self.store.node(preds[0]).next(0);
        if candidate != NULL {
            let found = unsafe { self.store.node(candidate).value() };
            if self.cmp.cmp(found, target).is_eq() {
                return Cursor::new(self, candidate);
            }
        }
        self.end()
    }

    /// Whether an element equal to `target` is stored.
    pub fn contains(&self, target: &T) -> bool {
        !self.find(target).is_end()
    }

    /// A cursor at the first element ordering strictly after `target`, or
    /// at the end if every element orders at or before it.
    pub fn upper_bound(&self, target: &T) -> Cursor<'_, T, C, S> {
        let mut at = self.store.head();
        for level in (0..self.height).rev() {
            loop {
                let next = self.store.node(at).next(level);
                if next == NULL {
                    break;
                }
                let ahead = unsafe { self.store.node(next).value() };
                if self.cmp.cmp(ahead, target).is_gt() {
                    break;
                }
                at = next;
            }
        }
        Cursor::new(self, self.store.node(at).next(0))
    }

    /// Insert `value`, keeping elements unique under the ordering
    /// relation.
    ///
    /// Returns the cursor at the stored element and whether it was newly
    /// inserted. When an equal element is already present the incoming
    /// value is dropped and the list is left untouched.
    pub fn insert(&mut self, value: T) -> (Cursor<'_, T, C, S>, bool) {
        let preds = self.predecessors(&value);

        let succ = self.store.node(preds[0]).next(0);
        if succ != NULL {
            let existing = unsafe { self.store.node(succ).value() };
            if self.cmp.cmp(existing, &value).is_eq() {
                return (Cursor::new(self, succ), false);
            }
        }

        let height = self.levels.random_level();
        let idx = self.store.alloc(height, value);
        if height > self.height {
            // preds above the old active height already name the head.
            self.height = height;
        }
        for level in 0..height {
            let after = self.store.node(preds[level]).next(level);
            self.store.node_mut(idx).set_next(level, after);
            self.store.node_mut(preds[level]).set_next(level, idx);
        }
        self.len += 1;
        self.check_invariants();

        (Cursor::new(self, idx), true)
    }

    /// Remove the element equal to `target`, handing it back.
    pub fn take(&mut self, target: &T) -> Option<T> {
        let preds = self.predecessors(target);

        let victim = self.store.node(preds[0]).next(0);
        if victim == NULL {
            return None;
        }
        {
            let found = unsafe { self.store.node(victim).value() };
            if !self.cmp.cmp(found, target).is_eq() {
                return None;
            }
        }

        // Unlink bottom-up. The first level whose predecessor skips past
        // the victim ends the loop: a node absent from one level is absent
        // from every level above it.
        for level in 0..self.height {
            if self.store.node(preds[level]).next(level) != victim {
                break;
            }
            let after = self.store.node(victim).next(level);
            self.store.node_mut(preds[level]).set_next(level, after);
        }

        let value = self.store.release(victim);
        self.len -= 1;

        let head = self.store.head();
        while self.height > 1 && self.store.node(head).next(self.height - 1) == NULL {
            self.height -= 1;
        }
        self.check_invariants();

        Some(value)
    }

    /// Remove the element equal to `target`. Returns how many elements
    /// were removed: 1 on a hit, 0 when nothing matched.
    pub fn erase(&mut self, target: &T) -> usize {
        match self.take(target) {
            Some(_) => 1,
            None => 0,
        }
    }

    /// Verify the structural invariants. Compiled out of release builds.
    #[cfg(debug_assertions)]
    fn check_invariants(&self) {
        let head = self.store.head();

        // Level 0 visits every element exactly once, strictly ascending.
        let mut count = 0;
        let mut tallest = 1;
        let mut prev: Option<&T> = None;
        let mut at = self.store.node(head).next(0);
        while at != NULL {
            let node = self.store.node(at);
            let value = unsafe { node.value() };
            if let Some(prev) = prev {
                assert!(
                    self.cmp.cmp(prev, value).is_lt(),
                    "INVARIANT VIOLATED: level-0 chain not strictly ascending"
                );
            }
            prev = Some(value);
            tallest = tallest.max(node.height());
            count += 1;
            at = node.next(0);
        }
        assert_eq!(
            count, self.len,
            "INVARIANT VIOLATED: level-0 count {} != len {}",
            count, self.len
        );
        assert_eq!(
            tallest, self.height,
            "INVARIANT VIOLATED: tallest node height {} != active height {}",
            tallest, self.height
        );

        // Every level above is a strictly ascending chain that reaches
        // exactly the nodes tall enough for it.
        for level in 1..self.height {
            let mut reachable = 0;
            let mut prev: Option<&T> = None;
            let mut at = self.store.node(head).next(level);
            while at != NULL {
                let node = self.store.node(at);
                assert!(
                    node.height() > level,
                    "INVARIANT VIOLATED: node linked above its height"
                );
                let value = unsafe { node.value() };
                if let Some(prev) = prev {
                    assert!(
                        self.cmp.cmp(prev, value).is_lt(),
                        "INVARIANT VIOLATED: level-{} chain not strictly ascending",
                        level
                    );
                }
                prev = Some(value);
                reachable += 1;
                at = node.next(level);
            }

            let mut tall_enough = 0;
            let mut at = self.store.node(head).next(0);
            while at != NULL {
                let node = self.store.node(at);
                if node.height() > level {
                    tall_enough += 1;
                }
                at = node.next(0);
            }
            assert_eq!(
                reachable, tall_enough,
                "INVARIANT VIOLATED: level-{} reaches {} of {} tall-enough nodes",
                level, reachable, tall_enough
            );
        }

        // No link escapes above the active height.
        for level in self.height..MAX_LEVEL {
            assert_eq!(
                self.store.node(head).next(level),
                NULL,
                "INVARIANT VIOLATED: head linked above the active height"
            );
        }
    }

    #[cfg(not(debug_assertions))]
    #[inline(always)]
    fn check_invariants(&self) {}
}

impl<T, C, S: NodeStore<T>> Drop for SkipList<T, C, S> {
    fn drop(&mut self) {
        // One walk along the bottom level drops every stored value; the
        // store frees the slots themselves when it drops.
        let mut at = self.store.node(self.store.head()).next(0);
        while at != NULL {
            let next = self.store.node(at).next(0);
            self.store.release(at);
            at = next;
        }
    }
}

impl<T, C, S> Clone for SkipList<T, C, S>
where
    T: Clone,
    C: Comparator<T> + Clone,
    S: NodeStore<T>,
{
    /// An independent deep copy: every element is re-inserted, so the copy
    /// draws its own level layout rather than mirroring the original's.
    fn clone(&self) -> SkipList<T, C, S> {
        let mut copy = SkipList {
            store: S::default(),
            cmp: self.cmp.clone(),
            height: 1,
            len: 0,
            levels: self.levels.clone(),
            marker: PhantomData,
        };
        for value in self.iter() {
            copy.insert(value.clone());
        }
        copy
    }
}

impl<T, C, S> Default for SkipList<T, C, S>
where
    C: Default,
    S: NodeStore<T>,
{
    fn default() -> SkipList<T, C, S> {
        SkipList::with_parts(C::default(), S::default())
    }
}

impl<T, C, S> fmt::Debug for SkipList<T, C, S>
where
    T: fmt::Debug,
    S: NodeStore<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, C, S> FromIterator<T> for SkipList<T, C, S>
where
    C: Comparator<T> + Default,
    S: NodeStore<T>,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> SkipList<T, C, S> {
        let mut list = SkipList::with_parts(C::default(), S::default());
        list.extend(iter);
        list
    }
}

impl<T, C, S> Extend<T> for SkipList<T, C, S>
where
    C: Comparator<T>,
    S: NodeStore<T>,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T, C, S: NodeStore<T>> IntoIterator for &'a SkipList<T, C, S> {
    type Item = &'a T;
    type IntoIter = Cursor<'a, T, C, S>;

    fn into_iter(self) -> Cursor<'a, T, C, S> {
        self.iter()
    }
}

impl<T, C, S: NodeStore<T>> IntoIterator for SkipList<T, C, S> {
    type Item = T;
    type IntoIter = IntoIter<T, S>;

    /// Drain the list in ascending order.
    fn into_iter(mut self) -> IntoIter<T, S> {
        let store = mem::take(&mut self.store);
        self.height = 1;
        self.len = 0;
        let first = store.node(store.head()).next(0);
        IntoIter::new(store, first)
    }
}
