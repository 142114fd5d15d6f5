//! Generational Identifiers
//!
//! Every entity table hands out 32-bit identifiers composed of a 24-bit
//! index into the table's columns and an 8-bit incarnation count stored in
//! the high bits. The incarnation is bumped each time an index is handed
//! out again, so a stale ID held by a caller never aliases the entity that
//! later reuses its slot.
//!
//! Index 0 is reserved for the dummy element present in every table. The
//! raw value 0 (index 0, incarnation 0) is the *sentinel* ID.
//!
//! # Example
//!
//! ```rust
//! use strata::core::id::{EntityId, IdAllocator};
//! use strata::scene::SceneNodeId;
//!
//! let mut ids = IdAllocator::<SceneNodeId>::new(4);
//! let id = ids.generate();
//! assert!(ids.has(id));
//! assert!(ids.erase(id));
//! assert!(!ids.has(id));
//! assert!(!ids.erase(id));
//! ```

use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

/// Largest index an identifier can address.
pub const MAX_IDS: u32 = 0x00FF_FFFF;

const INCARNATION_SHIFT: u32 = 24;

/// Common behaviour of the typed identifiers produced by [`define_id!`].
pub trait EntityId: Copy + Eq + Hash + Debug + Default + 'static {
    /// Builds an identifier from its raw `(incarnation << 24) | index` value.
    fn from_raw(raw: u32) -> Self;

    /// The raw 32-bit value.
    fn raw(self) -> u32;

    /// The sentinel identifier. It is never valid in any table.
    #[inline]
    #[must_use]
    fn invalid() -> Self {
        Self::from_raw(0)
    }

    /// Index into the owning table's columns.
    #[inline]
    fn index(self) -> usize {
        (self.raw() & MAX_IDS) as usize
    }

    #[inline]
    fn incarnation(self) -> u8 {
        (self.raw() >> INCARNATION_SHIFT) as u8
    }

    #[inline]
    fn is_sentinel(self) -> bool {
        self.raw() == 0
    }
}

#[inline]
pub(crate) fn compose(index: u32, incarnation: u8) -> u32 {
    (u32::from(incarnation) << INCARNATION_SHIFT) | (index & MAX_IDS)
}

/// Declares a table-scoped identifier type.
///
/// ```rust,ignore
/// define_id! {
///     /// Identifies a scene node.
///     pub struct SceneNodeId;
/// }
/// ```
#[macro_export]
macro_rules! define_id {
    ($(#[$meta:meta])* $vis:vis struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        $vis struct $name(u32);

        impl $name {
            /// The sentinel identifier.
            pub const INVALID: Self = Self(0);
        }

        impl $crate::core::id::EntityId for $name {
            #[inline]
            fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            fn raw(self) -> u32 {
                self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                use $crate::core::id::EntityId;
                write!(f, "{}({}v{})", stringify!($name), self.index(), self.incarnation())
            }
        }
    };
}

/// Hands out generational identifiers and tracks which are live.
///
/// Freed indices go onto a LIFO free-list. When the free-list is empty the
/// allocator grows by at least 1.5×. An index can also be *retired*: it is
/// dead immediately but only returns to the free-list on
/// [`recycle_retired`](Self::recycle_retired), which tables call at the end
/// of a tick so an index never names two entities within one tick.
#[derive(Debug, Clone)]
pub struct IdAllocator<I: EntityId> {
    // Raw ID last handed out for each index.
    slots: Vec<u32>,
    alive: Vec<bool>,
    free: Vec<u32>,
    retired: Vec<u32>,
    live_count: usize,
    _marker: PhantomData<fn() -> I>,
}

impl<I: EntityId> Default for IdAllocator<I> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<I: EntityId> IdAllocator<I> {
    /// Creates an allocator with room for `capacity` live IDs plus the dummy.
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        let mut allocator = Self {
            slots: vec![0],
            alive: vec![false],
            free: Vec::new(),
            retired: Vec::new(),
            live_count: 0,
            _marker: PhantomData,
        };
        allocator.reserve(capacity as usize + 1);
        allocator
    }

    /// Number of slots, including the dummy at index 0.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    #[must_use]
    pub fn max_capacity() -> usize {
        MAX_IDS as usize + 1
    }

    /// Number of live IDs.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_count
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Grows to at least `capacity` slots. Never shrinks.
    pub fn reserve(&mut self, capacity: usize) {
        let capacity = capacity.min(Self::max_capacity());
        let old_capacity = self.slots.len();
        if capacity <= old_capacity {
            return;
        }

        self.slots.resize(capacity, 0);
        self.alive.resize(capacity, false);

        // Fresh indices sit below already-freed ones so recycled slots are
        // reused first, and fresh ones come out in ascending order.
        let mut free: Vec<u32> = (old_capacity as u32..capacity as u32).rev().collect();
        free.extend_from_slice(&self.free);
        self.free = free;
    }

    /// Produces a fresh ID, or the sentinel when the index space is exhausted.
    pub fn generate(&mut self) -> I {
        if self.free.is_empty() {
            let capacity = self.slots.len();
            let grown = (capacity * 3).div_ceil(2).max(capacity + 1);
            self.reserve(grown);
        }

        let Some(index) = self.free.pop() else {
            log::error!(
                "ID space exhausted for {} ({} live IDs)",
                std::any::type_name::<I>(),
                self.live_count
            );
            return I::invalid();
        };

        let slot = index as usize;
        let incarnation = I::from_raw(self.slots[slot]).incarnation().wrapping_add(1);
        self.slots[slot] = compose(index, incarnation);
        self.alive[slot] = true;
        self.live_count += 1;

        I::from_raw(self.slots[slot])
    }

    /// Kills `id` and returns its index to the free-list.
    ///
    /// Returns `false` if `id` was not live, which makes erasure idempotent.
    pub fn erase(&mut self, id: I) -> bool {
        if !self.kill(id) {
            return false;
        }
        self.free.push(id.index() as u32);
        true
    }

    /// Kills `id` but holds its index back until [`recycle_retired`](Self::recycle_retired).
    pub fn retire(&mut self, id: I) -> bool {
        if !self.kill(id) {
            return false;
        }
        self.retired.push(id.index() as u32);
        true
    }

    /// Moves every retired index onto the free-list.
    pub fn recycle_retired(&mut self) {
        self.free.append(&mut self.retired);
    }

    fn kill(&mut self, id: I) -> bool {
        if !self.has(id) {
            return false;
        }
        self.alive[id.index()] = false;
        self.live_count -= 1;
        true
    }

    /// True iff `id` is live: in range, alive, and of the current incarnation.
    #[inline]
    #[must_use]
    pub fn has(&self, id: I) -> bool {
        let index = id.index();
        index != 0 && index < self.slots.len() && self.alive[index] && self.slots[index] == id.raw()
    }

    /// The ID most recently handed out for `index`, live or not.
    #[inline]
    #[must_use]
    pub fn id_at(&self, index: usize) -> I {
        self.slots.get(index).map_or_else(I::invalid, |&raw| I::from_raw(raw))
    }

    /// Live IDs in increasing index order.
    pub fn iter(&self) -> impl Iterator<Item = I> + '_ {
        self.alive
            .iter()
            .enumerate()
            .skip(1)
            .filter(|&(_, &alive)| alive)
            .map(|(index, _)| I::from_raw(self.slots[index]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::define_id! {
        struct TestId;
    }

    #[test]
    fn compose_places_incarnation_in_high_bits() {
        let id = TestId::from_raw(compose(5, 3));
        assert_eq!(id.index(), 5);
        assert_eq!(id.incarnation(), 3);
        assert_eq!(id.raw(), (3 << 24) | 5);
    }

    #[test]
    fn fresh_ids_come_out_in_ascending_order() {
        let mut ids = IdAllocator::<TestId>::new(3);
        let indices: Vec<usize> = (0..3).map(|_| ids.generate().index()).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn reused_index_gets_new_incarnation() {
        let mut ids = IdAllocator::<TestId>::new(1);
        let first = ids.generate();
        assert!(ids.erase(first));
        let second = ids.generate();
        assert_eq!(first.index(), second.index());
        assert_ne!(first, second);
        assert!(!ids.has(first));
        assert!(ids.has(second));
    }

    #[test]
    fn incarnation_wraps_without_producing_sentinel() {
        let mut ids = IdAllocator::<TestId>::new(1);
        for _ in 0..300 {
            let id = ids.generate();
            assert!(!id.is_sentinel());
            assert!(ids.erase(id));
        }
    }

    #[test]
    fn retired_index_is_not_reused_until_recycled() {
        let mut ids = IdAllocator::<TestId>::new(1);
        let first = ids.generate();
        assert!(ids.retire(first));
        let second = ids.generate();
        assert_ne!(first.index(), second.index());

        ids.recycle_retired();
        let third = ids.generate();
        assert_eq!(third.index(), first.index());
    }

    #[test]
    fn growth_is_at_least_one_and_a_half() {
        let mut ids = IdAllocator::<TestId>::new(3);
        let before = ids.capacity();
        for _ in 0..before {
            ids.generate();
        }
        assert!(ids.capacity() * 2 >= before * 3);
    }
}
