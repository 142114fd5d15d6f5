//! Struct-of-arrays entity tables.
//!
//! A [`Table`] couples an [`IdAllocator`], a [`ChangeStream`] and a set of
//! attribute columns. The generic part owns the lifecycle every table
//! shares (allocate / reserve / deallocate, create / destroy bookkeeping,
//! iteration and change notifications); each concrete table adds typed
//! getters and setters in an `impl Table<TheirColumns>` block next to its
//! column definition.
//!
//! Index 0 of every column holds the dummy element. Reads through a dead or
//! sentinel ID are routed to it and return its neutral defaults; writes
//! through such IDs are dropped.

use bitflags::Flags;

use crate::core::changes::{ChangeFlags, ChangeStream};
use crate::core::id::{EntityId, IdAllocator};

/// The attribute storage of one table.
pub trait Columns: Default {
    type Id: EntityId;
    type Changes: ChangeFlags;

    /// Human readable table name used in log output.
    const NAME: &'static str;

    /// Grows every column to `capacity` entries. Existing entries keep
    /// their values; new entries hold the dummy defaults.
    fn resize(&mut self, capacity: usize);
}

#[derive(Debug)]
pub struct Table<C: Columns> {
    pub(crate) ids: IdAllocator<C::Id>,
    changes: ChangeStream<C::Changes>,
    pub(crate) columns: C,
    allocated: bool,
}

impl<C: Columns> Default for Table<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Columns> Table<C> {
    /// Creates an unallocated table holding only the dummy element.
    #[must_use]
    pub fn new() -> Self {
        let mut columns = C::default();
        columns.resize(1);
        Self {
            ids: IdAllocator::default(),
            changes: ChangeStream::default(),
            columns,
            allocated: false,
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Allocates storage for `capacity` entities plus the dummy.
    ///
    /// Does nothing if the table is already allocated.
    pub fn allocate(&mut self, capacity: u32) {
        if self.allocated {
            return;
        }
        *self = Self::new();
        self.allocated = true;
        self.reserve(capacity as usize + 1);
    }

    /// Drops all storage, returning the table to its unallocated state.
    pub fn deallocate(&mut self) {
        if !self.allocated {
            return;
        }
        *self = Self::new();
    }

    #[inline]
    #[must_use]
    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    /// Number of slots, including the dummy.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.ids.capacity()
    }

    /// Grows every column to at least `capacity`. Never shrinks.
    pub fn reserve(&mut self, capacity: usize) {
        self.ids.reserve(capacity);
        self.sync_capacity();
    }

    fn sync_capacity(&mut self) {
        let capacity = self.ids.capacity();
        self.columns.resize(capacity);
        self.changes.resize(capacity);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn has(&self, id: C::Id) -> bool {
        self.ids.has(id)
    }

    /// Number of live entities.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Live IDs in increasing index order.
    pub fn get_iterable(&self) -> impl Iterator<Item = C::Id> + '_ {
        self.ids.iter()
    }

    /// IDs with a non-empty change mask this tick, each exactly once,
    /// including entities destroyed during the tick.
    pub fn get_changed(&self) -> impl Iterator<Item = C::Id> + '_ {
        self.changes.touched().iter().map(|&index| self.ids.id_at(index as usize))
    }

    /// Like [`get_changed`](Self::get_changed) but paired with each mask.
    pub fn get_changed_with_masks(&self) -> impl Iterator<Item = (C::Id, C::Changes)> + '_ {
        self.changes.touched().iter().map(|&index| {
            let index = index as usize;
            (self.ids.id_at(index), self.changes.mask(index))
        })
    }

    /// The change mask of `id` this tick. Empty for IDs that were not
    /// touched or whose index now belongs to another incarnation.
    #[must_use]
    pub fn get_changes(&self, id: C::Id) -> C::Changes {
        let index = id.index();
        if index == 0 || self.ids.id_at(index) != id {
            return C::Changes::empty();
        }
        self.changes.mask(index)
    }

    #[inline]
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Clears every change bit and list, and releases indices destroyed
    /// since the last reset for reuse.
    pub fn reset_change_notifications(&mut self) {
        self.changes.reset();
        self.ids.recycle_retired();
    }

    // ========================================================================
    // Internal bookkeeping for concrete tables
    // ========================================================================

    /// Generates an ID, grows the columns if needed and flags creation.
    pub(crate) fn acquire(&mut self) -> Option<(C::Id, usize)> {
        if !self.allocated {
            log::debug!("{} used before allocate(); allocating on demand", C::NAME);
            self.allocated = true;
        }

        let old_capacity = self.ids.capacity();
        let id = self.ids.generate();
        if id.is_sentinel() {
            log::error!("{}: capacity exhausted", C::NAME);
            return None;
        }
        if old_capacity != self.ids.capacity() {
            self.sync_capacity();
        }

        let index = id.index();
        self.changes.flag(index, C::Changes::CREATED);
        Some((id, index))
    }

    /// Kills `id` and flags its destruction. Column data is left in place.
    pub(crate) fn release(&mut self, id: C::Id) -> Option<usize> {
        if !self.ids.retire(id) {
            log::trace!("{}: ignoring destroy of dead ID {:?}", C::NAME, id);
            return None;
        }
        let index = id.index();
        self.changes.flag(index, C::Changes::DESTROYED);
        Some(index)
    }

    /// Column index of a live `id`.
    #[inline]
    pub(crate) fn slot(&self, id: C::Id) -> Option<usize> {
        self.ids.has(id).then(|| id.index())
    }

    /// Column index of `id`, or the dummy index for dead and sentinel IDs.
    #[inline]
    pub(crate) fn slot_or_dummy(&self, id: C::Id) -> usize {
        if self.ids.has(id) { id.index() } else { 0 }
    }

    /// Raises `bits` for `index`.
    #[inline]
    pub(crate) fn flag(&mut self, index: usize, bits: C::Changes) {
        self.changes.flag(index, bits);
    }

    /// Resolves `id` for a write, logging and returning `None` when it is dead.
    #[inline]
    pub(crate) fn slot_for_write(&self, id: C::Id) -> Option<usize> {
        let slot = self.slot(id);
        if slot.is_none() {
            log::trace!("{}: ignoring write to dead ID {:?}", C::NAME, id);
        }
        slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::define_id! {
        struct RowId;
    }

    crate::change_flags! {
        struct RowChanges {
            const VALUE = 1 << 2;
        }
    }

    #[derive(Default)]
    struct RowColumns {
        values: Vec<i32>,
    }

    impl Columns for RowColumns {
        type Id = RowId;
        type Changes = RowChanges;
        const NAME: &'static str = "Rows";

        fn resize(&mut self, capacity: usize) {
            self.values.resize(capacity, 0);
        }
    }

    impl Table<RowColumns> {
        fn create(&mut self, value: i32) -> RowId {
            let Some((id, index)) = self.acquire() else {
                return RowId::INVALID;
            };
            self.columns.values[index] = value;
            id
        }

        fn set_value(&mut self, id: RowId, value: i32) {
            if let Some(index) = self.slot_for_write(id) {
                self.columns.values[index] = value;
                self.flag(index, RowChanges::VALUE);
            }
        }

        fn value(&self, id: RowId) -> i32 {
            self.columns.values[self.slot_or_dummy(id)]
        }

        fn destroy(&mut self, id: RowId) {
            self.release(id);
        }
    }

    #[test]
    fn columns_follow_growth() {
        let mut rows = Table::<RowColumns>::new();
        rows.allocate(1);
        let ids: Vec<RowId> = (0..10).map(|i| rows.create(i)).collect();
        assert!(rows.capacity() > 10);
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(rows.value(*id), i as i32);
        }
    }

    #[test]
    fn dead_ids_read_dummy_and_ignore_writes() {
        let mut rows = Table::<RowColumns>::new();
        rows.allocate(2);
        let id = rows.create(7);
        rows.destroy(id);
        rows.set_value(id, 9);
        assert_eq!(rows.value(id), 0);
        rows.set_value(RowId::INVALID, 3);
        assert_eq!(rows.value(RowId::INVALID), 0);
    }

    #[test]
    fn destroyed_index_waits_for_reset_before_reuse() {
        let mut rows = Table::<RowColumns>::new();
        rows.allocate(4);
        let a = rows.create(1);
        rows.destroy(a);
        let b = rows.create(2);
        assert_ne!(a.index(), b.index());

        let changed: Vec<RowId> = rows.get_changed().collect();
        assert_eq!(changed, vec![a, b]);
        assert_eq!(rows.get_changes(a), RowChanges::CREATED | RowChanges::DESTROYED);

        rows.reset_change_notifications();
        let c = rows.create(3);
        assert_eq!(c.index(), a.index());
        assert!(rows.get_changes(a).is_empty());
        assert_eq!(rows.get_changes(c), RowChanges::CREATED);
    }
}
