//! Per-tick change notifications.
//!
//! Each table owns one [`ChangeStream`]: a change mask per index and the
//! list of indices touched since the last reset. An index enters the list
//! the first time any bit is raised for it during a tick; further bits only
//! widen its mask. Resetting clears exactly the touched masks, so the cost
//! of a reset follows the number of changes rather than the table size.

use std::fmt::Debug;

use bitflags::Flags;

/// A bitflags type usable as a table's change mask.
///
/// Every table reports creation and destruction through the same stream as
/// its attribute changes.
pub trait ChangeFlags: Flags + Copy + Debug + 'static {
    const CREATED: Self;
    const DESTROYED: Self;
}

/// Declares a `bitflags` change mask with the mandatory `CREATED` and
/// `DESTROYED` bits followed by table-specific bits.
#[macro_export]
macro_rules! change_flags {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$bit_meta:meta])*
                const $bit:ident = $value:expr;
            )*
        }
    ) => {
        $crate::bitflags::bitflags! {
            $(#[$meta])*
            #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
            $vis struct $name: u8 {
                const CREATED = 1 << 0;
                const DESTROYED = 1 << 1;
                $(
                    $(#[$bit_meta])*
                    const $bit = $value;
                )*
            }
        }

        impl $crate::core::changes::ChangeFlags for $name {
            const CREATED: Self = Self::CREATED;
            const DESTROYED: Self = Self::DESTROYED;
        }
    };
}

#[derive(Debug, Clone)]
pub struct ChangeStream<F: ChangeFlags> {
    masks: Vec<F>,
    touched: Vec<u32>,
}

impl<F: ChangeFlags> Default for ChangeStream<F> {
    fn default() -> Self {
        Self {
            masks: vec![F::empty()],
            touched: Vec::new(),
        }
    }
}

impl<F: ChangeFlags> ChangeStream<F> {
    /// Grows the mask array to `capacity`. Never shrinks.
    pub fn resize(&mut self, capacity: usize) {
        if capacity > self.masks.len() {
            self.masks.resize(capacity, F::empty());
            self.touched.reserve(capacity / 4);
        }
    }

    /// Raises `bits` for `index`. The dummy index 0 is never flagged.
    pub fn flag(&mut self, index: usize, bits: F) {
        if index == 0 || bits.is_empty() {
            return;
        }
        let Some(mask) = self.masks.get_mut(index) else {
            return;
        };
        if mask.is_empty() {
            self.touched.push(index as u32);
        }
        mask.insert(bits);
    }

    #[inline]
    #[must_use]
    pub fn mask(&self, index: usize) -> F {
        self.masks.get(index).copied().unwrap_or_else(F::empty)
    }

    /// Indices touched this tick, in the order they were first flagged.
    #[inline]
    #[must_use]
    pub fn touched(&self) -> &[u32] {
        &self.touched
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.touched.is_empty()
    }

    /// Clears the masks of all touched indices and empties the list.
    pub fn reset(&mut self) {
        for index in self.touched.drain(..) {
            self.masks[index as usize] = F::empty();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::change_flags! {
        struct TestChanges {
            const UPDATED = 1 << 2;
        }
    }

    #[test]
    fn first_flag_appends_once() {
        let mut stream = ChangeStream::<TestChanges>::default();
        stream.resize(4);
        stream.flag(2, TestChanges::CREATED);
        stream.flag(2, TestChanges::UPDATED);
        stream.flag(2, TestChanges::UPDATED);
        assert_eq!(stream.touched(), &[2]);
        assert_eq!(stream.mask(2), TestChanges::CREATED | TestChanges::UPDATED);
    }

    #[test]
    fn dummy_and_empty_bits_are_ignored() {
        let mut stream = ChangeStream::<TestChanges>::default();
        stream.resize(4);
        stream.flag(0, TestChanges::CREATED);
        stream.flag(1, TestChanges::empty());
        assert!(stream.is_empty());
    }

    #[test]
    fn reset_clears_touched_masks() {
        let mut stream = ChangeStream::<TestChanges>::default();
        stream.resize(4);
        stream.flag(1, TestChanges::CREATED);
        stream.flag(3, TestChanges::DESTROYED);
        stream.reset();
        assert!(stream.is_empty());
        assert!(stream.mask(1).is_empty());
        assert!(stream.mask(3).is_empty());
    }
}
