//! Slot: one cell of the backing array.
//!
//! A slot moves `Empty -> Occupied -> Tombstone -> Occupied ...`; it only
//! returns to `Empty` when the whole array is replaced (rehash or clear).

use core::mem;

#[derive(Debug)]
pub(crate) enum Slot<K, V> {
    Empty,
    Occupied { key: K, value: V, hash: u64 },
    Tombstone,
}

impl<K, V> Default for Slot<K, V> {
    fn default() -> Self {
        Slot::Empty
    }
}

impl<K, V> Slot<K, V> {
    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    #[cfg(test)]
    pub(crate) fn is_tombstone(&self) -> bool {
        matches!(self, Slot::Tombstone)
    }

    #[inline]
    pub(crate) fn entry(&self) -> Option<(&K, &V)> {
        match self {
            Slot::Occupied { key, value, .. } => Some((key, value)),
            _ => None,
        }
    }

    /// Marks an occupied slot as removed and hands back its pair.
    /// Empty and tombstoned slots are left untouched.
    pub(crate) fn bury(&mut self) -> Option<(K, V)> {
        if !matches!(self, Slot::Occupied { .. }) {
            return None;
        }
        match mem::replace(self, Slot::Tombstone) {
            Slot::Occupied { key, value, .. } => Some((key, value)),
            _ => unreachable!("checked occupied above"),
        }
    }
}

/// Allocates `len` empty slots.
pub(crate) fn empty_table<K, V>(len: usize) -> Box<[Slot<K, V>]> {
    core::iter::repeat_with(Slot::default).take(len).collect()
}
