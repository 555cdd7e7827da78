//! RawTable: the slot array plus its counters. Works on precomputed hashes
//! only, so it never calls `K: Hash`; `K: Eq` is called while probing.
//!
//! Counters:
//! - `size`: occupied slots.
//! - `locations_used`: what the load factor measures. Claiming a slot (empty
//!   or tombstoned) raises it and removal lowers it, so it tracks the live
//!   count and capacity stays proportional to it under churn.
//!
//! Tombstones are not counted, so a table may hold no empty slot at all.
//! Every probe is therefore bounded by the table length, and an insert with
//! no empty slot on its chain takes the first tombstone it passed.

use crate::slot::{empty_table, Slot};
use core::borrow::Borrow;
use core::mem;
use tracing::Level;

/// Length of a freshly constructed or cleared table.
pub const INITIAL_CAPACITY: usize = 11;

/// Upper bound on `locations_used / capacity` after any insertion.
pub const MAX_LOAD_FACTOR: f64 = 0.71;

/// Outcome of walking a probe chain for insertion.
#[derive(Debug, PartialEq, Eq)]
enum Probe {
    /// The key is live at this index.
    Found(usize),
    /// The key is absent. Holds the first tombstone seen on the chain, or
    /// the empty slot that ended it.
    Vacant(usize),
    /// Every slot is live. Unreachable while the load bound holds.
    Full,
}

/// Home index of `hash`. The hash is read as signed so negative values wrap
/// into `0..len` like any other.
#[inline]
pub(crate) fn home_index(hash: u64, len: usize) -> usize {
    (hash as i64).rem_euclid(len as i64) as usize
}

#[inline]
fn next_index(i: usize, len: usize) -> usize {
    if i + 1 == len {
        0
    } else {
        i + 1
    }
}

#[derive(Debug)]
pub(crate) struct RawTable<K, V> {
    slots: Box<[Slot<K, V>]>,
    size: usize,
    locations_used: usize,
}

impl<K, V> RawTable<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            slots: empty_table(INITIAL_CAPACITY),
            size: 0,
            locations_used: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn locations_used(&self) -> usize {
        self.locations_used
    }

    pub(crate) fn slots(&self) -> &[Slot<K, V>] {
        &self.slots
    }

    fn exceeds_load_with_one_more(&self) -> bool {
        (self.locations_used + 1) as f64 / self.slots.len() as f64 > MAX_LOAD_FACTOR
    }

    /// Index of the live entry for `q`. Walks past tombstones and other keys;
    /// an empty slot ends the search.
    fn locate<Q>(&self, hash: u64, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let len = self.slots.len();
        let mut i = home_index(hash, len);
        for _ in 0..len {
            match &self.slots[i] {
                Slot::Empty => return None,
                Slot::Occupied { key, hash: h, .. } if *h == hash && key.borrow() == q => {
                    return Some(i)
                }
                _ => {}
            }
            i = next_index(i, len);
        }
        None
    }

    fn probe(&self, hash: u64, key: &K) -> Probe
    where
        K: Eq,
    {
        let len = self.slots.len();
        let mut i = home_index(hash, len);
        let mut first_tombstone = None;
        for _ in 0..len {
            match &self.slots[i] {
                Slot::Empty => break,
                Slot::Tombstone => {
                    first_tombstone.get_or_insert(i);
                }
                Slot::Occupied { key: k, hash: h, .. } => {
                    if *h == hash && k == key {
                        return Probe::Found(i);
                    }
                }
            }
            i = next_index(i, len);
        }
        match first_tombstone {
            Some(index) => Probe::Vacant(index),
            None if self.slots[i].is_empty() => Probe::Vacant(i),
            None => Probe::Full,
        }
    }

    pub(crate) fn get<Q>(&self, hash: u64, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let i = self.locate(hash, q)?;
        self.slots[i].entry().map(|(_, v)| v)
    }

    pub(crate) fn get_mut<Q>(&mut self, hash: u64, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let i = self.locate(hash, q)?;
        match &mut self.slots[i] {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    pub(crate) fn contains<Q>(&self, hash: u64, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.locate(hash, q).is_some()
    }

    /// Inserts or updates. Grows first when a new pair would push the load
    /// factor past the bound; updates never grow.
    pub(crate) fn insert(&mut self, hash: u64, key: K, value: V) -> Option<V>
    where
        K: Eq,
    {
        loop {
            match self.probe(hash, &key) {
                Probe::Found(i) => match &mut self.slots[i] {
                    Slot::Occupied { value: old, .. } => return Some(mem::replace(old, value)),
                    _ => unreachable!("probe reported a live entry"),
                },
                Probe::Vacant(index) => {
                    if self.exceeds_load_with_one_more() {
                        self.rehash();
                        continue;
                    }
                    self.slots[index] = Slot::Occupied { key, value, hash };
                    self.size += 1;
                    self.locations_used += 1;
                    return None;
                }
                Probe::Full => self.rehash(),
            }
        }
    }

    /// Tombstones the slot holding `q` and hands back the pair.
    pub(crate) fn remove<Q>(&mut self, hash: u64, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let i = self.locate(hash, q)?;
        let pair = self.slots[i].bury()?;
        self.size -= 1;
        self.locations_used -= 1;
        Some(pair)
    }

    /// Rebuilds into a `2n + 1` array holding only the live entries.
    fn rehash(&mut self) {
        let old_capacity = self.slots.len();
        let new_capacity = 2 * old_capacity + 1;
        tracing::event!(
            Level::DEBUG,
            old_capacity,
            new_capacity,
            live = self.size,
            "rehashing table"
        );
        let old = mem::replace(&mut self.slots, empty_table(new_capacity));
        self.size = 0;
        self.locations_used = 0;
        for slot in old.into_vec() {
            if let Slot::Occupied { key, value, hash } = slot {
                self.place_unique(hash, key, value);
            }
        }
    }

    // Keys coming out of a rehash are distinct and the fresh array has no
    // tombstones, so the first empty slot on the chain is the destination.
    fn place_unique(&mut self, hash: u64, key: K, value: V) {
        let len = self.slots.len();
        let mut i = home_index(hash, len);
        while !self.slots[i].is_empty() {
            i = next_index(i, len);
        }
        self.slots[i] = Slot::Occupied { key, value, hash };
        self.size += 1;
        self.locations_used += 1;
    }

    pub(crate) fn clear(&mut self) {
        tracing::event!(
            Level::TRACE,
            capacity = self.slots.len(),
            live = self.size,
            "clearing table"
        );
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occupied_key<K: Copy, V>(t: &RawTable<K, V>, i: usize) -> Option<K> {
        t.slots()[i].entry().map(|(k, _)| *k)
    }

    /// Invariant: negative hashes land inside the table.
    #[test]
    fn home_index_normalizes_negative_hashes() {
        assert_eq!(home_index(12, 11), 1);
        assert_eq!(home_index((-1i64) as u64, 11), 10);
        assert_eq!(home_index((-11i64) as u64, 11), 0);
        assert_eq!(home_index((-12i64) as u64, 11), 10);
    }

    /// Invariant: colliding keys fill the chain forward from the home index.
    #[test]
    fn collisions_fill_contiguous_chain() {
        let mut t = RawTable::new();
        t.insert(0, 0u64, "zero");
        t.insert(1, 1, "one");
        t.insert(12, 12, "twelve");
        assert_eq!(occupied_key(&t, 0), Some(0));
        assert_eq!(occupied_key(&t, 1), Some(1));
        assert_eq!(occupied_key(&t, 2), Some(12));
        assert_eq!(t.get(12, &12), Some(&"twelve"));
    }

    /// Invariant: probing wraps from the last slot back to index 0.
    #[test]
    fn chain_wraps_at_table_end() {
        let mut t = RawTable::new();
        t.insert(10, 10u64, "a");
        t.insert(21, 21, "b");
        assert_eq!(occupied_key(&t, 0), Some(21));
        assert_eq!(t.get(21, &21), Some(&"b"));
        assert_eq!(t.get(32, &32), None);
    }

    /// Invariant: removal tombstones the slot and releases its location.
    #[test]
    fn remove_leaves_tombstone_and_releases_location() {
        let mut t = RawTable::new();
        t.insert(3, 3u64, "three");
        assert_eq!(t.locations_used(), 1);
        assert_eq!(t.remove(3, &3), Some((3, "three")));
        assert!(t.slots()[3].is_tombstone());
        assert_eq!(t.len(), 0);
        assert_eq!(t.locations_used(), 0);
        assert_eq!(t.get(3, &3), None);
        assert_eq!(t.remove(3, &3), None);
    }

    /// Invariant: lookups walk past tombstones to reach later entries.
    #[test]
    fn lookup_walks_past_tombstone() {
        let mut t = RawTable::new();
        t.insert(0, 0u64, "a");
        t.insert(11, 11, "b");
        t.insert(22, 22, "c");
        t.remove(11, &11);
        assert_eq!(t.get(22, &22), Some(&"c"));
        assert!(t.contains(0, &0));
        assert!(!t.contains(11, &11));
    }

    /// Invariant: a new key takes the first tombstone on its chain and claims
    /// its location again.
    #[test]
    fn insert_reuses_first_tombstone() {
        let mut t = RawTable::new();
        t.insert(0, 0u64, "a");
        t.insert(11, 11, "b");
        t.insert(22, 22, "c");
        t.remove(0, &0);
        t.remove(11, &11);
        assert_eq!(t.locations_used(), 1);
        assert_eq!(t.insert(33, 33, "d"), None);
        assert_eq!(occupied_key(&t, 0), Some(33));
        assert!(t.slots()[1].is_tombstone());
        assert_eq!(t.locations_used(), 2);
        assert_eq!(t.len(), 2);
    }

    /// Invariant: a key found beyond a tombstone is updated in place, not
    /// duplicated into the tombstone.
    #[test]
    fn update_past_tombstone_does_not_duplicate() {
        let mut t = RawTable::new();
        t.insert(0, 0u64, "a");
        t.insert(11, 11, "b");
        t.remove(0, &0);
        assert_eq!(t.insert(11, 11, "b2"), Some("b"));
        assert!(t.slots()[0].is_tombstone());
        assert_eq!(t.len(), 1);
        assert_eq!(t.get(11, &11), Some(&"b2"));
    }

    /// Invariant: growth happens before the insert that would cross the bound.
    #[test]
    fn growth_triggers_on_eighth_insert() {
        let mut t = RawTable::new();
        for k in 0..7u64 {
            t.insert(k, k, ());
        }
        assert_eq!(t.capacity(), INITIAL_CAPACITY);
        t.insert(7, 7, ());
        assert_eq!(t.capacity(), 23);
        assert_eq!(t.len(), 8);
        for k in 0..8u64 {
            assert!(t.contains(k, &k));
        }
    }

    /// Invariant: updates never grow the table, even at the load bound.
    #[test]
    fn update_at_bound_does_not_grow() {
        let mut t = RawTable::new();
        for k in 0..7u64 {
            t.insert(k, k, "v");
        }
        assert_eq!(t.insert(3, 3, "w"), Some("v"));
        assert_eq!(t.capacity(), INITIAL_CAPACITY);
    }

    /// Invariant: removed entries free room under the bound, so refilling
    /// them does not grow the table.
    #[test]
    fn removals_defer_growth() {
        let mut t = RawTable::new();
        for k in 0..7u64 {
            t.insert(k, k, ());
        }
        for k in 0..3u64 {
            t.remove(k, &k);
        }
        assert_eq!(t.locations_used(), 4);
        t.insert(100, 100, ());
        assert_eq!(t.capacity(), INITIAL_CAPACITY);
        assert_eq!(t.len(), 5);
        assert_eq!(t.locations_used(), 5);
    }

    /// Invariant: rehash discards tombstones; the new table holds only live entries.
    #[test]
    fn rehash_drops_tombstones() {
        let mut t = RawTable::new();
        for k in 0..7u64 {
            t.insert(k, k, ());
        }
        t.remove(0, &0);
        assert!(t.slots()[0].is_tombstone());
        // Home 1: the chain 1..=6 ends at empty slot 7, never passing slot 0.
        t.insert(100, 100, ());
        assert_eq!(t.capacity(), INITIAL_CAPACITY);
        t.insert(101, 101, ());
        assert_eq!(t.capacity(), 23);
        assert_eq!(t.len(), 8);
        assert_eq!(t.locations_used(), 8);
        assert!(t.slots().iter().all(|s| !s.is_tombstone()));
        for k in (1..7u64).chain([100, 101]) {
            assert!(t.contains(k, &k));
        }
    }

    /// Invariant: once every slot is live or tombstoned, probes stop after one
    /// lap; misses return, and inserts reuse the first tombstone.
    #[test]
    fn probes_terminate_without_empty_slots() {
        let mut t = RawTable::new();
        for k in 0..11u64 {
            t.insert(k, k, k);
            t.remove(k, &k);
        }
        assert!(t.slots().iter().all(|s| s.is_tombstone()));
        assert_eq!(t.get(5, &5), None);
        assert_eq!(t.remove(16, &16), None);
        assert_eq!(t.insert(16, 16, 16), None);
        assert_eq!(occupied_key(&t, 5), Some(16));
        assert_eq!(t.get(16, &16), Some(&16));
        assert_eq!(t.locations_used(), 1);
    }

    /// Invariant: insert/remove churn keeps capacity tied to the live count.
    #[test]
    fn heavy_churn_does_not_grow() {
        let mut t = RawTable::new();
        for round in 0..2_000u64 {
            t.insert(round, round, round);
            if round >= 2 {
                assert_eq!(t.remove(round - 2, &(round - 2)), Some((round - 2, round - 2)));
            }
            assert!(t.len() <= 3);
            assert_eq!(t.locations_used(), t.len());
            assert_eq!(t.capacity(), INITIAL_CAPACITY);
        }
        assert_eq!(t.get(9999, &9999), None);
    }

    #[test]
    fn clear_restores_initial_capacity() {
        let mut t = RawTable::new();
        for k in 0..20u64 {
            t.insert(k, k, ());
        }
        assert!(t.capacity() > INITIAL_CAPACITY);
        t.clear();
        assert_eq!(t.capacity(), INITIAL_CAPACITY);
        assert_eq!((t.len(), t.locations_used()), (0, 0));
    }
}
