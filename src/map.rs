//! OpenAddressingMap: the public surface. Hashes keys with `S`, guards each
//! entry point against reentrancy, and delegates storage to `RawTable`.

use crate::error::{require, MapError};
use crate::reentrancy::DebugReentrancy;
use crate::slot::Slot;
use crate::table::RawTable;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

pub struct OpenAddressingMap<K, V, S = RandomState> {
    hasher: S,
    raw: RawTable<K, V>,
    reentrancy: DebugReentrancy,
}

impl<K, V> OpenAddressingMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, V> Default for OpenAddressingMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over live entries in slot order. Order is unspecified and
/// changes across rehashes.
pub struct Iter<'a, K, V> {
    it: core::slice::Iter<'a, Slot<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.by_ref().find_map(Slot::entry)
    }
}

impl<'a, K, V, S> IntoIterator for &'a OpenAddressingMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        Iter {
            it: self.raw.slots().iter(),
        }
    }
}

impl<K, V, S> OpenAddressingMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            raw: RawTable::new(),
            reentrancy: DebugReentrancy::new(),
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// Current length of the backing array.
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Slots claimed by live entries. Removal releases a slot's claim even
    /// though its tombstone stays in place.
    pub fn locations_used(&self) -> usize {
        self.raw.locations_used()
    }

    /// `locations_used / capacity`. Never above
    /// [`MAX_LOAD_FACTOR`](crate::MAX_LOAD_FACTOR) after an insert.
    pub fn load_factor(&self) -> f64 {
        self.raw.locations_used() as f64 / self.raw.capacity() as f64
    }

    /// Inserts `key`, or replaces its value and returns the old one.
    ///
    /// The table grows to `2n + 1` before a new key would push the load
    /// factor past [`MAX_LOAD_FACTOR`](crate::MAX_LOAD_FACTOR). Updates of a
    /// present key never grow it.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(&key);
        self.raw.insert(hash, key, value)
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        self.raw.get(self.make_hash(q), q)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        self.raw.get_mut(hash, q)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        self.raw.contains(self.make_hash(q), q)
    }

    /// Removes `q` and returns the owned pair. The vacated slot becomes a
    /// tombstone: lookups walk past it and a later insert may reuse it. It
    /// no longer counts toward the load factor.
    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        self.raw.remove(hash, q)
    }

    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    /// True if any live entry holds `value`. Scans the whole table.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        let _g = self.reentrancy.enter();
        self.iter().any(|(_, v)| v == value)
    }

    /// Borrowing iterator over live entries. Runs no user code itself, so it
    /// takes no guard; the caller owns whatever it does with the items.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.into_iter()
    }

    /// Snapshot of the live keys.
    pub fn key_set(&self) -> hashbrown::HashSet<K>
    where
        K: Clone,
    {
        let _g = self.reentrancy.enter();
        self.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Snapshot of the live values; duplicates are kept.
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        let _g = self.reentrancy.enter();
        self.iter().map(|(_, v)| v.clone()).collect()
    }

    /// Snapshot of the live pairs. Each key appears exactly once.
    pub fn entry_set(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        let _g = self.reentrancy.enter();
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Drops every entry and reallocates at
    /// [`INITIAL_CAPACITY`](crate::INITIAL_CAPACITY).
    pub fn clear(&mut self) {
        let _g = self.reentrancy.enter();
        self.raw.clear();
    }

    // Nullable-input bridge. `None` fails with `MapError::InvalidArgument`
    // before the map is touched.

    pub fn try_insert(&mut self, key: Option<K>, value: Option<V>) -> Result<Option<V>, MapError> {
        let key = require(key, "key")?;
        let value = require(value, "value")?;
        Ok(self.insert(key, value))
    }

    pub fn try_get<Q>(&self, q: Option<&Q>) -> Result<Option<&V>, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        Ok(self.get(require(q, "key")?))
    }

    pub fn try_remove<Q>(&mut self, q: Option<&Q>) -> Result<Option<V>, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        Ok(self.remove(require(q, "key")?))
    }

    pub fn try_contains_key<Q>(&self, q: Option<&Q>) -> Result<bool, MapError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        Ok(self.contains_key(require(q, "key")?))
    }

    pub fn try_contains_value(&self, value: Option<&V>) -> Result<bool, MapError>
    where
        V: PartialEq,
    {
        Ok(self.contains_value(require(value, "value")?))
    }

    #[cfg(test)]
    pub(crate) fn raw(&self) -> &RawTable<K, V> {
        &self.raw
    }
}

impl<K, V, S> fmt::Debug for OpenAddressingMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let _g = self.reentrancy.enter();
        f.debug_map().entries(self).finish()
    }
}
