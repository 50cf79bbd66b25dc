use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Debug;

use crate::error::ensure_mutable;
use crate::hash_table::Mode;
use crate::sequence_table::Keys;
use crate::sequence_table::SequenceTable;
use crate::sequence_table::Unit;

/// A map from byte or character sequences to values.
///
/// Keys are held by a [`SequenceTable`]; values live in a parallel array
/// with the same entry indices. Lookups take any `&[C]`, so a token can be
/// looked up straight out of a scanner buffer.
///
/// # Examples
///
/// ```rust
/// use symtab::SequenceMap;
///
/// let mut macros: SequenceMap<&str> = SequenceMap::new();
/// macros.insert(b"NULL", "((void*)0)");
/// macros.insert(b"EOF", "(-1)");
///
/// let line = b"if (c == EOF) return NULL;";
/// assert_eq!(macros.get(&line[9..12]), Some(&"(-1)"));
/// assert_eq!(macros.insert(b"EOF", "-1"), Some("(-1)"));
/// assert_eq!(macros.remove(b"NULL"), Some("((void*)0)"));
/// assert_eq!(macros.len(), 1);
/// ```
#[derive(Clone)]
pub struct SequenceMap<V, C = u8> {
    table: SequenceTable<C>,
    values: Vec<V>,
}

impl<V: Debug, C: Unit> Debug for SequenceMap<V, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V, C: Unit> Default for SequenceMap<V, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, C: Unit> SequenceMap<V, C> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty map sized for `hint` entries.
    pub fn with_capacity(hint: usize) -> Self {
        let table = SequenceTable::with_capacity(hint);
        let values = Vec::with_capacity(table.capacity());
        Self { table, values }
    }

    /// Creates an empty map that panics on every mutation.
    ///
    /// ```rust
    /// use symtab::SequenceMap;
    ///
    /// const NO_MACROS: SequenceMap<u32> = SequenceMap::frozen_empty();
    /// assert!(NO_MACROS.get(b"X").is_none());
    /// ```
    pub const fn frozen_empty() -> Self {
        Self {
            table: SequenceTable::frozen_empty(),
            values: Vec::new(),
        }
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of entries the map holds before it must grow.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the current lookup strategy.
    #[inline]
    pub fn mode(&self) -> Mode {
        self.table.mode()
    }

    /// Returns `true` for a [`frozen_empty`](Self::frozen_empty) map.
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.table.is_frozen()
    }

    /// Returns the key table.
    pub fn key_table(&self) -> &SequenceTable<C> {
        &self.table
    }

    /// Inserts `value` under a copy of `key`.
    ///
    /// Returns the previous value if `key` was present; the stored key copy
    /// is kept in that case.
    ///
    /// # Panics
    ///
    /// Panics if the map is frozen.
    #[track_caller]
    pub fn insert(&mut self, key: &[C], value: V) -> Option<V> {
        let (index, inserted) = self.table.insert_full(key);
        if inserted {
            self.values.push(value);
            None
        } else {
            Some(core::mem::replace(&mut self.values[index], value))
        }
    }

    /// Returns the entry index of `key`.
    #[inline]
    pub fn lookup(&self, key: &[C]) -> Option<usize> {
        self.table.lookup(key)
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &[C]) -> Option<&V> {
        self.lookup(key).map(|index| &self.values[index])
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut(&mut self, key: &[C]) -> Option<&mut V> {
        self.lookup(key).map(|index| &mut self.values[index])
    }

    /// Returns `true` if `key` is present.
    #[inline]
    pub fn contains_key(&self, key: &[C]) -> bool {
        self.table.contains_key(key)
    }

    /// Returns the key at entry `index`.
    #[inline]
    pub fn key_at(&self, index: usize) -> Option<&[C]> {
        self.table.key_at(index)
    }

    /// Returns the value at entry `index`.
    #[inline]
    pub fn value_at(&self, index: usize) -> Option<&V> {
        self.values.get(index)
    }

    /// Returns a mutable reference to the value at entry `index`.
    #[inline]
    pub fn value_at_mut(&mut self, index: usize) -> Option<&mut V> {
        self.values.get_mut(index)
    }

    /// Removes `key`, returning its value.
    ///
    /// Every later entry moves down one index.
    #[track_caller]
    pub fn remove(&mut self, key: &[C]) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes `key`, returning the stored key copy and its value.
    #[track_caller]
    pub fn remove_entry(&mut self, key: &[C]) -> Option<(Rc<[C]>, V)> {
        ensure_mutable(self.table.is_frozen(), "remove");
        let index = self.table.lookup(key)?;
        let value = self.values.remove(index);
        let key = self.table.remove_at(index)?;
        Some((key, value))
    }

    /// Iterates `(key, value)` pairs in entry-index order.
    pub fn iter(&self) -> Iter<'_, V, C> {
        Iter {
            keys: self.table.keys(),
            values: self.values.iter(),
        }
    }

    /// Iterates the keys in entry-index order.
    pub fn keys(&self) -> Keys<'_, C> {
        self.table.keys()
    }

    /// Returns the values in entry-index order.
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Returns the values in entry-index order, mutably.
    pub fn values_mut(&mut self) -> &mut [V] {
        &mut self.values
    }

    /// Sorts the entries by key with `cmp`, keeping each value with its key.
    #[track_caller]
    pub fn sort_by<F>(&mut self, cmp: F)
    where
        F: FnMut(&[C], &[C]) -> Ordering,
    {
        self.table.sort_with(self.values.as_mut_slice(), cmp);
    }

    /// Sorts the entries by key in element order.
    #[track_caller]
    pub fn sort(&mut self) {
        self.sort_by(|a, b| a.cmp(b));
    }

    /// Makes room for at least `additional` more entries.
    #[track_caller]
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
        self.values
            .reserve(self.table.capacity() - self.values.len());
    }

    /// Removes every entry, keeping capacity.
    #[track_caller]
    pub fn clear(&mut self) {
        self.table.clear();
        self.values.clear();
    }

    /// Returns chain statistics of the key table.
    #[cfg(feature = "stats")]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        self.table.engine().debug_stats()
    }
}

impl<'k, V, C: Unit> Extend<(&'k [C], V)> for SequenceMap<V, C> {
    fn extend<I: IntoIterator<Item = (&'k [C], V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'k, V, C: Unit> FromIterator<(&'k [C], V)> for SequenceMap<V, C> {
    fn from_iter<I: IntoIterator<Item = (&'k [C], V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, V, C: Unit> IntoIterator for &'a SequenceMap<V, C> {
    type IntoIter = Iter<'a, V, C>;
    type Item = (&'a [C], &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the entries of a [`SequenceMap`].
pub struct Iter<'a, V, C> {
    keys: Keys<'a, C>,
    values: core::slice::Iter<'a, V>,
}

impl<'a, V, C> Iterator for Iter<'a, V, C> {
    type Item = (&'a [C], &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        Some((self.keys.next()?, self.values.next()?))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl<V, C> ExactSizeIterator for Iter<'_, V, C> {}
