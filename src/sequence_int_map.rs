use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Debug;

use crate::error::ensure_mutable;
use crate::hash_table::Mode;
use crate::sequence_table::Keys;
use crate::sequence_table::SequenceTable;
use crate::sequence_table::Unit;

/// A map from byte or character sequences to `i32`, with a sentinel for
/// "absent".
///
/// Values sit unboxed in a parallel array. Reads of a missing key return the
/// sentinel chosen at construction instead of an `Option`, which keeps
/// scanner code that maps keywords to token kinds branch-free.
///
/// # Examples
///
/// ```rust
/// use symtab::SequenceIntMap;
///
/// let mut keywords: SequenceIntMap = SequenceIntMap::with_capacity(40, -1);
/// keywords.insert(b"if", 1);
/// keywords.insert(b"while", 2);
///
/// assert_eq!(keywords.get(b"while"), 2);
/// assert_eq!(keywords.get(b"whilst"), -1);
/// assert_eq!(keywords.undefined_value(), -1);
/// ```
#[derive(Clone)]
pub struct SequenceIntMap<C = u8> {
    table: SequenceTable<C>,
    values: Vec<i32>,
    undefined: i32,
}

impl<C: Unit> Debug for SequenceIntMap<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<C: Unit> SequenceIntMap<C> {
    /// Creates an empty map reporting `undefined` for missing keys.
    pub fn new(undefined: i32) -> Self {
        Self::with_capacity(0, undefined)
    }

    /// Creates an empty map sized for `hint` entries.
    pub fn with_capacity(hint: usize, undefined: i32) -> Self {
        let table = SequenceTable::with_capacity(hint);
        let values = Vec::with_capacity(table.capacity());
        Self {
            table,
            values,
            undefined,
        }
    }

    /// Creates an empty map that panics on every mutation.
    pub const fn frozen_empty(undefined: i32) -> Self {
        Self {
            table: SequenceTable::frozen_empty(),
            values: Vec::new(),
            undefined,
        }
    }

    /// Returns the sentinel reported for missing keys.
    #[inline]
    pub fn undefined_value(&self) -> i32 {
        self.undefined
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

    /// Stores `value` under a copy of `key`, returning the previous value or
    /// the sentinel.
    #[track_caller]
    pub fn insert(&mut self, key: &[C], value: i32) -> i32 {
        let (index, inserted) = self.table.insert_full(key);
        if inserted {
            self.values.push(value);
            self.undefined
        } else {
            core::mem::replace(&mut self.values[index], value)
        }
    }

    /// Returns the value under `key`, or the sentinel.
    #[inline]
    pub fn get(&self, key: &[C]) -> i32 {
        self.get_or(key, self.undefined)
    }

    /// Returns the value under `key`, or `default`.
    pub fn get_or(&self, key: &[C], default: i32) -> i32 {
        self.table
            .lookup(key)
            .map_or(default, |index| self.values[index])
    }

    /// Returns the entry index of `key`.
    #[inline]
    pub fn lookup(&self, key: &[C]) -> Option<usize> {
        self.table.lookup(key)
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
    pub fn value_at(&self, index: usize) -> Option<i32> {
        self.values.get(index).copied()
    }

    /// Removes `key`, returning its value or the sentinel.
    #[track_caller]
    pub fn remove(&mut self, key: &[C]) -> i32 {
        ensure_mutable(self.table.is_frozen(), "remove");
        let Some(index) = self.table.lookup(key) else {
            return self.undefined;
        };
        let value = self.values.remove(index);
        self.table.remove_at(index);
        value
    }

    /// Iterates `(key, value)` pairs in entry-index order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&[C], i32)> + '_ {
        self.table.keys().zip(self.values.iter().copied())
    }

    /// Iterates the keys in entry-index order.
    pub fn keys(&self) -> Keys<'_, C> {
        self.table.keys()
    }

    /// Returns the values in entry-index order.
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    /// Sorts the entries by key with `cmp`, keeping each value with its key.
    #[track_caller]
    pub fn sort_by<F>(&mut self, cmp: F)
    where
        F: FnMut(&[C], &[C]) -> Ordering,
    {
        self.table.sort_with(self.values.as_mut_slice(), cmp);
    }

    /// Makes room for at least `additional` more entries.
    #[track_caller]
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
        self.values
            .reserve(self.table.capacity() - self.values.len());
    }

    /// Removes every entry, keeping capacity and sentinel.
    #[track_caller]
    pub fn clear(&mut self) {
        self.table.clear();
        self.values.clear();
    }
}
