use alloc::rc::Rc;
use core::cmp::Ordering;
use core::fmt::Debug;

use crate::hash_table::Mode;
use crate::sequence_table::Keys;
use crate::sequence_table::SequenceTable;
use crate::sequence_table::Unit;

/// A set of byte or character sequences.
///
/// A thin layer over [`SequenceTable`] with set-shaped signatures. Members
/// keep their insertion order until a removal or [`sort`](Self::sort).
///
/// # Examples
///
/// ```rust
/// use symtab::SequenceSet;
///
/// let mut seen: SequenceSet = SequenceSet::new();
/// assert!(seen.insert(b"stdio.h"));
/// assert!(!seen.insert(b"stdio.h"));
/// assert!(seen.contains(b"stdio.h"));
/// assert!(seen.remove(b"stdio.h"));
/// assert!(seen.is_empty());
/// ```
#[derive(Clone)]
pub struct SequenceSet<C = u8> {
    table: SequenceTable<C>,
}

impl<C: Unit> Debug for SequenceSet<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<C: Unit> PartialEq for SequenceSet<C> {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|key| other.contains(key))
    }
}

impl<C: Unit> Eq for SequenceSet<C> {}

impl<C: Unit> Default for SequenceSet<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Unit> SequenceSet<C> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty set sized for `hint` members.
    pub fn with_capacity(hint: usize) -> Self {
        Self {
            table: SequenceTable::with_capacity(hint),
        }
    }

    /// Creates an empty set that panics on every mutation.
    pub const fn frozen_empty() -> Self {
        Self {
            table: SequenceTable::frozen_empty(),
        }
    }

    /// Returns the number of members.
    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set has no members.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of members the set holds before it must grow.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the current lookup strategy.
    #[inline]
    pub fn mode(&self) -> Mode {
        self.table.mode()
    }

    /// Returns `true` for a [`frozen_empty`](Self::frozen_empty) set.
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.table.is_frozen()
    }

    /// Adds a copy of `key`. Returns `false` if it was already a member.
    #[track_caller]
    pub fn insert(&mut self, key: &[C]) -> bool {
        self.table.insert_full(key).1
    }

    /// Returns `true` if `key` is a member.
    #[inline]
    pub fn contains(&self, key: &[C]) -> bool {
        self.table.contains_key(key)
    }

    /// Returns the stored copy equal to `key`.
    pub fn get(&self, key: &[C]) -> Option<&Rc<[C]>> {
        self.table
            .lookup(key)
            .and_then(|index| self.table.key_rc_at(index))
    }

    /// Returns the entry index of `key`.
    #[inline]
    pub fn lookup(&self, key: &[C]) -> Option<usize> {
        self.table.lookup(key)
    }

    /// Returns the member at entry `index`.
    #[inline]
    pub fn key_at(&self, index: usize) -> Option<&[C]> {
        self.table.key_at(index)
    }

    /// Removes `key`. Returns `false` if it was not a member.
    #[track_caller]
    pub fn remove(&mut self, key: &[C]) -> bool {
        self.table.remove(key).is_some()
    }

    /// Iterates the members in entry-index order.
    pub fn iter(&self) -> Keys<'_, C> {
        self.table.keys()
    }

    /// Sorts the members with `cmp`, then rehashes.
    #[track_caller]
    pub fn sort_by<F>(&mut self, cmp: F)
    where
        F: FnMut(&[C], &[C]) -> Ordering,
    {
        self.table.sort_by(cmp);
    }

    /// Sorts the members in element order.
    #[track_caller]
    pub fn sort(&mut self) {
        self.table.sort();
    }

    /// Makes room for at least `additional` more members.
    #[track_caller]
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Removes every member, keeping capacity.
    #[track_caller]
    pub fn clear(&mut self) {
        self.table.clear();
    }
}

impl<'k, C: Unit> Extend<&'k [C]> for SequenceSet<C> {
    fn extend<I: IntoIterator<Item = &'k [C]>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'k, C: Unit> FromIterator<&'k [C]> for SequenceSet<C> {
    fn from_iter<I: IntoIterator<Item = &'k [C]>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'a, C: Unit> IntoIterator for &'a SequenceSet<C> {
    type IntoIter = Keys<'a, C>;
    type Item = &'a [C];

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
