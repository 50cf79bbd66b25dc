use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::hash_table::Mode;
use crate::identity_table::DefaultHashBuilder;
use crate::identity_table::IdentityTable;

/// A hash set built directly on an [`IdentityTable`].
///
/// `IdentitySet<T, S>` stores values of type `T` where `T` implements
/// `Hash + Eq` and uses a configurable hasher builder `S`. Members keep
/// their insertion order until a removal or sort.
///
/// # Performance Characteristics
///
/// - **Memory**: 12 bytes of links per slot, plus the size of `T`.
/// - **Removal**: O(capacity), because later members move down one index.
#[derive(Clone)]
pub struct IdentitySet<T, S = DefaultHashBuilder> {
    table: IdentityTable<T, S>,
}

impl<T, S> PartialEq for IdentitySet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

impl<T, S> Eq for IdentitySet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
}

impl<T, S> Debug for IdentitySet<T, S>
where
    T: Debug + Hash + Eq,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, S> IdentitySet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a new set with the given hasher builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    /// Creates a new set sized for `capacity` members, with the given hasher
    /// builder.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            table: IdentityTable::with_capacity_and_hasher(capacity, hash_builder),
        }
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no members.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of members the set can hold before growing.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the current lookup strategy.
    pub fn mode(&self) -> Mode {
        self.table.mode()
    }

    /// Returns `true` for a [`frozen_empty`](Self::frozen_empty) set.
    pub fn is_frozen(&self) -> bool {
        self.table.is_frozen()
    }

    /// Removes all members, keeping capacity.
    #[track_caller]
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Makes room for at least `additional` more members.
    #[track_caller]
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Adds a value to the set.
    ///
    /// Returns `false` if an equal value was already present; the set is not
    /// modified in that case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use symtab::IdentitySet;
    ///
    /// let mut set: IdentitySet<i32> = IdentitySet::new();
    /// assert!(set.insert(1));
    /// assert!(!set.insert(1));
    /// assert_eq!(set.len(), 1);
    /// # }
    /// ```
    #[track_caller]
    pub fn insert(&mut self, value: T) -> bool {
        self.table.insert_full(value).1
    }

    /// Returns `true` if the set contains `value`.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.contains_key(value)
    }

    /// Removes `value`. Returns `true` if it was present.
    #[track_caller]
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.take(value).is_some()
    }

    /// Adds `value`, replacing and returning an equal member if present.
    ///
    /// A replaced member keeps its entry index.
    #[track_caller]
    pub fn replace(&mut self, value: T) -> Option<T> {
        match self.table.lookup(&value) {
            Some(index) => Some(self.table.replace_at(index, value)),
            None => {
                self.table.insert(value);
                None
            }
        }
    }

    /// Removes and returns the member equal to `value`.
    #[track_caller]
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        crate::error::ensure_mutable(self.table.is_frozen(), "remove");
        let index = self.table.lookup(value)?;
        self.table.remove_at(index)
    }

    /// Returns the member equal to `value`.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table
            .lookup(value)
            .and_then(|index| self.table.key_at(index))
    }

    /// Returns the member at entry `index`.
    pub fn key_at(&self, index: usize) -> Option<&T> {
        self.table.key_at(index)
    }

    /// Returns the members in entry-index order.
    pub fn as_slice(&self) -> &[T] {
        self.table.as_slice()
    }

    /// Iterates the members in entry-index order.
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.table.keys()
    }

    /// Returns `true` if `self` and `other` share no member.
    pub fn is_disjoint(&self, other: &IdentitySet<T, S>) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.iter().all(|v| !large.contains(v))
    }

    /// Returns `true` if every member of `self` is in `other`.
    pub fn is_subset(&self, other: &IdentitySet<T, S>) -> bool {
        self.len() <= other.len() && self.iter().all(|v| other.contains(v))
    }

    /// Returns `true` if every member of `other` is in `self`.
    pub fn is_superset(&self, other: &IdentitySet<T, S>) -> bool {
        other.is_subset(self)
    }

    /// Keeps only the members for which `f` returns `true`.
    ///
    /// Survivors keep their relative order. The table is compacted and
    /// relinked once, so this runs in linear time.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use symtab::IdentitySet;
    ///
    /// let mut set: IdentitySet<i32> = (1..=6).collect();
    /// set.retain(|&x| x % 2 == 0);
    /// assert_eq!(set.as_slice(), &[2, 4, 6]);
    /// # }
    /// ```
    #[track_caller]
    pub fn retain(&mut self, f: impl FnMut(&T) -> bool) {
        self.table.retain(f);
    }

    /// Sorts the members with `cmp`, then rehashes.
    #[track_caller]
    pub fn sort_by<F>(&mut self, cmp: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.table.sort_by(cmp);
    }

    /// Sorts the members in natural order.
    #[track_caller]
    pub fn sort(&mut self)
    where
        T: Ord,
    {
        self.table.sort();
    }
}

impl<T, S> IdentitySet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty set sized for `capacity` members.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }

    /// Creates an empty set that panics on every mutation.
    pub fn frozen_empty() -> Self {
        Self {
            table: IdentityTable::frozen_empty(),
        }
    }
}

impl<T, S> Default for IdentitySet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T, S> IntoIterator for &'a IdentitySet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type IntoIter = core::slice::Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, S> FromIterator<T> for IdentitySet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = IdentitySet::new();
        set.extend(iter);
        set
    }
}

impl<T, S> Extend<T> for IdentitySet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}
