use alloc::vec::Vec;
use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::error::ensure_mutable;
use crate::hash_table::Mode;
use crate::identity_table::DefaultHashBuilder;
use crate::identity_table::IdentityTable;

/// A hash map whose keys live in an [`IdentityTable`] and whose values live
/// in a parallel array.
///
/// `IdentityMap<K, V, S>` stores key-value pairs where keys implement
/// `Hash + Eq` and uses a configurable hasher builder `S` to hash keys.
/// Entries keep a dense index in insertion order, exposed through
/// [`key_at`](Self::key_at) and [`value_at`](Self::value_at).
///
/// # Performance Characteristics
///
/// - **Memory**: 12 bytes of links per entry slot, plus the size of `K` and
///   `V`. Maps of up to two entries allocate no links at all.
/// - **Removal**: O(capacity), because later entries move down one index.
#[derive(Clone)]
pub struct IdentityMap<K, V, S = DefaultHashBuilder> {
    table: IdentityTable<K, S>,
    values: Vec<V>,
}

impl<K, V, S> Debug for IdentityMap<K, V, S>
where
    K: Debug + Hash + Eq,
    V: Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.iter() {
            map.entry(k, v);
        }
        map.finish()
    }
}

impl<K, V, S> IdentityMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a new map with the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use symtab::IdentityMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let map: IdentityMap<i32, String, _> = IdentityMap::with_hasher(SimpleHasher);
    /// assert!(map.is_empty());
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    /// Creates a new map sized for `capacity` entries, with the given hasher
    /// builder.
    ///
    /// The capacity is rounded up to a power of two.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use symtab::IdentityMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let map: IdentityMap<i32, String, _> = IdentityMap::with_capacity_and_hasher(100, SimpleHasher);
    /// assert_eq!(map.capacity(), 128);
    /// ```
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        let table = IdentityTable::with_capacity_and_hasher(capacity, hash_builder);
        let values = Vec::with_capacity(table.capacity());
        Self { table, values }
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of entries the map can hold before growing.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the current lookup strategy.
    pub fn mode(&self) -> Mode {
        self.table.mode()
    }

    /// Returns `true` for a [`frozen_empty`](Self::frozen_empty) map.
    pub fn is_frozen(&self) -> bool {
        self.table.is_frozen()
    }

    /// Returns the key table.
    pub fn key_table(&self) -> &IdentityTable<K, S> {
        &self.table
    }

    /// Removes all entries, keeping capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use symtab::IdentityMap;
    ///
    /// let mut map: IdentityMap<i32, &str> = IdentityMap::new();
    /// map.insert(1, "a");
    /// map.clear();
    /// assert!(map.is_empty());
    /// # }
    /// ```
    #[track_caller]
    pub fn clear(&mut self) {
        self.table.clear();
        self.values.clear();
    }

    /// Makes room for at least `additional` more entries.
    #[track_caller]
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
        self.values
            .reserve(self.table.capacity() - self.values.len());
    }

    /// Inserts a key-value pair, returning the previous value for the key.
    ///
    /// An existing key keeps its entry index and its original key value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use symtab::IdentityMap;
    ///
    /// let mut map: IdentityMap<&str, i32> = IdentityMap::new();
    /// assert_eq!(map.insert("x", 1), None);
    /// assert_eq!(map.insert("x", 2), Some(1));
    /// # }
    /// ```
    #[track_caller]
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (index, inserted) = self.table.insert_full(key);
        if inserted {
            self.values.push(value);
            None
        } else {
            Some(core::mem::replace(&mut self.values[index], value))
        }
    }

    /// Returns the entry index of `key`.
    pub fn lookup<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.lookup(key)
    }

    /// Returns a reference to the value for `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lookup(key).map(|index| &self.values[index])
    }

    /// Returns a mutable reference to the value for `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lookup(key).map(|index| &mut self.values[index])
    }

    /// Returns `true` if the map contains `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.contains_key(key)
    }

    /// Returns the key at entry `index`.
    pub fn key_at(&self, index: usize) -> Option<&K> {
        self.table.key_at(index)
    }

    /// Returns the value at entry `index`.
    pub fn value_at(&self, index: usize) -> Option<&V> {
        self.values.get(index)
    }

    /// Returns a mutable reference to the value at entry `index`.
    pub fn value_at_mut(&mut self, index: usize) -> Option<&mut V> {
        self.values.get_mut(index)
    }

    /// Removes `key`, returning its value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use symtab::IdentityMap;
    ///
    /// let mut map: IdentityMap<i32, char> = IdentityMap::new();
    /// map.insert(1, 'a');
    /// map.insert(2, 'b');
    /// assert_eq!(map.remove(&1), Some('a'));
    /// assert_eq!(map.key_at(0), Some(&2));
    /// # }
    /// ```
    #[track_caller]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes `key`, returning the stored key and its value.
    #[track_caller]
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        ensure_mutable(self.table.is_frozen(), "remove");
        let index = self.table.lookup(key)?;
        Some(self.remove_index(index))
    }

    fn remove_index(&mut self, index: usize) -> (K, V) {
        let value = self.values.remove(index);
        let key = self.table.remove_live(index);
        (key, value)
    }

    /// Gets the given key's entry for in-place manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use symtab::IdentityMap;
    ///
    /// let mut counts: IdentityMap<&str, u32> = IdentityMap::new();
    /// for word in ["a", "b", "a"] {
    ///     *counts.entry(word).or_insert(0) += 1;
    /// }
    /// assert_eq!(counts.get("a"), Some(&2));
    /// # }
    /// ```
    #[track_caller]
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, S> {
        ensure_mutable(self.table.is_frozen(), "insert");
        let hash = self.table.hash(&key);
        match self.table.lookup_hashed(&key, || hash) {
            Some(index) => Entry::Occupied(OccupiedEntry { map: self, index }),
            None => Entry::Vacant(VacantEntry {
                map: self,
                key,
                hash,
            }),
        }
    }

    /// Iterates `(key, value)` pairs in entry-index order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            keys: self.table.keys(),
            values: self.values.iter(),
        }
    }

    /// Iterates the keys in entry-index order.
    pub fn keys(&self) -> core::slice::Iter<'_, K> {
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
        F: FnMut(&K, &K) -> Ordering,
    {
        self.table.sort_with(self.values.as_mut_slice(), cmp);
    }

    /// Sorts the entries by key in natural order.
    #[track_caller]
    pub fn sort(&mut self)
    where
        K: Ord,
    {
        self.sort_by(K::cmp);
    }
}

impl<K, V, S> IdentityMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates an empty map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use symtab::IdentityMap;
    ///
    /// let map: IdentityMap<i32, String> = IdentityMap::new();
    /// assert!(map.is_empty());
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty map sized for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }

    /// Creates an empty map that panics on every mutation.
    pub fn frozen_empty() -> Self {
        Self {
            table: IdentityTable::frozen_empty(),
            values: Vec::new(),
        }
    }
}

impl<K, V, S> Default for IdentityMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Extend<(K, V)> for IdentityMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for IdentityMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, K, V, S> IntoIterator for &'a IdentityMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A view into a single entry in the map, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`IdentityMap`].
///
/// [`entry`]: IdentityMap::entry
pub enum Entry<'a, K, V, S> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V, S>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V, S>),
}

impl<'a, K, V, S> Entry<'a, K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Inserts a default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V, S> Entry<'a, K, V, S>
where
    K: Hash + Eq,
    V: Default,
    S: BuildHasher,
{
    /// Inserts the default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the map.
pub struct VacantEntry<'a, K, V, S> {
    map: &'a mut IdentityMap<K, V, S>,
    key: K,
    hash: u64,
}

impl<'a, K, V, S> VacantEntry<'a, K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Gets a reference to the key that would be used when inserting a value.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Take ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts the value into the map and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        let index = self.map.table.push_hashed(self.key, self.hash);
        self.map.values.push(value);
        &mut self.map.values[index]
    }
}

/// A view into an occupied entry in the map.
pub struct OccupiedEntry<'a, K, V, S> {
    map: &'a mut IdentityMap<K, V, S>,
    index: usize,
}

impl<'a, K, V, S> OccupiedEntry<'a, K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Returns the entry index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        &self.map.table.as_slice()[self.index]
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.map.values[self.index]
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.map.values[self.index]
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.map.values[self.index]
    }

    /// Inserts a value into the entry and returns the old value.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(self.get_mut(), value)
    }

    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.remove_entry().1
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(self) -> (K, V) {
        self.map.remove_index(self.index)
    }
}

/// An iterator over the key-value pairs of an `IdentityMap`.
pub struct Iter<'a, K, V> {
    keys: core::slice::Iter<'a, K>,
    values: core::slice::Iter<'a, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        Some((self.keys.next()?, self.values.next()?))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
