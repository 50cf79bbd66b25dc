use alloc::vec::Vec;
use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::error::ensure_mutable;
use crate::hash_table::Companion;
use crate::hash_table::HashTable;
use crate::hash_table::Lockstep;
use crate::hash_table::Mode;
use crate::hash_table::Slots;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hash builder used by identity-keyed containers when none is
        /// given.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hash builder used by identity-keyed containers when none is
        /// given.
        pub type DefaultHashBuilder = std::collections::hash_map::RandomState;
    } else {
        compile_error!("symtab needs the `foldhash` or `std` feature to pick a default hasher");
    }
}

struct IdentitySlots<'a, K, S> {
    keys: &'a [K],
    hash_builder: &'a S,
}

impl<K: Hash, S: BuildHasher> Slots for IdentitySlots<'_, K, S> {
    #[inline]
    fn hash_at(&self, index: usize) -> u64 {
        self.hash_builder.hash_one(&self.keys[index])
    }
}

/// A key table for arbitrary keys compared by [`Eq`] and hashed with a
/// [`BuildHasher`].
///
/// Keys live in a dense array in insertion order; the table answers lookups
/// with their entry index. Removing a key shifts every later key down by one.
///
/// Lookups accept any borrowed form of the key, as with the standard maps.
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use symtab::IdentityTable;
///
/// let mut table: IdentityTable<String> = IdentityTable::new();
/// table.insert("size_t".to_string());
/// table.insert("ptrdiff_t".to_string());
///
/// assert_eq!(table.lookup("ptrdiff_t"), Some(1));
/// assert_eq!(table.remove("size_t"), Some(0));
/// assert_eq!(table.lookup("ptrdiff_t"), Some(0));
/// # }
/// ```
#[derive(Clone)]
pub struct IdentityTable<K, S = DefaultHashBuilder> {
    engine: HashTable,
    keys: Vec<K>,
    hash_builder: S,
}

impl<K: Debug, S> Debug for IdentityTable<K, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(&self.keys).finish()
    }
}

impl<K, S> IdentityTable<K, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates an empty table in list mode.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty table sized for `hint` keys.
    pub fn with_capacity(hint: usize) -> Self {
        Self::with_capacity_and_hasher(hint, S::default())
    }

    /// Creates an empty table that panics on every mutation.
    pub fn frozen_empty() -> Self {
        Self {
            engine: HashTable::frozen_empty(),
            keys: Vec::new(),
            hash_builder: S::default(),
        }
    }
}

impl<K, S> Default for IdentityTable<K, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, S> IdentityTable<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty table using `hash_builder` to hash keys.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    /// Creates an empty table sized for `hint` keys, using `hash_builder`.
    pub fn with_capacity_and_hasher(hint: usize, hash_builder: S) -> Self {
        let engine = HashTable::with_capacity(hint);
        let keys = Vec::with_capacity(engine.capacity());
        Self {
            engine,
            keys,
            hash_builder,
        }
    }

    /// Returns the number of keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.engine.len()
    }

    /// Returns `true` if the table holds no keys.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.engine.is_empty()
    }

    /// Returns the number of keys the table holds before it must grow.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.engine.capacity()
    }

    /// Returns the current lookup strategy.
    #[inline]
    pub fn mode(&self) -> Mode {
        self.engine.mode()
    }

    /// Returns `true` for a [`frozen_empty`](Self::frozen_empty) table.
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.engine.is_frozen()
    }

    /// Returns the underlying engine.
    pub fn engine(&self) -> &HashTable {
        &self.engine
    }

    /// Returns the table's hash builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    #[inline]
    pub(crate) fn hash<Q: Hash + ?Sized>(&self, key: &Q) -> u64 {
        self.hash_builder.hash_one(key)
    }

    /// Returns the entry index of `key`.
    pub fn lookup<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lookup_hashed(key, || self.hash(key))
    }

    #[inline]
    pub(crate) fn lookup_hashed<Q>(&self, key: &Q, hash: impl FnOnce() -> u64) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.engine
            .probe(hash)
            .find(|&index| self.keys[index].borrow() == key)
    }

    /// Returns `true` if `key` is present.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lookup(key).is_some()
    }

    /// Inserts `key` unless an equal key is present.
    ///
    /// Returns the key's entry index and whether it was newly inserted. An
    /// already present key is kept and `key` is dropped.
    ///
    /// # Panics
    ///
    /// Panics if the table is frozen.
    #[track_caller]
    pub fn insert_full(&mut self, key: K) -> (usize, bool) {
        ensure_mutable(self.engine.is_frozen(), "insert");
        let hash = self.hash(&key);
        match self.lookup_hashed(&key, || hash) {
            Some(index) => (index, false),
            None => (self.push_hashed(key, hash), true),
        }
    }

    /// Inserts `key` unless an equal key is present, returning its entry
    /// index.
    #[track_caller]
    pub fn insert(&mut self, key: K) -> usize {
        self.insert_full(key).0
    }

    /// Appends a key known to be absent.
    pub(crate) fn push_hashed(&mut self, key: K, hash: u64) -> usize {
        if self.engine.is_full() {
            self.engine.grow(&IdentitySlots {
                keys: &self.keys,
                hash_builder: &self.hash_builder,
            });
        }
        let index = self.engine.push_entry(|| hash);
        self.keys.push(key);
        index
    }

    /// Swaps in `key` for the equal key stored at a live `index`.
    pub(crate) fn replace_at(&mut self, index: usize, key: K) -> K {
        ensure_mutable(self.engine.is_frozen(), "insert");
        debug_assert!(self.keys[index] == key);
        core::mem::replace(&mut self.keys[index], key)
    }

    /// Returns the key stored at `index`.
    #[inline]
    pub fn key_at(&self, index: usize) -> Option<&K> {
        self.keys.get(index)
    }

    /// Returns the live keys in entry-index order.
    #[inline]
    pub fn as_slice(&self) -> &[K] {
        &self.keys
    }

    /// Iterates the keys in entry-index order.
    pub fn keys(&self) -> core::slice::Iter<'_, K> {
        self.keys.iter()
    }

    /// Removes `key`, returning the entry index it occupied.
    #[track_caller]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        ensure_mutable(self.engine.is_frozen(), "remove");
        let index = self.lookup(key)?;
        self.remove_at(index);
        Some(index)
    }

    /// Removes the key at `index`, shifting every later key down by one.
    ///
    /// Returns `None` if `index` is not live.
    #[track_caller]
    pub fn remove_at(&mut self, index: usize) -> Option<K> {
        ensure_mutable(self.engine.is_frozen(), "remove");
        if index >= self.len() {
            return None;
        }
        Some(self.remove_live(index))
    }

    /// Removes the key at a live `index`. Co-indexed columns must already
    /// have been shifted.
    pub(crate) fn remove_live(&mut self, index: usize) -> K {
        let key = self.keys.remove(index);
        let hash = self.hash(&key);
        self.engine.remove_entry(index, hash);
        key
    }

    /// Keeps only the keys accepted by `keep`, preserving their order.
    ///
    /// Survivors are compacted in one pass and relinked once, so the cost is
    /// linear in the number of keys.
    #[track_caller]
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) {
        ensure_mutable(self.engine.is_frozen(), "remove");
        let before = self.keys.len();
        self.keys.retain(|key| keep(key));
        if self.keys.len() == before {
            return;
        }

        self.engine.clear();
        for key in &self.keys {
            let hash = self.hash_builder.hash_one(key);
            self.engine.push_entry(|| hash);
        }
    }

    /// Makes room for at least `additional` more keys without growing.
    #[track_caller]
    pub fn reserve(&mut self, additional: usize) {
        let needed = self.len().saturating_add(additional);
        if needed > self.capacity() {
            self.engine.resize(
                needed,
                &IdentitySlots {
                    keys: &self.keys,
                    hash_builder: &self.hash_builder,
                },
            );
            self.keys.reserve(self.capacity() - self.keys.len());
        }
    }

    /// Sorts the keys with `cmp`, then rehashes.
    #[track_caller]
    pub fn sort_by<F>(&mut self, cmp: F)
    where
        F: FnMut(&K, &K) -> Ordering,
    {
        self.sort_with(&mut (), cmp);
    }

    /// Sorts the keys in their natural order, then rehashes.
    #[track_caller]
    pub fn sort(&mut self)
    where
        K: Ord,
    {
        self.sort_by(K::cmp);
    }

    /// Sorts the keys and swaps `companion` in lock-step.
    #[track_caller]
    pub(crate) fn sort_with<V, F>(&mut self, companion: &mut V, cmp: F)
    where
        V: Companion + ?Sized,
        F: FnMut(&K, &K) -> Ordering,
    {
        let hash_builder = &self.hash_builder;
        let mut target = Lockstep {
            keys: self.keys.as_mut_slice(),
            companion,
            hash: |key: &K| hash_builder.hash_one(key),
            cmp,
        };
        self.engine.sort(&mut target);
    }

    /// Removes every key, keeping capacity.
    #[track_caller]
    pub fn clear(&mut self) {
        self.engine.clear();
        self.keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::hash::BuildHasherDefault;
    use core::hash::Hasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;
    use test_log::test;

    use super::*;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k1: rng.try_next_u64().unwrap_or(0),
                k2: rng.try_next_u64().unwrap_or(0),
            }
        }
    }

    /// Sends every key to the same bucket.
    #[derive(Default)]
    struct ConstHasher;

    impl Hasher for ConstHasher {
        fn finish(&self) -> u64 {
            7
        }

        fn write(&mut self, _: &[u8]) {}
    }

    type Colliding = BuildHasherDefault<ConstHasher>;

    #[test]
    fn test_insert_and_lookup() {
        let mut table: IdentityTable<String, SipHashBuilder> = IdentityTable::new();
        assert_eq!(table.insert_full("a".to_string()), (0, true));
        assert_eq!(table.insert_full("b".to_string()), (1, true));
        assert_eq!(table.insert_full("a".to_string()), (0, false));

        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("b"), Some(1));
        assert!(table.contains_key("a"));
        assert!(!table.contains_key("c"));
    }

    #[test]
    fn test_three_keys_promote() {
        let mut table = IdentityTable::with_capacity_and_hasher(2, SipHashBuilder::default());
        for key in [10, 20, 30] {
            table.insert(key);
        }
        assert_eq!(table.mode(), Mode::Hashed);
        assert_eq!(table.as_slice(), &[10, 20, 30]);
        for (index, key) in [10, 20, 30].iter().enumerate() {
            assert_eq!(table.lookup(key), Some(index));
        }
    }

    #[test]
    fn test_collisions_remove_and_compact() {
        let mut table: IdentityTable<u32, Colliding> = IdentityTable::with_capacity(16);
        for key in 0..10 {
            table.insert(key);
        }
        assert_eq!(table.engine().debug_stats().longest_chain, 10);

        assert_eq!(table.remove(&4), Some(4));
        assert_eq!(table.remove_at(0), Some(0));
        assert_eq!(table.remove(&4), None);

        assert_eq!(table.as_slice(), &[1, 2, 3, 5, 6, 7, 8, 9]);
        for (index, key) in table.as_slice().iter().enumerate() {
            assert_eq!(table.lookup(key), Some(index));
        }
    }

    #[test]
    fn test_growth_keeps_indices() {
        let mut table: IdentityTable<u64, SipHashBuilder> = IdentityTable::new();
        for key in 0..1_000u64 {
            assert_eq!(table.insert(key * 7), key as usize);
        }
        assert_eq!(table.capacity(), 1024);
        for key in 0..1_000u64 {
            assert_eq!(table.lookup(&(key * 7)), Some(key as usize));
        }
    }

    #[test]
    fn test_sort_and_sort_by() {
        let mut table: IdentityTable<i32, SipHashBuilder> = IdentityTable::new();
        for key in [5, -3, 12, 0, 7] {
            table.insert(key);
        }

        table.sort();
        assert_eq!(table.as_slice(), &[-3, 0, 5, 7, 12]);
        assert_eq!(table.lookup(&7), Some(3));

        table.sort_by(|a, b| b.cmp(a));
        assert_eq!(table.keys().copied().collect::<Vec<_>>(), vec![12, 7, 5, 0, -3]);
        assert_eq!(table.lookup(&-3), Some(4));
    }

    #[test]
    fn test_reserve_clear_clone() {
        let mut table: IdentityTable<&str, SipHashBuilder> = IdentityTable::new();
        table.insert("x");
        table.reserve(40);
        assert_eq!(table.capacity(), 64);
        assert_eq!(table.lookup("x"), Some(0));

        let cloned = table.clone();
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.key_at(0), None);
        assert_eq!(cloned.key_at(0), Some(&"x"));
    }

    #[test]
    #[should_panic(expected = "unsupported operation on frozen container: insert")]
    fn test_frozen_empty_rejects_insert() {
        let mut table: IdentityTable<i32, SipHashBuilder> = IdentityTable::frozen_empty();
        assert_eq!(table.lookup(&1), None);
        table.insert(1);
    }
}
