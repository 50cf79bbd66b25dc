use alloc::boxed::Box;
use core::fmt::Debug;
use core::hash::BuildHasher;

use hashbrown::HashMap;

use crate::identity_table::DefaultHashBuilder;
use crate::sequence_table::Unit;

/// A sequence-keyed map backed by [`hashbrown::HashMap`].
///
/// Offers the same lookup-by-slice surface as [`SequenceMap`] for callers
/// that prefer a general-purpose table. Entries have no stable index and
/// iteration order is unspecified.
///
/// [`SequenceMap`]: crate::SequenceMap
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use symtab::SliceMap;
///
/// let mut map: SliceMap<u32> = SliceMap::new();
/// map.insert(b"__LINE__", 1);
///
/// let text = b"x = __LINE__;";
/// assert_eq!(map.get(&text[4..12]), Some(&1));
/// # }
/// ```
#[derive(Clone)]
pub struct SliceMap<V, C = u8, S = DefaultHashBuilder> {
    map: HashMap<Box<[C]>, V, S>,
}

impl<V: Debug, C: Unit, S> Debug for SliceMap<V, C, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.map.iter()).finish()
    }
}

impl<V, C: Unit, S: BuildHasher + Default> SliceMap<V, C, S> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty map able to hold `capacity` entries without
    /// reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }
}

impl<V, C: Unit, S: BuildHasher + Default> Default for SliceMap<V, C, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, C: Unit, S: BuildHasher> SliceMap<V, C, S> {
    /// Creates an empty map using `hash_builder`.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    /// Creates an empty map sized for `capacity` entries, using
    /// `hash_builder`.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            map: HashMap::with_capacity_and_hasher(capacity, hash_builder),
        }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Inserts `value` under a copy of `key`, returning the previous value.
    pub fn insert(&mut self, key: &[C], value: V) -> Option<V> {
        match self.map.get_mut(key) {
            Some(slot) => Some(core::mem::replace(slot, value)),
            None => {
                self.map.insert(Box::from(key), value);
                None
            }
        }
    }

    /// Returns the value under `key`.
    pub fn get(&self, key: &[C]) -> Option<&V> {
        self.map.get(key)
    }

    /// Returns a mutable reference to the value under `key`.
    pub fn get_mut(&mut self, key: &[C]) -> Option<&mut V> {
        self.map.get_mut(key)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &[C]) -> bool {
        self.map.contains_key(key)
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &[C]) -> Option<V> {
        self.map.remove(key)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Iterates the keys in unspecified order.
    pub fn keys(&self) -> impl Iterator<Item = &[C]> + '_ {
        self.map.keys().map(|key| &**key)
    }

    /// Iterates the values in unspecified order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.map.values()
    }

    /// Iterates `(key, value)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&[C], &V)> + '_ {
        self.map.iter().map(|(key, value)| (&**key, value))
    }
}
