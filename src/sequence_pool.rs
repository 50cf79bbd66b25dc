use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::error::Error;
use crate::error::ensure_mutable;
use crate::hash_table::HashTable;
use crate::hash_table::Mode;
use crate::sequence_table::Unit;
use crate::sequence_table::hash_sequence;

/// A bounded interning pool for byte or character sequences.
///
/// `add` returns one shared copy per distinct sequence, so repeated
/// identifiers out of a scanner share a single allocation. The pool holds at
/// most `limit` sequences. Once full, each new sequence replaces the oldest
/// one in place: slots form a ring that is overwritten in insertion order.
/// Lookups do not refresh a sequence's age.
///
/// Copies already handed out stay valid after eviction; the pool simply stops
/// returning them.
///
/// # Examples
///
/// ```rust
/// use std::rc::Rc;
///
/// use symtab::SequencePool;
///
/// let mut pool: SequencePool = SequencePool::with_limit(2);
/// let a = pool.add(b"alpha");
/// assert!(Rc::ptr_eq(&a, &pool.add(b"alpha")));
///
/// pool.add(b"beta");
/// pool.add(b"gamma");
/// assert!(!pool.contains(b"alpha"));
/// assert_eq!(&*a, b"alpha");
/// ```
#[derive(Clone)]
pub struct SequencePool<C = u8> {
    engine: HashTable,
    keys: Vec<Rc<[C]>>,
    limit: usize,
    oldest: usize,
}

impl<C: Unit> Debug for SequencePool<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SequencePool")
            .field("limit", &self.limit)
            .field("oldest", &self.oldest)
            .field("keys", &self.keys)
            .finish()
    }
}

impl<C: Unit> SequencePool<C> {
    /// Creates an empty pool holding at most `limit` sequences.
    ///
    /// # Panics
    ///
    /// Panics if `limit` is zero.
    #[track_caller]
    pub fn with_limit(limit: usize) -> Self {
        assert!(
            limit > 0,
            "{}",
            Error::InvalidArgument("pool limit must be positive")
        );
        Self {
            engine: HashTable::with_capacity(limit),
            keys: Vec::with_capacity(limit),
            limit,
            oldest: 0,
        }
    }

    /// Creates an empty pool that panics on every mutation.
    pub const fn frozen_empty() -> Self {
        Self {
            engine: HashTable::frozen_empty(),
            keys: Vec::new(),
            limit: 0,
            oldest: 0,
        }
    }

    /// Returns the number of pooled sequences.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if the pool is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the maximum number of pooled sequences.
    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the current lookup strategy.
    #[inline]
    pub fn mode(&self) -> Mode {
        self.engine.mode()
    }

    /// Returns `true` for a [`frozen_empty`](Self::frozen_empty) pool.
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.engine.is_frozen()
    }

    fn lookup(&self, key: &[C]) -> Option<usize> {
        self.engine
            .probe(|| hash_sequence(key))
            .find(|&slot| *self.keys[slot] == *key)
    }

    /// Returns the pooled copy equal to `key`.
    pub fn get(&self, key: &[C]) -> Option<Rc<[C]>> {
        self.lookup(key).map(|slot| Rc::clone(&self.keys[slot]))
    }

    /// Returns `true` if a copy of `key` is pooled.
    #[inline]
    pub fn contains(&self, key: &[C]) -> bool {
        self.lookup(key).is_some()
    }

    /// Returns the pooled copy of `key`, adding one if needed.
    ///
    /// Adding to a full pool evicts the oldest sequence.
    ///
    /// # Panics
    ///
    /// Panics if the pool is frozen.
    #[track_caller]
    pub fn add(&mut self, key: &[C]) -> Rc<[C]> {
        ensure_mutable(self.engine.is_frozen(), "insert");
        if let Some(slot) = self.lookup(key) {
            return Rc::clone(&self.keys[slot]);
        }

        let copy: Rc<[C]> = Rc::from(key);
        if self.keys.len() < self.limit {
            self.engine.push_entry(|| hash_sequence(key));
            self.keys.push(Rc::clone(&copy));
        } else {
            let slot = self.oldest;
            log::trace!("Evicting pool slot {slot} of {}", self.limit);
            self.engine.unlink(slot, hash_sequence(&self.keys[slot]));
            self.keys[slot] = Rc::clone(&copy);
            self.engine.link(slot, hash_sequence(key));
            self.oldest = (slot + 1) % self.limit;
        }
        copy
    }

    /// Iterates the pooled sequences in slot order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[C]> + '_ {
        self.keys.iter().map(|key| &**key)
    }

    /// Empties the pool.
    #[track_caller]
    pub fn clear(&mut self) {
        self.engine.clear();
        self.keys.clear();
        self.oldest = 0;
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::vec;
    use alloc::vec::Vec;

    use test_log::test;

    use super::*;

    #[test]
    fn test_duplicate_returns_stored_copy() {
        let mut pool: SequencePool = SequencePool::with_limit(8);
        let first = pool.add(b"ident");
        let second = pool.add(&b"my ident"[3..]);
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_fifth_insert_evicts_oldest() {
        let mut pool: SequencePool = SequencePool::with_limit(4);
        for key in [b"k1", b"k2", b"k3", b"k4"] {
            pool.add(key);
        }
        assert_eq!(pool.len(), 4);

        pool.add(b"k5");
        assert_eq!(pool.len(), 4);
        assert!(!pool.contains(b"k1"));
        for key in [b"k2", b"k3", b"k4", b"k5"] {
            assert!(pool.contains(key));
        }
    }

    #[test]
    fn test_eviction_follows_insertion_order() {
        let mut pool: SequencePool = SequencePool::with_limit(3);
        pool.add(b"a");
        pool.add(b"b");
        pool.add(b"c");

        // Hits do not refresh age.
        pool.add(b"a");
        pool.add(b"d");
        assert!(!pool.contains(b"a"));
        pool.add(b"e");
        assert!(!pool.contains(b"b"));

        let members: Vec<&[u8]> = pool.iter().collect();
        assert_eq!(members, vec![&b"d"[..], b"e", b"c"]);
    }

    #[test]
    fn test_ring_wraps_many_times() {
        let mut pool: SequencePool = SequencePool::with_limit(5);
        for i in 0..100 {
            pool.add(format!("name{i}").as_bytes());
        }
        assert_eq!(pool.len(), 5);
        for i in 0..95 {
            assert!(!pool.contains(format!("name{i}").as_bytes()));
        }
        for i in 95..100 {
            assert!(pool.contains(format!("name{i}").as_bytes()));
        }
    }

    #[test]
    fn test_small_limit_stays_in_list_mode() {
        let mut pool: SequencePool<char> = SequencePool::with_limit(1);
        assert_eq!(pool.mode(), Mode::List);
        pool.add(&['x']);
        pool.add(&['y']);
        assert_eq!(pool.len(), 1);
        assert!(!pool.contains(&['x']));
        assert_eq!(pool.get(&['y']).as_deref(), Some(&['y'][..]));
    }

    #[test]
    fn test_evicted_copy_stays_valid() {
        let mut pool: SequencePool = SequencePool::with_limit(1);
        let old = pool.add(b"old");
        pool.add(b"new");
        assert_eq!(&*old, b"old");
        assert!(pool.get(b"old").is_none());
    }

    #[test]
    fn test_clear_resets_ring() {
        let mut pool: SequencePool = SequencePool::with_limit(2);
        pool.add(b"a");
        pool.add(b"b");
        pool.add(b"c");
        pool.clear();
        assert!(pool.is_empty());

        pool.add(b"x");
        pool.add(b"y");
        pool.add(b"z");
        assert!(!pool.contains(b"x"));
        assert!(pool.contains(b"y"));
    }

    #[test]
    #[should_panic(expected = "invalid argument: pool limit must be positive")]
    fn test_zero_limit_panics() {
        let _pool: SequencePool = SequencePool::with_limit(0);
    }

    #[test]
    #[should_panic(expected = "unsupported operation on frozen container: insert")]
    fn test_frozen_rejects_add() {
        let mut pool: SequencePool = SequencePool::frozen_empty();
        pool.add(b"a");
    }
}
