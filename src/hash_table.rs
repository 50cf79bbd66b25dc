use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Debug;
use core::ops::Range;

use crate::error::ensure_mutable;

/// Capacity at or below which a table stays in [`Mode::List`].
pub const LIST_THRESHOLD: usize = 2;

const MIN_CAPACITY: usize = 2;

/// Largest capacity a table may reach. Keeps `2 * capacity` buckets and every
/// `index + 1` link representable as a `u32`.
const MAX_CAPACITY: usize = 1 << 30;

/// A 1-based reference to an entry, with 0 reserved for "no entry".
///
/// Bucket heads and chain successors are stored as `Link`s so that an
/// all-zero array means "every bucket empty" and so that link values never
/// mix with raw entry indices by accident.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Link(u32);

impl Link {
    /// The empty bucket / end-of-chain sentinel.
    pub const NONE: Link = Link(0);

    /// Encodes entry `index`.
    #[inline(always)]
    pub fn to(index: usize) -> Self {
        debug_assert!(index < MAX_CAPACITY);
        Link(index as u32 + 1)
    }

    /// Decodes the entry index, or `None` for the sentinel.
    #[inline(always)]
    pub fn index(self) -> Option<usize> {
        self.0.checked_sub(1).map(|i| i as usize)
    }

    /// Returns `true` for the sentinel.
    #[inline(always)]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Re-targets a link after the entry `removed` was compacted away: links
    /// to entries above it move down by one.
    #[inline(always)]
    fn shift_down(&mut self, removed: Link) {
        if self.0 > removed.0 {
            self.0 -= 1;
        }
    }
}

impl Debug for Link {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.index() {
            Some(index) => write!(f, "->{index}"),
            None => f.write_str("--"),
        }
    }
}

/// Lookup strategy of a [`HashTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// No link arrays; lookups scan every live entry.
    List,
    /// Bucket heads plus per-entry chain links; lookups walk one chain.
    Hashed,
}

/// Key-side capability a concrete key table lends the engine.
///
/// The engine never sees keys. Whenever it has to rebuild its topology
/// (resize, sort) it asks the key table for the hash of each live entry.
pub trait Slots {
    /// Returns the hash of the key stored at entry `index`.
    fn hash_at(&self, index: usize) -> u64;
}

/// Reordering capability used by [`HashTable::sort`].
///
/// Implementors own every column that is co-indexed with the keys and must
/// swap all of them together.
pub trait Partition: Slots {
    /// Orders the entries at `a` and `b`.
    fn compare(&mut self, a: usize, b: usize) -> Ordering;

    /// Exchanges the entries at `a` and `b` in every co-indexed column.
    fn swap(&mut self, a: usize, b: usize);
}

/// A column kept co-indexed with a key table, such as a map's values.
pub trait Companion {
    /// Exchanges the elements at `a` and `b`.
    fn swap(&mut self, a: usize, b: usize);
}

impl Companion for () {
    #[inline(always)]
    fn swap(&mut self, _: usize, _: usize) {}
}

impl<V> Companion for [V] {
    #[inline(always)]
    fn swap(&mut self, a: usize, b: usize) {
        <[V]>::swap(self, a, b);
    }
}

/// Sorts a key column and one companion column together.
pub(crate) struct Lockstep<'a, K, V: ?Sized, H, F> {
    pub(crate) keys: &'a mut [K],
    pub(crate) companion: &'a mut V,
    pub(crate) hash: H,
    pub(crate) cmp: F,
}

impl<K, V, H, F> Slots for Lockstep<'_, K, V, H, F>
where
    V: Companion + ?Sized,
    H: Fn(&K) -> u64,
{
    fn hash_at(&self, index: usize) -> u64 {
        (self.hash)(&self.keys[index])
    }
}

impl<K, V, H, F> Partition for Lockstep<'_, K, V, H, F>
where
    V: Companion + ?Sized,
    H: Fn(&K) -> u64,
    F: FnMut(&K, &K) -> Ordering,
{
    fn compare(&mut self, a: usize, b: usize) -> Ordering {
        (self.cmp)(&self.keys[a], &self.keys[b])
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.keys.swap(a, b);
        self.companion.swap(a, b);
    }
}

/// Chain statistics of a table.
///
/// Available in tests and with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of live entries
    pub len: usize,
    /// Entry slots before the next resize
    pub capacity: usize,
    /// Current lookup strategy
    pub mode: Mode,
    /// Number of buckets (0 in list mode)
    pub buckets: usize,
    /// Number of buckets heading a non-empty chain
    pub occupied_buckets: usize,
    /// Length of the longest chain
    pub longest_chain: usize,
    /// Load factor (len / capacity)
    pub load_factor: f64,
    /// Bucket utilization (occupied_buckets / buckets)
    pub bucket_utilization: f64,
    /// Bytes spent on bucket and chain links
    pub link_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Chain Statistics ===");
        println!("Mode: {:?}", self.mode);
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.len,
            self.capacity,
            self.load_factor * 100.0
        );
        println!(
            "Buckets: {}/{} ({:.2}% utilization)",
            self.occupied_buckets,
            self.buckets,
            self.bucket_utilization * 100.0
        );
        println!("Longest chain: {}", self.longest_chain);
        println!("Link memory: {} bytes", self.link_bytes);
    }
}

/// The chained hash table engine shared by every key table in this crate.
///
/// `HashTable` owns no keys. It manages a dense range of entry indices
/// `0..len()` and, once promoted to [`Mode::Hashed`], two link arrays:
///
/// - `buckets` (`2 * capacity` long) maps a hash-derived bucket to the first
///   entry of its collision chain.
/// - `chain` (`capacity` long) maps an entry to the next entry in its chain.
///
/// Key tables store their keys in a parallel array indexed by the same entry
/// index and hand the engine hashes, either directly or through [`Slots`].
///
/// Tables with a capacity of at most [`LIST_THRESHOLD`] allocate no link
/// arrays and answer lookups by scanning. Growing past the threshold promotes
/// the table to hashed mode for good.
///
/// Removal keeps entries dense: every entry above the removed one moves down
/// by one index and every link is patched to match. This costs O(capacity)
/// per removal and buys gap-free iteration in insertion order.
///
/// ## Example
///
/// ```rust
/// use symtab::hash_table::HashTable;
/// use symtab::hash_table::Mode;
/// use symtab::hash_table::Slots;
///
/// struct Hashes(Vec<u64>);
///
/// impl Slots for Hashes {
///     fn hash_at(&self, index: usize) -> u64 {
///         self.0[index]
///     }
/// }
///
/// let mut table = HashTable::with_capacity(2);
/// let mut keys = Hashes(Vec::new());
/// assert_eq!(table.mode(), Mode::List);
///
/// for hash in [11, 22, 33] {
///     if table.is_full() {
///         table.grow(&keys);
///     }
///     keys.0.push(hash);
///     table.push_entry(|| hash);
/// }
///
/// assert_eq!(table.mode(), Mode::Hashed);
/// assert_eq!(table.probe(|| 22).find(|&i| keys.0[i] == 22), Some(1));
/// ```
#[derive(Clone)]
pub struct HashTable {
    capacity: usize,
    len: usize,
    buckets: Vec<Link>,
    chain: Vec<Link>,
    frozen: bool,
}

impl Debug for HashTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut s = f.debug_struct("HashTable");
        s.field("mode", &self.mode())
            .field("len", &self.len)
            .field("capacity", &self.capacity);
        if self.is_hashed() {
            s.field("buckets", &self.buckets)
                .field("chain", &&self.chain[..self.len]);
        }
        if self.frozen {
            s.field("frozen", &true);
        }
        s.finish()
    }
}

impl Default for HashTable {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl HashTable {
    /// Creates a table sized for `hint` entries.
    ///
    /// The capacity is `hint` rounded up to a power of two, and never less
    /// than 2. A capacity above [`LIST_THRESHOLD`] starts out hashed.
    ///
    /// # Panics
    ///
    /// Panics if the rounded capacity exceeds 2^30.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use symtab::hash_table::HashTable;
    /// use symtab::hash_table::Mode;
    ///
    /// let table = HashTable::with_capacity(5);
    /// assert_eq!(table.capacity(), 8);
    /// assert_eq!(table.mode(), Mode::Hashed);
    ///
    /// let small = HashTable::with_capacity(0);
    /// assert_eq!(small.capacity(), 2);
    /// assert_eq!(small.mode(), Mode::List);
    /// ```
    pub fn with_capacity(hint: usize) -> Self {
        let capacity = round_capacity(hint);
        let mut table = Self {
            capacity,
            len: 0,
            buckets: Vec::new(),
            chain: Vec::new(),
            frozen: false,
        };
        if capacity > LIST_THRESHOLD {
            table.allocate_links();
        }
        table
    }

    /// Creates an empty table that panics on every mutation.
    pub const fn frozen_empty() -> Self {
        Self {
            capacity: MIN_CAPACITY,
            len: 0,
            buckets: Vec::new(),
            chain: Vec::new(),
            frozen: true,
        }
    }

    /// Returns the number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of entries the table holds before it must grow.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if the next insertion requires a [`grow`](Self::grow).
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len >= self.capacity
    }

    /// Returns the current lookup strategy.
    #[inline]
    pub fn mode(&self) -> Mode {
        if self.is_hashed() { Mode::Hashed } else { Mode::List }
    }

    #[inline(always)]
    fn is_hashed(&self) -> bool {
        !self.buckets.is_empty()
    }

    /// Returns `true` for a [`frozen_empty`](Self::frozen_empty) table.
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    #[inline(always)]
    fn bucket(&self, hash: u64) -> usize {
        hash as usize & (self.buckets.len() - 1)
    }

    /// Returns the entry indices that may hold a key with the given hash.
    ///
    /// In list mode this is every live entry and `hash` is never called. In
    /// hashed mode it is exactly one bucket chain.
    #[inline]
    pub fn probe(&self, hash: impl FnOnce() -> u64) -> Candidates<'_> {
        let inner = if self.is_hashed() {
            Probe::Chain {
                chain: &self.chain,
                next: self.buckets[self.bucket(hash())],
            }
        } else {
            Probe::List(0..self.len)
        };
        Candidates { inner }
    }

    /// Claims entry index `len()` for a new key and links it under `hash`.
    ///
    /// The caller must already have stored the key at the returned index, or
    /// do so before the next lookup. `hash` is only called in hashed mode.
    ///
    /// # Panics
    ///
    /// Panics if the table is frozen. Callers must [`grow`](Self::grow) a full
    /// table first.
    #[track_caller]
    pub fn push_entry(&mut self, hash: impl FnOnce() -> u64) -> usize {
        ensure_mutable(self.frozen, "insert");
        assert!(self.len < self.capacity, "push_entry on a full table");

        let index = self.len;
        self.len += 1;
        if self.is_hashed() {
            self.link(index, hash());
        }
        index
    }

    /// Appends entry `index` to the tail of the chain for `hash`.
    ///
    /// No-op in list mode.
    pub fn link(&mut self, index: usize, hash: u64) {
        if !self.is_hashed() {
            return;
        }

        let bucket = self.bucket(hash);
        let new = Link::to(index);
        match self.buckets[bucket].index() {
            None => self.buckets[bucket] = new,
            Some(mut tail) => {
                while let Some(next) = self.chain[tail].index() {
                    tail = next;
                }
                self.chain[tail] = new;
            }
        }
    }

    /// Detaches entry `index` from the chain for `hash` without moving any
    /// other entry.
    ///
    /// The entry keeps its index and is invisible to lookups until it is
    /// linked again. No-op in list mode.
    pub fn unlink(&mut self, index: usize, hash: u64) {
        if !self.is_hashed() {
            return;
        }

        let found = self.detach(index, hash);
        debug_assert!(found, "entry {index} missing from its bucket chain");
    }

    fn detach(&mut self, index: usize, hash: u64) -> bool {
        let bucket = self.bucket(hash);
        let target = Link::to(index);
        let next = core::mem::take(&mut self.chain[index]);

        if self.buckets[bucket] == target {
            self.buckets[bucket] = next;
            return true;
        }

        let mut cursor = self.buckets[bucket].index();
        while let Some(i) = cursor {
            if self.chain[i] == target {
                self.chain[i] = next;
                return true;
            }
            cursor = self.chain[i].index();
        }
        false
    }

    /// Removes entry `index`, whose key hashes to `hash`, and compacts.
    ///
    /// Every entry above `index` moves down by one and every link that
    /// pointed past `index` is decremented. Key tables must shift their own
    /// columns the same way; map values are shifted before this call.
    ///
    /// # Panics
    ///
    /// Panics if the table is frozen or `index` is not live.
    #[track_caller]
    pub fn remove_entry(&mut self, index: usize, hash: u64) {
        ensure_mutable(self.frozen, "remove");
        assert!(index < self.len, "remove_entry index {index} out of range");

        if self.is_hashed() {
            self.unlink(index, hash);

            let last = self.len - 1;
            if index < last {
                self.chain.copy_within(index + 1..self.len, index);
                let removed = Link::to(index);
                for link in self.buckets.iter_mut().chain(&mut self.chain[..last]) {
                    link.shift_down(removed);
                }
            }
            self.chain[last] = Link::NONE;
        }

        self.len -= 1;
    }

    /// Doubles the capacity, rehashing every live entry.
    ///
    /// Returns the new capacity.
    #[track_caller]
    pub fn grow<S: Slots + ?Sized>(&mut self, slots: &S) -> usize {
        let target = self.capacity.checked_mul(2).unwrap_or(usize::MAX);
        self.resize(target, slots);
        self.capacity
    }

    /// Grows to at least `new_capacity` slots and rebuilds every chain.
    ///
    /// Link arrays are (re)allocated only when the new capacity exceeds
    /// [`LIST_THRESHOLD`], so the first such call promotes a list-mode table.
    /// Requests that would not grow the table are ignored.
    ///
    /// # Panics
    ///
    /// Panics if the table is frozen or the capacity would exceed 2^30.
    #[track_caller]
    pub fn resize<S: Slots + ?Sized>(&mut self, new_capacity: usize, slots: &S) {
        ensure_mutable(self.frozen, "resize");
        if new_capacity <= self.capacity {
            return;
        }

        let new_capacity = round_capacity(new_capacity);
        if new_capacity > LIST_THRESHOLD && !self.is_hashed() {
            log::trace!(
                "Promoting table to hashed mode at capacity {new_capacity} ({} entries)",
                self.len
            );
        } else {
            log::trace!(
                "Resizing table from {} to {new_capacity} ({} entries)",
                self.capacity,
                self.len
            );
        }

        self.capacity = new_capacity;
        if new_capacity > LIST_THRESHOLD {
            self.allocate_links();
            self.rehash(slots);
        }
    }

    /// Rebuilds every chain from the hashes reported by `slots`.
    ///
    /// No-op in list mode.
    pub fn rehash<S: Slots + ?Sized>(&mut self, slots: &S) {
        if !self.is_hashed() {
            return;
        }

        self.buckets.fill(Link::NONE);
        self.chain.fill(Link::NONE);
        for index in 0..self.len {
            self.link(index, slots.hash_at(index));
        }
    }

    /// Sorts the live entries in place, then rehashes.
    ///
    /// Sorting moves entries without consulting their hashes, so the chains
    /// are rebuilt from `target` afterwards.
    #[track_caller]
    pub fn sort<P: Partition + ?Sized>(&mut self, target: &mut P) {
        ensure_mutable(self.frozen, "sort");
        if self.len > 1 {
            quick_sort(target, 0, self.len - 1);
        }
        self.rehash(&*target);
    }

    /// Forgets every entry, keeping capacity and mode.
    #[track_caller]
    pub fn clear(&mut self) {
        ensure_mutable(self.frozen, "clear");
        self.buckets.fill(Link::NONE);
        self.chain.fill(Link::NONE);
        self.len = 0;
    }

    fn allocate_links(&mut self) {
        self.buckets = vec![Link::NONE; self.capacity * 2];
        self.chain = vec![Link::NONE; self.capacity];
    }

    /// Returns, for each chain length, how many buckets have a chain of
    /// that length. Index 0 counts empty buckets.
    ///
    /// Empty in list mode. Available in tests and with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn chain_histogram(&self) -> Vec<usize> {
        let mut hist = Vec::new();
        for head in &self.buckets {
            let mut length = 0;
            let mut cursor = head.index();
            while let Some(i) = cursor {
                length += 1;
                cursor = self.chain[i].index();
            }
            if hist.len() <= length {
                hist.resize(length + 1, 0);
            }
            hist[length] += 1;
        }
        hist
    }

    /// Returns chain statistics for debugging.
    ///
    /// Available in tests and with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let hist = self.chain_histogram();
        let buckets = self.buckets.len();
        let occupied_buckets = hist.iter().skip(1).sum();

        DebugStats {
            len: self.len,
            capacity: self.capacity,
            mode: self.mode(),
            buckets,
            occupied_buckets,
            longest_chain: hist.len().saturating_sub(1),
            load_factor: self.len as f64 / self.capacity as f64,
            bucket_utilization: if buckets == 0 {
                0.0
            } else {
                occupied_buckets as f64 / buckets as f64
            },
            link_bytes: (self.buckets.len() + self.chain.len()) * core::mem::size_of::<Link>(),
        }
    }
}

#[track_caller]
fn round_capacity(hint: usize) -> usize {
    match hint.max(MIN_CAPACITY).checked_next_power_of_two() {
        Some(capacity) if capacity <= MAX_CAPACITY => capacity,
        _ => panic!("capacity overflow"),
    }
}

fn quick_sort<P: Partition + ?Sized>(target: &mut P, mut lo: usize, mut hi: usize) {
    // Recurse into the smaller side, loop on the larger one.
    while lo < hi {
        let pivot = partition(target, lo, hi);
        let left = pivot - lo;
        let right = hi - pivot;
        if left < right {
            if left > 1 {
                quick_sort(target, lo, pivot - 1);
            }
            lo = pivot + 1;
        } else {
            if right > 1 {
                quick_sort(target, pivot + 1, hi);
            }
            if left == 0 {
                break;
            }
            hi = pivot - 1;
        }
    }
}

fn partition<P: Partition + ?Sized>(target: &mut P, lo: usize, hi: usize) -> usize {
    let mid = lo + (hi - lo) / 2;
    target.swap(mid, hi);

    let mut store = lo;
    for i in lo..hi {
        if target.compare(i, hi) == Ordering::Less {
            target.swap(i, store);
            store += 1;
        }
    }
    target.swap(store, hi);
    store
}

/// Iterator over candidate entry indices, created by [`HashTable::probe`].
pub struct Candidates<'a> {
    inner: Probe<'a>,
}

enum Probe<'a> {
    List(Range<usize>),
    Chain { chain: &'a [Link], next: Link },
}

impl Iterator for Candidates<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        match &mut self.inner {
            Probe::List(range) => range.next(),
            Probe::Chain { chain, next } => {
                let index = next.index()?;
                *next = chain[index];
                Some(index)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use test_log::test;

    use super::*;

    /// Keys that are their own hash, so collisions are easy to arrange.
    #[derive(Debug, Default)]
    struct Keys(Vec<u64>);

    impl Slots for Keys {
        fn hash_at(&self, index: usize) -> u64 {
            self.0[index]
        }
    }

    impl Partition for Keys {
        fn compare(&mut self, a: usize, b: usize) -> Ordering {
            self.0[a].cmp(&self.0[b])
        }

        fn swap(&mut self, a: usize, b: usize) {
            self.0.swap(a, b);
        }
    }

    fn insert(table: &mut HashTable, keys: &mut Keys, key: u64) -> usize {
        if let Some(index) = find(table, keys, key) {
            return index;
        }
        if table.is_full() {
            table.grow(keys);
        }
        keys.0.push(key);
        table.push_entry(|| key)
    }

    fn find(table: &HashTable, keys: &Keys, key: u64) -> Option<usize> {
        table.probe(|| key).find(|&i| keys.0[i] == key)
    }

    fn remove(table: &mut HashTable, keys: &mut Keys, key: u64) -> bool {
        match find(table, keys, key) {
            Some(index) => {
                keys.0.remove(index);
                table.remove_entry(index, key);
                true
            }
            None => false,
        }
    }

    /// Every live entry sits in exactly one chain, the one its hash selects,
    /// and no link points past the live range.
    fn assert_consistent(table: &HashTable, keys: &Keys) {
        assert_eq!(table.len(), keys.0.len());
        if table.mode() == Mode::List {
            return;
        }

        let mut seen = vec![0usize; table.len()];
        for (bucket, head) in table.buckets.iter().enumerate() {
            let mut cursor = head.index();
            while let Some(i) = cursor {
                assert!(i < table.len(), "link to dead entry {i}: {table:?}");
                assert_eq!(table.bucket(keys.hash_at(i)), bucket);
                seen[i] += 1;
                cursor = table.chain[i].index();
            }
        }
        assert!(seen.iter().all(|&n| n == 1), "{seen:?} {table:?}");
        assert!(table.chain[table.len()..].iter().all(|l| l.is_none()));
    }

    #[test]
    fn link_encoding() {
        assert_eq!(Link::NONE.index(), None);
        assert!(Link::NONE.is_none());
        assert_eq!(Link::to(0).index(), Some(0));
        assert_eq!(Link::to(41).index(), Some(41));
        assert_eq!(Link::default(), Link::NONE);

        let mut link = Link::to(5);
        link.shift_down(Link::to(2));
        assert_eq!(link.index(), Some(4));
        link.shift_down(Link::to(4));
        assert_eq!(link.index(), Some(4));
    }

    #[test]
    fn capacity_rounding_and_mode() {
        for (hint, capacity, mode) in [
            (0, 2, Mode::List),
            (1, 2, Mode::List),
            (2, 2, Mode::List),
            (3, 4, Mode::Hashed),
            (100, 128, Mode::Hashed),
        ] {
            let table = HashTable::with_capacity(hint);
            assert_eq!(table.capacity(), capacity, "hint {hint}");
            assert_eq!(table.mode(), mode, "hint {hint}");
        }
    }

    #[test]
    fn three_keys_promote_a_list_table() {
        let mut table = HashTable::with_capacity(2);
        let mut keys = Keys::default();

        insert(&mut table, &mut keys, 7);
        insert(&mut table, &mut keys, 8);
        assert_eq!(table.mode(), Mode::List);

        insert(&mut table, &mut keys, 9);
        assert_eq!(table.mode(), Mode::Hashed);
        assert_eq!(table.capacity(), 4);

        for key in [7, 8, 9] {
            assert!(find(&table, &keys, key).is_some());
        }
        assert_consistent(&table, &keys);
    }

    #[test]
    fn colliding_keys_share_a_chain() {
        let mut table = HashTable::with_capacity(4);
        let mut keys = Keys::default();

        // 8 buckets: all of these land in bucket 1.
        for key in [1, 9, 17, 25] {
            insert(&mut table, &mut keys, key);
        }
        assert_eq!(table.chain_histogram(), vec![7, 0, 0, 0, 1]);
        assert_eq!(
            table.probe(|| 1).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
        assert_eq!(find(&table, &keys, 17), Some(2));
        assert_eq!(find(&table, &keys, 33), None);
    }

    #[test]
    fn list_probe_scans_live_range_without_hashing() {
        let mut table = HashTable::with_capacity(2);
        let mut keys = Keys::default();
        insert(&mut table, &mut keys, 3);
        insert(&mut table, &mut keys, 4);

        let candidates: Vec<usize> = table
            .probe(|| panic!("list mode must not hash"))
            .collect();
        assert_eq!(candidates, vec![0, 1]);
    }

    #[test]
    fn remove_compacts_and_patches_links() {
        let mut table = HashTable::with_capacity(8);
        let mut keys = Keys::default();
        for key in [1, 17, 2, 33, 3, 49] {
            insert(&mut table, &mut keys, key);
        }

        assert!(remove(&mut table, &mut keys, 17));
        assert_consistent(&table, &keys);
        assert_eq!(keys.0, vec![1, 2, 33, 3, 49]);
        for (index, &key) in keys.0.iter().enumerate() {
            assert_eq!(find(&table, &keys, key), Some(index));
        }

        assert!(remove(&mut table, &mut keys, 49));
        assert!(remove(&mut table, &mut keys, 1));
        assert!(!remove(&mut table, &mut keys, 1));
        assert_consistent(&table, &keys);
        assert_eq!(keys.0, vec![2, 33, 3]);
        assert_eq!(find(&table, &keys, 33), Some(1));
    }

    #[test]
    fn remove_in_list_mode() {
        let mut table = HashTable::with_capacity(2);
        let mut keys = Keys::default();
        insert(&mut table, &mut keys, 5);
        insert(&mut table, &mut keys, 6);

        assert!(remove(&mut table, &mut keys, 5));
        assert_eq!(table.len(), 1);
        assert_eq!(find(&table, &keys, 6), Some(0));
    }

    #[test]
    fn unlink_then_link_reuses_slot() {
        let mut table = HashTable::with_capacity(4);
        let mut keys = Keys::default();
        for key in [1, 9, 2] {
            insert(&mut table, &mut keys, key);
        }

        table.unlink(0, 1);
        keys.0[0] = 4;
        table.link(0, 4);

        assert_eq!(find(&table, &keys, 1), None);
        assert_eq!(find(&table, &keys, 9), Some(1));
        assert_eq!(find(&table, &keys, 4), Some(0));
        assert_consistent(&table, &keys);
    }

    #[test]
    fn resize_keeps_lookups() {
        let mut table = HashTable::with_capacity(4);
        let mut keys = Keys::default();
        for key in [10, 20, 30] {
            insert(&mut table, &mut keys, key);
        }

        table.resize(64, &keys);
        assert_eq!(table.capacity(), 64);
        for (index, key) in [10, 20, 30].into_iter().enumerate() {
            assert_eq!(find(&table, &keys, key), Some(index));
        }

        // Never shrinks.
        table.resize(8, &keys);
        assert_eq!(table.capacity(), 64);
        assert_consistent(&table, &keys);
    }

    #[test]
    fn sort_orders_and_rehashes() {
        let mut table = HashTable::with_capacity(2);
        let mut keys = Keys::default();
        let mut rng = SmallRng::seed_from_u64(0x5eed);
        let mut expected = Vec::new();
        for _ in 0..200 {
            let key = rng.random_range(0..1_000u64);
            insert(&mut table, &mut keys, key);
            if !expected.contains(&key) {
                expected.push(key);
            }
        }
        expected.sort_unstable();

        table.sort(&mut keys);
        assert_eq!(keys.0, expected);
        assert_consistent(&table, &keys);
        for (index, &key) in expected.iter().enumerate() {
            assert_eq!(find(&table, &keys, key), Some(index));
        }
    }

    #[test]
    fn sort_handles_duplicates_in_order_key() {
        struct ByParity(Vec<u64>);
        impl Slots for ByParity {
            fn hash_at(&self, index: usize) -> u64 {
                self.0[index]
            }
        }
        impl Partition for ByParity {
            fn compare(&mut self, a: usize, b: usize) -> Ordering {
                (self.0[a] % 2).cmp(&(self.0[b] % 2))
            }
            fn swap(&mut self, a: usize, b: usize) {
                self.0.swap(a, b);
            }
        }

        let mut table = HashTable::with_capacity(16);
        let mut keys = ByParity(Vec::new());
        for key in 0..16u64 {
            keys.0.push(key);
            table.push_entry(|| key);
        }

        table.sort(&mut keys);
        assert!(keys.0[..8].iter().all(|k| k % 2 == 0));
        assert!(keys.0[8..].iter().all(|k| k % 2 == 1));
        for (index, &key) in keys.0.iter().enumerate() {
            assert_eq!(table.probe(|| key).find(|&i| keys.0[i] == key), Some(index));
        }
    }

    #[test]
    fn clear_keeps_capacity_and_mode() {
        let mut table = HashTable::with_capacity(2);
        let mut keys = Keys::default();
        for key in 0..20 {
            insert(&mut table, &mut keys, key);
        }
        let capacity = table.capacity();

        table.clear();
        keys.0.clear();
        assert!(table.is_empty());
        assert_eq!(table.capacity(), capacity);
        assert_eq!(table.mode(), Mode::Hashed);
        assert_eq!(find(&table, &keys, 3), None);
        assert_eq!(table.chain_histogram(), vec![capacity * 2]);
    }

    #[test]
    fn clone_is_independent() {
        let mut table = HashTable::with_capacity(4);
        let mut keys = Keys::default();
        for key in [1, 2, 3] {
            insert(&mut table, &mut keys, key);
        }

        let cloned = table.clone();
        let cloned_keys = Keys(keys.0.clone());
        remove(&mut table, &mut keys, 1);

        assert_eq!(cloned.len(), 3);
        assert_eq!(find(&cloned, &cloned_keys, 1), Some(0));
        assert_consistent(&cloned, &cloned_keys);
    }

    #[test]
    #[should_panic(expected = "unsupported operation on frozen container: insert")]
    fn frozen_rejects_insert() {
        let mut table = HashTable::frozen_empty();
        assert!(table.is_frozen());
        table.push_entry(|| 0);
    }

    #[test]
    #[should_panic(expected = "unsupported operation on frozen container: resize")]
    fn frozen_rejects_resize() {
        let mut table = HashTable::frozen_empty();
        table.grow(&Keys::default());
    }

    #[test]
    fn debug_stats_report_chains() {
        let mut table = HashTable::with_capacity(4);
        let mut keys = Keys::default();
        for key in [1, 9, 2] {
            insert(&mut table, &mut keys, key);
        }

        let stats = table.debug_stats();
        assert_eq!(stats.len, 3);
        assert_eq!(stats.buckets, 8);
        assert_eq!(stats.occupied_buckets, 2);
        assert_eq!(stats.longest_chain, 2);
        assert_eq!(stats.mode, Mode::Hashed);
    }

    #[test]
    fn random_insert_remove_stays_consistent() {
        let mut rng = SmallRng::seed_from_u64(42);
        for initial in [0usize, 2, 64] {
            let mut table = HashTable::with_capacity(initial);
            let mut keys = Keys::default();
            for _ in 0..2_000 {
                let key = rng.random_range(0..128u64);
                if rng.random_bool(0.6) {
                    insert(&mut table, &mut keys, key);
                } else {
                    remove(&mut table, &mut keys, key);
                }
            }
            assert_consistent(&table, &keys);
            for (index, &key) in keys.0.iter().enumerate() {
                assert_eq!(find(&table, &keys, key), Some(index));
            }
        }
    }
}
