use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Debug;
use core::hash::Hash;

use crate::error::ensure_mutable;
use crate::hash_table::Companion;
use crate::hash_table::HashTable;
use crate::hash_table::Lockstep;
use crate::hash_table::Mode;
use crate::hash_table::Slots;

/// An element of a sequence key: a byte or a character code.
pub trait Unit: Copy + Ord + Hash + Debug + 'static {
    /// The value this element contributes to [`hash_sequence`].
    fn hash_value(self) -> u64;
}

macro_rules! impl_unit {
    ($($t:ty),*) => {
        $(
            impl Unit for $t {
                #[inline(always)]
                fn hash_value(self) -> u64 {
                    self as u64
                }
            }
        )*
    };
}

impl_unit!(u8, u16, u32, char);

/// Hashes a sequence key: `h = h + (h << 3) + c` for every element.
///
/// The result is order sensitive and deterministic across runs.
///
/// ```rust
/// use symtab::sequence_table::hash_sequence;
///
/// assert_eq!(hash_sequence::<u8>(b""), 0);
/// assert_eq!(hash_sequence(b"ab"), 971);
/// assert_ne!(hash_sequence(b"ab"), hash_sequence(b"ba"));
/// ```
#[inline]
pub fn hash_sequence<C: Unit>(key: &[C]) -> u64 {
    key.iter()
        .fold(0u64, |h, &c| h.wrapping_add(h << 3).wrapping_add(c.hash_value()))
}

struct SequenceSlots<'a, C>(&'a [Rc<[C]>]);

impl<C: Unit> Slots for SequenceSlots<'_, C> {
    #[inline]
    fn hash_at(&self, index: usize) -> u64 {
        hash_sequence(&self.0[index])
    }
}

/// A key table for byte or character sequences.
///
/// Keys are copied into shared, immutable `Rc<[C]>` buffers on insertion, so
/// a slice of a larger scanner buffer can be interned without keeping the
/// buffer alive. Lookups take any `&[C]`, including a sub-slice of another
/// buffer, and never allocate.
///
/// Each key gets a dense entry index in insertion order. Removing a key
/// shifts every later key down by one.
///
/// # Examples
///
/// ```rust
/// use symtab::SequenceTable;
///
/// let source = b"int main(int argc)";
/// let mut table: SequenceTable = SequenceTable::with_capacity(4);
///
/// assert_eq!(table.insert(&source[0..3]), 0);
/// assert_eq!(table.insert(&source[4..8]), 1);
/// assert_eq!(table.insert(&source[9..12]), 0);
///
/// assert_eq!(table.lookup(b"main"), Some(1));
/// assert_eq!(table.key_at(0), Some(&b"int"[..]));
/// ```
#[derive(Clone)]
pub struct SequenceTable<C = u8> {
    engine: HashTable,
    keys: Vec<Rc<[C]>>,
}

impl<C: Unit> Debug for SequenceTable<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}

impl<C: Unit> Default for SequenceTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Unit> SequenceTable<C> {
    /// Creates an empty table in list mode.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty table sized for `hint` keys.
    pub fn with_capacity(hint: usize) -> Self {
        let engine = HashTable::with_capacity(hint);
        let keys = Vec::with_capacity(engine.capacity());
        Self { engine, keys }
    }

    /// Creates an empty table that panics on every mutation.
    pub const fn frozen_empty() -> Self {
        Self {
            engine: HashTable::frozen_empty(),
            keys: Vec::new(),
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

    /// Returns the entry index of `key`.
    ///
    /// List-mode tables compare against every key; hashed tables hash `key`
    /// once and walk a single chain.
    pub fn lookup(&self, key: &[C]) -> Option<usize> {
        self.engine
            .probe(|| hash_sequence(key))
            .find(|&index| *self.keys[index] == *key)
    }

    /// Returns `true` if `key` is present.
    #[inline]
    pub fn contains_key(&self, key: &[C]) -> bool {
        self.lookup(key).is_some()
    }

    /// Inserts a copy of `key` unless an equal key is present.
    ///
    /// Returns the key's entry index and whether it was newly inserted.
    ///
    /// # Panics
    ///
    /// Panics if the table is frozen.
    #[track_caller]
    pub fn insert_full(&mut self, key: &[C]) -> (usize, bool) {
        ensure_mutable(self.engine.is_frozen(), "insert");
        match self.lookup(key) {
            Some(index) => (index, false),
            None => (self.push(Rc::from(key)), true),
        }
    }

    /// Inserts a copy of `key` unless an equal key is present, returning the
    /// key's entry index.
    #[track_caller]
    pub fn insert(&mut self, key: &[C]) -> usize {
        self.insert_full(key).0
    }

    /// Appends a key known to be absent.
    pub(crate) fn push(&mut self, key: Rc<[C]>) -> usize {
        if self.engine.is_full() {
            self.engine.grow(&SequenceSlots(&self.keys));
        }
        let index = self.engine.push_entry(|| hash_sequence(&key));
        self.keys.push(key);
        index
    }

    /// Returns the key stored at `index`.
    #[inline]
    pub fn key_at(&self, index: usize) -> Option<&[C]> {
        self.keys.get(index).map(|key| &**key)
    }

    /// Returns the shared copy of the key stored at `index`.
    #[inline]
    pub fn key_rc_at(&self, index: usize) -> Option<&Rc<[C]>> {
        self.keys.get(index)
    }

    /// Iterates the keys in entry-index order.
    pub fn keys(&self) -> Keys<'_, C> {
        Keys {
            inner: self.keys.iter(),
        }
    }

    /// Removes `key`, returning the entry index it occupied.
    #[track_caller]
    pub fn remove(&mut self, key: &[C]) -> Option<usize> {
        ensure_mutable(self.engine.is_frozen(), "remove");
        let index = self.lookup(key)?;
        self.remove_at(index);
        Some(index)
    }

    /// Removes the key at `index`, shifting every later key down by one.
    ///
    /// Returns `None` if `index` is not live.
    #[track_caller]
    pub fn remove_at(&mut self, index: usize) -> Option<Rc<[C]>> {
        ensure_mutable(self.engine.is_frozen(), "remove");
        if index >= self.len() {
            return None;
        }
        let key = self.keys.remove(index);
        self.engine.remove_entry(index, hash_sequence(&key));
        Some(key)
    }

    /// Makes room for at least `additional` more keys without growing.
    #[track_caller]
    pub fn reserve(&mut self, additional: usize) {
        let needed = self.len().saturating_add(additional);
        if needed > self.capacity() {
            self.engine.resize(needed, &SequenceSlots(&self.keys));
            self.keys.reserve(self.capacity() - self.keys.len());
        }
    }

    /// Sorts the keys with `cmp`, then rehashes.
    #[track_caller]
    pub fn sort_by<F>(&mut self, cmp: F)
    where
        F: FnMut(&[C], &[C]) -> Ordering,
    {
        self.sort_with(&mut (), cmp);
    }

    /// Sorts the keys in element order, then rehashes.
    #[track_caller]
    pub fn sort(&mut self) {
        self.sort_by(|a, b| a.cmp(b));
    }

    /// Sorts the keys and swaps `companion` in lock-step.
    #[track_caller]
    pub(crate) fn sort_with<V, F>(&mut self, companion: &mut V, mut cmp: F)
    where
        V: Companion + ?Sized,
        F: FnMut(&[C], &[C]) -> Ordering,
    {
        let mut target = Lockstep {
            keys: self.keys.as_mut_slice(),
            companion,
            hash: |key: &Rc<[C]>| hash_sequence(key),
            cmp: |a: &Rc<[C]>, b: &Rc<[C]>| cmp(a, b),
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

/// Iterator over the keys of a [`SequenceTable`] in entry-index order.
#[derive(Clone)]
pub struct Keys<'a, C> {
    inner: core::slice::Iter<'a, Rc<[C]>>,
}

impl<'a, C> Iterator for Keys<'a, C> {
    type Item = &'a [C];

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|key| &**key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<C> DoubleEndedIterator for Keys<'_, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|key| &**key)
    }
}

impl<C> ExactSizeIterator for Keys<'_, C> {}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use test_log::test;

    use super::*;

    #[test]
    fn test_hash_is_shift_add() {
        assert_eq!(hash_sequence::<u8>(&[]), 0);
        assert_eq!(hash_sequence(b"a"), 97);
        assert_eq!(hash_sequence(b"ab"), 97 + (97 << 3) + 98);
        assert_eq!(hash_sequence(&['a', 'b']), hash_sequence(b"ab"));
        assert_eq!(hash_sequence(&[97u16, 98]), hash_sequence(b"ab"));

        let long = [0xffu8; 64];
        assert_eq!(hash_sequence(&long), hash_sequence(&long));
    }

    #[test]
    fn test_three_keys_promote() {
        let mut table: SequenceTable = SequenceTable::with_capacity(2);
        assert_eq!(table.mode(), Mode::List);

        table.insert(b"a");
        table.insert(b"b");
        table.insert(b"c");

        assert_eq!(table.mode(), Mode::Hashed);
        assert_eq!(table.len(), 3);
        for (index, key) in [b"a", b"b", b"c"].into_iter().enumerate() {
            assert_eq!(table.lookup(key), Some(index));
        }
    }

    #[test]
    fn test_remove_keeps_other_keys() {
        let mut table: SequenceTable = SequenceTable::new();
        table.insert(b"abc");
        table.insert(b"xyz");

        assert_eq!(table.remove(b"abc"), Some(0));
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup(b"xyz"), Some(0));
        assert_eq!(table.lookup(b"abc"), None);
        assert_eq!(table.remove(b"abc"), None);
    }

    #[test]
    fn test_sub_slice_key() {
        let text = String::from("hello world");
        let mut table: SequenceTable = SequenceTable::new();
        table.insert(&text.as_bytes()[0..5]);
        drop(text);

        let probe = vec![b'h', b'e', b'l', b'l', b'o'];
        assert_eq!(table.lookup(&probe), Some(0));
        assert_eq!(table.lookup(b"hell"), None);
        assert_eq!(table.lookup(b"hello "), None);
    }

    #[test]
    fn test_insert_full_reports_duplicates() {
        let mut table: SequenceTable<char> = SequenceTable::new();
        let key: Vec<char> = "ident".chars().collect();

        assert_eq!(table.insert_full(&key), (0, true));
        assert_eq!(table.insert_full(&key), (0, false));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_remove_at_compacts() {
        let mut table: SequenceTable = SequenceTable::with_capacity(8);
        for key in [&b"w"[..], b"x", b"y", b"z"] {
            table.insert(key);
        }

        assert_eq!(table.remove_at(1).as_deref(), Some(&b"x"[..]));
        assert_eq!(table.remove_at(3), None);
        let keys: Vec<&[u8]> = table.keys().collect();
        assert_eq!(keys, vec![&b"w"[..], b"y", b"z"]);
        assert_eq!(table.lookup(b"z"), Some(2));
    }

    #[test]
    fn test_sort_then_lookup() {
        let mut table: SequenceTable = SequenceTable::new();
        for key in ["while", "auto", "int", "break", "char", "do"] {
            table.insert(key.as_bytes());
        }

        table.sort();
        let keys: Vec<&[u8]> = table.keys().collect();
        assert_eq!(
            keys,
            vec![&b"auto"[..], b"break", b"char", b"do", b"int", b"while"]
        );
        for (index, key) in keys.iter().enumerate() {
            assert_eq!(table.lookup(key), Some(index));
        }

        table.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        assert_eq!(table.key_at(0), Some(&b"break"[..]));
        assert_eq!(table.lookup(b"do"), Some(5));
    }

    #[test]
    fn test_key_rc_is_shared() {
        let mut table: SequenceTable = SequenceTable::new();
        table.insert(b"shared");
        let first = Rc::clone(table.key_rc_at(0).unwrap());
        table.insert(b"shared");
        assert!(Rc::ptr_eq(&first, table.key_rc_at(0).unwrap()));
    }

    #[test]
    fn test_reserve_promotes() {
        let mut table: SequenceTable = SequenceTable::new();
        table.insert(b"k");
        table.reserve(100);
        assert!(table.capacity() >= 101);
        assert_eq!(table.mode(), Mode::Hashed);
        assert_eq!(table.lookup(b"k"), Some(0));
    }

    #[test]
    fn test_clear_and_clone() {
        let mut table: SequenceTable = SequenceTable::new();
        for i in 0..20u8 {
            table.insert(&[i, i]);
        }
        let cloned = table.clone();
        table.clear();

        assert!(table.is_empty());
        assert_eq!(table.lookup(&[3, 3]), None);
        assert_eq!(cloned.len(), 20);
        assert_eq!(cloned.lookup(&[3, 3]), Some(3));
    }

    #[test]
    fn test_frozen_empty_reads() {
        const EMPTY: SequenceTable = SequenceTable::frozen_empty();
        let table = EMPTY;
        assert!(table.is_frozen());
        assert!(table.is_empty());
        assert_eq!(table.lookup(b"x"), None);
        assert_eq!(table.keys().count(), 0);
    }

    #[test]
    #[should_panic(expected = "unsupported operation on frozen container: insert")]
    fn test_frozen_empty_rejects_insert() {
        let mut table: SequenceTable = SequenceTable::frozen_empty();
        table.insert(b"x");
    }
}
