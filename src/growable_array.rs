use alloc::borrow::Cow;
use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashSet;

use crate::error::Error;
use crate::error::Result;
use crate::identity_table::DefaultHashBuilder;

/// Slot count a zero-length array grows to on its first append.
const DEFAULT_LENGTH: usize = 2;

/// Live-element count at which [`GrowableArray::remove_duplicates`] switches
/// from pairwise comparison to a temporary hash set.
const HASH_STRATEGY_THRESHOLD: usize = 16;

/// A slot array whose empty slots only ever trail its live elements.
///
/// `GrowableArray<T>` models a fixed-length array of optional slots that is
/// grown by doubling when full. Every operation preserves the
/// trailing-emptiness invariant: once a slot is empty, every slot after it is
/// empty too. This lets [`live_len`] locate the first free slot with a binary
/// search instead of a linear scan.
///
/// [`live_len`]: GrowableArray::live_len
///
/// # Examples
///
/// ```rust
/// use symtab::GrowableArray;
///
/// let mut array: GrowableArray<&str> = GrowableArray::new();
/// array.append("a");
/// array.append(None);
/// array.append("b");
///
/// assert_eq!(array.live_len(), 2);
/// assert_eq!(array.iter().copied().collect::<Vec<_>>(), vec!["a", "b"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrowableArray<T> {
    slots: Vec<Option<T>>,
}

impl<T> Default for GrowableArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for GrowableArray<T> {
    fn from(values: Vec<T>) -> Self {
        Self::from_vec(values)
    }
}

impl<T> FromIterator<T> for GrowableArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T> GrowableArray<T> {
    /// Creates an array with no slots.
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Creates an array of `length` empty slots.
    pub fn with_length(length: usize) -> Self {
        let mut slots = Vec::with_capacity(length);
        slots.resize_with(length, || None);
        Self { slots }
    }

    /// Creates a fully occupied array from `values`.
    pub fn from_vec(values: Vec<T>) -> Self {
        Self {
            slots: values.into_iter().map(Some).collect(),
        }
    }

    /// Returns the number of slots, occupied or not.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no slot is occupied.
    ///
    /// Unlike [`len`](Self::len), this looks at live elements; see
    /// [`live_len`](Self::live_len).
    pub fn is_empty(&self) -> bool {
        self.slots.first().is_none_or(Option::is_none)
    }

    /// Returns the index of the first empty slot, if any.
    ///
    /// Relies on the trailing-emptiness invariant: the occupied prefix is
    /// found by binary search.
    pub fn first_empty(&self) -> Option<usize> {
        let live = self.live_len();
        (live < self.slots.len()).then_some(live)
    }

    /// Returns the number of live elements.
    pub fn live_len(&self) -> usize {
        self.slots.partition_point(Option::is_some)
    }

    /// Returns the raw slots, trailing empties included.
    pub fn as_slots(&self) -> &[Option<T>] {
        &self.slots
    }

    /// Returns the live element at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Iterates the live elements in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().map_while(Option::as_ref)
    }

    /// Consumes the array, returning its live elements.
    pub fn into_vec(self) -> Vec<T> {
        self.slots.into_iter().map_while(|slot| slot).collect()
    }

    /// Returns `true` if any live element equals `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|v| v == value)
    }

    /// Stores `value` in the first empty slot, growing the array when full.
    ///
    /// Appending `None` is a no-op. When no slot is free the array grows to
    /// `max(2 * len, 2)` slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use symtab::GrowableArray;
    ///
    /// let mut array: GrowableArray<i32> = GrowableArray::with_length(1);
    /// array.append(1);
    /// assert_eq!(array.len(), 1);
    ///
    /// array.append(2);
    /// assert_eq!(array.len(), 2);
    /// array.append(3);
    /// assert_eq!(array.len(), 4);
    /// assert_eq!(array.first_empty(), Some(3));
    /// ```
    pub fn append(&mut self, value: impl Into<Option<T>>) {
        let Some(value) = value.into() else {
            return;
        };

        let slot = match self.first_empty() {
            Some(slot) => slot,
            None => {
                let slot = self.slots.len();
                self.grow(slot + 1);
                slot
            }
        };
        self.slots[slot] = Some(value);
    }

    /// Like [`append`](Self::append), for callers that already track the
    /// live length.
    ///
    /// Runs in O(1) when `known_len` is accurate. A stale `known_len` falls
    /// back to the binary-search path.
    pub fn append_at(&mut self, known_len: usize, value: impl Into<Option<T>>) {
        let Some(value) = value.into() else {
            return;
        };

        let follows_live = known_len == 0
            || self
                .slots
                .get(known_len - 1)
                .is_some_and(Option::is_some);

        if follows_live && known_len == self.slots.len() {
            self.grow(known_len + 1);
            self.slots[known_len] = Some(value);
        } else if follows_live && self.slots.get(known_len).is_some_and(Option::is_none) {
            self.slots[known_len] = Some(value);
        } else {
            self.append(value);
        }
    }

    /// Inserts `value` before every live element.
    pub fn prepend(&mut self, value: impl Into<Option<T>>) {
        let Some(value) = value.into() else {
            return;
        };

        let live = self.live_len();
        if live == self.slots.len() {
            self.grow(live + 1);
        }
        self.slots[..=live].rotate_right(1);
        self.slots[0] = Some(value);
    }

    /// Appends elements of `source` until its first empty slot.
    pub fn add_all_up_to_first_empty(&mut self, source: impl IntoIterator<Item = Option<T>>) {
        let mut live = self.live_len();
        for value in source.into_iter().map_while(|slot| slot) {
            self.append_at(live, value);
            live += 1;
        }
    }

    /// Returns the array sized to its live prefix.
    ///
    /// Borrows `self` unchanged when there are no trailing empties and
    /// `force_copy` is `false`.
    pub fn trim(&self, force_copy: bool) -> Cow<'_, Self>
    where
        T: Clone,
    {
        let live = self.live_len();
        if live == self.slots.len() && !force_copy {
            return Cow::Borrowed(self);
        }
        Cow::Owned(Self {
            slots: self.slots[..live].to_vec(),
        })
    }

    /// Removes and returns the first live element, shifting the rest down.
    ///
    /// Fails with [`Error::InvalidArgument`] if there is no live element.
    pub fn remove_first(&mut self) -> Result<T> {
        let live = self.live_len();
        let value = self
            .slots
            .first_mut()
            .and_then(Option::take)
            .ok_or(Error::InvalidArgument("array has no live elements"))?;
        self.slots[..live].rotate_left(1);
        Ok(value)
    }

    /// Reverses the live elements in place.
    pub fn reverse(&mut self) {
        let live = self.live_len();
        self.slots[..live].reverse();
    }

    /// Reverses the live elements in `from..to`.
    ///
    /// Fails with [`Error::OutOfRange`] if `to` reaches past the live
    /// elements, and with [`Error::InvalidArgument`] if `from > to`.
    pub fn reverse_range(&mut self, from: usize, to: usize) -> Result<()> {
        let live = self.live_len();
        if to > live {
            return Err(Error::OutOfRange {
                index: to,
                len: live,
            });
        }
        if from > to {
            return Err(Error::InvalidArgument("range start exceeds range end"));
        }
        self.slots[from..to].reverse();
        Ok(())
    }

    /// Keeps only the live elements accepted by `keep`, preserving order.
    ///
    /// Nothing is moved unless an element is actually rejected.
    pub fn filter(&mut self, mut keep: impl FnMut(&T) -> bool) {
        let live = self.live_len();
        let Some(first_rejected) = self.slots[..live]
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|v| !keep(v)))
        else {
            return;
        };

        let mut write = first_rejected;
        for read in first_rejected + 1..live {
            if self.slots[read].as_ref().is_some_and(&mut keep) {
                self.slots.swap(write, read);
                write += 1;
            }
        }
        for slot in &mut self.slots[write..live] {
            *slot = None;
        }
    }

    /// Moves every occupied slot to the front and drops all empty slots.
    ///
    /// Repairs arrays assembled without respecting the trailing-emptiness
    /// invariant.
    pub fn remove_empties(&mut self) {
        let mut write = 0;
        for read in 0..self.slots.len() {
            if self.slots[read].is_some() {
                self.slots.swap(write, read);
                write += 1;
            }
        }
        self.slots.truncate(write);
    }

    /// Drops later duplicates, keeping each value's first occurrence.
    ///
    /// Arrays with at least 16 live elements are deduplicated through a
    /// temporary hash set; smaller ones by pairwise comparison. The result
    /// holds no trailing empties.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use symtab::GrowableArray;
    ///
    /// let mut array = GrowableArray::from(vec![1, 2, 1, 3, 2]);
    /// array.remove_duplicates();
    /// assert_eq!(array.into_vec(), vec![1, 2, 3]);
    /// ```
    pub fn remove_duplicates(&mut self)
    where
        T: Hash + Eq,
    {
        let live = self.live_len();
        self.slots.truncate(live);

        if live >= HASH_STRATEGY_THRESHOLD {
            let keep: Vec<bool> = {
                let mut seen = HashSet::with_capacity_and_hasher(live, DefaultHashBuilder::default());
                self.slots
                    .iter()
                    .map(|slot| slot.as_ref().is_some_and(|v| seen.insert(v)))
                    .collect()
            };
            let mut keep = keep.into_iter();
            self.slots.retain(|_| keep.next().unwrap_or(false));
        } else {
            for i in 0..live {
                if self.slots[i].is_none() {
                    continue;
                }
                for j in i + 1..live {
                    if self.slots[j] == self.slots[i] {
                        self.slots[j] = None;
                    }
                }
            }
            self.slots.retain(Option::is_some);
        }
    }

    fn grow(&mut self, min_len: usize) {
        let doubled = self.slots.len().checked_mul(2).unwrap_or(min_len);
        let new_len = doubled.max(DEFAULT_LENGTH).max(min_len);
        self.slots.resize_with(new_len, || None);
    }
}
