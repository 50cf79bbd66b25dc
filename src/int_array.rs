use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::error::Error;
use crate::error::Result;

/// Capacity a fresh array reserves on its first growth.
const DEFAULT_CAPACITY: usize = 10;

/// An amortized-growth dynamic array of `i32` values.
///
/// Unlike [`GrowableArray`](crate::GrowableArray) there is no notion of empty
/// slots: the first `len()` elements are live, and the backing buffer grows
/// by a factor of 1.5 (never below 10 slots) when it runs out of room.
///
/// # Examples
///
/// ```rust
/// use symtab::GrowableIntArray;
///
/// let mut array = GrowableIntArray::new();
/// array.add(1);
/// array.add(3);
/// array.insert_at(1, 2).unwrap();
/// assert_eq!(array.as_slice(), &[1, 2, 3]);
///
/// assert_eq!(array.remove_at(0), Ok(1));
/// assert_eq!(array.get(0), Some(2));
/// ```
#[derive(Clone, Default)]
pub struct GrowableIntArray {
    buf: Box<[i32]>,
    len: usize,
}

impl Debug for GrowableIntArray {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl PartialEq for GrowableIntArray {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for GrowableIntArray {}

impl FromIterator<i32> for GrowableIntArray {
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        let values: Vec<i32> = iter.into_iter().collect();
        let len = values.len();
        Self {
            buf: values.into_boxed_slice(),
            len,
        }
    }
}

impl GrowableIntArray {
    /// Creates an empty array without allocating.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty array able to hold `capacity` values before growing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    /// Returns the number of live values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the array holds no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the size of the backing buffer.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Returns the live values.
    pub fn as_slice(&self) -> &[i32] {
        &self.buf[..self.len]
    }

    /// Iterates the live values in order.
    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.as_slice().iter().copied()
    }

    /// Drops every value, keeping the buffer.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Returns the value at `index`, or `None` past the live range.
    pub fn get(&self, index: usize) -> Option<i32> {
        self.as_slice().get(index).copied()
    }

    /// Replaces the value at `index`, returning the old one.
    pub fn set(&mut self, index: usize, value: i32) -> Result<i32> {
        self.check_index(index, self.len)?;
        Ok(core::mem::replace(&mut self.buf[index], value))
    }

    /// Returns the first index holding `value`.
    pub fn index_of(&self, value: i32) -> Option<usize> {
        self.as_slice().iter().position(|&v| v == value)
    }

    /// Returns `true` if `value` is live in the array.
    pub fn contains(&self, value: i32) -> bool {
        self.index_of(value).is_some()
    }

    /// Appends `value`.
    pub fn add(&mut self, value: i32) {
        self.ensure_capacity(self.len + 1);
        self.buf[self.len] = value;
        self.len += 1;
    }

    /// Inserts `value` at `index`, shifting later values right.
    ///
    /// `index == len()` appends.
    pub fn insert_at(&mut self, index: usize, value: i32) -> Result<()> {
        self.check_index(index, self.len + 1)?;
        self.ensure_capacity(self.len + 1);
        self.buf.copy_within(index..self.len, index + 1);
        self.buf[index] = value;
        self.len += 1;
        Ok(())
    }

    /// Removes the value at `index`, shifting later values left.
    pub fn remove_at(&mut self, index: usize) -> Result<i32> {
        self.check_index(index, self.len)?;
        let value = self.buf[index];
        self.buf.copy_within(index + 1..self.len, index);
        self.len -= 1;
        Ok(value)
    }

    /// Removes the values in `from..to`.
    pub fn remove_range(&mut self, from: usize, to: usize) -> Result<()> {
        if to > self.len {
            return Err(Error::OutOfRange {
                index: to,
                len: self.len,
            });
        }
        if from > to {
            return Err(Error::InvalidArgument("range start exceeds range end"));
        }
        self.buf.copy_within(to..self.len, from);
        self.len -= to - from;
        Ok(())
    }

    /// Shrinks the buffer to exactly the live values.
    pub fn trim_to_size(&mut self) {
        if self.len < self.buf.len() {
            self.buf = self.as_slice().into();
        }
    }

    /// Grows the buffer so it holds at least `min_capacity` values.
    ///
    /// The new size is `1.5 * capacity`, but at least 10 and at least
    /// `min_capacity`. If the 1.5x computation overflows, exactly
    /// `min_capacity` is used.
    pub fn ensure_capacity(&mut self, min_capacity: usize) {
        let old_capacity = self.buf.len();
        if min_capacity <= old_capacity {
            return;
        }

        let new_capacity = match old_capacity.checked_add(old_capacity >> 1) {
            Some(grown) => grown.max(DEFAULT_CAPACITY).max(min_capacity),
            None => min_capacity,
        };

        let mut buf = vec![0; new_capacity].into_boxed_slice();
        buf[..self.len].copy_from_slice(self.as_slice());
        self.buf = buf;
    }

    fn check_index(&self, index: usize, bound: usize) -> Result<()> {
        if index < bound {
            Ok(())
        } else {
            Err(Error::OutOfRange {
                index,
                len: self.len,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_grows_by_half() {
        let mut array = GrowableIntArray::new();
        assert_eq!(array.capacity(), 0);

        array.add(7);
        assert_eq!(array.capacity(), DEFAULT_CAPACITY);

        for i in 1..=DEFAULT_CAPACITY as i32 {
            array.add(i);
        }
        assert_eq!(array.len(), DEFAULT_CAPACITY + 1);
        assert_eq!(array.capacity(), 15);
        assert_eq!(array.get(0), Some(7));
        assert_eq!(array.get(DEFAULT_CAPACITY), Some(DEFAULT_CAPACITY as i32));
    }

    #[test]
    fn ensure_capacity_takes_larger_request() {
        let mut array = GrowableIntArray::with_capacity(4);
        array.ensure_capacity(100);
        assert_eq!(array.capacity(), 100);

        array.ensure_capacity(50);
        assert_eq!(array.capacity(), 100);
    }

    #[test]
    fn insert_and_remove_shift_tail() {
        let mut array: GrowableIntArray = [10, 30, 40].into_iter().collect();
        array.insert_at(1, 20).unwrap();
        assert_eq!(array.as_slice(), &[10, 20, 30, 40]);

        array.insert_at(4, 50).unwrap();
        assert_eq!(array.as_slice(), &[10, 20, 30, 40, 50]);

        assert_eq!(array.remove_at(0), Ok(10));
        assert_eq!(array.remove_at(3), Ok(50));
        assert_eq!(array.as_slice(), &[20, 30, 40]);
    }

    #[test]
    fn bounds_are_checked() {
        let mut array: GrowableIntArray = [1, 2].into_iter().collect();
        assert_eq!(array.get(2), None);
        assert_eq!(array.set(2, 0), Err(Error::OutOfRange { index: 2, len: 2 }));
        assert_eq!(
            array.insert_at(3, 0),
            Err(Error::OutOfRange { index: 3, len: 2 })
        );
        assert_eq!(array.remove_at(5), Err(Error::OutOfRange { index: 5, len: 2 }));
        assert_eq!(array.set(1, 9), Ok(2));
        assert_eq!(array.as_slice(), &[1, 9]);
    }

    #[test]
    fn remove_range_closes_gap() {
        let mut array: GrowableIntArray = (0..8).collect();
        array.remove_range(2, 5).unwrap();
        assert_eq!(array.as_slice(), &[0, 1, 5, 6, 7]);

        array.remove_range(3, 3).unwrap();
        assert_eq!(array.len(), 5);

        assert!(matches!(
            array.remove_range(4, 2),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(
            array.remove_range(0, 6),
            Err(Error::OutOfRange { index: 6, len: 5 })
        );
    }

    #[test]
    fn trim_to_size_and_clear() {
        let mut array = GrowableIntArray::with_capacity(32);
        array.add(1);
        array.add(2);
        array.trim_to_size();
        assert_eq!(array.capacity(), 2);
        assert_eq!(array.as_slice(), &[1, 2]);

        array.clear();
        assert!(array.is_empty());
        assert_eq!(array.capacity(), 2);
    }

    #[test]
    fn index_of_and_contains() {
        let array: GrowableIntArray = [4, 5, 4].into_iter().collect();
        assert_eq!(array.index_of(4), Some(0));
        assert!(array.contains(5));
        assert!(!array.contains(6));
        assert_eq!(array.iter().sum::<i32>(), 13);
    }
}
