//! A sparse set whose universe and capacity are both fixed at compile time, written
//! `FixedSparseSet<I, V, UNIVERSE, CAPACITY>`.
//!
//! Both arrays live inline, so the set never allocates. This makes it suitable for small universes or for embedding in
//! other fixed-size structures; keep in mind that the whole set is moved when the value is moved.

#![allow(unsafe_code)]

use std::mem::MaybeUninit;

use crate::{
  element::Element,
  index::SparseIndex,
  macros::sparse_set_common,
  raw::{RawSparseSet, Storage},
};

/// Inline storage for `UNIVERSE` sparse entries and `CAPACITY` dense slots.
struct FixedStorage<I, V, const UNIVERSE: usize, const CAPACITY: usize> {
  sparse: [I; UNIVERSE],
  dense: [MaybeUninit<Element<I, V>>; CAPACITY],
}

impl<I: SparseIndex, V, const UNIVERSE: usize, const CAPACITY: usize> FixedStorage<I, V, UNIVERSE, CAPACITY> {
  /// Evaluated on construction, so that invalid parameters are rejected at compile time.
  const VALID: () = {
    assert!(CAPACITY <= UNIVERSE, "capacity exceeds the universe size");
    assert!(UNIVERSE <= I::MAX, "the index type is too narrow for the universe");
  };

  fn new() -> Self {
    #[allow(clippy::let_unit_value)]
    let () = Self::VALID;

    Self {
      sparse: [I::ZERO; UNIVERSE],
      dense: std::array::from_fn(|_| MaybeUninit::uninit()),
    }
  }
}

unsafe impl<I, V, const UNIVERSE: usize, const CAPACITY: usize> Storage<I, V>
  for FixedStorage<I, V, UNIVERSE, CAPACITY>
{
  #[inline]
  fn sparse(&self) -> &[I] {
    &self.sparse
  }

  #[inline]
  fn sparse_mut(&mut self) -> &mut [I] {
    &mut self.sparse
  }

  #[inline]
  fn dense_capacity(&self) -> usize {
    CAPACITY
  }

  #[inline]
  fn dense_ptr(&self) -> *const Element<I, V> {
    self.dense.as_ptr().cast()
  }

  #[inline]
  fn dense_mut_ptr(&mut self) -> *mut Element<I, V> {
    self.dense.as_mut_ptr().cast()
  }
}

/// A sparse set with a universe of `UNIVERSE` keys and room for `CAPACITY` elements, stored inline.
///
/// `CAPACITY` must not exceed `UNIVERSE`, and `I` must be able to represent `UNIVERSE`; both are checked at compile
/// time. Use [`IndexWidth::for_universe`](crate::IndexWidth::for_universe) to find the narrowest suitable `I`.
///
/// # Examples
///
/// ```
/// # use sparse_universe::FixedSparseSet;
/// #
/// let mut set: FixedSparseSet<u8, &str, 128, 64> = FixedSparseSet::new();
///
/// assert!(set.insert(12, "Twelve"));
/// assert!(set.insert(7, "Seven"));
/// assert!(!set.insert(7, "Sieben"));
///
/// assert_eq!(set.remove(12), Some("Twelve"));
/// assert_eq!(set[7], "Seven");
/// ```
pub struct FixedSparseSet<I, V, const UNIVERSE: usize, const CAPACITY: usize> {
  raw: RawSparseSet<I, V, FixedStorage<I, V, UNIVERSE, CAPACITY>>,
}

impl<I: SparseIndex, V, const UNIVERSE: usize, const CAPACITY: usize> FixedSparseSet<I, V, UNIVERSE, CAPACITY> {
  /// Constructs a new, empty `FixedSparseSet<I, V, UNIVERSE, CAPACITY>`.
  ///
  /// # Examples
  ///
  /// ```
  /// # use sparse_universe::FixedSparseSet;
  /// #
  /// let set: FixedSparseSet<u16, u32, 1000, 10> = FixedSparseSet::new();
  ///
  /// assert_eq!(set.universe(), 1000);
  /// assert_eq!(set.capacity(), 10);
  /// assert!(set.is_empty());
  /// ```
  #[must_use]
  pub fn new() -> Self {
    Self {
      raw: RawSparseSet::new(FixedStorage::new()),
    }
  }

  /// Inserts `value` at `key`, returning `true` if it was inserted.
  ///
  /// Nothing is inserted, and `value` is dropped, if `key` is already present or the set is full. Those are ordinary
  /// outcomes, not errors: the existing value is left untouched.
  ///
  /// This operation is *O*(*1*).
  ///
  /// # Panics
  ///
  /// Panics if `key` is outside of the universe.
  ///
  /// # Examples
  ///
  /// ```
  /// # use sparse_universe::FixedSparseSet;
  /// #
  /// let mut set: FixedSparseSet<u8, char, 16, 2> = FixedSparseSet::new();
  ///
  /// assert!(set.insert(0, 'a'));
  /// assert!(!set.insert(0, 'b'));
  /// assert!(set.insert(9, 'c'));
  ///
  /// // The set is full.
  /// assert!(!set.insert(4, 'd'));
  /// assert_eq!(set.len(), 2);
  /// ```
  #[track_caller]
  pub fn insert(&mut self, key: I, value: V) -> bool {
    self.raw.insert(key, value)
  }

  /// Removes and returns the value at `key`, if it exists.
  ///
  /// The last element of the dense array is moved into the slot of the removed one, so the order of the remaining
  /// elements is not preserved.
  ///
  /// This operation is *O*(*1*).
  ///
  /// # Examples
  ///
  /// ```
  /// # use sparse_universe::FixedSparseSet;
  /// #
  /// let mut set: FixedSparseSet<u8, (), 16, 8> = FixedSparseSet::new();
  ///
  /// for key in [5, 2, 4, 6] {
  ///   set.add(key);
  /// }
  ///
  /// assert_eq!(set.remove(2), Some(()));
  /// assert_eq!(set.remove(2), None);
  /// assert!(set.keys().eq([5, 6, 4]));
  /// ```
  pub fn remove(&mut self, key: I) -> Option<V> {
    self.raw.remove(key)
  }

  /// Removes and returns the value at `key`, without checking that it exists.
  ///
  /// # Safety
  ///
  /// `key` must be present in the set. Calling this method with an absent key is *undefined behavior*.
  pub unsafe fn remove_unchecked(&mut self, key: I) -> V {
    unsafe { self.raw.remove_unchecked(key) }
  }

  /// Clears the set, removing all values.
  ///
  /// The sparse array is left as is, so this is *O*(*1*) unless `V` needs to be dropped.
  pub fn clear(&mut self) {
    self.raw.clear();
  }
}

impl<I: SparseIndex, const UNIVERSE: usize, const CAPACITY: usize> FixedSparseSet<I, (), UNIVERSE, CAPACITY> {
  /// Adds `key` to a set without values, returning `true` if it was added.
  ///
  /// # Panics
  ///
  /// Panics if `key` is outside of the universe.
  #[track_caller]
  pub fn add(&mut self, key: I) -> bool {
    self.raw.insert(key, ())
  }
}

sparse_set_common!(
  FixedSparseSet<I, V, UNIVERSE, CAPACITY>,
  [I: SparseIndex, V, const UNIVERSE: usize, const CAPACITY: usize],
  "FixedSparseSet::<u8, char, 16, 8>::new()"
);

impl<I: SparseIndex, V: Clone, const UNIVERSE: usize, const CAPACITY: usize> Clone
  for FixedSparseSet<I, V, UNIVERSE, CAPACITY>
{
  fn clone(&self) -> Self {
    Self {
      raw: self.raw.clone_into(FixedStorage::new()),
    }
  }
}

impl<I: SparseIndex, V, const UNIVERSE: usize, const CAPACITY: usize> Default
  for FixedSparseSet<I, V, UNIVERSE, CAPACITY>
{
  fn default() -> Self {
    Self::new()
  }
}
