//! A sparse set whose universe and capacity are chosen at runtime and fixed afterwards, written
//! `BoundedSparseSet<I, V>`.
//!
//! Both arrays are allocated once, on construction, and never change size.

#![allow(unsafe_code)]

use std::mem::MaybeUninit;

use crate::{
  element::Element,
  error::{self, Result},
  index::SparseIndex,
  macros::sparse_set_common,
  raw::{RawSparseSet, Storage},
};

/// Heap storage allocated once for `universe` sparse entries and `capacity` dense slots.
struct BoundedStorage<I, V> {
  sparse: Box<[I]>,
  dense: Box<[MaybeUninit<Element<I, V>>]>,
}

impl<I: SparseIndex, V> BoundedStorage<I, V> {
  fn new(universe: usize, capacity: usize) -> Self {
    Self {
      sparse: vec![I::ZERO; universe].into_boxed_slice(),
      dense: (0..capacity).map(|_| MaybeUninit::uninit()).collect(),
    }
  }
}

unsafe impl<I, V> Storage<I, V> for BoundedStorage<I, V> {
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
    self.dense.len()
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

/// A sparse set with a universe of `universe` keys and room for `capacity` elements, both chosen on construction.
///
/// # Examples
///
/// ```
/// # use sparse_universe::BoundedSparseSet;
/// #
/// let mut set: BoundedSparseSet<u8, String> = BoundedSparseSet::new(128, 64);
///
/// set.insert(12, "Twelve".to_owned());
/// set.insert(7, "Seven".to_owned());
/// set.insert(49, "Forty-nine".to_owned());
///
/// for value in set.values_mut() {
///   value.push_str("!!");
/// }
///
/// set.remove(12);
///
/// assert!(set.iter().eq([(49, &"Forty-nine!!".to_owned()), (7, &"Seven!!".to_owned())]));
/// ```
pub struct BoundedSparseSet<I, V> {
  raw: RawSparseSet<I, V, BoundedStorage<I, V>>,
}

impl<I: SparseIndex, V> BoundedSparseSet<I, V> {
  /// Constructs a new, empty `BoundedSparseSet<I, V>` over a universe of `universe` keys, able to hold `capacity`
  /// elements.
  ///
  /// # Panics
  ///
  /// Panics if `capacity` exceeds `universe`, or if `I` is too narrow to address `universe`. See
  /// [`try_new`](Self::try_new) for a fallible alternative.
  ///
  /// # Examples
  ///
  /// ```
  /// # use sparse_universe::BoundedSparseSet;
  /// #
  /// let set: BoundedSparseSet<u16, u32> = BoundedSparseSet::new(1000, 10);
  ///
  /// assert_eq!(set.universe(), 1000);
  /// assert_eq!(set.capacity(), 10);
  /// ```
  #[must_use]
  #[track_caller]
  pub fn new(universe: usize, capacity: usize) -> Self {
    error::handle_error(Self::try_new(universe, capacity))
  }

  /// Constructs a new, empty `BoundedSparseSet<I, V>` over a universe of `universe` keys, able to hold `capacity`
  /// elements.
  ///
  /// # Errors
  ///
  /// Returns [`Error::CapacityExceedsUniverse`](crate::Error::CapacityExceedsUniverse) if `capacity` exceeds
  /// `universe`, and [`Error::IndexTooNarrow`](crate::Error::IndexTooNarrow) if `I` cannot address `universe`.
  ///
  /// # Examples
  ///
  /// ```
  /// # use sparse_universe::{BoundedSparseSet, Error, IndexWidth};
  /// #
  /// let result = BoundedSparseSet::<u8, ()>::try_new(256, 16);
  ///
  /// assert_eq!(
  ///   result.err(),
  ///   Some(Error::IndexTooNarrow {
  ///     universe: 256,
  ///     required: IndexWidth::U16,
  ///     actual: IndexWidth::U8,
  ///   })
  /// );
  /// ```
  pub fn try_new(universe: usize, capacity: usize) -> Result<Self> {
    error::check_index::<I>(universe)?;
    error::check_capacity(capacity, universe)?;

    Ok(Self {
      raw: RawSparseSet::new(BoundedStorage::new(universe, capacity)),
    })
  }

  /// Constructs a new, empty `BoundedSparseSet<I, V>` able to hold every key of a universe of `universe` keys.
  ///
  /// # Panics
  ///
  /// Panics if `I` is too narrow to address `universe`.
  #[must_use]
  #[track_caller]
  pub fn with_universe(universe: usize) -> Self {
    Self::new(universe, universe)
  }

  /// Inserts `value` at `key`, returning `true` if it was inserted.
  ///
  /// Nothing is inserted, and `value` is dropped, if `key` is already present or the set is full.
  ///
  /// This operation is *O*(*1*).
  ///
  /// # Panics
  ///
  /// Panics if `key` is outside of the universe.
  #[track_caller]
  pub fn insert(&mut self, key: I, value: V) -> bool {
    self.raw.insert(key, value)
  }

  /// Removes and returns the value at `key`, if it exists.
  ///
  /// The last element of the dense array is moved into the slot of the removed one.
  ///
  /// This operation is *O*(*1*).
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

  /// Clears the set, removing all values. The storage is kept.
  pub fn clear(&mut self) {
    self.raw.clear();
  }
}

impl<I: SparseIndex> BoundedSparseSet<I, ()> {
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

sparse_set_common!(BoundedSparseSet<I, V>, [I: SparseIndex, V], "BoundedSparseSet::<u8, char>::new(16, 8)");

impl<I: SparseIndex, V: Clone> Clone for BoundedSparseSet<I, V> {
  fn clone(&self) -> Self {
    Self {
      raw: self
        .raw
        .clone_into(BoundedStorage::new(self.universe(), self.capacity())),
    }
  }
}
