//! A sparse set whose dense array grows and shrinks on demand, written `GrowableSparseSet<I, V, A>`.
//!
//! All memory comes from an [`Allocator`]. The dense array is allocated lazily on the first insertion, grown by
//! [`GrowPolicy::grow_amount`] slots whenever it is full, shrunk when removals leave
//! [`GrowPolicy::shrink_threshold`] or more free slots, and released entirely when the set is cleared.

#![allow(unsafe_code)]

use std::{cmp, ptr, slice};

use crate::{
  alloc::{Allocator, Global, RawBuf},
  element::Element,
  error::{self, Error, Result},
  index::SparseIndex,
  macros::sparse_set_common,
  raw::{RawSparseSet, Storage},
};

/// Controls how a [`GrowableSparseSet`] resizes its dense array.
///
/// # Examples
///
/// ```
/// # use sparse_universe::GrowPolicy;
/// #
/// let policy = GrowPolicy::new().with_grow_amount(4).with_shrink_threshold(8);
///
/// assert_eq!(policy.grow_amount(), 4);
/// assert_eq!(policy.shrink_threshold(), 8);
/// assert_eq!(GrowPolicy::default().grow_amount(), GrowPolicy::DEFAULT_GROW_AMOUNT);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct GrowPolicy {
  grow_amount: usize,
  shrink_threshold: usize,
}

impl GrowPolicy {
  pub const DEFAULT_GROW_AMOUNT: usize = 16;
  pub const DEFAULT_SHRINK_THRESHOLD: usize = 32;

  /// Constructs the default policy.
  #[must_use]
  pub const fn new() -> Self {
    Self {
      grow_amount: Self::DEFAULT_GROW_AMOUNT,
      shrink_threshold: Self::DEFAULT_SHRINK_THRESHOLD,
    }
  }

  /// Sets the number of slots added each time the dense array is full. Must be at least one.
  #[must_use]
  pub const fn with_grow_amount(mut self, grow_amount: usize) -> Self {
    self.grow_amount = grow_amount;
    self
  }

  /// Sets the number of free slots that triggers a shrink after a removal.
  #[must_use]
  pub const fn with_shrink_threshold(mut self, shrink_threshold: usize) -> Self {
    self.shrink_threshold = shrink_threshold;
    self
  }

  #[must_use]
  pub const fn grow_amount(&self) -> usize {
    self.grow_amount
  }

  #[must_use]
  pub const fn shrink_threshold(&self) -> usize {
    self.shrink_threshold
  }

  /// Checks that the policy can be used by a set.
  ///
  /// # Errors
  ///
  /// Returns [`Error::ZeroGrowAmount`] if the grow amount is zero.
  pub fn validate(&self) -> Result<()> {
    if self.grow_amount == 0 {
      Err(Error::ZeroGrowAmount)
    } else {
      Ok(())
    }
  }
}

impl Default for GrowPolicy {
  fn default() -> Self {
    Self::new()
  }
}

/// Allocator-provided storage. The sparse buffer always holds exactly `universe` initialized entries.
struct GrowableStorage<I, V, A: Allocator> {
  alloc: A,
  sparse: RawBuf<I>,
  dense: RawBuf<Element<I, V>>,
}

impl<I: SparseIndex, V, A: Allocator> GrowableStorage<I, V, A> {
  fn new_in(universe: usize, alloc: A) -> Result<Self> {
    let mut storage = Self {
      alloc,
      sparse: RawBuf::new(),
      dense: RawBuf::new(),
    };

    storage.resize_sparse(universe)?;
    Ok(storage)
  }

  /// Resizes the sparse buffer, zero-filling new entries.
  fn resize_sparse(&mut self, universe: usize) -> Result<()> {
    let old_universe = self.sparse.capacity();
    self.sparse.resize(&self.alloc, universe)?;

    for key in old_universe..universe {
      // SAFETY: `key` is within the capacity just allocated.
      unsafe { ptr::write(self.sparse.as_mut_ptr().add(key), I::ZERO) };
    }

    Ok(())
  }

  /// Resizes the dense buffer. Slots past `capacity` are discarded without being dropped.
  fn resize_dense(&mut self, capacity: usize) -> Result<()> {
    self.dense.resize(&self.alloc, capacity)
  }

  fn release_dense(&mut self) {
    self.dense.release(&self.alloc);
  }
}

unsafe impl<I, V, A: Allocator> Storage<I, V> for GrowableStorage<I, V, A> {
  #[inline]
  fn sparse(&self) -> &[I] {
    // SAFETY: Every entry is written when the buffer grows.
    unsafe { slice::from_raw_parts(self.sparse.as_ptr(), self.sparse.capacity()) }
  }

  #[inline]
  fn sparse_mut(&mut self) -> &mut [I] {
    // SAFETY: Every entry is written when the buffer grows.
    unsafe { slice::from_raw_parts_mut(self.sparse.as_mut_ptr(), self.sparse.capacity()) }
  }

  #[inline]
  fn dense_capacity(&self) -> usize {
    self.dense.capacity()
  }

  #[inline]
  fn dense_ptr(&self) -> *const Element<I, V> {
    self.dense.as_ptr()
  }

  #[inline]
  fn dense_mut_ptr(&mut self) -> *mut Element<I, V> {
    self.dense.as_mut_ptr()
  }
}

impl<I, V, A: Allocator> Drop for GrowableStorage<I, V, A> {
  fn drop(&mut self) {
    // The set dropped the live elements already.
    self.dense.release(&self.alloc);
    self.sparse.release(&self.alloc);
  }
}

/// A sparse set over a universe chosen at runtime, whose dense array is sized on demand by a [`GrowPolicy`].
///
/// # Examples
///
/// ```
/// # use sparse_universe::{GrowableSparseSet, GrowPolicy};
/// #
/// let policy = GrowPolicy::new().with_grow_amount(2).with_shrink_threshold(1);
/// let mut set: GrowableSparseSet<u16, &str> = GrowableSparseSet::with_policy(1000, policy);
///
/// assert_eq!(set.capacity(), 0);
///
/// set.insert(999, "last");
/// set.insert(0, "first");
/// set.insert(500, "middle");
///
/// assert_eq!(set.capacity(), 4);
///
/// set.remove(999);
///
/// assert_eq!(set.capacity(), 2);
/// assert!(set.keys().eq([500, 0]));
/// ```
pub struct GrowableSparseSet<I, V, A: Allocator = Global> {
  raw: RawSparseSet<I, V, GrowableStorage<I, V, A>>,
  policy: GrowPolicy,
}

impl<I: SparseIndex, V> GrowableSparseSet<I, V> {
  /// Constructs a new, empty `GrowableSparseSet<I, V>` over a universe of `universe` keys, using the global allocator
  /// and the default [`GrowPolicy`].
  ///
  /// The sparse array is allocated right away. The dense array is not allocated until the first insertion.
  ///
  /// # Panics
  ///
  /// Panics if `I` is too narrow to address `universe`.
  #[must_use]
  #[track_caller]
  pub fn new(universe: usize) -> Self {
    error::handle_error(Self::try_new(universe))
  }

  /// Fallible version of [`new`](Self::new).
  ///
  /// # Errors
  ///
  /// Returns an error if `I` is too narrow to address `universe` or the sparse array cannot be allocated.
  pub fn try_new(universe: usize) -> Result<Self> {
    Self::try_new_in(universe, GrowPolicy::default(), Global)
  }

  /// Constructs a new, empty `GrowableSparseSet<I, V>` using the global allocator and the given policy.
  ///
  /// # Panics
  ///
  /// Panics if `I` is too narrow to address `universe` or the policy is invalid.
  #[must_use]
  #[track_caller]
  pub fn with_policy(universe: usize, policy: GrowPolicy) -> Self {
    error::handle_error(Self::try_new_in(universe, policy, Global))
  }
}

impl<I: SparseIndex, V, A: Allocator> GrowableSparseSet<I, V, A> {
  /// Constructs a new, empty `GrowableSparseSet<I, V, A>` whose memory comes from `alloc`.
  ///
  /// # Panics
  ///
  /// Panics if `I` is too narrow to address `universe` or the policy is invalid.
  #[must_use]
  #[track_caller]
  pub fn new_in(universe: usize, policy: GrowPolicy, alloc: A) -> Self {
    error::handle_error(Self::try_new_in(universe, policy, alloc))
  }

  /// Fallible version of [`new_in`](Self::new_in).
  ///
  /// # Errors
  ///
  /// Returns [`Error::IndexTooNarrow`] if `I` cannot address `universe`, [`Error::ZeroGrowAmount`] if the policy is
  /// invalid, and [`Error::Alloc`] if the sparse array cannot be allocated.
  pub fn try_new_in(universe: usize, policy: GrowPolicy, alloc: A) -> Result<Self> {
    error::check_index::<I>(universe)?;
    policy.validate()?;

    let storage = GrowableStorage::new_in(universe, alloc)?;

    #[cfg(feature = "tracing")]
    tracing::trace!(universe, "allocated sparse array");

    Ok(Self {
      raw: RawSparseSet::new(storage),
      policy,
    })
  }

  /// Returns a reference to the underlying allocator.
  #[must_use]
  pub fn allocator(&self) -> &A {
    &self.raw.storage().alloc
  }

  #[must_use]
  pub fn policy(&self) -> GrowPolicy {
    self.policy
  }

  /// Replaces the policy. It applies from the next insertion or removal on; the current allocation is kept.
  ///
  /// # Errors
  ///
  /// Returns [`Error::ZeroGrowAmount`] if the policy is invalid, in which case the current policy is kept.
  pub fn set_policy(&mut self, policy: GrowPolicy) -> Result<()> {
    policy.validate()?;
    self.policy = policy;
    Ok(())
  }

  /// Inserts `value` at `key`, returning `true` if it was inserted.
  ///
  /// Nothing is inserted, and `value` is dropped, if `key` is already present. When the dense array is full it grows
  /// by the policy's grow amount, without ever exceeding the universe.
  ///
  /// This operation is amortized *O*(*1*).
  ///
  /// # Panics
  ///
  /// Panics if `key` is outside of the universe. Aborts through [`handle_alloc_error`](std::alloc::handle_alloc_error)
  /// if the dense array cannot grow.
  #[track_caller]
  pub fn insert(&mut self, key: I, value: V) -> bool {
    self.raw.assert_in_universe(key);

    if self.raw.contains(key) {
      return false;
    }

    if self.raw.len() == self.raw.capacity() {
      error::handle_error(self.grow());
    }

    // SAFETY: `key` is in the universe and absent, and the dense array has a free slot.
    unsafe { self.raw.push_unchecked(key, value) };
    true
  }

  /// Removes and returns the value at `key`, if it exists, then shrinks the dense array if the policy asks for it.
  ///
  /// The last element of the dense array is moved into the slot of the removed one.
  pub fn remove(&mut self, key: I) -> Option<V> {
    let value = self.raw.remove(key)?;
    self.shrink_if_slack();
    Some(value)
  }

  /// Removes and returns the value at `key`, without checking that it exists.
  ///
  /// # Safety
  ///
  /// `key` must be present in the set. Calling this method with an absent key is *undefined behavior*.
  pub unsafe fn remove_unchecked(&mut self, key: I) -> V {
    let value = unsafe { self.raw.remove_unchecked(key) };
    self.shrink_if_slack();
    value
  }

  /// Clears the set, removing all values and releasing the dense array.
  pub fn clear(&mut self) {
    self.raw.clear();
    self.release_dense();
  }

  /// Shrinks the dense array to exactly the number of elements held.
  ///
  /// # Panics
  ///
  /// Aborts through [`handle_alloc_error`](std::alloc::handle_alloc_error) if the allocator fails.
  pub fn shrink_to_fit(&mut self) {
    let len = self.raw.len();
    error::handle_error(self.set_dense_capacity(len));
  }

  /// Sets the dense array to exactly `capacity` slots.
  ///
  /// The policy still applies afterwards, so the next insertion or removal may resize it again.
  ///
  /// # Errors
  ///
  /// Returns [`Error::DenseLengthOutOfRange`] if `capacity` is smaller than the number of elements or larger than the
  /// universe, and [`Error::Alloc`] if the allocator fails. The set is unchanged on error.
  pub fn resize_dense(&mut self, capacity: usize) -> Result<()> {
    let len = self.raw.len();
    let universe = self.raw.universe();

    if capacity < len || capacity > universe {
      return Err(Error::DenseLengthOutOfRange {
        requested: capacity,
        len,
        universe,
      });
    }

    self.set_dense_capacity(capacity)
  }

  /// Changes the universe to `universe` keys.
  ///
  /// Shrinking the universe removes and drops every element whose key falls outside of it. The order in which they are
  /// evicted is unspecified. The dense array is trimmed to the new universe if it is larger.
  ///
  /// # Errors
  ///
  /// Returns [`Error::IndexTooNarrow`] if `I` cannot address `universe`, in which case nothing changes, and
  /// [`Error::Alloc`] if the allocator fails. Evictions already performed are kept in the latter case, but the set stays
  /// valid.
  ///
  /// # Examples
  ///
  /// ```
  /// # use sparse_universe::GrowableSparseSet;
  /// #
  /// let mut set: GrowableSparseSet<u8, char> = GrowableSparseSet::new(16);
  ///
  /// set.insert(2, 'a');
  /// set.insert(12, 'b');
  /// set.insert(5, 'c');
  ///
  /// set.resize_universe(10).unwrap();
  ///
  /// assert_eq!(set.universe(), 10);
  /// assert!(!set.contains(12));
  /// assert_eq!(set.len(), 2);
  /// ```
  pub fn resize_universe(&mut self, universe: usize) -> Result<()> {
    error::check_index::<I>(universe)?;

    let old_universe = self.raw.universe();

    if universe < old_universe {
      if self.evict_from(universe) > 0 {
        self.shrink_if_slack();
      }

      if self.raw.capacity() > universe {
        self.set_dense_capacity(universe)?;
      }
    }

    // SAFETY: Every remaining key is below `universe`, and the dense capacity does not exceed it.
    let storage = unsafe { self.raw.storage_mut() };
    storage.resize_sparse(universe)?;

    #[cfg(feature = "tracing")]
    tracing::trace!(from = old_universe, to = universe, len = self.raw.len(), "resized universe");

    Ok(())
  }

  /// Removes every element whose key is `bound` or above, one at a time, returning how many were removed.
  fn evict_from(&mut self, bound: usize) -> usize {
    let mut position = 0;
    let mut evicted = 0;

    while let Some(element) = self.raw.as_slice().get(position) {
      let key = element.key();

      if key.to_usize() < bound {
        position += 1;
        continue;
      }

      // SAFETY: `key` was just read from the dense array. The last element takes its place, so `position` is visited
      // again.
      drop(unsafe { self.raw.remove_unchecked(key) });
      evicted += 1;
    }

    #[cfg(feature = "tracing")]
    {
      if evicted > 0 {
        tracing::trace!(evicted, bound, "evicted keys outside of the universe");
      }
    }

    evicted
  }

  /// Grows the dense array by the grow amount, capped at the universe.
  fn grow(&mut self) -> Result<()> {
    let len = self.raw.len();
    let capacity = cmp::min(len.saturating_add(self.policy.grow_amount), self.raw.universe());
    self.set_dense_capacity(capacity)
  }

  /// Shrinks the dense array once enough slots are free.
  fn shrink_if_slack(&mut self) {
    let len = self.raw.len();
    let capacity = self.raw.capacity();

    if capacity > len && capacity - len >= self.policy.shrink_threshold {
      // A failed shrink keeps the current allocation.
      if let Err(_error) = self.set_dense_capacity(len) {
        #[cfg(feature = "tracing")]
        tracing::trace!(error = %_error, from = capacity, to = len, "failed to shrink dense array");
      }
    }
  }

  /// Reallocates the dense array to exactly `capacity` slots.
  fn set_dense_capacity(&mut self, capacity: usize) -> Result<()> {
    debug_assert!(self.raw.len() <= capacity && capacity <= self.raw.universe());

    let old_capacity = self.raw.capacity();

    if capacity == old_capacity {
      return Ok(());
    }

    // SAFETY: `len <= capacity`, so the live elements are kept, and `capacity` does not exceed the universe.
    let storage = unsafe { self.raw.storage_mut() };
    storage.resize_dense(capacity)?;

    #[cfg(feature = "tracing")]
    trace_dense_resize(old_capacity, capacity, self.raw.len());

    Ok(())
  }

  fn release_dense(&mut self) {
    debug_assert_eq!(self.raw.len(), 0);

    #[cfg(feature = "tracing")]
    let old_capacity = self.raw.capacity();

    // SAFETY: The set is empty.
    let storage = unsafe { self.raw.storage_mut() };
    storage.release_dense();

    #[cfg(feature = "tracing")]
    trace_dense_resize(old_capacity, 0, 0);
  }

  /// Clones the set into `alloc`, keeping the same universe, capacity, policy, and dense order.
  ///
  /// # Panics
  ///
  /// Aborts through [`handle_alloc_error`](std::alloc::handle_alloc_error) if `alloc` fails.
  #[must_use]
  pub fn clone_in<B: Allocator>(&self, alloc: B) -> GrowableSparseSet<I, V, B>
  where
    V: Clone,
  {
    error::handle_error(self.try_clone_in(alloc))
  }

  /// Fallible version of [`clone_in`](Self::clone_in).
  ///
  /// # Errors
  ///
  /// Returns [`Error::Alloc`] if `alloc` fails.
  pub fn try_clone_in<B: Allocator>(&self, alloc: B) -> Result<GrowableSparseSet<I, V, B>>
  where
    V: Clone,
  {
    let mut storage = GrowableStorage::new_in(self.raw.universe(), alloc)?;
    storage.resize_dense(self.raw.capacity())?;

    Ok(GrowableSparseSet {
      raw: self.raw.clone_into(storage),
      policy: self.policy,
    })
  }
}

impl<I: SparseIndex, A: Allocator> GrowableSparseSet<I, (), A> {
  /// Adds `key` to a set without values, returning `true` if it was added.
  ///
  /// # Panics
  ///
  /// Panics if `key` is outside of the universe.
  #[track_caller]
  pub fn add(&mut self, key: I) -> bool {
    self.insert(key, ())
  }
}

sparse_set_common!(
  GrowableSparseSet<I, V, A>,
  [I: SparseIndex, V, A: Allocator],
  "GrowableSparseSet::<u8, char>::new(16)"
);

impl<I: SparseIndex, V: Clone, A: Allocator + Clone> Clone for GrowableSparseSet<I, V, A> {
  fn clone(&self) -> Self {
    self.clone_in(self.allocator().clone())
  }
}

impl<I: SparseIndex, V, A: Allocator> Extend<(I, V)> for GrowableSparseSet<I, V, A> {
  /// Inserts every pair, keeping the first value seen for a key.
  ///
  /// # Panics
  ///
  /// Panics if a key is outside of the universe.
  fn extend<T: IntoIterator<Item = (I, V)>>(&mut self, iter: T) {
    for (key, value) in iter {
      self.insert(key, value);
    }
  }
}

#[cfg(feature = "tracing")]
fn trace_dense_resize(from: usize, to: usize, len: usize) {
  if from == 0 {
    tracing::trace!(to, len, "allocated dense array");
  } else if to == 0 {
    tracing::trace!(from, "released dense array");
  } else if to > from {
    tracing::trace!(from, to, len, "grew dense array");
  } else {
    tracing::trace!(from, to, len, "shrank dense array");
  }
}
