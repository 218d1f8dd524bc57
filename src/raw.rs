//! The sparse set algorithm shared by every storage strategy.
//!
//! A sparse set keeps two arrays: a sparse array indexed by key holding dense positions, and a dense array holding the
//! present elements back to back. A key `k` is present if and only if `sparse[k] < len` and
//! `dense[sparse[k]].key == k`, so the sparse array never needs to be cleared and may hold stale positions. See
//! [this article](https://research.swtch.com/sparse) on more details behind the data structure.
//!
//! The variants only differ in where the two arrays live, which is described by [`Storage`].

#![allow(unsafe_code)]

use std::{marker::PhantomData, ptr, slice};

use crate::{
  element::Element,
  index::SparseIndex,
  iter::{Iter, IterMut, Keys, Values, ValuesMut},
};

/// Backing memory for the sparse and dense arrays of a sparse set.
///
/// # Safety
///
/// - `dense_ptr` and `dense_mut_ptr` must return an aligned pointer valid for reads and writes of `dense_capacity`
///   elements, stable for as long as the storage is not mutated through other methods.
/// - `sparse` must have exactly `universe` entries and `dense_capacity` must never exceed `universe`.
/// - The storage must never read, write, or drop the dense slots itself.
pub(crate) unsafe trait Storage<I, V> {
  fn sparse(&self) -> &[I];

  fn sparse_mut(&mut self) -> &mut [I];

  fn dense_capacity(&self) -> usize;

  fn dense_ptr(&self) -> *const Element<I, V>;

  fn dense_mut_ptr(&mut self) -> *mut Element<I, V>;
}

/// A sparse set over some [`Storage`], tracking how many dense slots are initialized.
pub(crate) struct RawSparseSet<I, V, S: Storage<I, V>> {
  storage: S,

  /// The number of initialized elements at the front of the dense array.
  len: usize,

  /// The set owns values of type `V`.
  _marker: PhantomData<(I, V)>,
}

impl<I: SparseIndex, V, S: Storage<I, V>> RawSparseSet<I, V, S> {
  /// Constructs an empty set over `storage`.
  pub(crate) fn new(storage: S) -> Self {
    debug_assert!(storage.dense_capacity() <= storage.sparse().len());

    Self {
      storage,
      len: 0,
      _marker: PhantomData,
    }
  }

  #[inline]
  pub(crate) fn storage(&self) -> &S {
    &self.storage
  }

  /// Gives mutable access to the storage.
  ///
  /// # Safety
  ///
  /// The caller must keep the first `len` dense slots and the sparse array intact, and must keep the storage contract.
  #[inline]
  pub(crate) unsafe fn storage_mut(&mut self) -> &mut S {
    &mut self.storage
  }

  #[inline]
  pub(crate) fn len(&self) -> usize {
    self.len
  }

  #[inline]
  pub(crate) fn capacity(&self) -> usize {
    self.storage.dense_capacity()
  }

  #[inline]
  pub(crate) fn universe(&self) -> usize {
    self.storage.sparse().len()
  }

  /// Extracts a slice of the present elements.
  #[inline]
  pub(crate) fn as_slice(&self) -> &[Element<I, V>] {
    // SAFETY: The first `len` dense slots are always initialized.
    unsafe { slice::from_raw_parts(self.storage.dense_ptr(), self.len) }
  }

  /// Extracts a mutable slice of the present elements.
  ///
  /// The caller must ensure they do not cause the dense and sparse arrays to become out of sync.
  #[inline]
  fn as_mut_slice(&mut self) -> &mut [Element<I, V>] {
    // SAFETY: The first `len` dense slots are always initialized.
    unsafe { slice::from_raw_parts_mut(self.storage.dense_mut_ptr(), self.len) }
  }

  /// Returns the dense position of `key`, if present.
  #[inline]
  pub(crate) fn position(&self, key: usize) -> Option<usize> {
    let position = self.storage.sparse().get(key)?.to_usize();

    match self.as_slice().get(position) {
      Some(element) if element.key().to_usize() == key => Some(position),
      _ => None,
    }
  }

  #[inline]
  pub(crate) fn contains(&self, key: I) -> bool {
    self.position(key.to_usize()).is_some()
  }

  #[inline]
  pub(crate) fn get(&self, key: I) -> Option<&V> {
    self
      .position(key.to_usize())
      .map(|position| unsafe { self.as_slice().get_unchecked(position) }.value())
  }

  #[inline]
  pub(crate) fn get_mut(&mut self, key: I) -> Option<&mut V> {
    self
      .position(key.to_usize())
      .map(|position| unsafe { self.as_mut_slice().get_unchecked_mut(position) }.value_mut())
  }

  /// # Safety
  ///
  /// `key` must be present.
  #[inline]
  pub(crate) unsafe fn get_unchecked(&self, key: I) -> &V {
    debug_assert!(self.contains(key), "key {:?} is not present", key);

    unsafe {
      let position = self.storage.sparse().get_unchecked(key.to_usize()).to_usize();
      self.as_slice().get_unchecked(position).value()
    }
  }

  /// # Safety
  ///
  /// `key` must be present.
  #[inline]
  pub(crate) unsafe fn get_unchecked_mut(&mut self, key: I) -> &mut V {
    debug_assert!(self.contains(key), "key {:?} is not present", key);

    unsafe {
      let position = self.storage.sparse().get_unchecked(key.to_usize()).to_usize();
      self.as_mut_slice().get_unchecked_mut(position).value_mut()
    }
  }

  /// Panics if `key` is outside of the universe.
  #[inline]
  #[track_caller]
  pub(crate) fn assert_in_universe(&self, key: I) {
    let universe = self.universe();

    if key.to_usize() >= universe {
      key_out_of_range(key.to_usize(), universe);
    }
  }

  /// Inserts `value` at `key` if `key` is absent and the dense array has a free slot.
  ///
  /// Returns `false` without touching the set otherwise. The value is dropped in that case.
  ///
  /// # Panics
  ///
  /// Panics if `key` is outside of the universe.
  #[track_caller]
  pub(crate) fn insert(&mut self, key: I, value: V) -> bool {
    self.assert_in_universe(key);

    if self.contains(key) || self.len == self.capacity() {
      return false;
    }

    // SAFETY: Checked right above.
    unsafe { self.push_unchecked(key, value) };
    true
  }

  /// Appends the element to the dense array and points the sparse array at it.
  ///
  /// # Safety
  ///
  /// `key` must be in the universe, it must be absent, and `len` must be smaller than the dense capacity.
  pub(crate) unsafe fn push_unchecked(&mut self, key: I, value: V) {
    debug_assert!(key.to_usize() < self.universe());
    debug_assert!(!self.contains(key));
    debug_assert!(self.len < self.capacity());

    let len = self.len;

    unsafe {
      ptr::write(self.storage.dense_mut_ptr().add(len), Element::new(key, value));
      *self.storage.sparse_mut().get_unchecked_mut(key.to_usize()) = I::from_usize(len);
    }

    self.len = len + 1;
  }

  /// Removes and returns the value at `key`, if present.
  pub(crate) fn remove(&mut self, key: I) -> Option<V> {
    let position = self.position(key.to_usize())?;

    // SAFETY: `position` comes from a successful lookup.
    Some(unsafe { self.swap_remove(position) })
  }

  /// # Safety
  ///
  /// `key` must be present.
  pub(crate) unsafe fn remove_unchecked(&mut self, key: I) -> V {
    debug_assert!(self.contains(key), "key {:?} is not present", key);

    unsafe {
      let position = self.storage.sparse().get_unchecked(key.to_usize()).to_usize();
      self.swap_remove(position)
    }
  }

  /// Moves the element at `position` out, and moves the last element into its slot.
  ///
  /// # Safety
  ///
  /// `position` must be smaller than `len`.
  unsafe fn swap_remove(&mut self, position: usize) -> V {
    debug_assert!(position < self.len);

    let last = self.len - 1;
    let dense = self.storage.dense_mut_ptr();

    unsafe {
      let removed = ptr::read(dense.add(position));

      if position != last {
        ptr::copy_nonoverlapping(dense.add(last), dense.add(position), 1);

        let moved = (*dense.add(position)).key().to_usize();
        *self.storage.sparse_mut().get_unchecked_mut(moved) = I::from_usize(position);
      }

      self.len = last;
      removed.into_value()
    }
  }

  /// Removes every element, dropping the values.
  pub(crate) fn clear(&mut self) {
    let elements: *mut [Element<I, V>] = self.as_mut_slice();

    // SAFETY:
    // - `elements` comes directly from `as_mut_slice` and is therefore valid.
    // - Setting `self.len` before calling `drop_in_place` means that, if a value's `Drop` impl panics, the set's `Drop`
    //   impl will do nothing (leaking the rest of the values) instead of dropping some twice.
    unsafe {
      self.len = 0;
      ptr::drop_in_place(elements);
    }
  }

  /// Copies the sparse array verbatim and clones every element into `storage`, which must have the same universe and
  /// room for at least `len` elements.
  pub(crate) fn clone_into<T: Storage<I, V>>(&self, mut storage: T) -> RawSparseSet<I, V, T>
  where
    V: Clone,
  {
    assert_eq!(storage.sparse().len(), self.universe());
    assert!(storage.dense_capacity() >= self.len);

    storage.sparse_mut().copy_from_slice(self.storage.sparse());
    let mut cloned = RawSparseSet::new(storage);

    for (position, element) in self.as_slice().iter().enumerate() {
      // SAFETY: `position < len <= dense_capacity` was asserted above. Bumping `len` after each write keeps the clone
      // droppable if a `clone` panics.
      unsafe {
        ptr::write(cloned.storage.dense_mut_ptr().add(position), element.clone());
      }
      cloned.len = position + 1;
    }

    cloned
  }

  pub(crate) fn iter(&self) -> Iter<'_, I, V> {
    Iter::new(self.as_slice())
  }

  pub(crate) fn iter_mut(&mut self) -> IterMut<'_, I, V> {
    IterMut::new(self.as_mut_slice())
  }

  pub(crate) fn keys(&self) -> Keys<'_, I, V> {
    Keys::new(self.as_slice())
  }

  pub(crate) fn values(&self) -> Values<'_, I, V> {
    Values::new(self.as_slice())
  }

  pub(crate) fn values_mut(&mut self) -> ValuesMut<'_, I, V> {
    ValuesMut::new(self.as_mut_slice())
  }

  /// Panics if the bijection between present keys and dense positions is broken.
  #[cfg(test)]
  pub(crate) fn assert_invariants(&self) {
    let sparse = self.storage.sparse();

    assert!(self.len <= self.capacity());
    assert!(self.capacity() <= self.universe());

    for (position, element) in self.as_slice().iter().enumerate() {
      let key = element.key().to_usize();
      assert!(key < self.universe(), "key {} outside of the universe", key);
      assert_eq!(sparse[key].to_usize(), position, "sparse entry of key {} is stale", key);
    }

    for key in 0..self.universe() {
      let present = self.as_slice().iter().any(|element| element.key().to_usize() == key);
      assert_eq!(self.position(key).is_some(), present, "membership of key {} is wrong", key);
    }
  }
}

impl<I, V, S: Storage<I, V>> Drop for RawSparseSet<I, V, S> {
  fn drop(&mut self) {
    // SAFETY: The first `len` dense slots are initialized and dropped exactly once here; the storage never drops them.
    unsafe {
      ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
        self.storage.dense_mut_ptr(),
        self.len,
      ))
    };
  }
}

/// One central function responsible for reporting out-of-range keys.
#[cold]
#[inline(never)]
#[track_caller]
fn key_out_of_range(key: usize, universe: usize) -> ! {
  panic!("key {} is out of range for a universe of {} keys", key, universe);
}

#[cfg(test)]
mod test {
  use std::{cell::RefCell, mem::MaybeUninit, rc::Rc};

  use coverage_helper::test;

  use super::*;

  /// Heap storage used to exercise the algorithm on its own.
  struct VecStorage<V> {
    sparse: Vec<u8>,
    dense: Vec<MaybeUninit<Element<u8, V>>>,
  }

  impl<V> VecStorage<V> {
    fn new(universe: usize, capacity: usize) -> Self {
      Self {
        sparse: vec![0; universe],
        dense: (0..capacity).map(|_| MaybeUninit::uninit()).collect(),
      }
    }
  }

  unsafe impl<V> Storage<u8, V> for VecStorage<V> {
    fn sparse(&self) -> &[u8] {
      &self.sparse
    }

    fn sparse_mut(&mut self) -> &mut [u8] {
      &mut self.sparse
    }

    fn dense_capacity(&self) -> usize {
      self.dense.len()
    }

    fn dense_ptr(&self) -> *const Element<u8, V> {
      self.dense.as_ptr().cast()
    }

    fn dense_mut_ptr(&mut self) -> *mut Element<u8, V> {
      self.dense.as_mut_ptr().cast()
    }
  }

  fn set<V>(universe: usize, capacity: usize) -> RawSparseSet<u8, V, VecStorage<V>> {
    RawSparseSet::new(VecStorage::new(universe, capacity))
  }

  #[derive(Clone)]
  struct Value(Rc<RefCell<u32>>);

  impl Drop for Value {
    fn drop(&mut self) {
      *self.0.borrow_mut() += 1;
    }
  }

  #[test]
  fn test_insert_then_get() {
    let mut set = set(16, 8);
    assert!(set.insert(3, "three"));
    assert_eq!(set.get(3), Some(&"three"));
    assert!(set.contains(3));
    assert_eq!(set.len(), 1);
    set.assert_invariants();
  }

  #[test]
  fn test_insert_duplicate_keeps_value() {
    let mut set = set(16, 8);
    assert!(set.insert(3, 1));
    assert!(!set.insert(3, 2));
    assert_eq!(set.get(3), Some(&1));
    assert_eq!(set.len(), 1);
  }

  #[test]
  fn test_insert_full() {
    let mut set = set(16, 2);
    assert!(set.insert(0, ()));
    assert!(set.insert(9, ()));
    assert!(!set.insert(4, ()));
    assert_eq!(set.len(), 2);
    assert!(!set.contains(4));
    set.assert_invariants();
  }

  #[should_panic(expected = "key 16 is out of range for a universe of 16 keys")]
  #[test]
  fn test_insert_out_of_range() {
    let mut set = set(16, 2);
    set.insert(16, ());
  }

  #[test]
  fn test_stale_sparse_entries_are_ignored() {
    let mut set = set(16, 4);
    assert!(set.insert(7, ()));
    assert_eq!(set.remove(7), Some(()));

    // The sparse entry of 7 still points at position 0, which now holds 2.
    assert!(set.insert(2, ()));
    assert!(!set.contains(7));
    assert!(set.contains(2));
    set.assert_invariants();
  }

  #[test]
  fn test_swap_remove_moves_last() {
    let mut set = set(16, 8);
    for key in [5, 2, 4, 6] {
      assert!(set.insert(key, key as u32 * 10));
    }

    assert_eq!(set.remove(2), Some(20));
    assert!(set.keys().eq([5, 6, 4]));
    assert_eq!(set.len(), 3);
    set.assert_invariants();
  }

  #[test]
  fn test_remove_last() {
    let mut set = set(16, 8);
    assert!(set.insert(1, 'a'));
    assert!(set.insert(2, 'b'));
    assert_eq!(set.remove(2), Some('b'));
    assert!(set.keys().eq([1]));
    set.assert_invariants();
  }

  #[test]
  fn test_remove_absent() {
    let mut set = set(16, 8);
    assert!(set.insert(1, 'a'));
    assert_eq!(set.remove(2), None);
    assert_eq!(set.remove(200), None);
    assert_eq!(set.len(), 1);
  }

  #[test]
  fn test_remove_unchecked() {
    let mut set = set(16, 8);
    assert!(set.insert(1, 'a'));
    assert!(set.insert(2, 'b'));
    assert_eq!(unsafe { set.remove_unchecked(1) }, 'a');
    assert!(set.keys().eq([2]));
    set.assert_invariants();
  }

  #[test]
  fn test_get_unchecked() {
    let mut set = set(16, 8);
    assert!(set.insert(1, 'a'));
    assert_eq!(unsafe { *set.get_unchecked(1) }, 'a');
    unsafe { *set.get_unchecked_mut(1) = 'b' };
    assert_eq!(set.get(1), Some(&'b'));
  }

  #[test]
  fn test_clear_drops() {
    let num_dropped = Rc::new(RefCell::new(0));
    let mut set = set(16, 8);
    let value = Value(num_dropped.clone());
    assert!(set.insert(0, value.clone()));
    assert!(set.insert(1, value.clone()));
    assert!(set.insert(2, value));
    set.clear();

    assert_eq!(set.len(), 0);
    assert!(!set.contains(1));
    assert_eq!(*num_dropped.borrow(), 3);
  }

  #[test]
  fn test_drop() {
    let num_dropped = Rc::new(RefCell::new(0));

    {
      let mut set = set(16, 8);
      let value = Value(num_dropped.clone());
      assert!(set.insert(0, value.clone()));
      assert!(set.insert(1, value));
      drop(set.remove(0));
    }

    assert_eq!(*num_dropped.borrow(), 2);
  }

  #[test]
  fn test_clone_into() {
    let mut set = set(16, 8);
    for key in [5, 2, 4] {
      assert!(set.insert(key, key.to_string()));
    }

    let cloned = set.clone_into(VecStorage::new(16, 3));
    assert!(cloned.iter().eq(set.iter()));
    assert_eq!(cloned.capacity(), 3);
    cloned.assert_invariants();
  }

  #[test]
  fn test_values_mut() {
    let mut set = set(16, 8);
    assert!(set.insert(1, 1));
    assert!(set.insert(2, 2));

    for value in set.values_mut() {
      *value *= 10;
    }

    assert!(set.values().eq(&[10, 20]));
  }

  #[test]
  fn test_iter_mut_cannot_change_keys() {
    let mut set = set(16, 8);
    assert!(set.insert(1, 1));

    for (key, value) in set.iter_mut() {
      *value += key as i32;
    }

    assert_eq!(set.get(1), Some(&2));
    set.assert_invariants();
  }
}
