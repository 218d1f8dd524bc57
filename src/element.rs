//! The record stored in the dense array of every sparse set.

use std::fmt;

/// A key and its value, as stored in the dense array of a sparse set.
///
/// Elements can be read through [`as_slice`](crate::FixedSparseSet::as_slice) and the iterators of each set, but the
/// key can never be changed from outside the set. Sets without a payload use `V = ()`, in which case an element is
/// exactly as large as its key.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct Element<I, V = ()> {
  key: I,
  value: V,
}

impl<I: Copy, V> Element<I, V> {
  #[inline]
  pub(crate) fn new(key: I, value: V) -> Self {
    Self { key, value }
  }

  /// Returns the key of this element.
  #[inline]
  #[must_use]
  pub fn key(&self) -> I {
    self.key
  }

  /// Returns a reference to the value of this element.
  #[inline]
  #[must_use]
  pub fn value(&self) -> &V {
    &self.value
  }

  #[inline]
  pub(crate) fn value_mut(&mut self) -> &mut V {
    &mut self.value
  }

  #[inline]
  pub(crate) fn into_value(self) -> V {
    self.value
  }
}

impl<I: fmt::Debug, V: fmt::Debug> fmt::Debug for Element<I, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Element")
      .field(&self.key)
      .field(&self.value)
      .finish()
  }
}

#[cfg(test)]
mod test {
  use std::mem;

  use coverage_helper::test;

  use super::*;

  #[test]
  fn test_unit_value_is_elided() {
    assert_eq!(mem::size_of::<Element<u8>>(), 1);
    assert_eq!(mem::size_of::<Element<u16, ()>>(), 2);
  }

  #[test]
  fn test_accessors() {
    let mut element = Element::new(3u8, "three");
    assert_eq!(element.key(), 3);
    assert_eq!(element.value(), &"three");

    *element.value_mut() = "drei";
    assert_eq!(element.into_value(), "drei");
  }

  #[test]
  fn test_debug() {
    assert_eq!(format!("{:?}", Element::new(1u8, 'a')), "Element(1, 'a')");
  }
}
