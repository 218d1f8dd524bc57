//! Iterators over the dense elements of a sparse set.
//!
//! Every iterator walks the dense array front to back, which is insertion order until the first removal. Removal moves
//! the last element into the vacated slot, so iteration order is otherwise unspecified.

use std::{iter::FusedIterator, slice};

use crate::{element::Element, index::SparseIndex};

macro_rules! dense_iterator {
  ($name:ident, $inner:ident, $item:ty, |$element:ident| $map:expr) => {
    impl<'a, I: SparseIndex, V> Iterator for $name<'a, I, V> {
      type Item = $item;

      #[inline]
      fn next(&mut self) -> Option<Self::Item> {
        self.$inner.next().map(|$element| $map)
      }

      #[inline]
      fn size_hint(&self) -> (usize, Option<usize>) {
        self.$inner.size_hint()
      }

      #[inline]
      fn count(self) -> usize {
        self.$inner.len()
      }
    }

    impl<'a, I: SparseIndex, V> DoubleEndedIterator for $name<'a, I, V> {
      #[inline]
      fn next_back(&mut self) -> Option<Self::Item> {
        self.$inner.next_back().map(|$element| $map)
      }
    }

    impl<'a, I: SparseIndex, V> ExactSizeIterator for $name<'a, I, V> {
      #[inline]
      fn len(&self) -> usize {
        self.$inner.len()
      }
    }

    impl<'a, I: SparseIndex, V> FusedIterator for $name<'a, I, V> {}
  };
}

/// An iterator over the keys and values of a sparse set.
///
/// Created by the `iter` method of each set.
#[derive(Clone, Debug)]
pub struct Iter<'a, I, V> {
  elements: slice::Iter<'a, Element<I, V>>,
}

impl<'a, I, V> Iter<'a, I, V> {
  pub(crate) fn new(elements: &'a [Element<I, V>]) -> Self {
    Self {
      elements: elements.iter(),
    }
  }
}

dense_iterator!(Iter, elements, (I, &'a V), |element| (element.key(), element.value()));

/// An iterator over the keys of a sparse set, with mutable references to the values.
///
/// Created by the `iter_mut` method of each set. Keys are yielded by value so that they can never be changed.
#[derive(Debug)]
pub struct IterMut<'a, I, V> {
  elements: slice::IterMut<'a, Element<I, V>>,
}

impl<'a, I, V> IterMut<'a, I, V> {
  pub(crate) fn new(elements: &'a mut [Element<I, V>]) -> Self {
    Self {
      elements: elements.iter_mut(),
    }
  }
}

dense_iterator!(IterMut, elements, (I, &'a mut V), |element| {
  let key = element.key();
  (key, element.value_mut())
});

/// An iterator over the keys of a sparse set.
#[derive(Clone, Debug)]
pub struct Keys<'a, I, V> {
  elements: slice::Iter<'a, Element<I, V>>,
}

impl<'a, I, V> Keys<'a, I, V> {
  pub(crate) fn new(elements: &'a [Element<I, V>]) -> Self {
    Self {
      elements: elements.iter(),
    }
  }
}

dense_iterator!(Keys, elements, I, |element| element.key());

/// An iterator over the values of a sparse set.
#[derive(Clone, Debug)]
pub struct Values<'a, I, V> {
  elements: slice::Iter<'a, Element<I, V>>,
}

impl<'a, I, V> Values<'a, I, V> {
  pub(crate) fn new(elements: &'a [Element<I, V>]) -> Self {
    Self {
      elements: elements.iter(),
    }
  }
}

dense_iterator!(Values, elements, &'a V, |element| element.value());

/// An iterator over mutable references to the values of a sparse set.
#[derive(Debug)]
pub struct ValuesMut<'a, I, V> {
  elements: slice::IterMut<'a, Element<I, V>>,
}

impl<'a, I, V> ValuesMut<'a, I, V> {
  pub(crate) fn new(elements: &'a mut [Element<I, V>]) -> Self {
    Self {
      elements: elements.iter_mut(),
    }
  }
}

dense_iterator!(ValuesMut, elements, &'a mut V, |element| element.value_mut());

#[cfg(test)]
mod test {
  use coverage_helper::test;

  use super::*;

  fn elements() -> Vec<Element<u8, char>> {
    vec![Element::new(5, 'a'), Element::new(2, 'b'), Element::new(4, 'c')]
  }

  #[test]
  fn test_iter() {
    let elements = elements();
    let iter = Iter::new(&elements);
    assert_eq!(iter.len(), 3);
    assert!(iter.clone().eq([(5, &'a'), (2, &'b'), (4, &'c')]));
    assert!(iter.rev().eq([(4, &'c'), (2, &'b'), (5, &'a')]));
  }

  #[test]
  fn test_iter_is_restartable() {
    let elements = elements();
    let iter = Iter::new(&elements);
    assert_eq!(iter.clone().count(), 3);
    assert_eq!(iter.count(), 3);
  }

  #[test]
  fn test_iter_mut() {
    let mut elements = elements();

    for (key, value) in IterMut::new(&mut elements) {
      if key == 2 {
        *value = 'z';
      }
    }

    assert_eq!(elements[1].value(), &'z');
  }

  #[test]
  fn test_keys() {
    let elements = elements();
    assert!(Keys::new(&elements).eq([5, 2, 4]));
  }

  #[test]
  fn test_values() {
    let elements = elements();
    assert!(Values::new(&elements).eq(&['a', 'b', 'c']));
  }

  #[test]
  fn test_values_mut() {
    let mut elements = elements();
    ValuesMut::new(&mut elements).for_each(|value| *value = value.to_ascii_uppercase());
    assert!(Values::new(&elements).eq(&['A', 'B', 'C']));
  }

  #[test]
  fn test_empty() {
    let elements: Vec<Element<u8, char>> = Vec::new();
    let mut iter = Iter::new(&elements);
    assert_eq!(iter.next(), None);
    assert_eq!(iter.next(), None);
  }
}
