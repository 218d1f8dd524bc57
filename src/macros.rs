//! The part of the public API that is identical for every sparse set variant.
//!
//! Each variant wraps a [`RawSparseSet`](crate::raw::RawSparseSet) in a field named `raw` and implements its own
//! construction, insertion, removal, and clearing, since those are where the variants differ.

macro_rules! sparse_set_common {
  ($set:ty, [$($params:tt)*], $new:literal) => {
    impl<$($params)*> $set {
      /// Returns the number of keys in the universe of this set. Valid keys are `0..universe`.
      #[must_use]
      pub fn universe(&self) -> usize {
        self.raw.universe()
      }

      /// Returns the number of elements the dense array can currently hold.
      #[must_use]
      pub fn capacity(&self) -> usize {
        self.raw.capacity()
      }

      /// Returns the number of elements in the set, also referred to as its 'len'.
      #[must_use]
      pub fn len(&self) -> usize {
        self.raw.len()
      }

      /// Returns `true` if the set contains no elements.
      #[must_use]
      pub fn is_empty(&self) -> bool {
        self.raw.len() == 0
      }

      /// Returns `true` if the dense array has no free slot left.
      #[must_use]
      pub fn is_full(&self) -> bool {
        self.raw.len() == self.raw.capacity()
      }

      /// Returns `true` if the set contains an element at the given key.
      ///
      /// Keys outside of the universe are never contained.
      ///
      /// This operation is *O*(*1*).
      ///
      /// # Examples
      ///
      /// ```
      /// # use sparse_universe::*;
      /// #
      #[doc = concat!("let mut set = ", $new, ";")]
      ///
      /// set.insert(3, 'c');
      ///
      /// assert!(set.contains(3));
      /// assert!(!set.contains(4));
      /// assert!(!set.contains(200));
      /// ```
      #[must_use]
      pub fn contains(&self, key: I) -> bool {
        self.raw.contains(key)
      }

      /// Returns a reference to the value at the given key, if it exists.
      ///
      /// This operation is *O*(*1*).
      ///
      /// # Examples
      ///
      /// ```
      /// # use sparse_universe::*;
      /// #
      #[doc = concat!("let mut set = ", $new, ";")]
      ///
      /// set.insert(1, 'a');
      /// assert_eq!(set.get(1), Some(&'a'));
      /// assert_eq!(set.get(2), None);
      /// ```
      #[must_use]
      pub fn get(&self, key: I) -> Option<&V> {
        self.raw.get(key)
      }

      /// Returns a mutable reference to the value at the given key, if it exists.
      ///
      /// This operation is *O*(*1*).
      ///
      /// # Examples
      ///
      /// ```
      /// # use sparse_universe::*;
      /// #
      #[doc = concat!("let mut set = ", $new, ";")]
      ///
      /// set.insert(1, 'a');
      ///
      /// if let Some(value) = set.get_mut(1) {
      ///   *value = 'z';
      /// }
      ///
      /// assert_eq!(set[1], 'z');
      /// ```
      #[must_use]
      pub fn get_mut(&mut self, key: I) -> Option<&mut V> {
        self.raw.get_mut(key)
      }

      /// Returns a reference to the value at the given key, without checking that it exists.
      ///
      /// # Safety
      ///
      /// `key` must be present in the set. Calling this method with an absent key is *undefined behavior*. Use
      /// [`get`](Self::get) for a checked alternative.
      #[must_use]
      pub unsafe fn get_unchecked(&self, key: I) -> &V {
        unsafe { self.raw.get_unchecked(key) }
      }

      /// Returns a mutable reference to the value at the given key, without checking that it exists.
      ///
      /// # Safety
      ///
      /// `key` must be present in the set. Calling this method with an absent key is *undefined behavior*. Use
      /// [`get_mut`](Self::get_mut) for a checked alternative.
      #[must_use]
      pub unsafe fn get_unchecked_mut(&mut self, key: I) -> &mut V {
        unsafe { self.raw.get_unchecked_mut(key) }
      }

      /// Extracts a slice of the dense array, one [`Element`](crate::Element) per present key.
      #[must_use]
      pub fn as_slice(&self) -> &[crate::Element<I, V>] {
        self.raw.as_slice()
      }

      /// Returns an iterator over the keys and values of the set, in dense order.
      ///
      /// # Examples
      ///
      /// ```
      /// # use sparse_universe::*;
      /// #
      #[doc = concat!("let mut set = ", $new, ";")]
      ///
      /// set.insert(5, 'a');
      /// set.insert(2, 'b');
      ///
      /// let mut iterator = set.iter();
      ///
      /// assert_eq!(iterator.next(), Some((5, &'a')));
      /// assert_eq!(iterator.next(), Some((2, &'b')));
      /// assert_eq!(iterator.next(), None);
      /// ```
      pub fn iter(&self) -> crate::iter::Iter<'_, I, V> {
        self.raw.iter()
      }

      /// Returns an iterator over the keys of the set, with mutable references to the values, in dense order.
      pub fn iter_mut(&mut self) -> crate::iter::IterMut<'_, I, V> {
        self.raw.iter_mut()
      }

      /// Returns an iterator over the keys of the set, in dense order.
      pub fn keys(&self) -> crate::iter::Keys<'_, I, V> {
        self.raw.keys()
      }

      /// Returns an iterator over the values of the set, in dense order.
      pub fn values(&self) -> crate::iter::Values<'_, I, V> {
        self.raw.values()
      }

      /// Returns an iterator that allows modifying each value, in dense order.
      ///
      /// # Examples
      ///
      /// ```
      /// # use sparse_universe::*;
      /// #
      #[doc = concat!("let mut set = ", $new, ";")]
      ///
      /// set.insert(5, 'a');
      /// set.insert(2, 'b');
      ///
      /// for value in set.values_mut() {
      ///   *value = value.to_ascii_uppercase();
      /// }
      ///
      /// assert!(set.values().eq(&['A', 'B']));
      /// ```
      pub fn values_mut(&mut self) -> crate::iter::ValuesMut<'_, I, V> {
        self.raw.values_mut()
      }
    }

    impl<$($params)*> std::fmt::Debug for $set
    where
      V: std::fmt::Debug,
    {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.raw.iter()).finish()
      }
    }

    impl<$($params)*> std::ops::Index<I> for $set {
      type Output = V;

      #[track_caller]
      fn index(&self, key: I) -> &V {
        match self.raw.get(key) {
          Some(value) => value,
          None => crate::macros::key_not_present(key),
        }
      }
    }

    impl<$($params)*> std::ops::IndexMut<I> for $set {
      #[track_caller]
      fn index_mut(&mut self, key: I) -> &mut V {
        match self.raw.get_mut(key) {
          Some(value) => value,
          None => crate::macros::key_not_present(key),
        }
      }
    }

    impl<'a, $($params)*> IntoIterator for &'a $set {
      type Item = (I, &'a V);
      type IntoIter = crate::iter::Iter<'a, I, V>;

      fn into_iter(self) -> Self::IntoIter {
        self.raw.iter()
      }
    }

    impl<'a, $($params)*> IntoIterator for &'a mut $set {
      type Item = (I, &'a mut V);
      type IntoIter = crate::iter::IterMut<'a, I, V>;

      fn into_iter(self) -> Self::IntoIter {
        self.raw.iter_mut()
      }
    }
  };
}

pub(crate) use sparse_set_common;

#[cold]
#[inline(never)]
#[track_caller]
pub(crate) fn key_not_present<I: std::fmt::Debug>(key: I) -> ! {
  panic!("key {:?} is not present", key);
}
