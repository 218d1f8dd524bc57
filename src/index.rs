//! Defines types and implementations for indexing the sparse set data structures.
//!
//! The sparse array of every set stores dense positions using the set's index type, and every dense element stores
//! its key with it too. Picking the narrowest type able to address the universe keeps both arrays compact.

use std::fmt;

/// A type with this trait indicates it can be used as a key into, and a position within, a sparse set.
///
/// Two indices must convert to the same `usize` if and only if they are equal, and every `usize` in `0..=MAX` must
/// survive a round trip through [`SparseIndex::from_usize`] and [`SparseIndex::to_usize`].
pub trait SparseIndex: Copy + Eq + fmt::Debug {
  /// The largest value representable by this index type, as a `usize`.
  const MAX: usize;

  /// The zero value, used to initialize sparse arrays.
  const ZERO: Self;

  /// The width this index type occupies.
  const WIDTH: IndexWidth;

  /// Converts a `usize` into this index type.
  ///
  /// Callers must ensure `value <= Self::MAX`; larger values are truncated.
  fn from_usize(value: usize) -> Self;

  /// Converts this index into a `usize`.
  fn to_usize(self) -> usize;

  /// Returns `true` if every position of a universe of `universe` keys, and the universe size itself, is representable
  /// by this index type.
  ///
  /// # Examples
  ///
  /// ```
  /// # use sparse_universe::SparseIndex;
  /// #
  /// assert!(u8::fits_universe(255));
  /// assert!(!u8::fits_universe(256));
  /// assert!(u16::fits_universe(256));
  /// ```
  #[must_use]
  fn fits_universe(universe: usize) -> bool {
    universe <= Self::MAX
  }
}

macro_rules! impl_sparse_index {
  ($($ty:ty => $width:ident),* $(,)?) => {
    $(
      impl SparseIndex for $ty {
        // On 16-bit and 32-bit targets the wider types saturate at `usize::MAX`.
        const MAX: usize = if (<$ty>::MAX as u128) > (usize::MAX as u128) {
          usize::MAX
        } else {
          <$ty>::MAX as usize
        };
        const ZERO: Self = 0;
        const WIDTH: IndexWidth = IndexWidth::$width;

        #[inline]
        fn from_usize(value: usize) -> Self {
          debug_assert!(value <= <Self as SparseIndex>::MAX);
          value as $ty
        }

        #[inline]
        fn to_usize(self) -> usize {
          self as usize
        }
      }
    )*
  };
}

impl_sparse_index!(u8 => U8, u16 => U16, u32 => U32, u64 => U64);

#[cfg(target_pointer_width = "16")]
impl_sparse_index!(usize => U16);
#[cfg(target_pointer_width = "32")]
impl_sparse_index!(usize => U32);
#[cfg(target_pointer_width = "64")]
impl_sparse_index!(usize => U64);

/// The width of an unsigned integer used to address a universe.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum IndexWidth {
  /// `u8`, universes of up to 255 keys.
  U8,
  /// `u16`, universes of up to 65 535 keys.
  U16,
  /// `u32`, universes of up to 4 294 967 295 keys.
  U32,
  /// `u64`, anything larger.
  U64,
}

impl IndexWidth {
  /// Selects the narrowest width whose maximum representable value is at least `universe`.
  ///
  /// The universe size itself must be representable, not just its largest key, so a universe of exactly 256 keys needs
  /// a `u16`.
  ///
  /// # Examples
  ///
  /// ```
  /// # use sparse_universe::IndexWidth;
  /// #
  /// assert_eq!(IndexWidth::for_universe(255), IndexWidth::U8);
  /// assert_eq!(IndexWidth::for_universe(256), IndexWidth::U16);
  /// assert_eq!(IndexWidth::for_universe(65_536), IndexWidth::U32);
  /// ```
  #[must_use]
  pub const fn for_universe(universe: usize) -> Self {
    if universe <= u8::MAX as usize {
      IndexWidth::U8
    } else if universe <= u16::MAX as usize {
      IndexWidth::U16
    } else if (universe as u64) <= u32::MAX as u64 {
      IndexWidth::U32
    } else {
      IndexWidth::U64
    }
  }

  /// Returns the number of bits of this width.
  #[must_use]
  pub const fn bits(self) -> u32 {
    match self {
      IndexWidth::U8 => 8,
      IndexWidth::U16 => 16,
      IndexWidth::U32 => 32,
      IndexWidth::U64 => 64,
    }
  }

  /// Returns the number of bytes of this width.
  #[must_use]
  pub const fn bytes(self) -> usize {
    (self.bits() / 8) as usize
  }

  /// Returns the largest value representable with this width, saturated to `u64`.
  #[must_use]
  pub const fn max_value(self) -> u64 {
    match self {
      IndexWidth::U8 => u8::MAX as u64,
      IndexWidth::U16 => u16::MAX as u64,
      IndexWidth::U32 => u32::MAX as u64,
      IndexWidth::U64 => u64::MAX,
    }
  }
}

impl fmt::Display for IndexWidth {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "u{}", self.bits())
  }
}
