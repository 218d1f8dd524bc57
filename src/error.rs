//! Errors reported when configuring or administratively resizing a sparse set.
//!
//! Ordinary outcomes such as inserting a key that is already present or removing a key that is absent are not errors;
//! those operations report them through their return values.

use std::alloc::Layout;

use thiserror::Error;

use crate::index::IndexWidth;

/// Result type alias for fallible sparse set operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for constructing and resizing sparse sets.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
  /// The index type cannot represent every position of the requested universe.
  #[error("a universe of {universe} keys needs at least a {required} index, but the index type is {actual}")]
  IndexTooNarrow {
    universe: usize,
    required: IndexWidth,
    actual: IndexWidth,
  },

  /// The dense capacity is larger than the universe it indexes.
  #[error("capacity {capacity} exceeds the universe size {universe}")]
  CapacityExceedsUniverse { capacity: usize, universe: usize },

  /// A growth policy must add at least one slot per growth step.
  #[error("grow amount must be at least one")]
  ZeroGrowAmount,

  /// The requested dense length is either smaller than the number of held elements or larger than the universe.
  #[error("dense length {requested} is outside of {len}..={universe}")]
  DenseLengthOutOfRange {
    requested: usize,
    len: usize,
    universe: usize,
  },

  /// The computed allocation size overflowed or exceeded `isize::MAX` bytes.
  #[error("capacity overflow")]
  CapacityOverflow,

  /// The allocator failed to provide memory for the given layout.
  #[error("memory allocation of {} bytes failed", .layout.size())]
  Alloc { layout: Layout },
}

/// Returns an error if `I` cannot address a universe of `universe` keys.
pub(crate) fn check_index<I: crate::SparseIndex>(universe: usize) -> Result<()> {
  if I::fits_universe(universe) {
    Ok(())
  } else {
    Err(Error::IndexTooNarrow {
      universe,
      required: IndexWidth::for_universe(universe),
      actual: I::WIDTH,
    })
  }
}

/// Returns an error if `capacity` is larger than `universe`.
pub(crate) fn check_capacity(capacity: usize, universe: usize) -> Result<()> {
  if capacity > universe {
    Err(Error::CapacityExceedsUniverse { capacity, universe })
  } else {
    Ok(())
  }
}

/// One central function responsible for reporting configuration errors from panicking constructors. This keeps the code
/// generated for these panics in a single location.
#[track_caller]
pub(crate) fn handle_error<T>(result: Result<T>) -> T {
  match result {
    Ok(value) => value,
    Err(Error::Alloc { layout }) => std::alloc::handle_alloc_error(layout),
    Err(error) => panic!("{}", error),
  }
}

#[cfg(test)]
mod test {
  use coverage_helper::test;

  use super::*;

  #[test]
  fn test_check_index() {
    assert!(check_index::<u8>(255).is_ok());
    assert_eq!(
      check_index::<u8>(256),
      Err(Error::IndexTooNarrow {
        universe: 256,
        required: IndexWidth::U16,
        actual: IndexWidth::U8,
      })
    );
  }

  #[test]
  fn test_check_capacity() {
    assert!(check_capacity(64, 128).is_ok());
    assert!(check_capacity(128, 128).is_ok());
    assert_eq!(
      check_capacity(129, 128),
      Err(Error::CapacityExceedsUniverse {
        capacity: 129,
        universe: 128
      })
    );
  }

  #[test]
  fn test_display() {
    let error = Error::IndexTooNarrow {
      universe: 256,
      required: IndexWidth::U16,
      actual: IndexWidth::U8,
    };
    assert_eq!(
      error.to_string(),
      "a universe of 256 keys needs at least a u16 index, but the index type is u8"
    );
    assert_eq!(Error::ZeroGrowAmount.to_string(), "grow amount must be at least one");
  }

  #[should_panic(expected = "capacity 3 exceeds the universe size 2")]
  #[test]
  fn test_handle_error_panics() {
    handle_error(check_capacity(3, 2));
  }
}
