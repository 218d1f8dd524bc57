//! A crate that implements the sparse set data structure over a fixed universe of integer keys.
//!
//! A sparse set maps keys in `0..universe` to values with *O*(*1*) insertion, removal, lookup, and clearing, while
//! keeping the present elements packed in a dense array for fast iteration. See
//! [this article](https://research.swtch.com/sparse) on more details behind the data structure.
//!
//! Three variants share the same algorithm and differ in where their storage lives:
//!
//! - [`FixedSparseSet`]: universe and capacity are const generics, the storage is inline and never allocates.
//! - [`BoundedSparseSet`]: universe and capacity are chosen at runtime, the storage is allocated once.
//! - [`GrowableSparseSet`]: the universe is chosen at runtime and the dense array is grown and shrunk through an
//!   [`Allocator`] according to a [`GrowPolicy`].
//!
//! Using `()` as the value type turns any of them into a plain set of keys that stores nothing but the keys.
//!
//! # Examples
//!
//! ```
//! use sparse_universe::BoundedSparseSet;
//!
//! let mut set: BoundedSparseSet<u8, String> = BoundedSparseSet::new(128, 64);
//!
//! set.insert(12, "Twelve".to_owned());
//! set.insert(7, "Seven".to_owned());
//! set.insert(49, "Forty-nine".to_owned());
//!
//! for value in set.values_mut() {
//!   value.push_str("!!");
//! }
//!
//! assert_eq!(set.remove(12).as_deref(), Some("Twelve!!"));
//! assert_eq!(format!("{:?}", set), r#"{49: "Forty-nine!!", 7: "Seven!!"}"#);
//!
//! set.clear();
//! assert!(set.is_empty());
//! ```

#![cfg_attr(coverage_nightly, feature(no_coverage))]
#![deny(unsafe_code)]
#![warn(unsafe_op_in_unsafe_fn)]

#[cfg(feature = "arbitrary")]
pub mod arbitrary;

pub mod alloc;
pub mod bounded;
pub mod element;
pub mod error;
pub mod fixed;
pub mod growable;
pub mod index;
pub mod iter;

mod macros;
mod raw;

pub use crate::{
  alloc::{AllocError, Allocator, Global},
  bounded::BoundedSparseSet,
  element::Element,
  error::{Error, Result},
  fixed::FixedSparseSet,
  growable::{GrowPolicy, GrowableSparseSet},
  index::{IndexWidth, SparseIndex},
  iter::{Iter, IterMut, Keys, Values, ValuesMut},
};
