//! `Arbitrary` implementations for the types in this crate.

use arbitrary::{Arbitrary, Unstructured};

use crate::{BoundedSparseSet, FixedSparseSet, GrowPolicy, GrowableSparseSet, SparseIndex};

/// Universes are kept small so that fuzzers spend their input on operations rather than on allocation.
const MAX_UNIVERSE: usize = 1024;

fn arbitrary_universe<I: SparseIndex>(u: &mut Unstructured<'_>) -> arbitrary::Result<usize> {
  u.int_in_range(0..=I::MAX.min(MAX_UNIVERSE))
}

/// Inserts arbitrary values at arbitrary keys of the universe until `insert` reports the set is full or the input runs
/// out of elements.
fn fill<'a, I: SparseIndex, V: Arbitrary<'a>>(
  u: &mut Unstructured<'a>,
  universe: usize,
  mut insert: impl FnMut(I, V) -> bool,
) -> arbitrary::Result<()> {
  if universe == 0 {
    return Ok(());
  }

  // Get the number of `V`s we should insert into our collection.
  let len = u.arbitrary_len::<V>()?;

  for _ in 0..len {
    let key = I::from_usize(u.int_in_range(0..=(universe - 1))?);
    let value = V::arbitrary(u)?;
    insert(key, value);
  }

  Ok(())
}

impl<'a, I: SparseIndex, V: Arbitrary<'a>, const UNIVERSE: usize, const CAPACITY: usize> Arbitrary<'a>
  for FixedSparseSet<I, V, UNIVERSE, CAPACITY>
{
  fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
    let mut set = Self::new();
    fill(u, UNIVERSE, |key, value| set.insert(key, value))?;
    Ok(set)
  }
}

impl<'a, I: SparseIndex, V: Arbitrary<'a>> Arbitrary<'a> for BoundedSparseSet<I, V> {
  fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
    let universe = arbitrary_universe::<I>(u)?;
    let capacity = u.int_in_range(0..=universe)?;
    let mut set = Self::try_new(universe, capacity).map_err(|_| arbitrary::Error::IncorrectFormat)?;
    fill(u, universe, |key, value| set.insert(key, value))?;
    Ok(set)
  }
}

impl<'a> Arbitrary<'a> for GrowPolicy {
  fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
    Ok(
      GrowPolicy::new()
        .with_grow_amount(u.int_in_range(1..=64)?)
        .with_shrink_threshold(u.int_in_range(0..=64)?),
    )
  }
}

impl<'a, I: SparseIndex, V: Arbitrary<'a>> Arbitrary<'a> for GrowableSparseSet<I, V> {
  fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
    let universe = arbitrary_universe::<I>(u)?;
    let policy = GrowPolicy::arbitrary(u)?;
    let mut set = Self::try_new_in(universe, policy, crate::Global).map_err(|_| arbitrary::Error::IncorrectFormat)?;
    fill(u, universe, |key, value| set.insert(key, value))?;
    Ok(set)
  }
}
