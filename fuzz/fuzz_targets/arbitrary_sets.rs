#![no_main]
use libfuzzer_sys::{
  arbitrary::{Arbitrary, Unstructured},
  fuzz_target,
};
use sparse_universe::{BoundedSparseSet, GrowableSparseSet};

fuzz_target!(|bytes: &[u8]| {
  let mut u = Unstructured::new(bytes);

  if let Ok(mut set) = BoundedSparseSet::<u16, u32>::arbitrary(&mut u) {
    let cloned = set.clone();
    assert!(cloned.iter().eq(set.iter()));
    set.clear();
    assert!(set.is_empty());
  }

  if let Ok(mut set) = GrowableSparseSet::<u8, u32>::arbitrary_take_rest(u) {
    let cloned = set.clone();
    assert!(cloned.iter().eq(set.iter()));
    assert!(set.capacity() <= set.universe());
    set.clear();
    assert_eq!(set.capacity(), 0);
  }
});
