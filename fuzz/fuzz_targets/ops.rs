#![no_main]
use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sparse_universe::{GrowPolicy, GrowableSparseSet};

#[derive(Arbitrary, Debug)]
enum Op {
  Insert(u8, u32),
  Remove(u8),
  Get(u8),
  Clear,
  ShrinkToFit,
  ResizeUniverse(u8),
  ResizeDense(u8),
}

#[derive(Arbitrary, Debug)]
struct Input {
  universe: u8,
  grow_amount: u8,
  shrink_threshold: u8,
  ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
  let policy = GrowPolicy::new()
    .with_grow_amount(usize::from(input.grow_amount.max(1)))
    .with_shrink_threshold(usize::from(input.shrink_threshold));
  let mut set: GrowableSparseSet<u8, u32> = GrowableSparseSet::with_policy(usize::from(input.universe), policy);
  let mut model = BTreeMap::new();

  for op in input.ops {
    match op {
      Op::Insert(key, value) => {
        if usize::from(key) < set.universe() {
          assert_eq!(set.insert(key, value), !model.contains_key(&key));
          model.entry(key).or_insert(value);
        }
      }
      Op::Remove(key) => assert_eq!(set.remove(key), model.remove(&key)),
      Op::Get(key) => assert_eq!(set.get(key), model.get(&key)),
      Op::Clear => {
        set.clear();
        model.clear();
      }
      Op::ShrinkToFit => {
        set.shrink_to_fit();
        assert_eq!(set.capacity(), set.len());
      }
      Op::ResizeUniverse(universe) => {
        set.resize_universe(usize::from(universe)).unwrap();
        model.retain(|key, _| *key < universe);
      }
      Op::ResizeDense(capacity) => {
        let capacity = usize::from(capacity);
        let valid = set.len() <= capacity && capacity <= set.universe();
        assert_eq!(set.resize_dense(capacity).is_ok(), valid);
      }
    }

    assert_eq!(set.len(), model.len());
    assert!(set.capacity() <= set.universe());
    assert!(model.iter().all(|(key, value)| set.get(*key) == Some(value)));
  }
});
