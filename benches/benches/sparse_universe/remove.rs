use std::collections::HashMap;

use criterion::{criterion_group, BatchSize, Bencher, Criterion};
use sparse_universe::{BoundedSparseSet, GrowableSparseSet};
use sparseset::SparseSet as CrateSparseSet;

use crate::{input_iter, ELEMENT_COUNT};

const REMOVE_COUNT: u32 = 20000;

fn bounded(b: &mut Bencher<'_>) {
  let mut set = BoundedSparseSet::with_universe(ELEMENT_COUNT);

  for (i, v) in input_iter() {
    set.insert(i, v);
  }

  b.iter_batched_ref(
    || set.clone(),
    |set| {
      for i in 0..REMOVE_COUNT {
        set.remove(i * 5);
      }
    },
    BatchSize::LargeInput,
  );
}

fn growable(b: &mut Bencher<'_>) {
  let mut set = GrowableSparseSet::new(ELEMENT_COUNT);
  set.extend(input_iter());

  b.iter_batched_ref(
    || set.clone(),
    |set| {
      for i in 0..REMOVE_COUNT {
        set.remove(i * 5);
      }
    },
    BatchSize::LargeInput,
  );
}

fn hash_map(b: &mut Bencher<'_>) {
  let map: HashMap<_, _> = input_iter().collect();

  b.iter_batched_ref(
    || map.clone(),
    |map| {
      for i in 0..REMOVE_COUNT {
        map.remove(&(i * 5));
      }
    },
    BatchSize::LargeInput,
  );
}

fn crate_sparse_set(b: &mut Bencher<'_>) {
  let mut set = CrateSparseSet::with_capacity(ELEMENT_COUNT);

  for (i, v) in input_iter() {
    set.insert(i as usize, v);
  }

  b.iter(|| {
    for i in 0..REMOVE_COUNT as usize {
      set.remove(i * 5);
    }
  });
}

fn benchmark(c: &mut Criterion) {
  let mut group = c.benchmark_group("remove");

  group.bench_function("BoundedSparseSet", |b| bounded(b));
  group.bench_function("GrowableSparseSet", |b| growable(b));
  group.bench_function("HashMap", |b| hash_map(b));
  group.bench_function("CrateSparseSet", |b| crate_sparse_set(b));

  group.finish();
}

criterion_group!(benches, benchmark);
