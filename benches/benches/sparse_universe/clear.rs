use std::collections::HashMap;

use criterion::{criterion_group, BatchSize, Bencher, Criterion};
use sparse_universe::{BoundedSparseSet, FixedSparseSet, GrowableSparseSet};

use crate::{input_iter, ELEMENT_COUNT};

fn fixed(b: &mut Bencher<'_>) {
  let mut set: FixedSparseSet<u16, usize, 4096, 4096> = FixedSparseSet::new();

  b.iter(|| {
    for (i, v) in input_iter().take(4096) {
      set.insert(i as u16, v);
    }

    set.clear();
  });
}

fn bounded(b: &mut Bencher<'_>) {
  let mut set = BoundedSparseSet::with_universe(ELEMENT_COUNT);

  for (i, v) in input_iter() {
    set.insert(i, v);
  }

  b.iter_batched_ref(|| set.clone(), |set| set.clear(), BatchSize::LargeInput);
}

fn growable(b: &mut Bencher<'_>) {
  let mut set = GrowableSparseSet::new(ELEMENT_COUNT);
  set.extend(input_iter());

  b.iter_batched_ref(|| set.clone(), |set| set.clear(), BatchSize::LargeInput);
}

fn hash_map(b: &mut Bencher<'_>) {
  let map: HashMap<_, _> = input_iter().collect();

  b.iter_batched_ref(|| map.clone(), |map| map.clear(), BatchSize::LargeInput);
}

fn benchmark(c: &mut Criterion) {
  let mut group = c.benchmark_group("clear");

  group.bench_function("FixedSparseSet", |b| fixed(b));
  group.bench_function("BoundedSparseSet", |b| bounded(b));
  group.bench_function("GrowableSparseSet", |b| growable(b));
  group.bench_function("HashMap", |b| hash_map(b));

  group.finish();
}

criterion_group!(benches, benchmark);
