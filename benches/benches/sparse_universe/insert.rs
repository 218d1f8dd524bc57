use std::collections::HashMap;

use criterion::{criterion_group, Bencher, Criterion};
use sparse_universe::{BoundedSparseSet, GrowPolicy, GrowableSparseSet};
use sparseset::SparseSet as CrateSparseSet;

use crate::{input_iter, ELEMENT_COUNT};

fn bounded(b: &mut Bencher<'_>) {
  b.iter(|| {
    let mut set = BoundedSparseSet::with_universe(ELEMENT_COUNT);

    for (i, v) in input_iter() {
      set.insert(i, v);
    }
  });
}

fn growable(b: &mut Bencher<'_>, policy: GrowPolicy) {
  b.iter(|| {
    let mut set = GrowableSparseSet::with_policy(ELEMENT_COUNT, policy);

    for (i, v) in input_iter() {
      set.insert(i, v);
    }
  });
}

fn hash_map(b: &mut Bencher<'_>) {
  b.iter(|| {
    let mut map = HashMap::with_capacity(ELEMENT_COUNT);

    for (i, v) in input_iter() {
      map.insert(i, v);
    }
  });
}

fn crate_sparse_set(b: &mut Bencher<'_>) {
  b.iter(|| {
    let mut set = CrateSparseSet::with_capacity(ELEMENT_COUNT);

    for (i, v) in input_iter() {
      set.insert(i as usize, v);
    }
  });
}

fn benchmark(c: &mut Criterion) {
  let mut group = c.benchmark_group("insert");

  group.bench_function("BoundedSparseSet", |b| bounded(b));
  group.bench_function("GrowableSparseSet default policy", |b| growable(b, GrowPolicy::default()));
  group.bench_function("GrowableSparseSet grow by 4096", |b| {
    growable(b, GrowPolicy::new().with_grow_amount(4096))
  });
  group.bench_function("HashMap", |b| hash_map(b));
  group.bench_function("CrateSparseSet", |b| crate_sparse_set(b));

  group.finish();
}

criterion_group!(benches, benchmark);
