use std::collections::HashMap;

use criterion::{black_box, criterion_group, Bencher, Criterion};
use sparse_universe::{BoundedSparseSet, FixedSparseSet};
use sparseset::SparseSet as CrateSparseSet;

use crate::{input_iter, ELEMENT_COUNT};

fn fixed(b: &mut Bencher<'_>) {
  let mut set: FixedSparseSet<u16, usize, 4096, 4096> = FixedSparseSet::new();

  for (i, v) in input_iter().take(4096) {
    set.insert(i as u16, v);
  }

  b.iter(|| black_box(set.values().sum::<usize>()));
}

fn bounded(b: &mut Bencher<'_>, stride: usize) {
  let mut set = BoundedSparseSet::new(ELEMENT_COUNT, ELEMENT_COUNT / stride);

  for (i, v) in input_iter().step_by(stride) {
    set.insert(i, v);
  }

  b.iter(|| black_box(set.values().sum::<usize>()));
}

fn hash_map(b: &mut Bencher<'_>, stride: usize) {
  let map: HashMap<_, _> = input_iter().step_by(stride).collect();

  b.iter(|| black_box(map.values().sum::<usize>()));
}

fn crate_sparse_set(b: &mut Bencher<'_>, stride: usize) {
  let mut set = CrateSparseSet::with_capacity(ELEMENT_COUNT);

  for (i, v) in input_iter().step_by(stride) {
    set.insert(i as usize, v);
  }

  b.iter(|| black_box(set.iter().map(|entry| entry.value).sum::<usize>()));
}

fn benchmark(c: &mut Criterion) {
  let mut group = c.benchmark_group("iterate dense");

  group.bench_function("FixedSparseSet", |b| fixed(b));
  group.bench_function("BoundedSparseSet", |b| bounded(b, 1));
  group.bench_function("HashMap", |b| hash_map(b, 1));
  group.bench_function("CrateSparseSet", |b| crate_sparse_set(b, 1));

  group.finish();

  let mut group = c.benchmark_group("iterate sparse");

  group.bench_function("BoundedSparseSet", |b| bounded(b, 5));
  group.bench_function("HashMap", |b| hash_map(b, 5));
  group.bench_function("CrateSparseSet", |b| crate_sparse_set(b, 5));

  group.finish();
}

criterion_group!(benches, benchmark);
