#![allow(missing_docs)]
#![allow(unused_results)]

use criterion::criterion_main;

mod clear;
mod insert;
mod iter;
mod remove;

/// Large enough that the sparse array does not fit in the L1 cache.
const ELEMENT_COUNT: usize = 100000;

fn input_iter() -> impl Iterator<Item = (u32, usize)> {
  (0..ELEMENT_COUNT as u32).zip(0..)
}

criterion_main!(insert::benches, iter::benches, remove::benches, clear::benches);
