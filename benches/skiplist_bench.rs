//! Insert, lookup, and iteration throughput.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use strata::skiplist::SkipList;

const N: u64 = 10_000;

fn shuffled(n: u64) -> Vec<u64> {
    let mut values: Vec<u64> = (0..n).collect();
    values.shuffle(&mut StdRng::seed_from_u64(17));
    values
}

fn bench_insert(c: &mut Criterion) {
    let values = shuffled(N);

    c.bench_function("insert_shuffled_10k", |b| {
        b.iter(|| {
            let mut list = SkipList::new();
            for &v in &values {
                list.insert(black_box(v));
            }
            list
        })
    });

    c.bench_function("insert_ascending_10k", |b| {
        b.iter(|| {
            let mut list = SkipList::new();
            for v in 0..N {
                list.insert(black_box(v));
            }
            list
        })
    });
}

fn bench_lookup(c: &mut Criterion) {
    let values = shuffled(N);
    let list: SkipList<u64> = values.iter().copied().collect();

    c.bench_function("find_hit_10k", |b| {
        b.iter(|| {
            let mut hits = 0;
            for &v in &values {
                if list.contains(black_box(&v)) {
                    hits += 1;
                }
            }
            hits
        })
    });

    c.bench_function("find_miss_10k", |b| {
        b.iter(|| {
            let mut hits = 0;
            for &v in &values {
                if list.contains(black_box(&(v + N))) {
                    hits += 1;
                }
            }
            hits
        })
    });

    c.bench_function("upper_bound_10k", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for &v in &values {
                if let Some(&next) = list.upper_bound(black_box(&v)).value() {
                    sum = sum.wrapping_add(next);
                }
            }
            sum
        })
    });
}

fn bench_iterate(c: &mut Criterion) {
    let list: SkipList<u64> = shuffled(N).into_iter().collect();

    c.bench_function("iterate_10k", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for &v in &list {
                sum = sum.wrapping_add(v);
            }
            sum
        })
    });
}

criterion_group!(benches, bench_insert, bench_lookup, bench_iterate);
criterion_main!(benches);
