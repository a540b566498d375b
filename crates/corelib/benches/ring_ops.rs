//! `hash`/`distance`/`between` sit on the hot path of every lookup and
//! replicated operation, so they are the one thing in this crate worth a
//! dedicated benchmark.

use corelib::hash::hash;
use corelib::ring::{Keyspace, RingId};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_distance_and_between(c: &mut Criterion) {
    let ks = Keyspace::new(32);
    let a = RingId(123_456);
    let b = RingId(987_654_321 % (1u64 << 32));
    let d = RingId(42);

    c.bench_function("ring_distance", |bencher| {
        bencher.iter(|| black_box(ks.distance(black_box(a), black_box(b))));
    });

    c.bench_function("ring_between", |bencher| {
        bencher.iter(|| black_box(ks.between(black_box(a), black_box(d), black_box(b))));
    });
}

fn bench_hash(c: &mut Criterion) {
    let ks = Keyspace::new(32);
    c.bench_function("hash_path_salt_0", |bencher| {
        bencher.iter(|| black_box(hash(&ks, black_box("/some/reasonably/long/path"), black_box(0))));
    });
}

criterion_group!(benches, bench_distance_and_between, bench_hash);
criterion_main!(benches);
