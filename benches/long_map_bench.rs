use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use hashbrown::HashMap as HashbrownMap;
use long_map::{ChainedLongMap, LongMap, ProbingLongMap};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = i64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s as i64)
    })
}

// Pick 10k entries of `keys` by a second LCG.
fn sample(keys: &[i64], n: usize) -> Vec<i64> {
    let mut s = 0x9e3779b97f4a7c15u64;
    (0..n)
        .map(|_| {
            s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
            keys[(s as usize) % keys.len()]
        })
        .collect()
}

fn filled<M: LongMap<u64> + Default>(seed: u64, n: usize) -> (M, Vec<i64>) {
    let mut m = M::default();
    let keys: Vec<i64> = lcg(seed).take(n).collect();
    for (i, &k) in keys.iter().enumerate() {
        m.put(k, i as u64);
    }
    (m, keys)
}

fn bench_insert_fresh_100k(c: &mut Criterion) {
    c.bench_function("chained::insert_fresh_100k", |b| {
        b.iter_batched(
            ChainedLongMap::<u64>::new,
            |mut m| {
                for (i, k) in lcg(1).take(100_000).enumerate() {
                    m.put(k, i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
    c.bench_function("probing::insert_fresh_100k", |b| {
        b.iter_batched(
            ProbingLongMap::<u64>::new,
            |mut m| {
                for (i, k) in lcg(1).take(100_000).enumerate() {
                    m.put(k, i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
    c.bench_function("hashbrown::insert_fresh_100k", |b| {
        b.iter_batched(
            HashbrownMap::<i64, u64>::new,
            |mut m| {
                for (i, k) in lcg(1).take(100_000).enumerate() {
                    m.insert(k, i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

// Sequential ids are the common case for integer keys and the best case for
// modulo addressing.
fn bench_insert_sequential_100k(c: &mut Criterion) {
    c.bench_function("chained::insert_sequential_100k", |b| {
        b.iter_batched(
            ChainedLongMap::<u64>::new,
            |mut m| {
                for k in 0..100_000i64 {
                    m.put(k, k as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
    c.bench_function("probing::insert_sequential_100k", |b| {
        b.iter_batched(
            ProbingLongMap::<u64>::new,
            |mut m| {
                for k in 0..100_000i64 {
                    m.put(k, k as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit_10k(c: &mut Criterion) {
    let (chained, keys) = filled::<ChainedLongMap<u64>>(7, 100_000);
    let (probing, _) = filled::<ProbingLongMap<u64>>(7, 100_000);
    let reference: HashbrownMap<i64, u64> = keys.iter().enumerate().map(|(i, &k)| (k, i as u64)).collect();
    let queries = sample(&keys, 10_000);

    c.bench_function("chained::get_hit_10k_on_100k", |b| {
        b.iter(|| {
            for &k in &queries {
                black_box(chained.get(k));
            }
        })
    });
    c.bench_function("probing::get_hit_10k_on_100k", |b| {
        b.iter(|| {
            for &k in &queries {
                black_box(probing.get(k));
            }
        })
    });
    c.bench_function("hashbrown::get_hit_10k_on_100k", |b| {
        b.iter(|| {
            for k in &queries {
                black_box(reference.get(k));
            }
        })
    });
}

fn bench_get_miss_10k(c: &mut Criterion) {
    let (chained, _) = filled::<ChainedLongMap<u64>>(11, 100_000);
    let (probing, _) = filled::<ProbingLongMap<u64>>(11, 100_000);
    let misses: Vec<i64> = lcg(0xdead_beef).take(10_000).collect();

    c.bench_function("chained::get_miss_10k_on_100k", |b| {
        b.iter(|| {
            for &k in &misses {
                black_box(chained.get(k));
            }
        })
    });
    c.bench_function("probing::get_miss_10k_on_100k", |b| {
        b.iter(|| {
            for &k in &misses {
                black_box(probing.get(k));
            }
        })
    });
}

fn bench_remove_random_10k(c: &mut Criterion) {
    c.bench_function("chained::remove_random_10k_of_110k", |b| {
        b.iter_batched(
            || {
                let (m, keys) = filled::<ChainedLongMap<u64>>(5, 110_000);
                (m, sample(&keys, 10_000))
            },
            |(mut m, to_remove)| {
                for k in to_remove {
                    black_box(m.remove(k));
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
    c.bench_function("probing::remove_random_10k_of_110k", |b| {
        b.iter_batched(
            || {
                let (m, keys) = filled::<ProbingLongMap<u64>>(5, 110_000);
                (m, sample(&keys, 10_000))
            },
            |(mut m, to_remove)| {
                for k in to_remove {
                    black_box(m.remove(k));
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_scan_100k(c: &mut Criterion) {
    let (chained, _) = filled::<ChainedLongMap<u64>>(999, 100_000);
    let (probing, _) = filled::<ProbingLongMap<u64>>(999, 100_000);

    c.bench_function("chained::iter_all_100k", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for (_k, v) in chained.iter() {
                sum = sum.wrapping_add(*v);
            }
            black_box(sum)
        })
    });
    c.bench_function("probing::iter_all_100k", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for (_k, v) in probing.iter() {
                sum = sum.wrapping_add(*v);
            }
            black_box(sum)
        })
    });
    c.bench_function("chained::contains_value_miss_100k", |b| {
        b.iter(|| black_box(chained.contains_value(&u64::MAX)))
    });
    c.bench_function("probing::contains_value_miss_100k", |b| {
        b.iter(|| black_box(probing.contains_value(&u64::MAX)))
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_insert;
    config = bench_config();
    targets = bench_insert_fresh_100k, bench_insert_sequential_100k
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_get_hit_10k,
              bench_get_miss_10k,
              bench_remove_random_10k,
              bench_scan_100k
}
criterion_main!(benches_insert, benches_ops);
