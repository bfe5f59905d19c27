use std::{hint::black_box, time::Duration};

use aprsgate::{notify::DedupKey, Message, TtlCache};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

fn packets(n: usize) -> Vec<Message> {
    (0..n)
        .map(|i| {
            format!("N{i}CALL>APRS,WIDE1-1:>status {i}")
                .parse()
                .expect("valid packet")
        })
        .collect()
}

/// Проверка с вставкой: половина ключей повторяется.
fn bench_check_and_insert(c: &mut Criterion) {
    let keys: Vec<DedupKey> = packets(1000).iter().map(DedupKey::of).collect();

    c.bench_function("ttl_check_and_insert_1000", |b| {
        b.iter_batched(
            || TtlCache::new(Duration::from_secs(10)),
            |mut cache| {
                for key in keys.iter().chain(keys.iter().take(500)) {
                    black_box(cache.check_and_insert(key.clone()));
                }
                cache
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_purge(c: &mut Criterion) {
    let mut group = c.benchmark_group("ttl_purge");
    for size in [100usize, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let mut cache = TtlCache::new(Duration::ZERO);
                    for i in 0..size {
                        cache.insert(i);
                    }
                    cache
                },
                |mut cache| black_box(cache.purge()),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_dedup_key(c: &mut Criterion) {
    let packet = packets(1).remove(0);
    c.bench_function("dedup_key_of", |b| b.iter(|| DedupKey::of(black_box(&packet))));
}

criterion_group!(benches, bench_check_and_insert, bench_purge, bench_dedup_key);
criterion_main!(benches);
