use std::hint::black_box;

use aprsgate::{Broadcaster, Message};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tokio::{runtime::Runtime, sync::mpsc};

const PACKET: &str = "N0CALL-9>APRS,WIDE1-1,WIDE2-1:!3745.00N/12225.00W>mobile";

/// Пакет проходит через брокер к `subscribers` читающим подписчикам.
fn bench_fan_out(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let packet: Message = PACKET.parse().expect("valid packet");

    let mut group = c.benchmark_group("broadcaster_fan_out");
    group.throughput(Throughput::Elements(1));

    for subscribers in [1usize, 4, 16] {
        let (tx, _broadcaster) = rt.block_on(async {
            let (tx, rx) = mpsc::channel(100);
            let (broadcaster, _handle) = Broadcaster::spawn(rx);
            for _ in 0..subscribers {
                let mut sub = broadcaster.subscribe(100).await;
                tokio::spawn(async move { while sub.recv().await.is_some() {} });
            }
            (tx, broadcaster)
        });

        group.bench_with_input(
            BenchmarkId::from_parameter(subscribers),
            &subscribers,
            |b, _| {
                b.to_async(&rt).iter(|| async {
                    tx.send(black_box(packet.clone())).await.expect("broadcaster alive");
                })
            },
        );
    }
    group.finish();
}

fn bench_subscribe_unregister(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let (_tx, broadcaster) = rt.block_on(async {
        let (tx, rx) = mpsc::channel::<Message>(1);
        let (broadcaster, _handle) = Broadcaster::spawn(rx);
        (tx, broadcaster)
    });

    c.bench_function("broadcaster_subscribe_unregister", |b| {
        b.to_async(&rt).iter(|| async {
            let sub = broadcaster.subscribe(1).await;
            black_box(sub.id());
            sub.unregister().await;
        })
    });
}

fn bench_parse_tnc2(c: &mut Criterion) {
    c.bench_function("tnc2_parse", |b| {
        b.iter(|| black_box(PACKET).parse::<Message>().expect("valid packet"))
    });
}

criterion_group!(
    benches,
    bench_fan_out,
    bench_subscribe_unregister,
    bench_parse_tnc2
);
criterion_main!(benches);
