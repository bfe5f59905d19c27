use std::time::Duration;

use aprsgate::{Broadcaster, Message};
use tokio::{sync::mpsc, time::timeout};

fn packet(i: usize) -> Message {
    format!("N0CALL>APRS,WIDE1-1:>packet {i}").parse().unwrap()
}

/// Тест проверяет, что K подписчиков, зарегистрированных до начала
/// раздачи, получают все N пакетов в одном и том же порядке.
#[tokio::test]
async fn test_all_subscribers_receive_same_order() {
    const N: usize = 200;
    const K: usize = 5;

    let (tx, rx) = mpsc::channel(16);
    let (broadcaster, handle) = Broadcaster::spawn(rx);

    let mut readers = Vec::new();
    for k in 0..K {
        // Разная ёмкость, в том числе «небуферизованная»
        let mut sub = broadcaster.subscribe(1 + k * 7).await;
        readers.push(tokio::spawn(async move {
            let mut got = Vec::with_capacity(N);
            while let Some(m) = sub.recv().await {
                got.push(m.body().as_str().to_string());
            }
            got
        }));
    }

    for i in 0..N {
        tx.send(packet(i)).await.unwrap();
    }
    drop(tx);
    handle.await.unwrap();

    let expected: Vec<String> = (0..N).map(|i| format!(">packet {i}")).collect();
    for reader in readers {
        assert_eq!(reader.await.unwrap(), expected);
    }

    let stats = broadcaster.stats();
    assert_eq!(stats.published, N as u64);
    assert_eq!(stats.delivered, (N * K) as u64);
}

/// Подписчик, снятый после пакета i, не получает ничего начиная с i+1,
/// а остальные подписчики продолжают получать всё.
#[tokio::test]
async fn test_unregister_between_packets() {
    let (tx, rx) = mpsc::channel(1);
    let (broadcaster, _handle) = Broadcaster::spawn(rx);

    let mut leaving = broadcaster.subscribe(1).await;
    let mut staying = broadcaster.subscribe(10).await;

    tx.send(packet(0)).await.unwrap();
    assert_eq!(leaving.recv().await.unwrap().body().as_str(), ">packet 0");
    leaving.unregister().await;

    for i in 1..5 {
        tx.send(packet(i)).await.unwrap();
    }
    for i in 0..5 {
        let m = timeout(Duration::from_secs(1), staying.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(m.body().as_str(), format!(">packet {i}"));
    }

    assert_eq!(broadcaster.stats().subscribers, 1);
}

/// Снятие подписки одновременно с раздачей не приводит к панике или
/// взаимной блокировке, даже если подписчик не читает свой канал.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_unregister_while_broadcasting() {
    let (tx, rx) = mpsc::channel(1);
    let (broadcaster, handle) = Broadcaster::spawn(rx);

    let mut subs = Vec::new();
    for _ in 0..8 {
        subs.push(broadcaster.subscribe(1).await);
    }
    let mut reader = broadcaster.subscribe(1000).await;

    let producer = tokio::spawn(async move {
        for i in 0..500 {
            if tx.send(packet(i)).await.is_err() {
                break;
            }
        }
    });

    // Не читающие подписчики уходят, пока раздача ждёт места в их буферах
    let leavers: Vec<_> = subs
        .into_iter()
        .map(|s| tokio::spawn(s.unregister()))
        .collect();
    for l in leavers {
        timeout(Duration::from_secs(5), l).await.unwrap().unwrap();
    }

    let mut count = 0;
    while count < 500 {
        timeout(Duration::from_secs(5), reader.recv())
            .await
            .unwrap()
            .unwrap();
        count += 1;
    }

    producer.await.unwrap();
    assert_eq!(broadcaster.stats().subscribers, 1);
    drop(reader);
    handle.await.unwrap();
}

/// Подписка, отброшенная без явного снятия, удаляется из набора.
#[tokio::test]
async fn test_dropped_subscription_is_removed() {
    let (tx, rx) = mpsc::channel(1);
    let (broadcaster, _handle) = Broadcaster::spawn(rx);

    let dropped = broadcaster.subscribe(1).await;
    let mut kept = broadcaster.subscribe(1).await;
    drop(dropped);

    tx.send(packet(1)).await.unwrap();
    assert!(kept.recv().await.is_some());
    assert_eq!(broadcaster.stats().subscribers, 1);
}

/// Снятие по идентификатору завершается, даже когда раздача ждёт места в
/// полном канале этого подписчика, а его приёмник никто не читает.
#[tokio::test]
async fn test_unregister_by_id_while_fan_out_blocked() {
    let (tx, rx) = mpsc::channel(4);
    let (broadcaster, _handle) = Broadcaster::spawn(rx);

    let mut staying = broadcaster.subscribe(8).await;
    let (stuck_tx, mut stuck_rx) = mpsc::channel(1);
    let id = broadcaster.register(stuck_tx).await;

    // Первый пакет заполняет буфер, на втором раздача останавливается
    tx.send(packet(0)).await.unwrap();
    tx.send(packet(1)).await.unwrap();
    for i in 0..2 {
        let m = timeout(Duration::from_secs(1), staying.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(m.body().as_str(), format!(">packet {i}"));
    }

    let removed = timeout(Duration::from_secs(2), broadcaster.unregister(id))
        .await
        .expect("unregister must not wait for the blocked delivery");
    assert!(removed);

    tx.send(packet(2)).await.unwrap();
    let m = timeout(Duration::from_secs(1), staying.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(m.body().as_str(), ">packet 2");

    // Снятый подписчик получил только пакет, уже лежавший в буфере
    let first = timeout(Duration::from_secs(1), stuck_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.body().as_str(), ">packet 0");
    assert!(timeout(Duration::from_secs(1), stuck_rx.recv())
        .await
        .unwrap()
        .is_none());

    let stats = broadcaster.stats();
    assert_eq!(stats.subscribers, 1);
    assert_eq!(stats.published, 3);
}
