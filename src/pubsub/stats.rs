use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Счётчики брокера. Обновляются только задачей раздачи.
#[derive(Debug, Default)]
pub struct BroadcastStats {
    /// Кол-во пакетов, принятых из входного канала
    published: AtomicU64,
    /// Кол-во успешных доставок (по одной на подписчика)
    delivered: AtomicU64,
    /// Кол-во подписчиков, удалённых из-за закрытого канала
    pruned: AtomicU64,
    /// Текущий размер набора подписчиков
    subscribers: AtomicUsize,
}

/// Снимок счётчиков для логов и тестов.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastSnapshot {
    pub published: u64,
    pub delivered: u64,
    pub pruned: u64,
    pub subscribers: usize,
}

impl BroadcastStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(
        &self,
        count: u64,
    ) {
        self.delivered.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_pruned(
        &self,
        count: u64,
    ) {
        self.pruned.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn set_subscribers(
        &self,
        count: usize,
    ) {
        self.subscribers.store(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> BroadcastSnapshot {
        BroadcastSnapshot {
            published: self.published.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            pruned: self.pruned.load(Ordering::Relaxed),
            subscribers: self.subscribers.load(Ordering::Relaxed),
        }
    }
}
