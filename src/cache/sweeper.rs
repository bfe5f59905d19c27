use std::{hash::Hash, sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::{task::JoinHandle, time::interval};

use super::TtlCache;

////////////////////////////////////////////////////////////////////////////////
// Внешние функции
////////////////////////////////////////////////////////////////////////////////

/// Запускает фоновую задачу для периодической очистки истёкших записей.
///
/// Очистка не зависит от обращений к кэшу. Возвращает `JoinHandle`, который
/// можно использовать для отмены задачи.
pub fn spawn_sweeper<K>(
    cache: Arc<Mutex<TtlCache<K>>>,
    sweep_interval: Duration,
) -> JoinHandle<()>
where
    K: Hash + Eq + Ord + Clone + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval(sweep_interval);

        loop {
            ticker.tick().await;

            let purged = cache.lock().purge();
            if purged > 0 {
                tracing::trace!(purged, "Swept expired dedup entries");
            }
        }
    })
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sweeper_purges_expired_entries() {
        tokio::time::pause();

        let cache = Arc::new(Mutex::new(TtlCache::new(Duration::from_secs(10))));
        cache.lock().insert("old");

        let handle = spawn_sweeper(cache.clone(), Duration::from_secs(1));

        // Запись ещё жива
        tokio::time::advance(Duration::from_secs(5)).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(cache.lock().len(), 1);

        // Продвигаем время за TTL - задача должна сработать
        tokio::time::advance(Duration::from_secs(6)).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(cache.lock().is_empty());

        handle.abort();
    }
}
