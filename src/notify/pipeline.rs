use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tracing::{debug, info};

use super::{route, DedupKey, Dispatcher, Notifier};
use crate::{
    aprs::Message,
    cache::{spawn_sweeper, TtlCache},
    pubsub::Subscription,
};

/// Подписчик брокера, превращающий пакеты в уведомления.
pub struct NotificationPipeline {
    notifiers: Vec<Notifier>,
    dispatcher: Dispatcher,
    cache: Arc<Mutex<TtlCache<DedupKey>>>,
    sweep_interval: Duration,
}

impl NotificationPipeline {
    /// `notifiers` должны идти в том же порядке, в каком они переданы в
    /// `dispatcher`.
    pub fn new(
        notifiers: Vec<Notifier>,
        dispatcher: Dispatcher,
        dedup_ttl: Duration,
        sweep_interval: Duration,
    ) -> Self {
        Self {
            notifiers,
            dispatcher,
            cache: Arc::new(Mutex::new(TtlCache::new(dedup_ttl))),
            sweep_interval,
        }
    }

    /// Количество уведомлений, поставленных в очередь для пакета.
    ///
    /// Повтор в пределах TTL отбрасывается целиком и возвращает 0.
    pub fn process(
        &self,
        message: &Message,
    ) -> usize {
        let key = DedupKey::of(message);
        if !self.cache.lock().check_and_insert(key) {
            debug!(packet = %message, "Duplicate packet dropped");
            return 0;
        }

        let mut queued = 0;
        for (index, notifier) in self.notifiers.iter().enumerate() {
            let Some(notification) = route(message, notifier) else {
                continue;
            };
            if self.dispatcher.dispatch(index, notification).is_ok() {
                queued += 1;
            }
        }
        queued
    }

    /// Обрабатывает пакеты подписки, пока брокер не закроет её.
    pub async fn run(
        self,
        mut subscription: Subscription,
    ) {
        info!(
            notifiers = self.notifiers.len(),
            subscriber = %subscription.id(),
            "Notification pipeline started"
        );
        let sweeper = spawn_sweeper(self.cache.clone(), self.sweep_interval);

        while let Some(message) = subscription.recv().await {
            self.process(&message);
        }

        sweeper.abort();
        info!("Notification pipeline stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{Deliver, DeliveryMethod, DispatchConfig, LogDelivery};

    fn pipeline(ttl: Duration) -> NotificationPipeline {
        let notifier = Notifier {
            call: "KG6HWF".into(),
            method: DeliveryMethod::Log,
        };
        let dispatcher = Dispatcher::new(
            vec![(notifier.clone(), Arc::new(LogDelivery::new("KG6HWF")) as Arc<dyn Deliver>)],
            DispatchConfig::default(),
        );
        NotificationPipeline::new(vec![notifier], dispatcher, ttl, Duration::from_secs(1))
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_within_ttl_is_dropped() {
        let p = pipeline(Duration::from_secs(10));
        let m: Message = "N0CALL>APRS::KG6HWF   :hello{1".parse().unwrap();

        assert_eq!(p.process(&m), 1);
        assert_eq!(p.process(&m), 0);

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(p.process(&m), 1);
    }

    #[tokio::test]
    async fn test_unrelated_packet_is_cached_but_not_routed() {
        let p = pipeline(Duration::from_secs(10));
        let m: Message = "N0CALL>APRS:>status".parse().unwrap();

        assert_eq!(p.process(&m), 0);
        assert_eq!(p.cache.lock().len(), 1);
    }
}
