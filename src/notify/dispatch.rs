use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, warn};

use super::{Deliver, Notification, Notifier};
use crate::DeliveryError;

/// Параметры пула доставки.
#[derive(Debug, Clone, Copy)]
pub struct DispatchConfig {
    /// Ёмкость очереди уведомлений на одного уведомителя
    pub queue_capacity: usize,
    /// Максимум одновременных доставок на одного уведомителя
    pub workers_per_target: usize,
}

/// Результат одной доставки, публикуемый в канал отчётов.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    /// Индекс уведомителя в порядке конфигурации
    pub notifier: usize,
    pub call: String,
    pub notification: Notification,
    /// `Err` содержит текст ошибки доставки
    pub outcome: Result<(), String>,
}

/// Пул доставки: очередь и ограниченный набор исполнителей на каждого
/// уведомителя.
///
/// [`Dispatcher::dispatch`] никогда не ждёт: при полной очереди уведомление
/// отбрасывается. Результаты доставок в конвейер не возвращаются; при
/// необходимости их можно наблюдать через канал отчётов.
pub struct Dispatcher {
    targets: Vec<Target>,
}

struct Target {
    call: String,
    queue: mpsc::Sender<Notification>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            workers_per_target: 4,
        }
    }
}

impl Dispatcher {
    /// Запускает исполнителей для каждого уведомителя.
    pub fn new(
        targets: Vec<(Notifier, Arc<dyn Deliver>)>,
        config: DispatchConfig,
    ) -> Self {
        Self::build(targets, config, None)
    }

    /// Как [`Dispatcher::new`], но дополнительно возвращает канал отчётов о
    /// каждой завершённой доставке.
    pub fn with_reports(
        targets: Vec<(Notifier, Arc<dyn Deliver>)>,
        config: DispatchConfig,
    ) -> (Self, mpsc::UnboundedReceiver<DispatchReport>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::build(targets, config, Some(tx)), rx)
    }

    fn build(
        targets: Vec<(Notifier, Arc<dyn Deliver>)>,
        config: DispatchConfig,
        reports: Option<mpsc::UnboundedSender<DispatchReport>>,
    ) -> Self {
        let targets = targets
            .into_iter()
            .enumerate()
            .map(|(index, (notifier, delivery))| {
                let (queue, rx) = mpsc::channel(config.queue_capacity.max(1));
                tokio::spawn(worker(
                    index,
                    notifier.call.clone(),
                    rx,
                    delivery,
                    config.workers_per_target.max(1),
                    reports.clone(),
                ));
                Target {
                    call: notifier.call,
                    queue,
                }
            })
            .collect();

        Self { targets }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Ставит уведомление в очередь уведомителя `index` без ожидания.
    pub fn dispatch(
        &self,
        index: usize,
        notification: Notification,
    ) -> Result<(), DeliveryError> {
        let Some(target) = self.targets.get(index) else {
            return Err(DeliveryError::Other(format!("no notifier #{index}")));
        };

        target.queue.try_send(notification).map_err(|e| {
            warn!(to = %target.call, "Notification dropped: {e}");
            DeliveryError::QueueFull(target.call.clone())
        })
    }
}

async fn worker(
    index: usize,
    call: String,
    mut queue: mpsc::Receiver<Notification>,
    delivery: Arc<dyn Deliver>,
    concurrency: usize,
    reports: Option<mpsc::UnboundedSender<DispatchReport>>,
) {
    let permits = Arc::new(Semaphore::new(concurrency));

    while let Some(notification) = queue.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };

        let delivery = delivery.clone();
        let reports = reports.clone();
        let call = call.clone();
        tokio::spawn(async move {
            let outcome = delivery.deliver(&notification).await;
            drop(permit);

            match &outcome {
                Ok(()) => debug!(to = %call, kind = %notification.kind, "Notification delivered"),
                Err(e) => warn!(to = %call, error = %e, "Notification delivery failed"),
            }

            if let Some(reports) = reports {
                let _ = reports.send(DispatchReport {
                    notifier: index,
                    call,
                    notification,
                    outcome: outcome.map_err(|e| e.to_string()),
                });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::{sync::Notify, time::timeout};

    use super::*;
    use crate::notify::DeliveryMethod;

    struct Failing;

    #[async_trait]
    impl Deliver for Failing {
        async fn deliver(
            &self,
            _notification: &Notification,
        ) -> Result<(), DeliveryError> {
            Err(DeliveryError::Other("boom".into()))
        }
    }

    /// Доставка, которая ждёт сигнала и имитирует зависший получатель.
    struct Stuck(Arc<Notify>);

    #[async_trait]
    impl Deliver for Stuck {
        async fn deliver(
            &self,
            _notification: &Notification,
        ) -> Result<(), DeliveryError> {
            self.0.notified().await;
            Ok(())
        }
    }

    fn notifier(call: &str) -> Notifier {
        Notifier {
            call: call.into(),
            method: DeliveryMethod::Log,
        }
    }

    /// Ошибка доставки видна только в отчёте.
    #[tokio::test]
    async fn test_failure_is_reported_not_returned() {
        let (dispatcher, mut reports) = Dispatcher::with_reports(
            vec![(notifier("KG6HWF"), Arc::new(Failing) as Arc<dyn Deliver>)],
            DispatchConfig::default(),
        );

        assert!(dispatcher
            .dispatch(0, Notification::new("message", "hi"))
            .is_ok());

        let report = timeout(Duration::from_secs(1), reports.recv())
            .await
            .expect("timed out")
            .expect("report");
        assert_eq!(report.notifier, 0);
        assert_eq!(report.outcome, Err("boom".to_string()));
    }

    /// Зависший получатель не блокирует вызывающего: лишнее отбрасывается.
    #[tokio::test]
    async fn test_full_queue_drops_without_blocking() {
        let gate = Arc::new(Notify::new());
        let config = DispatchConfig {
            queue_capacity: 1,
            workers_per_target: 1,
        };
        let dispatcher = Dispatcher::new(
            vec![(notifier("KG6HWF"), Arc::new(Stuck(gate.clone())) as Arc<dyn Deliver>)],
            config,
        );

        let mut dropped = 0;
        for i in 0..10 {
            if dispatcher
                .dispatch(0, Notification::new("message", i.to_string()))
                .is_err()
            {
                dropped += 1;
            }
            tokio::task::yield_now().await;
        }
        assert!(dropped > 0);
        gate.notify_waiters();
    }

    #[tokio::test]
    async fn test_unknown_notifier_index() {
        let dispatcher = Dispatcher::new(Vec::new(), DispatchConfig::default());
        assert!(dispatcher.is_empty());
        assert!(matches!(
            dispatcher.dispatch(3, Notification::new("x", "y")),
            Err(DeliveryError::Other(_))
        ));
    }
}
