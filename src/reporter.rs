//! Диагностический журнал пакетов и приёмник служебных сообщений.

use tracing::info;

use crate::{aprs::Message, pubsub::Subscription};

/// Приёмник служебных строк (например, комментариев сервера APRS-IS).
///
/// Один метод, чтобы его могла реализовать любая цель журналирования.
pub trait InfoSink: Send + Sync {
    fn info(
        &self,
        message: &str,
    );
}

/// [`InfoSink`], пишущий в `tracing` на уровне `info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingInfoSink;

impl InfoSink for TracingInfoSink {
    fn info(
        &self,
        message: &str,
    ) {
        info!(target: "aprsgate::server", "{message}");
    }
}

/// Журналирует один пакет: источник, тип, назначение, тело и позицию.
pub fn report(message: &Message) {
    let body = message.body();
    match body.position() {
        Some(position) => info!(
            source = %message.source(),
            kind = body.type_name(),
            destination = %message.destination(),
            body = %body,
            position = %position,
            "Packet"
        ),
        None => info!(
            source = %message.source(),
            kind = body.type_name(),
            destination = %message.destination(),
            body = %body,
            "Packet"
        ),
    }
}

/// Подписчик, который только журналирует пакеты.
pub async fn run_reporter(mut subscription: Subscription) {
    info!(subscriber = %subscription.id(), "Packet reporter started");
    while let Some(message) = subscription.recv().await {
        report(&message);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    /// Реализация-накопитель: любой тип может быть приёмником.
    #[derive(Default)]
    struct Collect(Mutex<Vec<String>>);

    impl InfoSink for Collect {
        fn info(
            &self,
            message: &str,
        ) {
            self.0.lock().push(message.to_string());
        }
    }

    #[test]
    fn test_info_sink_as_trait_object() {
        let collect = Arc::new(Collect::default());
        let sink: Arc<dyn InfoSink> = collect.clone();
        sink.info("# javAPRSSrvr 4.3");
        TracingInfoSink.info("# logged");

        assert_eq!(collect.0.lock().as_slice(), ["# javAPRSSrvr 4.3"]);
    }

    #[test]
    fn test_report_does_not_panic() {
        let with_pos: Message = "N0CALL>APRS:!3745.00N/12225.00W>".parse().unwrap();
        let without: Message = "N0CALL>APRS:>status".parse().unwrap();
        report(&with_pos);
        report(&without);
    }
}
