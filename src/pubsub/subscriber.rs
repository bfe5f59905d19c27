use std::{fmt, sync::Arc};

use tokio::sync::{
    mpsc::{self, error::TryRecvError},
    oneshot,
};

use super::broadcaster::Command;
use crate::aprs::Message;

/// Пакет в том виде, в котором его получают подписчики: общий, только
/// для чтения.
pub type SharedMessage = Arc<Message>;

/// Идентификатор подписчика внутри брокера.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub(crate) u64);

/// Подписка на поток пакетов брокера.
///
/// Предоставляет async интерфейс получения пакетов. Отписка происходит
/// автоматически при `Drop`; [`Subscription::unregister`] делает то же
/// самое, но дожидается подтверждения от брокера.
pub struct Subscription {
    id: SubscriberId,
    inner: mpsc::Receiver<SharedMessage>,
    commands: mpsc::UnboundedSender<Command>,
    active: bool,
}

impl SubscriberId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

impl Subscription {
    pub(crate) fn new(
        id: SubscriberId,
        inner: mpsc::Receiver<SharedMessage>,
        commands: mpsc::UnboundedSender<Command>,
    ) -> Self {
        Self {
            id,
            inner,
            commands,
            active: true,
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Асинхронно ожидает следующий пакет.
    ///
    /// # Возвращает
    /// - `Some(message)` при успешном получении
    /// - `None`, если брокер остановлен или подписка снята
    pub async fn recv(&mut self) -> Option<SharedMessage> {
        self.inner.recv().await
    }

    /// Пытается получить пакет без ожидания.
    pub fn try_recv(&mut self) -> Result<SharedMessage, TryRecvError> {
        self.inner.try_recv()
    }

    /// Количество пакетов, ожидающих в буфере подписки.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Явно снимает подписку и ждёт, пока брокер её удалит.
    ///
    /// Канал закрывается до отправки команды: если раздача в этот момент
    /// ждёт места в буфере, она сразу получит ошибку и не заблокируется.
    pub async fn unregister(mut self) {
        self.inner.close();
        self.active = false;

        let (ack, done) = oneshot::channel();
        let cmd = Command::Unregister {
            id: self.id,
            ack: Some(ack),
        };
        if self.commands.send(cmd).is_ok() {
            let _ = done.await;
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.active {
            let _ = self.commands.send(Command::Unregister {
                id: self.id,
                ack: None,
            });
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("queued", &self.inner.len())
            .finish()
    }
}
