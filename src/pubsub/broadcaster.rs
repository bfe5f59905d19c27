use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, trace};

use super::{BroadcastSnapshot, BroadcastStats, SharedMessage, SubscriberId, Subscription};
use crate::aprs::Message;

/// Команды, которые обрабатывает задача раздачи между пакетами.
pub(crate) enum Command {
    Register {
        id: SubscriberId,
        sender: mpsc::Sender<SharedMessage>,
        ack: oneshot::Sender<()>,
    },
    Unregister {
        id: SubscriberId,
        ack: Option<oneshot::Sender<bool>>,
    },
}

/// Брокер веерной раздачи пакетов.
///
/// Один входной поток, динамический набор выходных каналов. Набор
/// принадлежит фоновой задаче; этот дескриптор лишь отправляет ей команды,
/// поэтому его можно свободно клонировать между задачами.
///
/// Гарантии:
/// - подписчик получает пакеты начиная со следующего после завершения
///   `register` (без ретроспективной доставки);
/// - после завершения `unregister` доставок больше нет;
/// - следующий пакет не берётся из входа, пока текущий не отдан всем
///   подписчикам, поэтому порядок для каждого подписчика сохраняется.
///
/// Таймаута на доставку нет: подписчик с полным буфером задерживает всю
/// шину. Это осознанный механизм обратного давления.
#[derive(Clone)]
pub struct Broadcaster {
    commands: mpsc::UnboundedSender<Command>,
    next_id: Arc<AtomicU64>,
    stats: Arc<BroadcastStats>,
}

impl Broadcaster {
    /// Запускает задачу раздачи, читающую пакеты из `input`.
    ///
    /// Задача завершается, когда закрыты все отправители входного канала;
    /// каналы подписчиков при этом закрываются.
    pub fn spawn(input: mpsc::Receiver<Message>) -> (Self, JoinHandle<()>) {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let stats = Arc::new(BroadcastStats::new());

        let handle = tokio::spawn(run(input, command_rx, stats.clone()));

        let broadcaster = Self {
            commands,
            next_id: Arc::new(AtomicU64::new(0)),
            stats,
        };
        (broadcaster, handle)
    }

    /// Добавляет выходной канал в активный набор и ждёт, пока задача
    /// раздачи его примет.
    pub async fn register(
        &self,
        sender: mpsc::Sender<SharedMessage>,
    ) -> SubscriberId {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let (ack, done) = oneshot::channel();

        if self
            .commands
            .send(Command::Register { id, sender, ack })
            .is_ok()
        {
            // Если брокер уже остановлен, `sender` отброшен вместе с командой
            // и получатель увидит закрытый канал.
            let _ = done.await;
        }
        id
    }

    /// Удаляет подписчика. Возвращает `true`, если он был в наборе.
    ///
    /// Безопасно вызывать одновременно с раздачей: если раздача ждёт места
    /// в канале этого подписчика, ожидание прерывается и пакет ему не
    /// доставляется.
    pub async fn unregister(
        &self,
        id: SubscriberId,
    ) -> bool {
        let (ack, done) = oneshot::channel();
        let cmd = Command::Unregister { id, ack: Some(ack) };
        if self.commands.send(cmd).is_err() {
            return false;
        }
        done.await.unwrap_or(false)
    }

    /// Создаёт канал ёмкостью `capacity`, регистрирует его и возвращает
    /// подписку.
    pub async fn subscribe(
        &self,
        capacity: usize,
    ) -> Subscription {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let id = self.register(tx).await;
        Subscription::new(id, rx, self.commands.clone())
    }

    pub fn stats(&self) -> BroadcastSnapshot {
        self.stats.snapshot()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Задача раздачи
////////////////////////////////////////////////////////////////////////////////

struct Registry {
    subscribers: Vec<(SubscriberId, mpsc::Sender<SharedMessage>)>,
    stats: Arc<BroadcastStats>,
}

async fn run(
    mut input: mpsc::Receiver<Message>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    stats: Arc<BroadcastStats>,
) {
    let mut registry = Registry {
        subscribers: Vec::new(),
        stats,
    };

    loop {
        tokio::select! {
            // Команды обрабатываются раньше пакетов: регистрация, завершённая
            // до публикации, всегда видна этой публикации.
            biased;

            Some(cmd) = commands.recv() => registry.apply(cmd),

            msg = input.recv() => match msg {
                Some(msg) => registry.fan_out(Arc::new(msg), &mut commands).await,
                None => break,
            },
        }
    }

    debug!(
        subscribers = registry.subscribers.len(),
        "Broadcaster input closed, stopping"
    );
}

impl Registry {
    fn contains(
        &self,
        id: SubscriberId,
    ) -> bool {
        self.subscribers.iter().any(|(sid, _)| *sid == id)
    }

    fn apply(
        &mut self,
        cmd: Command,
    ) {
        match cmd {
            Command::Register { id, sender, ack } => {
                self.subscribers.push((id, sender));
                trace!(%id, total = self.subscribers.len(), "Subscriber registered");
                let _ = ack.send(());
            }
            Command::Unregister { id, ack } => {
                let before = self.subscribers.len();
                self.subscribers.retain(|(sid, _)| *sid != id);
                let removed = self.subscribers.len() != before;
                trace!(%id, removed, total = self.subscribers.len(), "Subscriber unregistered");
                if let Some(ack) = ack {
                    let _ = ack.send(removed);
                }
            }
        }
        self.stats.set_subscribers(self.subscribers.len());
    }

    /// Отдаёт пакет каждому подписчику по очереди, в порядке регистрации.
    /// Подписчики с закрытым каналом удаляются.
    ///
    /// Пока отправка ждёт места в канале, команды продолжают применяться.
    /// Пакет получают только подписчики, зарегистрированные до его начала;
    /// снятый во время раздачи подписчик больше ничего не получает.
    async fn fan_out(
        &mut self,
        msg: SharedMessage,
        commands: &mut mpsc::UnboundedReceiver<Command>,
    ) {
        self.stats.record_published();

        let targets = self.subscribers.clone();
        let mut delivered = 0;
        let mut closed = Vec::new();
        for (id, sender) in &targets {
            if !self.contains(*id) {
                continue;
            }

            let send = sender.send(msg.clone());
            tokio::pin!(send);
            loop {
                tokio::select! {
                    biased;

                    Some(cmd) = commands.recv() => {
                        let removes_target =
                            matches!(&cmd, Command::Unregister { id: gone, .. } if gone == id);
                        self.apply(cmd);
                        if removes_target {
                            trace!(%id, "Pending delivery dropped by unregister");
                            break;
                        }
                    }

                    res = &mut send => {
                        match res {
                            Ok(()) => delivered += 1,
                            Err(_) => closed.push(*id),
                        }
                        break;
                    }
                }
            }
        }

        self.stats.record_delivered(delivered);
        if !closed.is_empty() {
            self.subscribers.retain(|(id, _)| !closed.contains(id));
            self.stats.record_pruned(closed.len() as u64);
            self.stats.set_subscribers(self.subscribers.len());
            debug!(pruned = closed.len(), "Removed subscribers with closed channels");
        }
    }
}
