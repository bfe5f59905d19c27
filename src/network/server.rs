use std::{
    io,
    net::SocketAddr,
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
    time::sleep,
};
use tracing::{debug, error, info, warn};

use crate::{config::Settings, pubsub::Broadcaster, ServerError};

/// Пауза после ошибки `accept`, чтобы не крутить цикл вхолостую.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Параметры сервера ретрансляции.
#[derive(Debug, Clone)]
pub struct RepublishConfig {
    /// Идентификатор в строке-баннере `# <banner>`
    pub banner: String,
    /// Буфер подписки одной сессии
    pub session_capacity: usize,
}

/// Сервер ретрансляции: каждое TCP-соединение становится подписчиком
/// брокера и получает пакеты в текстовом виде, по одному на строку.
///
/// Клиент ничего не отправляет; входящие данные не читаются.
pub struct RepublishServer {
    listener: TcpListener,
    broadcaster: Broadcaster,
    config: Arc<RepublishConfig>,
    sessions: Arc<AtomicUsize>,
    next_id: AtomicU64,
}

impl RepublishConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            banner: settings.banner.clone(),
            session_capacity: settings.session_capacity,
        }
    }

    /// Первая строка каждой сессии.
    pub fn banner_line(&self) -> String {
        format!("# {}\n", self.banner)
    }
}

impl Default for RepublishConfig {
    fn default() -> Self {
        Self {
            banner: "aprsgate".to_string(),
            session_capacity: 100,
        }
    }
}

impl RepublishServer {
    /// Занимает адрес. Ошибка здесь фатальна для процесса.
    pub async fn bind(
        addr: &str,
        broadcaster: Broadcaster,
        config: RepublishConfig,
    ) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.to_string(),
                source,
            })?;

        Ok(Self {
            listener,
            broadcaster,
            config: Arc::new(config),
            sessions: Arc::new(AtomicUsize::new(0)),
            next_id: AtomicU64::new(0),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Количество активных сессий.
    pub fn active_sessions(&self) -> usize {
        self.sessions.load(Ordering::Relaxed)
    }

    /// Принимает соединения бесконечно. Ошибки `accept` и сессий только
    /// журналируются.
    pub async fn run(self) {
        match self.listener.local_addr() {
            Ok(addr) => info!(%addr, "Republishing server listening"),
            Err(e) => warn!(error = %e, "Republishing server listening on unknown address"),
        }

        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    error!(error = %e, "Error accepting connection");
                    sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };

            let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
            let broadcaster = self.broadcaster.clone();
            let config = self.config.clone();
            let sessions = self.sessions.clone();

            tokio::spawn(async move {
                let active = sessions.fetch_add(1, Ordering::Relaxed) + 1;
                info!(session = id, %peer, active, "Session started");

                match session(stream, broadcaster, &config).await {
                    Ok(()) => debug!(session = id, %peer, "Session finished"),
                    Err(e) => warn!(session = id, %peer, error = %e, "Error on connection"),
                }

                sessions.fetch_sub(1, Ordering::Relaxed);
            });
        }
    }
}

/// Одна сессия: баннер, затем подписка и пересылка до ошибки записи.
///
/// Подписка оформляется только после записи баннера, поэтому баннер
/// всегда предшествует пакетам.
async fn session(
    mut stream: TcpStream,
    broadcaster: Broadcaster,
    config: &RepublishConfig,
) -> io::Result<()> {
    stream.write_all(config.banner_line().as_bytes()).await?;

    let mut subscription = broadcaster.subscribe(config.session_capacity).await;

    while let Some(message) = subscription.recv().await {
        let line = format!("{message}\n");
        if let Err(e) = stream.write_all(line.as_bytes()).await {
            subscription.unregister().await;
            return Err(e);
        }
    }

    Ok(())
}
