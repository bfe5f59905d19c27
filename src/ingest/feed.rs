use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use tokio::{
    fs::{File, OpenOptions},
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    net::TcpStream,
    sync::mpsc,
    time::sleep,
};
use tracing::{debug, info, warn};

use crate::{aprs::Message, config::Settings, reporter::InfoSink, FeedError};

/// Предельная длина строки APRS-IS вместе с `\r\n`.
pub const MAX_LINE_LEN: usize = 512;

/// Параметры подключения к APRS-IS.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// `host:port`
    pub server: String,
    pub call: String,
    pub pass: String,
    pub filter: Option<String>,
    /// Файл, в который дописываются все полученные строки
    pub rawlog: Option<PathBuf>,
    pub retry_delay: Duration,
}

impl FeedConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            server: settings.server.clone(),
            call: settings.call.clone(),
            pass: settings.pass.clone(),
            filter: non_empty(&settings.filter),
            rawlog: non_empty(&settings.rawlog).map(PathBuf::from),
            retry_delay: settings.retry_delay(),
        }
    }

    /// Учётные данные обязательны; их отсутствие не лечится повтором.
    pub fn validate(&self) -> Result<(), FeedError> {
        if self.call.trim().is_empty() {
            return Err(FeedError::MissingCallsign);
        }
        if self.pass.trim().is_empty() {
            return Err(FeedError::MissingPasscode);
        }
        Ok(())
    }

    /// Строка входа: `user <call> pass <pass> vers aprsgate <ver>[ filter <f>]`.
    pub fn login_line(&self) -> String {
        let mut line = format!(
            "user {} pass {} vers aprsgate {}",
            self.call,
            self.pass,
            env!("CARGO_PKG_VERSION")
        );
        if let Some(filter) = &self.filter {
            line.push_str(" filter ");
            line.push_str(filter);
        }
        line.push_str("\r\n");
        line
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

////////////////////////////////////////////////////////////////////////////////
// Цикл источника
////////////////////////////////////////////////////////////////////////////////

/// Читает APRS-IS, пока жив входной канал.
///
/// Учётные данные проверяются до первого подключения. Любая другая ошибка
/// журналируется, после чего подключение и вход повторяются через
/// `retry_delay`. Возвращает `Ok(())`, только когда входной канал закрыт.
pub async fn run_feed(
    config: FeedConfig,
    tx: mpsc::Sender<Message>,
    info: Arc<dyn InfoSink>,
) -> Result<(), FeedError> {
    config.validate()?;

    loop {
        match session(&config, &tx, info.as_ref()).await {
            Ok(()) => break,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(
                    server = %config.server,
                    error = %e,
                    retry_ms = config.retry_delay.as_millis() as u64,
                    "APRS-IS connection lost, reconnecting"
                );
            }
        }

        if tx.is_closed() {
            break;
        }
        sleep(config.retry_delay).await;
    }

    info!("APRS-IS feed stopped: ingest channel closed");
    Ok(())
}

/// Одно подключение: вход и чтение строк до ошибки или EOF.
async fn session(
    config: &FeedConfig,
    tx: &mpsc::Sender<Message>,
    info: &dyn InfoSink,
) -> Result<(), FeedError> {
    let stream = TcpStream::connect(&config.server)
        .await
        .map_err(|source| FeedError::Connect {
            addr: config.server.clone(),
            source,
        })?;
    let (reader, mut writer) = stream.into_split();

    writer.write_all(config.login_line().as_bytes()).await?;
    info!(server = %config.server, call = %config.call, "Connected to APRS-IS");

    let mut rawlog = match &config.rawlog {
        Some(path) => Some(open_rawlog(path).await?),
        None => None,
    };

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::with_capacity(MAX_LINE_LEN);

    loop {
        buf.clear();
        let n = (&mut reader)
            .take(MAX_LINE_LEN as u64)
            .read_until(b'\n', &mut buf)
            .await?;
        if n == 0 {
            return Err(FeedError::Eof);
        }
        if n == MAX_LINE_LEN && buf.last() != Some(&b'\n') {
            return Err(FeedError::LineTooLong(MAX_LINE_LEN));
        }

        let raw = String::from_utf8_lossy(&buf);
        let line = raw.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            continue;
        }

        if let Some(log) = rawlog.as_mut() {
            log.write_all(line.as_bytes()).await?;
            log.write_all(b"\n").await?;
            log.flush().await?;
        }

        if line.starts_with('#') {
            info.info(line);
            continue;
        }

        match line.parse::<Message>() {
            Ok(message) => {
                if tx.send(message).await.is_err() {
                    return Ok(());
                }
            }
            Err(e) => debug!(line, error = %e, "Unparseable APRS-IS line skipped"),
        }
    }
}

async fn open_rawlog(path: &Path) -> Result<File, FeedError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|source| FeedError::RawLog {
            path: path.to_path_buf(),
            source,
        })
}
