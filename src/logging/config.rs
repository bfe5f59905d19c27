use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::LoggingError;

/// Формат строк журнала.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

/// Настройки журналирования.
///
/// Читаются из секции `[logging]` файла конфигурации или переменных
/// `APRSGATE_LOGGING__*`. `RUST_LOG`, если задана, заменяет `level`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Уровень или полная директива `EnvFilter` (`info`, `aprsgate=debug`)
    pub level: String,
    pub format: LogFormat,
    /// Вывод в stdout
    pub console: bool,
    /// Ежедневно ротируемый файл в `log_dir`
    pub file: bool,
    pub log_dir: PathBuf,
    pub file_prefix: String,
    /// Цвета в консоли; выключаются сами, если stdout не терминал
    pub with_ansi: bool,
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            console: true,
            file: false,
            log_dir: PathBuf::from("logs"),
            file_prefix: "aprsgate.log".to_string(),
            with_ansi: true,
            with_target: true,
        }
    }
}

impl LoggingConfig {
    /// Проверяет, что `level` является корректной директивой.
    pub fn validate(&self) -> Result<(), LoggingError> {
        if self.level.trim().is_empty() {
            return Err(LoggingError::InvalidLevel(self.level.clone()));
        }
        tracing_subscriber::EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|_| LoggingError::InvalidLevel(self.level.clone()))
    }

    /// Создаёт каталог журналов, если включён файловый вывод.
    pub fn ensure_log_dir(&self) -> Result<(), LoggingError> {
        if !self.file {
            return Ok(());
        }
        std::fs::create_dir_all(&self.log_dir).map_err(|source| LoggingError::LogDir {
            path: self.log_dir.clone(),
            source,
        })
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        })
    }
}
