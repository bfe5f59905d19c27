//! Журналирование на `tracing`.
//!
//! - `config`: [`LoggingConfig`] (уровень, формат, консоль, файл);
//! - `filters`: сборка `EnvFilter` с приоритетом `RUST_LOG`;
//! - `formatter`: compact/pretty/json слои;
//! - `sinks`: консоль и файл с ежедневной ротацией;
//! - `handle`: [`LoggingHandle`], владеющий guard'ом файлового writer'а.

pub mod config;
mod filters;
mod formatter;
pub mod handle;
pub mod sinks;

pub use config::{LogFormat, LoggingConfig};
pub use handle::LoggingHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::LoggingError;

/// Инициализация глобального subscriber'а.
///
/// Возвращает [`LoggingHandle`], который нужно явно завершить при выходе.
pub fn init_logging(config: LoggingConfig) -> Result<LoggingHandle, LoggingError> {
    config.validate()?;
    config.ensure_log_dir()?;

    let env_filter = filters::build_filter(&config);
    let mut layers = Vec::new();

    if config.console {
        layers.push(sinks::console::layer(&config));
    }

    let file_guard = if config.file {
        let (file_layer, guard) = sinks::file::layer(&config)?;
        layers.push(file_layer);
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        level = %config.level,
        format = %config.format,
        console = config.console,
        file = config.file,
        log_dir = %config.log_dir.display(),
        "Logging system initialized"
    );

    Ok(LoggingHandle::new(file_guard))
}
