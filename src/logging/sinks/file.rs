use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling::daily};
use tracing_subscriber::{registry::LookupSpan, Layer};

use crate::{
    logging::{config::LoggingConfig, formatter},
    LoggingError,
};

/// Файловый слой с ежедневной ротацией и неблокирующей записью.
///
/// `WorkerGuard` должен жить до завершения процесса, иначе хвост журнала
/// будет потерян.
pub fn layer<S>(
    config: &LoggingConfig
) -> Result<(Box<dyn Layer<S> + Send + Sync>, WorkerGuard), LoggingError>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    std::fs::create_dir_all(&config.log_dir).map_err(|source| LoggingError::LogDir {
        path: config.log_dir.clone(),
        source,
    })?;

    let appender = daily(&config.log_dir, &config.file_prefix);
    let (writer, guard) = non_blocking(appender);

    let layer = formatter::build_formatter(config.format, writer, false, config.with_target);
    Ok((layer, guard))
}
