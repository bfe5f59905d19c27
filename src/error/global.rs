use thiserror::Error;

use super::{FeedError, LoggingError, RadioError, ServerError};

pub type GateResult<T> = Result<T, GateError>;

/// Ошибка верхнего уровня, которую супервизор возвращает в `main`.
///
/// Любое значение этого типа означает завершение процесса с ненулевым кодом.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid setting {key}: {reason}")]
    InvalidSetting { key: &'static str, reason: String },

    #[error("logging: {0}")]
    Logging(#[from] LoggingError),

    #[error("APRS-IS: {0}")]
    Feed(#[from] FeedError),

    #[error("radio: {0}")]
    Radio(#[from] RadioError),

    #[error("server: {0}")]
    Server(#[from] ServerError),

    #[error("worker {0} terminated unexpectedly")]
    WorkerStopped(&'static str),
}
