use std::{io, path::PathBuf};

use thiserror::Error;

/// Ошибки инициализации журналирования.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log level: {0}")]
    InvalidLevel(String),

    #[error("cannot create log directory {path}: {source}")]
    LogDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("global subscriber already set: {0}")]
    Init(String),
}
