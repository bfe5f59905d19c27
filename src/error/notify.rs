use std::{io, path::PathBuf};

use thiserror::Error;

/// Ошибка загрузки конфигурации уведомлений.
///
/// Не фатальна: конвейер продолжает работу с пустым набором.
#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid notifier config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("notifier #{index} has an empty target call")]
    EmptyCall { index: usize },
}

/// Ошибка доставки одного уведомления.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook responded with status {0}")]
    Status(u16),

    #[error("dispatch queue for {0} is full")]
    QueueFull(String),

    #[error("{0}")]
    Other(String),
}
