use thiserror::Error;

/// Ошибка разбора текстового представления пакета (TNC2) или адреса.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty packet")]
    Empty,

    #[error("missing '>' between source and destination")]
    MissingSource,

    #[error("missing ':' before the information field")]
    MissingBody,

    #[error("invalid address: {0:?}")]
    InvalidAddress(String),

    #[error("ssid out of range in {0:?}")]
    InvalidSsid(String),
}
