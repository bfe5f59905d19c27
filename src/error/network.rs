use std::io;

use thiserror::Error;

/// Ошибки серверной части (ретрансляция и HTTP-приём сообщений).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
