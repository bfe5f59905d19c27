use std::{io, path::PathBuf};

use thiserror::Error;

use super::FrameError;

/// Ошибки сетевого источника (APRS-IS).
///
/// `MissingCallsign` и `MissingPasscode` являются ошибками конфигурации и не
/// повторяются; остальные варианты адаптер логирует и переподключается.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("callsign is required for APRS-IS")]
    MissingCallsign,

    #[error("passcode is required for APRS-IS")]
    MissingPasscode,

    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot open raw log {path}: {source}")]
    RawLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("connection closed by server")]
    Eof,

    #[error("line exceeds {0} bytes")]
    LineTooLong(usize),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl FeedError {
    /// Ошибки, которые нельзя лечить переподключением.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingCallsign | Self::MissingPasscode)
    }
}

/// Ошибки радиоканала. Любая из них фатальна для процесса.
#[derive(Debug, Error)]
pub enum RadioError {
    #[error("error opening port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("serial IO error: {0}")]
    Io(#[from] io::Error),

    #[error("error retrieving APRS message via KISS: {0}")]
    Decode(#[from] FrameError),

    #[error("radio reader stopped unexpectedly")]
    ReaderStopped,
}
