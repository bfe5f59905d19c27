use thiserror::Error;

use super::ParseError;

/// Ошибки KISS-фрейминга и декодирования AX.25 кадров.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame too short: {0} bytes")]
    TooShort(usize),

    #[error("invalid KISS escape sequence 0xDB 0x{0:02X}")]
    InvalidEscape(u8),

    #[error("address field is not terminated")]
    UnterminatedAddress,

    #[error("too many digipeaters: {0}")]
    TooManyDigipeaters(usize),

    #[error("not a UI frame (control 0x{control:02X}, pid 0x{pid:02X})")]
    NotUiFrame { control: u8, pid: u8 },

    #[error("frame exceeds {0} bytes without a delimiter")]
    Oversized(usize),

    #[error("address cannot be encoded: {0}")]
    Address(#[from] ParseError),
}
