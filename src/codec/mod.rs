//! Кодеки радиоканала.
//!
//! - `kiss`: фрейминг KISS поверх последовательного порта.
//! - `ax25`: UI-кадры AX.25, которые KISS переносит в кадрах данных.

pub mod ax25;
pub mod kiss;

pub use ax25::{decode_ui_frame, encode_ui_frame};
pub use kiss::{encode_data_frame, KissDecoder, KissFrame};
