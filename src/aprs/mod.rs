//! Модель данных APRS.
//!
//! - `address`: позывной с необязательным SSID.
//! - `body`: информационное поле пакета и его варианты.
//! - `message`: разобранный пакет и его каноническое текстовое (TNC2)
//!   представление.
//!
//! Все значения неизменяемы после создания: пакет создаётся адаптером
//! источника и дальше только читается подписчиками.

pub mod address;
pub mod body;
pub mod message;

pub use address::Address;
pub use body::{AddressedMessage, Body, BodyKind, Position};
pub use message::Message;
