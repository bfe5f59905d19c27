//! Типы ошибок шлюза.
//!
//! Каждая подсистема объявляет свой `enum` через `thiserror`, а верхний
//! уровень ([`GateError`]) собирает их через `#[from]`, чтобы супервизор
//! мог решить: завершать процесс или нет.

pub mod frame;
pub mod global;
pub mod ingest;
pub mod logging;
pub mod network;
pub mod notify;
pub mod parser;

// Публичный экспорт всех типов ошибок из вложенных модулей, чтобы упростить
// доступ к ним из внешнего кода.
pub use frame::FrameError;
pub use global::{GateError, GateResult};
pub use ingest::{FeedError, RadioError};
pub use logging::LoggingError;
pub use network::ServerError;
pub use notify::{DeliveryError, NotifierError};
pub use parser::ParseError;
