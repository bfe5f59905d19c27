//! Внутрипроцессная шина Publish–Subscribe.
//!
//! - `broadcaster`: единая точка веерной раздачи. Набор подписчиков
//!   принадлежит одной задаче-актору; регистрация, удаление и раздача
//!   проходят через её очередь, поэтому блокировок нет.
//! - `subscriber`: дескриптор подписки и идентификатор подписчика.
//! - `stats`: счётчики публикаций и доставок.
//!
//! Публичный API переэкспортирует все три модуля.

pub mod broadcaster;
pub mod stats;
pub mod subscriber;

pub use broadcaster::*;
pub use stats::*;
pub use subscriber::*;
