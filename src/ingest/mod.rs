//! Источники пакетов.
//!
//! Оба адаптера пишут разобранные [`Message`](crate::aprs::Message) в общий
//! входной канал брокера и блокируются, если он заполнен. Политики отказа у
//! них разные:
//! - `feed`: APRS-IS по TCP; любая ошибка соединения ведёт к повторному
//!   подключению через фиксированную задержку, бесконечно;
//! - `radio`: KISS TNC на последовательном порту; любая ошибка открытия или
//!   декодирования возвращается наверх и завершает процесс.

pub mod feed;
pub mod radio;

pub use feed::{run_feed, FeedConfig};
pub use radio::{open_port, read_radio, spawn_reader, start_radio, RadioConfig, RadioLink, BAUD_RATE};
