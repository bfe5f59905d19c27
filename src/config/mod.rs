//! Конфигурация шлюза.
//!
//! Источники в порядке приоритета (последний побеждает): значения по
//! умолчанию, необязательный TOML-файл, переменные `APRSGATE_*`, флаги
//! командной строки.

pub mod cli;
pub mod settings;

pub use cli::Cli;
pub use settings::Settings;
