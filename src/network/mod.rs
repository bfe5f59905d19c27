//! Сетевой модуль шлюза.
//!
//! ## Подмодули
//!
//! - `banner`: баннер в консоли при старте процесса.
//! - `server`: сервер ретрансляции; каждое соединение является подписчиком
//!   брокера и получает пакеты в текстовом виде.
//! - `http`: HTTP-приём исходящих сообщений для передачи в эфир.

pub mod banner;
pub mod http;
pub mod server;

pub use http::{bind_http, build_message, router, serve_http, submit, Submission, SubmitOutcome};
pub use server::{RepublishConfig, RepublishServer};
