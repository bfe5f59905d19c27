//! Кэш с фиксированным временем жизни записей.
//!
//! - `ttl`: сам кэш (`TtlCache`): запись живёт `ttl` с момента вставки,
//!   чтение её не продлевает.
//! - `sweeper`: фоновая задача, периодически вычищающая истёкшие записи.

pub mod sweeper;
pub mod ttl;

pub use sweeper::spawn_sweeper;
pub use ttl::TtlCache;
