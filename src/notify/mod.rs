//! Конвейер уведомлений.
//!
//! Подписчик брокера, который:
//! 1. отбрасывает повторы по ключу `(назначение, источник, тело)` в
//!    пределах TTL (`dedup`);
//! 2. сопоставляет пакет с правилами уведомителей (`routing`);
//! 3. передаёт уведомления в пул доставки (`dispatch`), не дожидаясь
//!    результата.
//!
//! Способы доставки описаны в `delivery`, загрузка конфигурации в
//! `notifier`.

pub mod dedup;
pub mod delivery;
pub mod dispatch;
pub mod notifier;
pub mod pipeline;
pub mod routing;

pub use dedup::DedupKey;
pub use delivery::{build_delivery, Deliver, LogDelivery, WebhookDelivery};
pub use dispatch::{DispatchConfig, DispatchReport, Dispatcher};
pub use notifier::{load_notifiers, load_notifiers_or_empty, DeliveryMethod, Notification, Notifier};
pub use pipeline::NotificationPipeline;
pub use routing::route;
