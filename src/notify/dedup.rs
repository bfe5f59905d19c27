use crate::aprs::Message;

/// Ключ дедупликации: назначение, источник и литерал тела.
///
/// Путь не входит в ключ: один и тот же пакет, пришедший через разные
/// дигипитеры или из разных источников, считается повтором.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DedupKey {
    destination: String,
    source: String,
    body: String,
}

impl DedupKey {
    pub fn of(message: &Message) -> Self {
        Self {
            destination: message.destination().to_string(),
            source: message.source().to_string(),
            body: message.body().as_str().to_string(),
        }
    }
}
