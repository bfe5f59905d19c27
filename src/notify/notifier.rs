use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::NotifierError;

/// Способ доставки уведомления.
///
/// В файле конфигурации задаётся полем `type`:
/// `{"type": "log"}` или `{"type": "webhook", "url": "https://..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DeliveryMethod {
    Log,
    Webhook { url: String },
}

/// Правило уведомления: кому и как доставлять.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Notifier {
    /// Позывной получателя (без SSID).
    pub call: String,
    pub method: DeliveryMethod,
}

/// Уведомление, создаваемое на каждую доставку.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: String,
    pub text: String,
}

impl Notification {
    pub fn new(
        kind: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            text: text.into(),
        }
    }
}

/// Загружает уведомители из JSON-файла.
///
/// Позывные приводятся к верхнему регистру, суффикс SSID отбрасывается:
/// сопоставление идёт только по позывному. Пустой позывной является ошибкой.
pub async fn load_notifiers(path: impl AsRef<Path>) -> Result<Vec<Notifier>, NotifierError> {
    let path = path.as_ref();
    let raw = tokio::fs::read(path)
        .await
        .map_err(|source| NotifierError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let mut notifiers: Vec<Notifier> =
        serde_json::from_slice(&raw).map_err(|source| NotifierError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    for (index, notifier) in notifiers.iter_mut().enumerate() {
        let call = notifier.call.trim();
        let call = match call.split_once('-') {
            Some((base, _)) => base,
            None => call,
        }
        .to_ascii_uppercase();
        if call.is_empty() {
            return Err(NotifierError::EmptyCall { index });
        }
        notifier.call = call;
    }

    Ok(notifiers)
}

/// Как [`load_notifiers`], но ошибка не фатальна: пишется предупреждение и
/// возвращается пустой набор.
pub async fn load_notifiers_or_empty(path: impl AsRef<Path>) -> Vec<Notifier> {
    let path = path.as_ref();
    match load_notifiers(path).await {
        Ok(notifiers) => {
            info!(count = notifiers.len(), path = %path.display(), "Loaded notifiers");
            notifiers
        }
        Err(e) => {
            warn!(error = %e, "Error loading notifiers, continuing without them");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    /// Тест проверяет загрузку и нормализацию позывных.
    #[tokio::test]
    async fn test_load_notifiers() {
        let file = write_config(
            r#"[
                {"call": "kg6hwf", "method": {"type": "log"}},
                {"call": "N0CALL", "method": {"type": "webhook", "url": "http://localhost/hook"}}
            ]"#,
        );

        let notifiers = load_notifiers(file.path()).await.unwrap();
        assert_eq!(notifiers.len(), 2);
        assert_eq!(notifiers[0].call, "KG6HWF");
        assert_eq!(notifiers[0].method, DeliveryMethod::Log);
        assert_eq!(
            notifiers[1].method,
            DeliveryMethod::Webhook {
                url: "http://localhost/hook".into()
            }
        );
    }

    /// Уведомитель с SSID срабатывает на пакеты для этого позывного.
    #[tokio::test]
    async fn test_ssid_is_stripped_from_call() {
        let file = write_config(r#"[{"call": "kg6hwf-9", "method": {"type": "log"}}]"#);
        let notifiers = load_notifiers(file.path()).await.unwrap();
        assert_eq!(notifiers[0].call, "KG6HWF");

        let message: crate::aprs::Message = "N0CALL>APRS::KG6HWF-9 :hello".parse().unwrap();
        let notification = crate::notify::route(&message, &notifiers[0]).unwrap();
        assert_eq!(notification, Notification::new("message", "hello"));

        let direct: crate::aprs::Message = "N0CALL>KG6HWF-9:>status".parse().unwrap();
        assert!(crate::notify::route(&direct, &notifiers[0]).is_some());
    }

    #[tokio::test]
    async fn test_empty_call_is_rejected() {
        let file = write_config(r#"[{"call": "  ", "method": {"type": "log"}}]"#);
        assert!(matches!(
            load_notifiers(file.path()).await,
            Err(NotifierError::EmptyCall { index: 0 })
        ));

        let file = write_config(r#"[{"call": "-7", "method": {"type": "log"}}]"#);
        assert!(matches!(
            load_notifiers(file.path()).await,
            Err(NotifierError::EmptyCall { index: 0 })
        ));
    }

    /// Отсутствующий или битый файл даёт пустой набор, а не ошибку.
    #[tokio::test]
    async fn test_load_failure_degrades_to_empty() {
        assert!(load_notifiers_or_empty("/nonexistent/notifiers.json")
            .await
            .is_empty());

        let file = write_config("{not json");
        assert!(matches!(
            load_notifiers(file.path()).await,
            Err(NotifierError::Json { .. })
        ));
        assert!(load_notifiers_or_empty(file.path()).await.is_empty());
    }
}
