use super::{Notification, Notifier};
use crate::aprs::Message;

/// Тип уведомления для адресованных сообщений.
pub const MESSAGE_KIND: &str = "message";

/// Сопоставляет пакет с одним уведомителем.
///
/// - Назначение пакета совпадает с позывным уведомителя: уведомление с
///   типом тела и полным литералом тела, независимо от типа.
/// - Иначе, если тело является адресованным этому позывному сообщением и не
///   начинается с `ack`: уведомление `"message"` с текстом сообщения.
pub fn route(
    message: &Message,
    notifier: &Notifier,
) -> Option<Notification> {
    let body = message.body();
    if message.destination().same_call(&notifier.call) {
        return Some(Notification::new(body.type_name(), body.as_str()));
    }

    let addressed = body.addressed_message()?;
    if addressed.recipient_call().eq_ignore_ascii_case(&notifier.call) && !addressed.is_ack() {
        return Some(Notification::new(MESSAGE_KIND, addressed.text()));
    }

    None
}
