use std::fmt;

/// Префикс подтверждения в тексте адресованного сообщения.
pub const ACK_PREFIX: &str = "ack";
/// Ширина поля адресата в адресованном сообщении.
pub const ADDRESSEE_WIDTH: usize = 9;

/// Тип информационного поля, определяемый первым символом (APRS data type
/// identifier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    Position,
    Status,
    Message,
    Object,
    Item,
    MicE,
    Telemetry,
    Weather,
    Query,
    ThirdParty,
    Unknown,
}

/// Декодированная географическая позиция.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub symbol_table: char,
    pub symbol_code: char,
}

/// Адресованное сообщение (`:ADDRESSEE:text{id`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressedMessage {
    addressee: String,
    text: String,
    id: Option<String>,
}

/// Информационное поле пакета.
///
/// Каждый вариант хранит исходный литерал поля: именно он пишется
/// подписчикам и участвует в ключе дедупликации.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Position {
        raw: String,
        position: Option<Position>,
    },
    Status {
        raw: String,
    },
    Message {
        raw: String,
        message: AddressedMessage,
    },
    Other {
        raw: String,
        kind: BodyKind,
    },
}

////////////////////////////////////////////////////////////////////////////////
// BodyKind
////////////////////////////////////////////////////////////////////////////////

impl BodyKind {
    /// Определяет тип по первому символу информационного поля.
    pub fn from_identifier(c: char) -> Self {
        match c {
            '!' | '=' | '/' | '@' => Self::Position,
            '>' => Self::Status,
            ':' => Self::Message,
            ';' => Self::Object,
            ')' => Self::Item,
            '`' | '\'' => Self::MicE,
            'T' => Self::Telemetry,
            '_' => Self::Weather,
            '?' => Self::Query,
            '}' => Self::ThirdParty,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Status => "status",
            Self::Message => "message",
            Self::Object => "object",
            Self::Item => "item",
            Self::MicE => "mic-e",
            Self::Telemetry => "telemetry",
            Self::Weather => "weather",
            Self::Query => "query",
            Self::ThirdParty => "third-party",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for BodyKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

////////////////////////////////////////////////////////////////////////////////
// AddressedMessage
////////////////////////////////////////////////////////////////////////////////

impl AddressedMessage {
    /// Разбирает поле вида `:N0CALL   :hello{42`. Возвращает `None`, если
    /// поле адресата не занимает ровно девять символов.
    pub fn parse(raw: &str) -> Option<Self> {
        let rest = raw.strip_prefix(':')?;
        let addressee = rest.get(..ADDRESSEE_WIDTH)?;
        let content = rest.get(ADDRESSEE_WIDTH..)?.strip_prefix(':')?;

        let (text, id) = match content.rsplit_once('{') {
            Some((text, id)) if !id.is_empty() => (text, Some(id.to_string())),
            _ => (content, None),
        };

        Some(Self {
            addressee: addressee.trim().to_string(),
            text: text.to_string(),
            id,
        })
    }

    /// Полный адресат как есть, включая SSID.
    pub fn addressee(&self) -> &str {
        &self.addressee
    }

    /// Позывной получателя без SSID.
    pub fn recipient_call(&self) -> &str {
        match self.addressee.split_once('-') {
            Some((call, _)) => call,
            None => &self.addressee,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Сообщение является подтверждением, если текст начинается с `ack`.
    pub fn is_ack(&self) -> bool {
        self.text.starts_with(ACK_PREFIX)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Body
////////////////////////////////////////////////////////////////////////////////

impl Body {
    /// Классифицирует информационное поле. Разбор никогда не падает:
    /// нераспознанное содержимое становится вариантом `Other`.
    pub fn parse(raw: &str) -> Self {
        let raw_owned = raw.to_string();
        let Some(first) = raw.chars().next() else {
            return Self::Other {
                raw: raw_owned,
                kind: BodyKind::Unknown,
            };
        };

        match BodyKind::from_identifier(first) {
            BodyKind::Position => {
                let position = match first {
                    // С временной меткой: 7 символов после идентификатора.
                    '/' | '@' => raw.get(8..).and_then(parse_uncompressed),
                    _ => raw.get(1..).and_then(parse_uncompressed),
                };
                Self::Position {
                    raw: raw_owned,
                    position,
                }
            }
            BodyKind::Status => Self::Status { raw: raw_owned },
            BodyKind::Message => match AddressedMessage::parse(raw) {
                Some(message) => Self::Message {
                    raw: raw_owned,
                    message,
                },
                None => Self::Other {
                    raw: raw_owned,
                    kind: BodyKind::Message,
                },
            },
            kind => Self::Other {
                raw: raw_owned,
                kind,
            },
        }
    }

    /// Конструирует адресованное сообщение для передачи в эфир.
    pub fn addressed(
        addressee: &str,
        text: &str,
    ) -> Self {
        let raw = format!(":{addressee:<width$}:{text}", width = ADDRESSEE_WIDTH);
        Self::parse(&raw)
    }

    pub fn kind(&self) -> BodyKind {
        match self {
            Self::Position { .. } => BodyKind::Position,
            Self::Status { .. } => BodyKind::Status,
            Self::Message { .. } => BodyKind::Message,
            Self::Other { kind, .. } => *kind,
        }
    }

    /// Строковый тег типа (`"position"`, `"message"`, ...).
    pub fn type_name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Исходный литерал информационного поля.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Position { raw, .. }
            | Self::Status { raw }
            | Self::Message { raw, .. }
            | Self::Other { raw, .. } => raw,
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            Self::Position { position, .. } => *position,
            _ => None,
        }
    }

    pub fn addressed_message(&self) -> Option<&AddressedMessage> {
        match self {
            Self::Message { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for Body {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Position {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{:.4},{:.4}", self.latitude, self.longitude)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Позиция без сжатия: `DDMM.mmN/DDDMM.mmW>`
////////////////////////////////////////////////////////////////////////////////

fn parse_uncompressed(s: &str) -> Option<Position> {
    let lat = s.get(0..8)?;
    let symbol_table = s.get(8..9)?.chars().next()?;
    let lon = s.get(9..18)?;
    let symbol_code = s.get(18..19)?.chars().next()?;

    let latitude = parse_coordinate(lat, 2, 'N', 'S', 90.0)?;
    let longitude = parse_coordinate(lon, 3, 'E', 'W', 180.0)?;

    Some(Position {
        latitude,
        longitude,
        symbol_table,
        symbol_code,
    })
}

fn parse_coordinate(
    field: &str,
    degree_digits: usize,
    positive: char,
    negative: char,
    limit: f64,
) -> Option<f64> {
    // Пробелы означают намеренное огрубление позиции (position ambiguity).
    let field = field.replace(' ', "0");
    let hemisphere = field.chars().last()?;
    let degrees: f64 = field.get(..degree_digits)?.parse().ok()?;
    let minutes: f64 = field.get(degree_digits..field.len() - 1)?.parse().ok()?;
    if minutes >= 60.0 {
        return None;
    }

    let value = degrees + minutes / 60.0;
    if value > limit {
        return None;
    }

    match hemisphere {
        c if c == positive => Some(value),
        c if c == negative => Some(-value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет разбор позиции без временной метки.
    #[test]
    fn test_position_without_timestamp() {
        let body = Body::parse("!3725.17N/12207.94W>Mobile");
        assert_eq!(body.kind(), BodyKind::Position);
        let pos = body.position().expect("position");
        assert!((pos.latitude - 37.4195).abs() < 1e-3);
        assert!((pos.longitude + 122.1323).abs() < 1e-3);
        assert_eq!(pos.symbol_table, '/');
        assert_eq!(pos.symbol_code, '>');
    }

    /// Тест проверяет разбор позиции с временной меткой.
    #[test]
    fn test_position_with_timestamp() {
        let body = Body::parse("@092345z4903.50N/07201.75W_090/000g005");
        let pos = body.position().expect("position");
        assert!((pos.latitude - 49.0583).abs() < 1e-3);
        assert!((pos.longitude + 72.0292).abs() < 1e-3);
    }

    /// Сжатая позиция не декодируется, но тип остаётся позицией.
    #[test]
    fn test_compressed_position_is_not_decoded() {
        let body = Body::parse("=/5L!!<*e7>7P[");
        assert_eq!(body.kind(), BodyKind::Position);
        assert!(body.position().is_none());
    }

    #[test]
    fn test_addressed_message_with_id() {
        let body = Body::parse(":KG6HWF-9 :hello there{42");
        let msg = body.addressed_message().expect("message");
        assert_eq!(msg.addressee(), "KG6HWF-9");
        assert_eq!(msg.recipient_call(), "KG6HWF");
        assert_eq!(msg.text(), "hello there");
        assert_eq!(msg.id(), Some("42"));
        assert!(!msg.is_ack());
    }

    #[test]
    fn test_ack_detection() {
        let body = Body::parse(":KG6HWF   :ack42");
        assert!(body.addressed_message().unwrap().is_ack());
    }

    /// Поле адресата короче девяти символов делает сообщение нераспознанным.
    #[test]
    fn test_malformed_message_is_other() {
        let body = Body::parse(":SHORT:hi");
        assert_eq!(body.kind(), BodyKind::Message);
        assert!(body.addressed_message().is_none());
    }

    #[test]
    fn test_addressed_constructor_pads_addressee() {
        let body = Body::addressed("N0CALL", "hi");
        assert_eq!(body.as_str(), ":N0CALL   :hi");
        assert_eq!(body.addressed_message().unwrap().text(), "hi");
    }

    #[test]
    fn test_other_kinds() {
        assert_eq!(Body::parse(">Net tonight").kind(), BodyKind::Status);
        assert_eq!(Body::parse("`c5Il!<>/]").type_name(), "mic-e");
        assert_eq!(Body::parse("").kind(), BodyKind::Unknown);
        assert_eq!(Body::parse("xyz").type_name(), "unknown");
    }
}
