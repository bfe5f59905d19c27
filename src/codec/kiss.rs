use bytes::{Buf, Bytes, BytesMut};

use crate::FrameError;

/// Разделитель кадров.
pub const FEND: u8 = 0xC0;
/// Escape-байт.
pub const FESC: u8 = 0xDB;
/// Экранированный `FEND`.
pub const TFEND: u8 = 0xDC;
/// Экранированный `FESC`.
pub const TFESC: u8 = 0xDD;
/// Команда "данные" (младший полубайт байта команды).
pub const CMD_DATA: u8 = 0x00;
/// Предел накопления байт без разделителя.
pub const MAX_FRAME_LEN: usize = 4096;

/// Кадр KISS после снятия экранирования.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KissFrame {
    /// Номер порта TNC (старший полубайт байта команды).
    pub port: u8,
    /// Код команды (младший полубайт).
    pub command: u8,
    pub payload: Bytes,
}

impl KissFrame {
    pub fn is_data(&self) -> bool {
        self.command == CMD_DATA
    }
}

/// Потоковый декодер KISS.
///
/// Байты подаются через [`KissDecoder::extend`] порциями любого размера,
/// готовые кадры забираются через [`KissDecoder::next_frame`].
#[derive(Debug, Default)]
pub struct KissDecoder {
    buf: BytesMut,
}

impl KissDecoder {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(512),
        }
    }

    /// Добавляет прочитанные байты в буфер.
    pub fn extend(
        &mut self,
        data: &[u8],
    ) {
        self.buf.extend_from_slice(data);
    }

    /// Возвращает следующий полный кадр, `Ok(None)` если кадр ещё не пришёл
    /// целиком.
    pub fn next_frame(&mut self) -> Result<Option<KissFrame>, FrameError> {
        loop {
            // Пропускаем ведущие разделители (пустые кадры).
            let leading = self.buf.iter().take_while(|&&b| b == FEND).count();
            self.buf.advance(leading);

            let Some(end) = self.buf.iter().position(|&b| b == FEND) else {
                if self.buf.len() > MAX_FRAME_LEN {
                    let len = self.buf.len();
                    self.buf.clear();
                    return Err(FrameError::Oversized(len));
                }
                return Ok(None);
            };

            let raw = self.buf.split_to(end);
            self.buf.advance(1);

            let mut data = unescape(&raw)?;
            if data.is_empty() {
                continue;
            }

            let type_byte = data[0];
            data.advance(1);
            return Ok(Some(KissFrame {
                port: type_byte >> 4,
                command: type_byte & 0x0F,
                payload: data.freeze(),
            }));
        }
    }
}

fn unescape(raw: &[u8]) -> Result<BytesMut, FrameError> {
    let mut out = BytesMut::with_capacity(raw.len());
    let mut bytes = raw.iter();

    while let Some(&b) = bytes.next() {
        if b != FESC {
            out.extend_from_slice(&[b]);
            continue;
        }
        match bytes.next() {
            Some(&TFEND) => out.extend_from_slice(&[FEND]),
            Some(&TFESC) => out.extend_from_slice(&[FESC]),
            Some(&other) => return Err(FrameError::InvalidEscape(other)),
            None => return Err(FrameError::InvalidEscape(0)),
        }
    }

    Ok(out)
}

/// Оборачивает полезную нагрузку в кадр данных KISS для порта `port`.
pub fn encode_data_frame(
    payload: &[u8],
    port: u8,
) -> Bytes {
    let mut out = BytesMut::with_capacity(payload.len() + 4);
    out.extend_from_slice(&[FEND, (port << 4) | CMD_DATA]);
    for &b in payload {
        match b {
            FEND => out.extend_from_slice(&[FESC, TFEND]),
            FESC => out.extend_from_slice(&[FESC, TFESC]),
            _ => out.extend_from_slice(&[b]),
        }
    }
    out.extend_from_slice(&[FEND]);
    out.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет экранирование служебных байтов при кодировании.
    #[test]
    fn test_encode_escapes_special_bytes() {
        let frame = encode_data_frame(&[0x01, FEND, FESC, 0x02], 0);
        assert_eq!(
            &frame[..],
            &[FEND, 0x00, 0x01, FESC, TFEND, FESC, TFESC, 0x02, FEND]
        );
    }

    /// Тест проверяет сборку кадра, пришедшего несколькими порциями.
    #[test]
    fn test_decoder_handles_split_input() {
        let mut dec = KissDecoder::new();
        dec.extend(&[FEND, 0x00, b'a']);
        assert_eq!(dec.next_frame().unwrap(), None);

        dec.extend(&[FESC, TFEND, b'b', FEND]);
        let frame = dec.next_frame().unwrap().expect("frame");
        assert!(frame.is_data());
        assert_eq!(frame.port, 0);
        assert_eq!(&frame.payload[..], &[b'a', FEND, b'b']);
        assert_eq!(dec.next_frame().unwrap(), None);
    }

    /// Несколько кадров подряд и пустые кадры между ними.
    #[test]
    fn test_decoder_multiple_frames() {
        let mut dec = KissDecoder::new();
        dec.extend(&[FEND, FEND, 0x10, 1, FEND, FEND, 0x06, 2, FEND]);

        let first = dec.next_frame().unwrap().unwrap();
        assert_eq!(first.port, 1);
        assert!(first.is_data());

        let second = dec.next_frame().unwrap().unwrap();
        assert_eq!(second.command, 0x06);
        assert!(!second.is_data());
    }

    #[test]
    fn test_invalid_escape_is_error() {
        let mut dec = KissDecoder::new();
        dec.extend(&[FEND, 0x00, FESC, 0x41, FEND]);
        assert_eq!(dec.next_frame(), Err(FrameError::InvalidEscape(0x41)));
    }

    #[test]
    fn test_oversized_garbage_is_error() {
        let mut dec = KissDecoder::new();
        dec.extend(&vec![0x41; MAX_FRAME_LEN + 1]);
        assert!(matches!(dec.next_frame(), Err(FrameError::Oversized(_))));
    }
}
