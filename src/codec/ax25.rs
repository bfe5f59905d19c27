use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    aprs::{Address, Body, Message},
    FrameError, ParseError,
};

/// Длина одного адресного поля.
pub const ADDRESS_LEN: usize = 7;
/// Максимальное число дигипитеров в пути.
pub const MAX_DIGIPEATERS: usize = 8;
/// Длина позывного в адресном поле.
pub const CALL_LEN: usize = 6;
/// Управляющее поле UI-кадра.
pub const CONTROL_UI: u8 = 0x03;
/// PID "без протокола третьего уровня".
pub const PID_NO_LAYER3: u8 = 0xF0;

const SSID_MASK: u8 = 0x0F;
const END_OF_ADDRESS: u8 = 0x01;
const HAS_BEEN_REPEATED: u8 = 0x80;
const COMMAND_BIT: u8 = 0x80;
const RESERVED_BITS: u8 = 0x60;

/// Декодирует UI-кадр AX.25 в [`Message`].
pub fn decode_ui_frame(frame: &[u8]) -> Result<Message, FrameError> {
    // Минимум: два адреса, control и pid.
    if frame.len() < ADDRESS_LEN * 2 + 2 {
        return Err(FrameError::TooShort(frame.len()));
    }

    let mut addresses = Vec::with_capacity(4);
    let mut offset = 0;
    loop {
        let field = frame
            .get(offset..offset + ADDRESS_LEN)
            .ok_or(FrameError::UnterminatedAddress)?;
        offset += ADDRESS_LEN;

        let last = field[6] & END_OF_ADDRESS != 0;
        addresses.push(decode_address(field)?);

        if addresses.len() > MAX_DIGIPEATERS + 2 {
            return Err(FrameError::TooManyDigipeaters(addresses.len() - 2));
        }
        if last {
            break;
        }
    }
    if addresses.len() < 2 {
        return Err(FrameError::TooShort(frame.len()));
    }

    let (control, pid) = match frame.get(offset..offset + 2) {
        Some(&[control, pid]) => (control, pid),
        _ => return Err(FrameError::TooShort(frame.len())),
    };
    if control != CONTROL_UI || pid != PID_NO_LAYER3 {
        return Err(FrameError::NotUiFrame { control, pid });
    }

    let info = String::from_utf8_lossy(&frame[offset + 2..]);
    let mut addresses = addresses.into_iter();
    let destination = addresses.next().ok_or(FrameError::TooShort(frame.len()))?;
    let source = addresses.next().ok_or(FrameError::TooShort(frame.len()))?;

    // Флаг H имеет смысл только для дигипитеров.
    Ok(Message::new(
        source.with_digipeated(false),
        destination.with_digipeated(false),
        addresses.collect(),
        Body::parse(info.trim_end_matches(['\r', '\n'])),
    ))
}

fn decode_address(field: &[u8]) -> Result<Address, FrameError> {
    let call: String = field[..CALL_LEN]
        .iter()
        .map(|&b| (b >> 1) as char)
        .collect::<String>()
        .trim_end()
        .to_string();

    if call.is_empty() || !call.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(ParseError::InvalidAddress(call).into());
    }

    let ssid_byte = field[CALL_LEN];
    let ssid = (ssid_byte >> 1) & SSID_MASK;
    Ok(Address::new(call, ssid).with_digipeated(ssid_byte & HAS_BEEN_REPEATED != 0))
}

/// Кодирует пакет в UI-кадр AX.25 (без KISS-обёртки).
pub fn encode_ui_frame(message: &Message) -> Result<Bytes, FrameError> {
    if message.path().len() > MAX_DIGIPEATERS {
        return Err(FrameError::TooManyDigipeaters(message.path().len()));
    }

    let body = message.body().as_str().as_bytes();
    let mut out = BytesMut::with_capacity(ADDRESS_LEN * (2 + message.path().len()) + 2 + body.len());

    let last_index = message.path().len() + 1;
    encode_address(&mut out, message.destination(), COMMAND_BIT, last_index == 0)?;
    encode_address(&mut out, message.source(), 0, last_index == 1)?;
    for (i, hop) in message.path().iter().enumerate() {
        let flags = if hop.is_digipeated() { HAS_BEEN_REPEATED } else { 0 };
        encode_address(&mut out, hop, flags, i + 2 == last_index)?;
    }

    out.put_u8(CONTROL_UI);
    out.put_u8(PID_NO_LAYER3);
    out.put_slice(body);
    Ok(out.freeze())
}

fn encode_address(
    out: &mut BytesMut,
    address: &Address,
    flags: u8,
    last: bool,
) -> Result<(), FrameError> {
    let call = address.call();
    if call.len() > CALL_LEN || !call.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(ParseError::InvalidAddress(call.to_string()).into());
    }

    for b in call.to_ascii_uppercase().bytes() {
        out.put_u8(b << 1);
    }
    for _ in call.len()..CALL_LEN {
        out.put_u8(b' ' << 1);
    }

    let mut ssid = RESERVED_BITS | flags | ((address.ssid() & SSID_MASK) << 1);
    if last {
        ssid |= END_OF_ADDRESS;
    }
    out.put_u8(ssid);
    Ok(())
}
