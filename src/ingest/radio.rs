use std::{
    io::{self, ErrorKind, Read, Write},
    sync::Arc,
    time::Duration,
};

use parking_lot::Mutex;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, trace};

use crate::{
    aprs::Message,
    codec::{decode_ui_frame, encode_data_frame, encode_ui_frame, KissDecoder},
    config::Settings,
    RadioError,
};

/// Скорость порта TNC по умолчанию.
pub const BAUD_RATE: u32 = 57600;

/// Таймаут чтения порта; по истечении чтение просто повторяется.
const READ_TIMEOUT: Duration = Duration::from_millis(100);

const READ_CHUNK: usize = 1024;

#[derive(Debug, Clone)]
pub struct RadioConfig {
    pub port: String,
    pub baud_rate: u32,
}

/// Передающая половина радиоканала.
///
/// Клонируется дёшево; запись кадров сериализуется мьютексом.
#[derive(Clone)]
pub struct RadioLink {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl RadioConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            port: settings.serial_port.clone(),
            baud_rate: settings.baud_rate,
        }
    }
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: BAUD_RATE,
        }
    }
}

impl RadioLink {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Кодирует пакет в кадр AX.25 UI, оборачивает в KISS (порт 0) и пишет
    /// в TNC. Вызов блокирующий.
    pub fn transmit(
        &self,
        message: &Message,
    ) -> Result<(), RadioError> {
        let frame = encode_ui_frame(message)?;
        let kiss = encode_data_frame(&frame, 0);

        let mut writer = self.writer.lock();
        writer.write_all(&kiss)?;
        writer.flush()?;

        debug!(packet = %message, bytes = kiss.len(), "Transmitted via radio");
        Ok(())
    }
}

/// Открывает порт в режиме 8N1 без управления потоком.
pub fn open_port(config: &RadioConfig) -> Result<Box<dyn SerialPort>, RadioError> {
    serialport::new(&config.port, config.baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(READ_TIMEOUT)
        .open()
        .map_err(|source| RadioError::Open {
            port: config.port.clone(),
            source,
        })
}

/// Открывает порт и запускает чтение в блокирующем потоке.
///
/// Возвращает передающую половину и задачу чтения. Задача завершается
/// ошибкой при любой проблеме ввода-вывода или декодирования и `Ok(())`
/// только после закрытия входного канала.
pub fn start_radio(
    config: &RadioConfig,
    tx: mpsc::Sender<Message>,
) -> Result<(RadioLink, JoinHandle<Result<(), RadioError>>), RadioError> {
    let port = open_port(config)?;
    let reader = port.try_clone().map_err(|source| RadioError::Open {
        port: config.port.clone(),
        source,
    })?;

    info!(port = %config.port, baud = config.baud_rate, "Radio port opened");

    Ok((RadioLink::new(port), spawn_reader(reader, tx)))
}

/// Запускает [`read_radio`] для произвольного источника байтов в
/// блокирующем потоке.
pub fn spawn_reader<R>(
    reader: R,
    tx: mpsc::Sender<Message>,
) -> JoinHandle<Result<(), RadioError>>
where
    R: Read + Send + 'static,
{
    tokio::task::spawn_blocking(move || read_radio(reader, &tx))
}

/// Читает поток KISS и отправляет декодированные пакеты в `tx`.
///
/// Должна вызываться вне async контекста (использует `blocking_send`).
/// Таймауты чтения не считаются ошибкой; конец потока считается.
pub fn read_radio<R: Read>(
    mut reader: R,
    tx: &mpsc::Sender<Message>,
) -> Result<(), RadioError> {
    let mut decoder = KissDecoder::new();
    let mut buf = [0u8; READ_CHUNK];

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Err(io::Error::from(ErrorKind::UnexpectedEof).into()),
            Ok(n) => n,
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::TimedOut | ErrorKind::Interrupted | ErrorKind::WouldBlock
                ) =>
            {
                continue
            }
            Err(e) => return Err(e.into()),
        };

        decoder.extend(&buf[..n]);
        while let Some(frame) = decoder.next_frame()? {
            if !frame.is_data() {
                trace!(command = frame.command, "Non-data KISS frame ignored");
                continue;
            }

            let message = decode_ui_frame(&frame.payload)?;
            debug!(packet = %message, "Received via radio");
            if tx.blocking_send(message).is_err() {
                return Ok(());
            }
        }
    }
}
