use std::path::PathBuf;

use clap::Parser;

use crate::logging::LogFormat;

/// Аргументы командной строки.
///
/// Любой заданный флаг перекрывает файл конфигурации и окружение.
#[derive(Debug, Default, Parser)]
#[command(name = "aprsgate")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "APRS gateway: APRS-IS and KISS radio in, TNC2 feed and notifications out", long_about = None)]
pub struct Cli {
    /// Путь к TOML-файлу конфигурации (необязательный)
    #[arg(
        short,
        long,
        default_value = "aprsgate.toml",
        env = "APRSGATE_CONFIG",
        help = "Файл конфигурации"
    )]
    pub config: PathBuf,

    #[arg(long, help = "Сервер APRS-IS (host:port); пустая строка отключает")]
    pub server: Option<String>,

    #[arg(long, help = "Позывной для входа в APRS-IS")]
    pub call: Option<String>,

    #[arg(long, help = "Пароль (passcode) APRS-IS")]
    pub pass: Option<String>,

    #[arg(long, help = "Фильтр APRS-IS")]
    pub filter: Option<String>,

    #[arg(long, help = "Файл для записи сырых строк APRS-IS")]
    pub rawlog: Option<String>,

    #[arg(long = "serial", help = "Последовательный порт KISS TNC")]
    pub serial_port: Option<String>,

    #[arg(long, help = "Адрес сервера ретрансляции")]
    pub listen: Option<String>,

    #[arg(long, help = "Адрес HTTP-приёма исходящих сообщений")]
    pub http: Option<String>,

    #[arg(long, help = "JSON-файл уведомителей")]
    pub notifiers: Option<PathBuf>,

    #[arg(long, help = "Журналировать каждый принятый пакет")]
    pub report_packets: bool,

    #[arg(long, help = "Уровень журналирования или директива EnvFilter")]
    pub log_level: Option<String>,

    #[arg(long, help = "Формат журнала: compact, pretty, json")]
    pub log_format: Option<LogFormat>,
}
