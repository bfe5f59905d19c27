use std::{net::SocketAddr, path::PathBuf, time::Duration};

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use super::Cli;
use crate::{logging::LoggingConfig, GateError};

/// Итоговые настройки шлюза.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Сервер APRS-IS; пустая строка отключает сетевой источник
    pub server: String,
    pub call: String,
    pub pass: String,
    pub filter: String,
    /// Файл сырых строк APRS-IS; пустая строка отключает
    pub rawlog: String,
    /// Последовательный порт KISS TNC; пустая строка отключает радио
    pub serial_port: String,
    pub baud_rate: u32,
    pub listen: String,
    /// Адрес HTTP-приёма; пустая строка отключает
    pub http: String,
    pub notifiers: PathBuf,
    pub retry_delay_ms: u64,
    pub dedup_ttl_secs: u64,
    pub sweep_interval_ms: u64,
    pub input_capacity: usize,
    pub session_capacity: usize,
    pub report_packets: bool,
    pub banner: String,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Settings {
    /// Собирает настройки из всех источников.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = File::from(cli.config.as_path())
            .format(FileFormat::Toml)
            .required(false);

        let cfg = Self::defaults()?
            .add_source(file)
            .add_source(
                Environment::with_prefix("APRSGATE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("server", cli.server.clone())?
            .set_override_option("call", cli.call.clone())?
            .set_override_option("pass", cli.pass.clone())?
            .set_override_option("filter", cli.filter.clone())?
            .set_override_option("rawlog", cli.rawlog.clone())?
            .set_override_option("serial_port", cli.serial_port.clone())?
            .set_override_option("listen", cli.listen.clone())?
            .set_override_option("http", cli.http.clone())?
            .set_override_option(
                "notifiers",
                cli.notifiers.as_ref().map(|p| p.display().to_string()),
            )?
            .set_override_option("report_packets", cli.report_packets.then_some(true))?
            .set_override_option("logging.level", cli.log_level.clone())?
            .set_override_option("logging.format", cli.log_format.map(|f| f.to_string()))?
            .build()?;

        cfg.try_deserialize()
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server", "second.aprs.net:14580")?
            .set_default("call", "")?
            .set_default("pass", "")?
            .set_default("filter", "")?
            .set_default("rawlog", "")?
            .set_default("serial_port", "")?
            .set_default("baud_rate", 57600)?
            .set_default("listen", "0.0.0.0:10152")?
            .set_default("http", "0.0.0.0:7373")?
            .set_default("notifiers", "notifiers.json")?
            .set_default("retry_delay_ms", 1000)?
            .set_default("dedup_ttl_secs", 10)?
            .set_default("sweep_interval_ms", 1000)?
            .set_default("input_capacity", 100)?
            .set_default("session_capacity", 100)?
            .set_default("report_packets", false)?
            .set_default("banner", "aprsgate")
    }

    /// Проверяет значения, которые нельзя выразить типами.
    pub fn validate(&self) -> Result<(), GateError> {
        let positive = [
            ("retry_delay_ms", self.retry_delay_ms),
            ("dedup_ttl_secs", self.dedup_ttl_secs),
            ("sweep_interval_ms", self.sweep_interval_ms),
            ("input_capacity", self.input_capacity as u64),
            ("session_capacity", self.session_capacity as u64),
            ("baud_rate", u64::from(self.baud_rate)),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(GateError::InvalidSetting {
                    key,
                    reason: "must be greater than zero".into(),
                });
            }
        }

        if self.listen.parse::<SocketAddr>().is_err() {
            return Err(GateError::InvalidSetting {
                key: "listen",
                reason: format!("not a socket address: {}", self.listen),
            });
        }
        if !self.http.is_empty() && self.http.parse::<SocketAddr>().is_err() {
            return Err(GateError::InvalidSetting {
                key: "http",
                reason: format!("not a socket address: {}", self.http),
            });
        }
        if self.banner.contains(['\r', '\n']) {
            return Err(GateError::InvalidSetting {
                key: "banner",
                reason: "must be a single line".into(),
            });
        }
        Ok(())
    }

    pub fn feed_enabled(&self) -> bool {
        !self.server.is_empty()
    }

    pub fn radio_enabled(&self) -> bool {
        !self.serial_port.is_empty()
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn dedup_ttl(&self) -> Duration {
        Duration::from_secs(self.dedup_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}
