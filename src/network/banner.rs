use std::env;

use atty::Stream;
use chrono::{DateTime, Local};
use owo_colors::OwoColorize;

use crate::config::Settings;

/// Полный баннер с информацией о шлюзе.
pub const ASCII_FULL: &str = r#"
    aprsgate {version}
    ----------------------------------------------
    Mode:             {mode}
    APRS-IS:          {feed}
    Radio:            {radio}
    Republish:        {listen}
    HTTP:             {http}
    PID:              {pid}
    OS/Arch:          {os}/{arch}
    Build:            {git} ({build_time})
"#;

/// Компактный баннер для вывода.
pub const ASCII_COMPACT: &str = "aprsgate {version} | {mode} | {listen} | PID {pid}";

const DISABLED: &str = "disabled";

/// Подставляет значения в шаблон баннера.
pub fn render_banner(
    template: &str,
    settings: &Settings,
) -> String {
    let version = env!("CARGO_PKG_VERSION");
    let bits = std::mem::size_of::<usize>() * 8;

    let mode = if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    };

    let feed = if settings.feed_enabled() {
        format!("{} as {}", settings.server, settings.call)
    } else {
        DISABLED.to_string()
    };
    let radio = if settings.radio_enabled() {
        format!("{} @ {}", settings.serial_port, settings.baud_rate)
    } else {
        DISABLED.to_string()
    };
    let http = if settings.http.is_empty() {
        DISABLED
    } else {
        settings.http.as_str()
    };

    template
        .replace("{version}", &format!("{version} ({bits}-bit)"))
        .replace("{mode}", mode)
        .replace("{feed}", &feed)
        .replace("{radio}", &radio)
        .replace("{listen}", &settings.listen)
        .replace("{http}", http)
        .replace("{pid}", &std::process::id().to_string())
        .replace("{os}", env::consts::OS)
        .replace("{arch}", env::consts::ARCH)
        .replace("{git}", option_env!("GIT_COMMIT").unwrap_or("unknown"))
        .replace("{build_time}", &build_time())
}

/// Выводит баннер в stdout. Режим задаётся `APRSGATE_STARTUP_BANNER=full|compact`,
/// по умолчанию полный в debug-сборке и компактный в release.
pub fn print_banner(settings: &Settings) {
    let full = match env::var("APRSGATE_STARTUP_BANNER").ok().as_deref() {
        Some("full") => true,
        Some("compact") => false,
        _ => cfg!(debug_assertions),
    };
    let color = atty::is(Stream::Stdout);

    if !full {
        let s = render_banner(ASCII_COMPACT, settings);
        if color {
            println!("{}", s.bold().green());
        } else {
            println!("{s}");
        }
        return;
    }

    let s = render_banner(ASCII_FULL, settings);
    if !color {
        println!("{s}");
        return;
    }

    for (i, line) in s.lines().enumerate() {
        let trimmed = line.trim_start();
        if i == 1 {
            println!("{}", line.bold().bright_blue());
        } else if trimmed.ends_with(DISABLED) {
            println!("{}", line.dimmed());
        } else if trimmed.starts_with("Build:") {
            println!("{}", line.dimmed());
        } else {
            println!("{line}");
        }
    }
}

fn build_time() -> String {
    let raw = option_env!("BUILD_TIME").unwrap_or("unknown");
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt
            .with_timezone(&Local)
            .format("%d.%m.%Y %H:%M:%S")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}
