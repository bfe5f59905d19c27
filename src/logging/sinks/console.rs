use std::io::{self, Stdout};

use atty::Stream;
use tracing_subscriber::{registry::LookupSpan, Layer};

use crate::logging::{config::LoggingConfig, formatter};

/// Консольный слой: stdout, цвета только если stdout является терминалом.
pub fn layer<S>(config: &LoggingConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let with_ansi = config.with_ansi && atty::is(Stream::Stdout);
    let writer: fn() -> Stdout = io::stdout;

    formatter::build_formatter(config.format, writer, with_ansi, config.with_target)
}
