use tracing_subscriber::EnvFilter;

use crate::logging::config::LoggingConfig;

/// Собирает фильтр: `RUST_LOG`, если задана, иначе `config.level`.
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    match EnvFilter::try_new(&config.level) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!(
                "Invalid log filter directive '{}': {e}; falling back to 'info'",
                config.level
            );
            EnvFilter::new("info")
        }
    }
}
