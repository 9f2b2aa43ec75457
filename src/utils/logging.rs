use clap::ValueEnum;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::settings::{LogFormat, LoggingConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    TRACE,
    DEBUG,
    INFO,
    WARN,
    ERROR,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match *self {
            LogLevel::TRACE => "trace",
            LogLevel::DEBUG => "debug",
            LogLevel::INFO => "info",
            LogLevel::WARN => "warn",
            LogLevel::ERROR => "error",
        }
    }
}

/// Command-line level wins over the configured one.
pub fn effective_config(configured: &LoggingConfig, arg_log_level: Option<LogLevel>) -> LoggingConfig {
    LoggingConfig::new(
        arg_log_level
            .map(|level| level.as_str().to_string())
            .unwrap_or_else(|| configured.level.to_owned()),
        configured.format.to_owned(),
    )
}

/// Initialize tracing with the desired config.
pub fn init_logging(cfg: &LoggingConfig) {
    let env_filter = EnvFilter::try_new(&cfg.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match cfg.format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_timer(UtcTime::rfc_3339())
                .flatten_event(true)
                .with_ansi(false);

            let _ = registry.with(layer).try_init();
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_timer(UtcTime::rfc_3339())
                .with_ansi(true);

            let _ = registry.with(layer).try_init();
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_level_overrides_config() {
        let configured = LoggingConfig::new("warn".into(), LogFormat::Json);
        let effective = effective_config(&configured, Some(LogLevel::DEBUG));
        assert_eq!(effective.level, "debug");
        assert_eq!(effective.format, LogFormat::Json);

        assert_eq!(effective_config(&configured, None).level, "warn");
    }
}
