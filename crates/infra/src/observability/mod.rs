//! Tracing subscriber setup

use adoptly_domain::{LogFormat, LoggingConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global fmt subscriber
///
/// `RUST_LOG` wins over `config.filter`. Returns `false` if a global
/// subscriber was already installed, so calling this twice is harmless.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (json, plain) = match config.format {
        LogFormat::Json => (Some(fmt::layer().json().with_target(true)), None),
        LogFormat::Plain => (None, Some(fmt::layer().with_target(true))),
    };

    tracing_subscriber::registry().with(filter).with(json).with(plain).try_init().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        let config = LoggingConfig { format: LogFormat::Json, filter: "adoptly=debug".into() };

        init_tracing(&config);
        assert!(!init_tracing(&config));
        assert!(!init_tracing(&LoggingConfig::default()));
    }

    #[test]
    fn test_bad_filter_does_not_panic() {
        let config = LoggingConfig { format: LogFormat::Plain, filter: "adoptly=[".into() };
        init_tracing(&config);
    }
}
