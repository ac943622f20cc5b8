//! Logging initialization.
//!
//! `RUST_LOG` wins when set. Otherwise the configured level applies to this
//! service while the browser driver and its websocket stack only report
//! warnings; at debug level they would log every DevTools frame.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

/// Crates whose output is capped at `warn` unless `RUST_LOG` says otherwise.
const NOISY_TARGETS: &[&str] = &[
    "chromiumoxide",
    "tungstenite",
    "async_tungstenite",
    "hyper",
    "h2",
];

/// Filter directives for the configured level.
pub fn filter_directives(level: &str) -> String {
    let level = match level.trim() {
        "" => "info",
        level => level,
    };
    let mut directives = level.to_string();
    for target in NOISY_TARGETS {
        directives.push_str(&format!(",{}=warn", target));
    }
    directives
}

/// Installs the global subscriber; json or pretty per `logging.format`.
pub fn init_logging(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(&config.level)));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.format == "json" {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_current_span(true)
                    .with_target(true),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_target(true),
            )
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directives_quiet_browser_driver() {
        let directives = filter_directives("debug");
        assert!(directives.starts_with("debug,"));
        assert!(directives.contains("chromiumoxide=warn"));
        assert!(directives.contains("tungstenite=warn"));
    }

    #[test]
    fn test_filter_directives_blank_level() {
        assert!(filter_directives("  ").starts_with("info,"));
    }
}
