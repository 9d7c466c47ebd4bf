//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for the host binary
//! - Define the leveled sink the lifecycle reports through
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level
//! - Embedding hosts supply their own `LogSink`; `TracingSink` is the default

use std::fmt;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Severity accepted by a `LogSink`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Severe,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Severe => "severe",
        };
        f.write_str(s)
    }
}

/// Destination for the registrar's leveled messages.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

/// Forwards messages to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!("{}", message),
            LogLevel::Info => tracing::info!("{}", message),
            LogLevel::Warning => tracing::warn!("{}", message),
            LogLevel::Severe => tracing::error!("{}", message),
        }
    }
}

/// Install the global subscriber.
///
/// Falls back to `proxy_registrar=<level>` when `RUST_LOG` is unset or
/// unparseable. Errors if a global subscriber is already installed.
pub fn init_logging(level: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("proxy_registrar={}", level.trim()).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Severe > LogLevel::Warning);
        assert!(LogLevel::Warning > LogLevel::Info);
        assert!(LogLevel::Info > LogLevel::Debug);
        assert_eq!(LogLevel::Severe.to_string(), "severe");
    }

    #[test]
    fn test_tracing_sink_without_subscriber() {
        // No subscriber installed: events are dropped, never panic.
        let sink = TracingSink;
        for level in [LogLevel::Debug, LogLevel::Info, LogLevel::Warning, LogLevel::Severe] {
            sink.log(level, "message");
        }
    }
}
