//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! lifecycle + resilience produce:
//!     → logging.rs (LogSink messages, tracing spans/events)
//!     → metrics.rs (attempt and dispatch counters)
//!
//! Consumers:
//!     → Host log pipeline (through LogSink)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{LogLevel, LogSink, TracingSink};
