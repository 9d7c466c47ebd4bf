//! Proxy registrar library.
//!
//! Announces a server instance to a registry proxy when the host starts and
//! withdraws it when the host stops.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::schema::{RegistrarConfig, RegistrarSettings};
pub use lifecycle::{LifecycleController, Shutdown};
pub use observability::{LogLevel, LogSink, TracingSink};
pub use resilience::{DispatchOutcome, Dispatcher};
