//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! RegistrarConfig + RequestIntent
//!     → request.rs (endpoint path, query string, headers)
//!     → RequestDescriptor
//!     → resilience::retries (sent with retry budget)
//! ```

pub mod request;

pub use request::{build_request, RequestDescriptor, RequestIntent};
