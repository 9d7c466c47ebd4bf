//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Start (controller.rs::on_start):
//!     Validate env → Publish config → Build register request → Spawn dispatch
//!
//! Stop (controller.rs::on_stop):
//!     Started? → Build unregister request → Spawn dispatch
//!
//! Host binary (startup.rs, signals.rs):
//!     Load settings → Init observability → on_start
//!     SIGTERM/SIGINT → on_stop → bounded wait → trigger shutdown.rs
//! ```
//!
//! # Design Decisions
//! - Entry points never block on network I/O
//! - Invalid configuration disables registration for the process lifetime
//! - Unregister is best-effort; the host decides how long to wait

pub mod controller;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use controller::{DispatchHandle, LifecycleController, LifecycleState};
pub use shutdown::Shutdown;
