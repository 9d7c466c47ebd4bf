//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! RequestDescriptor to registry:
//!     → timeouts.rs (deadline per attempt: connect + body read)
//!     → On failure: retries.rs (retry within budget)
//!     → backoff.rs (fixed wait before the next attempt)
//!     → DispatchOutcome
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every attempt has a deadline
//! - Budgets are small (1-2 attempts), so backoff does not grow
//! - A triggered shutdown aborts the current attempt or wait

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::{AttemptError, DispatchOutcome, Dispatcher};
