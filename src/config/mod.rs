//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment
//!     → loader.rs (env_snapshot: capture known keys once)
//!     → validation.rs (required fields, numeric ports, fallback flag)
//!     → RegistrarConfig (validated, immutable)
//!     → handed to the lifecycle controller
//!
//! optional settings file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RegistrarSettings (dispatch budgets, observability)
//! ```
//!
//! # Design Decisions
//! - No component outside loader.rs reads the environment
//! - Config is immutable once validated; there is no reload
//! - All settings fields have defaults to allow a missing file

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::DispatchPolicy;
pub use schema::RawEnv;
pub use schema::RegistrarConfig;
pub use schema::RegistrarSettings;
pub use validation::ValidationError;
