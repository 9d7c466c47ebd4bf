//! Startup orchestration for the host binary.
//!
//! # Responsibilities
//! - Load and validate tuning settings
//! - Initialize logging, then metrics
//!
//! # Design Decisions
//! - Fail fast: a broken settings file is fatal to the host binary
//! - A missing `--settings` argument means defaults, not an error

use std::path::Path;

use crate::config::loader::{load_settings, ConfigError};
use crate::config::RegistrarSettings;
use crate::observability::logging::init_logging;
use crate::observability::metrics::init_metrics;

/// Settings from `path`, or defaults when no path is given.
pub fn resolve_settings(path: Option<&Path>) -> Result<RegistrarSettings, ConfigError> {
    match path {
        Some(path) => load_settings(path),
        None => Ok(RegistrarSettings::default()),
    }
}

/// Install logging (with an optional level override) and, if enabled, the
/// metrics exporter. Must run inside a tokio runtime.
pub fn init_observability(
    settings: &RegistrarSettings,
    level_override: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let level = level_override.unwrap_or(settings.observability.log_level.as_str());
    init_logging(level)?;

    if settings.observability.metrics_enabled {
        match settings.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %settings.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }
    Ok(())
}
