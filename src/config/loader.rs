//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{RawEnv, RegistrarSettings, ENV_KEYS};
use crate::config::validation::{validate_settings, SettingsError};

/// Error type for settings loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Invalid(Vec<SettingsError>),
}

fn join_errors(errors: &[SettingsError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate tuning settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<RegistrarSettings, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_settings(&content)
}

/// Parse and validate tuning settings from TOML text.
pub fn parse_settings(content: &str) -> Result<RegistrarSettings, ConfigError> {
    let settings: RegistrarSettings = toml::from_str(content)?;
    validate_settings(&settings).map_err(ConfigError::Invalid)?;
    Ok(settings)
}

/// Capture the registrar's environment keys from the current process.
///
/// This is the only place the process environment is read. Unset keys and
/// keys holding non-UTF-8 data are left out of the snapshot.
pub fn env_snapshot() -> RawEnv {
    ENV_KEYS
        .iter()
        .filter_map(|key| std::env::var(key).ok().map(|v| (key.to_string(), v)))
        .collect()
}
