//! Configuration validation.
//!
//! # Responsibilities
//! - Turn the raw environment snapshot into a `RegistrarConfig`
//! - Check required fields and numeric ports
//! - Semantic checks on tuning settings (serde handles syntactic)
//!
//! # Design Decisions
//! - Returns every missing field in one error, not just the first
//! - Validation is a pure function of its input
//! - Boolean flags parse permissively; unknown values fall back to the default

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{
    RawEnv, RegistrarConfig, RegistrarSettings, PROXY_IP, PROXY_KEY, PROXY_PORT, SERVER_IP,
    SERVER_NAME, SERVER_PORT, SERVER_TYPE_FALLBACK,
};

/// Reasons an environment snapshot is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more required fields are absent or blank.
    #[error("Missing required env vars: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// A port field is not a base-10 integer.
    #[error("Invalid {field}: {value}")]
    InvalidPort { field: &'static str, value: String },
}

/// Semantic problems in `RegistrarSettings`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("{0}.timeout_secs must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("observability.log_level must not be empty")]
    EmptyLogLevel,

    #[error("observability.metrics_address is not a socket address: {0}")]
    InvalidMetricsAddress(String),
}

/// Validate the environment snapshot into a `RegistrarConfig`.
pub fn validate_env(raw: &RawEnv) -> Result<RegistrarConfig, ValidationError> {
    let proxy_host = lookup(raw, PROXY_IP);
    let proxy_port = lookup(raw, PROXY_PORT);
    let server_name = lookup(raw, SERVER_NAME);
    let server_host = lookup(raw, SERVER_IP);
    let server_port = lookup(raw, SERVER_PORT);

    let missing: Vec<&'static str> = [
        (PROXY_IP, &proxy_host),
        (PROXY_PORT, &proxy_port),
        (SERVER_NAME, &server_name),
        (SERVER_IP, &server_host),
        (SERVER_PORT, &server_port),
    ]
    .iter()
    .filter(|(_, value)| value.is_none())
    .map(|(key, _)| *key)
    .collect();

    // Each of these is `Some` once `missing` is empty.
    let (
        Some(proxy_host),
        Some(proxy_port),
        Some(server_name),
        Some(server_host),
        Some(server_port),
    ) = (proxy_host, proxy_port, server_name, server_host, server_port)
    else {
        return Err(ValidationError::MissingFields(missing));
    };

    check_port(PROXY_PORT, &proxy_port)?;
    check_port(SERVER_PORT, &server_port)?;

    Ok(RegistrarConfig {
        proxy_host,
        proxy_port,
        proxy_key: lookup(raw, PROXY_KEY),
        server_name,
        server_host,
        server_port,
        is_fallback: parse_flag(raw.get(SERVER_TYPE_FALLBACK).map(String::as_str), false),
    })
}

/// Permissive boolean parse.
///
/// | input (case-insensitive, trimmed) | result    |
/// |-----------------------------------|-----------|
/// | `true`, `1`, `yes`, `y`           | `true`    |
/// | `false`, `0`, `no`, `n`           | `false`   |
/// | anything else, or absent          | `default` |
pub fn parse_flag(value: Option<&str>, default: bool) -> bool {
    let Some(value) = value else {
        return default;
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => true,
        "false" | "0" | "no" | "n" => false,
        _ => default,
    }
}

/// Check tuning settings, collecting every problem.
pub fn validate_settings(settings: &RegistrarSettings) -> Result<(), Vec<SettingsError>> {
    let mut errors = Vec::new();

    if settings.register.timeout_secs == 0 {
        errors.push(SettingsError::ZeroTimeout("register"));
    }
    if settings.unregister.timeout_secs == 0 {
        errors.push(SettingsError::ZeroTimeout("unregister"));
    }
    if settings.observability.log_level.trim().is_empty() {
        errors.push(SettingsError::EmptyLogLevel);
    }
    if settings.observability.metrics_enabled
        && settings.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(SettingsError::InvalidMetricsAddress(
            settings.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Trimmed value for `key`; blank counts as absent.
fn lookup(raw: &RawEnv, key: &str) -> Option<String> {
    raw.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn check_port(field: &'static str, value: &str) -> Result<(), ValidationError> {
    value
        .parse::<i32>()
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidPort {
            field,
            value: value.to_string(),
        })
}
