//! Configuration schema definitions.
//!
//! Two kinds of configuration live here:
//! - `RegistrarConfig`: identity of the announced server and the registry
//!   address, taken from the process environment and validated once.
//! - `RegistrarSettings`: dispatch tuning, optionally read from a TOML file.
//!   Every field has a default so an absent file is a valid configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Environment key for the registry host.
pub const PROXY_IP: &str = "PROXY_IP";
/// Environment key for the registry port.
pub const PROXY_PORT: &str = "PROXY_PORT";
/// Environment key for the optional bearer credential.
pub const PROXY_KEY: &str = "PROXY_KEY";
/// Environment key for the announced server's name.
pub const SERVER_NAME: &str = "SERVER_NAME";
/// Environment key for the announced server's host.
pub const SERVER_IP: &str = "SERVER_IP";
/// Environment key for the announced server's port.
pub const SERVER_PORT: &str = "SERVER_PORT";
/// Environment key selecting the fallback registration endpoint.
pub const SERVER_TYPE_FALLBACK: &str = "SERVER_TYPE_FALLBACK";

/// Every environment key the registrar reads.
pub const ENV_KEYS: [&str; 7] = [
    PROXY_IP,
    PROXY_PORT,
    PROXY_KEY,
    SERVER_NAME,
    SERVER_IP,
    SERVER_PORT,
    SERVER_TYPE_FALLBACK,
];

/// Raw, unvalidated key-value inputs captured from the environment.
pub type RawEnv = HashMap<String, String>;

/// Validated registry and server identity.
///
/// Only `config::validation::validate_env` constructs this; a value of this
/// type always has every required field non-empty and both ports numeric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrarConfig {
    pub proxy_host: String,
    pub proxy_port: String,
    /// Bearer credential. `None` means requests go out unauthenticated.
    pub proxy_key: Option<String>,
    pub server_name: String,
    pub server_host: String,
    pub server_port: String,
    /// Register through `/api/register-fallback` instead of `/api/register`.
    pub is_fallback: bool,
}

/// Root tuning settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistrarSettings {
    /// Retry budget for the startup registration.
    pub register: DispatchPolicy,

    /// Retry budget for the shutdown unregistration.
    pub unregister: DispatchPolicy,

    /// Fixed delay between attempts in milliseconds.
    pub retry_delay_ms: u64,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Settings for the bundled host binary.
    pub host: HostConfig,
}

impl Default for RegistrarSettings {
    fn default() -> Self {
        Self {
            register: DispatchPolicy::register(),
            unregister: DispatchPolicy::unregister(),
            retry_delay_ms: 300,
            observability: ObservabilityConfig::default(),
            host: HostConfig::default(),
        }
    }
}

/// Attempt budget and per-attempt timeout for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct DispatchPolicy {
    /// Maximum attempts (clamped to at least 1 at dispatch time).
    pub max_attempts: u32,

    /// Per-attempt timeout in seconds, covering connect and body read.
    pub timeout_secs: u64,
}

impl DispatchPolicy {
    pub const fn register() -> Self {
        Self {
            max_attempts: 2,
            timeout_secs: 5,
        }
    }

    pub const fn unregister() -> Self {
        Self {
            max_attempts: 1,
            timeout_secs: 3,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Host binary configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HostConfig {
    /// How long to wait for the unregister request before exiting.
    pub stop_deadline_secs: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            stop_deadline_secs: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_lifecycle_budgets() {
        let settings = RegistrarSettings::default();
        assert_eq!(settings.register.max_attempts, 2);
        assert_eq!(settings.register.timeout_secs, 5);
        assert_eq!(settings.unregister.max_attempts, 1);
        assert_eq!(settings.unregister.timeout_secs, 3);
        assert_eq!(settings.retry_delay_ms, 300);
        assert!(!settings.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: RegistrarSettings = toml::from_str(
            r#"
            retry_delay_ms = 50

            [unregister]
            max_attempts = 3
            timeout_secs = 1
            "#,
        )
        .unwrap();

        assert_eq!(settings.retry_delay_ms, 50);
        assert_eq!(settings.unregister, DispatchPolicy { max_attempts: 3, timeout_secs: 1 });
        assert_eq!(settings.register, DispatchPolicy::register());
        assert_eq!(settings.observability.log_level, "info");
    }
}
