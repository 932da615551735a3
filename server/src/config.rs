//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! Identity service:
//! - `PULSE_USERS_SECRET`: token signing secret (required, non-empty)
//! - `PULSE_USERS_LISTEN_PORT`: listen port (default: `8080`)
//! - `PULSE_STORE_TIMEOUT_MS`: per-operation store timeout (default: `5000`)
//!
//! Todo service:
//! - `PULSE_USERS_BASE_URL`: base URL of the identity service (required)
//! - `PULSE_TODOS_LISTEN_PORT`: listen port (default: `8081`)
//! - `PULSE_VERIFY_TIMEOUT_MS`: timeout of one verification call (default: `5000`)
//! - `PULSE_STORE_TIMEOUT_MS`: per-operation store timeout (default: `5000`)
//!
//! # Invariants
//!
//! - The signing secret is never empty and never printed by `Debug`.
//! - Timeouts are always non-zero.
//! - `users_base_url` always starts with `http://` or `https://` and has no
//!   trailing slash.

use std::time::Duration;

use crate::auth::SigningSecret;
use crate::store::DEFAULT_STORE_TIMEOUT;
use crate::verification::DEFAULT_VERIFY_TIMEOUT;

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// An environment variable has an invalid value.
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
}

pub const USERS_SECRET: &str = "PULSE_USERS_SECRET";
pub const USERS_LISTEN_PORT: &str = "PULSE_USERS_LISTEN_PORT";
pub const STORE_TIMEOUT_MS: &str = "PULSE_STORE_TIMEOUT_MS";
pub const USERS_BASE_URL: &str = "PULSE_USERS_BASE_URL";
pub const TODOS_LISTEN_PORT: &str = "PULSE_TODOS_LISTEN_PORT";
pub const VERIFY_TIMEOUT_MS: &str = "PULSE_VERIFY_TIMEOUT_MS";

/// Identity service configuration.
///
/// # Post-conditions
///
/// - `secret` is non-empty.
/// - `store_timeout` is non-zero.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub secret: SigningSecret,
    pub listen_port: u16,
    pub store_timeout: Duration,
}

impl IdentityConfig {
    pub const DEFAULT_PORT: u16 = 8080;

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `PULSE_USERS_SECRET` is missing or empty, or if an
    /// optional variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// See [`IdentityConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_secret = required(&lookup, USERS_SECRET)?;
        let secret = SigningSecret::new(raw_secret)
            .map_err(|_| invalid(USERS_SECRET, "must not be empty"))?;

        Ok(Self {
            secret,
            listen_port: port(&lookup, USERS_LISTEN_PORT, Self::DEFAULT_PORT)?,
            store_timeout: millis(&lookup, STORE_TIMEOUT_MS, DEFAULT_STORE_TIMEOUT)?,
        })
    }
}

/// Todo service configuration.
///
/// # Post-conditions
///
/// - `users_base_url` is an absolute http(s) URL without a trailing slash.
/// - Both timeouts are non-zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoConfig {
    pub users_base_url: String,
    pub listen_port: u16,
    pub verify_timeout: Duration,
    pub store_timeout: Duration,
}

impl TodoConfig {
    pub const DEFAULT_PORT: u16 = 8081;

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `PULSE_USERS_BASE_URL` is missing or not an
    /// http(s) URL, or if an optional variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`TodoConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = required(&lookup, USERS_BASE_URL)?;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(invalid(
                USERS_BASE_URL,
                &format!("'{base_url}' is not an http(s) URL"),
            ));
        }

        Ok(Self {
            users_base_url: base_url.trim_end_matches('/').to_string(),
            listen_port: port(&lookup, TODOS_LISTEN_PORT, Self::DEFAULT_PORT)?,
            verify_timeout: millis(&lookup, VERIFY_TIMEOUT_MS, DEFAULT_VERIFY_TIMEOUT)?,
            store_timeout: millis(&lookup, STORE_TIMEOUT_MS, DEFAULT_STORE_TIMEOUT)?,
        })
    }
}

fn invalid(name: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        message: message.to_string(),
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<String, ConfigError> {
    let value = lookup(name).ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))?;
    if value.is_empty() {
        return Err(invalid(name, "must not be empty"));
    }
    Ok(value)
}

fn port(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u16,
) -> Result<u16, ConfigError> {
    match lookup(name) {
        Some(value) => match value.parse::<u16>() {
            Ok(port) if port > 0 => Ok(port),
            _ => Err(invalid(
                name,
                &format!("'{value}' is not a valid port number (must be 1-65535)"),
            )),
        },
        None => Ok(default),
    }
}

fn millis(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match lookup(name) {
        Some(value) => match value.parse::<u64>() {
            Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
            _ => Err(invalid(
                name,
                &format!("'{value}' is not a positive number of milliseconds"),
            )),
        },
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_identity_defaults() {
        let config =
            IdentityConfig::from_lookup(env(&[(USERS_SECRET, "s3cret")])).expect("valid");

        assert_eq!(config.listen_port, 8080);
        assert_eq!(config.store_timeout, DEFAULT_STORE_TIMEOUT);
    }

    #[test]
    fn test_identity_requires_secret() {
        assert_eq!(
            IdentityConfig::from_lookup(env(&[])).map(|_| ()),
            Err(ConfigError::MissingEnvVar(USERS_SECRET.to_string()))
        );
        assert!(matches!(
            IdentityConfig::from_lookup(env(&[(USERS_SECRET, "")])),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_identity_overrides() {
        let config = IdentityConfig::from_lookup(env(&[
            (USERS_SECRET, "s3cret"),
            (USERS_LISTEN_PORT, "9000"),
            (STORE_TIMEOUT_MS, "250"),
        ]))
        .expect("valid");

        assert_eq!(config.listen_port, 9000);
        assert_eq!(config.store_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_port_and_timeout() {
        for (name, value) in [
            (USERS_LISTEN_PORT, "0"),
            (USERS_LISTEN_PORT, "70000"),
            (USERS_LISTEN_PORT, "http"),
            (STORE_TIMEOUT_MS, "0"),
            (STORE_TIMEOUT_MS, "-5"),
        ] {
            let result =
                IdentityConfig::from_lookup(env(&[(USERS_SECRET, "s3cret"), (name, value)]));
            assert!(
                matches!(result, Err(ConfigError::InvalidValue { .. })),
                "{name}={value} must be rejected"
            );
        }
    }

    #[test]
    fn test_secret_is_not_printed() {
        let config = IdentityConfig::from_lookup(env(&[(USERS_SECRET, "hunter2-hunter2")]))
            .expect("valid");
        assert!(!format!("{config:?}").contains("hunter2"));
    }

    #[test]
    fn test_todo_config() {
        let config = TodoConfig::from_lookup(env(&[
            (USERS_BASE_URL, "http://users.internal:8080/"),
            (VERIFY_TIMEOUT_MS, "1500"),
        ]))
        .expect("valid");

        assert_eq!(
            config,
            TodoConfig {
                users_base_url: "http://users.internal:8080".to_string(),
                listen_port: 8081,
                verify_timeout: Duration::from_millis(1500),
                store_timeout: Duration::from_secs(5),
            }
        );
    }

    #[test]
    fn test_todo_timeouts_default_to_shared_constants() {
        let config = TodoConfig::from_lookup(env(&[(USERS_BASE_URL, "https://users.internal")]))
            .expect("valid");

        assert_eq!(config.verify_timeout, DEFAULT_VERIFY_TIMEOUT);
        assert_eq!(config.store_timeout, DEFAULT_STORE_TIMEOUT);
    }

    #[test]
    fn test_todo_config_requires_http_url() {
        assert_eq!(
            TodoConfig::from_lookup(env(&[])),
            Err(ConfigError::MissingEnvVar(USERS_BASE_URL.to_string()))
        );
        assert!(matches!(
            TodoConfig::from_lookup(env(&[(USERS_BASE_URL, "users.internal:8080")])),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::MissingEnvVar("TEST_VAR".to_string());
        assert_eq!(
            error.to_string(),
            "missing required environment variable: TEST_VAR"
        );

        let error = ConfigError::InvalidValue {
            name: "TEST_VAR".to_string(),
            message: "bad value".to_string(),
        };
        assert_eq!(error.to_string(), "invalid value for TEST_VAR: bad value");
    }
}
