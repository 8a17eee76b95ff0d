//! Configuration system for licensor.
//!
//! Configuration is loaded from multiple sources with the following precedence:
//! 1. Environment variables (highest priority)
//! 2. `licensor.toml` file (or the file named by `LICENSOR_CONFIG`)
//! 3. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! - `LICENSOR_CONFIG` - Path to a config file (must exist when set)
//! - `LICENSOR_SERVER_HOST` - Server bind address
//! - `LICENSOR_SERVER_PORT` - Server port
//! - `LICENSOR_PRIVATE_KEY_ENV` - Name of the variable holding the PEM private key
//! - `LICENSOR_PRIVATE_KEY_PATH` - Path to a PEM private key file
//! - `LICENSOR_PUBLIC_KEY_PATH` - Path to a PEM public key file (verify-only)
//! - `LICENSOR_REQUIRE_SIGNING_KEY` - Fail startup without a private key
//! - `LICENSOR_MIN_KEY_BITS` - Minimum accepted RSA modulus size
//! - `LICENSOR_LOGGING_ENABLED` - Enable log output
//! - `LICENSOR_LOG_LEVEL` - Log level (trace, debug, info, warn, error)
//! - `LICENSOR_ADMIN_TOKEN` - Bearer token required to issue licenses over HTTP
//!
//! The private key itself is read from the variable named by
//! `keys.private_key_env`, `LICENSOR_PRIVATE_KEY` by default.

use config::Config;
use serde::Deserialize;
use std::env;
use std::sync::OnceLock;

use crate::errors::{LicenseError, LicenseResult};

/// Global configuration singleton.
static CONFIG: OnceLock<LicensorConfig> = OnceLock::new();

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "LICENSOR_CONFIG";

/// Default environment variable holding the PEM private key.
pub const DEFAULT_PRIVATE_KEY_ENV: &str = "LICENSOR_PRIVATE_KEY";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LicensorConfig {
    pub server: ServerConfig,
    pub keys: KeysConfig,
    pub logging: LoggingConfig,
    pub admin: AdminConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Signing and verification key sources.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    /// Environment variable holding the PEM private key
    pub private_key_env: String,
    /// PEM private key file, used when the environment variable is unset
    pub private_key_path: Option<String>,
    /// PEM public key file for verify-only deployments
    pub public_key_path: Option<String>,
    /// Refuse to start without a private key
    pub require_signing_key: bool,
    /// Minimum RSA modulus size in bits
    pub min_key_bits: usize,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            private_key_env: DEFAULT_PRIVATE_KEY_ENV.to_string(),
            private_key_path: None,
            public_key_path: None,
            require_signing_key: true,
            min_key_bits: 2048,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Enable logging
    pub enabled: bool,
    /// Log level: trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
        }
    }
}

/// Operator access to the issuance endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Bearer token for `POST /api/v1/licenses`; issuance over HTTP is
    /// disabled while empty
    pub api_token: String,
}

fn config_err(e: config::ConfigError) -> LicenseError {
    LicenseError::ConfigError(e.to_string())
}

impl LicensorConfig {
    /// Load configuration from file and environment.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file (optional unless `LICENSOR_CONFIG` is set)
    /// 3. Environment variables
    pub fn load() -> LicenseResult<Self> {
        let file = match env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.is_empty() => config::File::with_name(&path).required(true),
            _ => config::File::with_name("licensor").required(false),
        };

        let builder = Config::builder()
            .set_default("server.host", "127.0.0.1")
            .map_err(config_err)?
            .set_default("server.port", 8080)
            .map_err(config_err)?
            .set_default("keys.private_key_env", DEFAULT_PRIVATE_KEY_ENV)
            .map_err(config_err)?
            .set_default("keys.require_signing_key", true)
            .map_err(config_err)?
            .set_default("keys.min_key_bits", 2048)
            .map_err(config_err)?
            .set_default("logging.enabled", true)
            .map_err(config_err)?
            .set_default("logging.level", "info")
            .map_err(config_err)?
            .set_default("admin.api_token", "")
            .map_err(config_err)?
            .add_source(file)
            .set_override_option("server.host", env::var("LICENSOR_SERVER_HOST").ok())
            .map_err(config_err)?
            .set_override_option(
                "server.port",
                env::var("LICENSOR_SERVER_PORT")
                    .ok()
                    .and_then(|v| v.parse::<i64>().ok()),
            )
            .map_err(config_err)?
            .set_override_option(
                "keys.private_key_env",
                env::var("LICENSOR_PRIVATE_KEY_ENV").ok(),
            )
            .map_err(config_err)?
            .set_override_option(
                "keys.private_key_path",
                env::var("LICENSOR_PRIVATE_KEY_PATH").ok(),
            )
            .map_err(config_err)?
            .set_override_option(
                "keys.public_key_path",
                env::var("LICENSOR_PUBLIC_KEY_PATH").ok(),
            )
            .map_err(config_err)?
            .set_override_option(
                "keys.require_signing_key",
                env::var("LICENSOR_REQUIRE_SIGNING_KEY")
                    .ok()
                    .and_then(|v| v.parse::<bool>().ok()),
            )
            .map_err(config_err)?
            .set_override_option(
                "keys.min_key_bits",
                env::var("LICENSOR_MIN_KEY_BITS")
                    .ok()
                    .and_then(|v| v.parse::<i64>().ok()),
            )
            .map_err(config_err)?
            .set_override_option(
                "logging.enabled",
                env::var("LICENSOR_LOGGING_ENABLED")
                    .ok()
                    .and_then(|v| v.parse::<bool>().ok()),
            )
            .map_err(config_err)?
            .set_override_option("logging.level", env::var("LICENSOR_LOG_LEVEL").ok())
            .map_err(config_err)?
            .set_override_option("admin.api_token", env::var("LICENSOR_ADMIN_TOKEN").ok())
            .map_err(config_err)?;

        let settings = builder
            .build()
            .map_err(|e| LicenseError::ConfigError(format!("failed to build config: {e}")))?;

        settings
            .try_deserialize()
            .map_err(|e| LicenseError::ConfigError(format!("failed to deserialize config: {e}")))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> LicenseResult<()> {
        if self.server.port == 0 {
            return Err(LicenseError::ConfigError(
                "server.port must be greater than 0".to_string(),
            ));
        }

        if self.keys.min_key_bits < 1024 {
            return Err(LicenseError::ConfigError(format!(
                "keys.min_key_bits must be at least 1024, got {}",
                self.keys.min_key_bits
            )));
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(LicenseError::ConfigError(format!(
                    "logging.level must be one of: trace, debug, info, warn, error. Got '{other}'"
                )));
            }
        }

        Ok(())
    }
}

/// Get the global configuration.
///
/// This loads the configuration on first access and caches it.
/// Returns an error if configuration loading or validation fails.
pub fn get_config() -> LicenseResult<&'static LicensorConfig> {
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }

    let config = LicensorConfig::load()?;
    config.validate()?;

    // Another thread may have won the race; either value is valid.
    let _ = CONFIG.set(config);

    CONFIG
        .get()
        .ok_or_else(|| LicenseError::ConfigError("configuration not initialised".to_string()))
}

/// Initialize configuration explicitly.
///
/// Call this early in your application to catch configuration errors.
pub fn init_config() -> LicenseResult<&'static LicensorConfig> {
    get_config()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = LicensorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.keys.private_key_env, DEFAULT_PRIVATE_KEY_ENV);
        assert!(config.keys.require_signing_key);
        assert_eq!(config.keys.min_key_bits, 2048);
        assert!(config.admin.api_token.is_empty());
    }

    #[test]
    fn rejects_zero_port() {
        let mut config = LicensorConfig::default();
        config.server.port = 0;
        assert!(matches!(
            config.validate(),
            Err(LicenseError::ConfigError(_))
        ));
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut config = LicensorConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "DEBUG".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_tiny_key_floor() {
        let mut config = LicensorConfig::default();
        config.keys.min_key_bits = 512;
        assert!(config.validate().is_err());
    }
}
