//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `system` - HTTP server address, middleware switches, shutdown
//! - `logging` - Log level, format and optional file sink
//! - `cache` - Token ledger backend (Redis or in-memory)
//! - `auth` - JWT token-pair settings and login accounts
//! - `cors` - Cross-origin policy
//!
//! Configuration is read from a YAML file and then overlaid with environment
//! variables prefixed `KEYSTONE__`, using `__` as the nesting separator
//! (`KEYSTONE__JWT__ACCESS_SECRET` sets `jwt.access_secret`).

pub mod auth;
pub mod cache;
pub mod cors;
pub mod logging;
pub mod system;

use std::collections::HashMap;
use std::path::Path;

use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::{AuthConfig, JwtConfig, OldAccessTokenPolicy, UserCredential};
pub use cache::{CacheBackend, CacheConfig};
pub use cors::CorsConfig;
pub use logging::{FileLoggingConfig, LogFormat, LoggingConfig};
pub use system::SystemConfig;

/// Config file used when none is given on the command line
pub const DEFAULT_CONFIG_FILE: &str = "config/app_config.yaml";

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "KEYSTONE";

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub system: SystemConfig,
    pub log: LoggingConfig,
    pub cache: CacheConfig,
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
    pub auth: AuthConfig,

    /// Error catalog overrides keyed by numeric code
    pub messages: HashMap<String, String>,
}

impl AppConfig {
    /// Load configuration from `path` (or [`DEFAULT_CONFIG_FILE`]) plus
    /// environment overrides.
    ///
    /// An explicitly given file must exist; the default file is optional so a
    /// fully environment-driven deployment works without one.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (file, required) = match path {
            Some(path) => (path.to_string_lossy().into_owned(), true),
            None => (DEFAULT_CONFIG_FILE.to_string(), false),
        };

        let settings = Config::builder()
            .add_source(File::new(&file, FileFormat::Yaml).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from YAML text, without environment overrides
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.jwt.validate().map_err(ConfigError::Invalid)?;
        self.message_overrides()?;
        Ok(())
    }

    /// Catalog overrides with their codes parsed
    pub fn message_overrides(&self) -> Result<HashMap<u32, String>, ConfigError> {
        self.messages
            .iter()
            .map(|(code, message)| {
                code.trim()
                    .parse::<u32>()
                    .map(|code| (code, message.clone()))
                    .map_err(|_| {
                        ConfigError::Invalid(format!("messages key '{}' is not a numeric code", code))
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
system:
  debug_mode: true
  server_address: "127.0.0.1:9000"
  enable_gzip: false
log:
  level: debug
  format: json
  file:
    directory: /var/log/keystone
cache:
  backend: memory
jwt:
  access_secret: test_access_secret
  refresh_secret: test_refresh_secret
  refresh_delay_minutes: 5
  access_validity_minutes: 10
  application_name: TestApp
  old_access_token_policy:
    grace: 30
auth:
  users:
    - username: alice
      password_hash: "$2b$04$abcdefghijklmnopqrstuu"
messages:
  "40105": "No token"
"#;

    #[test]
    fn test_from_yaml_str() {
        let config = AppConfig::from_yaml_str(SAMPLE).unwrap();

        assert!(config.system.debug_mode);
        assert_eq!(config.system.server_address, "127.0.0.1:9000");
        assert!(!config.system.enable_gzip);
        assert!(config.system.enable_cors);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(
            config.log.file.as_ref().unwrap().file_name_prefix,
            "keystone"
        );
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.jwt.application_name, "TestApp");
        assert_eq!(config.jwt.refresh_delay_minutes, 5);
        assert_eq!(config.jwt.old_access_token_policy, OldAccessTokenPolicy::Grace(30));
        assert_eq!(config.auth.users.len(), 1);
        assert_eq!(config.auth.users[0].username, "alice");

        let overrides = config.message_overrides().unwrap();
        assert_eq!(overrides.get(&40105).map(String::as_str), Some("No token"));
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = AppConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config.system.server_address, "0.0.0.0:7086");
        assert_eq!(config.jwt.access_validity_minutes, 30);
        assert_eq!(config.cache.backend, CacheBackend::Redis);
    }

    #[test]
    fn test_invalid_jwt_rejected() {
        let yaml = "jwt:\n  access_secret: same\n  refresh_secret: same\n";
        assert!(matches!(
            AppConfig::from_yaml_str(yaml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_non_numeric_message_key_rejected() {
        let yaml = "messages:\n  oops: \"text\"\n";
        assert!(AppConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let result = AppConfig::load(Some(Path::new("does/not/exist.yaml")));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_environment_override() {
        std::env::set_var("KEYSTONE__JWT__APPLICATION_NAME", "from-env");
        let config = AppConfig::load(None).unwrap();
        std::env::remove_var("KEYSTONE__JWT__APPLICATION_NAME");

        assert_eq!(config.jwt.application_name, "from-env");
    }
}
