//! Gradebook Configuration Management
//!
//! Handles configuration from environment variables and TOML files with
//! defaults for development. The JWT signing secret has no default: the
//! service refuses to start until one is provided.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Minimum signing secret length in bytes (256 bits for HS256)
pub const MIN_SECRET_LEN: usize = 32;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Database connection
    pub database: DatabaseConfig,

    /// Session token settings
    pub auth: AuthConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Demo data seeding
    pub seed: SeedConfig,
}

fn parse_env<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Server
        if let Ok(host) = std::env::var("API_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("API_PORT") {
            config.server.port = parse_env("API_PORT", port)?;
        }

        // PostgreSQL
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database.url = Some(url);
        }
        if let Ok(size) = std::env::var("DATABASE_POOL_SIZE") {
            config.database.pool_size = parse_env("DATABASE_POOL_SIZE", size)?;
        }

        // Session tokens
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            config.auth.jwt_secret = Some(secret);
        }
        if let Ok(issuer) = std::env::var("JWT_ISSUER") {
            config.auth.issuer = issuer;
        }
        if let Ok(ttl) = std::env::var("JWT_ACCESS_EXPIRATION_SECS") {
            config.auth.token_ttl_secs = parse_env("JWT_ACCESS_EXPIRATION_SECS", ttl)?;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(json) = std::env::var("LOG_JSON") {
            config.logging.json_format = parse_env("LOG_JSON", json)?;
        }

        // Seeding
        if let Ok(enabled) = std::env::var("SEED_DEMO_DATA") {
            config.seed.enabled = parse_env("SEED_DEMO_DATA", enabled)?;
        }
        if let Ok(password) = std::env::var("SEED_PASSWORD") {
            config.seed.password = Some(password);
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        Self::from_toml_str(&content).map_err(|message| ConfigError::ParseError { path, message })
    }

    fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;

        // Only override if env values differ from defaults
        if env_config.server.host != ServerConfig::default().host {
            self.server.host = env_config.server.host;
        }
        if env_config.server.port != ServerConfig::default().port {
            self.server.port = env_config.server.port;
        }
        if env_config.auth.issuer != AuthConfig::default().issuer {
            self.auth.issuer = env_config.auth.issuer;
        }
        if env_config.auth.token_ttl_secs != AuthConfig::default().token_ttl_secs {
            self.auth.token_ttl_secs = env_config.auth.token_ttl_secs;
        }
        if env_config.logging.level != LoggingConfig::default().level {
            self.logging.level = env_config.logging.level;
        }
        if env_config.logging.json_format {
            self.logging.json_format = true;
        }
        if env_config.seed.enabled {
            self.seed.enabled = true;
        }

        // Always use env for sensitive values
        if env_config.database.url.is_some() {
            self.database.url = env_config.database.url;
        }
        if env_config.auth.jwt_secret.is_some() {
            self.auth.jwt_secret = env_config.auth.jwt_secret;
        }
        if env_config.seed.password.is_some() {
            self.seed.password = env_config.seed.password;
        }

        Ok(self)
    }

    /// Check startup preconditions
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.auth.validate()
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL; the in-memory store is used when unset
    pub url: Option<String>,

    /// PostgreSQL connection pool size
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            pool_size: 10,
        }
    }
}

/// Session token configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC signing secret, required
    pub jwt_secret: Option<String>,

    /// Token issuer identifier
    pub issuer: String,

    /// Token lifetime in seconds (default: 86400 = 24 hours)
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            issuer: "gradebook-api".to_string(),
            token_ttl_secs: 24 * 60 * 60,
        }
    }
}

// Keeps the secret out of debug logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("issuer", &self.issuer)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

impl AuthConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let secret = self
            .jwt_secret
            .as_deref()
            .ok_or_else(|| ConfigError::MissingRequired("JWT_SECRET".to_string()))?;

        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::InvalidValue {
                key: "JWT_SECRET".to_string(),
                value: format!("<{} bytes, need at least {MIN_SECRET_LEN}>", secret.len()),
            });
        }

        if self.token_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "JWT_ACCESS_EXPIRATION_SECS".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Demo data seeding
#[derive(Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SeedConfig {
    /// Seed demo users and records into an empty store
    pub enabled: bool,

    /// Password given to every demo user
    pub password: Option<String>,
}

impl std::fmt::Debug for SeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedConfig")
            .field("enabled", &self.enabled)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.token_ttl_secs, 86_400);
        assert!(config.database.url.is_none());
        assert!(!config.seed.enabled);
    }

    #[test]
    fn test_missing_secret_fails_validation() {
        let config = AppConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired(key)) if key == "JWT_SECRET"
        ));
    }

    #[test]
    fn test_short_secret_fails_validation() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = Some("secret_key".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_zero_ttl_fails_validation() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = Some(SECRET.to_string());
        config.auth.token_ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_secret_passes() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = Some(SECRET.to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_secret_redacted_in_debug() {
        let auth = AuthConfig {
            jwt_secret: Some(SECRET.to_string()),
            ..Default::default()
        };
        let rendered = format!("{auth:?}");
        assert!(!rendered.contains(SECRET));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_parse_toml() {
        let config = AppConfig::from_toml_str(
            r#"
            [server]
            port = 9090

            [auth]
            issuer = "registrar"
            token_ttl_secs = 3600

            [seed]
            enabled = true
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.auth.issuer, "registrar");
        assert_eq!(config.auth.token_ttl_secs, 3600);
        assert!(config.auth.jwt_secret.is_none());
        assert!(config.seed.enabled);
    }

    #[test]
    fn test_missing_file() {
        let result = AppConfig::from_file("/nonexistent/gradebook.toml");
        assert!(matches!(result, Err(ConfigError::FileReadError { .. })));
    }
}
