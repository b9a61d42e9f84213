//! JWT token generation and validation
//!
//! Implements session tokens with HMAC-SHA256 signing. Tokens carry the
//! subject user id, the user's role and an expiry; they are self-contained
//! and never persisted.

use chrono::{DateTime, Utc};
use gradebook_core::{AuthConfig, ConfigError, RecordId, Role};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT Claims structure
///
/// Decoded into concrete types so that handlers never inspect untyped
/// claim values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Token issuer
    pub iss: String,
    /// Subject - user ID
    pub sub: RecordId,
    /// User's role
    pub role: Role,
    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
    /// Expiration timestamp (Unix epoch)
    pub exp: u64,
}

/// JWT token generation and validation errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode JWT: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid token format")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Invalid token signature")]
    InvalidSignature,
}

/// JWT Configuration
///
/// Built once at startup from [`AuthConfig`]. There is no default secret.
#[derive(Clone)]
pub struct JwtConfig {
    secret: String,
    /// Access token expiration time in seconds
    pub access_expiration_secs: u64,
    /// Token issuer identifier
    pub issuer: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_expiration_secs", &self.access_expiration_secs)
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl JwtConfig {
    /// Create a configuration with the default issuer and a 24 hour lifetime
    pub fn new(secret: impl Into<String>) -> Self {
        let defaults = AuthConfig::default();
        Self {
            secret: secret.into(),
            access_expiration_secs: defaults.token_ttl_secs,
            issuer: defaults.issuer,
        }
    }

    /// Build from validated application configuration
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let secret = config
            .jwt_secret
            .clone()
            .ok_or_else(|| ConfigError::MissingRequired("JWT_SECRET".to_string()))?;

        Ok(Self {
            secret,
            access_expiration_secs: config.token_ttl_secs,
            issuer: config.issuer.clone(),
        })
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.secret.as_bytes())
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.secret.as_bytes())
    }
}

fn unix_seconds(time: DateTime<Utc>) -> u64 {
    u64::try_from(time.timestamp()).unwrap_or(0)
}

/// Generate a session token for an authenticated user
///
/// # Arguments
///
/// * `config` - JWT configuration containing secret and expiration settings
/// * `user_id` - Subject user id
/// * `role` - Subject role
/// * `now` - Issuance time; the token expires `access_expiration_secs` later
///
/// # Example
///
/// ```no_run
/// use chrono::Utc;
/// use gradebook_api::auth::jwt::{generate_access_token, JwtConfig};
/// use gradebook_core::Role;
///
/// let config = JwtConfig::new("a-secret-that-is-at-least-32-bytes!!");
/// let token = generate_access_token(&config, 3, Role::Student, Utc::now())
///     .expect("Failed to generate token");
/// ```
pub fn generate_access_token(
    config: &JwtConfig,
    user_id: RecordId,
    role: Role,
    now: DateTime<Utc>,
) -> Result<String, JwtError> {
    let iat = unix_seconds(now);

    let claims = Claims {
        iss: config.issuer.clone(),
        sub: user_id,
        role,
        iat,
        exp: iat + config.access_expiration_secs,
    };

    let token = encode(&Header::new(Algorithm::HS256), &claims, &config.encoding_key())?;

    Ok(token)
}

/// Validate a session token and extract claims
///
/// Expiry is checked without leeway.
pub fn validate_access_token(config: &JwtConfig, token: &str) -> Result<Claims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &config.decoding_key(), &validation).map_err(|e| {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
            jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidSignature,
            _ => JwtError::InvalidToken,
        }
    })?;

    Ok(token_data.claims)
}
