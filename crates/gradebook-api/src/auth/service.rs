//! Authentication service layer
//!
//! Exchanges email and password credentials for a session token. Credentials
//! are checked against the stored Argon2 hash only.

use super::jwt::{generate_access_token, JwtConfig};
use super::password::{verify_password, PasswordError};
use crate::audit::{audit_log, AuditEvent, ClientInfo};
use crate::error::AppError;
use chrono::{DateTime, Utc};
use gradebook_core::{RecordStore, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Token type reported in login responses
pub const TOKEN_TYPE: &str = "Bearer";

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "student@test.com")]
    pub email: String,
    pub password: String,
}

/// Successful login response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Signed session token
    pub token: String,
    /// Always "Bearer"
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Seconds until the token expires
    #[schema(example = 86400)]
    pub expires_in: u64,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn RecordStore>,
    jwt_config: JwtConfig,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(store: Arc<dyn RecordStore>, jwt_config: JwtConfig) -> Self {
        Self { store, jwt_config }
    }

    /// Login with email and password
    ///
    /// # Arguments
    ///
    /// * `request` - Login credentials
    /// * `client` - Caller metadata for the audit trail
    /// * `now` - Token issuance time
    ///
    /// # Returns
    ///
    /// * `Ok(LoginResponse)` - Session token for the user
    /// * `Err(AppError::InvalidCredentials)` - Unknown email or wrong password,
    ///   indistinguishable to the caller
    pub async fn login(
        &self,
        request: LoginRequest,
        client: ClientInfo,
        now: DateTime<Utc>,
    ) -> Result<LoginResponse, AppError> {
        let user = match self.store.find_user_by_email(&request.email).await? {
            Some(user) => user,
            None => {
                record_failure(&request.email, "unknown email", client);
                return Err(AppError::InvalidCredentials);
            }
        };

        if !self.check_password(&user, request.password).await? {
            record_failure(&request.email, "wrong password", client);
            return Err(AppError::InvalidCredentials);
        }

        let token = generate_access_token(&self.jwt_config, user.id, user.role, now)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {e}")))?;

        audit_log(&AuditEvent::LoginSuccess {
            user_id: user.id,
            role: user.role,
            ip_address: client.ip_address,
            user_agent: client.user_agent,
        });

        Ok(LoginResponse {
            token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: self.jwt_config.access_expiration_secs,
        })
    }

    /// Argon2 verification runs on the blocking pool
    async fn check_password(&self, user: &User, password: String) -> Result<bool, AppError> {
        let hash = user.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification task failed: {e}")))?;

        match verified {
            Ok(matches) => Ok(matches),
            Err(PasswordError::InvalidHashFormat) => {
                tracing::warn!(user_id = user.id, "Stored password is not a valid hash");
                Ok(false)
            }
            Err(e) => Err(AppError::Internal(e.to_string())),
        }
    }
}

fn record_failure(email: &str, reason: &str, client: ClientInfo) {
    audit_log(&AuditEvent::LoginFailure {
        email: email.to_string(),
        reason: reason.to_string(),
        ip_address: client.ip_address,
        user_agent: client.user_agent,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::validate_access_token;
    use crate::auth::password::{hash_password_with_config, PasswordConfig};
    use gradebook_core::{MemoryStore, NewUser, Role};

    const SECRET: &str = "service-test-secret-0123456789abcd";

    fn light_config() -> PasswordConfig {
        PasswordConfig {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
            output_len: Some(32),
        }
    }

    async fn service_with_user(password_hash: String) -> AuthService {
        let store = Arc::new(MemoryStore::new());
        store
            .create_user(NewUser::new(
                "Student",
                "student@test.com",
                password_hash,
                Role::Student,
            ))
            .await
            .unwrap();

        AuthService::new(store, JwtConfig::new(SECRET))
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_success() {
        let hash = hash_password_with_config("hunter22", &light_config()).unwrap();
        let service = service_with_user(hash).await;
        let now = Utc::now();

        let response = service
            .login(login("student@test.com", "hunter22"), ClientInfo::default(), now)
            .await
            .unwrap();

        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 86_400);

        let claims = validate_access_token(&JwtConfig::new(SECRET), &response.token).unwrap();
        assert_eq!(claims.sub, 1);
        assert_eq!(claims.role, Role::Student);
        assert_eq!(claims.exp, now.timestamp() as u64 + 86_400);
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let hash = hash_password_with_config("hunter22", &light_config()).unwrap();
        let service = service_with_user(hash).await;

        let result = service
            .login(login("nobody@test.com", "hunter22"), ClientInfo::default(), Utc::now())
            .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let hash = hash_password_with_config("hunter22", &light_config()).unwrap();
        let service = service_with_user(hash).await;

        let result = service
            .login(login("student@test.com", "hunter23"), ClientInfo::default(), Utc::now())
            .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_rejects_plaintext_stored_password() {
        let service = service_with_user("hunter22".to_string()).await;

        let result = service
            .login(login("student@test.com", "hunter22"), ClientInfo::default(), Utc::now())
            .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }
}
