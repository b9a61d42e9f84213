/// Session guard middleware for protecting routes
///
/// Every protected route runs an explicit, ordered [`GuardChain`] before its
/// handler. Each [`Guard`] either passes the request on with an augmented
/// [`RequestContext`] or short-circuits with an [`AuthError`]. On success the
/// [`AuthenticatedUser`] is added to request extensions for the handler.
use super::jwt::{validate_access_token, Claims, JwtConfig, JwtError};
use super::roles::{admit, Operation};
use crate::audit::{audit_log, AuditEvent, ClientInfo};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use gradebook_core::{RecordId, Role};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Authorization scheme prefix, exactly one space
pub const BEARER_PREFIX: &str = "Bearer ";

/// Authenticated user information extracted from a session token
///
/// Handlers extract it with `Extension<AuthenticatedUser>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// User's unique identifier
    pub user_id: RecordId,
    /// User's role
    pub role: Role,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
        }
    }
}

/// Session guard errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing token")]
    MissingToken,

    #[error("Invalid token format")]
    MalformedToken,

    #[error("Invalid or expired token: {0}")]
    InvalidOrExpiredToken(#[from] JwtError),

    #[error("Role {role} may not perform {operation}")]
    Forbidden {
        user_id: RecordId,
        role: Role,
        operation: Operation,
    },
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = match &self {
            AuthError::MissingToken => ApiError::new("MISSING_TOKEN", "Missing token"),
            AuthError::MalformedToken => ApiError::new("MALFORMED_TOKEN", "Invalid token format"),
            AuthError::InvalidOrExpiredToken(_) => {
                ApiError::new("INVALID_TOKEN", "Invalid or expired token")
            }
            AuthError::Forbidden { .. } => ApiError::forbidden(),
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Extract the token from an `Authorization` header value
///
/// The value must be `"Bearer "` followed by a single non-empty segment
/// with no whitespace.
pub fn extract_bearer_token(header_value: Option<&str>) -> Result<&str, AuthError> {
    let value = match header_value {
        None | Some("") => return Err(AuthError::MissingToken),
        Some(value) => value,
    };

    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::MalformedToken)?;

    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return Err(AuthError::MalformedToken);
    }

    Ok(token)
}

/// Validate the `Authorization` header and produce the caller's identity
pub fn authenticate(config: &JwtConfig, headers: &HeaderMap) -> Result<AuthenticatedUser, AuthError> {
    let header_value = match headers.get(header::AUTHORIZATION) {
        None => None,
        Some(value) => Some(value.to_str().map_err(|_| AuthError::MalformedToken)?),
    };

    let token = extract_bearer_token(header_value)?;
    let claims = validate_access_token(config, token)?;

    Ok(AuthenticatedUser::from(claims))
}

/// Request-scoped context threaded through a guard chain
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub user: Option<AuthenticatedUser>,
}

/// A single request guard
#[derive(Debug, Clone, Copy)]
pub enum Guard {
    /// Require a valid session token
    Authenticate,
    /// Require the authenticated role to be allowed for the operation
    RequireRole(Operation),
}

impl Guard {
    pub fn check(
        &self,
        config: &JwtConfig,
        headers: &HeaderMap,
        mut ctx: RequestContext,
    ) -> Result<RequestContext, AuthError> {
        match self {
            Guard::Authenticate => {
                ctx.user = Some(authenticate(config, headers)?);
                Ok(ctx)
            }
            Guard::RequireRole(operation) => {
                let user = ctx.user.ok_or(AuthError::MissingToken)?;
                if !admit(user.role, operation.allowed_roles()) {
                    return Err(AuthError::Forbidden {
                        user_id: user.user_id,
                        role: user.role,
                        operation: *operation,
                    });
                }
                Ok(ctx)
            }
        }
    }
}

/// Ordered list of guards run before a handler
#[derive(Debug, Clone, Default)]
pub struct GuardChain {
    guards: Vec<Guard>,
}

impl GuardChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a guard to the end of the chain
    pub fn then(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }

    /// Session validation followed by the role gate for `operation`
    pub fn for_operation(operation: Operation) -> Self {
        Self::new()
            .then(Guard::Authenticate)
            .then(Guard::RequireRole(operation))
    }

    /// Run every guard in order, stopping at the first rejection
    pub fn run(&self, config: &JwtConfig, headers: &HeaderMap) -> Result<RequestContext, AuthError> {
        self.guards
            .iter()
            .try_fold(RequestContext::default(), |ctx, guard| {
                guard.check(config, headers, ctx)
            })
    }
}

/// Guard chain bound to the application state, used as middleware state
#[derive(Clone)]
pub struct RoutePolicy {
    state: Arc<AppState>,
    chain: Arc<GuardChain>,
}

impl RoutePolicy {
    pub fn new(state: Arc<AppState>, chain: GuardChain) -> Self {
        Self {
            state,
            chain: Arc::new(chain),
        }
    }

    pub fn for_operation(state: Arc<AppState>, operation: Operation) -> Self {
        Self::new(state, GuardChain::for_operation(operation))
    }
}

/// Middleware enforcing a [`RoutePolicy`]
///
/// # Usage
///
/// ```ignore
/// use axum::{middleware, routing::post, Router};
///
/// let policy = RoutePolicy::for_operation(state.clone(), Operation::CreateCourse);
/// let app = Router::new().route(
///     "/courses",
///     post(create_course).route_layer(middleware::from_fn_with_state(policy, enforce)),
/// );
/// ```
pub async fn enforce(
    State(policy): State<RoutePolicy>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let ctx = match policy.chain.run(&policy.state.jwt, request.headers()) {
        Ok(ctx) => ctx,
        Err(err) => {
            record_rejection(&err, request.headers());
            return Err(err);
        }
    };

    if let Some(user) = ctx.user {
        request.extensions_mut().insert(user);
    }

    Ok(next.run(request).await)
}

fn record_rejection(err: &AuthError, headers: &HeaderMap) {
    let ClientInfo {
        ip_address,
        user_agent,
    } = ClientInfo::from_headers(headers);

    match err {
        AuthError::Forbidden {
            user_id,
            role,
            operation,
        } => {
            audit_log(&AuditEvent::AccessDenied {
                user_id: *user_id,
                role: *role,
                operation: operation.to_string(),
                ip_address,
                user_agent,
            });
        }
        other => audit_log(&AuditEvent::InvalidToken {
            reason: other.to_string(),
            ip_address,
            user_agent,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::jwt::generate_access_token;
    use axum::http::HeaderValue;
    use chrono::{Duration, Utc};

    fn config() -> JwtConfig {
        JwtConfig::new("middleware-test-secret-0123456789ab")
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn bearer_for(role: Role) -> HeaderMap {
        let token = generate_access_token(&config(), 7, role, Utc::now()).unwrap();
        headers_with(&format!("Bearer {token}"))
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(Some("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(extract_bearer_token(None), Err(AuthError::MissingToken)));
        assert!(matches!(extract_bearer_token(Some("")), Err(AuthError::MissingToken)));
    }

    #[test]
    fn test_malformed_header() {
        let cases = [
            "abc.def.ghi",
            "Basic dXNlcjpwYXNz",
            "bearer abc.def.ghi",
            "Bearer",
            "Bearer ",
            "Bearer  abc.def.ghi",
            "Bearer abc def",
            "Bearer abc.Bearer def",
            "Bearer Bearer abc",
            "xBearer abc",
        ];

        for case in cases {
            assert!(
                matches!(extract_bearer_token(Some(case)), Err(AuthError::MalformedToken)),
                "{case:?}"
            );
        }
    }

    #[test]
    fn test_authenticate_success() {
        let user = authenticate(&config(), &bearer_for(Role::Teacher)).unwrap();
        assert_eq!(user, AuthenticatedUser { user_id: 7, role: Role::Teacher });
    }

    #[test]
    fn test_authenticate_without_header() {
        let result = authenticate(&config(), &HeaderMap::new());
        assert!(matches!(result, Err(AuthError::MissingToken)));
    }

    #[test]
    fn test_authenticate_non_ascii_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap(),
        );
        let result = authenticate(&config(), &headers);
        assert!(matches!(result, Err(AuthError::MalformedToken)));
    }

    #[test]
    fn test_authenticate_expired_token() {
        let issued = Utc::now() - Duration::days(2);
        let token = generate_access_token(&config(), 7, Role::Admin, issued).unwrap();
        let result = authenticate(&config(), &headers_with(&format!("Bearer {token}")));
        assert!(matches!(result, Err(AuthError::InvalidOrExpiredToken(_))));
    }

    #[test]
    fn test_authenticate_garbage_token() {
        let result = authenticate(&config(), &headers_with("Bearer not-a-jwt"));
        assert!(matches!(result, Err(AuthError::InvalidOrExpiredToken(_))));
    }

    #[test]
    fn test_guard_chain_admits_allowed_role() {
        let chain = GuardChain::for_operation(Operation::AssignGrade);
        let ctx = chain.run(&config(), &bearer_for(Role::Teacher)).unwrap();
        assert_eq!(ctx.user.map(|u| u.role), Some(Role::Teacher));
    }

    #[test]
    fn test_guard_chain_forbids_other_roles() {
        let chain = GuardChain::for_operation(Operation::AssignGrade);
        for role in [Role::Admin, Role::Student] {
            let err = chain.run(&config(), &bearer_for(role)).unwrap_err();
            assert_eq!(err.status(), StatusCode::FORBIDDEN, "{role}");
        }
    }

    #[test]
    fn test_guard_chain_authenticates_before_role_check() {
        let chain = GuardChain::for_operation(Operation::CreateCourse);
        let err = chain.run(&config(), &HeaderMap::new()).unwrap_err();
        assert!(matches!(err, AuthError::MissingToken));
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_role_guard_without_identity() {
        let chain = GuardChain::new().then(Guard::RequireRole(Operation::ProtectedProbe));
        let err = chain.run(&config(), &bearer_for(Role::Admin)).unwrap_err();
        assert!(matches!(err, AuthError::MissingToken));
    }

    #[test]
    fn test_empty_chain_passes_through() {
        let ctx = GuardChain::new().run(&config(), &HeaderMap::new()).unwrap();
        assert!(ctx.user.is_none());
    }
}
