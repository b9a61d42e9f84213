//! Login handler
//!
//! Author: hephaex@gmail.com

use crate::audit::ClientInfo;
use crate::auth::{AuthService, LoginRequest, LoginResponse};
use crate::error::{ApiJson, AppError};
use crate::state::AppState;
use axum::{extract::State, http::HeaderMap, Json};
use chrono::Utc;
use std::sync::Arc;

/// Login with email and password
///
/// Returns a session token valid for 24 hours by default. An unknown email
/// and a wrong password produce the same 401 response.
///
/// # Responses
///
/// * `200 OK` - Authentication successful, returns the token
/// * `400 Bad Request` - Malformed body
/// * `401 Unauthorized` - Invalid credentials
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
        (status = 401, description = "Invalid credentials", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let auth_service = AuthService::new(state.store.clone(), state.jwt.clone());
    let response = auth_service
        .login(request, ClientInfo::from_headers(&headers), Utc::now())
        .await?;

    Ok(Json(response))
}
