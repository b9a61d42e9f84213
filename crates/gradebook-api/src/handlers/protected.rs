//! Session probe handler
//!
//! Author: hephaex@gmail.com

use crate::auth::AuthenticatedUser;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Plain message response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Confirm that the caller holds a valid session
#[utoipa::path(
    get,
    path = "/protected",
    tag = "auth",
    responses(
        (status = 200, description = "Session is valid", body = MessageResponse),
        (status = 401, description = "Missing, malformed or expired token", body = crate::error::ApiError),
        (status = 403, description = "Role not allowed", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn protected_handler(Extension(user): Extension<AuthenticatedUser>) -> Json<MessageResponse> {
    tracing::debug!(user_id = user.user_id, role = %user.role, "Protected route accessed");

    Json(MessageResponse {
        message: "You accessed a protected route".to_string(),
    })
}
