//! Gradebook API - REST server
//!
//! Provides HTTP endpoints for logging in, managing courses, enrollments and
//! grades, and reading student performance.
//!
//! Author: hephaex@gmail.com

pub mod audit;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod seed;
pub mod state;

use crate::state::AppState;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the application router
///
/// API routes, Swagger UI, request tracing and security headers.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::api_routes(state.clone()))
        .merge(openapi::swagger_ui())
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
