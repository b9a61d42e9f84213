//! API route definitions
//!
//! Each protected route carries its own guard chain: session validation
//! followed by the role gate for the route's [`Operation`].
//!
//! Author: hephaex@gmail.com

use crate::auth::middleware::{enforce, RoutePolicy};
use crate::auth::Operation;
use crate::handlers::{auth, health, performance, protected, records};
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post, MethodRouter},
    Router,
};
use std::sync::Arc;

/// Create API routes
pub fn api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/login", post(auth::login_handler));

    // Protected routes, one guard chain per operation
    let protected_routes = Router::new()
        .route(
            "/protected",
            guarded(get(protected::protected_handler), &state, Operation::ProtectedProbe),
        )
        .route(
            "/courses",
            guarded(post(records::create_course), &state, Operation::CreateCourse),
        )
        .route(
            "/enroll",
            guarded(post(records::enroll), &state, Operation::Enroll),
        )
        .route(
            "/grades",
            guarded(post(records::assign_grade), &state, Operation::AssignGrade),
        )
        .route(
            "/students/:id/performance",
            guarded(
                get(performance::student_performance),
                &state,
                Operation::ReadPerformance,
            ),
        );

    Router::new().merge(public_routes).merge(protected_routes)
}

fn guarded(
    method_router: MethodRouter<Arc<AppState>>,
    state: &Arc<AppState>,
    operation: Operation,
) -> MethodRouter<Arc<AppState>> {
    let policy = RoutePolicy::for_operation(state.clone(), operation);
    method_router.route_layer(middleware::from_fn_with_state(policy, enforce))
}
