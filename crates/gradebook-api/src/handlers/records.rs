//! Course, enrollment and grade handlers
//!
//! Every request body is validated in full before the store is touched.
//! Referenced users, courses and enrollments are not checked for existence.
//!
//! Author: hephaex@gmail.com

use crate::audit::{audit_log, AuditEvent};
use crate::auth::AuthenticatedUser;
use crate::error::{ApiJson, AppError};
use crate::state::AppState;
use axum::{extract::State, Extension, Json};
use gradebook_core::{Course, Enrollment, Grade, NewCourse, NewEnrollment, NewGrade, RecordId};
use std::sync::Arc;

fn record_created(actor: &AuthenticatedUser, record_type: &str, record_id: RecordId) {
    audit_log(&AuditEvent::RecordCreated {
        actor_id: actor.user_id,
        record_type: record_type.to_string(),
        record_id,
    });
}

/// Create a course
///
/// Admin only.
#[utoipa::path(
    post,
    path = "/courses",
    tag = "records",
    request_body = NewCourse,
    responses(
        (status = 200, description = "Course created", body = Course),
        (status = 400, description = "Missing or empty title", body = crate::error::ApiError),
        (status = 401, description = "Missing, malformed or expired token", body = crate::error::ApiError),
        (status = 403, description = "Role not allowed", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_course(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<NewCourse>,
) -> Result<Json<Course>, AppError> {
    request.validate()?;

    let course = state.store.create_course(&request.title).await?;
    record_created(&user, "course", course.id);

    Ok(Json(course))
}

/// Enroll a user in a course
///
/// Admin only.
#[utoipa::path(
    post,
    path = "/enroll",
    tag = "records",
    request_body = NewEnrollment,
    responses(
        (status = 200, description = "Enrollment created", body = Enrollment),
        (status = 400, description = "Missing or non-positive ids", body = crate::error::ApiError),
        (status = 401, description = "Missing, malformed or expired token", body = crate::error::ApiError),
        (status = 403, description = "Role not allowed", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn enroll(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<NewEnrollment>,
) -> Result<Json<Enrollment>, AppError> {
    request.validate()?;

    let enrollment = state
        .store
        .create_enrollment(request.user_id, request.course_id)
        .await?;
    record_created(&user, "enrollment", enrollment.id);

    Ok(Json(enrollment))
}

/// Assign a grade to an enrollment
///
/// Teacher only. The score must lie in `[0, 100]`.
#[utoipa::path(
    post,
    path = "/grades",
    tag = "records",
    request_body = NewGrade,
    responses(
        (status = 200, description = "Grade recorded", body = Grade),
        (status = 400, description = "Missing enrollment id or score out of range", body = crate::error::ApiError),
        (status = 401, description = "Missing, malformed or expired token", body = crate::error::ApiError),
        (status = 403, description = "Role not allowed", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn assign_grade(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<NewGrade>,
) -> Result<Json<Grade>, AppError> {
    request.validate()?;

    let grade = state
        .store
        .create_grade(request.enrollment_id, request.score)
        .await?;
    record_created(&user, "grade", grade.id);

    Ok(Json(grade))
}
