//! Student performance handler
//!
//! Author: hephaex@gmail.com

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use gradebook_core::{compute_performance, Performance, RecordId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Performance of a student
///
/// Serialized either as `{"average_score": 85.0, "gpa": "3.40"}` or as
/// `{"message": "No grades found"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum PerformanceResponse {
    Graded {
        average_score: f64,
        /// GPA on a 4-point scale with two decimals
        #[schema(example = "3.40")]
        gpa: String,
    },
    NoGrades {
        #[schema(example = "No grades found")]
        message: String,
    },
}

impl From<Performance> for PerformanceResponse {
    fn from(performance: Performance) -> Self {
        match performance {
            Performance::Graded(summary) => PerformanceResponse::Graded {
                average_score: summary.average_score,
                gpa: summary.gpa_display(),
            },
            Performance::NoGrades => PerformanceResponse::NoGrades {
                message: "No grades found".to_string(),
            },
        }
    }
}

/// Average score and GPA of a student
///
/// Any authenticated role may read any student's performance.
#[utoipa::path(
    get,
    path = "/students/{id}/performance",
    tag = "performance",
    params(
        ("id" = i64, Path, description = "Student user id")
    ),
    responses(
        (status = 200, description = "Performance or no-grades message", body = PerformanceResponse),
        (status = 400, description = "Non-numeric student id", body = crate::error::ApiError),
        (status = 401, description = "Missing, malformed or expired token", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn student_performance(
    State(state): State<Arc<AppState>>,
    student_id: Result<Path<RecordId>, PathRejection>,
) -> Result<Json<PerformanceResponse>, AppError> {
    let Path(student_id) =
        student_id.map_err(|_| AppError::BadRequest("Invalid student ID".to_string()))?;

    let performance = compute_performance(state.store.as_ref(), student_id).await?;

    Ok(Json(performance.into()))
}
