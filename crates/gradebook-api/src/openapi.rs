//! OpenAPI document and Swagger UI
//!
//! Author: hephaex@gmail.com

use crate::auth::{LoginRequest, LoginResponse};
use crate::error::ApiError;
use crate::handlers::{
    health::HealthResponse, performance::PerformanceResponse, protected::MessageResponse,
};
use gradebook_core::{Course, Enrollment, Grade, NewCourse, NewEnrollment, NewGrade, Role};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gradebook API",
        description = "Academic records: courses, enrollments, grades and student performance"
    ),
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::login_handler,
        crate::handlers::protected::protected_handler,
        crate::handlers::records::create_course,
        crate::handlers::records::enroll,
        crate::handlers::records::assign_grade,
        crate::handlers::performance::student_performance,
    ),
    components(
        schemas(
            ApiError,
            HealthResponse,
            LoginRequest,
            LoginResponse,
            MessageResponse,
            NewCourse,
            NewEnrollment,
            NewGrade,
            Course,
            Enrollment,
            Grade,
            Role,
            PerformanceResponse,
        )
    ),
    tags(
        (name = "health", description = "Liveness"),
        (name = "auth", description = "Login and session probe"),
        (name = "records", description = "Courses, enrollments and grades"),
        (name = "performance", description = "Student average score and GPA")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Swagger UI at `/swagger-ui`, document at `/api-docs/openapi.json`
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
