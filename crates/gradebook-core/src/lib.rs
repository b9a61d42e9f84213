//! Gradebook Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout the gradebook service:
//! - Academic records (users, courses, enrollments, grades)
//! - Common error types
//! - The record store contract and its adapters
//! - Write-path validation for new records
//! - Performance aggregation (average score and GPA)
//! - Configuration management

pub mod config;
pub mod performance;
pub mod postgres;
pub mod records;
pub mod store;

pub use config::{
    AppConfig, AuthConfig, ConfigError, DatabaseConfig, LoggingConfig, SeedConfig, ServerConfig,
};
pub use performance::{compute_performance, summarize, Performance, PerformanceSummary};
pub use postgres::PgRecordStore;
pub use records::{admit_score, NewCourse, NewEnrollment, NewGrade};
pub use store::{MemoryStore, RecordStore};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for gradebook operations
#[derive(Error, Debug)]
pub enum GradebookError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Score must be between 0 and 100, got {0}")]
    InvalidScore(f64),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, GradebookError>;

/// Identifier of a stored record
pub type RecordId = i64;

// ============================================================================
// Roles
// ============================================================================

/// User role
///
/// Every user holds exactly one role:
/// - Admin: manages courses and enrollments
/// - Teacher: assigns grades
/// - Student: reads performance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    /// Every role, in declaration order
    pub const ALL: [Role; 3] = [Role::Admin, Role::Teacher, Role::Student];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = GradebookError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            other => Err(GradebookError::ValidationError(format!(
                "unknown role: {other}"
            ))),
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// User account
///
/// Immutable once created. The password hash is an Argon2 PHC string and
/// is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub name: String,
    /// Unique login key
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
}

/// User to be inserted; the store assigns the id
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

impl NewUser {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role,
        }
    }
}

/// Course offered to students
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Course {
    #[schema(value_type = i64)]
    pub id: RecordId,
    pub title: String,
}

/// Link between a user and a course
///
/// Neither reference is checked for existence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Enrollment {
    #[schema(value_type = i64)]
    pub id: RecordId,
    #[schema(value_type = i64)]
    pub user_id: RecordId,
    #[schema(value_type = i64)]
    pub course_id: RecordId,
}

/// Score recorded against an enrollment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Grade {
    #[schema(value_type = i64)]
    pub id: RecordId,
    #[schema(value_type = i64)]
    pub enrollment_id: RecordId,
    /// Always within `[0, 100]` when written through [`admit_score`]
    pub score: f64,
}

// ============================================================================
// Tests
// ============================================================================
