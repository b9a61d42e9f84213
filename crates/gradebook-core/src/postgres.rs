//! PostgreSQL record store
//!
//! Implements [`RecordStore`] with SQLx. Tables carry no foreign keys:
//! enrollments and grades may reference ids that do not exist.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;

use crate::store::RecordStore;
use crate::{
    Course, Enrollment, Grade, GradebookError, NewUser, RecordId, Result, Role, User,
};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS courses (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS enrollments (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL,
        course_id BIGINT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS grades (
        id BIGSERIAL PRIMARY KEY,
        enrollment_id BIGINT NOT NULL,
        score DOUBLE PRECISION NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_enrollments_user_id ON enrollments (user_id)",
    "CREATE INDEX IF NOT EXISTS idx_grades_enrollment_id ON grades (enrollment_id)",
];

/// PostgreSQL record store
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    /// Create a new store connection
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| GradebookError::DatabaseError(format!("PostgreSQL connection failed: {e}")))?;

        Ok(Self { pool })
    }

    /// Create from an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the tables if they are missing
    pub async fn ensure_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| GradebookError::DatabaseError(format!("Schema setup failed: {e}")))?;
        }
        tracing::debug!("Gradebook schema ensured");
        Ok(())
    }
}

/// User row from database
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    role: String,
}

impl TryFrom<UserRow> for User {
    type Error = GradebookError;

    fn try_from(row: UserRow) -> Result<Self> {
        let role = row.role.parse::<Role>().map_err(|_| {
            GradebookError::DatabaseError(format!("User {} has unknown role {}", row.id, row.role))
        })?;

        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role,
        })
    }
}

#[derive(Debug, FromRow)]
struct CourseRow {
    id: i64,
    title: String,
}

#[derive(Debug, FromRow)]
struct EnrollmentRow {
    id: i64,
    user_id: i64,
    course_id: i64,
}

#[derive(Debug, FromRow)]
struct GradeRow {
    id: i64,
    enrollment_id: i64,
    score: f64,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Course {
            id: row.id,
            title: row.title,
        }
    }
}

impl From<EnrollmentRow> for Enrollment {
    fn from(row: EnrollmentRow) -> Self {
        Enrollment {
            id: row.id,
            user_id: row.user_id,
            course_id: row.course_id,
        }
    }
}

impl From<GradeRow> for Grade {
    fn from(row: GradeRow) -> Self {
        Grade {
            id: row.id,
            enrollment_id: row.enrollment_id,
            score: row.score,
        }
    }
}

fn db_error(context: &str, err: sqlx::Error) -> GradebookError {
    GradebookError::DatabaseError(format!("{context}: {err}"))
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, name, email, password_hash, role FROM users WHERE email = $1 LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch user", e))?;

        row.map(User::try_from).transpose()
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, role
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let duplicate = e
                .as_database_error()
                .map(|d| d.is_unique_violation())
                .unwrap_or(false);
            if duplicate {
                GradebookError::DuplicateEmail(user.email.clone())
            } else {
                db_error("Failed to create user", e)
            }
        })?;

        User::try_from(row)
    }

    async fn count_users(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to count users", e))
    }

    async fn create_course(&self, title: &str) -> Result<Course> {
        let row: CourseRow =
            sqlx::query_as("INSERT INTO courses (title) VALUES ($1) RETURNING id, title")
                .bind(title)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("Failed to create course", e))?;

        Ok(row.into())
    }

    async fn create_enrollment(
        &self,
        user_id: RecordId,
        course_id: RecordId,
    ) -> Result<Enrollment> {
        let row: EnrollmentRow = sqlx::query_as(
            "INSERT INTO enrollments (user_id, course_id) VALUES ($1, $2) RETURNING id, user_id, course_id",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create enrollment", e))?;

        Ok(row.into())
    }

    async fn create_grade(&self, enrollment_id: RecordId, score: f64) -> Result<Grade> {
        let row: GradeRow = sqlx::query_as(
            "INSERT INTO grades (enrollment_id, score) VALUES ($1, $2) RETURNING id, enrollment_id, score",
        )
        .bind(enrollment_id)
        .bind(score)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create grade", e))?;

        Ok(row.into())
    }

    async fn enrollments_for_user(&self, user_id: RecordId) -> Result<Vec<Enrollment>> {
        let rows: Vec<EnrollmentRow> = sqlx::query_as(
            "SELECT id, user_id, course_id FROM enrollments WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list enrollments", e))?;

        Ok(rows.into_iter().map(Enrollment::from).collect())
    }

    async fn first_grade_for_enrollment(
        &self,
        enrollment_id: RecordId,
    ) -> Result<Option<Grade>> {
        let row: Option<GradeRow> = sqlx::query_as(
            "SELECT id, enrollment_id, score FROM grades WHERE enrollment_id = $1 ORDER BY id LIMIT 1",
        )
        .bind(enrollment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch grade", e))?;

        Ok(row.map(Grade::from))
    }

    fn name(&self) -> &str {
        "postgres"
    }
}
