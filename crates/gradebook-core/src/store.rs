//! Record store contract
//!
//! The service never owns storage lifecycle. It talks to persistence only
//! through the narrow query shapes declared on [`RecordStore`]: lookup by
//! id, by email, and by foreign key.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    Course, Enrollment, Grade, GradebookError, NewUser, RecordId, Result, User,
};

/// Trait for record persistence
///
/// Every method is a single atomic read or write; no method spans
/// several records transactionally.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Look up a user by unique email
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Insert a user, failing with `DuplicateEmail` if the email is taken
    async fn create_user(&self, user: NewUser) -> Result<User>;

    /// Number of stored users
    async fn count_users(&self) -> Result<i64>;

    /// Insert a course
    async fn create_course(&self, title: &str) -> Result<Course>;

    /// Insert an enrollment without checking the referenced ids
    async fn create_enrollment(&self, user_id: RecordId, course_id: RecordId)
        -> Result<Enrollment>;

    /// Insert a grade without checking the referenced enrollment
    async fn create_grade(&self, enrollment_id: RecordId, score: f64) -> Result<Grade>;

    /// All enrollments whose user reference equals `user_id`
    async fn enrollments_for_user(&self, user_id: RecordId) -> Result<Vec<Enrollment>>;

    /// First grade (lowest id) recorded against an enrollment, if any
    async fn first_grade_for_enrollment(&self, enrollment_id: RecordId)
        -> Result<Option<Grade>>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    courses: Vec<Course>,
    enrollments: Vec<Enrollment>,
    grades: Vec<Grade>,
}

/// In-process record store
///
/// Ids start at 1 and increase per table. Used when no database is
/// configured and by the test suites.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn next_id(len: usize) -> RecordId {
    len as RecordId + 1
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(GradebookError::DuplicateEmail(user.email));
        }

        let created = User {
            id: next_id(tables.users.len()),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn count_users(&self) -> Result<i64> {
        Ok(self.tables.read().await.users.len() as i64)
    }

    async fn create_course(&self, title: &str) -> Result<Course> {
        let mut tables = self.tables.write().await;
        let course = Course {
            id: next_id(tables.courses.len()),
            title: title.to_string(),
        };
        tables.courses.push(course.clone());
        Ok(course)
    }

    async fn create_enrollment(
        &self,
        user_id: RecordId,
        course_id: RecordId,
    ) -> Result<Enrollment> {
        let mut tables = self.tables.write().await;
        let enrollment = Enrollment {
            id: next_id(tables.enrollments.len()),
            user_id,
            course_id,
        };
        tables.enrollments.push(enrollment.clone());
        Ok(enrollment)
    }

    async fn create_grade(&self, enrollment_id: RecordId, score: f64) -> Result<Grade> {
        let mut tables = self.tables.write().await;
        let grade = Grade {
            id: next_id(tables.grades.len()),
            enrollment_id,
            score,
        };
        tables.grades.push(grade.clone());
        Ok(grade)
    }

    async fn enrollments_for_user(&self, user_id: RecordId) -> Result<Vec<Enrollment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .enrollments
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn first_grade_for_enrollment(
        &self,
        enrollment_id: RecordId,
    ) -> Result<Option<Grade>> {
        let tables = self.tables.read().await;
        Ok(tables
            .grades
            .iter()
            .find(|g| g.enrollment_id == enrollment_id)
            .cloned())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    #[tokio::test]
    async fn test_ids_are_sequential_per_table() {
        let store = MemoryStore::new();

        let c1 = store.create_course("Mathematics").await.unwrap();
        let c2 = store.create_course("Physics").await.unwrap();
        let e1 = store.create_enrollment(3, c1.id).await.unwrap();

        assert_eq!(c1.id, 1);
        assert_eq!(c2.id, 2);
        assert_eq!(e1.id, 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        let user = NewUser::new("Admin", "admin@test.com", "hash", Role::Admin);

        store.create_user(user.clone()).await.unwrap();
        let result = store.create_user(user).await;

        assert!(matches!(result, Err(GradebookError::DuplicateEmail(_))));
        assert_eq!(store.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_user_by_email() {
        let store = MemoryStore::new();
        store
            .create_user(NewUser::new("Student", "student@test.com", "hash", Role::Student))
            .await
            .unwrap();

        let found = store.find_user_by_email("student@test.com").await.unwrap();
        assert_eq!(found.map(|u| u.role), Some(Role::Student));

        let missing = store.find_user_by_email("nobody@test.com").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_enrollment_references_are_not_checked() {
        let store = MemoryStore::new();
        let enrollment = store.create_enrollment(999, 42).await.unwrap();
        assert_eq!(enrollment.user_id, 999);
        assert_eq!(enrollment.course_id, 42);
    }

    #[tokio::test]
    async fn test_first_grade_wins() {
        let store = MemoryStore::new();
        store.create_grade(1, 70.0).await.unwrap();
        store.create_grade(1, 90.0).await.unwrap();

        let grade = store.first_grade_for_enrollment(1).await.unwrap().unwrap();
        assert_eq!(grade.score, 70.0);
        assert!(store.first_grade_for_enrollment(2).await.unwrap().is_none());
    }
}
