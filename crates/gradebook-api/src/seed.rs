//! Demo data seeding
//!
//! Populates an empty store with one user per role, a course, an enrollment
//! and a grade so the API can be exercised right after start. The shared
//! password comes from configuration.

use crate::auth::password::{hash_password_with_config, PasswordConfig};
use gradebook_core::{NewUser, RecordStore, Role};

/// Seeded accounts: (name, email, role)
pub const DEMO_USERS: [(&str, &str, Role); 3] = [
    ("Admin", "admin@test.com", Role::Admin),
    ("Teacher", "teacher@test.com", Role::Teacher),
    ("Student", "student@test.com", Role::Student),
];

pub const DEMO_COURSE: &str = "Mathematics";
pub const DEMO_SCORE: f64 = 85.0;

/// Seed demo data if the store has no users
///
/// Returns `false` without writing anything when users already exist.
pub async fn seed_demo_data(
    store: &dyn RecordStore,
    password: &str,
    config: &PasswordConfig,
) -> anyhow::Result<bool> {
    if store.count_users().await? > 0 {
        tracing::info!("Users present, skipping demo data");
        return Ok(false);
    }

    let mut student_id = None;
    for (name, email, role) in DEMO_USERS {
        let hash = hash_password_with_config(password, config)?;
        let user = store.create_user(NewUser::new(name, email, hash, role)).await?;
        if role == Role::Student {
            student_id = Some(user.id);
        }
    }

    let student_id =
        student_id.ok_or_else(|| anyhow::anyhow!("demo users contain no student"))?;
    let course = store.create_course(DEMO_COURSE).await?;
    let enrollment = store.create_enrollment(student_id, course.id).await?;
    store.create_grade(enrollment.id, DEMO_SCORE).await?;

    tracing::info!(
        users = DEMO_USERS.len(),
        course_id = course.id,
        enrollment_id = enrollment.id,
        "Demo data seeded"
    );
    Ok(true)
}
