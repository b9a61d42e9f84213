//! Student performance aggregation
//!
//! Turns a student's enrollments and grades into an average score and a
//! GPA on a 4-point scale.

use serde::Serialize;

use crate::store::RecordStore;
use crate::{RecordId, Result};

/// Maximum GPA, reached by an average score of 100
pub const GPA_SCALE: f64 = 4.0;

/// Aggregated scores of a student with at least one grade
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub average_score: f64,
    pub gpa: f64,
    /// Number of enrollments that contributed a grade
    pub graded_count: usize,
}

impl PerformanceSummary {
    /// GPA with two-decimal fixed precision, e.g. `"3.40"`
    pub fn gpa_display(&self) -> String {
        format!("{:.2}", self.gpa)
    }
}

/// Result of a performance computation
#[derive(Debug, Clone, PartialEq)]
pub enum Performance {
    Graded(PerformanceSummary),
    /// No enrollment of the student carries a grade
    NoGrades,
}

/// Average a set of scores into a summary
///
/// No clamping is applied: scores are expected to have passed
/// [`crate::admit_score`] on write.
pub fn summarize<I>(scores: I) -> Performance
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = scores
        .into_iter()
        .fold((0.0_f64, 0_usize), |(sum, count), score| (sum + score, count + 1));

    if count == 0 {
        return Performance::NoGrades;
    }

    let average_score = sum / count as f64;
    Performance::Graded(PerformanceSummary {
        average_score,
        gpa: average_score / 100.0 * GPA_SCALE,
        graded_count: count,
    })
}

/// Compute the performance of a student from stored records
///
/// Enrollments without a grade are skipped. When several grades exist for
/// one enrollment only the first is counted.
pub async fn compute_performance(
    store: &dyn RecordStore,
    student_id: RecordId,
) -> Result<Performance> {
    let enrollments = store.enrollments_for_user(student_id).await?;

    let mut scores = Vec::with_capacity(enrollments.len());
    for enrollment in &enrollments {
        if let Some(grade) = store.first_grade_for_enrollment(enrollment.id).await? {
            scores.push(grade.score);
        }
    }

    tracing::debug!(
        student_id,
        enrollments = enrollments.len(),
        graded = scores.len(),
        backend = store.name(),
        "Computed performance"
    );

    Ok(summarize(scores))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn test_summarize_empty_is_no_grades() {
        assert_eq!(summarize(Vec::new()), Performance::NoGrades);
    }

    #[test]
    fn test_summarize_single_score() {
        match summarize([85.0]) {
            Performance::Graded(summary) => {
                assert_eq!(summary.average_score, 85.0);
                assert_eq!(summary.gpa_display(), "3.40");
                assert_eq!(summary.graded_count, 1);
            }
            Performance::NoGrades => panic!("expected a summary"),
        }
    }

    #[test]
    fn test_summarize_bounds() {
        let Performance::Graded(top) = summarize([100.0, 100.0]) else {
            panic!("expected a summary");
        };
        assert_eq!(top.gpa_display(), "4.00");

        let Performance::Graded(bottom) = summarize([0.0]) else {
            panic!("expected a summary");
        };
        assert_eq!(bottom.average_score, 0.0);
        assert_eq!(bottom.gpa_display(), "0.00");
    }

    #[test]
    fn test_summarize_average() {
        let Performance::Graded(summary) = summarize([70.0, 90.0, 80.0]) else {
            panic!("expected a summary");
        };
        assert_eq!(summary.average_score, 80.0);
        assert_eq!(summary.gpa_display(), "3.20");
    }

    #[tokio::test]
    async fn test_ungraded_enrollments_are_skipped() {
        let store = MemoryStore::new();
        let graded = store.create_enrollment(3, 1).await.unwrap();
        store.create_enrollment(3, 2).await.unwrap();
        store.create_grade(graded.id, 60.0).await.unwrap();

        let Performance::Graded(summary) = compute_performance(&store, 3).await.unwrap() else {
            panic!("expected a summary");
        };
        assert_eq!(summary.average_score, 60.0);
        assert_eq!(summary.graded_count, 1);
    }

    #[tokio::test]
    async fn test_enrolled_without_grades() {
        let store = MemoryStore::new();
        store.create_enrollment(3, 1).await.unwrap();

        let result = compute_performance(&store, 3).await.unwrap();
        assert_eq!(result, Performance::NoGrades);
    }

    #[tokio::test]
    async fn test_other_students_grades_ignored() {
        let store = MemoryStore::new();
        let mine = store.create_enrollment(3, 1).await.unwrap();
        let theirs = store.create_enrollment(4, 1).await.unwrap();
        store.create_grade(mine.id, 50.0).await.unwrap();
        store.create_grade(theirs.id, 100.0).await.unwrap();

        let Performance::Graded(summary) = compute_performance(&store, 3).await.unwrap() else {
            panic!("expected a summary");
        };
        assert_eq!(summary.average_score, 50.0);
        assert_eq!(summary.gpa_display(), "2.00");
    }

    #[tokio::test]
    async fn test_only_first_grade_per_enrollment_counts() {
        let store = MemoryStore::new();
        let enrollment = store.create_enrollment(3, 1).await.unwrap();
        store.create_grade(enrollment.id, 80.0).await.unwrap();
        store.create_grade(enrollment.id, 20.0).await.unwrap();

        let Performance::Graded(summary) = compute_performance(&store, 3).await.unwrap() else {
            panic!("expected a summary");
        };
        assert_eq!(summary.average_score, 80.0);
    }

    #[tokio::test]
    async fn test_repeated_queries_are_identical() {
        let store = MemoryStore::new();
        let enrollment = store.create_enrollment(3, 1).await.unwrap();
        store.create_grade(enrollment.id, 85.0).await.unwrap();

        let first = compute_performance(&store, 3).await.unwrap();
        let second = compute_performance(&store, 3).await.unwrap();
        assert_eq!(first, second);
    }
}
