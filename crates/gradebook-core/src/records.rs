//! Write-path validation for new academic records
//!
//! Each `New*` request is checked in full before anything is written.
//! Referenced ids are only required to be positive; whether the user,
//! course or enrollment actually exists is not verified.

use crate::{GradebookError, RecordId, Result};
use serde::Deserialize;
use utoipa::ToSchema;

/// Inclusive score bounds
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

/// Course creation request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewCourse {
    #[serde(default)]
    #[schema(example = "Mathematics")]
    pub title: String,
}

impl NewCourse {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(GradebookError::ValidationError(
                "Course title required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Enrollment request; missing ids deserialize as zero and are rejected
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewEnrollment {
    #[serde(default)]
    #[schema(value_type = i64)]
    pub user_id: RecordId,
    #[serde(default)]
    #[schema(value_type = i64)]
    pub course_id: RecordId,
}

impl NewEnrollment {
    pub fn validate(&self) -> Result<()> {
        if self.user_id <= 0 || self.course_id <= 0 {
            return Err(GradebookError::ValidationError(
                "Invalid user or course ID".to_string(),
            ));
        }
        Ok(())
    }
}

/// Grade assignment request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewGrade {
    #[serde(default)]
    #[schema(value_type = i64)]
    pub enrollment_id: RecordId,
    #[schema(minimum = 0, maximum = 100, example = 85)]
    pub score: f64,
}

impl NewGrade {
    pub fn validate(&self) -> Result<()> {
        if self.enrollment_id <= 0 {
            return Err(GradebookError::ValidationError(
                "Invalid enrollment ID".to_string(),
            ));
        }
        admit_score(self.score)
    }
}

/// Accept a score only if it lies in `[0, 100]`, both bounds inclusive
pub fn admit_score(score: f64) -> Result<()> {
    if !score.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(GradebookError::InvalidScore(score));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bounds_inclusive() {
        assert!(admit_score(0.0).is_ok());
        assert!(admit_score(100.0).is_ok());
        assert!(admit_score(85.5).is_ok());

        assert!(matches!(admit_score(-1.0), Err(GradebookError::InvalidScore(_))));
        assert!(matches!(admit_score(101.0), Err(GradebookError::InvalidScore(_))));
        assert!(admit_score(100.000_001).is_err());
        assert!(admit_score(f64::NAN).is_err());
        assert!(admit_score(f64::INFINITY).is_err());
    }

    #[test]
    fn test_course_title_required() {
        assert!(NewCourse { title: "Mathematics".to_string() }.validate().is_ok());
        assert!(NewCourse { title: String::new() }.validate().is_err());
        assert!(NewCourse { title: "   ".to_string() }.validate().is_err());
    }

    #[test]
    fn test_enrollment_ids_must_be_positive() {
        let valid = NewEnrollment { user_id: 3, course_id: 1 };
        assert!(valid.validate().is_ok());

        let cases = [(0, 1), (3, 0), (0, 0), (-1, 1)];
        for (user_id, course_id) in cases {
            let request = NewEnrollment { user_id, course_id };
            assert!(request.validate().is_err(), "({user_id}, {course_id})");
        }
    }

    #[test]
    fn test_missing_enrollment_fields_default_to_zero() {
        let request: NewEnrollment = serde_json::from_str(r#"{"user_id": 3}"#).unwrap();
        assert_eq!(request.course_id, 0);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_grade_validation() {
        let ok = NewGrade { enrollment_id: 1, score: 85.0 };
        assert!(ok.validate().is_ok());

        let missing_id = NewGrade { enrollment_id: 0, score: 85.0 };
        assert!(matches!(
            missing_id.validate(),
            Err(GradebookError::ValidationError(_))
        ));

        let too_high = NewGrade { enrollment_id: 1, score: 101.0 };
        assert!(matches!(too_high.validate(), Err(GradebookError::InvalidScore(_))));
    }

    #[test]
    fn test_grade_score_is_required() {
        let result: std::result::Result<NewGrade, _> =
            serde_json::from_str(r#"{"enrollment_id": 1}"#);
        assert!(result.is_err());
    }
}
