//! Role gate
//!
//! Each protected operation has a fixed set of roles allowed to perform it.
//! Admission is plain set membership: no role implies another.

use gradebook_core::Role;

/// Protected operations exposed by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ProtectedProbe,
    CreateCourse,
    Enroll,
    AssignGrade,
    ReadPerformance,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::ProtectedProbe,
        Operation::CreateCourse,
        Operation::Enroll,
        Operation::AssignGrade,
        Operation::ReadPerformance,
    ];

    /// Roles allowed to perform this operation
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Operation::CreateCourse | Operation::Enroll => &[Role::Admin],
            Operation::AssignGrade => &[Role::Teacher],
            Operation::ProtectedProbe | Operation::ReadPerformance => {
                &[Role::Admin, Role::Teacher, Role::Student]
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ProtectedProbe => "protected_probe",
            Operation::CreateCourse => "create_course",
            Operation::Enroll => "enroll",
            Operation::AssignGrade => "assign_grade",
            Operation::ReadPerformance => "read_performance",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admit `role` if it is a member of `allowed`
pub fn admit(role: Role, allowed: &[Role]) -> bool {
    allowed.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_sets() {
        let expected: [(Operation, &[Role]); 5] = [
            (Operation::CreateCourse, &[Role::Admin]),
            (Operation::Enroll, &[Role::Admin]),
            (Operation::AssignGrade, &[Role::Teacher]),
            (
                Operation::ReadPerformance,
                &[Role::Admin, Role::Teacher, Role::Student],
            ),
            (
                Operation::ProtectedProbe,
                &[Role::Admin, Role::Teacher, Role::Student],
            ),
        ];

        for (operation, roles) in expected {
            assert_eq!(operation.allowed_roles(), roles, "{operation}");
        }
    }

    #[test]
    fn test_admit_exhaustive() {
        // (operation, admin, teacher, student)
        let matrix = [
            (Operation::ProtectedProbe, true, true, true),
            (Operation::CreateCourse, true, false, false),
            (Operation::Enroll, true, false, false),
            (Operation::AssignGrade, false, true, false),
            (Operation::ReadPerformance, true, true, true),
        ];

        for (operation, admin, teacher, student) in matrix {
            let allowed = operation.allowed_roles();
            assert_eq!(admit(Role::Admin, allowed), admin, "{operation} / admin");
            assert_eq!(admit(Role::Teacher, allowed), teacher, "{operation} / teacher");
            assert_eq!(admit(Role::Student, allowed), student, "{operation} / student");
        }
    }

    #[test]
    fn test_admin_has_no_implicit_grading_access() {
        assert!(!admit(Role::Admin, Operation::AssignGrade.allowed_roles()));
        assert!(!admit(Role::Teacher, Operation::CreateCourse.allowed_roles()));
        assert!(!admit(Role::Student, Operation::Enroll.allowed_roles()));
    }

    #[test]
    fn test_empty_allow_set_denies_everyone() {
        for role in Role::ALL {
            assert!(!admit(role, &[]));
        }
    }
}
