//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles a participant can hold at an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Attendee taking classes.
    Student,
    /// Event staff.
    Staff,
    /// Teaches one or more classes.
    Instructor,
    /// Runs the event.
    Director,
    /// System administrator.
    Admin,
}

impl UserRole {
    /// Whether this role is a student.
    pub fn is_student(&self) -> bool {
        matches!(self, Self::Student)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Staff => "staff",
            Self::Instructor => "instructor",
            Self::Director => "director",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = enrollhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "staff" => Ok(Self::Staff),
            "instructor" | "teacher" => Ok(Self::Instructor),
            "director" => Ok(Self::Director),
            "admin" => Ok(Self::Admin),
            _ => Err(enrollhub_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: student, staff, instructor, director, admin"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("student".parse::<UserRole>().ok(), Some(UserRole::Student));
        assert_eq!("TEACHER".parse::<UserRole>().ok(), Some(UserRole::Instructor));
        assert!("camper".parse::<UserRole>().is_err());
    }
}
