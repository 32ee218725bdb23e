//! Role and ownership gates.
//!
//! Ownership is one generic routine over the `Owned` capability instead of
//! a type-switch per model. Callers look the resource up first, so absence
//! is a 404 for everyone and the ownership comparison only ever runs
//! against a resource that exists.

use crate::error::ApiError;
use crate::models::{Application, Document, Role, User};

/// A stored resource with an owning student.
pub trait Owned {
    fn owner_id(&self) -> &str;
}

impl Owned for Application {
    fn owner_id(&self) -> &str {
        &self.student
    }
}

impl Owned for Document {
    fn owner_id(&self) -> &str {
        &self.student
    }
}

pub fn require_admin(user: &User) -> Result<(), ApiError> {
    if user.role != Role::Admin {
        return Err(ApiError::Forbidden(
            "Access denied. Admin privileges required.".to_string(),
        ));
    }
    Ok(())
}

pub fn require_student(user: &User) -> Result<(), ApiError> {
    if user.role != Role::Student {
        return Err(ApiError::Forbidden(
            "Access denied. Student privileges required.".to_string(),
        ));
    }
    Ok(())
}

/// The owning student or any admin may act on the resource.
pub fn ensure_owner<R: Owned>(user: &User, resource: &R) -> Result<(), ApiError> {
    if resource.owner_id() != user.id && user.role != Role::Admin {
        return Err(ApiError::Forbidden(
            "You are not authorized to access this resource".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Address, ApplicationStatus, Course, CoursePreferences, Gender};
    use chrono::{NaiveDate, Utc};

    fn user_with_role(id: &str, role: Role) -> User {
        User {
            id: id.to_string(),
            name: "Someone".to_string(),
            email: format!("{}@example.com", id),
            password_hash: String::new(),
            role,
            phone: "9876543210".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            gender: Gender::Other,
            address: Address::default(),
            is_active: true,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn application_owned_by(student: &str) -> Application {
        Application {
            id: "app-1".to_string(),
            student: student.to_string(),
            personal_details: Default::default(),
            academic_details: Default::default(),
            course_preferences: CoursePreferences {
                first_choice: Course::Arts,
                second_choice: None,
                third_choice: None,
            },
            documents: vec![],
            status: ApplicationStatus::Pending,
            remarks: String::new(),
            submitted_at: Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
            is_payment_completed: false,
            payment_details: None,
        }
    }

    #[test]
    fn test_owner_and_admin_pass_ownership() {
        let app = application_owned_by("student-1");
        let owner = user_with_role("student-1", Role::Student);
        let admin = user_with_role("admin-1", Role::Admin);

        assert!(ensure_owner(&owner, &app).is_ok());
        assert!(ensure_owner(&admin, &app).is_ok());
    }

    #[test]
    fn test_stranger_is_forbidden() {
        let app = application_owned_by("student-1");
        let stranger = user_with_role("student-2", Role::Student);

        let err = ensure_owner(&stranger, &app).expect_err("must deny");
        assert_eq!(err.kind(), "FORBIDDEN");
    }

    #[test]
    fn test_role_gates() {
        let student = user_with_role("s", Role::Student);
        let admin = user_with_role("a", Role::Admin);

        assert!(require_student(&student).is_ok());
        assert!(require_admin(&admin).is_ok());
        assert_eq!(require_admin(&student).unwrap_err().kind(), "FORBIDDEN");
        assert_eq!(require_student(&admin).unwrap_err().kind(), "FORBIDDEN");
    }
}
