//! Derived read views over the stores.
//!
//! Pure queries for the admin dashboard, filtered listings, search and the
//! student dashboard. No mutation and no caching; every view reflects the
//! store state at query time.

use std::collections::HashMap;

use chrono::Datelike;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::models::{Application, ApplicationStatus, PublicUser, Role, User};
use crate::storage::Storage;

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationCounts {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CourseCount {
    pub course: &'static str,
    pub count: usize,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCount {
    pub year: i32,
    pub month: u32,
    pub count: usize,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserCounts {
    pub total_students: usize,
    pub total_documents: usize,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub courses: Vec<CourseCount>,
    pub monthly_trends: Vec<MonthlyCount>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub applications: ApplicationCounts,
    pub users: UserCounts,
    pub distribution: Distribution,
    pub recent_applications: Vec<Value>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: usize,
    pub page: usize,
    pub pages: usize,
    pub limit: usize,
}

pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

const RECENT_LIMIT: usize = 5;
const SEARCH_LIMIT: usize = 20;
const TREND_MONTHS: usize = 6;

#[derive(Clone)]
pub struct Reports {
    storage: Storage,
}

impl Reports {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Replace the raw student reference with a summary, the way list and
    /// detail views present applications to admins.
    fn with_student(&self, application: &Application) -> Result<Value, ApiError> {
        let mut value = serde_json::to_value(application)
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        if let Some(student) = self.storage.get_user(&application.student)? {
            value["student"] = json!({
                "id": student.id,
                "name": student.name,
                "email": student.email,
                "phone": student.phone,
            });
        }
        Ok(value)
    }

    /// Admin dashboard aggregates: counts by status, student/document
    /// totals, first-choice course distribution (count descending), the
    /// latest six calendar months with submissions (newest first) and the
    /// five most recent applications.
    pub fn admin_dashboard(&self) -> Result<DashboardStats, ApiError> {
        let mut applications = self.storage.list_applications()?;

        let counts = ApplicationCounts {
            total: applications.len(),
            pending: count_status(&applications, ApplicationStatus::Pending),
            approved: count_status(&applications, ApplicationStatus::Approved),
            rejected: count_status(&applications, ApplicationStatus::Rejected),
        };

        let total_students = self
            .storage
            .list_users()?
            .iter()
            .filter(|u| u.role == Role::Student)
            .count();

        let mut by_course: HashMap<&'static str, usize> = HashMap::new();
        for application in &applications {
            *by_course
                .entry(application.course_preferences.first_choice.as_str())
                .or_insert(0) += 1;
        }
        let mut courses: Vec<CourseCount> = by_course
            .into_iter()
            .map(|(course, count)| CourseCount { course, count })
            .collect();
        courses.sort_by(|a, b| b.count.cmp(&a.count).then(a.course.cmp(b.course)));

        let mut by_month: HashMap<(i32, u32), usize> = HashMap::new();
        for application in &applications {
            let key = (
                application.submitted_at.year(),
                application.submitted_at.month(),
            );
            *by_month.entry(key).or_insert(0) += 1;
        }
        let mut monthly_trends: Vec<MonthlyCount> = by_month
            .into_iter()
            .map(|((year, month), count)| MonthlyCount { year, month, count })
            .collect();
        monthly_trends.sort_by(|a, b| (b.year, b.month).cmp(&(a.year, a.month)));
        monthly_trends.truncate(TREND_MONTHS);

        applications.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        let recent_applications = applications
            .iter()
            .take(RECENT_LIMIT)
            .map(|a| self.with_student(a))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DashboardStats {
            applications: counts,
            users: UserCounts {
                total_students,
                total_documents: self.storage.count_documents()?,
            },
            distribution: Distribution {
                courses,
                monthly_trends,
            },
            recent_applications,
        })
    }

    /// Admin listing: optional status/first-choice filters, newest first,
    /// paginated.
    pub fn list_applications(
        &self,
        status: Option<&str>,
        course: Option<&str>,
        page: usize,
        limit: usize,
    ) -> Result<Page<Value>, ApiError> {
        let mut applications: Vec<Application> = self
            .storage
            .list_applications()?
            .into_iter()
            .filter(|a| status.map_or(true, |s| a.status.as_str() == s))
            .filter(|a| {
                course.map_or(true, |c| a.course_preferences.first_choice.as_str() == c)
            })
            .collect();
        applications.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));

        let (page, limit) = (page.max(1), limit.max(1));
        let total = applications.len();
        let pages = total.div_ceil(limit);

        let data = applications
            .iter()
            .skip((page - 1) * limit)
            .take(limit)
            .map(|a| self.with_student(a))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            data,
            pagination: Pagination {
                total,
                page,
                pages,
                limit,
            },
        })
    }

    /// Single application for the admin detail view, with the student
    /// summary, the reviewer and the document records inlined.
    pub fn application_detail(&self, id: &str) -> Result<Value, ApiError> {
        let application = self
            .storage
            .get_application(id)?
            .ok_or_else(|| ApiError::NotFound("Application not found".to_string()))?;

        let mut value = self.with_student(&application)?;
        let documents = self.storage.documents_for_application(&application.id)?;
        value["documents"] = serde_json::to_value(&documents)
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        if let Some(reviewer_id) = &application.reviewed_by {
            if let Some(reviewer) = self.storage.get_user(reviewer_id)? {
                value["reviewedBy"] = json!({
                    "id": reviewer.id,
                    "name": reviewer.name,
                    "email": reviewer.email,
                });
            }
        }
        Ok(value)
    }

    /// Case-insensitive substring search over applicant and father names.
    pub fn search_applications(&self, query: &str) -> Result<Vec<Value>, ApiError> {
        if query.trim().len() < 3 {
            return Err(ApiError::Validation(
                "Search query must be at least 3 characters".to_string(),
            ));
        }
        let needle = query.trim().to_lowercase();

        let matches: Vec<Application> = self
            .storage
            .list_applications()?
            .into_iter()
            .filter(|a| {
                let personal = &a.personal_details;
                contains_ci(personal.full_name.as_deref(), &needle)
                    || contains_ci(personal.father_name.as_deref(), &needle)
            })
            .take(SEARCH_LIMIT)
            .collect();

        matches.iter().map(|a| self.with_student(a)).collect()
    }

    /// Student dashboard: user summary, own application with documents
    /// inlined, and the headline stats.
    pub fn student_dashboard(&self, user: &User) -> Result<Value, ApiError> {
        let application = self.storage.application_for_student(&user.id)?;

        let (application_value, documents_uploaded, application_status) = match &application {
            Some(application) => {
                let documents = self.storage.documents_for_application(&application.id)?;
                let mut value = serde_json::to_value(application)
                    .map_err(|e| ApiError::Internal(e.to_string()))?;
                value["documents"] = serde_json::to_value(&documents)
                    .map_err(|e| ApiError::Internal(e.to_string()))?;
                (value, documents.len(), application.status.as_str())
            }
            None => (Value::Null, 0, "not_submitted"),
        };

        Ok(json!({
            "user": {
                "id": user.id,
                "name": user.name,
                "email": user.email,
                "phone": user.phone,
                "lastLogin": user.last_login,
            },
            "application": application_value,
            "stats": {
                "documentsUploaded": documents_uploaded,
                "applicationStatus": application_status,
            },
        }))
    }

    /// Admin user listing with role / active filters, newest first.
    pub fn list_users(
        &self,
        role: Option<Role>,
        is_active: Option<bool>,
        page: usize,
        limit: usize,
    ) -> Result<Page<PublicUser>, ApiError> {
        let mut users: Vec<User> = self
            .storage
            .list_users()?
            .into_iter()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .filter(|u| is_active.map_or(true, |a| u.is_active == a))
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let (page, limit) = (page.max(1), limit.max(1));
        let total = users.len();
        let pages = total.div_ceil(limit);

        let data = users
            .iter()
            .skip((page - 1) * limit)
            .take(limit)
            .map(PublicUser::from)
            .collect();

        Ok(Page {
            data,
            pagination: Pagination {
                total,
                page,
                pages,
                limit,
            },
        })
    }
}

fn count_status(applications: &[Application], status: ApplicationStatus) -> usize {
    applications.iter().filter(|a| a.status == status).count()
}

fn contains_ci(haystack: Option<&str>, needle_lower: &str) -> bool {
    haystack
        .map(|h| h.to_lowercase().contains(needle_lower))
        .unwrap_or(false)
}
