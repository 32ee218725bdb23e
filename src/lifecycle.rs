//! Application lifecycle rules.
//!
//! Everything stateful about an admission application funnels through here:
//! the one-application-per-student invariant, the pending-only edit window,
//! admin status overrides, the document attach/detach protocol and the
//! delete cascade. Handlers stay thin; collaborator side effects (blob
//! writes, notification mail) stay outside so these rules remain pure over
//! the store.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::guard::{ensure_owner, require_admin};
use crate::models::{
    AcademicDetails, Application, ApplicationStatus, CoursePreferences, Document, DocumentType,
    PaymentDetails, PersonalDetails, User,
};
use crate::storage::Storage;

/// Payload for a new submission. First-choice course is mandatory and is
/// checked against the fixed enumeration during deserialization.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    #[serde(default)]
    pub personal_details: PersonalDetails,
    #[serde(default)]
    pub academic_details: AcademicDetails,
    pub course_preferences: CoursePreferences,
}

/// Patch for an existing submission; only provided sections are replaced.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationPatch {
    pub personal_details: Option<PersonalDetails>,
    pub academic_details: Option<AcademicDetails>,
    pub course_preferences: Option<CoursePreferences>,
    pub is_payment_completed: Option<bool>,
    pub payment_details: Option<PaymentDetails>,
}

/// Metadata for a document whose blob has already been durably stored.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub id: String,
    pub document_type: DocumentType,
    pub file_name: String,
    pub file_url: String,
    pub public_id: String,
    pub file_size: u64,
    pub mime_type: String,
}

#[derive(Clone)]
pub struct Lifecycle {
    storage: Storage,
    config: Arc<AppConfig>,
}

impl Lifecycle {
    pub fn new(storage: Storage, config: Arc<AppConfig>) -> Self {
        Self { storage, config }
    }

    /// Submit the student's one and only application.
    pub fn submit(&self, student: &User, payload: NewApplication) -> Result<Application, ApiError> {
        // Friendly pre-check; the store index CAS below is the arbiter when
        // two submissions race past this point.
        if self.storage.application_for_student(&student.id)?.is_some() {
            return Err(ApiError::DuplicateApplication);
        }

        let application = Application {
            id: Uuid::new_v4().to_string(),
            student: student.id.clone(),
            personal_details: payload.personal_details,
            academic_details: payload.academic_details,
            course_preferences: payload.course_preferences,
            documents: vec![],
            status: ApplicationStatus::Pending,
            remarks: String::new(),
            submitted_at: Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
            is_payment_completed: false,
            payment_details: None,
        };

        self.storage.create_application(&application)?;
        tracing::info!(application = %application.id, student = %student.id, "application submitted");
        Ok(application)
    }

    /// The caller's own application.
    pub fn my_application(&self, student: &User) -> Result<Application, ApiError> {
        self.storage
            .application_for_student(&student.id)?
            .ok_or_else(|| ApiError::NotFound("No application found".to_string()))
    }

    /// Look up an application and check the actor may act on it.
    /// Absence is a 404 for everyone; the ownership comparison only runs
    /// against an application that exists.
    pub fn owned_application(&self, actor: &User, id: &str) -> Result<Application, ApiError> {
        let application = self
            .storage
            .get_application(id)?
            .ok_or_else(|| ApiError::NotFound("Application not found".to_string()))?;
        ensure_owner(actor, &application)?;
        Ok(application)
    }

    /// Student edit, only while the application is still pending. Once
    /// reviewed the student loses edit rights until an admin resets the
    /// status back to pending.
    pub fn update(
        &self,
        actor: &User,
        id: &str,
        patch: ApplicationPatch,
    ) -> Result<Application, ApiError> {
        let mut application = self.owned_application(actor, id)?;

        if application.status != ApplicationStatus::Pending {
            return Err(ApiError::Forbidden(
                "Cannot update application after review".to_string(),
            ));
        }

        if let Some(personal) = patch.personal_details {
            application.personal_details = personal;
        }
        if let Some(academic) = patch.academic_details {
            application.academic_details = academic;
        }
        if let Some(preferences) = patch.course_preferences {
            application.course_preferences = preferences;
        }
        if let Some(paid) = patch.is_payment_completed {
            application.is_payment_completed = paid;
        }
        if let Some(payment) = patch.payment_details {
            application.payment_details = Some(payment);
        }

        self.storage.update_application(&application)?;
        Ok(application)
    }

    /// Admin review: any status may be set from any status (there is no
    /// terminal state; moving back to pending reopens student edits).
    /// Stamps the reviewer and review time on every call.
    pub fn set_status(
        &self,
        admin: &User,
        id: &str,
        status_raw: &str,
        remarks: Option<String>,
    ) -> Result<Application, ApiError> {
        require_admin(admin)?;

        let status = ApplicationStatus::parse(status_raw).ok_or(ApiError::InvalidStatus)?;

        let mut application = self
            .storage
            .get_application(id)?
            .ok_or_else(|| ApiError::NotFound("Application not found".to_string()))?;

        application.status = status;
        application.remarks = remarks.unwrap_or_default();
        application.reviewed_at = Some(Utc::now());
        application.reviewed_by = Some(admin.id.clone());

        self.storage.update_application(&application)?;
        tracing::info!(
            application = %application.id,
            status = status.as_str(),
            reviewed_by = %admin.id,
            "application status updated"
        );
        Ok(application)
    }

    /// Delete an application with its documents. Documents go first: a
    /// crash mid-cascade leaves orphan document records (swept by the
    /// scan-based lookup), never an application that silently lost its
    /// files. Returns the removed documents so the caller can clean up
    /// stored blobs.
    pub fn delete(&self, actor: &User, id: &str) -> Result<Vec<Document>, ApiError> {
        let application = self.owned_application(actor, id)?;

        let documents = self.storage.documents_for_application(&application.id)?;
        for document in &documents {
            self.storage.delete_document(&document.id)?;
        }
        self.storage.delete_application_record(&application)?;

        tracing::info!(
            application = %application.id,
            documents = documents.len(),
            "application deleted"
        );
        Ok(documents)
    }

    /// Size and MIME checks against the configured limits. Runs BEFORE any
    /// blob or metadata is persisted.
    pub fn validate_upload(&self, file_size: u64, mime_type: &str) -> Result<(), ApiError> {
        if file_size > self.config.max_file_size {
            return Err(ApiError::Validation(format!(
                "File exceeds the maximum size of {} bytes",
                self.config.max_file_size
            )));
        }
        if !self.config.is_allowed_type(mime_type) {
            return Err(ApiError::Validation(
                "Invalid file type. Only JPEG, PNG, JPG, and PDF are allowed.".to_string(),
            ));
        }
        Ok(())
    }

    /// Record an uploaded document and reference it from its application.
    /// The document record is written first and the application's list
    /// second, so a failure in between leaves an unreferenced document
    /// rather than a reference to a missing one.
    pub fn attach_document(
        &self,
        actor: &User,
        application_id: &str,
        upload: DocumentUpload,
    ) -> Result<Document, ApiError> {
        let mut application = self.owned_application(actor, application_id)?;

        let document = Document {
            id: upload.id,
            application: application.id.clone(),
            student: application.student.clone(),
            document_type: upload.document_type,
            file_name: upload.file_name,
            file_url: upload.file_url,
            public_id: upload.public_id,
            file_size: upload.file_size,
            mime_type: upload.mime_type,
            uploaded_at: Utc::now(),
            is_verified: false,
            verification_notes: None,
        };

        self.storage.create_document(&document)?;

        application.documents.push(document.id.clone());
        self.storage.update_application(&application)?;

        tracing::info!(
            document = %document.id,
            application = %application.id,
            document_type = document.document_type.as_str(),
            "document attached"
        );
        Ok(document)
    }

    /// Remove a document: first the reference in the parent application's
    /// list, then the record itself. Returns the document so the caller
    /// can delete the stored blob.
    pub fn detach_document(&self, actor: &User, document_id: &str) -> Result<Document, ApiError> {
        let document = self
            .storage
            .get_document(document_id)?
            .ok_or_else(|| ApiError::NotFound("Document not found".to_string()))?;
        ensure_owner(actor, &document)?;

        if let Some(mut application) = self.storage.get_application(&document.application)? {
            application.documents.retain(|id| id != &document.id);
            self.storage.update_application(&application)?;
        }
        self.storage.delete_document(&document.id)?;

        tracing::info!(document = %document.id, "document detached");
        Ok(document)
    }

    /// Documents of an application, for its owner or an admin.
    pub fn application_documents(
        &self,
        actor: &User,
        application_id: &str,
    ) -> Result<Vec<Document>, ApiError> {
        let application = self.owned_application(actor, application_id)?;
        Ok(self.storage.documents_for_application(&application.id)?)
    }

    /// Admin verification of a single document.
    pub fn verify_document(
        &self,
        admin: &User,
        document_id: &str,
        is_verified: bool,
        verification_notes: Option<String>,
    ) -> Result<Document, ApiError> {
        require_admin(admin)?;

        let mut document = self
            .storage
            .get_document(document_id)?
            .ok_or_else(|| ApiError::NotFound("Document not found".to_string()))?;

        document.is_verified = is_verified;
        document.verification_notes = verification_notes;
        self.storage.update_document(&document)?;
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Address, Course, Gender, Role};
    use chrono::NaiveDate;
    use std::fs;

    fn test_config() -> Arc<AppConfig> {
        Arc::new(AppConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            data_dir: "unused".to_string(),
            upload_dir: "unused".to_string(),
            public_base_url: "http://localhost:5000".to_string(),
            log_dir: "logs".to_string(),
            jwt_secret: "test_secret".to_string(),
            jwt_expiry_secs: 3600,
            max_file_size: 5 * 1024 * 1024,
            allowed_file_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/jpg".to_string(),
                "application/pdf".to_string(),
            ],
            mail: None,
            default_admin_email: "admin@college.edu".to_string(),
            default_admin_password: "Admin@123".to_string(),
        })
    }

    fn temp_lifecycle(name: &str) -> (Lifecycle, Storage, std::path::PathBuf) {
        let temp_dir = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&temp_dir);
        let storage = Storage::open(temp_dir.to_str().unwrap()).expect("Failed to open storage");
        let lifecycle = Lifecycle::new(storage.clone(), test_config());
        (lifecycle, storage, temp_dir)
    }

    fn user(id: &str, role: Role) -> User {
        User {
            id: id.to_string(),
            name: format!("User {}", id),
            email: format!("{}@example.com", id),
            password_hash: String::new(),
            role,
            phone: "9876543210".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2004, 7, 2).unwrap(),
            gender: Gender::Female,
            address: Address::default(),
            is_active: true,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn new_application(first_choice: Course) -> NewApplication {
        NewApplication {
            personal_details: PersonalDetails {
                full_name: Some("Asha Verma".to_string()),
                father_name: Some("R. Verma".to_string()),
                ..Default::default()
            },
            academic_details: Default::default(),
            course_preferences: CoursePreferences {
                first_choice,
                second_choice: Some(Course::InformationTechnology),
                third_choice: None,
            },
        }
    }

    fn upload(id: &str) -> DocumentUpload {
        DocumentUpload {
            id: id.to_string(),
            document_type: DocumentType::Marksheet10th,
            file_name: "marks.pdf".to_string(),
            file_url: format!("http://localhost:5000/uploads/{}.pdf", id),
            public_id: format!("applications/x/{}.pdf", id),
            file_size: 2048,
            mime_type: "application/pdf".to_string(),
        }
    }

    #[test]
    fn test_submit_then_second_submit_fails() {
        let (lifecycle, _storage, temp_dir) = temp_lifecycle("portal_test_lc_submit");
        let student = user("s1", Role::Student);

        let app = lifecycle
            .submit(&student, new_application(Course::ComputerScience))
            .expect("first submit");
        assert_eq!(app.status, ApplicationStatus::Pending);
        assert_eq!(app.course_preferences.first_choice, Course::ComputerScience);

        let err = lifecycle
            .submit(&student, new_application(Course::Arts))
            .expect_err("second submit must fail");
        assert_eq!(err.kind(), "DUPLICATE_APPLICATION");

        // Round trip: own fetch returns the submitted fields
        let mine = lifecycle.my_application(&student).unwrap();
        assert_eq!(mine.id, app.id);
        assert_eq!(
            mine.personal_details.full_name.as_deref(),
            Some("Asha Verma")
        );

        let _ = fs::remove_dir_all(temp_dir);
    }

    #[test]
    fn test_update_locked_after_review_and_reopened_on_pending() {
        let (lifecycle, _storage, temp_dir) = temp_lifecycle("portal_test_lc_update_lock");
        let student = user("s1", Role::Student);
        let admin = user("a1", Role::Admin);

        let app = lifecycle
            .submit(&student, new_application(Course::Commerce))
            .unwrap();

        // Editable while pending
        let patch = ApplicationPatch {
            is_payment_completed: Some(true),
            ..Default::default()
        };
        let updated = lifecycle.update(&student, &app.id, patch).expect("pending edit");
        assert!(updated.is_payment_completed);

        // Locked after approval
        lifecycle
            .set_status(&admin, &app.id, "approved", None)
            .unwrap();
        let err = lifecycle
            .update(&student, &app.id, ApplicationPatch::default())
            .expect_err("must be locked");
        assert_eq!(err.kind(), "FORBIDDEN");

        // Admin override back to pending reopens the edit window
        lifecycle
            .set_status(&admin, &app.id, "pending", None)
            .unwrap();
        lifecycle
            .update(&student, &app.id, ApplicationPatch::default())
            .expect("reopened edit");

        let _ = fs::remove_dir_all(temp_dir);
    }

    #[test]
    fn test_set_status_stamps_review_metadata() {
        let (lifecycle, _storage, temp_dir) = temp_lifecycle("portal_test_lc_review");
        let student = user("s1", Role::Student);
        let admin = user("a1", Role::Admin);

        let app = lifecycle
            .submit(&student, new_application(Course::CivilEngineering))
            .unwrap();

        let reviewed = lifecycle
            .set_status(&admin, &app.id, "approved", Some("Meets criteria".to_string()))
            .expect("review");
        assert_eq!(reviewed.status, ApplicationStatus::Approved);
        assert_eq!(reviewed.remarks, "Meets criteria");
        assert_eq!(reviewed.reviewed_by.as_deref(), Some("a1"));
        assert!(reviewed.reviewed_at.is_some());

        // Outside the enumeration
        let err = lifecycle
            .set_status(&admin, &app.id, "waitlisted", None)
            .expect_err("invalid status");
        assert_eq!(err.kind(), "INVALID_STATUS");

        // Students never transition status
        let err = lifecycle
            .set_status(&student, &app.id, "approved", None)
            .expect_err("student cannot review");
        assert_eq!(err.kind(), "FORBIDDEN");

        let _ = fs::remove_dir_all(temp_dir);
    }

    #[test]
    fn test_delete_cascades_documents_first() {
        let (lifecycle, storage, temp_dir) = temp_lifecycle("portal_test_lc_cascade");
        let student = user("s1", Role::Student);

        let app = lifecycle
            .submit(&student, new_application(Course::Arts))
            .unwrap();
        lifecycle
            .attach_document(&student, &app.id, upload("d1"))
            .unwrap();
        lifecycle
            .attach_document(&student, &app.id, upload("d2"))
            .unwrap();

        let removed = lifecycle.delete(&student, &app.id).expect("delete");
        assert_eq!(removed.len(), 2);
        assert!(storage.get_application(&app.id).unwrap().is_none());
        assert!(storage.get_document("d1").unwrap().is_none());
        assert!(storage.get_document("d2").unwrap().is_none());

        // Student may submit again afterwards
        lifecycle
            .submit(&student, new_application(Course::Commerce))
            .expect("resubmission");

        let _ = fs::remove_dir_all(temp_dir);
    }

    #[test]
    fn test_strangers_cannot_touch_someone_elses_application() {
        let (lifecycle, storage, temp_dir) = temp_lifecycle("portal_test_lc_strangers");
        let owner = user("s1", Role::Student);
        let stranger = user("s2", Role::Student);

        let app = lifecycle
            .submit(&owner, new_application(Course::ComputerScience))
            .unwrap();
        lifecycle
            .attach_document(&owner, &app.id, upload("d1"))
            .unwrap();

        let err = lifecycle
            .update(&stranger, &app.id, ApplicationPatch::default())
            .expect_err("update denied");
        assert_eq!(err.kind(), "FORBIDDEN");

        let err = lifecycle
            .delete(&stranger, &app.id)
            .expect_err("delete denied");
        assert_eq!(err.kind(), "FORBIDDEN");

        let err = lifecycle
            .detach_document(&stranger, "d1")
            .expect_err("detach denied");
        assert_eq!(err.kind(), "FORBIDDEN");

        // Everything intact afterwards
        assert!(storage.get_application(&app.id).unwrap().is_some());
        assert!(storage.get_document("d1").unwrap().is_some());

        // Absent resources are 404, never an ownership answer
        let err = lifecycle
            .update(&stranger, "no-such-id", ApplicationPatch::default())
            .expect_err("missing application");
        assert_eq!(err.kind(), "NOT_FOUND");

        let _ = fs::remove_dir_all(temp_dir);
    }

    #[test]
    fn test_attach_appends_and_detach_removes_reference() {
        let (lifecycle, storage, temp_dir) = temp_lifecycle("portal_test_lc_documents");
        let student = user("s1", Role::Student);

        let app = lifecycle
            .submit(&student, new_application(Course::InformationTechnology))
            .unwrap();
        let doc = lifecycle
            .attach_document(&student, &app.id, upload("d1"))
            .expect("attach");
        assert!(!doc.is_verified);

        let stored = storage.get_application(&app.id).unwrap().unwrap();
        assert_eq!(stored.documents, vec!["d1".to_string()]);

        let detached = lifecycle.detach_document(&student, "d1").expect("detach");
        assert_eq!(detached.id, "d1");

        let stored = storage.get_application(&app.id).unwrap().unwrap();
        assert!(stored.documents.is_empty());
        assert!(storage.get_document("d1").unwrap().is_none());
        assert!(lifecycle
            .application_documents(&student, &app.id)
            .unwrap()
            .is_empty());

        // Fetching the detached document now 404s
        let err = lifecycle
            .detach_document(&student, "d1")
            .expect_err("already gone");
        assert_eq!(err.kind(), "NOT_FOUND");

        let _ = fs::remove_dir_all(temp_dir);
    }

    #[test]
    fn test_upload_validation_rejects_before_persistence() {
        let (lifecycle, _storage, temp_dir) = temp_lifecycle("portal_test_lc_upload_rules");

        // 6 MB PDF is over the 5 MB cap
        let err = lifecycle
            .validate_upload(6 * 1024 * 1024, "application/pdf")
            .expect_err("too large");
        assert_eq!(err.kind(), "VALIDATION_ERROR");

        let err = lifecycle
            .validate_upload(1024, "application/zip")
            .expect_err("bad type");
        assert_eq!(err.kind(), "VALIDATION_ERROR");

        lifecycle
            .validate_upload(1024, "image/png")
            .expect("png under the cap");

        let _ = fs::remove_dir_all(temp_dir);
    }

    #[test]
    fn test_admin_verifies_document() {
        let (lifecycle, _storage, temp_dir) = temp_lifecycle("portal_test_lc_verify");
        let student = user("s1", Role::Student);
        let admin = user("a1", Role::Admin);

        let app = lifecycle
            .submit(&student, new_application(Course::Commerce))
            .unwrap();
        lifecycle
            .attach_document(&student, &app.id, upload("d1"))
            .unwrap();

        let verified = lifecycle
            .verify_document(&admin, "d1", true, Some("Legible copy".to_string()))
            .expect("verify");
        assert!(verified.is_verified);
        assert_eq!(verified.verification_notes.as_deref(), Some("Legible copy"));

        let err = lifecycle
            .verify_document(&student, "d1", true, None)
            .expect_err("student cannot verify");
        assert_eq!(err.kind(), "FORBIDDEN");

        let _ = fs::remove_dir_all(temp_dir);
    }
}
