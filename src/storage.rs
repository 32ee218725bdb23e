//! Persistence layer on Sled.
//!
//! Records are Serde-serialized JSON documents, one tree per record family:
//! - users: id -> User, plus a lowercased-email index tree
//! - applications: id -> Application, plus a student index tree
//! - documents: id -> Document
//!
//! The two uniqueness invariants (one account per email, one application per
//! student) live HERE, not in handler pre-checks: both index trees are
//! written with compare_and_swap, so when two concurrent requests race past
//! the handler's lookup the second writer still loses deterministically.

use sled::Db;
use thiserror::Error;

use crate::models::{Application, Document, Role, User};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Db(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("email already registered")]
    DuplicateEmail,
    #[error("student already has an application")]
    DuplicateApplication,
}

#[allow(dead_code)] // db kept for flush/close on Sled
#[derive(Clone)] // Clone for sharing across handlers (Sled internals cheap to clone)
pub struct Storage {
    db: Db,
    users: sled::Tree,
    users_by_email: sled::Tree,
    applications: sled::Tree,
    applications_by_student: sled::Tree,
    documents: sled::Tree,
}

impl Storage {
    /// Open or create the Sled database at the given path and its trees.
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        let users = db.open_tree("users")?;
        let users_by_email = db.open_tree("users_by_email")?;
        let applications = db.open_tree("applications")?;
        let applications_by_student = db.open_tree("applications_by_student")?;
        let documents = db.open_tree("documents")?;
        Ok(Self {
            db,
            users,
            users_by_email,
            applications,
            applications_by_student,
            documents,
        })
    }

    // --- Users ---

    /// Insert a new user. The email index is claimed first with a CAS so a
    /// duplicate email fails even when the caller's pre-check raced.
    pub fn create_user(&self, user: &User) -> Result<(), StorageError> {
        let email_key = user.email.to_lowercase();
        let claimed = self.users_by_email.compare_and_swap(
            email_key.as_bytes(),
            None as Option<&[u8]>,
            Some(user.id.as_bytes()),
        )?;
        if claimed.is_err() {
            return Err(StorageError::DuplicateEmail);
        }

        let json = serde_json::to_vec(user)?;
        self.users.insert(user.id.as_bytes(), json)?;
        Ok(())
    }

    pub fn get_user(&self, id: &str) -> Result<Option<User>, StorageError> {
        match self.users.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Case-insensitive email lookup through the index tree.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let email_key = email.to_lowercase();
        match self.users_by_email.get(email_key.as_bytes())? {
            Some(id_bytes) => {
                let id = String::from_utf8_lossy(&id_bytes).to_string();
                self.get_user(&id)
            }
            None => Ok(None),
        }
    }

    /// Overwrite an existing user record. Email changes are not supported
    /// through this path (the index entry is not rewritten).
    pub fn update_user(&self, user: &User) -> Result<(), StorageError> {
        let json = serde_json::to_vec(user)?;
        self.users.insert(user.id.as_bytes(), json)?;
        Ok(())
    }

    pub fn list_users(&self) -> Result<Vec<User>, StorageError> {
        let mut users = Vec::new();
        for item in self.users.iter() {
            let (_, bytes) = item?;
            users.push(serde_json::from_slice(&bytes)?);
        }
        Ok(users)
    }

    /// Whether any admin account exists (used by the seed binary).
    pub fn has_admin(&self) -> Result<bool, StorageError> {
        for item in self.users.iter() {
            let (_, bytes) = item?;
            let user: User = serde_json::from_slice(&bytes)?;
            if user.role == Role::Admin {
                return Ok(true);
            }
        }
        Ok(false)
    }

    // --- Applications ---

    /// Insert a new application. The student index is claimed with a CAS;
    /// a second application for the same student fails here regardless of
    /// what the handler's pre-check saw.
    pub fn create_application(&self, application: &Application) -> Result<(), StorageError> {
        let claimed = self.applications_by_student.compare_and_swap(
            application.student.as_bytes(),
            None as Option<&[u8]>,
            Some(application.id.as_bytes()),
        )?;
        if claimed.is_err() {
            return Err(StorageError::DuplicateApplication);
        }

        let json = serde_json::to_vec(application)?;
        self.applications.insert(application.id.as_bytes(), json)?;
        Ok(())
    }

    pub fn get_application(&self, id: &str) -> Result<Option<Application>, StorageError> {
        match self.applications.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn application_for_student(
        &self,
        student_id: &str,
    ) -> Result<Option<Application>, StorageError> {
        match self.applications_by_student.get(student_id.as_bytes())? {
            Some(id_bytes) => {
                let id = String::from_utf8_lossy(&id_bytes).to_string();
                self.get_application(&id)
            }
            None => Ok(None),
        }
    }

    pub fn update_application(&self, application: &Application) -> Result<(), StorageError> {
        let json = serde_json::to_vec(application)?;
        self.applications.insert(application.id.as_bytes(), json)?;
        Ok(())
    }

    /// Remove the application record and its student index entry. Cascade
    /// ordering (documents first) is the lifecycle layer's concern.
    pub fn delete_application_record(&self, application: &Application) -> Result<(), StorageError> {
        self.applications_by_student
            .remove(application.student.as_bytes())?;
        self.applications.remove(application.id.as_bytes())?;
        Ok(())
    }

    pub fn list_applications(&self) -> Result<Vec<Application>, StorageError> {
        let mut applications = Vec::new();
        for item in self.applications.iter() {
            let (_, bytes) = item?;
            applications.push(serde_json::from_slice(&bytes)?);
        }
        Ok(applications)
    }

    // --- Documents ---

    pub fn create_document(&self, document: &Document) -> Result<(), StorageError> {
        let json = serde_json::to_vec(document)?;
        self.documents.insert(document.id.as_bytes(), json)?;
        Ok(())
    }

    pub fn get_document(&self, id: &str) -> Result<Option<Document>, StorageError> {
        match self.documents.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn update_document(&self, document: &Document) -> Result<(), StorageError> {
        let json = serde_json::to_vec(document)?;
        self.documents.insert(document.id.as_bytes(), json)?;
        Ok(())
    }

    pub fn delete_document(&self, id: &str) -> Result<(), StorageError> {
        self.documents.remove(id.as_bytes())?;
        Ok(())
    }

    /// Scan documents by their application back-reference. A scan rather
    /// than the application's own list, so stragglers left by a crash
    /// between the document write and the list append are still found.
    pub fn documents_for_application(
        &self,
        application_id: &str,
    ) -> Result<Vec<Document>, StorageError> {
        let mut documents = Vec::new();
        for item in self.documents.iter() {
            let (_, bytes) = item?;
            let document: Document = serde_json::from_slice(&bytes)?;
            if document.application == application_id {
                documents.push(document);
            }
        }
        Ok(documents)
    }

    pub fn count_documents(&self) -> Result<usize, StorageError> {
        Ok(self.documents.len())
    }
}
