//! File storage collaborator.
//!
//! Uploads land behind the `FileStore` trait so the provider is swappable:
//! the local-disk implementation below writes under the configured upload
//! directory and serves files from `<public_base_url>/uploads/<key>`; a
//! cloud object store slots in behind the same trait. Keys are generated
//! server-side as `applications/<application_id>/<document_id>.<ext>`.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of a durable write: the provider key and the public URL.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub key: String,
    pub url: String,
}

#[async_trait]
pub trait FileStore: Send + Sync {
    async fn put(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredFile, FileStoreError>;

    async fn delete(&self, key: &str) -> Result<(), FileStoreError>;
}

/// Provider key for an uploaded document. The extension is taken from the
/// client file name, defaulting like the upload pipeline of the portal.
pub fn object_key(application_id: &str, document_id: &str, file_name: &str) -> String {
    let extension = file_name.rsplit('.').next().filter(|ext| !ext.is_empty() && *ext != file_name);
    format!(
        "applications/{}/{}.{}",
        application_id,
        document_id,
        extension.unwrap_or("bin")
    )
}

pub struct LocalFileStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        let public_base_url = public_base_url.into();
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn put(
        &self,
        key: &str,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredFile, FileStoreError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, &bytes).await?;

        Ok(StoredFile {
            key: key.to_string(),
            url: format!("{}/uploads/{}", self.public_base_url, key),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), FileStoreError> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            // Already gone is fine for a cleanup path.
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
