//! File storage service
//!
//! Stores and serves image blobs from the database. File names are
//! normalized and must be non-blank.

use crate::db::repositories::FileItemRepository;
use crate::models::FileItem;
use std::sync::Arc;

/// Error types for file storage operations
#[derive(Debug, thiserror::Error)]
pub enum FileStorageError {
    /// File not found
    #[error("File not found: {0}")]
    NotFound(String),

    /// Validation error (blank name, empty content)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// File storage service
pub struct FileStorageService {
    repo: Arc<dyn FileItemRepository>,
}

impl FileStorageService {
    /// Create a new file storage service
    pub fn new(repo: Arc<dyn FileItemRepository>) -> Self {
        Self { repo }
    }

    /// Store a blob under a normalized name
    pub async fn put(
        &self,
        file_name: &str,
        content_type: String,
        content: Vec<u8>,
        actor: Option<&str>,
    ) -> Result<FileItem, FileStorageError> {
        if file_name.trim().is_empty() {
            return Err(FileStorageError::ValidationError(
                "File name is required".to_string(),
            ));
        }
        if content.is_empty() {
            return Err(FileStorageError::ValidationError(
                "File content is empty".to_string(),
            ));
        }

        let item = FileItem::new(file_name, content_type, content, actor);
        self.repo.save(&item).await?;

        tracing::info!(file_name = %item.file_name, "File stored");
        Ok(item)
    }

    /// Load a blob by name
    pub async fn get(&self, file_name: &str) -> Result<FileItem, FileStorageError> {
        self.repo
            .get_by_name(file_name)
            .await?
            .ok_or_else(|| FileStorageError::NotFound(file_name.to_string()))
    }
}
