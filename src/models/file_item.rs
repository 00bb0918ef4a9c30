//! Stored file model
//!
//! Images live as blobs in the database. File names are normalized
//! (trim + lowercase) so lookups are case-insensitive.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Audit;

/// A file stored as a database blob
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileItem {
    /// Unique identifier
    pub id: String,
    /// Normalized file name, unique
    pub file_name: String,
    /// MIME type served with the content
    pub content_type: String,
    /// Raw file bytes
    #[serde(skip_serializing)]
    pub content: Vec<u8>,
    /// Audit metadata
    #[serde(flatten)]
    pub audit: Audit,
}

impl FileItem {
    /// Create a new file item with a normalized name
    pub fn new(
        file_name: &str,
        content_type: String,
        content: Vec<u8>,
        actor: Option<&str>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            file_name: normalize_file_name(file_name),
            content_type,
            content,
            audit: Audit::track_creation(actor),
        }
    }
}

/// Normalize a stored file name for lookup: trim whitespace, lowercase.
pub fn normalize_file_name(file_name: &str) -> String {
    file_name.trim().to_lowercase()
}
