//! Article model
//!
//! This module provides:
//! - `Article` entity with its owned comment list
//! - `ArticleComment` entity
//! - Input types for creating and updating articles
//!
//! Articles are mutated only through `apply_update`, `set_image` and
//! `update_reactions`, so audit stamping happens in one place.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Audit;

/// Article entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Unique identifier
    pub id: String,
    /// Article title
    pub title: String,
    /// Teaser text shown in listings
    pub short_description: String,
    /// Full article body
    pub description: String,
    /// Stored image file name, if an image was attached
    pub image_file_name: Option<String>,
    /// Like count
    #[serde(default)]
    pub article_likes: i64,
    /// Dislike count
    #[serde(default)]
    pub article_dislikes: i64,
    /// Comments in insertion order
    #[serde(default)]
    pub comments: Vec<ArticleComment>,
    /// Audit metadata
    #[serde(flatten)]
    pub audit: Audit,
}

impl Article {
    /// Create a new article stamped with the creating actor
    pub fn new(input: CreateArticleInput, actor: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            short_description: input.short_description,
            description: input.description,
            image_file_name: input.image_file_name,
            article_likes: 0,
            article_dislikes: 0,
            comments: Vec::new(),
            audit: Audit::track_creation(actor),
        }
    }

    /// Apply a partial update. Absent or blank fields retain their current
    /// values, so sparse PATCH bodies never blank out existing content.
    pub fn apply_update(&mut self, input: &UpdateArticleInput, actor: Option<&str>) {
        if let Some(title) = non_blank(input.title.as_deref()) {
            self.title = title.to_string();
        }
        if let Some(short_description) = non_blank(input.short_description.as_deref()) {
            self.short_description = short_description.to_string();
        }
        if let Some(description) = non_blank(input.description.as_deref()) {
            self.description = description.to_string();
        }
        if let Some(image_file_name) = non_blank(input.image_file_name.as_deref()) {
            self.image_file_name = Some(image_file_name.to_string());
        }
        self.audit.track_update(actor);
    }

    /// Attach a stored image by file name
    pub fn set_image(&mut self, file_name: String, actor: Option<&str>) {
        self.image_file_name = Some(file_name);
        self.audit.track_update(actor);
    }

    /// Overwrite the reaction counters
    pub fn update_reactions(&mut self, likes: i64, dislikes: i64, actor: Option<&str>) {
        self.article_likes = likes;
        self.article_dislikes = dislikes;
        self.audit.track_update(actor);
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Comment attached to an article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleComment {
    /// Unique identifier
    pub id: String,
    /// The article this comment belongs to
    pub article_id: String,
    /// Comment body
    pub comment_text: String,
    /// Parent comment for threaded replies
    pub parent_comment_id: Option<String>,
    /// Audit metadata
    #[serde(flatten)]
    pub audit: Audit,
}

impl ArticleComment {
    /// Create a new comment on the given article
    pub fn new(
        article_id: String,
        comment_text: String,
        parent_comment_id: Option<String>,
        actor: Option<&str>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            article_id,
            comment_text,
            parent_comment_id,
            audit: Audit::track_creation(actor),
        }
    }
}

/// Input for creating a new article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateArticleInput {
    /// Article title
    pub title: String,
    /// Teaser text shown in listings
    pub short_description: String,
    /// Full article body
    pub description: String,
    /// Stored image file name (optional)
    #[serde(default)]
    pub image_file_name: Option<String>,
}

/// Input for partially updating an existing article
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateArticleInput {
    /// New title (optional)
    pub title: Option<String>,
    /// New teaser text (optional)
    pub short_description: Option<String>,
    /// New body (optional)
    pub description: Option<String>,
    /// New image file name (optional)
    pub image_file_name: Option<String>,
}
