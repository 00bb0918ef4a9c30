//! Articles service
//!
//! Business logic for creating, reading and updating articles and their
//! comments. Mutations are audit-stamped with the acting user.

use crate::db::repositories::ArticleRepository;
use crate::models::{Article, ArticleComment, CreateArticleInput, UpdateArticleInput};
use std::sync::Arc;

/// Error types for article operations
#[derive(Debug, thiserror::Error)]
pub enum ArticleServiceError {
    /// Article not found
    #[error("Article not found: {0}")]
    NotFound(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Articles service
pub struct ArticleService {
    repo: Arc<dyn ArticleRepository>,
}

impl ArticleService {
    /// Create a new articles service
    pub fn new(repo: Arc<dyn ArticleRepository>) -> Self {
        Self { repo }
    }

    /// List all articles with comments, newest first
    pub async fn list(&self) -> Result<Vec<Article>, ArticleServiceError> {
        Ok(self.repo.list().await?)
    }

    /// Get a single article
    pub async fn get(&self, id: &str) -> Result<Article, ArticleServiceError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ArticleServiceError::NotFound(id.to_string()))
    }

    /// Create an article stamped with the acting user
    pub async fn create(
        &self,
        input: CreateArticleInput,
        actor: Option<&str>,
    ) -> Result<Article, ArticleServiceError> {
        if input.title.trim().is_empty() {
            return Err(ArticleServiceError::ValidationError(
                "Title is required".to_string(),
            ));
        }

        let article = Article::new(input, actor);
        self.repo.create(&article).await?;

        tracing::info!(article_id = %article.id, "Article created");
        Ok(article)
    }

    /// Partially update an article. Blank or absent fields keep their
    /// current values.
    pub async fn update(
        &self,
        id: &str,
        input: UpdateArticleInput,
        actor: Option<&str>,
    ) -> Result<Article, ArticleServiceError> {
        let mut article = self.get(id).await?;
        article.apply_update(&input, actor);
        self.repo.update(&article).await?;

        tracing::info!(article_id = %article.id, "Article updated");
        Ok(article)
    }

    /// Add a comment to an article
    pub async fn add_comment(
        &self,
        article_id: &str,
        comment_text: &str,
        parent_comment_id: Option<String>,
        actor: Option<&str>,
    ) -> Result<ArticleComment, ArticleServiceError> {
        if comment_text.trim().is_empty() {
            return Err(ArticleServiceError::ValidationError(
                "Comment text is required".to_string(),
            ));
        }

        // Fail 404 before touching the comments table
        self.get(article_id).await?;

        let comment = ArticleComment::new(
            article_id.to_string(),
            comment_text.to_string(),
            parent_comment_id,
            actor,
        );
        self.repo.add_comment(&comment).await?;

        tracing::info!(article_id = %article_id, "Comment added");
        Ok(comment)
    }

    /// Overwrite the reaction counters
    pub async fn update_reactions(
        &self,
        id: &str,
        likes: i64,
        dislikes: i64,
        actor: Option<&str>,
    ) -> Result<Article, ArticleServiceError> {
        let mut article = self.get(id).await?;
        article.update_reactions(likes, dislikes, actor);
        self.repo.update(&article).await?;
        Ok(article)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxArticleRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> ArticleService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        ArticleService::new(SqlxArticleRepository::boxed(pool))
    }

    fn input(title: &str) -> CreateArticleInput {
        CreateArticleInput {
            title: title.to_string(),
            short_description: "Short".to_string(),
            description: "Long".to_string(),
            image_file_name: None,
        }
    }

    #[tokio::test]
    async fn test_create_requires_title() {
        let service = setup().await;

        let result = service.create(input("   "), None).await;
        assert!(matches!(
            result,
            Err(ArticleServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let service = setup().await;

        let article = service
            .create(input("Cup final preview"), Some("author-1"))
            .await
            .expect("Create should succeed");

        let found = service.get(&article.id).await.expect("Get should succeed");
        assert_eq!(found.title, "Cup final preview");
        assert_eq!(found.audit.created_by_user_id.as_deref(), Some("author-1"));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let service = setup().await;

        let result = service.get("missing").await;
        assert!(matches!(result, Err(ArticleServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let service = setup().await;

        let result = service
            .update("missing", UpdateArticleInput::default(), None)
            .await;
        assert!(matches!(result, Err(ArticleServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let service = setup().await;

        let article = service
            .create(input("Original"), Some("author-1"))
            .await
            .expect("Create should succeed");

        let updated = service
            .update(
                &article.id,
                UpdateArticleInput {
                    short_description: Some("Fresh teaser".to_string()),
                    ..Default::default()
                },
                Some("editor-1"),
            )
            .await
            .expect("Update should succeed");

        assert_eq!(updated.title, "Original");
        assert_eq!(updated.short_description, "Fresh teaser");
        assert_eq!(updated.audit.updated_by_user_id.as_deref(), Some("editor-1"));
    }

    #[tokio::test]
    async fn test_add_comment_to_missing_article() {
        let service = setup().await;

        let result = service.add_comment("missing", "nice", None, None).await;
        assert!(matches!(result, Err(ArticleServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_add_comment_and_reload() {
        let service = setup().await;

        let article = service
            .create(input("Match report"), None)
            .await
            .expect("Create should succeed");

        service
            .add_comment(&article.id, "What a goal", None, Some("fan-1"))
            .await
            .expect("Comment should succeed");

        let found = service.get(&article.id).await.expect("Get should succeed");
        assert_eq!(found.comments.len(), 1);
        assert_eq!(found.comments[0].comment_text, "What a goal");
    }

    #[tokio::test]
    async fn test_update_reactions() {
        let service = setup().await;

        let article = service
            .create(input("Derby"), None)
            .await
            .expect("Create should succeed");

        let updated = service
            .update_reactions(&article.id, 10, 2, None)
            .await
            .expect("Reactions should update");
        assert_eq!(updated.article_likes, 10);
        assert_eq!(updated.article_dislikes, 2);
    }
}
