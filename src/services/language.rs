//! Languages service
//!
//! CRUD over content languages. Codes are unique case-insensitively and the
//! seeded English entry can never be deleted.

use crate::db::repositories::LanguageRepository;
use crate::models::{CreateLanguageInput, Language, UpdateLanguageInput};
use std::sync::Arc;

/// Error types for language operations
#[derive(Debug, thiserror::Error)]
pub enum LanguageServiceError {
    /// Language not found
    #[error("Language not found: {0}")]
    NotFound(String),

    /// Validation error (invalid input, duplicate code, protected entry)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Languages service
pub struct LanguageService {
    repo: Arc<dyn LanguageRepository>,
}

impl LanguageService {
    /// Create a new languages service
    pub fn new(repo: Arc<dyn LanguageRepository>) -> Self {
        Self { repo }
    }

    /// List all languages
    pub async fn list(&self) -> Result<Vec<Language>, LanguageServiceError> {
        Ok(self.repo.list().await?)
    }

    /// Get a single language
    pub async fn get(&self, id: &str) -> Result<Language, LanguageServiceError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| LanguageServiceError::NotFound(id.to_string()))
    }

    /// Create a language with a case-insensitively unique code
    pub async fn create(
        &self,
        input: CreateLanguageInput,
        actor: Option<&str>,
    ) -> Result<Language, LanguageServiceError> {
        if input.name.trim().is_empty() || input.code.trim().is_empty() {
            return Err(LanguageServiceError::ValidationError(
                "Name and code are required".to_string(),
            ));
        }

        if let Some(existing) = self.repo.get_by_code(&input.code).await? {
            return Err(LanguageServiceError::ValidationError(format!(
                "Language code '{}' is already in use",
                existing.code
            )));
        }

        let language = Language::new(input, actor);
        self.repo.create(&language).await?;

        tracing::info!(language_id = %language.id, code = %language.code, "Language created");
        Ok(language)
    }

    /// Update a language, keeping code uniqueness (excluding the language
    /// itself)
    pub async fn update(
        &self,
        id: &str,
        input: UpdateLanguageInput,
        actor: Option<&str>,
    ) -> Result<Language, LanguageServiceError> {
        let mut language = self.get(id).await?;

        if let Some(code) = &input.code {
            if let Some(existing) = self.repo.get_by_code(code).await? {
                if existing.id != language.id {
                    return Err(LanguageServiceError::ValidationError(format!(
                        "Language code '{}' is already in use",
                        existing.code
                    )));
                }
            }
        }

        language.apply_update(&input, actor);
        self.repo.update(&language).await?;

        tracing::info!(language_id = %language.id, "Language updated");
        Ok(language)
    }

    /// Delete a language. The English entry is protected.
    pub async fn delete(&self, id: &str) -> Result<(), LanguageServiceError> {
        let language = self.get(id).await?;

        if !language.can_be_deleted() {
            return Err(LanguageServiceError::ValidationError(
                "The English language entry cannot be deleted".to_string(),
            ));
        }

        self.repo.delete(&language.id).await?;

        tracing::info!(language_id = %language.id, code = %language.code, "Language deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxLanguageRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> LanguageService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        LanguageService::new(SqlxLanguageRepository::boxed(pool))
    }

    fn input(name: &str, code: &str) -> CreateLanguageInput {
        CreateLanguageInput {
            name: name.to_string(),
            code: code.to_string(),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_create_stores_lowercase_code() {
        let service = setup().await;

        let language = service
            .create(input("German", "DE"), Some("admin-1"))
            .await
            .expect("Create should succeed");
        assert_eq!(language.code, "de");
    }

    #[tokio::test]
    async fn test_create_duplicate_code_any_case_rejected() {
        let service = setup().await;

        service
            .create(input("Spanish", "es"), None)
            .await
            .expect("Create should succeed");

        let result = service.create(input("Castilian", "ES"), None).await;
        assert!(matches!(
            result,
            Err(LanguageServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_update_to_taken_code_rejected() {
        let service = setup().await;

        service
            .create(input("Spanish", "es"), None)
            .await
            .expect("Create should succeed");
        let french = service
            .create(input("French", "fr"), None)
            .await
            .expect("Create should succeed");

        let result = service
            .update(
                &french.id,
                UpdateLanguageInput {
                    code: Some("ES".to_string()),
                    ..Default::default()
                },
                None,
            )
            .await;
        assert!(matches!(
            result,
            Err(LanguageServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_update_keeping_own_code_allowed() {
        let service = setup().await;

        let french = service
            .create(input("French", "fr"), None)
            .await
            .expect("Create should succeed");

        let updated = service
            .update(
                &french.id,
                UpdateLanguageInput {
                    name: Some("Français".to_string()),
                    code: Some("FR".to_string()),
                    ..Default::default()
                },
                Some("admin-1"),
            )
            .await
            .expect("Update with own code should succeed");
        assert_eq!(updated.name, "Français");
        assert_eq!(updated.code, "fr");
    }

    #[tokio::test]
    async fn test_delete_english_always_fails() {
        let service = setup().await;

        let english = service
            .list()
            .await
            .expect("List should succeed")
            .into_iter()
            .find(|l| l.is_english())
            .expect("English should be seeded");

        let result = service.delete(&english.id).await;
        assert!(matches!(
            result,
            Err(LanguageServiceError::ValidationError(_))
        ));

        // Still there
        assert!(service.get(&english.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_other_language() {
        let service = setup().await;

        let latin = service
            .create(input("Latin", "la"), None)
            .await
            .expect("Create should succeed");

        service
            .delete(&latin.id)
            .await
            .expect("Delete should succeed");

        assert!(matches!(
            service.get(&latin.id).await,
            Err(LanguageServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let service = setup().await;

        let result = service.delete("missing").await;
        assert!(matches!(result, Err(LanguageServiceError::NotFound(_))));
    }
}
