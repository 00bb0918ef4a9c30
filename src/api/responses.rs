//! Response shapes returned by the public API.
//!
//! Entities are flattened into client-facing DTOs here so that storage
//! details (blob file names, nested comment rows) never leak out raw.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Article, Language, User};

/// Build the URL a client fetches an article image from.
///
/// Falls back to a path-rooted URL when no public base is configured so
/// browsers resolve it against whatever origin served the page.
pub fn article_image_url(public_url: Option<&str>, file_name: &str) -> String {
    match public_url.map(str::trim).filter(|base| !base.is_empty()) {
        Some(base) => format!(
            "{}/api/article-images/{}",
            base.trim_end_matches('/'),
            file_name
        ),
        None => format!("/api/article-images/{}", file_name),
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ArticleResponse {
    pub id: String,
    pub title: String,
    pub short_description: String,
    pub description: String,
    pub image_url: Option<String>,
    pub article_likes: i64,
    pub article_dislikes: i64,
    pub comments_count: usize,
    /// Comment texts in insertion order, ready for list rendering
    pub comments_content: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ArticleResponse {
    pub fn from_article(article: Article, public_url: Option<&str>) -> Self {
        let image_url = article
            .image_file_name
            .as_deref()
            .map(|name| article_image_url(public_url, name));
        Self {
            id: article.id,
            title: article.title,
            short_description: article.short_description,
            description: article.description,
            image_url,
            article_likes: article.article_likes,
            article_dislikes: article.article_dislikes,
            comments_count: article.comments.len(),
            comments_content: article
                .comments
                .into_iter()
                .map(|comment| comment.comment_text)
                .collect(),
            created_at: article.audit.created_at,
            updated_at: article.audit.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguageResponse {
    pub id: String,
    pub name: String,
    pub code: String,
    pub is_active: bool,
    pub is_english: bool,
    pub can_be_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Language> for LanguageResponse {
    fn from(language: Language) -> Self {
        Self {
            is_english: language.is_english(),
            can_be_deleted: language.can_be_deleted(),
            id: language.id,
            name: language.name,
            code: language.code,
            is_active: language.is_active,
            created_at: language.audit.created_at,
            updated_at: language.audit.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignedInResponse {
    pub id: String,
    pub email: String,
    pub authentication_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArticleComment, CreateArticleInput, CreateLanguageInput};
    use proptest::prelude::*;

    fn sample_article() -> Article {
        Article::new(
            CreateArticleInput {
                title: "Final score".to_string(),
                short_description: "Short".to_string(),
                description: "Long".to_string(),
                image_file_name: Some("pitch.png".to_string()),
            },
            Some("u1"),
        )
    }

    #[test]
    fn test_image_url_with_public_base() {
        assert_eq!(
            article_image_url(Some("https://hub.example.com/"), "pitch.png"),
            "https://hub.example.com/api/article-images/pitch.png"
        );
    }

    #[test]
    fn test_image_url_falls_back_to_path() {
        assert_eq!(
            article_image_url(None, "pitch.png"),
            "/api/article-images/pitch.png"
        );
        assert_eq!(
            article_image_url(Some("   "), "pitch.png"),
            "/api/article-images/pitch.png"
        );
    }

    #[test]
    fn test_article_without_image_has_no_url() {
        let mut article = sample_article();
        article.image_file_name = None;
        let response = ArticleResponse::from_article(article, Some("https://hub.example.com"));
        assert!(response.image_url.is_none());
    }

    #[test]
    fn test_english_language_response_flags() {
        let language = Language::new(
            CreateLanguageInput {
                name: "English".to_string(),
                code: "EN".to_string(),
                is_active: true,
            },
            None,
        );
        let response = LanguageResponse::from(language);
        assert!(response.is_english);
        assert!(!response.can_be_deleted);
    }

    proptest! {
        #[test]
        fn prop_comment_order_and_count_preserved(texts in proptest::collection::vec("[a-z ]{1,20}", 0..10)) {
            let mut article = sample_article();
            for text in &texts {
                let comment =
                    ArticleComment::new(article.id.clone(), text.clone(), None, None);
                article.comments.push(comment);
            }
            let response = ArticleResponse::from_article(article, None);
            prop_assert_eq!(response.comments_count, texts.len());
            prop_assert_eq!(response.comments_content, texts);
        }
    }
}
