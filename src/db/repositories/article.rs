//! Article repository
//!
//! Database operations for articles and their owned comment lists.
//! Comments are always loaded in creation order so response mapping keeps
//! the order readers saw them in.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Article, ArticleComment, Audit};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Article repository trait
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Create a new article
    async fn create(&self, article: &Article) -> Result<()>;

    /// Get an article with its comments
    async fn get_by_id(&self, id: &str) -> Result<Option<Article>>;

    /// List all articles with their comments, newest first
    async fn list(&self) -> Result<Vec<Article>>;

    /// Persist article fields after a mutation
    async fn update(&self, article: &Article) -> Result<()>;

    /// Delete an article (comments cascade)
    async fn delete(&self, id: &str) -> Result<()>;

    /// Attach a comment to its article
    async fn add_comment(&self, comment: &ArticleComment) -> Result<()>;
}

/// SQLx-based article repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxArticleRepository {
    pool: DynDatabasePool,
}

impl SqlxArticleRepository {
    /// Create a new SQLx article repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ArticleRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ArticleRepository for SqlxArticleRepository {
    async fn create(&self, article: &Article) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_article_sqlite(self.pool.as_sqlite().unwrap(), article).await
            }
            DatabaseDriver::Mysql => {
                create_article_mysql(self.pool.as_mysql().unwrap(), article).await
            }
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Article>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_article_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                get_article_by_id_mysql(self.pool.as_mysql().unwrap(), id).await
            }
        }
    }

    async fn list(&self) -> Result<Vec<Article>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_articles_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_articles_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn update(&self, article: &Article) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_article_sqlite(self.pool.as_sqlite().unwrap(), article).await
            }
            DatabaseDriver::Mysql => {
                update_article_mysql(self.pool.as_mysql().unwrap(), article).await
            }
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                delete_article_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => delete_article_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn add_comment(&self, comment: &ArticleComment) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                add_comment_sqlite(self.pool.as_sqlite().unwrap(), comment).await
            }
            DatabaseDriver::Mysql => add_comment_mysql(self.pool.as_mysql().unwrap(), comment).await,
        }
    }
}

const ARTICLE_COLUMNS: &str = "id, title, short_description, description, image_file_name, \
     article_likes, article_dislikes, created_at, updated_at, created_by_user_id, updated_by_user_id";

const COMMENT_COLUMNS: &str = "id, article_id, comment_text, parent_comment_id, \
     created_at, updated_at, created_by_user_id, updated_by_user_id";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_article_sqlite(pool: &SqlitePool, article: &Article) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO articles (id, title, short_description, description, image_file_name,
                              article_likes, article_dislikes, created_at, updated_at,
                              created_by_user_id, updated_by_user_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&article.id)
    .bind(&article.title)
    .bind(&article.short_description)
    .bind(&article.description)
    .bind(&article.image_file_name)
    .bind(article.article_likes)
    .bind(article.article_dislikes)
    .bind(article.audit.created_at)
    .bind(article.audit.updated_at)
    .bind(&article.audit.created_by_user_id)
    .bind(&article.audit.updated_by_user_id)
    .execute(pool)
    .await
    .context("Failed to create article")?;

    Ok(())
}

async fn get_article_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Article>> {
    let row = sqlx::query(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get article by ID")?;

    let Some(row) = row else {
        return Ok(None);
    };

    let mut article = row_to_article_sqlite(&row)?;
    article.comments = get_comments_sqlite(pool, id).await?;
    Ok(Some(article))
}

async fn list_articles_sqlite(pool: &SqlitePool) -> Result<Vec<Article>> {
    let rows = sqlx::query(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
    .context("Failed to list articles")?;

    let mut articles = Vec::with_capacity(rows.len());
    for row in rows {
        let mut article = row_to_article_sqlite(&row)?;
        article.comments = get_comments_sqlite(pool, &article.id).await?;
        articles.push(article);
    }

    Ok(articles)
}

async fn get_comments_sqlite(pool: &SqlitePool, article_id: &str) -> Result<Vec<ArticleComment>> {
    let rows = sqlx::query(&format!(
        "SELECT {COMMENT_COLUMNS} FROM article_comments WHERE article_id = ? ORDER BY created_at, id"
    ))
    .bind(article_id)
    .fetch_all(pool)
    .await
    .context("Failed to load article comments")?;

    rows.iter().map(row_to_comment_sqlite).collect()
}

async fn update_article_sqlite(pool: &SqlitePool, article: &Article) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE articles
        SET title = ?, short_description = ?, description = ?, image_file_name = ?,
            article_likes = ?, article_dislikes = ?, updated_at = ?, updated_by_user_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&article.title)
    .bind(&article.short_description)
    .bind(&article.description)
    .bind(&article.image_file_name)
    .bind(article.article_likes)
    .bind(article.article_dislikes)
    .bind(article.audit.updated_at)
    .bind(&article.audit.updated_by_user_id)
    .bind(&article.id)
    .execute(pool)
    .await
    .context("Failed to update article")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("Article not found: {}", article.id);
    }
    Ok(())
}

async fn delete_article_sqlite(pool: &SqlitePool, id: &str) -> Result<()> {
    sqlx::query("DELETE FROM articles WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete article")?;
    Ok(())
}

async fn add_comment_sqlite(pool: &SqlitePool, comment: &ArticleComment) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO article_comments (id, article_id, comment_text, parent_comment_id,
                                      created_at, updated_at, created_by_user_id, updated_by_user_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&comment.id)
    .bind(&comment.article_id)
    .bind(&comment.comment_text)
    .bind(&comment.parent_comment_id)
    .bind(comment.audit.created_at)
    .bind(comment.audit.updated_at)
    .bind(&comment.audit.created_by_user_id)
    .bind(&comment.audit.updated_by_user_id)
    .execute(pool)
    .await
    .context("Failed to add comment")?;

    Ok(())
}

fn row_to_article_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Article> {
    Ok(Article {
        id: row.get("id"),
        title: row.get("title"),
        short_description: row.get("short_description"),
        description: row.get("description"),
        image_file_name: row.get("image_file_name"),
        article_likes: row.get("article_likes"),
        article_dislikes: row.get("article_dislikes"),
        comments: Vec::new(),
        audit: Audit {
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            created_by_user_id: row.get("created_by_user_id"),
            updated_by_user_id: row.get("updated_by_user_id"),
        },
    })
}

fn row_to_comment_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<ArticleComment> {
    Ok(ArticleComment {
        id: row.get("id"),
        article_id: row.get("article_id"),
        comment_text: row.get("comment_text"),
        parent_comment_id: row.get("parent_comment_id"),
        audit: Audit {
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            created_by_user_id: row.get("created_by_user_id"),
            updated_by_user_id: row.get("updated_by_user_id"),
        },
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_article_mysql(pool: &MySqlPool, article: &Article) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO articles (id, title, short_description, description, image_file_name,
                              article_likes, article_dislikes, created_at, updated_at,
                              created_by_user_id, updated_by_user_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&article.id)
    .bind(&article.title)
    .bind(&article.short_description)
    .bind(&article.description)
    .bind(&article.image_file_name)
    .bind(article.article_likes)
    .bind(article.article_dislikes)
    .bind(article.audit.created_at)
    .bind(article.audit.updated_at)
    .bind(&article.audit.created_by_user_id)
    .bind(&article.audit.updated_by_user_id)
    .execute(pool)
    .await
    .context("Failed to create article")?;

    Ok(())
}

async fn get_article_by_id_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Article>> {
    let row = sqlx::query(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get article by ID")?;

    let Some(row) = row else {
        return Ok(None);
    };

    let mut article = row_to_article_mysql(&row)?;
    article.comments = get_comments_mysql(pool, id).await?;
    Ok(Some(article))
}

async fn list_articles_mysql(pool: &MySqlPool) -> Result<Vec<Article>> {
    let rows = sqlx::query(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
    .context("Failed to list articles")?;

    let mut articles = Vec::with_capacity(rows.len());
    for row in rows {
        let mut article = row_to_article_mysql(&row)?;
        article.comments = get_comments_mysql(pool, &article.id).await?;
        articles.push(article);
    }

    Ok(articles)
}

async fn get_comments_mysql(pool: &MySqlPool, article_id: &str) -> Result<Vec<ArticleComment>> {
    let rows = sqlx::query(&format!(
        "SELECT {COMMENT_COLUMNS} FROM article_comments WHERE article_id = ? ORDER BY created_at, id"
    ))
    .bind(article_id)
    .fetch_all(pool)
    .await
    .context("Failed to load article comments")?;

    rows.iter().map(row_to_comment_mysql).collect()
}

async fn update_article_mysql(pool: &MySqlPool, article: &Article) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE articles
        SET title = ?, short_description = ?, description = ?, image_file_name = ?,
            article_likes = ?, article_dislikes = ?, updated_at = ?, updated_by_user_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&article.title)
    .bind(&article.short_description)
    .bind(&article.description)
    .bind(&article.image_file_name)
    .bind(article.article_likes)
    .bind(article.article_dislikes)
    .bind(article.audit.updated_at)
    .bind(&article.audit.updated_by_user_id)
    .bind(&article.id)
    .execute(pool)
    .await
    .context("Failed to update article")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("Article not found: {}", article.id);
    }
    Ok(())
}

async fn delete_article_mysql(pool: &MySqlPool, id: &str) -> Result<()> {
    sqlx::query("DELETE FROM articles WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete article")?;
    Ok(())
}

async fn add_comment_mysql(pool: &MySqlPool, comment: &ArticleComment) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO article_comments (id, article_id, comment_text, parent_comment_id,
                                      created_at, updated_at, created_by_user_id, updated_by_user_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&comment.id)
    .bind(&comment.article_id)
    .bind(&comment.comment_text)
    .bind(&comment.parent_comment_id)
    .bind(comment.audit.created_at)
    .bind(comment.audit.updated_at)
    .bind(&comment.audit.created_by_user_id)
    .bind(&comment.audit.updated_by_user_id)
    .execute(pool)
    .await
    .context("Failed to add comment")?;

    Ok(())
}

fn row_to_article_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Article> {
    Ok(Article {
        id: row.get("id"),
        title: row.get("title"),
        short_description: row.get("short_description"),
        description: row.get("description"),
        image_file_name: row.get("image_file_name"),
        article_likes: row.get("article_likes"),
        article_dislikes: row.get("article_dislikes"),
        comments: Vec::new(),
        audit: Audit {
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            created_by_user_id: row.get("created_by_user_id"),
            updated_by_user_id: row.get("updated_by_user_id"),
        },
    })
}

fn row_to_comment_mysql(row: &sqlx::mysql::MySqlRow) -> Result<ArticleComment> {
    Ok(ArticleComment {
        id: row.get("id"),
        article_id: row.get("article_id"),
        comment_text: row.get("comment_text"),
        parent_comment_id: row.get("parent_comment_id"),
        audit: Audit {
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            created_by_user_id: row.get("created_by_user_id"),
            updated_by_user_id: row.get("updated_by_user_id"),
        },
    })
}
