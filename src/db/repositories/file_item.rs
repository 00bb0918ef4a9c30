//! File item repository
//!
//! Stores file blobs in the database. Callers pass normalized file names
//! (the model normalizes on construction); lookups normalize again so a
//! raw path segment from a URL still matches.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::file_item::normalize_file_name;
use crate::models::{Audit, FileItem};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// File item repository trait
#[async_trait]
pub trait FileItemRepository: Send + Sync {
    /// Store a file blob
    async fn save(&self, item: &FileItem) -> Result<()>;

    /// Load a file blob by name (normalized before lookup)
    async fn get_by_name(&self, file_name: &str) -> Result<Option<FileItem>>;
}

/// SQLx-based file item repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxFileItemRepository {
    pool: DynDatabasePool,
}

impl SqlxFileItemRepository {
    /// Create a new SQLx file item repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn FileItemRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl FileItemRepository for SqlxFileItemRepository {
    async fn save(&self, item: &FileItem) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => save_file_sqlite(self.pool.as_sqlite().unwrap(), item).await,
            DatabaseDriver::Mysql => save_file_mysql(self.pool.as_mysql().unwrap(), item).await,
        }
    }

    async fn get_by_name(&self, file_name: &str) -> Result<Option<FileItem>> {
        let file_name = normalize_file_name(file_name);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_file_by_name_sqlite(self.pool.as_sqlite().unwrap(), &file_name).await
            }
            DatabaseDriver::Mysql => {
                get_file_by_name_mysql(self.pool.as_mysql().unwrap(), &file_name).await
            }
        }
    }
}

const FILE_COLUMNS: &str = "id, file_name, content_type, content, created_at, updated_at, \
     created_by_user_id, updated_by_user_id";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn save_file_sqlite(pool: &SqlitePool, item: &FileItem) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO file_items (id, file_name, content_type, content, created_at, updated_at,
                                created_by_user_id, updated_by_user_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&item.id)
    .bind(&item.file_name)
    .bind(&item.content_type)
    .bind(&item.content)
    .bind(item.audit.created_at)
    .bind(item.audit.updated_at)
    .bind(&item.audit.created_by_user_id)
    .bind(&item.audit.updated_by_user_id)
    .execute(pool)
    .await
    .context("Failed to save file")?;

    Ok(())
}

async fn get_file_by_name_sqlite(pool: &SqlitePool, file_name: &str) -> Result<Option<FileItem>> {
    let row = sqlx::query(&format!(
        "SELECT {FILE_COLUMNS} FROM file_items WHERE file_name = ?"
    ))
    .bind(file_name)
    .fetch_optional(pool)
    .await
    .context("Failed to get file by name")?;

    match row {
        Some(row) => Ok(Some(row_to_file_sqlite(&row)?)),
        None => Ok(None),
    }
}

fn row_to_file_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<FileItem> {
    Ok(FileItem {
        id: row.get("id"),
        file_name: row.get("file_name"),
        content_type: row.get("content_type"),
        content: row.get("content"),
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

async fn save_file_mysql(pool: &MySqlPool, item: &FileItem) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO file_items (id, file_name, content_type, content, created_at, updated_at,
                                created_by_user_id, updated_by_user_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&item.id)
    .bind(&item.file_name)
    .bind(&item.content_type)
    .bind(&item.content)
    .bind(item.audit.created_at)
    .bind(item.audit.updated_at)
    .bind(&item.audit.created_by_user_id)
    .bind(&item.audit.updated_by_user_id)
    .execute(pool)
    .await
    .context("Failed to save file")?;

    Ok(())
}

async fn get_file_by_name_mysql(pool: &MySqlPool, file_name: &str) -> Result<Option<FileItem>> {
    let row = sqlx::query(&format!(
        "SELECT {FILE_COLUMNS} FROM file_items WHERE file_name = ?"
    ))
    .bind(file_name)
    .fetch_optional(pool)
    .await
    .context("Failed to get file by name")?;

    match row {
        Some(row) => Ok(Some(row_to_file_mysql(&row)?)),
        None => Ok(None),
    }
}

fn row_to_file_mysql(row: &sqlx::mysql::MySqlRow) -> Result<FileItem> {
    Ok(FileItem {
        id: row.get("id"),
        file_name: row.get("file_name"),
        content_type: row.get("content_type"),
        content: row.get("content"),
        audit: Audit {
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            created_by_user_id: row.get("created_by_user_id"),
            updated_by_user_id: row.get("updated_by_user_id"),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> Arc<dyn FileItemRepository> {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxFileItemRepository::boxed(pool)
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let repo = setup().await;

        let item = FileItem::new("goal.png", "image/png".to_string(), vec![1, 2, 3], None);
        repo.save(&item).await.expect("Failed to save");

        let found = repo
            .get_by_name("goal.png")
            .await
            .expect("Failed to query")
            .expect("File should exist");
        assert_eq!(found.content, vec![1, 2, 3]);
        assert_eq!(found.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_lookup_normalizes_name() {
        let repo = setup().await;

        let item = FileItem::new("Goal.PNG", "image/png".to_string(), vec![9], None);
        repo.save(&item).await.expect("Failed to save");

        let found = repo
            .get_by_name("  GOAL.png ")
            .await
            .expect("Failed to query");
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let repo = setup().await;

        let found = repo.get_by_name("nope.jpg").await.expect("Failed to query");
        assert!(found.is_none());
    }
}
