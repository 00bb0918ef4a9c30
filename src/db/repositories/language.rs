//! Language repository
//!
//! Database operations for languages. Codes are stored lowercase, so the
//! code lookup lowercases its argument before querying.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Audit, Language};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Language repository trait
#[async_trait]
pub trait LanguageRepository: Send + Sync {
    /// Create a new language
    async fn create(&self, language: &Language) -> Result<()>;

    /// Get language by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<Language>>;

    /// Get language by ISO code (case-insensitive)
    async fn get_by_code(&self, code: &str) -> Result<Option<Language>>;

    /// List all languages ordered by name
    async fn list(&self) -> Result<Vec<Language>>;

    /// Persist language fields after a mutation
    async fn update(&self, language: &Language) -> Result<()>;

    /// Delete a language
    async fn delete(&self, id: &str) -> Result<()>;
}

/// SQLx-based language repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxLanguageRepository {
    pool: DynDatabasePool,
}

impl SqlxLanguageRepository {
    /// Create a new SQLx language repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn LanguageRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl LanguageRepository for SqlxLanguageRepository {
    async fn create(&self, language: &Language) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_language_sqlite(self.pool.as_sqlite().unwrap(), language).await
            }
            DatabaseDriver::Mysql => {
                create_language_mysql(self.pool.as_mysql().unwrap(), language).await
            }
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Language>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_language_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                get_language_by_id_mysql(self.pool.as_mysql().unwrap(), id).await
            }
        }
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Language>> {
        let code = code.trim().to_lowercase();
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_language_by_code_sqlite(self.pool.as_sqlite().unwrap(), &code).await
            }
            DatabaseDriver::Mysql => {
                get_language_by_code_mysql(self.pool.as_mysql().unwrap(), &code).await
            }
        }
    }

    async fn list(&self) -> Result<Vec<Language>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_languages_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_languages_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn update(&self, language: &Language) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_language_sqlite(self.pool.as_sqlite().unwrap(), language).await
            }
            DatabaseDriver::Mysql => {
                update_language_mysql(self.pool.as_mysql().unwrap(), language).await
            }
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                delete_language_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => delete_language_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }
}

const LANGUAGE_COLUMNS: &str = "id, name, code, is_active, created_at, updated_at, \
     created_by_user_id, updated_by_user_id";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_language_sqlite(pool: &SqlitePool, language: &Language) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO languages (id, name, code, is_active, created_at, updated_at,
                               created_by_user_id, updated_by_user_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&language.id)
    .bind(&language.name)
    .bind(&language.code)
    .bind(language.is_active)
    .bind(language.audit.created_at)
    .bind(language.audit.updated_at)
    .bind(&language.audit.created_by_user_id)
    .bind(&language.audit.updated_by_user_id)
    .execute(pool)
    .await
    .context("Failed to create language")?;

    Ok(())
}

async fn get_language_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Language>> {
    let row = sqlx::query(&format!(
        "SELECT {LANGUAGE_COLUMNS} FROM languages WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get language by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_language_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn get_language_by_code_sqlite(pool: &SqlitePool, code: &str) -> Result<Option<Language>> {
    let row = sqlx::query(&format!(
        "SELECT {LANGUAGE_COLUMNS} FROM languages WHERE code = ?"
    ))
    .bind(code)
    .fetch_optional(pool)
    .await
    .context("Failed to get language by code")?;

    match row {
        Some(row) => Ok(Some(row_to_language_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn list_languages_sqlite(pool: &SqlitePool) -> Result<Vec<Language>> {
    let rows = sqlx::query(&format!(
        "SELECT {LANGUAGE_COLUMNS} FROM languages ORDER BY name"
    ))
    .fetch_all(pool)
    .await
    .context("Failed to list languages")?;

    rows.iter().map(row_to_language_sqlite).collect()
}

async fn update_language_sqlite(pool: &SqlitePool, language: &Language) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE languages
        SET name = ?, code = ?, is_active = ?, updated_at = ?, updated_by_user_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&language.name)
    .bind(&language.code)
    .bind(language.is_active)
    .bind(language.audit.updated_at)
    .bind(&language.audit.updated_by_user_id)
    .bind(&language.id)
    .execute(pool)
    .await
    .context("Failed to update language")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("Language not found: {}", language.id);
    }
    Ok(())
}

async fn delete_language_sqlite(pool: &SqlitePool, id: &str) -> Result<()> {
    sqlx::query("DELETE FROM languages WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete language")?;
    Ok(())
}

fn row_to_language_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Language> {
    Ok(Language {
        id: row.get("id"),
        name: row.get("name"),
        code: row.get("code"),
        is_active: row.get("is_active"),
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

async fn create_language_mysql(pool: &MySqlPool, language: &Language) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO languages (id, name, code, is_active, created_at, updated_at,
                               created_by_user_id, updated_by_user_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&language.id)
    .bind(&language.name)
    .bind(&language.code)
    .bind(language.is_active)
    .bind(language.audit.created_at)
    .bind(language.audit.updated_at)
    .bind(&language.audit.created_by_user_id)
    .bind(&language.audit.updated_by_user_id)
    .execute(pool)
    .await
    .context("Failed to create language")?;

    Ok(())
}

async fn get_language_by_id_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Language>> {
    let row = sqlx::query(&format!(
        "SELECT {LANGUAGE_COLUMNS} FROM languages WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get language by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_language_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn get_language_by_code_mysql(pool: &MySqlPool, code: &str) -> Result<Option<Language>> {
    let row = sqlx::query(&format!(
        "SELECT {LANGUAGE_COLUMNS} FROM languages WHERE code = ?"
    ))
    .bind(code)
    .fetch_optional(pool)
    .await
    .context("Failed to get language by code")?;

    match row {
        Some(row) => Ok(Some(row_to_language_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn list_languages_mysql(pool: &MySqlPool) -> Result<Vec<Language>> {
    let rows = sqlx::query(&format!(
        "SELECT {LANGUAGE_COLUMNS} FROM languages ORDER BY name"
    ))
    .fetch_all(pool)
    .await
    .context("Failed to list languages")?;

    rows.iter().map(row_to_language_mysql).collect()
}

async fn update_language_mysql(pool: &MySqlPool, language: &Language) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE languages
        SET name = ?, code = ?, is_active = ?, updated_at = ?, updated_by_user_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&language.name)
    .bind(&language.code)
    .bind(language.is_active)
    .bind(language.audit.updated_at)
    .bind(&language.audit.updated_by_user_id)
    .bind(&language.id)
    .execute(pool)
    .await
    .context("Failed to update language")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("Language not found: {}", language.id);
    }
    Ok(())
}

async fn delete_language_mysql(pool: &MySqlPool, id: &str) -> Result<()> {
    sqlx::query("DELETE FROM languages WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete language")?;
    Ok(())
}

fn row_to_language_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Language> {
    Ok(Language {
        id: row.get("id"),
        name: row.get("name"),
        code: row.get("code"),
        is_active: row.get("is_active"),
        audit: Audit {
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            created_by_user_id: row.get("created_by_user_id"),
            updated_by_user_id: row.get("updated_by_user_id"),
        },
    })
}
