//! Password reset token repository
//!
//! One outstanding token per user (user_id is the primary key). Replacing a
//! token deletes the old row first; consuming a token deletes it explicitly.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::PasswordResetToken;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Reset token repository trait
#[async_trait]
pub trait ResetTokenRepository: Send + Sync {
    /// Store a token, replacing any existing one for the same user
    async fn save(&self, token: &PasswordResetToken) -> Result<()>;

    /// Get the outstanding token for a user
    async fn get_by_user_id(&self, user_id: &str) -> Result<Option<PasswordResetToken>>;

    /// Delete a user's token (after consumption or replacement)
    async fn delete(&self, user_id: &str) -> Result<()>;
}

/// SQLx-based reset token repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxResetTokenRepository {
    pool: DynDatabasePool,
}

impl SqlxResetTokenRepository {
    /// Create a new SQLx reset token repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ResetTokenRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ResetTokenRepository for SqlxResetTokenRepository {
    async fn save(&self, token: &PasswordResetToken) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => save_token_sqlite(self.pool.as_sqlite().unwrap(), token).await,
            DatabaseDriver::Mysql => save_token_mysql(self.pool.as_mysql().unwrap(), token).await,
        }
    }

    async fn get_by_user_id(&self, user_id: &str) -> Result<Option<PasswordResetToken>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_token_sqlite(self.pool.as_sqlite().unwrap(), user_id).await
            }
            DatabaseDriver::Mysql => get_token_mysql(self.pool.as_mysql().unwrap(), user_id).await,
        }
    }

    async fn delete(&self, user_id: &str) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                delete_token_sqlite(self.pool.as_sqlite().unwrap(), user_id).await
            }
            DatabaseDriver::Mysql => {
                delete_token_mysql(self.pool.as_mysql().unwrap(), user_id).await
            }
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn save_token_sqlite(pool: &SqlitePool, token: &PasswordResetToken) -> Result<()> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO password_reset_tokens (user_id, token, purpose, created_at, expires_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&token.user_id)
    .bind(&token.token)
    .bind(&token.purpose)
    .bind(token.created_at)
    .bind(token.expires_at)
    .execute(pool)
    .await
    .context("Failed to save reset token")?;

    Ok(())
}

async fn get_token_sqlite(pool: &SqlitePool, user_id: &str) -> Result<Option<PasswordResetToken>> {
    let row = sqlx::query(
        "SELECT user_id, token, purpose, created_at, expires_at FROM password_reset_tokens WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("Failed to get reset token")?;

    Ok(row.map(|row| PasswordResetToken {
        user_id: row.get("user_id"),
        token: row.get("token"),
        purpose: row.get("purpose"),
        created_at: row.get("created_at"),
        expires_at: row.get("expires_at"),
    }))
}

async fn delete_token_sqlite(pool: &SqlitePool, user_id: &str) -> Result<()> {
    sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to delete reset token")?;
    Ok(())
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn save_token_mysql(pool: &MySqlPool, token: &PasswordResetToken) -> Result<()> {
    sqlx::query(
        r#"
        REPLACE INTO password_reset_tokens (user_id, token, purpose, created_at, expires_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&token.user_id)
    .bind(&token.token)
    .bind(&token.purpose)
    .bind(token.created_at)
    .bind(token.expires_at)
    .execute(pool)
    .await
    .context("Failed to save reset token")?;

    Ok(())
}

async fn get_token_mysql(pool: &MySqlPool, user_id: &str) -> Result<Option<PasswordResetToken>> {
    let row = sqlx::query(
        "SELECT user_id, token, purpose, created_at, expires_at FROM password_reset_tokens WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("Failed to get reset token")?;

    Ok(row.map(|row| PasswordResetToken {
        user_id: row.get("user_id"),
        token: row.get("token"),
        purpose: row.get("purpose"),
        created_at: row.get("created_at"),
        expires_at: row.get("expires_at"),
    }))
}

async fn delete_token_mysql(pool: &MySqlPool, user_id: &str) -> Result<()> {
    sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to delete reset token")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations, DynDatabasePool};
    use crate::db::repositories::{SqlxUserRepository, UserRepository};
    use crate::models::User;

    async fn setup() -> (DynDatabasePool, Arc<dyn ResetTokenRepository>, User) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::boxed(pool.clone());
        let user = User::new("fan@example.com".to_string(), "hash".to_string());
        users.create(&user).await.expect("Failed to create user");

        let repo = SqlxResetTokenRepository::boxed(pool.clone());
        (pool, repo, user)
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let (_pool, repo, user) = setup().await;

        let token = PasswordResetToken::issue(user.id.clone());
        repo.save(&token).await.expect("Failed to save");

        let found = repo
            .get_by_user_id(&user.id)
            .await
            .expect("Failed to query")
            .expect("Token should exist");
        assert_eq!(found.token, token.token);
        assert_eq!(found.purpose, "password_reset");
    }

    #[tokio::test]
    async fn test_save_replaces_existing() {
        let (_pool, repo, user) = setup().await;

        let first = PasswordResetToken::issue(user.id.clone());
        repo.save(&first).await.expect("Failed to save");

        let second = PasswordResetToken::issue(user.id.clone());
        repo.save(&second).await.expect("Failed to replace");

        let found = repo
            .get_by_user_id(&user.id)
            .await
            .expect("Failed to query")
            .expect("Token should exist");
        assert_eq!(found.token, second.token);
    }

    #[tokio::test]
    async fn test_delete() {
        let (_pool, repo, user) = setup().await;

        let token = PasswordResetToken::issue(user.id.clone());
        repo.save(&token).await.expect("Failed to save");

        repo.delete(&user.id).await.expect("Failed to delete");

        let found = repo.get_by_user_id(&user.id).await.expect("Failed to query");
        assert!(found.is_none());
    }
}
