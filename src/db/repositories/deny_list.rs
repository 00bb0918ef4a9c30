//! JWT deny-list repository
//!
//! Revoked tokens are keyed by jti. Expired records are cleaned up
//! opportunistically by sign-out rather than a background sweep.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::JwtDenyRecord;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Deny-list repository trait
#[async_trait]
pub trait DenyListRepository: Send + Sync {
    /// Record a revoked token. Recording a jti that is already present is
    /// a no-op, so a replayed sign-out stays idempotent.
    async fn create(&self, record: &JwtDenyRecord) -> Result<()>;

    /// Look up a record by token id
    async fn get_by_jti(&self, jti: &str) -> Result<Option<JwtDenyRecord>>;

    /// Delete every record whose exp is before `now`. Returns rows removed.
    async fn delete_expired(&self, now: i64) -> Result<u64>;
}

/// SQLx-based deny-list repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxDenyListRepository {
    pool: DynDatabasePool,
}

impl SqlxDenyListRepository {
    /// Create a new SQLx deny-list repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn DenyListRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl DenyListRepository for SqlxDenyListRepository {
    async fn create(&self, record: &JwtDenyRecord) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_record_sqlite(self.pool.as_sqlite().unwrap(), record).await
            }
            DatabaseDriver::Mysql => {
                create_record_mysql(self.pool.as_mysql().unwrap(), record).await
            }
        }
    }

    async fn get_by_jti(&self, jti: &str) -> Result<Option<JwtDenyRecord>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_by_jti_sqlite(self.pool.as_sqlite().unwrap(), jti).await
            }
            DatabaseDriver::Mysql => get_by_jti_mysql(self.pool.as_mysql().unwrap(), jti).await,
        }
    }

    async fn delete_expired(&self, now: i64) -> Result<u64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                delete_expired_sqlite(self.pool.as_sqlite().unwrap(), now).await
            }
            DatabaseDriver::Mysql => delete_expired_mysql(self.pool.as_mysql().unwrap(), now).await,
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_record_sqlite(pool: &SqlitePool, record: &JwtDenyRecord) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO jwt_deny_list (jti, iat, exp) VALUES (?, ?, ?)")
        .bind(&record.jti)
        .bind(record.iat)
        .bind(record.exp)
        .execute(pool)
        .await
        .context("Failed to create deny record")?;
    Ok(())
}

async fn get_by_jti_sqlite(pool: &SqlitePool, jti: &str) -> Result<Option<JwtDenyRecord>> {
    let row = sqlx::query("SELECT jti, iat, exp FROM jwt_deny_list WHERE jti = ?")
        .bind(jti)
        .fetch_optional(pool)
        .await
        .context("Failed to get deny record")?;

    Ok(row.map(|row| JwtDenyRecord {
        jti: row.get("jti"),
        iat: row.get("iat"),
        exp: row.get("exp"),
    }))
}

async fn delete_expired_sqlite(pool: &SqlitePool, now: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM jwt_deny_list WHERE exp < ?")
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to delete expired deny records")?;
    Ok(result.rows_affected())
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_record_mysql(pool: &MySqlPool, record: &JwtDenyRecord) -> Result<()> {
    sqlx::query("INSERT IGNORE INTO jwt_deny_list (jti, iat, exp) VALUES (?, ?, ?)")
        .bind(&record.jti)
        .bind(record.iat)
        .bind(record.exp)
        .execute(pool)
        .await
        .context("Failed to create deny record")?;
    Ok(())
}

async fn get_by_jti_mysql(pool: &MySqlPool, jti: &str) -> Result<Option<JwtDenyRecord>> {
    let row = sqlx::query("SELECT jti, iat, exp FROM jwt_deny_list WHERE jti = ?")
        .bind(jti)
        .fetch_optional(pool)
        .await
        .context("Failed to get deny record")?;

    Ok(row.map(|row| JwtDenyRecord {
        jti: row.get("jti"),
        iat: row.get("iat"),
        exp: row.get("exp"),
    }))
}

async fn delete_expired_mysql(pool: &MySqlPool, now: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM jwt_deny_list WHERE exp < ?")
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to delete expired deny records")?;
    Ok(result.rows_affected())
}
