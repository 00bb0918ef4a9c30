//! Code-embedded database migrations
//!
//! All schema changes live here as SQL strings, with variants for SQLite and
//! MySQL so a single binary can run against either backend. Migrations are
//! tracked in a `_migrations` table and applied in version order.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};

use super::DynDatabasePool;
use crate::config::DatabaseDriver;

/// A database migration with SQL for both SQLite and MySQL
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version number (must be unique and sequential)
    pub version: i32,
    /// Human-readable migration name
    pub name: &'static str,
    /// SQL statements for SQLite
    pub up_sqlite: &'static str,
    /// SQL statements for MySQL
    pub up_mysql: &'static str,
}

/// Migration record stored in the database
#[derive(Debug, Clone)]
pub struct MigrationRecord {
    /// Migration version number
    pub version: i64,
    /// Migration name/description
    pub name: String,
    /// When the migration was applied
    pub applied_at: DateTime<Utc>,
}

/// All migrations for the SportsHub backend.
/// These are embedded in the binary for single-binary deployment.
pub const MIGRATIONS: &[Migration] = &[
    // Migration 1: Create users table
    Migration {
        version: 1,
        name: "create_users",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS users (
                id VARCHAR(36) PRIMARY KEY,
                email VARCHAR(255) NOT NULL UNIQUE COLLATE NOCASE,
                password_hash VARCHAR(255) NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS users (
                id VARCHAR(36) PRIMARY KEY,
                email VARCHAR(255) NOT NULL UNIQUE,
                password_hash VARCHAR(255) NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX idx_users_email ON users(email);
        "#,
    },
    // Migration 2: Create languages table with the seeded English entry.
    // English is the anchor language and can never be deleted.
    Migration {
        version: 2,
        name: "create_languages",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS languages (
                id VARCHAR(36) PRIMARY KEY,
                name VARCHAR(100) NOT NULL,
                code VARCHAR(10) NOT NULL UNIQUE,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP,
                created_by_user_id VARCHAR(36),
                updated_by_user_id VARCHAR(36)
            );
            CREATE INDEX IF NOT EXISTS idx_languages_code ON languages(code);
            INSERT OR IGNORE INTO languages (id, name, code, is_active)
            VALUES ('5b81b267-0e09-4a6b-9e08-3a3e5ac1c421', 'English', 'en', 1);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS languages (
                id VARCHAR(36) PRIMARY KEY,
                name VARCHAR(100) NOT NULL,
                code VARCHAR(10) NOT NULL UNIQUE,
                is_active TINYINT NOT NULL DEFAULT 1,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NULL,
                created_by_user_id VARCHAR(36),
                updated_by_user_id VARCHAR(36)
            );
            CREATE INDEX idx_languages_code ON languages(code);
            INSERT IGNORE INTO languages (id, name, code, is_active)
            VALUES ('5b81b267-0e09-4a6b-9e08-3a3e5ac1c421', 'English', 'en', 1);
        "#,
    },
    // Migration 3: Create articles table
    Migration {
        version: 3,
        name: "create_articles",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS articles (
                id VARCHAR(36) PRIMARY KEY,
                title VARCHAR(255) NOT NULL,
                short_description TEXT NOT NULL,
                description TEXT NOT NULL,
                image_file_name VARCHAR(255),
                article_likes INTEGER NOT NULL DEFAULT 0,
                article_dislikes INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP,
                created_by_user_id VARCHAR(36),
                updated_by_user_id VARCHAR(36)
            );
            CREATE INDEX IF NOT EXISTS idx_articles_created_at ON articles(created_at);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS articles (
                id VARCHAR(36) PRIMARY KEY,
                title VARCHAR(255) NOT NULL,
                short_description TEXT NOT NULL,
                description TEXT NOT NULL,
                image_file_name VARCHAR(255),
                article_likes INT NOT NULL DEFAULT 0,
                article_dislikes INT NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NULL,
                created_by_user_id VARCHAR(36),
                updated_by_user_id VARCHAR(36)
            );
            CREATE INDEX idx_articles_created_at ON articles(created_at);
        "#,
    },
    // Migration 4: Create article_comments table
    Migration {
        version: 4,
        name: "create_article_comments",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS article_comments (
                id VARCHAR(36) PRIMARY KEY,
                article_id VARCHAR(36) NOT NULL,
                comment_text TEXT NOT NULL,
                parent_comment_id VARCHAR(36),
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP,
                created_by_user_id VARCHAR(36),
                updated_by_user_id VARCHAR(36),
                FOREIGN KEY (article_id) REFERENCES articles(id) ON DELETE CASCADE,
                FOREIGN KEY (parent_comment_id) REFERENCES article_comments(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_article_comments_article_id ON article_comments(article_id);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS article_comments (
                id VARCHAR(36) PRIMARY KEY,
                article_id VARCHAR(36) NOT NULL,
                comment_text TEXT NOT NULL,
                parent_comment_id VARCHAR(36),
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NULL,
                created_by_user_id VARCHAR(36),
                updated_by_user_id VARCHAR(36),
                FOREIGN KEY (article_id) REFERENCES articles(id) ON DELETE CASCADE,
                FOREIGN KEY (parent_comment_id) REFERENCES article_comments(id) ON DELETE CASCADE
            );
            CREATE INDEX idx_article_comments_article_id ON article_comments(article_id);
        "#,
    },
    // Migration 5: Create file_items table for DB-blob image storage
    Migration {
        version: 5,
        name: "create_file_items",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS file_items (
                id VARCHAR(36) PRIMARY KEY,
                file_name VARCHAR(255) NOT NULL UNIQUE,
                content_type VARCHAR(100) NOT NULL,
                content BLOB NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP,
                created_by_user_id VARCHAR(36),
                updated_by_user_id VARCHAR(36)
            );
            CREATE INDEX IF NOT EXISTS idx_file_items_file_name ON file_items(file_name);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS file_items (
                id VARCHAR(36) PRIMARY KEY,
                file_name VARCHAR(255) NOT NULL UNIQUE,
                content_type VARCHAR(100) NOT NULL,
                content LONGBLOB NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NULL,
                created_by_user_id VARCHAR(36),
                updated_by_user_id VARCHAR(36)
            );
            CREATE INDEX idx_file_items_file_name ON file_items(file_name);
        "#,
    },
    // Migration 6: Create jwt_deny_list table.
    // iat/exp are stored as unix timestamps, matching the JWT claims.
    Migration {
        version: 6,
        name: "create_jwt_deny_list",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS jwt_deny_list (
                jti VARCHAR(64) PRIMARY KEY,
                iat BIGINT NOT NULL,
                exp BIGINT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_jwt_deny_list_exp ON jwt_deny_list(exp);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS jwt_deny_list (
                jti VARCHAR(64) PRIMARY KEY,
                iat BIGINT NOT NULL,
                exp BIGINT NOT NULL
            );
            CREATE INDEX idx_jwt_deny_list_exp ON jwt_deny_list(exp);
        "#,
    },
    // Migration 7: Create password_reset_tokens table.
    // user_id is the primary key: one outstanding token per user.
    Migration {
        version: 7,
        name: "create_password_reset_tokens",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS password_reset_tokens (
                user_id VARCHAR(36) PRIMARY KEY,
                token VARCHAR(64) NOT NULL,
                purpose VARCHAR(50) NOT NULL DEFAULT 'password_reset',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                expires_at TIMESTAMP NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS password_reset_tokens (
                user_id VARCHAR(36) PRIMARY KEY,
                token VARCHAR(64) NOT NULL,
                purpose VARCHAR(50) NOT NULL DEFAULT 'password_reset',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                expires_at TIMESTAMP NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
        "#,
    },
];

/// Run all pending migrations
///
/// Creates the tracking table if needed, then applies any migration whose
/// version is not yet recorded, in order.
///
/// # Returns
///
/// Number of migrations applied
///
/// # Errors
///
/// Returns an error if any migration fails to apply
pub async fn run_migrations(pool: &DynDatabasePool) -> Result<usize> {
    create_migrations_table(pool).await?;

    let applied = get_applied_migrations(pool).await?;
    let applied_versions: Vec<i32> = applied.iter().map(|m| m.version as i32).collect();

    let mut count = 0;

    for migration in MIGRATIONS {
        if !applied_versions.contains(&migration.version) {
            tracing::info!(
                "Applying migration {}: {}",
                migration.version,
                migration.name
            );
            apply_migration(pool, migration)
                .await
                .with_context(|| format!("Failed to apply migration: {}", migration.name))?;
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Applied {} migration(s)", count);
    } else {
        tracing::debug!("No pending migrations");
    }

    Ok(count)
}

/// Create the migrations tracking table if it doesn't exist
async fn create_migrations_table(pool: &DynDatabasePool) -> Result<()> {
    let sql = match pool.driver() {
        DatabaseDriver::Sqlite => {
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                name VARCHAR(255) NOT NULL UNIQUE,
                applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#
        }
        DatabaseDriver::Mysql => {
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version INT PRIMARY KEY,
                name VARCHAR(255) NOT NULL UNIQUE,
                applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#
        }
    };

    pool.execute(sql).await?;
    Ok(())
}

/// Get list of already applied migrations
async fn get_applied_migrations(pool: &DynDatabasePool) -> Result<Vec<MigrationRecord>> {
    match pool.driver() {
        DatabaseDriver::Sqlite => get_applied_migrations_sqlite(pool.as_sqlite().unwrap()).await,
        DatabaseDriver::Mysql => get_applied_migrations_mysql(pool.as_mysql().unwrap()).await,
    }
}

async fn get_applied_migrations_sqlite(pool: &SqlitePool) -> Result<Vec<MigrationRecord>> {
    let rows = sqlx::query("SELECT version, name, applied_at FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await?;

    let mut records = Vec::new();
    for row in rows {
        records.push(MigrationRecord {
            version: row.get("version"),
            name: row.get("name"),
            applied_at: row.get("applied_at"),
        });
    }

    Ok(records)
}

async fn get_applied_migrations_mysql(pool: &MySqlPool) -> Result<Vec<MigrationRecord>> {
    let rows = sqlx::query("SELECT version, name, applied_at FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await?;

    let mut records = Vec::new();
    for row in rows {
        records.push(MigrationRecord {
            version: row.get("version"),
            name: row.get("name"),
            applied_at: row.get("applied_at"),
        });
    }

    Ok(records)
}

/// Apply a single migration
async fn apply_migration(pool: &DynDatabasePool, migration: &Migration) -> Result<()> {
    match pool.driver() {
        DatabaseDriver::Sqlite => {
            apply_migration_sqlite(pool.as_sqlite().unwrap(), migration).await
        }
        DatabaseDriver::Mysql => apply_migration_mysql(pool.as_mysql().unwrap(), migration).await,
    }
}

async fn apply_migration_sqlite(pool: &SqlitePool, migration: &Migration) -> Result<()> {
    // Migration SQL may contain multiple statements
    for statement in split_sql_statements(migration.up_sqlite) {
        let statement = statement.trim();
        if !statement.is_empty() {
            sqlx::query(statement)
                .execute(pool)
                .await
                .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
        }
    }

    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(pool)
        .await?;

    Ok(())
}

async fn apply_migration_mysql(pool: &MySqlPool, migration: &Migration) -> Result<()> {
    for statement in split_sql_statements(migration.up_mysql) {
        let statement = statement.trim();
        if !statement.is_empty() {
            sqlx::query(statement)
                .execute(pool)
                .await
                .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
        }
    }

    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(pool)
        .await?;

    Ok(())
}

/// Truncate SQL for error messages
fn truncate_sql(sql: &str) -> String {
    if sql.len() > 100 {
        format!("{}...", &sql[..100])
    } else {
        sql.to_string()
    }
}

/// Split SQL into individual statements, handling comments properly
fn split_sql_statements(sql: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut current_start = 0;
    let mut in_statement = false;

    for (i, c) in sql.char_indices() {
        match c {
            ';' => {
                if in_statement {
                    let stmt = sql[current_start..i].trim();
                    if !stmt.is_empty() && !is_comment_only(stmt) {
                        statements.push(stmt);
                    }
                    in_statement = false;
                }
                current_start = i + 1;
            }
            _ if !c.is_whitespace() && !in_statement => {
                current_start = i;
                in_statement = true;
            }
            _ => {}
        }
    }

    // Handle last statement without trailing semicolon
    if in_statement {
        let stmt = sql[current_start..].trim();
        if !stmt.is_empty() && !is_comment_only(stmt) {
            statements.push(stmt);
        }
    }

    statements
}

/// Check if a string contains only SQL comments
fn is_comment_only(s: &str) -> bool {
    for line in s.lines() {
        let trimmed = line.trim();
        if !trimmed.is_empty() && !trimmed.starts_with("--") {
            return false;
        }
    }
    true
}

/// Check if migrations are up to date
pub async fn is_up_to_date(pool: &DynDatabasePool) -> Result<bool> {
    let _ = create_migrations_table(pool).await;

    let applied = get_applied_migrations(pool).await?;
    Ok(applied.len() == MIGRATIONS.len())
}
