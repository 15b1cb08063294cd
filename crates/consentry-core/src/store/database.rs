use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::jar::{expiry_after_days, CookieJar, CookieScope};
use crate::config::AppConfig;
use crate::Result;

/// SQLite-backed jar
///
/// Persists entries across page loads and enforces expiry on the read
/// path; expired rows are additionally swept when a connection opens.
#[derive(Clone)]
pub struct SqliteJar {
    pool: Pool<Sqlite>,
}

// Domain is stored as '' for unscoped entries so it can participate in
// the primary key (SQLite treats NULLs as distinct in unique indexes).
fn domain_column(scope: &CookieScope) -> &str {
    scope.domain.as_deref().unwrap_or("")
}

impl SqliteJar {
    /// Open the jar database and run migrations
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let db_path = config.database_path();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db_url = format!("sqlite:{}", db_path.display());

        tracing::info!("Opening cookie jar database: {}", db_path.display());

        // SqliteConnectOptions sets PRAGMAs per-connection so every
        // pooled connection carries the same settings.
        let options = SqliteConnectOptions::from_str(&db_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;

        let jar = Self { pool };
        jar.run_migrations().await?;
        jar.sweep_expired().await?;

        Ok(jar)
    }

    /// Create an in-memory jar for testing
    #[cfg(test)]
    pub async fn new_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let jar = Self { pool };
        jar.run_migrations().await?;

        Ok(jar)
    }

    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_COOKIES)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete rows whose expiry has passed; returns how many were removed
    pub async fn sweep_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cookies WHERE expires_at <= ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        let swept = result.rows_affected();
        if swept > 0 {
            tracing::debug!("Swept {} expired cookie(s)", swept);
        }
        Ok(swept)
    }

    /// Seed an entry under an explicit scope
    pub async fn insert_scoped(
        &self,
        name: &str,
        value: &str,
        scope: &CookieScope,
        ttl_days: u32,
    ) -> Result<()> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO cookies (name, path, domain, value, expires_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (name, path, domain)
            DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at
            "#,
        )
        .bind(name)
        .bind(&scope.path)
        .bind(domain_column(scope))
        .bind(value)
        .bind(expiry_after_days(ttl_days))
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CookieJar for SqliteJar {
    async fn set(&self, name: &str, value: &str, ttl_days: u32) -> Result<()> {
        self.insert_scoped(name, value, &CookieScope::bare(), ttl_days)
            .await
    }

    async fn get(&self, name: &str) -> Result<Option<String>> {
        let row = sqlx::query(
            r#"
            SELECT value FROM cookies
            WHERE name = ? AND expires_at > ?
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(name)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.get::<String, _>("value")))
    }

    async fn delete_scoped(&self, name: &str, scope: &CookieScope) -> Result<()> {
        sqlx::query("DELETE FROM cookies WHERE name = ? AND path = ? AND domain = ?")
            .bind(name)
            .bind(&scope.path)
            .bind(domain_column(scope))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn names(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT DISTINCT name FROM cookies WHERE expires_at > ? ORDER BY name")
            .bind(Utc::now())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|r| r.get::<String, _>("name")).collect())
    }
}

const MIGRATION_001_COOKIES: &str = r#"
CREATE TABLE IF NOT EXISTS cookies (
    name TEXT NOT NULL,
    path TEXT NOT NULL DEFAULT '/',
    domain TEXT NOT NULL DEFAULT '',
    value TEXT NOT NULL,
    expires_at TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (name, path, domain)
)
"#;
