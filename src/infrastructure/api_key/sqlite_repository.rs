//! SQLite API key repository implementation

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tracing::info;

use crate::domain::DomainError;
use crate::domain::api_key::{ApiKeyRecord, ApiKeyRepository};

/// Path value that selects a private in-memory database
pub const IN_MEMORY_DATABASE: &str = ":memory:";

const MAX_CONNECTIONS: u32 = 5;
const BUSY_TIMEOUT_SECS: u64 = 5;

/// SQLite implementation of ApiKeyRepository
///
/// Keys live in a single `api_keys` table with `key` as primary key, so
/// uniqueness is enforced by the database itself.
#[derive(Debug, Clone)]
pub struct SqliteApiKeyRepository {
    pool: SqlitePool,
}

impl SqliteApiKeyRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the database at `database_path` and make sure
    /// the schema exists
    pub async fn connect(database_path: &str) -> Result<Self, DomainError> {
        let in_memory = database_path == IN_MEMORY_DATABASE;

        let options = if in_memory {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DomainError::persistence("open key database", e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(database_path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
        };
        let options = options.busy_timeout(Duration::from_secs(BUSY_TIMEOUT_SECS));

        // Every connection to `:memory:` is its own database, so pin a single one
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(MAX_CONNECTIONS)
        };

        let pool = pool_options.connect_with(options).await.map_err(|e| {
            DomainError::persistence(
                "open key database",
                format!("Failed to open '{}': {}", database_path, e),
            )
        })?;

        let repo = Self::new(pool);
        repo.ensure_table().await?;

        Ok(repo)
    }

    /// Private in-memory database, mainly for tests
    pub async fn in_memory() -> Result<Self, DomainError> {
        Self::connect(IN_MEMORY_DATABASE).await
    }

    /// Ensures the key table exists and carries a `created_at` column
    ///
    /// Databases written by earlier deployments only have `key` and
    /// `user_id`; the column is added to them in place and existing rows keep
    /// a NULL creation time.
    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS api_keys (
                key TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                created_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::persistence("create api_keys table", e.to_string()))?;

        if !self.has_column("created_at").await? {
            info!("Adding created_at column to existing api_keys table");

            sqlx::query("ALTER TABLE api_keys ADD COLUMN created_at TEXT")
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::persistence("migrate api_keys table", e.to_string())
                })?;
        }

        Ok(())
    }

    async fn has_column(&self, column: &str) -> Result<bool, DomainError> {
        let rows = sqlx::query("SELECT name FROM pragma_table_info('api_keys')")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::persistence("inspect api_keys table", e.to_string()))?;

        for row in rows {
            let name: String = row
                .try_get("name")
                .map_err(|e| DomainError::persistence("inspect api_keys table", e.to_string()))?;
            if name == column {
                return Ok(true);
            }
        }

        Ok(false)
    }
}

#[async_trait]
impl ApiKeyRepository for SqliteApiKeyRepository {
    async fn get(&self, key: &str) -> Result<Option<ApiKeyRecord>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT key, user_id, created_at
            FROM api_keys
            WHERE key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::persistence("get api key", e.to_string()))?;

        match row {
            Some(row) => Ok(Some(row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, record: ApiKeyRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO api_keys (key, user_id, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(record.key())
        .bind(record.owner())
        .bind(record.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                DomainError::duplicate_key(record.key())
            }
            other => DomainError::persistence("insert api key", other.to_string()),
        })?;

        Ok(())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM api_keys")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::persistence("count api keys", e.to_string()))?;

        let total: i64 = row
            .try_get("total")
            .map_err(|e| DomainError::persistence("count api keys", e.to_string()))?;

        Ok(total as usize)
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        let row = sqlx::query("SELECT 1 FROM api_keys WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::persistence("check api key", e.to_string()))?;

        Ok(row.is_some())
    }
}

fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<ApiKeyRecord, DomainError> {
    let decode = |e: sqlx::Error| DomainError::persistence("decode api key row", e.to_string());

    let key: String = row.try_get("key").map_err(decode)?;
    let owner: String = row.try_get("user_id").map_err(decode)?;
    let created_at: Option<DateTime<Utc>> = row.try_get("created_at").map_err(decode)?;

    Ok(ApiKeyRecord::from_parts(key, owner, created_at))
}
