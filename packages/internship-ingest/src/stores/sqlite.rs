//! SQLite listing store.
//!
//! A file-based backend. Good for:
//! - Local development
//! - Single-host deployments
//! - Testing against real SQL

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};

use crate::error::{StoreError, StoreResult};
use crate::traits::store::ListingStore;
use crate::types::{config::MAX_BATCH_WRITE, listing::Listing};

/// SQLite-based listing store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new SQLite store with the given connection URL.
    ///
    /// # Example URLs
    /// - `sqlite::memory:` - In-memory database (ephemeral)
    /// - `sqlite://./internships.db?mode=rwc` - Create if not exists
    pub async fn new(database_url: &str) -> StoreResult<Self> {
        Self::connect(database_url, 5).await
    }

    /// Create an in-memory SQLite store (for testing).
    ///
    /// Uses a single connection: every connection to `:memory:` would
    /// otherwise see its own empty database.
    pub async fn in_memory() -> StoreResult<Self> {
        Self::connect("sqlite::memory:", 1).await
    }

    async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Connection(Box::new(e)))?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS internships (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL DEFAULT '',
                company TEXT NOT NULL DEFAULT '',
                location TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                url TEXT NOT NULL,
                posted_date TEXT NOT NULL DEFAULT '',
                source TEXT NOT NULL DEFAULT '',
                ingested_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Connection(Box::new(e)))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_internships_url ON internships(url)")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Connection(Box::new(e)))?;

        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Total stored listings.
    pub async fn count(&self) -> StoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM internships")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Query(Box::new(e)))?;
        Ok(count)
    }
}

#[async_trait]
impl ListingStore for SqliteStore {
    async fn lookup_by_url(&self, url: &str) -> StoreResult<bool> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM internships WHERE url = ?")
            .bind(url)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Query(Box::new(e)))?;

        Ok(count > 0)
    }

    async fn batch_write(&self, listings: &[Listing]) -> StoreResult<()> {
        if listings.len() > MAX_BATCH_WRITE {
            return Err(StoreError::BatchTooLarge {
                len: listings.len(),
                max: MAX_BATCH_WRITE,
            });
        }
        if listings.is_empty() {
            return Ok(());
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "INSERT INTO internships (id, title, company, location, description, url, posted_date, source) ",
        );
        qb.push_values(listings, |mut row, l| {
            row.push_bind(l.id.clone())
                .push_bind(l.title.clone())
                .push_bind(l.company.clone())
                .push_bind(l.location.clone())
                .push_bind(l.description.clone())
                .push_bind(l.url.clone())
                .push_bind(l.posted_date.clone())
                .push_bind(l.source.clone());
        });
        qb.push(
            " ON CONFLICT(id) DO UPDATE SET \
             title = excluded.title, company = excluded.company, \
             location = excluded.location, description = excluded.description, \
             url = excluded.url, posted_date = excluded.posted_date, \
             source = excluded.source",
        );

        qb.build()
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Write(Box::new(e)))?;

        Ok(())
    }
}
