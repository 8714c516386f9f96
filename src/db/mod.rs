//! # Database Module
//!
//! The durable store behind both ceremonies:
//! - `models`: Data structures (Challenge, Credential)
//! - `challenges`: Issue, redeem and expire single-use challenges
//! - `credentials`: Save, look up and advance passkey credentials
//!
//! Every record lives in a named partition. One deployment uses one partition,
//! carried by the [`Store`] handle so no query can forget it.

pub mod challenges;
pub mod credentials;
pub mod models;

use crate::error::AppResult;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// Handle to the SQLite store, scoped to one partition
///
/// Cloning is cheap: `SqlitePool` is reference counted.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
    partition: String,
}

impl Store {
    pub fn new(pool: SqlitePool, partition: impl Into<String>) -> Self {
        Self {
            pool,
            partition: partition.into(),
        }
    }

    /// Connect to `database_url` and bring the schema up to date.
    pub async fn connect(database_url: &str, partition: impl Into<String>) -> AppResult<Self> {
        let pool = SqlitePool::connect(database_url).await?;
        let store = Self::new(pool, partition);
        store.migrate().await?;
        Ok(store)
    }

    /// A private in-memory database.
    ///
    /// Each SQLite connection to `:memory:` gets its own database, so the
    /// pool is capped at a single connection.
    pub async fn in_memory(partition: impl Into<String>) -> AppResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let store = Self::new(pool, partition);
        store.migrate().await?;
        Ok(store)
    }

    /// Run embedded migrations from ./migrations
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn partition(&self) -> &str {
        &self.partition
    }
}
