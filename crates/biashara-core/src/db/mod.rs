//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `subjects` - Businesses being scored
//! - `transactions` - Categorized statement rows and the `TransactionStore` seam

use std::sync::Arc;

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{DEFAULT_SUBJECT_ID, DEFAULT_SUBJECT_NAME};

mod subjects;
mod transactions;

pub use transactions::TransactionStore;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Format used for stored transaction timestamps (UTC)
///
/// Fixed-width nanoseconds keep text order equal to time order.
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f";

/// Accepts stored timestamps with or without a fractional part
/// (`CURRENT_TIMESTAMP` defaults have none)
const DATETIME_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Format a timestamp for storage
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Parse a stored timestamp
pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    chrono::NaiveDateTime::parse_from_str(s, DATETIME_PARSE_FORMAT)
        .map(|dt| dt.and_utc())
        .map_err(|e| Error::InvalidData(format!("Bad stored timestamp {:?}: {}", s, e)))
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
    /// Owns the directory of a throwaway database; dropped after `pool`
    _scratch: Option<Arc<tempfile::TempDir>>,
}

impl Database {
    /// Open (or create) a database file and run migrations
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        });
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
            _scratch: None,
        };
        db.run_migrations()?;
        info!(path, "Database ready");
        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Uses a file in a fresh temporary directory rather than `:memory:` so
    /// every pooled connection sees the same data. The directory (database,
    /// WAL and SHM files) is removed when the last clone is dropped.
    pub fn in_memory() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("biashara_test_").tempdir()?;
        let path = dir.path().join("biashara.db");

        let mut db = Self::new(&path.to_string_lossy())?;
        db._scratch = Some(Arc::new(dir));
        Ok(db)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block the upload writer
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            -- Businesses being scored
            CREATE TABLE IF NOT EXISTS subjects (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Categorized statement rows
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY,
                subject_id INTEGER NOT NULL REFERENCES subjects(id) ON DELETE CASCADE,
                transaction_date DATETIME NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                type TEXT NOT NULL CHECK (type IN ('INCOME', 'EXPENSE')),
                description TEXT NOT NULL,
                category TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_subject_date
                ON transactions(subject_id, transaction_date);
            "#,
        )?;

        drop(conn);

        self.ensure_subject(DEFAULT_SUBJECT_ID, DEFAULT_SUBJECT_NAME)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
