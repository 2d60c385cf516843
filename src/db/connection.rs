//! Database connection management
//!
//! Provides SQLite connection pooling and management.

use std::path::Path;
use std::sync::Arc;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use thiserror::Error;

use super::migrations;

/// Database error types
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] r2d2::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database directory error: {0}")]
    Directory(#[from] std::io::Error),
}

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: Arc<Pool<SqliteConnectionManager>>,
}

impl Database {
    /// Create a new database connection pool
    pub fn new<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let manager = SqliteConnectionManager::file(path)
            .with_flags(
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_URI,
            )
            .with_init(|conn| {
                conn.execute_batch(
                    "PRAGMA journal_mode = WAL;
                     PRAGMA synchronous = NORMAL;
                     PRAGMA temp_store = MEMORY;",
                )?;
                Ok(())
            });

        let pool = Pool::builder().max_size(4).build(manager)?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Open (creating parent directories) and migrate the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Self::new(path)?;
        db.with_conn(migrations::run_migrations)?;
        Ok(db)
    }

    /// A migrated in-memory database shared by every pooled connection.
    /// Distinct names give distinct databases.
    pub fn in_memory(name: &str) -> DbResult<Self> {
        let db = Self::new(format!("file:{}?mode=memory&cache=shared", name))?;
        db.with_conn(migrations::run_migrations)?;
        Ok(db)
    }

    /// Get a connection from the pool
    pub fn get_conn(&self) -> DbResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Execute a closure with a database connection
    pub fn with_conn<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> DbResult<T>,
    {
        let conn = self.get_conn()?;
        f(&conn)
    }

    /// Execute a closure with a mutable connection, for transactions
    pub fn with_conn_mut<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&mut rusqlite::Connection) -> DbResult<T>,
    {
        let mut conn = self.get_conn()?;
        f(&mut conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_is_shared_across_connections() {
        let db = Database::in_memory("connection_shared").unwrap();
        db.with_conn(|conn| {
            conn.execute("INSERT INTO kv_store (key, value) VALUES ('a', '1')", [])?;
            Ok(())
        })
        .unwrap();

        let first = db.get_conn().unwrap();
        let second = db.get_conn().unwrap();
        for conn in [&first, &second] {
            let value: String = conn
                .query_row("SELECT value FROM kv_store WHERE key = 'a'", [], |row| row.get(0))
                .unwrap();
            assert_eq!(value, "1");
        }
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = std::env::temp_dir().join(format!("fridgenutri-db-{}", std::process::id()));
        let path = dir.join("nested").join("test.db");
        let db = Database::open(&path).unwrap();
        assert!(path.exists());
        drop(db);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
