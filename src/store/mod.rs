//! Persistent key-value storage
//!
//! The ledger and profile are stored as JSON documents under fixed keys.
//! `SqliteKvStore` backs the server; `MemoryKvStore` backs tests and
//! throwaway sessions.

mod ledger_store;

pub use ledger_store::{LedgerStore, CURRENT_DAY_INDEX_KEY, DAYS_KEY, USER_PROFILE_KEY};

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use rusqlite::{params, OptionalExtension};
use thiserror::Error;

use crate::db::{Database, DbError};

/// Storage error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Db(#[from] DbError),

    #[error("Stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// String values under string keys
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Write several entries at once; either all land or none do
    fn set_many(&self, entries: &[(&str, &str)]) -> StoreResult<()>;
}

const UPSERT_SQL: &str = "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at";

/// Key-value store over the `kv_store` table
#[derive(Clone)]
pub struct SqliteKvStore {
    db: Database,
}

impl SqliteKvStore {
    /// `db` must already be migrated
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self.db.with_conn(|conn| {
            let value = conn
                .query_row("SELECT value FROM kv_store WHERE key = ?1", params![key], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(value)
        })?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.db.with_conn(|conn| {
            conn.execute(UPSERT_SQL, params![key, value])?;
            Ok(())
        })?;
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> StoreResult<()> {
        self.db.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            for (key, value) in entries {
                tx.execute(UPSERT_SQL, params![key, value])?;
            }
            tx.commit()?;
            Ok(())
        })?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.db.with_conn(|conn| {
            conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
            Ok(())
        })?;
        Ok(())
    }
}

/// Process-local store
#[derive(Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> StoreResult<()> {
        let mut stored = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in entries {
            stored.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}
