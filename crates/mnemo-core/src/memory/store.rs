//! Memory storage implementation using SQLite
//!
//! Every operation opens its own connection and, for writes, its own
//! IMMEDIATE transaction. Dropping the connection closes the file and
//! dropping an uncommitted transaction rolls it back, so nothing is held
//! across operations and every exit path releases the database.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use tracing::{debug, error, info};

use crate::config::MemoryConfig;
use crate::memory::types::{
    DeleteOutcome, MemoryEntry, MemorySummary, PREVIEW_CHARS, SaveOutcome, SearchHit,
    decode_timestamp, encode_timestamp, preview,
};
use crate::{Error, Result};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS memory_entries (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_memory_entries_updated_at
        ON memory_entries(updated_at);
";

// updated_at is clamped to created_at so a clock step backwards cannot
// produce an entry that was updated before it was created.
const UPSERT: &str = "
    INSERT INTO memory_entries (key, value, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?3)
    ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = max(excluded.updated_at, memory_entries.created_at)
    RETURNING created_at, updated_at
";

/// SQLite-based storage for memories
///
/// The store holds only the database path, so it is cheap to clone and can
/// be shared freely between threads.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    path: PathBuf,
    busy_timeout: Duration,
}

impl MemoryStore {
    /// Open the store at `db_path`, creating the file and schema if needed
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        Self::with_busy_timeout(
            db_path,
            Duration::from_millis(MemoryConfig::default().busy_timeout_ms),
        )
    }

    /// Open the store described by the memory section of the configuration
    pub fn from_config(config: &MemoryConfig) -> Result<Self> {
        Self::with_busy_timeout(
            &config.db_path,
            Duration::from_millis(config.busy_timeout_ms),
        )
    }

    /// Open the store with a custom wait for locks held by other writers
    pub fn with_busy_timeout(db_path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let store = Self {
            path: db_path.as_ref().to_path_buf(),
            busy_timeout,
        };
        debug!("Opening memory database at: {}", store.path.display());
        store.initialize()?;
        info!("MemoryStore initialized at {}", store.path.display());
        Ok(store)
    }

    /// Path of the backing database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the database file, journal mode and table exist
    ///
    /// Idempotent; safe to call against a store populated by an earlier run.
    pub fn initialize(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.unavailable(e))?;
            }
        }

        let conn = self.connect()?;

        // journal_mode answers with a row, so it cannot go through execute()
        let mode: String = conn
            .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
            .map_err(|e| self.unavailable(e))?;
        debug!(journal_mode = %mode, "Journal mode configured");

        conn.execute_batch(SCHEMA).map_err(|e| self.unavailable(e))?;
        Ok(())
    }

    /// Insert or overwrite `key` atomically
    pub fn save(&self, key: &str, value: &str) -> Result<SaveOutcome> {
        validate_key(key)?;
        let now = encode_timestamp(&Utc::now());

        let mut conn = self.connect()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(write_error("save"))?;

        // the write lock is already held, so the answer cannot go stale
        let existed: bool = tx
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM memory_entries WHERE key = ?1)",
                params![key],
                |row| row.get(0),
            )
            .map_err(write_error("save"))?;

        let (created_at, updated_at) = tx
            .query_row(UPSERT, params![key, value, now], |row| {
                Ok((timestamp_column(row, 0)?, timestamp_column(row, 1)?))
            })
            .map_err(write_error("save"))?;

        tx.commit().map_err(write_error("save"))?;

        let entry = MemoryEntry {
            key: key.to_string(),
            value: value.to_string(),
            created_at,
            updated_at,
        };

        if existed {
            debug!(key, "Updated memory");
            Ok(SaveOutcome::Updated(entry))
        } else {
            debug!(key, "Created memory");
            Ok(SaveOutcome::Created(entry))
        }
    }

    /// Look up `key`; `None` when it was never saved or has been deleted
    pub fn recall(&self, key: &str) -> Result<Option<MemoryEntry>> {
        validate_key(key)?;
        let conn = self.connect()?;

        let entry = conn
            .query_row(
                "SELECT key, value, created_at, updated_at
                 FROM memory_entries WHERE key = ?1",
                params![key],
                entry_from_row,
            )
            .optional()
            .map_err(read_error("recall"))?;

        if entry.is_none() {
            debug!(key, "No memory stored under key");
        }
        Ok(entry)
    }

    /// All keys with their timestamps, ordered by key
    pub fn list(&self) -> Result<Vec<MemorySummary>> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(
                "SELECT key, created_at, updated_at
                 FROM memory_entries
                 ORDER BY key ASC",
            )
            .map_err(read_error("list"))?;

        let summaries = stmt
            .query_map([], |row| {
                Ok(MemorySummary {
                    key: row.get(0)?,
                    created_at: timestamp_column(row, 1)?,
                    updated_at: timestamp_column(row, 2)?,
                })
            })
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(read_error("list"))?;

        debug!("Listed {} memories", summaries.len());
        Ok(summaries)
    }

    /// Remove `key` if present
    pub fn delete(&self, key: &str) -> Result<DeleteOutcome> {
        validate_key(key)?;

        let mut conn = self.connect()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(write_error("delete"))?;

        let rows_affected = tx
            .execute("DELETE FROM memory_entries WHERE key = ?1", params![key])
            .map_err(write_error("delete"))?;

        tx.commit().map_err(write_error("delete"))?;

        if rows_affected > 0 {
            debug!(key, "Deleted memory");
            Ok(DeleteOutcome::Deleted)
        } else {
            debug!(key, "Nothing to delete");
            Ok(DeleteOutcome::NotFound)
        }
    }

    /// Entries whose key or value contains `term`, most recently updated first
    ///
    /// Matching is a literal substring test that ignores ASCII case. `%`, `_`
    /// and `\` in the term match themselves.
    pub fn search(&self, term: &str) -> Result<Vec<SearchHit>> {
        if term.trim().is_empty() {
            return Err(Error::Validation("search term must not be empty".to_string()));
        }

        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(
                "SELECT key, value, created_at, updated_at
                 FROM memory_entries
                 WHERE instr(lower(key), lower(?1)) > 0
                    OR instr(lower(value), lower(?1)) > 0
                 ORDER BY updated_at DESC, key ASC",
            )
            .map_err(read_error("search"))?;

        let hits = stmt
            .query_map(params![term], |row| {
                let value: String = row.get(1)?;
                Ok(SearchHit {
                    key: row.get(0)?,
                    preview: preview(&value, PREVIEW_CHARS),
                    created_at: timestamp_column(row, 2)?,
                    updated_at: timestamp_column(row, 3)?,
                })
            })
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(read_error("search"))?;

        debug!("Found {} memories matching query: {}", hits.len(), term);
        Ok(hits)
    }

    /// Count total memories
    pub fn count(&self) -> Result<usize> {
        let conn = self.connect()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM memory_entries", [], |row| row.get(0))
            .map_err(read_error("count"))?;
        Ok(count as usize)
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path).map_err(|e| self.unavailable(e))?;
        conn.busy_timeout(self.busy_timeout)
            .map_err(|e| self.unavailable(e))?;
        Ok(conn)
    }

    fn unavailable(&self, source: impl std::error::Error + Send + Sync + 'static) -> Error {
        error!(path = %self.path.display(), error = %source, "Memory database unavailable");
        Error::StorageUnavailable {
            path: self.path.display().to_string(),
            source: Box::new(source),
        }
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(Error::Validation("memory key must not be empty".to_string()));
    }
    Ok(())
}

fn write_error(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> Error {
    move |source| {
        error!(operation, error = %source, "Memory write failed, transaction rolled back");
        Error::StorageWrite { operation, source }
    }
}

fn read_error(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> Error {
    move |source| {
        error!(operation, error = %source, "Memory read failed");
        Error::StorageRead { operation, source }
    }
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<MemoryEntry> {
    Ok(MemoryEntry {
        key: row.get(0)?,
        value: row.get(1)?,
        created_at: timestamp_column(row, 2)?,
        updated_at: timestamp_column(row, 3)?,
    })
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    decode_timestamp(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
