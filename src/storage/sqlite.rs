//! SQLite storage backend for related-tag records

use super::traits::{Expected, OpenStore, RelationStore, StorageResult, Versioned, WriteOutcome};
use crate::relation::TagRelationRecord;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed related-tag store
///
/// One row per tag in `related_tags`. The counter map is stored as JSON.
/// Version stamps come from the single-row `version_clock` table so they
/// are unique across the whole database, including deleted records.
/// Thread-safe via internal mutex on the connection; conditional writes
/// run inside an IMMEDIATE transaction so other processes sharing the file
/// cannot interleave between the version check and the write.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Initialize the database schema
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS related_tags (
                id TEXT PRIMARY KEY,
                counters_json TEXT NOT NULL,
                count INTEGER NOT NULL,
                rendered TEXT NOT NULL,
                version INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS version_clock (
                id INTEGER PRIMARY KEY CHECK (id = 0),
                value INTEGER NOT NULL
            );
            INSERT OR IGNORE INTO version_clock (id, value) VALUES (0, 0);

            -- Enable WAL mode for concurrent reads during writes
            PRAGMA journal_mode = WAL;
            "#,
        )?;

        Ok(())
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        // Wait out writers in other processes sharing the file
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Advance the store-wide clock and return the new stamp
    fn next_version(tx: &Transaction<'_>) -> StorageResult<u64> {
        let value: i64 = tx.query_row(
            "UPDATE version_clock SET value = value + 1 WHERE id = 0 RETURNING value",
            [],
            |row| row.get(0),
        )?;
        Ok(value as u64)
    }

    fn current_version(tx: &Transaction<'_>, tag: &str) -> StorageResult<Option<u64>> {
        let version: Option<i64> = tx
            .query_row(
                "SELECT version FROM related_tags WHERE id = ?1",
                params![tag],
                |row| row.get(0),
            )
            .optional()?;
        Ok(version.map(|v| v as u64))
    }

    /// Deserialize a record from database columns
    fn row_to_record(
        id: String,
        counters_json: String,
        count: i64,
        rendered: String,
    ) -> StorageResult<TagRelationRecord> {
        Ok(TagRelationRecord {
            id,
            counters: serde_json::from_str(&counters_json)?,
            count: count as usize,
            rendered,
        })
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        Self::from_connection(Connection::open(path)?)
    }

    fn open_in_memory() -> StorageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }
}

impl RelationStore for SqliteStore {
    fn find_one(&self, tag: &str) -> StorageResult<Option<Versioned>> {
        let conn = self.conn.lock().unwrap();

        let row: Option<(String, String, i64, String, i64)> = conn
            .query_row(
                "SELECT id, counters_json, count, rendered, version
                 FROM related_tags WHERE id = ?1",
                params![tag],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )
            .optional()?;

        match row {
            Some((id, counters, count, rendered, version)) => Ok(Some(Versioned {
                record: Self::row_to_record(id, counters, count, rendered)?,
                version: version as u64,
            })),
            None => Ok(None),
        }
    }

    fn save_if(&self, record: &TagRelationRecord, expected: Expected) -> StorageResult<WriteOutcome> {
        let counters_json = serde_json::to_string(&record.counters)?;

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !expected.matches(Self::current_version(&tx, &record.id)?) {
            return Ok(WriteOutcome::Conflict);
        }

        let version = Self::next_version(&tx)?;
        tx.execute(
            r#"
            INSERT INTO related_tags (id, counters_json, count, rendered, version)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                counters_json = excluded.counters_json,
                count = excluded.count,
                rendered = excluded.rendered,
                version = excluded.version
            "#,
            params![
                record.id,
                counters_json,
                record.count as i64,
                record.rendered,
                version as i64,
            ],
        )?;
        tx.commit()?;

        Ok(WriteOutcome::Applied)
    }

    fn remove_if(&self, tag: &str, expected: Expected) -> StorageResult<WriteOutcome> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !expected.matches(Self::current_version(&tx, tag)?) {
            return Ok(WriteOutcome::Conflict);
        }

        tx.execute("DELETE FROM related_tags WHERE id = ?1", params![tag])?;
        tx.commit()?;

        Ok(WriteOutcome::Applied)
    }

    fn list_tags(&self) -> StorageResult<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id FROM related_tags ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }
}
