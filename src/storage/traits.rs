//! Storage trait definitions

use crate::relation::TagRelationRecord;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A stored record together with the version stamp it was read at.
///
/// Version stamps are drawn from a store-wide clock, so a record that is
/// deleted and recreated never reuses a stamp a reader may still hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned {
    pub record: TagRelationRecord,
    pub version: u64,
}

/// Precondition a conditional write is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// Write unconditionally
    Any,
    /// The key must not exist
    Absent,
    /// The key must exist at exactly this version
    Version(u64),
}

impl Expected {
    /// The precondition that holds if nothing changed since `read`
    pub fn from_read(read: Option<&Versioned>) -> Self {
        match read {
            Some(v) => Expected::Version(v.version),
            None => Expected::Absent,
        }
    }

    /// Check the precondition against the version currently stored, if any
    pub fn matches(self, current: Option<u64>) -> bool {
        match self {
            Expected::Any => true,
            Expected::Absent => current.is_none(),
            Expected::Version(v) => current == Some(v),
        }
    }
}

/// Result of a conditional write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    /// The precondition failed; nothing was written
    Conflict,
}

/// Trait for related-tag record stores
///
/// Records are keyed by tag name. Implementations must be thread-safe
/// (Send + Sync) and must evaluate the precondition of `save_if` and
/// `remove_if` atomically with the write itself.
pub trait RelationStore: Send + Sync {
    /// Load the record for a tag, with its current version stamp
    fn find_one(&self, tag: &str) -> StorageResult<Option<Versioned>>;

    /// Insert or fully replace a record if `expected` holds
    fn save_if(&self, record: &TagRelationRecord, expected: Expected) -> StorageResult<WriteOutcome>;

    /// Delete the record for a tag if `expected` holds.
    ///
    /// Deleting a missing key under `Any` or `Absent` is `Applied`.
    fn remove_if(&self, tag: &str, expected: Expected) -> StorageResult<WriteOutcome>;

    /// List all tag names that currently have a record, sorted
    fn list_tags(&self) -> StorageResult<Vec<String>>;

    /// Insert or fully replace a record unconditionally
    fn upsert(&self, record: &TagRelationRecord) -> StorageResult<()> {
        self.save_if(record, Expected::Any).map(|_| ())
    }

    /// Delete the record for a tag; missing keys are not an error
    fn delete(&self, tag: &str) -> StorageResult<()> {
        self.remove_if(tag, Expected::Any).map(|_| ())
    }
}

/// Extension trait for opening stores from paths
pub trait OpenStore: RelationStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
