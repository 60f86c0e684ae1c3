//! In-process storage backend

use super::traits::{Expected, RelationStore, StorageResult, Versioned, WriteOutcome};
use crate::relation::TagRelationRecord;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// DashMap-backed related-tag store
///
/// Holds records for the lifetime of the process. Conditional writes are
/// evaluated under the shard lock of the key's entry, so they are atomic
/// with respect to other writers of the same tag.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<String, Versioned>,
    clock: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn next_version(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl RelationStore for MemoryStore {
    fn find_one(&self, tag: &str) -> StorageResult<Option<Versioned>> {
        Ok(self.records.get(tag).map(|r| r.value().clone()))
    }

    fn save_if(&self, record: &TagRelationRecord, expected: Expected) -> StorageResult<WriteOutcome> {
        match self.records.entry(record.id.clone()) {
            Entry::Occupied(mut entry) => {
                if !expected.matches(Some(entry.get().version)) {
                    return Ok(WriteOutcome::Conflict);
                }
                entry.insert(Versioned {
                    record: record.clone(),
                    version: self.next_version(),
                });
            }
            Entry::Vacant(entry) => {
                if !expected.matches(None) {
                    return Ok(WriteOutcome::Conflict);
                }
                entry.insert(Versioned {
                    record: record.clone(),
                    version: self.next_version(),
                });
            }
        }
        Ok(WriteOutcome::Applied)
    }

    fn remove_if(&self, tag: &str, expected: Expected) -> StorageResult<WriteOutcome> {
        match self.records.entry(tag.to_string()) {
            Entry::Occupied(entry) => {
                if !expected.matches(Some(entry.get().version)) {
                    return Ok(WriteOutcome::Conflict);
                }
                entry.remove();
                Ok(WriteOutcome::Applied)
            }
            Entry::Vacant(_) => {
                if expected.matches(None) {
                    Ok(WriteOutcome::Applied)
                } else {
                    Ok(WriteOutcome::Conflict)
                }
            }
        }
    }

    fn list_tags(&self) -> StorageResult<Vec<String>> {
        let mut tags: Vec<String> = self.records.iter().map(|r| r.key().clone()).collect();
        tags.sort();
        Ok(tags)
    }
}
