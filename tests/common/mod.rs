//! Shared helpers for aggregator integration tests

#![allow(dead_code)]

pub mod corpus;

pub use corpus::{random_corpus, CorpusConfig};

use cotag::{MemoryStore, OpenStore, RelationAggregator, RelationStore, SqliteStore, TagRelationRecord};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Aggregator over a fresh in-memory SQLite database
pub fn sqlite_aggregator() -> RelationAggregator {
    let store = SqliteStore::open_in_memory().expect("in-memory sqlite");
    RelationAggregator::new(Arc::new(store))
}

/// Aggregator over a fresh `MemoryStore`
pub fn memory_aggregator() -> RelationAggregator {
    RelationAggregator::new(Arc::new(MemoryStore::new()))
}

/// Every stored record, keyed by tag, for whole-store comparisons
pub fn snapshot(store: &dyn RelationStore) -> BTreeMap<String, TagRelationRecord> {
    store
        .list_tags()
        .expect("list tags")
        .into_iter()
        .map(|tag| {
            let record = store
                .find_one(&tag)
                .expect("find record")
                .expect("listed tag has a record")
                .record;
            (tag, record)
        })
        .collect()
}
