//! cotag: related-tag co-occurrence aggregation
//!
//! For every tag in a tagged-content corpus, cotag keeps a ranked table of
//! the tags that appear together with it, plus a pre-rendered presentation
//! of the top entries.
//!
//! # Core Concepts
//!
//! - **Records**: one `TagRelationRecord` per tag, keyed by tag name
//! - **Events**: a content item's tag set applied as an addition or removal
//! - **Stores**: pluggable `RelationStore` backends with version-stamped
//!   conditional writes
//!
//! # Example
//!
//! ```
//! use cotag::{Delta, MemoryStore, RelationAggregator};
//! use std::sync::Arc;
//!
//! let aggregator = RelationAggregator::new(Arc::new(MemoryStore::new()));
//! aggregator.apply(&["php", "mysql", "pdo"], Delta::Add).unwrap();
//!
//! let related = aggregator.get_related("php").unwrap().unwrap();
//! assert_eq!(related.get("mysql"), Some(&1));
//! ```

pub mod config;
mod relation;
pub mod render;
pub mod storage;

pub use config::{Config, ConfigError};
pub use relation::{
    build_record, merge_counters, rank, ContentItem, Delta, RankedRelation, RelationAggregator,
    RelationError, RelationResult, TagRelationRecord, TaggedContent, DEFAULT_MAX_RELATED,
    DEFAULT_MAX_RETRIES,
};
pub use render::{LinkRenderer, RelatedLink, TemplateRenderer};
pub use storage::{MemoryStore, OpenStore, RelationStore, SqliteStore, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
