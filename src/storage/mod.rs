//! Storage backends for related-tag records
//!
//! Backends implement the `RelationStore` trait. `SqliteStore` is the
//! persistent implementation; `MemoryStore` keeps records in process.

mod memory;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{
    Expected, OpenStore, RelationStore, StorageError, StorageResult, Versioned, WriteOutcome,
};
